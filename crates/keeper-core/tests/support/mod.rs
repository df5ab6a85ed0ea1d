#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

/// Create files from `(relative path, content)` pairs.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        write_file(&root.join(rel), content);
    }
}

/// Every file under `root` as relative path (`/`-joined) -> content.
pub fn read_tree(root: &Path) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    read_tree_into(root, "", &mut out);
    out
}

fn read_tree_into(dir: &Path, prefix: &str, out: &mut BTreeMap<String, String>) {
    for entry in fs::read_dir(dir).expect("read_dir should succeed") {
        let entry = entry.expect("dir entry should be readable");
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if path.is_dir() {
            read_tree_into(&path, &format!("{prefix}{name}/"), out);
        } else {
            let content = fs::read_to_string(&path).expect("read should succeed");
            out.insert(format!("{prefix}{name}"), content);
        }
    }
}

pub fn tree(files: &[(&str, &str)]) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect()
}

pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).expect("create should succeed");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, content) in files {
        zip.start_file(*name, options)
            .expect("Failed to start zip entry");
        zip.write_all(content.as_bytes())
            .expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish zip");
}

pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().expect("index should open");
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .expect("add_all should succeed");
    index.write().expect("index write should succeed");
    let tree_id = index.write_tree().expect("write_tree should succeed");
    let tree = repo.find_tree(tree_id).expect("tree should exist");
    let sig = Signature::now("Keeper Tests", "tests@example.com").expect("signature should build");

    let parent = repo
        .head()
        .ok()
        .and_then(|head| head.target())
        .map(|oid| repo.find_commit(oid).expect("parent commit should exist"));
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit should succeed")
}
