mod support;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use git2::Repository;
use keeper_core::changes::{ChangeDetector, ChangeKind, ManifestChangeDetector};
use keeper_core::config::InstallerConfig;
use keeper_core::error::{FetchError, InstallError};
use keeper_core::installer::{
    InstallContext, InstallationOrchestrator, PackageInstaller, Reporter,
};
use keeper_core::lockfile::LockfileStore;
use keeper_core::package::{Package, PackageIdentity, SourceRef};
use tempfile::TempDir;

use support::{commit_all, read_tree, tree, write_file, write_tree, write_zip};

#[derive(Debug, Default, Clone)]
struct RecordingReporter {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Reporter for RecordingReporter {
    fn write_line(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

struct Project {
    temp: TempDir,
    reporter: RecordingReporter,
    orchestrator: InstallationOrchestrator,
}

impl Project {
    fn new() -> Self {
        let temp = TempDir::new().expect("tempdir should succeed");
        let root = temp.path().join("project");
        std::fs::create_dir_all(&root).expect("create_dir_all should succeed");

        let config = InstallerConfig::new()
            .with_template("drupal-core", "web/")
            .with_exclusions("drupal-core", ["sites/", "modules/"]);
        let store = LockfileStore::new(root.join("keeper.lock"));
        let reporter = RecordingReporter::default();
        let ctx = InstallContext::new(root, config)
            .with_change_detector(Box::new(ManifestChangeDetector::new(store.clone())))
            .with_reporter(Box::new(reporter.clone()))
            .with_lockfile(store);

        Self {
            temp,
            reporter,
            orchestrator: InstallationOrchestrator::new(ctx),
        }
    }

    fn root(&self) -> PathBuf {
        self.temp.path().join("project")
    }

    fn web(&self) -> PathBuf {
        self.root().join("web")
    }

    fn dist(&self, name: &str) -> PathBuf {
        self.temp.path().join("dist").join(name)
    }

    fn lockfile(&self) -> LockfileStore {
        LockfileStore::new(self.root().join("keeper.lock"))
    }

    fn lines(&self) -> Vec<String> {
        self.reporter.lines.borrow().clone()
    }
}

fn core(version: &str, source: SourceRef) -> Package {
    Package::new(PackageIdentity::new("drupal/core", "drupal-core", version), source)
}

fn path_source(path: &Path) -> SourceRef {
    SourceRef::Path {
        path: path.to_path_buf(),
    }
}

fn leftover_temp_dirs(root: &Path) -> Vec<String> {
    std::fs::read_dir(root)
        .expect("read_dir should succeed")
        .map(|entry| {
            entry
                .expect("dir entry should be readable")
                .file_name()
                .to_string_lossy()
                .to_string()
        })
        .filter(|name| name.contains(".tmp."))
        .collect()
}

#[test]
fn install_over_existing_site_keeps_preserved_paths() {
    let project = Project::new();
    let dist = project.dist("8.0.0");
    write_tree(
        &dist,
        &[
            ("index.php", "core 8.0.0"),
            ("core/lib/Drupal.php", "drupal 8.0.0"),
            ("sites/default/default.settings.php", "shipped"),
        ],
    );
    write_tree(
        &project.web(),
        &[
            ("index.php", "old"),
            ("obsolete.php", "old"),
            ("sites/default/settings.php", "local"),
            ("modules/custom/mymodule.info.yml", "custom"),
        ],
    );

    let report = project
        .orchestrator
        .install(&core("8.0.0", path_source(&dist)))
        .expect("install should succeed");

    assert_eq!(
        read_tree(&project.web()),
        tree(&[
            ("core/lib/Drupal.php", "drupal 8.0.0"),
            ("index.php", "core 8.0.0"),
            ("modules/custom/mymodule.info.yml", "custom"),
            ("sites/default/settings.php", "local"),
        ])
    );
    assert!(report.warnings.is_empty());
    assert_eq!(
        report.pruned.map(|p| p.preserved),
        Some(vec!["modules".to_string(), "sites".to_string()])
    );
    assert!(leftover_temp_dirs(&project.root()).is_empty());
    assert_eq!(project.lines(), vec!["  - Installing drupal/core (8.0.0)"]);

    let locked = project
        .lockfile()
        .get("drupal/core")
        .expect("lockfile should load")
        .expect("install should be recorded");
    assert_eq!(locked.version, "8.0.0");
    assert_eq!(locked.install_path, PathBuf::from("web/"));
    assert_eq!(locked.exclusions, vec!["sites", "modules"]);
    assert!(locked.files.contains_key("core/lib/Drupal.php"));
    assert!(!locked.files.contains_key("sites/default/settings.php"));
}

#[test]
fn fresh_install_from_archive() {
    let project = Project::new();
    let archive = project.temp.path().join("core-8.0.0.zip");
    write_zip(
        &archive,
        &[
            ("drupal-8.0.0/index.php", "core"),
            ("drupal-8.0.0/core/install.php", "install"),
        ],
    );

    project
        .orchestrator
        .install(&core("8.0.0", SourceRef::Archive { path: archive }))
        .expect("install should succeed");

    assert_eq!(
        read_tree(&project.web()),
        tree(&[("core/install.php", "install"), ("index.php", "core")])
    );
}

#[test]
fn install_from_git_reference_exports_without_metadata() {
    let project = Project::new();
    let repo_dir = project.temp.path().join("repo");
    let repo = Repository::init(&repo_dir).expect("init should succeed");

    write_file(&repo_dir.join("index.php"), "v1");
    let first = commit_all(&repo, "v1");
    write_file(&repo_dir.join("index.php"), "v2");
    write_file(&repo_dir.join("CHANGELOG.txt"), "v2");
    commit_all(&repo, "v2");

    let source = SourceRef::Git {
        url: repo_dir.to_string_lossy().to_string(),
        reference: Some(first.to_string()),
    };
    project
        .orchestrator
        .install(&core("8.0.0", source))
        .expect("install should succeed");

    assert_eq!(read_tree(&project.web()), tree(&[("index.php", "v1")]));
    assert!(!project.web().join(".git").exists());
}

#[cfg(unix)]
#[test]
fn install_from_git_keeps_symlinks_and_preserved_paths() {
    let project = Project::new();
    let repo_dir = project.temp.path().join("repo");
    let repo = Repository::init(&repo_dir).expect("init should succeed");
    write_file(&repo_dir.join("index.php"), "new");
    write_file(&repo_dir.join("core/lib.php"), "lib");
    std::os::unix::fs::symlink("lib.php", repo_dir.join("core/alias.php"))
        .expect("symlink should succeed");
    commit_all(&repo, "initial");

    write_tree(
        &project.web(),
        &[
            ("index.php", "old"),
            ("core/lib.php", "old lib"),
            ("sites/s.php", "keep"),
        ],
    );

    let source = SourceRef::Git {
        url: repo_dir.to_string_lossy().to_string(),
        reference: None,
    };
    project
        .orchestrator
        .install(&core("8.0.0", source))
        .expect("install should succeed");

    assert_eq!(
        std::fs::read_link(project.web().join("core/alias.php")).expect("read_link should succeed"),
        PathBuf::from("lib.php")
    );
    assert_eq!(
        read_tree(&project.web()),
        tree(&[
            ("core/alias.php", "lib"),
            ("core/lib.php", "lib"),
            ("index.php", "new"),
            ("sites/s.php", "keep"),
        ])
    );
}

#[test]
fn update_replaces_managed_files_only() {
    let project = Project::new();
    let old = project.dist("8.0.0");
    let new = project.dist("8.0.1");
    write_tree(&old, &[("index.php", "8.0.0"), ("core/removed.php", "gone soon")]);
    write_tree(&new, &[("index.php", "8.0.1"), ("core/added.php", "new")]);

    project
        .orchestrator
        .install(&core("8.0.0", path_source(&old)))
        .expect("install should succeed");
    write_file(&project.web().join("sites/default/settings.php"), "local");

    project
        .orchestrator
        .update(&core("8.0.0", path_source(&old)), &core("8.0.1", path_source(&new)))
        .expect("update should succeed");

    assert_eq!(
        read_tree(&project.web()),
        tree(&[
            ("core/added.php", "new"),
            ("index.php", "8.0.1"),
            ("sites/default/settings.php", "local"),
        ])
    );
    assert_eq!(
        project.lines(),
        vec![
            "  - Installing drupal/core (8.0.0)",
            "  - Removing drupal/core (8.0.0)",
            "  - Installing drupal/core (8.0.1)",
        ]
    );
    let locked = project
        .lockfile()
        .get("drupal/core")
        .expect("lockfile should load")
        .expect("update should be recorded");
    assert_eq!(locked.version, "8.0.1");
}

#[test]
fn remove_warns_about_local_changes_and_keeps_exclusions() {
    let project = Project::new();
    let dist = project.dist("8.0.0");
    write_tree(&dist, &[("index.php", "core"), ("robots.txt", "shipped")]);
    let package = core("8.0.0", path_source(&dist));

    project
        .orchestrator
        .install(&package)
        .expect("install should succeed");
    write_file(&project.web().join("robots.txt"), "edited");
    write_file(&project.web().join("sites/default/settings.php"), "local");

    let report = project
        .orchestrator
        .remove(&package)
        .expect("remove should succeed");

    assert_eq!(report.changes.len(), 1);
    assert_eq!(report.changes[0].path, "robots.txt");
    assert_eq!(report.changes[0].kind, ChangeKind::Modified);
    assert_eq!(report.warnings.len(), 1);
    assert!(project
        .lines()
        .contains(&"  - Removing drupal/core (8.0.0)".to_string()));

    assert_eq!(
        read_tree(&project.web()),
        tree(&[("sites/default/settings.php", "local")])
    );
    assert!(project
        .lockfile()
        .get("drupal/core")
        .expect("lockfile should load")
        .is_none());
}

#[test]
fn change_detector_reports_added_and_removed_files() {
    let project = Project::new();
    let dist = project.dist("8.0.0");
    write_tree(&dist, &[("index.php", "core"), ("update.php", "update")]);
    project
        .orchestrator
        .install(&core("8.0.0", path_source(&dist)))
        .expect("install should succeed");

    std::fs::remove_file(project.web().join("update.php")).expect("remove should succeed");
    write_file(&project.web().join("patch.php"), "hotfix");
    write_file(&project.web().join("modules/contrib/views.php"), "excluded");

    let detector = ManifestChangeDetector::new(project.lockfile());
    let identity = PackageIdentity::new("drupal/core", "drupal-core", "8.0.0");
    let changes = detector
        .detect_local_changes(&identity, &project.web())
        .expect("detection should succeed");

    let summary: Vec<_> = changes.iter().map(|c| (c.path.as_str(), c.kind)).collect();
    assert_eq!(
        summary,
        vec![("patch.php", ChangeKind::Added), ("update.php", ChangeKind::Removed)]
    );
}

#[test]
fn failed_download_leaves_destination_untouched() {
    let project = Project::new();
    write_tree(&project.web(), &[("index.php", "current")]);

    let err = project
        .orchestrator
        .install(&core(
            "8.0.0",
            path_source(&project.temp.path().join("missing")),
        ))
        .unwrap_err();

    assert!(matches!(
        err,
        InstallError::Fetch(FetchError::SourceNotFound(_))
    ));
    assert_eq!(read_tree(&project.web()), tree(&[("index.php", "current")]));
    assert!(leftover_temp_dirs(&project.root()).is_empty());
}

#[test]
fn plain_packages_install_and_remove_whole() {
    let project = Project::new();
    let dist = project.dist("lib");
    write_tree(&dist, &[("src/Lib.php", "lib")]);
    let package = Package::new(
        PackageIdentity::new("acme/lib", "library", "2.0.0"),
        path_source(&dist),
    );

    let report = project
        .orchestrator
        .install(&package)
        .expect("install should succeed");
    let install_path = project.root().join("vendor/acme/lib");
    assert_eq!(report.install_path, install_path);
    assert!(report.pruned.is_none());
    assert_eq!(read_tree(&install_path), tree(&[("src/Lib.php", "lib")]));

    project
        .orchestrator
        .remove(&package)
        .expect("remove should succeed");
    assert!(!install_path.exists());
    assert!(project
        .lockfile()
        .get("acme/lib")
        .expect("lockfile should load")
        .is_none());
}
