//! Zip archive extraction.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::{FetchError, FsError, FsOp};

/// Extract a zip archive into `dest`.
///
/// Entries whose names escape the destination are skipped. When every entry
/// lives under one top-level directory, that directory is stripped.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<(), FetchError> {
    let archive_err = |source| FetchError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = match File::open(archive_path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(FetchError::SourceNotFound(archive_path.to_path_buf()));
        }
        Err(err) => return Err(FsError::io(FsOp::Read, archive_path, err).into()),
    };
    let mut archive = ZipArchive::new(file).map_err(archive_err)?;

    let names: Vec<Option<PathBuf>> = (0..archive.len())
        .map(|i| {
            archive
                .by_index(i)
                .map(|entry| entry.enclosed_name())
                .map_err(archive_err)
        })
        .collect::<Result<_, _>>()?;
    let strip = common_top_level_dir(names.iter().flatten());

    std::fs::create_dir_all(dest).map_err(|e| FsError::io(FsOp::CreateDir, dest, e))?;

    for (i, name) in names.into_iter().enumerate() {
        let Some(name) = name else {
            tracing::warn!(archive = %archive_path.display(), index = i, "skipping unsafe archive entry");
            continue;
        };
        let relative = match &strip {
            Some(top) => match name.strip_prefix(top) {
                Ok(rest) if rest.as_os_str().is_empty() => continue,
                Ok(rest) => rest.to_path_buf(),
                Err(_) => name,
            },
            None => name,
        };
        let outpath = dest.join(relative);

        let mut entry = archive.by_index(i).map_err(archive_err)?;
        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| FsError::io(FsOp::CreateDir, &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FsError::io(FsOp::CreateDir, parent, e))?;
        }
        let mut outfile =
            File::create(&outpath).map_err(|e| FsError::io(FsOp::Write, &outpath, e))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| FsError::io(FsOp::Write, &outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                if let Err(err) =
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                {
                    tracing::warn!(
                        path = %outpath.display(),
                        mode = format_args!("{mode:o}"),
                        error = %err,
                        "failed to apply archive file mode"
                    );
                }
            }
        }
    }

    Ok(())
}

/// The single directory every entry sits under, if there is one.
fn common_top_level_dir<'a>(names: impl Iterator<Item = &'a PathBuf>) -> Option<PathBuf> {
    let mut top: Option<PathBuf> = None;
    let mut nested = false;
    for name in names {
        let mut components = name.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => PathBuf::from(first),
            _ => return None,
        };
        match &top {
            Some(existing) if *existing != first => return None,
            Some(_) => {}
            None => top = Some(first),
        }
        if components.next().is_some() {
            nested = true;
        }
    }
    if nested { top } else { None }
}
