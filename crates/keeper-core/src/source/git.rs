//! Git exports via libgit2.

use std::path::Path;

use git2::Repository;
use git2::build::CheckoutBuilder;

use crate::error::FetchError;
use crate::fs::Filesystem;

/// Clone `url` into `dest`, check out `reference`, and drop the `.git` directory.
///
/// `reference` may be a branch, tag or commit. Branches that only exist on the
/// remote are looked up as `origin/<reference>`. Without a reference the
/// remote's default HEAD is used.
pub fn export_git(
    fs: &dyn Filesystem,
    url: &str,
    reference: Option<&str>,
    dest: &Path,
) -> Result<(), FetchError> {
    let git_err = |source| FetchError::Git {
        url: url.to_string(),
        source,
    };

    fs.ensure_dir(dest)?;
    let repo = Repository::clone(url, dest).map_err(git_err)?;

    if let Some(reference) = reference {
        let object = repo
            .revparse_single(reference)
            .or_else(|_| repo.revparse_single(&format!("origin/{reference}")))
            .map_err(git_err)?;
        let commit = object.peel_to_commit().map_err(git_err)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        repo.checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(git_err)?;
        repo.set_head_detached(commit.id()).map_err(git_err)?;
        tracing::debug!(%url, reference, commit = %commit.id(), "checked out reference");
    }
    drop(repo);

    fs.delete_dir_all(&dest.join(".git"))?;
    Ok(())
}
