use std::path::Path;

use crate::error::FetchError;
use crate::exclusion::ExclusionSet;
use crate::fs::Filesystem;
use crate::reconcile::TreeReconciler;

/// Copy a local directory tree into `dest`.
pub fn copy_tree(fs: &dyn Filesystem, src: &Path, dest: &Path) -> Result<(), FetchError> {
    if !fs.exists(src) {
        return Err(FetchError::SourceNotFound(src.to_path_buf()));
    }
    TreeReconciler::new(fs).merge_except(src, dest, &ExclusionSet::empty())?;
    Ok(())
}
