//! Output directory provisioning.

use crate::errors::Result;
use std::path::Path;

/// Creates `path` and any missing parents. Existing directories are fine.
pub fn make_analysis_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)?;
    tracing::trace!(path = %path.display(), "Analysis directory ready");
    Ok(())
}
