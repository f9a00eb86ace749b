//! Post-processing of consumed files: delete, or move into a dated
//! archive directory.

use std::io;
use std::path::Path;

use medipipe_core::PostProcessPolicy;

/// Apply `policy` to `path`. For the archive policy the target directory
/// is created on demand and the file keeps its name.
pub async fn apply(policy: &PostProcessPolicy, path: &Path) -> io::Result<()> {
    match policy {
        PostProcessPolicy::Remove => tokio::fs::remove_file(path).await,
        PostProcessPolicy::Archive { dir } => {
            tokio::fs::create_dir_all(dir).await?;
            let file_name = path.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
            })?;
            let target = dir.join(file_name);
            match tokio::fs::rename(path, &target).await {
                Ok(()) => Ok(()),
                // Rename fails across filesystems; fall back to copy + delete.
                Err(_) => {
                    tokio::fs::copy(path, &target).await?;
                    tokio::fs::remove_file(path).await
                }
            }
        }
    }
}
