//! Download stage: result object → local file.
//!
//! Chunks are written to `<dest>.part` and renamed over `dest` only after
//! the whole body arrived, so an interrupted download never leaves a
//! truncated file at the destination. An existing file at `dest` is
//! replaced.

use crate::error::TranslateError;
use crate::job::StorageLocation;
use crate::storage::ObjectStore;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Fetch `location` into `dest`. Returns the number of bytes written.
pub async fn download_to_file(
    store: &dyn ObjectStore,
    location: &StorageLocation,
    dest: &Path,
) -> Result<u64, TranslateError> {
    let write_err = |source: std::io::Error| TranslateError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source,
    };

    let mut stream = store.get_object(location).await?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = part_path(dest);
    let mut file = tokio::fs::File::create(&tmp_path).await.map_err(write_err)?;

    let mut written = 0u64;
    let copy_and_rename = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;
        drop(file);
        tokio::fs::rename(&tmp_path, dest).await.map_err(write_err)?;
        Ok::<(), TranslateError>(())
    };

    // Any failure, including the final rename, removes the partial file.
    if let Err(e) = copy_and_rename.await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    debug!("Renamed {} → {}", tmp_path.display(), dest.display());
    info!("File downloaded as {} ({} bytes)", dest.display(), written);
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "download".into());
    name.push(".part");
    dest.with_file_name(name)
}
