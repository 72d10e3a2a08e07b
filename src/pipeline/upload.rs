//! Upload stage: local file → object store.

use crate::error::TranslateError;
use crate::job::StorageLocation;
use crate::storage::ObjectStore;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Upload `path` to `bucket`, under `key` or the file's own name.
///
/// Returns the location and the number of bytes written.
pub async fn upload_file(
    store: &dyn ObjectStore,
    path: &Path,
    bucket: &str,
    key: Option<&str>,
) -> Result<(StorageLocation, u64), TranslateError> {
    if bucket.trim().is_empty() {
        return Err(TranslateError::InvalidConfig(
            "Bucket name is required to upload a document".into(),
        ));
    }
    let key = match key {
        Some(k) => k.to_string(),
        None => default_object_key(path)?,
    };

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => TranslateError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => TranslateError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => TranslateError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let size = bytes.len() as u64;
    debug!("Read {} bytes from {}", size, path.display());

    let location = StorageLocation::new(bucket, key);
    store
        .put_object(&location, bytes, content_type_for(path))
        .await?;

    info!("Document uploaded to {}", location);
    Ok((location, size))
}

/// The object key used when none is given: the final path component.
pub fn default_object_key(path: &Path) -> Result<String, TranslateError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| TranslateError::FileNotFound {
            path: path.to_path_buf(),
        })
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
