//! Product image upload store.
//!
//! Writes multipart image payloads under the configured upload directory
//! and returns the public reference path recorded on the product. The
//! directory is served statically under `/uploads`.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Filesystem error.
    #[error("upload I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded files on the local filesystem.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist an uploaded file and return its public reference path.
    ///
    /// The stored name is a UUID prefix plus the sanitized original name,
    /// so concurrent uploads of identically-named files never collide.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory cannot be created or
    /// the file cannot be written.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let path = self.dir.join(&file_name);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), "stored upload");
        Ok(format!("/uploads/{file_name}"))
    }
}

/// Reduce a client-supplied file name to a safe single path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // A name of only separators or an empty upload field gets a fallback.
    if cleaned.trim_matches(['_', '.']).is_empty() {
        "imagen".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_file_name("teclado-01.png"), "teclado-01.png");
    }

    #[test]
    fn test_sanitize_replaces_path_separators() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._.._etc_passwd");
        assert!(!sanitize_file_name("a/b\\c").contains('/'));
    }

    #[test]
    fn test_sanitize_empty_name_gets_fallback() {
        assert_eq!(sanitize_file_name(""), "imagen");
        assert_eq!(sanitize_file_name("///"), "imagen");
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_reference() {
        let dir = std::env::temp_dir().join(format!("shoplink-uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir);

        let reference = store.save("foto.png", b"png-bytes").await.unwrap();
        assert!(reference.starts_with("/uploads/"));
        assert!(reference.ends_with("foto.png"));

        let file_name = reference.strip_prefix("/uploads/").unwrap();
        let stored = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(stored, b"png-bytes");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
