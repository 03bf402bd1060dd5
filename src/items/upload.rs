// Local file storage for item images

use std::path::{Path, PathBuf};

use crate::error::ApiError;

/// URL prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/images";

/// A file received with an item submission
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Writes uploads into a single directory under their original names.
/// A second upload with the same name replaces the first.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Stores the file and returns the public path it is served under.
    pub async fn save(&self, file: &UploadedFile) -> Result<String, ApiError> {
        let name = sanitize_file_name(&file.file_name).ok_or_else(|| {
            ApiError::BadRequest(format!("Invalid upload file name: {:?}", file.file_name))
        })?;

        let target = self.dir.join(&name);
        tokio::fs::write(&target, &file.data)
            .await
            .map_err(ApiError::UploadError)?;

        tracing::info!("Stored upload {} ({} bytes)", target.display(), file.data.len());
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    /// Deletes a file stored by `save`, given the public path it returned.
    /// Failures are only logged.
    pub async fn discard(&self, public_path: &str) {
        let Some(name) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(sanitize_file_name)
        else {
            tracing::warn!("Refusing to discard {:?}: not an upload path", public_path);
            return;
        };

        let target = self.dir.join(name);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => tracing::info!("Discarded upload {}", target.display()),
            Err(e) => tracing::warn!("Failed to discard upload {}: {}", target.display(), e),
        }
    }
}

/// Keeps only the final path component so a client cannot write outside
/// the upload directory.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let normalized = raw.replace('\\', "/");
    let name = Path::new(&normalized).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> UploadStore {
        UploadStore::new(std::env::temp_dir().join(format!("uploads-{}", uuid::Uuid::new_v4())))
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("sofa.jpg").as_deref(), Some("sofa.jpg"));
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("C:\\photos\\lamp.png").as_deref(), Some("lamp.png"));
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name(".."), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_same_name() {
        let store = temp_store();
        store.ensure_dir().await.unwrap();

        let first = UploadedFile {
            file_name: "chair.jpg".to_string(),
            data: b"first".to_vec(),
        };
        let second = UploadedFile {
            file_name: "chair.jpg".to_string(),
            data: b"second".to_vec(),
        };

        assert_eq!(store.save(&first).await.unwrap(), "/images/chair.jpg");
        store.save(&second).await.unwrap();

        let stored = tokio::fs::read(store.dir().join("chair.jpg")).await.unwrap();
        assert_eq!(stored, b"second");

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_discard_removes_saved_file() {
        let store = temp_store();
        store.ensure_dir().await.unwrap();

        let file = UploadedFile {
            file_name: "lamp.png".to_string(),
            data: b"lamp".to_vec(),
        };
        let public_path = store.save(&file).await.unwrap();
        store.discard(&public_path).await;
        assert!(!store.dir().join("lamp.png").exists());

        // Paths outside the upload prefix are left alone
        store.discard("/etc/passwd").await;

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_empty_name() {
        let store = temp_store();
        let file = UploadedFile {
            file_name: String::new(),
            data: vec![1, 2, 3],
        };
        assert!(matches!(store.save(&file).await, Err(ApiError::BadRequest(_))));
    }
}
