//! Filesystem-backed media storage
//!
//! Stores uploaded files under a media root directory and builds the
//! absolute URLs they are served from.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::MediaConfig;
use crate::core::error::AppError;

/// Media storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    /// Absolute base the media prefix is appended to, e.g. `http://host:8000/media`
    public_url: String,
}

impl LocalStorage {
    /// Create the storage, making sure the root directory exists
    pub async fn new(config: &MediaConfig, public_base_url: &str) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.root).await?;

        let storage = Self {
            root: config.root.clone(),
            public_url: format!(
                "{}{}",
                public_base_url.trim_end_matches('/'),
                config.url_prefix
            ),
        };

        info!(
            "Media storage initialized at {} (served from {})",
            storage.root.display(),
            storage.public_url
        );

        Ok(storage)
    }

    /// Directory files are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a storage key under `folder`, e.g. `images/<name>.<ext>`
    pub fn generate_key(folder: &str, name: &str, extension: &str) -> String {
        format!("{}/{}.{}", folder.trim_matches('/'), name, extension)
    }

    /// Resolve a key to a path inside the root, refusing anything that escapes it
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(AppError::Internal(format!("Invalid storage key '{}'", key)));
        }

        Ok(self.root.join(relative))
    }

    /// Write a file under `key`, creating intermediate directories
    pub async fn upload(&self, key: &str, data: &[u8]) -> Result<String, AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        debug!("Stored file '{}' ({} bytes)", key, data.len());
        Ok(key.to_string())
    }

    /// Remove the file under `key`. A file that is already gone is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted file '{}'", key);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("File '{}' was already absent", key);
                Ok(())
            }
            Err(e) => Err(AppError::Storage(e)),
        }
    }

    /// Check whether a file exists under `key`
    pub async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    /// Absolute URL a stored file is served from
    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        let config = MediaConfig {
            root: dir.path().join("media"),
            url_prefix: "/media".to_string(),
        };
        LocalStorage::new(&config, "http://localhost:8000/")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_exists_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let key = LocalStorage::generate_key("images", "abc", "jpg");
        assert_eq!(key, "images/abc.jpg");

        storage.upload(&key, b"bytes").await.unwrap();
        assert!(storage.exists(&key).await.unwrap());
        assert_eq!(
            std::fs::read(storage.root().join(&key)).unwrap(),
            b"bytes".to_vec()
        );

        storage.delete(&key).await.unwrap();
        assert!(!storage.exists(&key).await.unwrap());

        // Deleting twice is fine
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        assert_eq!(
            storage.get_file_url("images/abc.jpg"),
            "http://localhost:8000/media/images/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_rejects_keys_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        for key in ["../escape.jpg", "/etc/passwd", "images/../../x", ""] {
            assert!(storage.upload(key, b"x").await.is_err(), "key {key}");
        }
    }
}
