use std::path::PathBuf;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

pub mod key;

#[cfg(feature = "test-support")]
pub mod memory;

pub use key::{KeyGenerator, StorageKey, generate_storage_key};

/// Directory an upload is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCategory {
    Documents,
    ProfilePictures,
}

impl StorageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageCategory::Documents => "documents",
            StorageCategory::ProfilePictures => "profile_pics",
        }
    }
}

/// Relative path of a stored file, e.g. `documents/<uuid>.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(pub String);

impl FileRef {
    pub fn new(category: StorageCategory, key: &StorageKey) -> Self {
        FileRef(format!("{}/{}", category.as_str(), key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A decoded upload waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Upload {
    /// Decodes a standard base64 payload as sent in JSON submissions.
    pub fn from_base64(filename: &str, content_base64: &str) -> Res<Self> {
        let content = general_purpose::STANDARD
            .decode(content_base64.trim())
            .map_err(|e| AppError::BadRequest(format!("Base64 decode error: {}", e)))?;
        Ok(Upload {
            filename: filename.to_string(),
            content,
        })
    }

    pub fn extension(&self) -> Option<String> {
        key::extension_of(&self.filename).map(|ext| ext.to_lowercase())
    }
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists the upload under a freshly generated key.
    async fn store(&self, category: StorageCategory, upload: &Upload) -> Res<FileRef>;

    /// Public URL for a stored file.
    fn url(&self, file: &FileRef) -> String;
}

/// Writes uploads below a media root on the local filesystem.
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
    generate_key: KeyGenerator,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str, generate_key: KeyGenerator) -> Self {
        LocalFileStore {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            generate_key,
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, category: StorageCategory, upload: &Upload) -> Res<FileRef> {
        let key = (self.generate_key)(&upload.filename);
        let file = FileRef::new(category, &key);

        let dir = self.root.join(category.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(key.to_string()), &upload.content).await?;

        log::debug!("Stored {} bytes as {}", upload.content.len(), file.as_str());
        Ok(file)
    }

    fn url(&self, file: &FileRef) -> String {
        format!("{}/{}", self.base_url, file.as_str())
    }
}
