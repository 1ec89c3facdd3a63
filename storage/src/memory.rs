//! File store that keeps uploads in memory for tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use common::error::{AppError, Res};

use crate::{FileRef, FileStore, KeyGenerator, StorageCategory, Upload, generate_storage_key};

pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    generate_key: KeyGenerator,
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new(generate_storage_key)
    }
}

impl MemoryFileStore {
    pub fn new(generate_key: KeyGenerator) -> Self {
        MemoryFileStore {
            files: Mutex::new(HashMap::new()),
            generate_key,
        }
    }

    pub fn contents(&self, file: &FileRef) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(file.as_str()).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn store(&self, category: StorageCategory, upload: &Upload) -> Res<FileRef> {
        let key = (self.generate_key)(&upload.filename);
        let file = FileRef::new(category, &key);
        self.files
            .lock()
            .map_err(|_| AppError::Internal("file store poisoned".to_string()))?
            .insert(file.as_str().to_string(), upload.content.clone());
        Ok(file)
    }

    fn url(&self, file: &FileRef) -> String {
        format!("/media/{}", file.as_str())
    }
}
