use std::fmt;

use uuid::Uuid;

/// Opaque name an upload is stored under. Nothing of the original filename
/// survives except its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    pub id: Uuid,
    pub extension: Option<String>,
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extension {
            Some(ext) => write!(f, "{}.{}", self.id, ext),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Signature of the key generator injected into file stores.
pub type KeyGenerator = fn(&str) -> StorageKey;

pub fn generate_storage_key(original_filename: &str) -> StorageKey {
    StorageKey {
        id: Uuid::new_v4(),
        extension: extension_of(original_filename),
    }
}

/// Text after the last dot, kept only when it is plain ASCII alphanumerics.
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
}
