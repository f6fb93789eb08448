use crate::naming::display_name_of;
use crate::storage::FileEntry;
use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StoredFile {
    #[serde(rename = "fileName")]
    pub storage_name: String,
    #[serde(rename = "originalName")]
    pub display_name: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "uploadDate")]
    pub modified_at: DateTime<Utc>,
}

impl From<FileEntry> for StoredFile {
    fn from(e: FileEntry) -> Self {
        Self {
            display_name: display_name_of(&e.storage_name),
            storage_name: e.storage_name,
            size_bytes: e.size_bytes,
            modified_at: e.modified_at,
        }
    }
}
