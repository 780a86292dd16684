use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use super::RecordVariant;

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    pub length: u64,
    pub chunk_size: u32,
    pub upload_date: SystemTime,
    pub content_type: String,
    pub checksum: blake3::Hash,
    /// JSON object text.
    pub metadata: String,
}

impl RecordVariant for FileRecord {
    const VERSION: u8 = 1;
}

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub data: Vec<u8>,
}

impl RecordVariant for Chunk {
    const VERSION: u8 = 1;
}
