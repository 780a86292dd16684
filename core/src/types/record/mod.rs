//! Public file description types for consumers.
//!
//! Stored records live in [`versioned_record`]; [`FileInfo`] is what the grid
//! hands out after decoding one.

use crate::types::file_id::FileId;
use std::time::SystemTime;

pub(crate) mod versioned_record;

use versioned_record::latest_record;

/// Caller-supplied metadata attached to a file.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Content type recorded when the caller does not pick one.
pub const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

/// Description of one stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub id: FileId,
    pub filename: String,
    pub length: u64,
    pub chunk_size: u32,
    pub upload_date: SystemTime,
    pub content_type: String,
    pub checksum: blake3::Hash,
    pub metadata: Metadata,
}

impl FileInfo {
    pub(crate) fn from_record(
        id: FileId,
        record: latest_record::FileRecord,
    ) -> Result<Self, serde_json::Error> {
        let metadata = serde_json::from_str(&record.metadata)?;

        Ok(Self {
            id,
            filename: record.filename,
            length: record.length,
            chunk_size: record.chunk_size,
            upload_date: record.upload_date,
            content_type: record.content_type,
            checksum: record.checksum,
            metadata,
        })
    }

    /// Number of chunks the file is stored in.
    pub fn chunk_count(&self) -> u64 {
        self.length.div_ceil(u64::from(self.chunk_size))
    }
}
