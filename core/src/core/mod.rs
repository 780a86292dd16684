//! Grid storage: files split into chunks over the database layer.

use crate::core::db::error::DatabaseError;
use crate::core::db::{Bucket, Database};
use crate::types::record::versioned_record::latest_record::FileRecord;
use crate::types::{
    ChunkSize, Config, DEFAULT_CONTENT_TYPE, FileId, FileInfo, GridConfig, Metadata,
};
use error::GridError;
use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

pub mod db;
mod grid_file;

pub use grid_file::GridFile;

pub mod error {
    use crate::core::db::error::DatabaseError;
    use crate::types::FileId;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum GridError {
        #[error("Database error: {0}")]
        Database(#[from] DatabaseError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Metadata error: {0}")]
        Metadata(#[from] serde_json::Error),

        #[error("File not found: {0}")]
        NotFound(FileId),

        #[error("File already exists: {0}")]
        AlreadyExists(FileId),

        #[error("Chunk {sequence} of file {file_id} is missing")]
        MissingChunk { file_id: FileId, sequence: u32 },

        #[error("Chunk {sequence} of file {file_id} is corrupt")]
        CorruptChunk { file_id: FileId, sequence: u32 },

        #[error("File {file_id} holds {actual} bytes, expected {expected}")]
        LengthMismatch {
            file_id: FileId,
            expected: u64,
            actual: u64,
        },
    }
}

/// Options for [`Grid::put`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Overrides the grid's default chunk size.
    pub chunk_size: Option<ChunkSize>,
    pub metadata: Metadata,
    /// Stores the file under this id instead of a generated one.
    pub id: Option<FileId>,
    pub content_type: Option<String>,
}

impl PutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(mut self, id: FileId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Result of [`Grid::sweep_orphans`].
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// File ids that had chunks but no record.
    pub orphaned_files: Vec<FileId>,
    pub chunks_removed: usize,
}

/// Stores files as chunk documents plus one record per file.
pub struct Grid {
    db: Arc<Database>,
    bucket: Bucket,
    default_chunk_size: ChunkSize,
}

impl Grid {
    /// Binds a grid to the `<prefix>.files` / `<prefix>.chunks` collections of `db`.
    pub fn new(db: Arc<Database>, prefix: &str) -> Result<Self, GridError> {
        let bucket = db.bucket(prefix)?;
        tracing::debug!(
            files = bucket.files_name(),
            chunks = bucket.chunks_name(),
            "opened grid bucket"
        );

        Ok(Self {
            db,
            bucket,
            default_chunk_size: ChunkSize::default(),
        })
    }

    /// Opens the database under `config` and binds the configured bucket.
    pub fn open(config: &Config, grid_config: &GridConfig) -> Result<Self, GridError> {
        let errors = grid_config.validate();
        if !errors.is_empty() {
            tracing::warn!(?errors, "invalid grid config, using defaults for invalid values");
        }
        let settings = grid_config.with_defaults_for_invalid();

        let db = Arc::new(Database::new(config)?);
        let chunk_size = ChunkSize::try_new(settings.bucket.chunk_size).unwrap_or_default();

        Ok(Self::new(db, &settings.bucket.prefix)?.with_default_chunk_size(chunk_size))
    }

    pub fn with_default_chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.default_chunk_size = chunk_size;
        self
    }

    pub fn prefix(&self) -> &str {
        self.bucket.prefix()
    }

    pub fn default_chunk_size(&self) -> ChunkSize {
        self.default_chunk_size
    }
}

/// Write operations.
impl Grid {
    /// Stores everything `reader` yields as one file and returns its id.
    ///
    /// The chunks and the record are committed together: if the reader or
    /// the store fails midway, nothing of the file is kept.
    pub fn put<R: Read>(
        &self,
        mut reader: R,
        filename: &str,
        options: PutOptions,
    ) -> Result<FileId, GridError> {
        let PutOptions {
            chunk_size,
            metadata,
            id,
            content_type,
        } = options;

        let file_id = id.unwrap_or_else(FileId::generate);
        let chunk_size = chunk_size.unwrap_or(self.default_chunk_size);
        let metadata = serde_json::to_string(&metadata)?;

        let mut upload = match self.db.begin_upload(&self.bucket, file_id) {
            Err(DatabaseError::AlreadyExists) => return Err(GridError::AlreadyExists(file_id)),
            result => result?,
        };

        let mut hasher = blake3::Hasher::new();
        let mut length = 0u64;

        loop {
            let mut piece = Vec::with_capacity(chunk_size.as_usize());
            let n = (&mut reader)
                .take(u64::from(chunk_size.into_inner()))
                .read_to_end(&mut piece)?;
            if n == 0 {
                break;
            }

            hasher.update(&piece);
            length += n as u64;
            upload.push_chunk(piece)?;

            if n < chunk_size.as_usize() {
                break;
            }
        }

        let chunks = upload.chunk_count();
        upload.commit(FileRecord {
            filename: filename.to_string(),
            length,
            chunk_size: chunk_size.into_inner(),
            upload_date: SystemTime::now(),
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            checksum: hasher.finalize(),
            metadata,
        })?;

        tracing::debug!(%file_id, filename, length, chunks, "stored file");
        Ok(file_id)
    }

    /// Stores an in-memory buffer as one file.
    pub fn put_bytes(
        &self,
        data: &[u8],
        filename: &str,
        options: PutOptions,
    ) -> Result<FileId, GridError> {
        self.put(data, filename, options)
    }
}

/// Read operations.
impl Grid {
    /// Opens the file for reading.
    ///
    /// Returns `Err(NotFound)` if no record has this id.
    pub fn get(&self, file_id: &FileId) -> Result<GridFile, GridError> {
        let (record, chunks) = self
            .db
            .open_file(&self.bucket, file_id)?
            .ok_or(GridError::NotFound(*file_id))?;

        let info = FileInfo::from_record(*file_id, record)?;
        tracing::debug!(%file_id, length = info.length, "opened file");
        Ok(GridFile::new(info, chunks))
    }

    pub fn exists(&self, file_id: &FileId) -> Result<bool, GridError> {
        Ok(self.db.file(&self.bucket, file_id)?.is_some())
    }

    /// Number of chunks stored under `file_id`, whether or not a record exists.
    pub fn chunk_count(&self, file_id: &FileId) -> Result<usize, GridError> {
        Ok(self.db.chunk_count(&self.bucket, file_id)?)
    }

    /// Returns every file of the bucket in id order.
    pub fn list(&self) -> Result<Vec<FileInfo>, GridError> {
        self.db
            .files(&self.bucket)?
            .into_iter()
            .map(|(id, record)| FileInfo::from_record(id, record).map_err(GridError::from))
            .collect()
    }

    /// Returns files stored under `filename`, newest first.
    pub fn find_by_filename(&self, filename: &str) -> Result<Vec<FileInfo>, GridError> {
        let mut files: Vec<FileInfo> = self
            .list()?
            .into_iter()
            .filter(|info| info.filename == filename)
            .collect();

        files.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(files)
    }
}

/// Delete operations.
impl Grid {
    /// Removes the file record and all of its chunks.
    ///
    /// Deleting an id that does not exist succeeds without doing anything.
    pub fn delete(&self, file_id: &FileId) -> Result<(), GridError> {
        let outcome = self.db.remove_file(&self.bucket, file_id)?;
        tracing::debug!(
            %file_id,
            file_removed = outcome.file_removed,
            chunks_removed = outcome.chunks_removed,
            "deleted file"
        );
        Ok(())
    }
}

/// Maintenance operations.
impl Grid {
    /// Removes chunks that belong to no file record.
    pub fn sweep_orphans(&self) -> Result<SweepOutcome, GridError> {
        let removed = self.db.remove_orphaned_chunks(&self.bucket)?;

        let mut outcome = SweepOutcome::default();
        for (file_id, count) in removed {
            outcome.orphaned_files.push(file_id);
            outcome.chunks_removed += count;
        }

        if outcome.chunks_removed > 0 {
            tracing::info!(
                bucket = self.prefix(),
                files = outcome.orphaned_files.len(),
                chunks = outcome.chunks_removed,
                "removed orphaned chunks"
            );
        }

        Ok(outcome)
    }
}
