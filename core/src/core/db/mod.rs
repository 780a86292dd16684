//! Database layer for grid storage.
//!
//! This module handles all redb operations:
//! - Per-bucket collections (`<prefix>.files`, `<prefix>.chunks`)
//! - Transactional uploads (chunks and record commit together)
//! - Snapshot reads for streaming

use crate::core::db::chunks_table::{ChunkReader, ChunksTable};
use crate::core::db::error::DatabaseError;
use crate::core::db::files_table::FilesTable;
use crate::types::record::versioned_record::latest_record::FileRecord;
use crate::types::{ChunkKey, Config, FileId};
use redb::{ReadableDatabase, WriteTransaction};

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DatabaseError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("File already exists")]
        AlreadyExists,

        #[error("Too many chunks for one file")]
        SequenceOverflow,
    }
}

pub(crate) mod chunks_table;
pub(crate) mod files_table;

/// The database shared by every grid opened on it.
pub struct Database {
    db: redb::Database,
}

/// The pair of collections backing one grid.
pub(crate) struct Bucket {
    prefix: String,
    files: FilesTable,
    chunks: ChunksTable,
}

impl Bucket {
    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn files_name(&self) -> &str {
        self.files.name()
    }

    pub(crate) fn chunks_name(&self) -> &str {
        self.chunks.name()
    }
}

/// Documents removed by [`Database::remove_file`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RemoveOutcome {
    pub file_removed: bool,
    pub chunks_removed: usize,
}

impl Database {
    /// Creates or opens the database at the configured path.
    pub fn new(config: &Config) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&config.base_path)?;

        let db = redb::Database::create(config.db_path())?;
        Ok(Self { db })
    }

    /// Returns the bucket for `prefix`, creating its collections if missing.
    pub(crate) fn bucket(&self, prefix: &str) -> Result<Bucket, DatabaseError> {
        let bucket = Bucket {
            prefix: prefix.to_string(),
            files: FilesTable::new(prefix),
            chunks: ChunksTable::new(prefix),
        };

        let write_txn = self.db.begin_write()?;
        bucket.files.init(&write_txn)?;
        bucket.chunks.init(&write_txn)?;
        write_txn.commit()?;

        Ok(bucket)
    }
}

/// Write operations.
impl Database {
    /// Starts writing a new file.
    ///
    /// Returns `Err(AlreadyExists)` if a record with `file_id` exists.
    /// Nothing becomes visible until [`Upload::commit`]; dropping the upload
    /// discards every chunk pushed so far.
    pub(crate) fn begin_upload<'b>(
        &self,
        bucket: &'b Bucket,
        file_id: FileId,
    ) -> Result<Upload<'b>, DatabaseError> {
        let txn = self.db.begin_write()?;

        if bucket.files.contains(&txn, &file_id)? {
            return Err(DatabaseError::AlreadyExists);
        }

        Ok(Upload {
            txn,
            bucket,
            file_id,
            next_sequence: 0,
        })
    }
}

/// An in-progress file write.
pub(crate) struct Upload<'b> {
    txn: WriteTransaction,
    bucket: &'b Bucket,
    file_id: FileId,
    next_sequence: u32,
}

impl Upload<'_> {
    /// Number of chunks pushed so far.
    pub(crate) fn chunk_count(&self) -> u32 {
        self.next_sequence
    }

    /// Appends the next chunk.
    pub(crate) fn push_chunk(&mut self, data: Vec<u8>) -> Result<(), DatabaseError> {
        let key = ChunkKey::new(self.file_id, self.next_sequence);
        self.bucket.chunks.insert(&self.txn, &key, data)?;

        self.next_sequence = self
            .next_sequence
            .checked_add(1)
            .ok_or(DatabaseError::SequenceOverflow)?;
        Ok(())
    }

    /// Writes the file record and commits the chunks with it.
    pub(crate) fn commit(self, record: FileRecord) -> Result<(), DatabaseError> {
        self.bucket.files.insert(&self.txn, &self.file_id, record)?;
        self.txn.commit()?;
        Ok(())
    }
}

/// Read operations.
impl Database {
    pub(crate) fn file(
        &self,
        bucket: &Bucket,
        file_id: &FileId,
    ) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        bucket.files.get(&read_txn, file_id)
    }

    /// Returns the record and a chunk reader taken from the same snapshot.
    pub(crate) fn open_file(
        &self,
        bucket: &Bucket,
        file_id: &FileId,
    ) -> Result<Option<(FileRecord, ChunkReader)>, DatabaseError> {
        let read_txn = self.db.begin_read()?;

        let Some(record) = bucket.files.get(&read_txn, file_id)? else {
            return Ok(None);
        };

        let chunks = bucket.chunks.reader(read_txn, *file_id)?;
        Ok(Some((record, chunks)))
    }

    /// Returns every record of the bucket in id order.
    pub(crate) fn files(
        &self,
        bucket: &Bucket,
    ) -> Result<Vec<(FileId, FileRecord)>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        bucket.files.all(&read_txn)
    }

    /// Number of chunks currently stored for `file_id`, with or without a record.
    pub(crate) fn chunk_count(
        &self,
        bucket: &Bucket,
        file_id: &FileId,
    ) -> Result<usize, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        bucket.chunks.reader(read_txn, *file_id)?.count()
    }
}

/// Delete operations.
impl Database {
    /// Removes the record and all chunks of `file_id` in one transaction.
    ///
    /// Removing an id that has no documents is not an error.
    pub(crate) fn remove_file(
        &self,
        bucket: &Bucket,
        file_id: &FileId,
    ) -> Result<RemoveOutcome, DatabaseError> {
        let write_txn = self.db.begin_write()?;

        let file_removed = bucket.files.remove(&write_txn, file_id)?;
        let chunks_removed = bucket.chunks.remove_file(&write_txn, *file_id)?;

        write_txn.commit()?;
        Ok(RemoveOutcome {
            file_removed,
            chunks_removed,
        })
    }
}

/// Maintenance operations.
impl Database {
    /// Removes chunks whose file id has no record.
    ///
    /// Returns each affected file id with the number of chunks removed.
    pub(crate) fn remove_orphaned_chunks(
        &self,
        bucket: &Bucket,
    ) -> Result<Vec<(FileId, usize)>, DatabaseError> {
        let write_txn = self.db.begin_write()?;
        let mut removed = Vec::new();

        for file_id in bucket.chunks.file_ids(&write_txn)? {
            if !bucket.files.contains(&write_txn, &file_id)? {
                let count = bucket.chunks.remove_file(&write_txn, file_id)?;
                removed.push((file_id, count));
            }
        }

        write_txn.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
impl Database {
    /// Stores chunks for `file_id` without writing a record.
    pub(crate) fn insert_orphan_chunks(
        &self,
        bucket: &Bucket,
        file_id: FileId,
        pieces: &[&[u8]],
    ) -> Result<(), DatabaseError> {
        let write_txn = self.db.begin_write()?;
        for (sequence, piece) in (0u32..).zip(pieces) {
            let key = ChunkKey::new(file_id, sequence);
            bucket.chunks.insert(&write_txn, &key, piece.to_vec())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
