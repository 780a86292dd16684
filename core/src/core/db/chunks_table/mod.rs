//! The `<prefix>.chunks` collection.
//!
//! Chunks are keyed by [`ChunkKey`], so every chunk of one file sits in a
//! contiguous key range ordered by sequence.

use crate::core::db::error::DatabaseError;
use crate::types::record::versioned_record::VersionedChunk;
use crate::types::record::versioned_record::latest_record::Chunk;
use crate::types::{ChunkKey, FileId};
use redb::{ReadOnlyTable, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use std::collections::BTreeSet;
use uuid::Uuid;

pub struct ChunksTable {
    name: String,
}

impl ChunksTable {
    pub fn new(prefix: &str) -> Self {
        Self {
            name: format!("{prefix}.chunks"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn definition(&self) -> TableDefinition<'_, ChunkKey, VersionedChunk> {
        TableDefinition::new(&self.name)
    }

    pub fn init(&self, txn: &WriteTransaction) -> Result<(), DatabaseError> {
        txn.open_table(self.definition())?;
        Ok(())
    }

    /// Stores `data` under `key` with a freshly generated chunk id.
    pub fn insert(
        &self,
        txn: &WriteTransaction,
        key: &ChunkKey,
        data: Vec<u8>,
    ) -> Result<(), DatabaseError> {
        let mut table = txn.open_table(self.definition())?;
        let chunk = Chunk {
            id: Uuid::new_v4(),
            data,
        };
        table.insert(key, &VersionedChunk::V1(chunk))?;
        Ok(())
    }

    /// Removes every chunk of `file_id`. Returns how many were removed.
    pub fn remove_file(
        &self,
        txn: &WriteTransaction,
        file_id: FileId,
    ) -> Result<usize, DatabaseError> {
        let mut table = txn.open_table(self.definition())?;

        let keys = table
            .range(ChunkKey::first(file_id)..=ChunkKey::last(file_id))?
            .map(|entry| {
                let (key_guard, _) = entry?;
                Ok(key_guard.value())
            })
            .collect::<Result<Vec<ChunkKey>, DatabaseError>>()?;

        for key in &keys {
            table.remove(key)?;
        }

        Ok(keys.len())
    }

    /// Returns the distinct file ids referenced by stored chunks.
    pub fn file_ids(&self, txn: &WriteTransaction) -> Result<BTreeSet<FileId>, DatabaseError> {
        let table = txn.open_table(self.definition())?;
        let mut ids = BTreeSet::new();

        for entry in table.iter()? {
            let (key_guard, _) = entry?;
            ids.insert(key_guard.value().file_id);
        }

        Ok(ids)
    }

    /// Opens a reader over the chunks of `file_id` as seen by `txn`.
    pub fn reader(
        &self,
        txn: ReadTransaction,
        file_id: FileId,
    ) -> Result<ChunkReader, DatabaseError> {
        let table = txn.open_table(self.definition())?;
        Ok(ChunkReader {
            _txn: txn,
            table,
            file_id,
        })
    }
}

/// Read access to the chunks of one file, pinned to a single snapshot.
pub struct ChunkReader {
    _txn: ReadTransaction,
    table: ReadOnlyTable<ChunkKey, VersionedChunk>,
    file_id: FileId,
}

impl ChunkReader {
    pub fn get(&self, sequence: u32) -> Result<Option<Vec<u8>>, DatabaseError> {
        let key = ChunkKey::new(self.file_id, sequence);
        Ok(self
            .table
            .get(&key)?
            .map(|guard| guard.value().into_latest().data))
    }

    /// Returns `(sequence, data)` for every chunk, in sequence order.
    pub fn all(&self) -> Result<Vec<(u32, Vec<u8>)>, DatabaseError> {
        self.table
            .range(ChunkKey::first(self.file_id)..=ChunkKey::last(self.file_id))?
            .map(|entry| {
                let (key_guard, chunk_guard) = entry?;
                Ok((
                    key_guard.value().sequence,
                    chunk_guard.value().into_latest().data,
                ))
            })
            .collect()
    }

    pub fn count(&self) -> Result<usize, DatabaseError> {
        let mut count = 0;
        for entry in self
            .table
            .range(ChunkKey::first(self.file_id)..=ChunkKey::last(self.file_id))?
        {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}
