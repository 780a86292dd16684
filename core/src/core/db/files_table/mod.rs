use crate::core::db::error::DatabaseError;
use crate::types::FileId;
use crate::types::record::versioned_record::VersionedFileRecord;
use crate::types::record::versioned_record::latest_record::FileRecord;
use redb::{ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};

/// The `<prefix>.files` collection: `FileId → FileRecord`.
pub struct FilesTable {
    name: String,
}

impl FilesTable {
    pub fn new(prefix: &str) -> Self {
        Self {
            name: format!("{prefix}.files"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn definition(&self) -> TableDefinition<'_, FileId, VersionedFileRecord> {
        TableDefinition::new(&self.name)
    }

    pub fn init(&self, txn: &WriteTransaction) -> Result<(), DatabaseError> {
        txn.open_table(self.definition())?;
        Ok(())
    }

    pub fn insert(
        &self,
        txn: &WriteTransaction,
        id: &FileId,
        record: FileRecord,
    ) -> Result<(), DatabaseError> {
        let mut table = txn.open_table(self.definition())?;
        table.insert(id, &VersionedFileRecord::V1(record))?;
        Ok(())
    }

    pub fn contains(&self, txn: &WriteTransaction, id: &FileId) -> Result<bool, DatabaseError> {
        let table = txn.open_table(self.definition())?;
        Ok(table.get(id)?.is_some())
    }

    /// Returns `true` if the record was present.
    pub fn remove(&self, txn: &WriteTransaction, id: &FileId) -> Result<bool, DatabaseError> {
        let mut table = txn.open_table(self.definition())?;
        Ok(table.remove(id)?.is_some())
    }

    pub fn get(
        &self,
        txn: &ReadTransaction,
        id: &FileId,
    ) -> Result<Option<FileRecord>, DatabaseError> {
        let table = txn.open_table(self.definition())?;
        Ok(table.get(id)?.map(|guard| guard.value().into_latest()))
    }

    /// Returns every record in id order.
    pub fn all(&self, txn: &ReadTransaction) -> Result<Vec<(FileId, FileRecord)>, DatabaseError> {
        let table = txn.open_table(self.definition())?;
        let mut records = Vec::new();

        for entry in table.iter()? {
            let (id_guard, record_guard) = entry?;
            records.push((id_guard.value(), record_guard.value().into_latest()));
        }

        Ok(records)
    }
}
