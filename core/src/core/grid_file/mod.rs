//! Read handle over one stored file.

use crate::core::db::chunks_table::ChunkReader;
use crate::core::error::GridError;
use crate::types::{FileId, FileInfo, Metadata};
use std::io;
use std::time::SystemTime;

/// A stored file, opened for reading.
///
/// `data()` materializes the whole file. `read()` and [`io::Read`] share a
/// forward-only cursor that pulls chunks lazily in sequence order. All reads
/// come from the snapshot the handle was opened in.
pub struct GridFile {
    info: FileInfo,
    chunks: ChunkReader,
    next_sequence: u32,
    /// Most recently fetched chunk and how much of it was consumed.
    current: Vec<u8>,
    current_pos: usize,
    offset: u64,
}

impl GridFile {
    pub(crate) fn new(info: FileInfo, chunks: ChunkReader) -> Self {
        Self {
            info,
            chunks,
            next_sequence: 0,
            current: Vec::new(),
            current_pos: 0,
            offset: 0,
        }
    }

    pub fn id(&self) -> FileId {
        self.info.id
    }

    pub fn filename(&self) -> &str {
        &self.info.filename
    }

    pub fn metadata(&self) -> &Metadata {
        &self.info.metadata
    }

    pub fn length(&self) -> u64 {
        self.info.length
    }

    pub fn chunk_size(&self) -> u32 {
        self.info.chunk_size
    }

    pub fn upload_date(&self) -> SystemTime {
        self.info.upload_date
    }

    pub fn content_type(&self) -> &str {
        &self.info.content_type
    }

    pub fn checksum(&self) -> &blake3::Hash {
        &self.info.checksum
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Bytes returned by the cursor so far.
    pub fn position(&self) -> u64 {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.info.length
    }
}

/// Eager reads.
impl GridFile {
    /// Returns the whole file content. Does not move the read cursor.
    pub fn data(&self) -> Result<Vec<u8>, GridError> {
        let mut data = Vec::with_capacity(self.info.length as usize);

        for (expected, (sequence, chunk)) in (0u32..).zip(self.chunks.all()?) {
            if sequence != expected {
                return Err(GridError::MissingChunk {
                    file_id: self.info.id,
                    sequence: expected,
                });
            }
            data.extend_from_slice(&chunk);
        }

        if data.len() as u64 != self.info.length {
            return Err(GridError::LengthMismatch {
                file_id: self.info.id,
                expected: self.info.length,
                actual: data.len() as u64,
            });
        }

        Ok(data)
    }

    /// Returns `true` if the stored content still matches its checksum.
    pub fn verify(&self) -> Result<bool, GridError> {
        let data = self.data()?;
        Ok(blake3::hash(&data) == self.info.checksum)
    }
}

/// Streaming reads.
impl GridFile {
    /// Reads up to `length` bytes from the cursor.
    ///
    /// Returns exactly `length` bytes unless the end of the file comes first,
    /// and `None` once the file is exhausted.
    pub fn read(&mut self, length: usize) -> Result<Option<Vec<u8>>, GridError> {
        if self.is_exhausted() {
            return Ok(None);
        }

        let remaining = (self.info.length - self.offset).min(length as u64) as usize;
        let mut out = Vec::with_capacity(remaining);

        while out.len() < length && self.fill()? {
            let available = &self.current[self.current_pos..];
            let take = available.len().min(length - out.len());
            out.extend_from_slice(&available[..take]);
            self.consume(take);
        }

        Ok(Some(out))
    }

    /// Makes sure the current chunk has unread bytes, fetching the next one
    /// if needed. Returns `false` at the end of the file.
    fn fill(&mut self) -> Result<bool, GridError> {
        if self.current_pos < self.current.len() {
            return Ok(true);
        }
        if self.is_exhausted() {
            return Ok(false);
        }

        let sequence = self.next_sequence;
        let chunk = self
            .chunks
            .get(sequence)?
            .ok_or(GridError::MissingChunk {
                file_id: self.info.id,
                sequence,
            })?;

        let remaining = self.info.length - self.offset;
        if chunk.is_empty() || chunk.len() as u64 > remaining {
            return Err(GridError::CorruptChunk {
                file_id: self.info.id,
                sequence,
            });
        }

        tracing::trace!(file_id = %self.info.id, sequence, len = chunk.len(), "fetched chunk");

        self.current = chunk;
        self.current_pos = 0;
        self.next_sequence += 1;
        Ok(true)
    }

    fn consume(&mut self, n: usize) {
        self.current_pos += n;
        self.offset += n as u64;
    }
}

impl io::Read for GridFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || !self.fill().map_err(io::Error::other)? {
            return Ok(0);
        }

        let available = &self.current[self.current_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}
