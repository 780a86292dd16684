use crate::types::file_id::{FILE_ID_LEN, FileId};
use redb::TypeName;
use std::cmp::Ordering;

const CHUNK_KEY_LEN: usize = FILE_ID_LEN + 4;

/// Position of one chunk within its file.
///
/// Encoded as the file id followed by the big-endian sequence, so a range scan
/// over a single file id yields its chunks in sequence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkKey {
    pub file_id: FileId,
    pub sequence: u32,
}

impl ChunkKey {
    pub fn new(file_id: FileId, sequence: u32) -> Self {
        Self { file_id, sequence }
    }

    /// Lowest possible key of `file_id`.
    pub fn first(file_id: FileId) -> Self {
        Self::new(file_id, 0)
    }

    /// Highest possible key of `file_id`.
    pub fn last(file_id: FileId) -> Self {
        Self::new(file_id, u32::MAX)
    }
}

fn split_key(data: &[u8]) -> (FileId, u32) {
    let (id, sequence) = data
        .split_first_chunk::<FILE_ID_LEN>()
        .expect("chunk key too short");
    let sequence: [u8; 4] = sequence.try_into().expect("invalid chunk key width");
    (FileId::from_raw(*id), u32::from_be_bytes(sequence))
}

impl redb::Key for ChunkKey {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        let (id1, seq1) = split_key(data1);
        let (id2, seq2) = split_key(data2);

        id1.cmp(&id2).then_with(|| seq1.cmp(&seq2))
    }
}

impl redb::Value for ChunkKey {
    type SelfType<'a> = ChunkKey;
    type AsBytes<'a> = [u8; CHUNK_KEY_LEN];

    fn fixed_width() -> Option<usize> {
        Some(CHUNK_KEY_LEN)
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (file_id, sequence) = split_key(data);
        ChunkKey { file_id, sequence }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        let mut bytes = [0u8; CHUNK_KEY_LEN];
        bytes[..FILE_ID_LEN].copy_from_slice(&value.file_id.to_raw());
        bytes[FILE_ID_LEN..].copy_from_slice(&value.sequence.to_be_bytes());
        bytes
    }

    fn type_name() -> TypeName {
        TypeName::new("grid::ChunkKey")
    }
}
