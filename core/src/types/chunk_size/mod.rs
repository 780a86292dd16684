use nutype::nutype;

/// Chunk size used when neither the grid nor the caller picks one (256 KiB).
pub const DEFAULT_CHUNK_SIZE: u32 = 256 * 1024;

/// Largest accepted chunk size (16 MiB).
pub const MAX_CHUNK_SIZE: u32 = 16 * 1024 * 1024;

/// Number of bytes stored per chunk.
#[nutype(
    validate(greater = 0, less_or_equal = MAX_CHUNK_SIZE),
    default = DEFAULT_CHUNK_SIZE,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Default,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct ChunkSize(u32);

impl ChunkSize {
    pub fn as_usize(&self) -> usize {
        self.into_inner() as usize
    }
}
