pub(crate) mod config;
pub use config::{BucketConfig, Config, GridConfig, GridConfigError};

pub(crate) mod file_id;
pub use file_id::FileId;

pub(crate) mod chunk_key;
pub use chunk_key::ChunkKey;

pub(crate) mod chunk_size;
pub use chunk_size::{ChunkSize, ChunkSizeError, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

pub(crate) mod record;
pub use record::{DEFAULT_CONTENT_TYPE, FileInfo, Metadata};
