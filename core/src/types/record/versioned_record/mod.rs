use redb::TypeName;
pub use v1 as latest_record;

pub mod v1;

pub trait RecordVariant {
    const VERSION: u8;
}

#[derive(Debug, Clone)]
pub enum VersionedFileRecord {
    V1(v1::FileRecord),
}

impl VersionedFileRecord {
    pub fn into_latest(self) -> latest_record::FileRecord {
        match self {
            VersionedFileRecord::V1(v) => v,
        }
    }
}

impl redb::Value for VersionedFileRecord {
    type SelfType<'a> = VersionedFileRecord;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (version, data) = data.split_first().expect("empty data");
        match *version {
            v1::FileRecord::VERSION => {
                let v1 = postcard::from_bytes::<v1::FileRecord>(data).expect("invalid file record");
                VersionedFileRecord::V1(v1)
            }
            version => panic!("unsupported file record version: {}", version),
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        match value {
            VersionedFileRecord::V1(v1) => {
                postcard::to_extend(v1, vec![v1::FileRecord::VERSION]).unwrap()
            }
        }
    }

    fn type_name() -> TypeName {
        TypeName::new("grid::FileRecord")
    }
}

#[derive(Debug, Clone)]
pub enum VersionedChunk {
    V1(v1::Chunk),
}

impl VersionedChunk {
    pub fn into_latest(self) -> latest_record::Chunk {
        match self {
            VersionedChunk::V1(v) => v,
        }
    }
}

impl redb::Value for VersionedChunk {
    type SelfType<'a> = VersionedChunk;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (version, data) = data.split_first().expect("empty data");
        match *version {
            v1::Chunk::VERSION => {
                let v1 = postcard::from_bytes::<v1::Chunk>(data).expect("invalid chunk");
                VersionedChunk::V1(v1)
            }
            version => panic!("unsupported chunk version: {}", version),
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        match value {
            VersionedChunk::V1(v1) => {
                let mut out = Vec::with_capacity(v1.data.len() + 32);
                out.push(v1::Chunk::VERSION);
                postcard::to_extend(v1, out).unwrap()
            }
        }
    }

    fn type_name() -> TypeName {
        TypeName::new("grid::Chunk")
    }
}
