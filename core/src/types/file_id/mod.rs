use redb::TypeName;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Width of an encoded [`FileId`] in bytes.
pub const FILE_ID_LEN: usize = 16;

/// Opaque identifier of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(Uuid);

impl FileId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub(crate) fn to_raw(self) -> [u8; FILE_ID_LEN] {
        *self.0.as_bytes()
    }

    pub(crate) fn from_raw(data: [u8; FILE_ID_LEN]) -> Self {
        Self(Uuid::from_bytes(data))
    }
}

impl From<Uuid> for FileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<FileId> for Uuid {
    fn from(id: FileId) -> Self {
        id.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl redb::Key for FileId {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        data1.cmp(data2)
    }
}

impl redb::Value for FileId {
    type SelfType<'a> = FileId;
    type AsBytes<'a> = [u8; FILE_ID_LEN];

    fn fixed_width() -> Option<usize> {
        Some(FILE_ID_LEN)
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let bytes: [u8; FILE_ID_LEN] = data.try_into().expect("invalid file id width");
        FileId::from_raw(bytes)
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.to_raw()
    }

    fn type_name() -> TypeName {
        TypeName::new("grid::FileId")
    }
}
