use thiserror::Error;

use veranode_store::StoreError;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted entry: {0}")]
    Corruption(String),

    #[error("schema: {0}")]
    Schema(String),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::NotFound(what) => StoreError::NotFound(what),
            LmdbError::Duplicate(what) => StoreError::Duplicate(what),
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            LmdbError::Corruption(msg) => StoreError::Corruption(msg),
            LmdbError::Heed(_) | LmdbError::Schema(_) => StoreError::Backend(e.to_string()),
        }
    }
}
