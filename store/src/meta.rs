use crate::StoreError;

/// Trait for database metadata (schema version, arbitrary key/value).
pub trait MetaStore {
    fn get_schema_version(&self) -> Result<Option<u32>, StoreError>;
    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}
