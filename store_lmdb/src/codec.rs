//! Value encoding and composite keys.

use serde::de::DeserializeOwned;
use serde::Serialize;

use veranode_types::{Nullifier, RumorId};

use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// `rumor_id || nullifier`, so one rumor's votes share a 16-byte prefix.
pub(crate) fn vote_key(rumor: &RumorId, nullifier: &Nullifier) -> [u8; 48] {
    let mut key = [0u8; 48];
    key[..16].copy_from_slice(rumor.as_bytes());
    key[16..].copy_from_slice(nullifier.as_bytes());
    key
}

/// Big-endian so LMDB's byte order is block id order.
pub(crate) fn block_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub(crate) fn decode_block_id(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corruption(format!("block id has {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

pub(crate) fn decode_rumor_id(bytes: &[u8]) -> Result<RumorId, LmdbError> {
    let arr: [u8; 16] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corruption(format!("rumor id has {} bytes", bytes.len())))?;
    Ok(RumorId::new(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_keys_sort_numerically() {
        assert!(block_key(2) < block_key(10));
        assert!(block_key(255) < block_key(256));
        assert_eq!(decode_block_id(&block_key(42)).unwrap(), 42);
    }

    #[test]
    fn vote_key_starts_with_rumor() {
        let rumor = RumorId::new([5; 16]);
        let key = vote_key(&rumor, &Nullifier::new([6; 32]));
        assert_eq!(&key[..16], rumor.as_bytes());
        assert_eq!(&key[16..], &[6u8; 32]);
    }

    #[test]
    fn short_block_id_is_corruption() {
        assert!(matches!(
            decode_block_id(&[1, 2, 3]),
            Err(LmdbError::Corruption(_))
        ));
    }
}
