//! SHA-256 hashing for ledger blocks and nullifiers.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
///
/// Equivalent to hashing the concatenation of `parts`.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-256 of `data` as 64 lowercase hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_deterministic() {
        assert_eq!(sha256(b"hello veranode"), sha256(b"hello veranode"));
    }

    #[test]
    fn sha256_different_inputs() {
        assert_ne!(sha256(b"hello"), sha256(b"world"));
    }

    #[test]
    fn sha256_multi_equivalent() {
        let single = sha256(b"helloworld");
        let multi = sha256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }
}
