//! The genesis link of the chain.

use veranode_types::ChainHash;

/// The `previous_block_hash` of the first block: 64 zero hex digits.
pub fn genesis_hash() -> ChainHash {
    ChainHash::GENESIS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_renders_as_zeros() {
        assert_eq!(genesis_hash().to_string(), "0".repeat(64));
        assert!(genesis_hash().is_genesis());
    }
}
