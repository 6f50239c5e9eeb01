use proptest::prelude::*;

use veranode_types::{ChainHash, Nullifier, RumorId, RumorState, Timestamp};

proptest! {
    /// Hex rendering is always 64 lowercase characters and parses back.
    #[test]
    fn chain_hash_hex_is_canonical(bytes in prop::array::uniform32(0u8..)) {
        let rendered = ChainHash::new(bytes).to_string();
        prop_assert_eq!(rendered.len(), 64);
        prop_assert!(rendered.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        let parsed = rendered.parse::<ChainHash>().unwrap();
        prop_assert_eq!(parsed.as_bytes(), &bytes);
    }

    /// Only the all-zero hash is the genesis value.
    #[test]
    fn genesis_only_for_zero(bytes in prop::array::uniform32(0u8..)) {
        prop_assert_eq!(ChainHash::new(bytes).is_genesis(), bytes == [0u8; 32]);
    }

    /// Nullifiers survive the storage encoding unchanged.
    #[test]
    fn nullifier_bincode_stable(bytes in prop::array::uniform32(0u8..)) {
        let n = Nullifier::new(bytes);
        let decoded: Nullifier = bincode::deserialize(&bincode::serialize(&n).unwrap()).unwrap();
        prop_assert_eq!(decoded, n);
    }

    /// Rumor ids order the same way as their hex form.
    #[test]
    fn rumor_id_order_matches_hex(a in prop::array::uniform16(0u8..), b in prop::array::uniform16(0u8..)) {
        let (ia, ib) = (RumorId::new(a), RumorId::new(b));
        prop_assert_eq!(ia.cmp(&ib), ia.to_string().cmp(&ib.to_string()));
    }

    /// A deadline has passed iff now is strictly later.
    #[test]
    fn has_passed_is_strict(deadline in 0u64..u64::MAX, now in 0u64..u64::MAX) {
        prop_assert_eq!(Timestamp::new(deadline).has_passed(Timestamp::new(now)), deadline < now);
    }

    /// The final flag always wins over the lock flag.
    #[test]
    fn final_flag_wins(locked in any::<bool>()) {
        prop_assert_eq!(RumorState::from_flags(locked, true), RumorState::Finalized);
    }
}
