use std::sync::Arc;

use proptest::prelude::*;
use veranode_lifecycle::{
    apply_points, decide_verdict, fallback_moderation, vote_weight, LifecycleEngine,
    LifecycleParams, ModerationRequest,
};
use veranode_nullables::{NullClock, NullOracle, NullStore};
use veranode_store::{Profile, RumorStore, VoteTally};
use veranode_types::{Area, ProfileId, RumorState, Secret, Timestamp, Verdict};

proptest! {
    #[test]
    fn weight_grows_with_points(points in -10_000i64..10_000, within in any::<bool>()) {
        prop_assert!(vote_weight(points + 1, within) > vote_weight(points, within));
    }

    #[test]
    fn inside_area_never_weighs_less_for_non_negative_points(points in 0i64..1_000_000) {
        prop_assert!(vote_weight(points, true) >= vote_weight(points, false));
    }

    #[test]
    fn fact_needs_strictly_more_weight(fact in 0.0f64..1e6, lie in 0.0f64..1e6) {
        let tally = VoteTally { total_votes: 1, fact_weight: fact, lie_weight: lie, ..VoteTally::default() };
        let expected = if fact > lie { Verdict::Fact } else { Verdict::Lie };
        prop_assert_eq!(decide_verdict(&tally), expected);
    }

    #[test]
    fn fallback_extends_exactly_inside_the_band(
        total in 1u64..500,
        fact in 0.0f64..1e5,
        lie in 0.0f64..1e5,
    ) {
        let request = ModerationRequest {
            content: "claim".to_string(),
            total_votes: total,
            fact_weight: fact,
            lie_weight: lie,
            under_area_votes: 0,
        };
        let verdict = fallback_moderation(&request);
        let in_band = request
            .fact_percentage()
            .map(|pct| (45.0..=55.0).contains(&pct))
            .unwrap_or(false);
        prop_assert_eq!(verdict.should_extend, in_band);
        prop_assert_eq!(verdict.is_ambiguous, in_band);
    }

    #[test]
    fn blocking_is_one_way(start in -500i64..500, deltas in prop::collection::vec(-60i64..20, 0..20)) {
        let mut profile = Profile {
            id: ProfileId::new([3; 16]),
            area: Area::General,
            points: start,
            is_blocked: false,
            created_at: Timestamp::new(0),
        };
        let mut blocked_once = false;
        for delta in deltas {
            let newly = apply_points(&mut profile, delta, -100);
            prop_assert!(!(newly && blocked_once));
            blocked_once |= newly;
            prop_assert_eq!(profile.is_blocked, blocked_once);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn lock_follows_within_area_share((total, within) in (1usize..16).prop_flat_map(|n| (Just(n), 0..=n))) {
        let store = Arc::new(NullStore::new());
        let engine = LifecycleEngine::new(
            store.clone(),
            Arc::new(NullOracle::finalizing()),
            LifecycleParams::default(),
        );
        let clock = NullClock::new(1_000_000);

        let author = engine.register_profile(Area::Nbs, clock.now()).unwrap();
        let rumor = engine
            .post_rumor(&author.id, &Secret::new("author"), "a claim about the campus", Area::Nbs, clock.now())
            .unwrap();
        for i in 0..total {
            let area = if i < within { Area::Nbs } else { Area::Asab };
            let voter = engine.register_profile(area, clock.now()).unwrap();
            engine
                .admit_vote(&voter.id, &Secret::new(format!("voter-{i}")), &rumor.id, Verdict::Fact, clock.now())
                .unwrap();
        }

        clock.advance_hours(49);
        engine.run_lock_tick(clock.now()).unwrap();

        let state = store.get_rumor(&rumor.id).unwrap().state();
        let expected = if within * 10 >= total * 3 { RumorState::Locked } else { RumorState::Active };
        prop_assert_eq!(state, expected);
    }
}
