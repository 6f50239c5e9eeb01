//! The lifecycle engine: member-facing operations plus the two ticks.

use std::sync::Arc;
use std::time::Instant;

use veranode_crypto::{generate_profile_id, generate_rumor_id, rumor_nullifier, vote_nullifier};
use veranode_ledger as ledger;
use veranode_store::{
    LifecycleStore, Profile, Rumor, RumorStore, StoreError, Vote, VoteStore, VoteTally,
    WriteBatch,
};
use veranode_types::{Area, ProfileId, RumorId, RumorState, Secret, Timestamp, Verdict};

use crate::access::{require_admin, require_member_in_good_standing, Principal};
use crate::admission::{validate_content, AdmittedVote};
use crate::moderation::{fallback_moderation, ModerationOracle, ModerationRequest, ModerationVerdict};
use crate::params::{FinalizeFailurePolicy, LifecycleParams};
use crate::reputation::{apply_points, decide_verdict};
use crate::weight::vote_weight;
use crate::{AdmissionError, LifecycleError};

/// Outcome of one lock tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LockTickReport {
    /// ACTIVE rumors whose deadline had passed.
    pub examined: usize,
    pub locked: Vec<RumorId>,
    /// Past deadline but without enough within-area votes; left ACTIVE.
    pub below_threshold: Vec<RumorId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedRumor {
    pub rumor_id: RumorId,
    pub decision: Verdict,
    /// `None` only under [`FinalizeFailurePolicy::BestEffort`] after a ledger failure.
    pub block_id: Option<u64>,
}

/// Outcome of one finalize tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinalizeTickReport {
    /// LOCKED, non-final rumors considered.
    pub examined: usize,
    pub extended: Vec<RumorId>,
    pub finalized: Vec<FinalizedRumor>,
    pub oracle_fallbacks: usize,
    pub votes_erased: usize,
    pub profiles_blocked: Vec<ProfileId>,
    pub ledger_failures: Vec<RumorId>,
    /// Changed by another writer between moderation and the batch.
    pub skipped: Vec<RumorId>,
}

pub struct LifecycleEngine<S> {
    store: Arc<S>,
    oracle: Arc<dyn ModerationOracle>,
    params: LifecycleParams,
}

impl<S: LifecycleStore> LifecycleEngine<S> {
    pub fn new(store: Arc<S>, oracle: Arc<dyn ModerationOracle>, params: LifecycleParams) -> Self {
        Self {
            store,
            oracle,
            params,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn params(&self) -> &LifecycleParams {
        &self.params
    }

    // ── Member-facing operations ────────────────────────────────────────

    /// Create a profile with the initial reputation.
    pub fn register_profile(&self, area: Area, now: Timestamp) -> Result<Profile, AdmissionError> {
        let profile = Profile {
            id: generate_profile_id()?,
            area,
            points: self.params.initial_points,
            is_blocked: false,
            created_at: now,
        };
        let mut batch = self.store.write_batch()?;
        batch.put_profile(&profile)?;
        batch.commit()?;
        tracing::info!(profile = %profile.id, area = %area, "registered profile");
        Ok(profile)
    }

    /// Post a new ACTIVE rumor on behalf of `author`.
    pub fn post_rumor(
        &self,
        author: &ProfileId,
        secret: &Secret,
        content: &str,
        area: Area,
        now: Timestamp,
    ) -> Result<Rumor, AdmissionError> {
        let mut batch = self.store.write_batch()?;
        require_member_in_good_standing(&batch, author)?;
        let content = validate_content(content)?;

        let id = generate_rumor_id()?;
        let rumor = Rumor {
            id,
            author: *author,
            content: content.to_string(),
            area_of_vote: area,
            posted_at: now,
            voting_ends_at: now.plus_secs(self.params.voting_duration_secs),
            is_locked: false,
            is_final: false,
            final_decision: None,
            nullifier: rumor_nullifier(secret, &id),
            previous_hash: None,
            current_hash: None,
        };
        match batch.insert_rumor(&rumor) {
            Err(StoreError::Duplicate(_)) => return Err(AdmissionError::DuplicateRumor),
            other => other?,
        }
        batch.commit()?;

        tracing::info!(rumor = %rumor.id, area = %area, ends = %rumor.voting_ends_at, "rumor posted");
        Ok(rumor)
    }

    /// Admit one vote. The weight is fixed here from the voter's current
    /// points and never recomputed.
    pub fn admit_vote(
        &self,
        voter: &ProfileId,
        secret: &Secret,
        rumor_id: &RumorId,
        vote_type: Verdict,
        now: Timestamp,
    ) -> Result<AdmittedVote, AdmissionError> {
        let mut batch = self.store.write_batch()?;
        let profile = require_member_in_good_standing(&batch, voter)?;

        let rumor = match batch.get_rumor(rumor_id) {
            Ok(rumor) => rumor,
            Err(e) if e.is_not_found() => return Err(AdmissionError::RumorNotFound(*rumor_id)),
            Err(e) => return Err(e.into()),
        };
        if !rumor.is_open_for_votes(now) {
            return Err(AdmissionError::VotingClosed(*rumor_id));
        }

        let nullifier = vote_nullifier(secret, rumor_id);
        if batch.get_vote(rumor_id, &nullifier)?.is_some() {
            return Err(AdmissionError::AlreadyVoted);
        }

        let is_within_area = profile.area == rumor.area_of_vote;
        let weight = vote_weight(profile.points, is_within_area);
        let vote = Vote {
            rumor_id: *rumor_id,
            profile_id: *voter,
            nullifier,
            vote_type,
            weight,
            is_within_area,
            timestamp: now,
        };
        match batch.insert_vote(&vote) {
            Err(StoreError::Duplicate(_)) => return Err(AdmissionError::AlreadyVoted),
            other => other?,
        }
        batch.commit()?;

        tracing::debug!(rumor = %rumor_id, weight, is_within_area, "vote admitted");
        Ok(AdmittedVote {
            nullifier,
            weight,
            is_within_area,
        })
    }

    /// Whether the holder of `secret` has a stored vote on the rumor.
    /// Says nothing about its direction.
    pub fn has_voted(&self, secret: &Secret, rumor_id: &RumorId) -> Result<bool, StoreError> {
        self.store
            .vote_store()
            .has_vote(rumor_id, &vote_nullifier(secret, rumor_id))
    }

    /// Administrative override: clear a profile's block. Points are untouched.
    pub fn unblock_profile(
        &self,
        principal: &Principal,
        profile_id: &ProfileId,
    ) -> Result<Profile, LifecycleError> {
        require_admin(principal)?;
        let mut batch = self.store.write_batch()?;
        let mut profile = batch.get_profile(profile_id)?;
        if !profile.is_blocked {
            return Err(LifecycleError::NotBlocked(*profile_id));
        }
        profile.is_blocked = false;
        batch.put_profile(&profile)?;
        batch.commit()?;
        tracing::info!(profile = %profile_id, points = profile.points, "profile unblocked by admin");
        Ok(profile)
    }

    // ── Ticks ───────────────────────────────────────────────────────────

    /// ACTIVE -> LOCKED for every rumor past its deadline whose within-area
    /// vote share reaches the threshold. A rumor without votes never locks.
    pub fn run_lock_tick(&self, now: Timestamp) -> Result<LockTickReport, LifecycleError> {
        let started = Instant::now();
        let mut batch = self.store.write_batch()?;
        let mut report = LockTickReport::default();

        let candidates: Vec<Rumor> = batch
            .iter_rumors()?
            .into_iter()
            .filter(|r| r.state() == RumorState::Active && r.voting_ends_at.has_passed(now))
            .collect();
        report.examined = candidates.len();

        for mut rumor in candidates {
            let tally = VoteTally::from_votes(&batch.votes_for_rumor(&rumor.id)?);
            match tally.within_area_ratio() {
                Some(ratio) if ratio >= self.params.within_area_threshold => {
                    rumor.is_locked = true;
                    batch.put_rumor(&rumor)?;
                    tracing::info!(rumor = %rumor.id, ratio, votes = tally.total_votes, "rumor locked");
                    report.locked.push(rumor.id);
                }
                ratio => {
                    tracing::debug!(
                        rumor = %rumor.id,
                        ?ratio,
                        overdue_secs = rumor.voting_ends_at.elapsed_since(now),
                        "deadline passed, within-area share below threshold"
                    );
                    report.below_threshold.push(rumor.id);
                }
            }
        }

        batch.commit()?;
        tracing::info!(
            examined = report.examined,
            locked = report.locked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lock tick complete"
        );
        Ok(report)
    }

    /// Moderate every LOCKED, non-final rumor: extend it, or finalize it.
    ///
    /// The oracle is consulted from committed state before the tick's batch
    /// opens, so request-path writes never wait on it. A LOCKED rumor admits
    /// no votes; inside the batch each rumor is re-read and left alone if it
    /// or its votes moved since moderation.
    ///
    /// Finalizing sets the verdict, settles voter and author reputation,
    /// appends the ledger block and erases the rumor's votes, all in this
    /// tick's batch.
    pub fn run_finalize_tick(&self, now: Timestamp) -> Result<FinalizeTickReport, LifecycleError> {
        let started = Instant::now();
        let mut report = FinalizeTickReport::default();

        let candidates = self
            .store
            .rumor_store()
            .iter_rumors_in_state(RumorState::Locked)?;
        report.examined = candidates.len();

        let vote_store = self.store.vote_store();
        let mut moderated = Vec::with_capacity(candidates.len());
        for rumor in candidates {
            let tally = vote_store.tally_for_rumor(&rumor.id)?;
            let verdict = self.moderate(&rumor, &tally, &mut report);
            moderated.push((rumor, tally, verdict));
        }

        let mut batch = self.store.write_batch()?;
        for (seen, tally, verdict) in moderated {
            let mut rumor = batch.get_rumor(&seen.id)?;
            let votes = batch.votes_for_rumor(&rumor.id)?;
            if rumor != seen || VoteTally::from_votes(&votes) != tally {
                tracing::debug!(rumor = %seen.id, "rumor changed during moderation, left for the next tick");
                report.skipped.push(seen.id);
                continue;
            }

            if verdict.should_extend {
                rumor.voting_ends_at = now.plus_secs(self.params.extension_secs);
                rumor.is_locked = false;
                batch.put_rumor(&rumor)?;
                tracing::info!(rumor = %rumor.id, until = %rumor.voting_ends_at, reason = %verdict.reason, "voting extended");
                report.extended.push(rumor.id);
                continue;
            }

            let decision = decide_verdict(&tally);
            rumor.is_final = true;
            rumor.final_decision = Some(decision);
            batch.put_rumor(&rumor)?;

            for vote in &votes {
                let delta = if vote.vote_type == decision {
                    self.params.correct_vote_points
                } else {
                    self.params.incorrect_vote_penalty
                };
                self.settle(&mut batch, &vote.profile_id, delta, &mut report)?;
            }
            if decision == Verdict::Lie {
                self.settle(&mut batch, &rumor.author, self.params.lie_rumor_penalty, &mut report)?;
            }

            let block_id = match ledger::append(&mut batch, &mut rumor, &tally, now) {
                Ok(block) => {
                    report.votes_erased += batch.delete_votes_for_rumor(&rumor.id)?;
                    Some(block.id)
                }
                Err(e) => match self.params.finalize_failure_policy {
                    FinalizeFailurePolicy::Atomic => {
                        tracing::error!(rumor = %rumor.id, error = %e, "ledger append failed, rolling back finalize tick");
                        return Err(e.into());
                    }
                    FinalizeFailurePolicy::BestEffort => {
                        tracing::error!(rumor = %rumor.id, error = %e, "ledger append failed, rumor final without block");
                        report.ledger_failures.push(rumor.id);
                        None
                    }
                },
            };

            tracing::info!(rumor = %rumor.id, decision = %decision, fact_weight = tally.fact_weight, lie_weight = tally.lie_weight, ?block_id, "rumor finalized");
            report.finalized.push(FinalizedRumor {
                rumor_id: rumor.id,
                decision,
                block_id,
            });
        }

        batch.commit()?;
        tracing::info!(
            examined = report.examined,
            extended = report.extended.len(),
            finalized = report.finalized.len(),
            votes_erased = report.votes_erased,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finalize tick complete"
        );
        Ok(report)
    }

    fn moderate(
        &self,
        rumor: &Rumor,
        tally: &VoteTally,
        report: &mut FinalizeTickReport,
    ) -> ModerationVerdict {
        let request = ModerationRequest::new(rumor.content.clone(), tally);
        match self.oracle.moderate(&request) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(rumor = %rumor.id, error = %e, "moderation oracle failed, using fallback");
                report.oracle_fallbacks += 1;
                fallback_moderation(&request)
            }
        }
    }

    /// Apply a reputation change inside `batch`. A profile that no longer
    /// exists is skipped.
    fn settle<B: WriteBatch>(
        &self,
        batch: &mut B,
        profile_id: &ProfileId,
        delta: i64,
        report: &mut FinalizeTickReport,
    ) -> Result<(), StoreError> {
        let mut profile = match batch.get_profile(profile_id) {
            Ok(profile) => profile,
            Err(e) if e.is_not_found() => {
                tracing::warn!(profile = %profile_id, "profile missing during settlement");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if apply_points(&mut profile, delta, self.params.blocking_threshold) {
            tracing::info!(profile = %profile_id, points = profile.points, "profile blocked");
            report.profiles_blocked.push(*profile_id);
        }
        batch.put_profile(&profile)
    }
}
