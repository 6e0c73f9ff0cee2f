/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persistence contract of the tournament engine.
//!
//! The bracket, the schedulers and the ranking aggregator only talk to the
//! [`Store`] trait.  [`MemoryStore`] is the in-process implementation used
//! by the daemon and by every test; an on-disk backend plugs in behind the
//! same trait.
//!
//! Lookups that merely probe for an entity return `Ok(None)`; a missing
//! entity is only an error when an update targets it.

pub mod memory;

pub use memory::MemoryStore;

use thiserror::Error;

use crate::game::Ranking;
use crate::model::{
    Alliance, JudgingSlot, Match, MatchResult, MatchType, ScheduleBlock, ScheduledBreak, Team,
};

// ── StoreError ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// An update or delete targeted a row that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// A create used an explicit id that is already taken.
    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: u64 },

    /// Backend failure (I/O, poisoned lock, …).
    #[error("store I/O error: {0}")]
    Io(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ── Store ─────────────────────────────────────────────────────────────────────

/// CRUD surface over every persisted entity.
///
/// Creates take `&mut` so the store can hand back the assigned id.
pub trait Store: Send + Sync {
    // Teams
    fn create_team(&self, team: &Team) -> StoreResult<()>;
    fn get_team_by_id(&self, id: u32) -> StoreResult<Option<Team>>;
    fn update_team(&self, team: &Team) -> StoreResult<()>;
    /// Ordered by id.
    fn get_all_teams(&self) -> StoreResult<Vec<Team>>;

    // Alliances
    fn create_alliance(&self, alliance: &Alliance) -> StoreResult<()>;
    fn get_alliance_by_id(&self, id: u32) -> StoreResult<Option<Alliance>>;
    fn update_alliance(&self, alliance: &Alliance) -> StoreResult<()>;
    /// Ordered by seed.
    fn get_all_alliances(&self) -> StoreResult<Vec<Alliance>>;
    fn truncate_alliances(&self) -> StoreResult<()>;

    /// Records the three teams an alliance actually fielded in a match,
    /// given in station order.
    fn update_alliance_from_match(&self, alliance_id: u32, slots: [u32; 3]) -> StoreResult<()> {
        let mut alliance = self
            .get_alliance_by_id(alliance_id)?
            .ok_or(StoreError::NotFound {
                entity: "alliance",
                id: u64::from(alliance_id),
            })?;
        alliance.apply_match_slots(slots);
        self.update_alliance(&alliance)
    }

    // Matches
    fn create_match(&self, m: &mut Match) -> StoreResult<()>;
    fn get_match_by_id(&self, id: u64) -> StoreResult<Option<Match>>;
    fn update_match(&self, m: &Match) -> StoreResult<()>;
    fn delete_match(&self, id: u64) -> StoreResult<()>;
    fn truncate_matches(&self) -> StoreResult<()>;
    /// Ordered by `type_order`.
    fn get_matches_by_type(&self, match_type: MatchType, include_hidden: bool) -> StoreResult<Vec<Match>>;
    fn get_match_by_type_order(&self, match_type: MatchType, type_order: u32) -> StoreResult<Option<Match>>;

    // Match results
    fn create_match_result(&self, result: &mut MatchResult) -> StoreResult<()>;
    /// The result with the highest `play_number`.
    fn get_match_result_for_match(&self, match_id: u64) -> StoreResult<Option<MatchResult>>;
    fn truncate_match_results(&self) -> StoreResult<()>;

    // Rankings
    fn create_ranking(&self, ranking: &Ranking) -> StoreResult<()>;
    /// Ordered by rank.
    fn get_all_rankings(&self) -> StoreResult<Vec<Ranking>>;
    /// Swaps the whole set in one step.
    fn replace_all_rankings(&self, rankings: &[Ranking]) -> StoreResult<()>;
    fn truncate_rankings(&self) -> StoreResult<()>;

    // Schedule blocks
    fn create_schedule_block(&self, block: &mut ScheduleBlock) -> StoreResult<()>;
    /// Ordered by start time.
    fn get_schedule_blocks_by_match_type(&self, match_type: MatchType) -> StoreResult<Vec<ScheduleBlock>>;
    fn update_schedule_block(&self, block: &ScheduleBlock) -> StoreResult<()>;
    fn delete_schedule_blocks_by_match_type(&self, match_type: MatchType) -> StoreResult<()>;
    fn truncate_schedule_blocks(&self) -> StoreResult<()>;

    // Scheduled breaks
    fn create_scheduled_break(&self, scheduled_break: &mut ScheduledBreak) -> StoreResult<()>;
    /// Ordered by `type_order_before`.
    fn get_scheduled_breaks_by_match_type(&self, match_type: MatchType) -> StoreResult<Vec<ScheduledBreak>>;
    fn get_scheduled_break_by_match_type_order(
        &self,
        match_type: MatchType,
        type_order_before: u32,
    ) -> StoreResult<Option<ScheduledBreak>>;
    fn update_scheduled_break(&self, scheduled_break: &ScheduledBreak) -> StoreResult<()>;
    fn delete_scheduled_breaks_by_match_type(&self, match_type: MatchType) -> StoreResult<()>;
    fn truncate_scheduled_breaks(&self) -> StoreResult<()>;

    // Judging slots
    fn create_judging_slot(&self, slot: &mut JudgingSlot) -> StoreResult<()>;
    /// Ordered by time, then judge.
    fn get_all_judging_slots(&self) -> StoreResult<Vec<JudgingSlot>>;
    fn update_judging_slot(&self, slot: &JudgingSlot) -> StoreResult<()>;
    fn truncate_judging_slots(&self) -> StoreResult<()>;
}
