/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared fixtures for unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::game::{Ranking, ScoreSummary};
use crate::model::{
    Alliance, Card, JudgingSlot, Match, MatchResult, MatchType, ScheduleBlock, ScheduledBreak, Team,
};
use crate::store::{MemoryStore, Store, StoreError, StoreResult};

/// Creates alliances `1..=n`; alliance `i` holds teams `100i+1 ..= 100i+4`
/// and fields the first three.
pub fn create_test_alliances(store: &dyn Store, n: u32) {
    for i in 1..=n {
        let base = 100 * i;
        let alliance = Alliance {
            id: i,
            team_ids: (1..=4).map(|k| base + k).collect(),
            lineup: [base + 1, base + 2, base + 3],
        };
        store.create_alliance(&alliance).unwrap();
    }
}

/// A qualification result that blue wins 100–80 while red earns a bonus
/// ranking point.
pub fn build_test_match_result(match_id: u64, play_number: u32) -> MatchResult {
    MatchResult {
        match_id,
        play_number,
        match_type: MatchType::Qualification,
        red_summary: ScoreSummary {
            match_points: 70,
            foul_points: 10,
            score: 80,
            auto_points: 15,
            endgame_points: 20,
            bonus_ranking_points: 1,
            num_opponent_major_fouls: 0,
        },
        blue_summary: ScoreSummary {
            match_points: 90,
            foul_points: 10,
            score: 100,
            auto_points: 25,
            endgame_points: 30,
            bonus_ranking_points: 0,
            num_opponent_major_fouls: 1,
        },
        red_cards: BTreeMap::from([(1868, Card::Yellow)]),
        blue_cards: BTreeMap::new(),
        ..Default::default()
    }
}

/// A [`MemoryStore`] whose match, break and judging-slot creates start
/// failing once `budget` of them have succeeded.  Everything else passes
/// straight through, so tests can inspect what a failed writer left behind.
pub struct FlakyStore {
    pub inner: MemoryStore,
    budget: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore, budget: usize) -> Self {
        Self {
            inner,
            budget: AtomicUsize::new(budget),
        }
    }

    fn spend(&self) -> StoreResult<()> {
        self.budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .map(|_| ())
            .map_err(|_| StoreError::Io("disk full".to_string()))
    }
}

impl Store for FlakyStore {
    fn create_team(&self, team: &Team) -> StoreResult<()> {
        self.inner.create_team(team)
    }
    fn get_team_by_id(&self, id: u32) -> StoreResult<Option<Team>> {
        self.inner.get_team_by_id(id)
    }
    fn update_team(&self, team: &Team) -> StoreResult<()> {
        self.inner.update_team(team)
    }
    fn get_all_teams(&self) -> StoreResult<Vec<Team>> {
        self.inner.get_all_teams()
    }

    fn create_alliance(&self, alliance: &Alliance) -> StoreResult<()> {
        self.inner.create_alliance(alliance)
    }
    fn get_alliance_by_id(&self, id: u32) -> StoreResult<Option<Alliance>> {
        self.inner.get_alliance_by_id(id)
    }
    fn update_alliance(&self, alliance: &Alliance) -> StoreResult<()> {
        self.inner.update_alliance(alliance)
    }
    fn get_all_alliances(&self) -> StoreResult<Vec<Alliance>> {
        self.inner.get_all_alliances()
    }
    fn truncate_alliances(&self) -> StoreResult<()> {
        self.inner.truncate_alliances()
    }

    fn create_match(&self, m: &mut Match) -> StoreResult<()> {
        self.spend()?;
        self.inner.create_match(m)
    }
    fn get_match_by_id(&self, id: u64) -> StoreResult<Option<Match>> {
        self.inner.get_match_by_id(id)
    }
    fn update_match(&self, m: &Match) -> StoreResult<()> {
        self.inner.update_match(m)
    }
    fn delete_match(&self, id: u64) -> StoreResult<()> {
        self.inner.delete_match(id)
    }
    fn truncate_matches(&self) -> StoreResult<()> {
        self.inner.truncate_matches()
    }
    fn get_matches_by_type(&self, match_type: MatchType, include_hidden: bool) -> StoreResult<Vec<Match>> {
        self.inner.get_matches_by_type(match_type, include_hidden)
    }
    fn get_match_by_type_order(&self, match_type: MatchType, type_order: u32) -> StoreResult<Option<Match>> {
        self.inner.get_match_by_type_order(match_type, type_order)
    }

    fn create_match_result(&self, result: &mut MatchResult) -> StoreResult<()> {
        self.inner.create_match_result(result)
    }
    fn get_match_result_for_match(&self, match_id: u64) -> StoreResult<Option<MatchResult>> {
        self.inner.get_match_result_for_match(match_id)
    }
    fn truncate_match_results(&self) -> StoreResult<()> {
        self.inner.truncate_match_results()
    }

    fn create_ranking(&self, ranking: &Ranking) -> StoreResult<()> {
        self.inner.create_ranking(ranking)
    }
    fn get_all_rankings(&self) -> StoreResult<Vec<Ranking>> {
        self.inner.get_all_rankings()
    }
    fn replace_all_rankings(&self, rankings: &[Ranking]) -> StoreResult<()> {
        self.inner.replace_all_rankings(rankings)
    }
    fn truncate_rankings(&self) -> StoreResult<()> {
        self.inner.truncate_rankings()
    }

    fn create_schedule_block(&self, block: &mut ScheduleBlock) -> StoreResult<()> {
        self.inner.create_schedule_block(block)
    }
    fn get_schedule_blocks_by_match_type(&self, match_type: MatchType) -> StoreResult<Vec<ScheduleBlock>> {
        self.inner.get_schedule_blocks_by_match_type(match_type)
    }
    fn update_schedule_block(&self, block: &ScheduleBlock) -> StoreResult<()> {
        self.inner.update_schedule_block(block)
    }
    fn delete_schedule_blocks_by_match_type(&self, match_type: MatchType) -> StoreResult<()> {
        self.inner.delete_schedule_blocks_by_match_type(match_type)
    }
    fn truncate_schedule_blocks(&self) -> StoreResult<()> {
        self.inner.truncate_schedule_blocks()
    }

    fn create_scheduled_break(&self, scheduled_break: &mut ScheduledBreak) -> StoreResult<()> {
        self.spend()?;
        self.inner.create_scheduled_break(scheduled_break)
    }
    fn get_scheduled_breaks_by_match_type(&self, match_type: MatchType) -> StoreResult<Vec<ScheduledBreak>> {
        self.inner.get_scheduled_breaks_by_match_type(match_type)
    }
    fn get_scheduled_break_by_match_type_order(
        &self,
        match_type: MatchType,
        type_order_before: u32,
    ) -> StoreResult<Option<ScheduledBreak>> {
        self.inner.get_scheduled_break_by_match_type_order(match_type, type_order_before)
    }
    fn update_scheduled_break(&self, scheduled_break: &ScheduledBreak) -> StoreResult<()> {
        self.inner.update_scheduled_break(scheduled_break)
    }
    fn delete_scheduled_breaks_by_match_type(&self, match_type: MatchType) -> StoreResult<()> {
        self.inner.delete_scheduled_breaks_by_match_type(match_type)
    }
    fn truncate_scheduled_breaks(&self) -> StoreResult<()> {
        self.inner.truncate_scheduled_breaks()
    }

    fn create_judging_slot(&self, slot: &mut JudgingSlot) -> StoreResult<()> {
        self.spend()?;
        self.inner.create_judging_slot(slot)
    }
    fn get_all_judging_slots(&self) -> StoreResult<Vec<JudgingSlot>> {
        self.inner.get_all_judging_slots()
    }
    fn update_judging_slot(&self, slot: &JudgingSlot) -> StoreResult<()> {
        self.inner.update_judging_slot(slot)
    }
    fn truncate_judging_slots(&self) -> StoreResult<()> {
        self.inner.truncate_judging_slots()
    }
}
