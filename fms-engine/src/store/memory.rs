/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-process [`Store`] backed by `BTreeMap` tables behind one `RwLock`.
//!
//! A single lock over all tables means every trait call is atomic with
//! respect to every other, which is what `replace_all_rankings` needs.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Store, StoreError, StoreResult};
use crate::game::Ranking;
use crate::model::{
    Alliance, JudgingSlot, Match, MatchResult, MatchType, ScheduleBlock, ScheduledBreak, Team,
};

#[derive(Debug, Default)]
struct Tables {
    teams: BTreeMap<u32, Team>,
    alliances: BTreeMap<u32, Alliance>,
    matches: BTreeMap<u64, Match>,
    match_results: BTreeMap<u64, MatchResult>,
    rankings: BTreeMap<u32, Ranking>,
    schedule_blocks: BTreeMap<u64, ScheduleBlock>,
    scheduled_breaks: BTreeMap<u64, ScheduledBreak>,
    judging_slots: BTreeMap<u64, JudgingSlot>,
    next_id: u64,
}

impl Tables {
    /// Ids are shared across tables; they only need to be unique per table.
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Io("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Io("memory store lock poisoned".to_string()))
    }
}

fn replace_existing<K: Ord + Copy + Into<u64>, V: Clone>(
    table: &mut BTreeMap<K, V>,
    key: K,
    value: &V,
    entity: &'static str,
) -> StoreResult<()> {
    match table.get_mut(&key) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(StoreError::NotFound {
            entity,
            id: key.into(),
        }),
    }
}

impl Store for MemoryStore {
    // ── Teams ─────────────────────────────────────────────────────────────────

    fn create_team(&self, team: &Team) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.teams.contains_key(&team.id) {
            return Err(StoreError::Duplicate {
                entity: "team",
                id: u64::from(team.id),
            });
        }
        t.teams.insert(team.id, team.clone());
        Ok(())
    }

    fn get_team_by_id(&self, id: u32) -> StoreResult<Option<Team>> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    fn update_team(&self, team: &Team) -> StoreResult<()> {
        replace_existing(&mut self.write()?.teams, team.id, team, "team")
    }

    fn get_all_teams(&self) -> StoreResult<Vec<Team>> {
        Ok(self.read()?.teams.values().cloned().collect())
    }

    // ── Alliances ─────────────────────────────────────────────────────────────

    fn create_alliance(&self, alliance: &Alliance) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.alliances.contains_key(&alliance.id) {
            return Err(StoreError::Duplicate {
                entity: "alliance",
                id: u64::from(alliance.id),
            });
        }
        t.alliances.insert(alliance.id, alliance.clone());
        Ok(())
    }

    fn get_alliance_by_id(&self, id: u32) -> StoreResult<Option<Alliance>> {
        Ok(self.read()?.alliances.get(&id).cloned())
    }

    fn update_alliance(&self, alliance: &Alliance) -> StoreResult<()> {
        replace_existing(&mut self.write()?.alliances, alliance.id, alliance, "alliance")
    }

    fn get_all_alliances(&self) -> StoreResult<Vec<Alliance>> {
        Ok(self.read()?.alliances.values().cloned().collect())
    }

    fn truncate_alliances(&self) -> StoreResult<()> {
        self.write()?.alliances.clear();
        Ok(())
    }

    // ── Matches ───────────────────────────────────────────────────────────────

    fn create_match(&self, m: &mut Match) -> StoreResult<()> {
        let mut t = self.write()?;
        m.id = t.allocate_id();
        t.matches.insert(m.id, m.clone());
        Ok(())
    }

    fn get_match_by_id(&self, id: u64) -> StoreResult<Option<Match>> {
        Ok(self.read()?.matches.get(&id).cloned())
    }

    fn update_match(&self, m: &Match) -> StoreResult<()> {
        replace_existing(&mut self.write()?.matches, m.id, m, "match")
    }

    fn delete_match(&self, id: u64) -> StoreResult<()> {
        self.write()?
            .matches
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: "match", id })
    }

    fn truncate_matches(&self) -> StoreResult<()> {
        self.write()?.matches.clear();
        Ok(())
    }

    fn get_matches_by_type(&self, match_type: MatchType, include_hidden: bool) -> StoreResult<Vec<Match>> {
        let t = self.read()?;
        let mut matches: Vec<Match> = t
            .matches
            .values()
            .filter(|m| m.match_type == match_type)
            .filter(|m| include_hidden || m.status != crate::game::MatchStatus::Hidden)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.type_order, m.id));
        Ok(matches)
    }

    fn get_match_by_type_order(&self, match_type: MatchType, type_order: u32) -> StoreResult<Option<Match>> {
        Ok(self
            .read()?
            .matches
            .values()
            .find(|m| m.match_type == match_type && m.type_order == type_order)
            .cloned())
    }

    // ── Match results ─────────────────────────────────────────────────────────

    fn create_match_result(&self, result: &mut MatchResult) -> StoreResult<()> {
        let mut t = self.write()?;
        result.id = t.allocate_id();
        t.match_results.insert(result.id, result.clone());
        Ok(())
    }

    fn get_match_result_for_match(&self, match_id: u64) -> StoreResult<Option<MatchResult>> {
        Ok(self
            .read()?
            .match_results
            .values()
            .filter(|r| r.match_id == match_id)
            .max_by_key(|r| (r.play_number, r.id))
            .cloned())
    }

    fn truncate_match_results(&self) -> StoreResult<()> {
        self.write()?.match_results.clear();
        Ok(())
    }

    // ── Rankings ──────────────────────────────────────────────────────────────

    fn create_ranking(&self, ranking: &Ranking) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.rankings.contains_key(&ranking.team_id) {
            return Err(StoreError::Duplicate {
                entity: "ranking",
                id: u64::from(ranking.team_id),
            });
        }
        t.rankings.insert(ranking.team_id, ranking.clone());
        Ok(())
    }

    fn get_all_rankings(&self) -> StoreResult<Vec<Ranking>> {
        let mut rankings: Vec<Ranking> = self.read()?.rankings.values().cloned().collect();
        rankings.sort_by_key(|r| (r.rank, r.team_id));
        Ok(rankings)
    }

    fn replace_all_rankings(&self, rankings: &[Ranking]) -> StoreResult<()> {
        let fresh: BTreeMap<u32, Ranking> = rankings.iter().map(|r| (r.team_id, r.clone())).collect();
        self.write()?.rankings = fresh;
        Ok(())
    }

    fn truncate_rankings(&self) -> StoreResult<()> {
        self.write()?.rankings.clear();
        Ok(())
    }

    // ── Schedule blocks ───────────────────────────────────────────────────────

    fn create_schedule_block(&self, block: &mut ScheduleBlock) -> StoreResult<()> {
        let mut t = self.write()?;
        block.id = t.allocate_id();
        t.schedule_blocks.insert(block.id, block.clone());
        Ok(())
    }

    fn get_schedule_blocks_by_match_type(&self, match_type: MatchType) -> StoreResult<Vec<ScheduleBlock>> {
        let mut blocks: Vec<ScheduleBlock> = self
            .read()?
            .schedule_blocks
            .values()
            .filter(|b| b.match_type == match_type)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| (b.start_time, b.id));
        Ok(blocks)
    }

    fn update_schedule_block(&self, block: &ScheduleBlock) -> StoreResult<()> {
        replace_existing(&mut self.write()?.schedule_blocks, block.id, block, "schedule block")
    }

    fn delete_schedule_blocks_by_match_type(&self, match_type: MatchType) -> StoreResult<()> {
        self.write()?.schedule_blocks.retain(|_, b| b.match_type != match_type);
        Ok(())
    }

    fn truncate_schedule_blocks(&self) -> StoreResult<()> {
        self.write()?.schedule_blocks.clear();
        Ok(())
    }

    // ── Scheduled breaks ──────────────────────────────────────────────────────

    fn create_scheduled_break(&self, scheduled_break: &mut ScheduledBreak) -> StoreResult<()> {
        let mut t = self.write()?;
        scheduled_break.id = t.allocate_id();
        t.scheduled_breaks.insert(scheduled_break.id, scheduled_break.clone());
        Ok(())
    }

    fn get_scheduled_breaks_by_match_type(&self, match_type: MatchType) -> StoreResult<Vec<ScheduledBreak>> {
        let mut breaks: Vec<ScheduledBreak> = self
            .read()?
            .scheduled_breaks
            .values()
            .filter(|b| b.match_type == match_type)
            .cloned()
            .collect();
        breaks.sort_by_key(|b| (b.type_order_before, b.id));
        Ok(breaks)
    }

    fn get_scheduled_break_by_match_type_order(
        &self,
        match_type: MatchType,
        type_order_before: u32,
    ) -> StoreResult<Option<ScheduledBreak>> {
        Ok(self
            .read()?
            .scheduled_breaks
            .values()
            .find(|b| b.match_type == match_type && b.type_order_before == type_order_before)
            .cloned())
    }

    fn update_scheduled_break(&self, scheduled_break: &ScheduledBreak) -> StoreResult<()> {
        replace_existing(
            &mut self.write()?.scheduled_breaks,
            scheduled_break.id,
            scheduled_break,
            "scheduled break",
        )
    }

    fn delete_scheduled_breaks_by_match_type(&self, match_type: MatchType) -> StoreResult<()> {
        self.write()?.scheduled_breaks.retain(|_, b| b.match_type != match_type);
        Ok(())
    }

    fn truncate_scheduled_breaks(&self) -> StoreResult<()> {
        self.write()?.scheduled_breaks.clear();
        Ok(())
    }

    // ── Judging slots ─────────────────────────────────────────────────────────

    fn create_judging_slot(&self, slot: &mut JudgingSlot) -> StoreResult<()> {
        let mut t = self.write()?;
        slot.id = t.allocate_id();
        t.judging_slots.insert(slot.id, slot.clone());
        Ok(())
    }

    fn get_all_judging_slots(&self) -> StoreResult<Vec<JudgingSlot>> {
        let mut slots: Vec<JudgingSlot> = self.read()?.judging_slots.values().cloned().collect();
        slots.sort_by_key(|s| (s.time, s.judge_number, s.id));
        Ok(slots)
    }

    fn update_judging_slot(&self, slot: &JudgingSlot) -> StoreResult<()> {
        replace_existing(&mut self.write()?.judging_slots, slot.id, slot, "judging slot")
    }

    fn truncate_judging_slots(&self) -> StoreResult<()> {
        self.write()?.judging_slots.clear();
        Ok(())
    }
}
