/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Judging-slot scheduler.
//!
//! Greedily fills `J` parallel judge timelines with one interview per team,
//! interleaved with the qualification matches:
//!
//! 1. Pick the judge with the fewest slots (earliest cursor on a tie).
//! 2. For every unscheduled team compute its earliest feasible slot at or
//!    after that judge's cursor and take the earliest overall.
//! 3. Check the slot against the schedule blocks; a slot may not start in a
//!    gap between blocks, nor run from one block into the next.  On
//!    rejection the cursor jumps to the next block start and the round is
//!    retried.
//! 4. Commit the slot and advance the judge's cursor by its duration.
//!
//! Nothing is written until every team has a slot.  The greedy pass gives
//! up with [`JudgingError::Infeasible`] once `5·T·J` consecutive rounds
//! (teams times judges) fail to place a slot, which happens when schedule
//! blocks overlap and every retry lands back on the same cursor.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::error::JudgingError;
use crate::model::{JudgingSlot, Match, MatchType, ScheduleBlock};
use crate::store::Store;

// ── Parameters ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgingScheduleParams {
    pub num_judges: u32,
    pub duration_minutes: u32,
    /// Minimum gap between a team's previous match and its slot start.
    pub previous_spacing_minutes: u32,
    /// Minimum gap between a slot's end and the team's next match.
    pub next_spacing_minutes: u32,
}

impl JudgingScheduleParams {
    fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    fn previous_spacing(&self) -> Duration {
        Duration::minutes(i64::from(self.previous_spacing_minutes))
    }

    fn next_spacing(&self) -> Duration {
        Duration::minutes(i64::from(self.next_spacing_minutes))
    }
}

#[derive(Debug)]
struct JudgeCursor {
    judge_number: u32,
    end_time: DateTime<Utc>,
    num_slots: usize,
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Builds and stores the judging schedule for all teams.
///
/// # Errors
/// `ExistingSlots` if a schedule already exists, `NoTeams`/`NoMatches` when
/// there is nothing to schedule around, `Infeasible` when the greedy pass
/// stops making progress.  If the store fails while the finished schedule
/// is written, the slots stored so far are truncated before the error is
/// returned.
pub fn build_judging_schedule(
    store: &dyn Store,
    params: &JudgingScheduleParams,
) -> Result<Vec<JudgingSlot>, JudgingError> {
    build_judging_schedule_with_rng(store, params, &mut rand::thread_rng())
}

pub fn build_judging_schedule_with_rng<R: Rng + ?Sized>(
    store: &dyn Store,
    params: &JudgingScheduleParams,
    rng: &mut R,
) -> Result<Vec<JudgingSlot>, JudgingError> {
    if !store.get_all_judging_slots()?.is_empty() {
        return Err(JudgingError::ExistingSlots);
    }
    let mut teams = store.get_all_teams()?;
    if teams.is_empty() {
        return Err(JudgingError::NoTeams);
    }
    let matches = store.get_matches_by_type(MatchType::Qualification, true)?;
    if matches.len() < 2 {
        return Err(JudgingError::NoMatches);
    }
    if params.num_judges == 0 {
        return Err(JudgingError::NoJudges);
    }
    let blocks = store.get_schedule_blocks_by_match_type(MatchType::Qualification)?;

    let team_matches = team_match_map(&matches);
    let start_time = matches[1].time;
    info!(
        teams = teams.len(),
        judges = params.num_judges,
        start = %start_time,
        "=== build_judging_schedule() ==="
    );

    let mut judges: Vec<JudgeCursor> = (1..=params.num_judges)
        .map(|judge_number| JudgeCursor {
            judge_number,
            end_time: start_time,
            num_slots: 0,
        })
        .collect();
    teams.shuffle(rng);

    let max_attempts = 5 * teams.len() * params.num_judges as usize;
    let mut fruitless = 0;
    let mut scheduled = BTreeSet::new();
    let mut slots = Vec::with_capacity(teams.len());

    while scheduled.len() < teams.len() {
        let remaining = teams.len() - scheduled.len();
        let Some(idx) = judges
            .iter()
            .enumerate()
            .min_by_key(|(_, j)| (j.num_slots, j.end_time, j.judge_number))
            .map(|(i, _)| i)
        else {
            return Err(JudgingError::NoJudges);
        };
        let candidate = judges[idx].end_time;

        let mut selected: Option<JudgingSlot> = None;
        for team in teams.iter().filter(|t| !scheduled.contains(&t.id)) {
            let own_matches = team_matches.get(&team.id).map(Vec::as_slice).unwrap_or(&[]);
            let slot = next_slot_for_team(team.id, candidate, own_matches, params);
            let at_candidate = slot.time == candidate;
            if selected.as_ref().map_or(true, |s| slot.time < s.time) {
                selected = Some(slot);
            }
            if at_candidate {
                break;
            }
        }

        let next_start = selected
            .as_ref()
            .and_then(|slot| check_blocks(slot.time, slot.time + params.duration(), &blocks).err());
        let (Some(mut slot), None) = (selected, next_start) else {
            fruitless += 1;
            if fruitless > max_attempts {
                return Err(JudgingError::Infeasible {
                    candidate,
                    cursors: judges.iter().map(|j| j.end_time).collect(),
                    remaining,
                });
            }
            if let Some(next_start) = next_start {
                let judge = &mut judges[idx];
                debug!(
                    judge = judge.judge_number,
                    candidate = %candidate,
                    retry_at = %next_start,
                    "slot crosses a schedule break"
                );
                judge.end_time = judge.end_time.max(next_start);
            }
            continue;
        };

        let judge = &mut judges[idx];
        slot.judge_number = judge.judge_number;
        judge.num_slots += 1;
        judge.end_time = slot.time + params.duration();
        fruitless = 0;
        scheduled.insert(slot.team_id);
        debug!(judge = slot.judge_number, team = slot.team_id, time = %slot.time, "✓ judging slot");
        slots.push(slot);
    }

    if let Err(e) = slots.iter_mut().try_for_each(|slot| store.create_judging_slot(slot)) {
        warn!(error = %e, "storing judging schedule failed; truncating");
        if let Err(cleanup) = store.truncate_judging_slots() {
            error!(error = %cleanup, "failed to truncate partial judging schedule");
        }
        return Err(e.into());
    }
    info!(slots = slots.len(), "judging schedule stored");
    Ok(slots)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Each team's matches, ordered by time.
fn team_match_map(matches: &[Match]) -> BTreeMap<u32, Vec<Match>> {
    let mut map: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
    for m in matches {
        for (team_id, _, _) in m.team_slots() {
            if team_id > 0 {
                map.entry(team_id).or_default().push(m.clone());
            }
        }
    }
    for list in map.values_mut() {
        list.sort_by_key(|m| (m.time, m.type_order));
    }
    map
}

/// Earliest slot at or after `candidate` that keeps the required distance
/// to the surrounding matches of the team.
fn next_slot_for_team(
    team_id: u32,
    candidate: DateTime<Utc>,
    matches: &[Match],
    params: &JudgingScheduleParams,
) -> JudgingSlot {
    let mut candidate = candidate;
    let mut previous: Option<&Match> = None;

    for m in matches {
        if m.time > candidate {
            if let Some(prev) = previous {
                if candidate - prev.time < params.previous_spacing() {
                    candidate = prev.time + params.previous_spacing();
                }
            }
            if m.time - (candidate + params.duration()) >= params.next_spacing() {
                return JudgingSlot {
                    time: candidate,
                    team_id,
                    previous_match_number: previous.map(|p| p.type_order),
                    previous_match_time: previous.map(|p| p.time),
                    next_match_number: Some(m.type_order),
                    next_match_time: Some(m.time),
                    ..Default::default()
                };
            }
        }
        previous = Some(m);
    }

    match previous {
        Some(last) => JudgingSlot {
            time: candidate.max(last.time + params.previous_spacing()),
            team_id,
            previous_match_number: Some(last.type_order),
            previous_match_time: Some(last.time),
            ..Default::default()
        },
        None => JudgingSlot {
            time: candidate,
            team_id,
            ..Default::default()
        },
    }
}

/// `Err(t)` if a slot `[start, end)` is not allowed; `t` is the block start
/// to retry from.
fn check_blocks(start: DateTime<Utc>, end: DateTime<Utc>, blocks: &[ScheduleBlock]) -> Result<(), DateTime<Utc>> {
    for (i, block) in blocks.iter().enumerate() {
        if start < block.start_time {
            return Err(block.start_time);
        }
        if start < block.end_time() {
            if let Some(next) = blocks.get(i + 1) {
                if end > next.start_time {
                    return Err(next.start_time);
                }
            }
            return Ok(());
        }
    }
    Ok(())
}
