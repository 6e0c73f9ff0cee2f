/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Qualification ranking aggregation and the carried-forward card flag.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, info};

use super::error::RankingError;
use crate::game::{sort_rankings, Ranking};
use crate::model::{Match, MatchResult, MatchType};
use crate::store::Store;

/// Recomputes the qualification standings from scratch and replaces the
/// stored set.
///
/// With `preserve_previous_rank` each team keeps the `previous_rank` it
/// already had instead of taking its current rank.
pub fn calculate_rankings(store: &dyn Store, preserve_previous_rank: bool) -> Result<Vec<Ranking>, RankingError> {
    calculate_rankings_with_rng(store, preserve_previous_rank, &mut rand::thread_rng())
}

pub fn calculate_rankings_with_rng<R: Rng + ?Sized>(
    store: &dyn Store,
    preserve_previous_rank: bool,
    rng: &mut R,
) -> Result<Vec<Ranking>, RankingError> {
    let old: BTreeMap<u32, Ranking> = store
        .get_all_rankings()?
        .into_iter()
        .map(|r| (r.team_id, r))
        .collect();

    let mut by_team: BTreeMap<u32, Ranking> = BTreeMap::new();
    let mut counted = 0;
    for m in store.get_matches_by_type(MatchType::Qualification, false)? {
        let Some(result) = authoritative_result(store, &m)? else {
            continue;
        };
        for (team_id, is_surrogate, is_red) in m.team_slots() {
            if is_surrogate || team_id == 0 {
                continue;
            }
            let (own, opponent) = result.summaries(is_red);
            by_team
                .entry(team_id)
                .or_insert_with(|| Ranking::new(team_id))
                .fields
                .add_score_summary(own, opponent, result.is_disqualified(team_id, is_red));
        }
        counted += 1;
    }

    let mut rankings: Vec<Ranking> = by_team
        .into_values()
        .map(|mut r| {
            r.fields.random = old.get(&r.team_id).map_or_else(|| rng.gen(), |o| o.fields.random);
            r
        })
        .collect();
    sort_rankings(&mut rankings);

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = i as u32 + 1;
        if let Some(previous) = old.get(&ranking.team_id) {
            ranking.previous_rank = if preserve_previous_rank {
                previous.previous_rank
            } else {
                previous.rank
            };
        }
    }

    store.replace_all_rankings(&rankings)?;
    info!(teams = rankings.len(), matches = counted, "✓ rankings recalculated");
    Ok(rankings)
}

/// Resets every team's yellow-card flag and sets it again for each team that
/// holds any card in a completed match of `match_type`.
pub fn calculate_team_cards(store: &dyn Store, match_type: MatchType) -> Result<(), RankingError> {
    let mut teams: BTreeMap<u32, _> = store
        .get_all_teams()?
        .into_iter()
        .map(|mut t| {
            t.yellow_card = false;
            (t.id, t)
        })
        .collect();

    for m in store.get_matches_by_type(match_type, false)? {
        let Some(result) = authoritative_result(store, &m)? else {
            continue;
        };
        for team_id in result.red_cards.keys().chain(result.blue_cards.keys()) {
            if let Some(team) = teams.get_mut(team_id) {
                team.yellow_card = true;
            }
        }
    }

    for team in teams.values() {
        store.update_team(team)?;
    }
    debug!(
        carded = teams.values().filter(|t| t.yellow_card).count(),
        "team cards updated"
    );
    Ok(())
}

/// `None` for a match that has not finished yet.
fn authoritative_result(store: &dyn Store, m: &Match) -> Result<Option<MatchResult>, RankingError> {
    if !m.is_complete() {
        return Ok(None);
    }
    store
        .get_match_result_for_match(m.id)?
        .map(Some)
        .ok_or(RankingError::MissingResult { match_id: m.id })
}
