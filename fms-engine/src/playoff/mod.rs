/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Playoff bracket state machine.
//!
//! [`PlayoffTournament`] owns the live matchup graph.  It is rebuilt from
//! the result map on every [`update`](PlayoffTournament::update), so the
//! bracket state is a pure function of `(type, alliances, results)` and
//! repeated updates are harmless.
//!
//! # Design
//!
//! | Topic | Choice |
//! |---|---|
//! | Graph | Arena `Vec<Matchup>` + indices; the final is built last |
//! | Shared nodes | Lower-bracket nodes have a winner and a loser parent; only winner edges recurse |
//! | Byes | Resolved at build time; pruned nodes never enter the arena |
//! | Visibility | Recomputed per update from the tally and the template's hidden flag |
//! | Persistence | Match rows are reconciled to specs by `type_order` |
//!
//! # Example
//! ```rust,ignore
//! let mut playoff = PlayoffTournament::new(PlayoffType::DoubleElimination, 8)?;
//! playoff.create_matches_and_breaks(store.as_ref(), start_time)?;
//! // … a result is committed …
//! playoff.update_matches(store.as_ref())?;
//! ```

pub mod builder;
pub mod double_elimination;
pub mod error;
pub mod matchup;
pub mod single_elimination;

pub use error::PlayoffError;
pub use matchup::{AllianceSource, BreakSpec, MatchSpec, Matchup};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::game::MatchStatus;
use crate::model::{Match, MatchType, ScheduledBreak};
use crate::store::Store;

// ── PlayoffType ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffType {
    SingleElimination,
    #[default]
    DoubleElimination,
}

impl fmt::Display for PlayoffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayoffType::SingleElimination => f.write_str("single_elimination"),
            PlayoffType::DoubleElimination => f.write_str("double_elimination"),
        }
    }
}

impl FromStr for PlayoffType {
    type Err = PlayoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_elimination" => Ok(PlayoffType::SingleElimination),
            "double_elimination" => Ok(PlayoffType::DoubleElimination),
            other => Err(PlayoffError::InvalidPlayoffType(other.to_string())),
        }
    }
}

// ── PlayoffTournament ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PlayoffTournament {
    playoff_type: PlayoffType,
    num_alliances: u32,
    matchups: Vec<Matchup>,
    final_index: usize,
    break_specs: Vec<BreakSpec>,
}

impl PlayoffTournament {
    /// Builds the bracket for `num_alliances` alliances.
    ///
    /// # Errors
    /// `InvalidAllianceCount` when the layout cannot host that many
    /// alliances; `InvalidBracket`, `DuplicateMatchup` or `DuplicateMatch`
    /// when the layout itself is inconsistent.
    pub fn new(playoff_type: PlayoffType, num_alliances: u32) -> Result<Self, PlayoffError> {
        let (templates, break_specs) = match playoff_type {
            PlayoffType::SingleElimination => single_elimination::templates(num_alliances)?,
            PlayoffType::DoubleElimination => double_elimination::templates(num_alliances)?,
        };
        let bracket = builder::build_bracket(templates, num_alliances)?;

        let mut tournament = Self {
            playoff_type,
            num_alliances,
            matchups: bracket.matchups,
            final_index: bracket.final_index,
            break_specs,
        };
        tournament.update(&BTreeMap::new());

        info!(
            playoff_type = %playoff_type,
            alliances = num_alliances,
            matchups = tournament.matchups.len(),
            "Playoff bracket built"
        );
        Ok(tournament)
    }

    pub fn playoff_type(&self) -> PlayoffType {
        self.playoff_type
    }

    pub fn num_alliances(&self) -> u32 {
        self.num_alliances
    }

    // ── Read API ──────────────────────────────────────────────────────────────

    /// Every matchup, final first, in winner-edge traversal order.
    pub fn all_matchups(&self) -> Vec<&Matchup> {
        let mut order = Vec::with_capacity(self.matchups.len());
        builder::traverse(&self.matchups, self.final_index, &mut |i| order.push(i));
        order.into_iter().map(|i| &self.matchups[i]).collect()
    }

    pub fn match_groups(&self) -> BTreeMap<String, &Matchup> {
        self.matchups.iter().map(|m| (m.id.clone(), m)).collect()
    }

    pub fn matchup(&self, id: &str) -> Result<&Matchup, PlayoffError> {
        self.matchups
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| PlayoffError::UnknownMatchup { id: id.to_string() })
    }

    pub fn final_matchup(&self) -> &Matchup {
        &self.matchups[self.final_index]
    }

    pub fn is_complete(&self) -> bool {
        self.final_matchup().is_complete()
    }

    /// `0` until the final is decided.
    pub fn winning_alliance_id(&self) -> u32 {
        self.final_matchup().winning_alliance_id()
    }

    pub fn finalist_alliance_id(&self) -> u32 {
        self.final_matchup().losing_alliance_id()
    }

    /// All specs of the bracket ordered by `order`.
    pub fn match_specs(&self) -> Vec<&MatchSpec> {
        let mut specs: Vec<&MatchSpec> = self.matchups.iter().flat_map(|m| m.specs.iter()).collect();
        specs.sort_by_key(|s| s.order);
        specs
    }

    pub fn break_specs(&self) -> &[BreakSpec] {
        &self.break_specs
    }

    /// `("A 1", "W M7")`-style labels for the two sides of a matchup.
    pub fn alliance_source_display_names(&self, id: &str) -> Result<(String, String), PlayoffError> {
        let m = self.matchup(id)?;
        Ok((
            m.red_source.display_name(&self.matchups),
            m.blue_source.display_name(&self.matchups),
        ))
    }

    /// Where the red and blue alliances go once the matchup is decided.
    pub fn alliance_destinations(&self, id: &str) -> Result<(String, String), PlayoffError> {
        let m = self.matchup(id)?;
        Ok((
            self.alliance_destination(m, m.red_alliance_id),
            self.alliance_destination(m, m.blue_alliance_id),
        ))
    }

    fn alliance_destination(&self, m: &Matchup, alliance_id: u32) -> String {
        if !m.is_complete() {
            return String::new();
        }
        let won = m.winning_alliance_id() == alliance_id;
        if m.is_final() {
            return if won { "Tournament Winner" } else { "Tournament Finalist" }.to_string();
        }

        let destination = if won { m.winning_destination } else { m.losing_destination };
        match destination {
            Some(index) => format!("Advances to {}", self.destination_match_name(index)),
            None if won => String::new(),
            None => "Eliminated".to_string(),
        }
    }

    fn destination_match_name(&self, index: usize) -> String {
        match self.matchups[index].specs.first() {
            Some(spec) if spec.name_detail.is_empty() => spec.long_name.clone(),
            Some(spec) => format!("{} – {}", spec.long_name, spec.name_detail),
            None => String::new(),
        }
    }

    // ── Update ────────────────────────────────────────────────────────────────

    /// Re-derives every matchup from `results` (`type_order → status`).
    ///
    /// Only complete statuses count as played.
    pub fn update(&mut self, results: &BTreeMap<u32, MatchStatus>) {
        self.update_matchup(self.final_index, results);
    }

    fn update_matchup(&mut self, index: usize, results: &BTreeMap<u32, MatchStatus>) {
        let red = self.matchups[index].red_source;
        let blue = self.matchups[index].blue_source;
        for source in [red, blue] {
            if let Some(child) = source.traversal_child() {
                self.update_matchup(child, results);
            }
        }
        let red_id = red.alliance_id(&self.matchups);
        let blue_id = blue.alliance_id(&self.matchups);
        self.matchups[index].tally(red_id, blue_id, results);
    }

    // ── Materialization ───────────────────────────────────────────────────────

    /// Creates one playoff match row per spec plus the layout's scheduled
    /// breaks, back to back from `start_time`.
    ///
    /// # Errors
    /// `AlreadyMaterialized` if any playoff match exists.  A store failure
    /// part way through deletes the matches created so far and every
    /// playoff break before the error is returned, so a retry starts clean.
    pub fn create_matches_and_breaks(
        &mut self,
        store: &dyn Store,
        start_time: DateTime<Utc>,
    ) -> Result<(), PlayoffError> {
        let existing = store.get_matches_by_type(MatchType::Playoff, true)?;
        if !existing.is_empty() {
            return Err(PlayoffError::AlreadyMaterialized { count: existing.len() });
        }

        info!(
            playoff_type = %self.playoff_type,
            start = %start_time,
            "=== PlayoffTournament::create_matches_and_breaks() ==="
        );
        self.update(&BTreeMap::new());

        let mut created = Vec::new();
        match self.write_matches_and_breaks(store, start_time, &mut created) {
            Ok(count) => {
                info!(matches = count, "✓ playoff matches created");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, created = created.len(), "playoff materialization failed; rolling back");
                for id in created {
                    if let Err(cleanup) = store.delete_match(id) {
                        error!(match_id = id, error = %cleanup, "failed to delete partial playoff match");
                    }
                }
                if let Err(cleanup) = store.delete_scheduled_breaks_by_match_type(MatchType::Playoff) {
                    error!(error = %cleanup, "failed to delete partial playoff breaks");
                }
                Err(e)
            }
        }
    }

    /// Writes the rows; ids of created matches are pushed to `created`.
    fn write_matches_and_breaks(
        &self,
        store: &dyn Store,
        start_time: DateTime<Utc>,
        created: &mut Vec<u64>,
    ) -> Result<usize, PlayoffError> {
        let specs = self.match_specs();
        let mut time = start_time;
        for spec in &specs {
            if let Some(b) = self.break_specs.iter().find(|b| b.order_before == spec.order) {
                let mut scheduled_break = ScheduledBreak {
                    match_type: MatchType::Playoff,
                    type_order_before: b.order_before,
                    time,
                    duration_sec: b.duration_sec,
                    description: b.description.to_string(),
                    ..Default::default()
                };
                store.create_scheduled_break(&mut scheduled_break)?;
                time += Duration::seconds(i64::from(b.duration_sec));
            }

            let (red, blue) = alliance_slots(store, spec.red_alliance_id, spec.blue_alliance_id)?;
            let mut m = Match {
                match_type: MatchType::Playoff,
                type_order: spec.order,
                time,
                long_name: spec.long_name.clone(),
                short_name: spec.short_name.clone(),
                name_detail: spec.name_detail.clone(),
                playoff_match_group_id: spec.match_group_id.clone(),
                playoff_red_alliance: spec.red_alliance_id,
                playoff_blue_alliance: spec.blue_alliance_id,
                red,
                blue,
                use_tiebreak_criteria: spec.use_tiebreak_criteria,
                tba_match_key: spec.tba_match_key.clone(),
                status: if spec.is_hidden {
                    MatchStatus::Hidden
                } else {
                    MatchStatus::Scheduled
                },
                ..Default::default()
            };
            store.create_match(&mut m)?;
            created.push(m.id);
            debug!(order = m.type_order, name = %m.short_name, status = %m.status, "created playoff match");

            time += Duration::seconds(i64::from(spec.duration_sec));
        }
        Ok(specs.len())
    }

    /// Folds the stored playoff results into the bracket and writes the new
    /// alliances, teams and visibility through to every undecided match.
    ///
    /// # Errors
    /// `NoMatches` before materialization; `MissingMatch` if a spec has no
    /// row.
    pub fn update_matches(&mut self, store: &dyn Store) -> Result<(), PlayoffError> {
        let matches = store.get_matches_by_type(MatchType::Playoff, true)?;
        if matches.is_empty() {
            return Err(PlayoffError::NoMatches);
        }

        let results: BTreeMap<u32, MatchStatus> = matches
            .iter()
            .filter(|m| m.is_complete())
            .map(|m| (m.type_order, m.status))
            .collect();
        self.update(&results);

        let by_order: BTreeMap<u32, &Match> = matches.iter().map(|m| (m.type_order, m)).collect();
        let mut num_updated = 0;
        for spec in self.match_specs() {
            let existing = by_order
                .get(&spec.order)
                .ok_or(PlayoffError::MissingMatch { order: spec.order })?;
            if existing.is_complete() {
                continue;
            }

            let (red, blue) = alliance_slots(store, spec.red_alliance_id, spec.blue_alliance_id)?;
            let mut m = (*existing).clone();
            m.playoff_red_alliance = spec.red_alliance_id;
            m.playoff_blue_alliance = spec.blue_alliance_id;
            m.red = red;
            m.blue = blue;
            m.status = match (spec.is_hidden, m.status) {
                (true, _) => MatchStatus::Hidden,
                (false, MatchStatus::InProgress) => MatchStatus::InProgress,
                (false, _) => MatchStatus::Scheduled,
            };

            if m != **existing {
                store.update_match(&m)?;
                num_updated += 1;
            }
        }

        info!(
            results = results.len(),
            updated = num_updated,
            winner = self.winning_alliance_id(),
            "=== PlayoffTournament::update_matches() ==="
        );
        Ok(())
    }
}

/// Station slots for both alliances; an undetermined alliance leaves its
/// slots empty.
fn alliance_slots(store: &dyn Store, red_id: u32, blue_id: u32) -> Result<([u32; 3], [u32; 3]), PlayoffError> {
    let slots = |id: u32| -> Result<[u32; 3], PlayoffError> {
        if id == 0 {
            return Ok([0; 3]);
        }
        let alliance = store
            .get_alliance_by_id(id)?
            .ok_or(PlayoffError::UnknownAlliance { id })?;
        Ok(alliance.match_slots())
    };
    Ok((slots(red_id)?, slots(blue_id)?))
}
