/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Qualification and practice schedule generation.
//!
//! Schedules are not searched for at runtime.  A pre-computed anonymous
//! template is picked by `(teams, matches_per_team)` and the real teams are
//! dropped into its positions through a permutation: random by default, or
//! driven by a team-strength list in balanced mode.
//!
//! Template files live at `<dir>/<T>_<matches_per_team>[_balanced].csv`,
//! one match per row, twelve integers per row: `team, surrogate` for red
//! stations 1–3 then blue stations 1–3.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::error::ScheduleError;
use crate::model::{Match, MatchType, ScheduleBlock, TbaMatchKey, Team};

// ── Constants ─────────────────────────────────────────────────────────────────

pub const TEAMS_PER_MATCH: usize = 6;

const MIN_TEAMS: usize = 6;

/// One template row: `(team position 1..=T, is_surrogate)` per station.
pub type AnonymousMatch = [(usize, bool); TEAMS_PER_MATCH];

// ── ScheduleTemplates ─────────────────────────────────────────────────────────

/// Directory of schedule templates.
#[derive(Debug, Clone)]
pub struct ScheduleTemplates {
    dir: PathBuf,
}

impl ScheduleTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn template_path(&self, num_teams: usize, matches_per_team: usize, balanced: bool) -> PathBuf {
        let suffix = if balanced { "_balanced" } else { "" };
        self.dir
            .join(format!("{}_{}{}.csv", num_teams, matches_per_team, suffix))
    }

    /// Loads and validates the template for `(num_teams, matches_per_team)`.
    ///
    /// # Errors
    /// `MissingTemplate` if no such file exists, `TemplateLength` if its row
    /// count is not `⌈T·mpt/6⌉`, `MalformedTemplate` on any bad cell.
    pub fn load(
        &self,
        num_teams: usize,
        matches_per_team: usize,
        balanced: bool,
    ) -> Result<Vec<AnonymousMatch>, ScheduleError> {
        let path = self.template_path(num_teams, matches_per_team, balanced);
        let path_str = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|_| ScheduleError::MissingTemplate {
                teams: num_teams,
                matches_per_team,
            })?;

        let records = reader
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| ScheduleError::MalformedTemplate {
                    path: path_str.clone(),
                    line: i + 1,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected = (num_teams * matches_per_team).div_ceil(TEAMS_PER_MATCH);
        if records.len() != expected {
            return Err(ScheduleError::TemplateLength {
                actual: records.len(),
                expected,
            });
        }

        let malformed = |line: usize, reason: String| ScheduleError::MalformedTemplate {
            path: path_str.clone(),
            line,
            reason,
        };

        let mut matches = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let line = i + 1;
            if record.len() < TEAMS_PER_MATCH * 2 {
                return Err(malformed(line, format!("expected 12 columns, found {}", record.len())));
            }
            let mut anon: AnonymousMatch = [(0, false); TEAMS_PER_MATCH];
            for (station, slot) in anon.iter_mut().enumerate() {
                let team_cell = &record[station * 2];
                let flag_cell = &record[station * 2 + 1];
                let position: usize = team_cell
                    .parse()
                    .map_err(|_| malformed(line, format!("invalid team position '{}'", team_cell)))?;
                if position == 0 || position > num_teams {
                    return Err(malformed(line, format!("team position {} out of range", position)));
                }
                let surrogate = match flag_cell {
                    "0" => false,
                    "1" => true,
                    other => return Err(malformed(line, format!("invalid surrogate flag '{}'", other))),
                };
                *slot = (position, surrogate);
            }
            matches.push(anon);
        }

        debug!(path = %path_str, matches = matches.len(), "loaded schedule template");
        Ok(matches)
    }
}

// ── Schedule generation ───────────────────────────────────────────────────────

/// Largest number of matches per team that fits into the blocks' capacity.
pub fn matches_per_team(num_teams: usize, blocks: &[ScheduleBlock]) -> usize {
    if num_teams == 0 {
        return 0;
    }
    let capacity: usize = blocks.iter().map(|b| b.num_matches as usize).sum();
    capacity * TEAMS_PER_MATCH / num_teams
}

/// Builds a practice or qualification schedule with a random permutation,
/// or a balanced one when `team_strength` names a strength list.
///
/// The matches are returned, not stored.
pub fn build_random_schedule(
    teams: &[Team],
    blocks: &[ScheduleBlock],
    match_type: MatchType,
    templates: &ScheduleTemplates,
    team_strength: Option<&Path>,
) -> Result<Vec<Match>, ScheduleError> {
    build_random_schedule_with_rng(
        teams,
        blocks,
        match_type,
        templates,
        team_strength,
        &mut rand::thread_rng(),
    )
}

pub fn build_random_schedule_with_rng<R: Rng + ?Sized>(
    teams: &[Team],
    blocks: &[ScheduleBlock],
    match_type: MatchType,
    templates: &ScheduleTemplates,
    team_strength: Option<&Path>,
    rng: &mut R,
) -> Result<Vec<Match>, ScheduleError> {
    let (short_prefix, long_prefix, comp_level) = match match_type {
        MatchType::Practice => ("P", "Practice", "p"),
        MatchType::Qualification => ("Q", "Qualification", "qm"),
        MatchType::Playoff => return Err(ScheduleError::InvalidMatchType(match_type)),
    };
    let num_teams = teams.len();
    if num_teams < MIN_TEAMS {
        return Err(ScheduleError::TooFewTeams {
            count: num_teams,
            min: MIN_TEAMS,
        });
    }

    let mpt = matches_per_team(num_teams, blocks);
    let anon_schedule = templates.load(num_teams, mpt, team_strength.is_some())?;

    // position (0-based) → index into `teams`
    let permutation = match team_strength {
        Some(path) => strength_permutation(teams, path)?,
        None => {
            let mut p: Vec<usize> = (0..num_teams).collect();
            p.shuffle(rng);
            p
        }
    };

    info!(
        match_type = %match_type,
        teams = num_teams,
        matches_per_team = mpt,
        matches = anon_schedule.len(),
        balanced = team_strength.is_some(),
        "=== build_random_schedule() ==="
    );

    let mut matches: Vec<Match> = anon_schedule
        .iter()
        .enumerate()
        .map(|(i, anon)| {
            let number = i as u32 + 1;
            let mut m = Match {
                match_type,
                type_order: number,
                short_name: format!("{}{}", short_prefix, number),
                long_name: format!("{} {}", long_prefix, number),
                tba_match_key: TbaMatchKey::new(comp_level, 0, number),
                ..Default::default()
            };
            for (station, &(position, surrogate)) in anon.iter().enumerate() {
                let team_id = teams[permutation[position - 1]].id;
                if station < 3 {
                    m.red[station] = team_id;
                    m.red_is_surrogate[station] = surrogate;
                } else {
                    m.blue[station - 3] = team_id;
                    m.blue_is_surrogate[station - 3] = surrogate;
                }
            }
            m
        })
        .collect();

    let mut index = 0;
    for block in blocks {
        for i in 0..block.num_matches {
            let Some(m) = matches.get_mut(index) else { break };
            m.time = block.start_time + Duration::seconds(i64::from(i) * i64::from(block.match_spacing_sec));
            index += 1;
        }
    }

    Ok(matches)
}

/// Reads the operator's team-strength list: row `i` starts with the id of
/// the team to place at template position `i + 1`.
fn strength_permutation(teams: &[Team], path: &Path) -> Result<Vec<usize>, ScheduleError> {
    let path_str = path.display().to_string();
    let malformed = |line: usize, reason: String| ScheduleError::MalformedTemplate {
        path: path_str.clone(),
        line,
        reason,
    };

    let index_by_id: BTreeMap<u32, usize> = teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| malformed(0, e.to_string()))?;

    let mut permutation = Vec::with_capacity(teams.len());
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(i + 1, e.to_string()))?;
        let cell = record.get(0).unwrap_or_default();
        let team_id: u32 = cell
            .parse()
            .map_err(|_| malformed(i + 1, format!("invalid team id '{}'", cell)))?;
        let index = *index_by_id
            .get(&team_id)
            .ok_or(ScheduleError::UnknownStrengthTeam { team: team_id })?;
        if !permutation.contains(&index) {
            permutation.push(index);
        }
    }

    if let Some(missing) = teams.iter().enumerate().find(|(i, _)| !permutation.contains(i)) {
        return Err(ScheduleError::MissingTeamStrength { team: missing.1.id });
    }
    Ok(permutation)
}
