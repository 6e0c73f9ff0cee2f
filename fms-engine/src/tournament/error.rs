/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error types for the qualification, judging and ranking passes.
//!
//! Each pass validates everything it can before touching the store, so a
//! returned error means nothing was written.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::MatchType;
use crate::store::StoreError;

// ── Qualification schedule ────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("a schedule needs at least {min} teams, got {count}")]
    TooFewTeams { count: usize, min: usize },

    #[error("invalid match type \"{0}\" for a generated schedule")]
    InvalidMatchType(MatchType),

    #[error("No schedule template exists for {teams} teams and {matches_per_team} matches")]
    MissingTemplate { teams: usize, matches_per_team: usize },

    #[error("Schedule file contains {actual} matches, expected {expected}")]
    TemplateLength { actual: usize, expected: usize },

    #[error("{path} line {line}: {reason}")]
    MalformedTemplate { path: String, line: usize, reason: String },

    /// A team has no row in the team-strength file.
    #[error("team {team} is missing from the team strength list")]
    MissingTeamStrength { team: u32 },

    /// The team-strength file names a team that is not registered.
    #[error("team strength list names unknown team {team}")]
    UnknownStrengthTeam { team: u32 },
}

// ── Judging schedule ──────────────────────────────────────────────────────────

/// Failure of [`build_judging_schedule`](super::judging::build_judging_schedule).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JudgingError {
    #[error("cannot generate judging schedule: existing judging slots found")]
    ExistingSlots,

    #[error("cannot generate judging schedule: no teams present")]
    NoTeams,

    #[error("cannot generate judging schedule: no qualification matches found")]
    NoMatches,

    #[error("cannot generate judging schedule: at least one judge is required")]
    NoJudges,

    /// No slot could be placed after the attempt budget was spent.
    #[error("judging schedule infeasible at {candidate} (judge cursors: {cursors:?}, {remaining} teams unscheduled)")]
    Infeasible {
        candidate: DateTime<Utc>,
        cursors: Vec<DateTime<Utc>>,
        remaining: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ── Rankings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankingError {
    #[error("found no match result for match {match_id}")]
    MissingResult { match_id: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
