/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persisted entities of the tournament engine.
//!
//! The [`Store`](crate::store::Store) owns every value defined here; the
//! bracket and the schedulers only ever hold snapshots.
//!
//! Team and alliance ids are plain `u32` where `0` means "empty slot" or
//! "not yet determined", matching how match rows are filled in
//! progressively as a tournament advances.

pub mod alliance;
pub mod judging_slot;
pub mod match_result;
pub mod matches;
pub mod schedule;
pub mod team;

pub use alliance::Alliance;
pub use judging_slot::JudgingSlot;
pub use match_result::{Card, MatchResult};
pub use matches::{Match, TbaMatchKey};
pub use schedule::{ScheduleBlock, ScheduledBreak};
pub use team::Team;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── MatchType ─────────────────────────────────────────────────────────────────

/// Kind of a match row.  The lowercase string form is what ends up in
/// persisted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Practice,
    #[default]
    Qualification,
    Playoff,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Practice => "practice",
            MatchType::Qualification => "qualification",
            MatchType::Playoff => "playoff",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "practice" => Ok(MatchType::Practice),
            "qualification" => Ok(MatchType::Qualification),
            "playoff" => Ok(MatchType::Playoff),
            other => Err(format!("unknown match type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_type_strings_round_trip() {
        for t in [MatchType::Practice, MatchType::Qualification, MatchType::Playoff] {
            assert_eq!(t.as_str().parse::<MatchType>().unwrap(), t);
        }
        assert!("elimination".parse::<MatchType>().is_err());
    }

    #[test]
    fn match_type_serializes_lowercase() {
        let json = serde_json::to_string(&MatchType::Playoff).unwrap();
        assert_eq!(json, "\"playoff\"");
    }
}
