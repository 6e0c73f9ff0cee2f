/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a match row.
///
/// `Hidden` is distinct from `Scheduled` so that overtime rows exist in the
/// store without being shown until they are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Hidden,
    #[default]
    Scheduled,
    InProgress,
    RedWon,
    BlueWon,
    Tie,
}

impl MatchStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, MatchStatus::RedWon | MatchStatus::BlueWon | MatchStatus::Tie)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Hidden => "hidden",
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::RedWon => "red_won",
            MatchStatus::BlueWon => "blue_won",
            MatchStatus::Tie => "tie",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
