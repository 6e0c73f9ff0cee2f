/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MatchType;
use crate::game::MatchStatus;

/// Identifier of a match on The Blue Alliance, e.g. `("sf", 2, 1)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TbaMatchKey {
    pub comp_level: String,
    pub set_number: u32,
    pub match_number: u32,
}

impl TbaMatchKey {
    pub fn new(comp_level: &str, set_number: u32, match_number: u32) -> Self {
        Self {
            comp_level: comp_level.to_string(),
            set_number,
            match_number,
        }
    }
}

/// One playable match.
///
/// Station slots are stored as `[station1, station2, station3]` per color;
/// `0` means nobody is assigned yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub match_type: MatchType,
    pub type_order: u32,
    pub time: DateTime<Utc>,
    pub long_name: String,
    pub short_name: String,
    pub name_detail: String,
    pub playoff_match_group_id: String,
    pub playoff_red_alliance: u32,
    pub playoff_blue_alliance: u32,
    pub red: [u32; 3],
    pub red_is_surrogate: [bool; 3],
    pub blue: [u32; 3],
    pub blue_is_surrogate: [bool; 3],
    pub use_tiebreak_criteria: bool,
    pub tba_match_key: TbaMatchKey,
    pub status: MatchStatus,
}

impl Match {
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Iterates `(team_id, is_surrogate, is_red)` over all six stations.
    pub fn team_slots(&self) -> impl Iterator<Item = (u32, bool, bool)> + '_ {
        let red = self
            .red
            .iter()
            .zip(self.red_is_surrogate.iter())
            .map(|(&t, &s)| (t, s, true));
        let blue = self
            .blue
            .iter()
            .zip(self.blue_is_surrogate.iter())
            .map(|(&t, &s)| (t, s, false));
        red.chain(blue)
    }

    pub fn has_team(&self, team_id: u32) -> bool {
        team_id != 0 && (self.red.contains(&team_id) || self.blue.contains(&team_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_only_when_decided() {
        let mut m = Match::default();
        for (status, complete) in [
            (MatchStatus::Hidden, false),
            (MatchStatus::Scheduled, false),
            (MatchStatus::InProgress, false),
            (MatchStatus::RedWon, true),
            (MatchStatus::BlueWon, true),
            (MatchStatus::Tie, true),
        ] {
            m.status = status;
            assert_eq!(m.is_complete(), complete, "{:?}", status);
        }
    }

    #[test]
    fn team_slots_cover_both_colors_in_order() {
        let m = Match {
            red: [1, 2, 3],
            red_is_surrogate: [false, true, false],
            blue: [4, 5, 6],
            ..Default::default()
        };
        let slots: Vec<_> = m.team_slots().collect();
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[1], (2, true, true));
        assert_eq!(slots[5], (6, false, false));
        assert!(m.has_team(5));
        assert!(!m.has_team(0));
    }
}
