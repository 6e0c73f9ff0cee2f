/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use serde::{Deserialize, Serialize};

/// A playoff alliance, identified by its selection seed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alliance {
    /// Seed, 1-indexed.
    pub id: u32,
    /// All member teams in selection order (captain first).
    pub team_ids: Vec<u32>,
    /// The three teams fielded for the next match.
    pub lineup: [u32; 3],
}

impl Alliance {
    /// Checks `|team_ids| >= 3` and that every lineup entry is a member.
    pub fn is_valid(&self) -> bool {
        self.team_ids.len() >= 3 && self.lineup.iter().all(|t| self.team_ids.contains(t))
    }

    /// Team slots for a playoff match, in station order.
    ///
    /// The captain (`lineup[0]`) plays the middle station.
    pub fn match_slots(&self) -> [u32; 3] {
        [self.lineup[1], self.lineup[0], self.lineup[2]]
    }

    /// Inverse of [`match_slots`](Self::match_slots): adopts the lineup that
    /// was actually fielded, appending any team not yet on the roster.
    pub fn apply_match_slots(&mut self, slots: [u32; 3]) {
        self.lineup = [slots[1], slots[0], slots[2]];
        for team_id in slots {
            if team_id > 0 && !self.team_ids.contains(&team_id) {
                self.team_ids.push(team_id);
            }
        }
    }
}
