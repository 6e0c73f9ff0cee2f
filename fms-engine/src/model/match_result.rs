/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MatchType;
use crate::game::ScoreSummary;

/// Card issued to a team during a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Card {
    Yellow,
    Red,
}

/// Scored outcome of one play of a match.
///
/// Replays produce additional results with a higher `play_number`; only the
/// highest one counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: u64,
    pub match_id: u64,
    pub play_number: u32,
    pub match_type: MatchType,
    pub red_summary: ScoreSummary,
    pub blue_summary: ScoreSummary,
    pub red_cards: BTreeMap<u32, Card>,
    pub blue_cards: BTreeMap<u32, Card>,
}

impl MatchResult {
    /// Summaries as `(own, opponent)` for the given color.
    pub fn summaries(&self, is_red: bool) -> (&ScoreSummary, &ScoreSummary) {
        if is_red {
            (&self.red_summary, &self.blue_summary)
        } else {
            (&self.blue_summary, &self.red_summary)
        }
    }

    pub fn cards(&self, is_red: bool) -> &BTreeMap<u32, Card> {
        if is_red {
            &self.red_cards
        } else {
            &self.blue_cards
        }
    }

    /// A red card disqualifies the team from this match.
    pub fn is_disqualified(&self, team_id: u32, is_red: bool) -> bool {
        self.cards(is_red).get(&team_id) == Some(&Card::Red)
    }
}
