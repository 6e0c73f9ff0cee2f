/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Bracket nodes.
//!
//! A [`Matchup`] is a best-of-k series between two alliances.  Its sides are
//! fed by [`AllianceSource`]s that either name a selection seed directly or
//! point at another matchup in the same arena by index.

use std::collections::BTreeMap;

use crate::game::MatchStatus;
use crate::model::TbaMatchKey;

/// Id of the final matchup in every bracket.
pub const FINAL_MATCHUP_ID: &str = "F";

// ── MatchSpec ─────────────────────────────────────────────────────────────────

/// Template for one playoff match row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchSpec {
    pub long_name: String,
    pub short_name: String,
    pub name_detail: String,
    /// Id of the owning matchup; filled in when the bracket is built.
    pub match_group_id: String,
    /// Playoff `type_order` of the materialized row.
    pub order: u32,
    pub duration_sec: u32,
    pub use_tiebreak_criteria: bool,
    /// Whether the template creates this match hidden (overtimes).
    pub hidden_by_default: bool,
    /// Current visibility, recomputed on every update.
    pub is_hidden: bool,
    pub tba_match_key: TbaMatchKey,
    pub red_alliance_id: u32,
    pub blue_alliance_id: u32,
}

/// A scheduled break placed before the match with `order_before`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakSpec {
    pub order_before: u32,
    pub duration_sec: u32,
    pub description: &'static str,
}

impl BreakSpec {
    pub(crate) const fn new(order_before: u32, duration_sec: u32, description: &'static str) -> Self {
        Self {
            order_before,
            duration_sec,
            description,
        }
    }
}

// ── AllianceSource ────────────────────────────────────────────────────────────

/// Where one side of a matchup gets its alliance from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllianceSource {
    /// Fixed alliance-selection seed.
    Selection(u32),
    /// Winner (`use_winner`) or loser of the matchup at `index`.
    Matchup { index: usize, use_winner: bool },
}

impl AllianceSource {
    pub fn alliance_id(&self, matchups: &[Matchup]) -> u32 {
        match *self {
            AllianceSource::Selection(id) => id,
            AllianceSource::Matchup { index, use_winner } => {
                let m = &matchups[index];
                if use_winner {
                    m.winning_alliance_id()
                } else {
                    m.losing_alliance_id()
                }
            }
        }
    }

    pub fn display_name(&self, matchups: &[Matchup]) -> String {
        match *self {
            AllianceSource::Selection(id) => format!("A {}", id),
            AllianceSource::Matchup { index, use_winner } => {
                let prefix = if use_winner { "W" } else { "L" };
                format!("{} {}", prefix, matchups[index].id)
            }
        }
    }

    /// The child matchup this side recurses into on update and traversal.
    ///
    /// Loser edges return `None`: every lower-bracket node is also reachable
    /// through a winner edge, so following both would visit it twice.
    pub fn traversal_child(&self) -> Option<usize> {
        match *self {
            AllianceSource::Matchup { index, use_winner: true } => Some(index),
            _ => None,
        }
    }
}

// ── Matchup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Matchup {
    pub(crate) id: String,
    pub num_wins_to_advance: u32,
    pub(crate) red_source: AllianceSource,
    pub(crate) blue_source: AllianceSource,
    pub(crate) specs: Vec<MatchSpec>,
    pub red_alliance_id: u32,
    pub blue_alliance_id: u32,
    pub red_alliance_wins: u32,
    pub blue_alliance_wins: u32,
    pub num_matches_played: u32,
    pub(crate) winning_destination: Option<usize>,
    pub(crate) losing_destination: Option<usize>,
}

impl Matchup {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn match_specs(&self) -> &[MatchSpec] {
        &self.specs
    }

    pub fn red_source(&self) -> AllianceSource {
        self.red_source
    }

    pub fn blue_source(&self) -> AllianceSource {
        self.blue_source
    }

    pub fn is_final(&self) -> bool {
        self.id == FINAL_MATCHUP_ID
    }

    pub fn winning_alliance_id(&self) -> u32 {
        if self.red_alliance_wins >= self.num_wins_to_advance {
            self.red_alliance_id
        } else if self.blue_alliance_wins >= self.num_wins_to_advance {
            self.blue_alliance_id
        } else {
            0
        }
    }

    pub fn losing_alliance_id(&self) -> u32 {
        if self.red_alliance_wins >= self.num_wins_to_advance {
            self.blue_alliance_id
        } else if self.blue_alliance_wins >= self.num_wins_to_advance {
            self.red_alliance_id
        } else {
            0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.winning_alliance_id() > 0
    }

    /// Returns `(leader, status)` for display, e.g. `("red", "Red Leads 1-0")`.
    pub fn status_text(&self) -> (String, String) {
        let win_text = if self.is_final() { "Wins" } else { "Advances" };
        let (red, blue) = (self.red_alliance_wins, self.blue_alliance_wins);
        let k = self.num_wins_to_advance;

        let (leader, status) = if red >= k {
            ("red", format!("Red {} {}-{}", win_text, red, blue))
        } else if blue >= k {
            ("blue", format!("Blue {} {}-{}", win_text, blue, red))
        } else if red > blue {
            ("red", format!("Red Leads {}-{}", red, blue))
        } else if blue > red {
            ("blue", format!("Blue Leads {}-{}", blue, red))
        } else if red > 0 {
            ("", format!("Series Tied {}-{}", red, blue))
        } else {
            ("", String::new())
        };
        (leader.to_string(), status)
    }

    /// Tallies this matchup's series against the result map and refreshes
    /// spec visibility.
    ///
    /// Unplayed specs are revealed in order, as many as are still needed for
    /// either side to reach `num_wins_to_advance`; all other unplayed specs
    /// fall back to their template visibility.
    pub(crate) fn tally(&mut self, red_id: u32, blue_id: u32, results: &BTreeMap<u32, MatchStatus>) {
        self.red_alliance_id = red_id;
        self.blue_alliance_id = blue_id;
        self.red_alliance_wins = 0;
        self.blue_alliance_wins = 0;
        self.num_matches_played = 0;

        let mut unplayed = Vec::new();
        for (i, spec) in self.specs.iter_mut().enumerate() {
            spec.red_alliance_id = red_id;
            spec.blue_alliance_id = blue_id;
            match results.get(&spec.order) {
                Some(MatchStatus::RedWon) => {
                    self.red_alliance_wins += 1;
                    self.num_matches_played += 1;
                }
                Some(MatchStatus::BlueWon) => {
                    self.blue_alliance_wins += 1;
                    self.num_matches_played += 1;
                }
                Some(MatchStatus::Tie) => self.num_matches_played += 1,
                _ => {
                    unplayed.push(i);
                    continue;
                }
            }
            spec.is_hidden = false;
        }

        let k = self.num_wins_to_advance;
        let mut to_schedule = k
            .saturating_sub(self.red_alliance_wins)
            .min(k.saturating_sub(self.blue_alliance_wins));
        for i in unplayed {
            let spec = &mut self.specs[i];
            if to_schedule > 0 {
                spec.is_hidden = false;
                to_schedule -= 1;
            } else {
                spec.is_hidden = spec.hidden_by_default;
            }
        }
    }
}
