/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Double-elimination layout for exactly eight alliances.
//!
//! Thirteen single-match rounds feed a best-of-three final.  Losers of the
//! upper bracket drop into the lower bracket; a second loss eliminates.

use super::builder::{MatchupTemplate, SourceTemplate};
use super::error::PlayoffError;
use super::matchup::{BreakSpec, MatchSpec, FINAL_MATCHUP_ID};
use super::single_elimination::final_matches;
use crate::model::TbaMatchKey;

const BREAKS: [BreakSpec; 5] = [
    BreakSpec::new(11, 300, "Field Break"),
    BreakSpec::new(13, 900, "Awards Break"),
    BreakSpec::new(14, 900, "Awards Break"),
    BreakSpec::new(15, 900, "Awards Break"),
    BreakSpec::new(16, 900, "Awards Break"),
];

enum Side {
    Seed(u32),
    W(u32),
    L(u32),
}

/// `(number, red, blue, name detail, duration)` for M1..M13.
const LAYOUT: [(u32, Side, Side, &str, u32); 13] = [
    (1, Side::Seed(1), Side::Seed(8), "Round 1 Upper", 540),
    (2, Side::Seed(4), Side::Seed(5), "Round 1 Upper", 540),
    (3, Side::Seed(2), Side::Seed(7), "Round 1 Upper", 540),
    (4, Side::Seed(3), Side::Seed(6), "Round 1 Upper", 540),
    (5, Side::L(1), Side::L(2), "Round 2 Lower", 540),
    (6, Side::L(3), Side::L(4), "Round 2 Lower", 540),
    (7, Side::W(1), Side::W(2), "Round 2 Upper", 540),
    (8, Side::W(3), Side::W(4), "Round 2 Upper", 540),
    (9, Side::L(7), Side::W(6), "Round 3 Lower", 540),
    (10, Side::L(8), Side::W(5), "Round 3 Lower", 300),
    (11, Side::W(7), Side::W(8), "Round 4 Upper", 540),
    (12, Side::W(10), Side::W(9), "Round 4 Lower", 300),
    (13, Side::L(11), Side::W(12), "Round 5 Lower", 300),
];

fn source(side: &Side) -> SourceTemplate {
    match *side {
        Side::Seed(seed) => SourceTemplate::Selection(seed),
        Side::W(n) => SourceTemplate::Winner(format!("M{}", n)),
        Side::L(n) => SourceTemplate::Loser(format!("M{}", n)),
    }
}

pub(crate) fn templates(num_alliances: u32) -> Result<(Vec<MatchupTemplate>, Vec<BreakSpec>), PlayoffError> {
    if num_alliances != 8 {
        return Err(PlayoffError::InvalidAllianceCount {
            playoff_type: "double-elimination",
            requirement: "must have exactly 8 alliances",
            num_alliances,
        });
    }

    let mut templates: Vec<MatchupTemplate> = LAYOUT
        .iter()
        .map(|(number, red, blue, detail, duration_sec)| MatchupTemplate {
            id: format!("M{}", number),
            num_wins_to_advance: 1,
            red: source(red),
            blue: source(blue),
            specs: vec![MatchSpec {
                long_name: format!("Match {}", number),
                short_name: format!("M{}", number),
                name_detail: detail.to_string(),
                order: *number,
                duration_sec: *duration_sec,
                use_tiebreak_criteria: true,
                tba_match_key: TbaMatchKey::new("sf", *number, 1),
                ..Default::default()
            }],
        })
        .collect();

    templates.push(MatchupTemplate {
        id: FINAL_MATCHUP_ID.to_string(),
        num_wins_to_advance: 2,
        red: SourceTemplate::Winner("M11".to_string()),
        blue: SourceTemplate::Winner("M13".to_string()),
        specs: final_matches(14),
    });

    Ok((templates, BREAKS.to_vec()))
}
