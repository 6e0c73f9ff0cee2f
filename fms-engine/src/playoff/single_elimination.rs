/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single-elimination layout for 2 to 16 alliances.
//!
//! Every round below the final is best-of-three.  Matches of one round are
//! interleaved across its groups (`EF1-1, EF2-1, …, EF8-1, EF1-2, …`) so
//! that alliances get a rest between their own matches.

use super::builder::{MatchupTemplate, SourceTemplate};
use super::error::PlayoffError;
use super::matchup::{BreakSpec, MatchSpec, FINAL_MATCHUP_ID};
use crate::model::TbaMatchKey;

/// Eighthfinal pairings, red then blue, group by group.
const EIGHTHFINAL_SEEDS: [u32; 16] = [1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11];

/// First final order; everything before it belongs to the earlier rounds.
const FINAL_START_ORDER: u32 = 43;

const BREAKS: [BreakSpec; 3] = [
    BreakSpec::new(43, 480, "Field Break"),
    BreakSpec::new(44, 480, "Field Break"),
    BreakSpec::new(45, 480, "Field Break"),
];

struct Round {
    short: &'static str,
    long: &'static str,
    num_groups: u32,
    first_order: u32,
}

const ROUNDS: [Round; 3] = [
    Round {
        short: "EF",
        long: "Eighthfinal",
        num_groups: 8,
        first_order: 1,
    },
    Round {
        short: "QF",
        long: "Quarterfinal",
        num_groups: 4,
        first_order: 25,
    },
    Round {
        short: "SF",
        long: "Semifinal",
        num_groups: 2,
        first_order: 37,
    },
];

pub(crate) fn templates(num_alliances: u32) -> Result<(Vec<MatchupTemplate>, Vec<BreakSpec>), PlayoffError> {
    if num_alliances < 2 {
        return Err(PlayoffError::InvalidAllianceCount {
            playoff_type: "single-elimination",
            requirement: "must have at least 2 alliances",
            num_alliances,
        });
    }
    if num_alliances > 16 {
        return Err(PlayoffError::InvalidAllianceCount {
            playoff_type: "single-elimination",
            requirement: "must have at most 16 alliances",
            num_alliances,
        });
    }

    let mut templates = Vec::new();
    for (round_index, round) in ROUNDS.iter().enumerate() {
        for group in 1..=round.num_groups {
            let (red, blue) = if round_index == 0 {
                let i = (group as usize - 1) * 2;
                (
                    SourceTemplate::Selection(EIGHTHFINAL_SEEDS[i]),
                    SourceTemplate::Selection(EIGHTHFINAL_SEEDS[i + 1]),
                )
            } else {
                let lower = ROUNDS[round_index - 1].short;
                (
                    SourceTemplate::Winner(format!("{}{}", lower, 2 * group - 1)),
                    SourceTemplate::Winner(format!("{}{}", lower, 2 * group)),
                )
            };
            templates.push(MatchupTemplate {
                id: format!("{}{}", round.short, group),
                num_wins_to_advance: 2,
                red,
                blue,
                specs: (1..=3).map(|n| pre_final_match(round, group, n)).collect(),
            });
        }
    }

    templates.push(MatchupTemplate {
        id: FINAL_MATCHUP_ID.to_string(),
        num_wins_to_advance: 2,
        red: SourceTemplate::Winner("SF1".to_string()),
        blue: SourceTemplate::Winner("SF2".to_string()),
        specs: final_matches(FINAL_START_ORDER),
    });

    Ok((templates, BREAKS.to_vec()))
}

fn pre_final_match(round: &Round, group: u32, number: u32) -> MatchSpec {
    MatchSpec {
        long_name: format!("{} {}-{}", round.long, group, number),
        short_name: format!("{}{}-{}", round.short, group, number),
        order: round.first_order + (group - 1) + (number - 1) * round.num_groups,
        duration_sec: 600,
        use_tiebreak_criteria: true,
        tba_match_key: TbaMatchKey::new(&round.short.to_lowercase(), group, number),
        ..Default::default()
    }
}

/// Best-of-three final plus three hidden overtimes, starting at `start_order`.
pub(crate) fn final_matches(start_order: u32) -> Vec<MatchSpec> {
    let regular = (1..=3).map(|n| MatchSpec {
        long_name: format!("Final {}", n),
        short_name: format!("F{}", n),
        order: start_order + n - 1,
        duration_sec: 300,
        use_tiebreak_criteria: false,
        tba_match_key: TbaMatchKey::new("f", 1, n),
        ..Default::default()
    });
    let overtime = (1..=3).map(|n| MatchSpec {
        long_name: format!("Overtime {}", n),
        short_name: format!("O{}", n),
        order: start_order + 2 + n,
        duration_sec: 600,
        use_tiebreak_criteria: true,
        hidden_by_default: true,
        is_hidden: true,
        tba_match_key: TbaMatchKey::new("f", 1, 3 + n),
        ..Default::default()
    });
    regular.chain(overtime).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alliance_count_bounds() {
        assert!(matches!(
            templates(1),
            Err(PlayoffError::InvalidAllianceCount { num_alliances: 1, .. })
        ));
        let err = templates(17).unwrap_err();
        assert_eq!(
            err.to_string(),
            "single-elimination bracket must have at most 16 alliances"
        );
        assert!(templates(16).is_ok());
    }

    #[test]
    fn round_orders_interleave_groups() {
        let (t, _) = templates(16).unwrap();
        let ef1 = t.iter().find(|m| m.id == "EF1").unwrap();
        assert_eq!(ef1.specs.iter().map(|s| s.order).collect::<Vec<_>>(), vec![1, 9, 17]);
        let qf3 = t.iter().find(|m| m.id == "QF3").unwrap();
        assert_eq!(qf3.specs.iter().map(|s| s.order).collect::<Vec<_>>(), vec![27, 31, 35]);
        let sf2 = t.iter().find(|m| m.id == "SF2").unwrap();
        assert_eq!(sf2.specs.iter().map(|s| s.order).collect::<Vec<_>>(), vec![38, 40, 42]);
        assert_eq!(sf2.specs[0].long_name, "Semifinal 2-1");
        assert_eq!(sf2.specs[0].short_name, "SF2-1");
        assert_eq!(sf2.specs[0].tba_match_key, TbaMatchKey::new("sf", 2, 1));
        assert_eq!(qf3.red, SourceTemplate::Winner("EF5".to_string()));
        assert_eq!(qf3.blue, SourceTemplate::Winner("EF6".to_string()));
    }

    #[test]
    fn final_specs() {
        let specs = final_matches(43);
        let orders: Vec<u32> = specs.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![43, 44, 45, 46, 47, 48]);
        assert!(specs[..3].iter().all(|s| !s.hidden_by_default && s.duration_sec == 300));
        assert!(specs[3..].iter().all(|s| s.hidden_by_default && s.use_tiebreak_criteria));
        assert_eq!(specs[4].short_name, "O2");
        assert_eq!(specs[5].tba_match_key, TbaMatchKey::new("f", 1, 6));
    }
}
