/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::MatchStatus;

/// Per-alliance totals produced by the scoring front-end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Points earned by the alliance itself, excluding fouls.
    pub match_points: i32,
    /// Points awarded for opponent fouls.
    pub foul_points: i32,
    /// `match_points + foul_points`.
    pub score: i32,
    pub auto_points: i32,
    pub endgame_points: i32,
    pub bonus_ranking_points: i32,
    pub num_opponent_major_fouls: i32,
}

/// Decides the outcome of a match from both summaries.
///
/// Qualification matches are decided on score alone.  Playoff matches break
/// score ties on opponent major fouls, then auto points, then endgame points.
pub fn determine_match_status(
    red: &ScoreSummary,
    blue: &ScoreSummary,
    apply_playoff_tiebreakers: bool,
) -> MatchStatus {
    let mut keys = vec![(red.score, blue.score)];
    if apply_playoff_tiebreakers {
        keys.push((red.num_opponent_major_fouls, blue.num_opponent_major_fouls));
        keys.push((red.auto_points, blue.auto_points));
        keys.push((red.endgame_points, blue.endgame_points));
    }

    for (r, b) in keys {
        match r.cmp(&b) {
            Ordering::Greater => return MatchStatus::RedWon,
            Ordering::Less => return MatchStatus::BlueWon,
            Ordering::Equal => {}
        }
    }
    MatchStatus::Tie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: i32, fouls: i32, auto: i32, endgame: i32) -> ScoreSummary {
        ScoreSummary {
            score,
            num_opponent_major_fouls: fouls,
            auto_points: auto,
            endgame_points: endgame,
            ..Default::default()
        }
    }

    #[test]
    fn score_decides_first() {
        let red = summary(50, 0, 0, 0);
        let blue = summary(49, 5, 30, 30);
        assert_eq!(determine_match_status(&red, &blue, true), MatchStatus::RedWon);
        assert_eq!(determine_match_status(&blue, &red, false), MatchStatus::BlueWon);
    }

    #[test]
    fn qualification_ties_stand() {
        let red = summary(50, 3, 10, 0);
        let blue = summary(50, 0, 0, 0);
        assert_eq!(determine_match_status(&red, &blue, false), MatchStatus::Tie);
    }

    #[test]
    fn playoff_tiebreakers_apply_in_order() {
        assert_eq!(
            determine_match_status(&summary(50, 1, 0, 0), &summary(50, 0, 20, 20), true),
            MatchStatus::RedWon
        );
        assert_eq!(
            determine_match_status(&summary(50, 1, 10, 30), &summary(50, 1, 20, 0), true),
            MatchStatus::BlueWon
        );
        assert_eq!(
            determine_match_status(&summary(50, 1, 20, 30), &summary(50, 1, 20, 0), true),
            MatchStatus::RedWon
        );
        assert_eq!(
            determine_match_status(&summary(50, 1, 20, 5), &summary(50, 1, 20, 5), true),
            MatchStatus::Tie
        );
    }
}
