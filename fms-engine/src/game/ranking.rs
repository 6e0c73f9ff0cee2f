/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Ranking fields and their ordering.
//!
//! | Key | Direction |
//! |---|---|
//! | ranking points per match | descending |
//! | match points per match | descending |
//! | auto points per match | descending |
//! | endgame points per match | descending |
//! | random | descending |
//!
//! Per-match averages are compared by cross-multiplying with `played` so
//! that no division (and no float rounding) is involved.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::ScoreSummary;

// ── Constants ─────────────────────────────────────────────────────────────────

const WIN_RANKING_POINTS: i32 = 3;
const TIE_RANKING_POINTS: i32 = 1;

// ── RankingFields ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingFields {
    pub ranking_points: i32,
    pub match_points: i32,
    pub auto_points: i32,
    pub endgame_points: i32,
    /// Final tiebreaker in `[0, 1)`.  Assigned by the aggregator, not here.
    pub random: f64,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub disqualifications: i32,
    pub played: i32,
}

impl RankingFields {
    /// Folds one match into the fields.
    ///
    /// A disqualified team is charged the match but earns nothing from it.
    pub fn add_score_summary(&mut self, own: &ScoreSummary, opponent: &ScoreSummary, disqualified: bool) {
        self.played += 1;

        if disqualified {
            self.disqualifications += 1;
            return;
        }

        match own.score.cmp(&opponent.score) {
            Ordering::Greater => {
                self.ranking_points += WIN_RANKING_POINTS;
                self.wins += 1;
            }
            Ordering::Equal => {
                self.ranking_points += TIE_RANKING_POINTS;
                self.ties += 1;
            }
            Ordering::Less => self.losses += 1,
        }
        self.ranking_points += own.bonus_ranking_points;

        self.match_points += own.match_points;
        self.auto_points += own.auto_points;
        self.endgame_points += own.endgame_points;
    }
}

// ── Ranking ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ranking {
    pub team_id: u32,
    pub rank: u32,
    pub previous_rank: u32,
    #[serde(flatten)]
    pub fields: RankingFields,
}

impl Ranking {
    pub fn new(team_id: u32) -> Self {
        Self {
            team_id,
            ..Default::default()
        }
    }

    /// Sort order for the standings: `Less` means `self` ranks higher.
    pub fn standing_cmp(&self, other: &Ranking) -> Ordering {
        let a = &self.fields;
        let b = &other.fields;
        let per_match = |x: i32, y: i32| {
            let lhs = i64::from(x) * i64::from(b.played);
            let rhs = i64::from(y) * i64::from(a.played);
            rhs.cmp(&lhs)
        };

        per_match(a.ranking_points, b.ranking_points)
            .then_with(|| per_match(a.match_points, b.match_points))
            .then_with(|| per_match(a.auto_points, b.auto_points))
            .then_with(|| per_match(a.endgame_points, b.endgame_points))
            .then_with(|| b.random.partial_cmp(&a.random).unwrap_or(Ordering::Equal))
    }
}

/// Sorts in standing order.  Stable, so exact ties keep their input order.
pub fn sort_rankings(rankings: &mut [Ranking]) {
    rankings.sort_by(|a, b| a.standing_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: i32, match_points: i32, bonus: i32) -> ScoreSummary {
        ScoreSummary {
            score,
            match_points,
            bonus_ranking_points: bonus,
            auto_points: 10,
            endgame_points: 5,
            ..Default::default()
        }
    }

    // ── add_score_summary ─────────────────────────────────────────────────────

    #[test]
    fn win_tie_loss_points() {
        let mut f = RankingFields::default();
        f.add_score_summary(&summary(100, 90, 1), &summary(80, 70, 0), false);
        f.add_score_summary(&summary(80, 80, 0), &summary(80, 80, 0), false);
        f.add_score_summary(&summary(20, 20, 2), &summary(80, 80, 0), false);
        assert_eq!(f.ranking_points, 3 + 1 + 1 + 0 + 2);
        assert_eq!((f.wins, f.ties, f.losses, f.played), (1, 1, 1, 3));
        assert_eq!(f.match_points, 190);
        assert_eq!(f.auto_points, 30);
        assert_eq!(f.endgame_points, 15);
    }

    #[test]
    fn disqualification_counts_as_played_only() {
        let mut f = RankingFields::default();
        f.add_score_summary(&summary(100, 90, 1), &summary(80, 70, 0), true);
        assert_eq!(f.played, 1);
        assert_eq!(f.disqualifications, 1);
        assert_eq!(f.ranking_points, 0);
        assert_eq!(f.match_points, 0);
        assert_eq!(f.wins, 0);
    }

    // ── ordering ──────────────────────────────────────────────────────────────

    fn ranking(team_id: u32, rp: i32, mp: i32, played: i32, random: f64) -> Ranking {
        Ranking {
            team_id,
            fields: RankingFields {
                ranking_points: rp,
                match_points: mp,
                played,
                random,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn averages_not_totals_decide() {
        // 6 RP over 3 matches beats 7 RP over 4.
        let mut r = vec![ranking(1, 7, 0, 4, 0.0), ranking(2, 6, 0, 3, 0.0)];
        sort_rankings(&mut r);
        assert_eq!(r[0].team_id, 2);
    }

    #[test]
    fn tiebreakers_fall_through_to_random() {
        let mut r = vec![
            ranking(1, 6, 100, 2, 0.9),
            ranking(2, 6, 120, 2, 0.1),
            ranking(3, 6, 100, 2, 0.95),
        ];
        sort_rankings(&mut r);
        let order: Vec<u32> = r.iter().map(|x| x.team_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn exact_ties_keep_input_order() {
        let mut r = vec![ranking(5, 3, 10, 1, 0.5), ranking(4, 3, 10, 1, 0.5)];
        sort_rankings(&mut r);
        assert_eq!(r[0].team_id, 5);
    }
}
