//! Game-specific scoring contract.
//!
//! The engine never looks inside a scoresheet.  It only consumes the
//! [`ScoreSummary`] a scoring front-end produces for each alliance, decides
//! the [`MatchStatus`] from a pair of summaries, and folds summaries into
//! [`RankingFields`].

pub mod match_status;
pub mod ranking;
pub mod score_summary;

pub use match_status::MatchStatus;
pub use ranking::{sort_rankings, Ranking, RankingFields};
pub use score_summary::{determine_match_status, ScoreSummary};
