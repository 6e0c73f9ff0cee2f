//! Qualification-phase passes: schedule generation, judging slots and
//! rankings.
//!
//! All three are synchronous command handlers over a [`Store`](crate::store::Store).
//! Randomness comes from a caller-supplied `Rng` in the `*_with_rng`
//! variants so tests can seed it.

pub mod error;
pub mod judging;
pub mod rankings;
pub mod schedule;

pub use error::{JudgingError, RankingError, ScheduleError};
pub use judging::{build_judging_schedule, JudgingScheduleParams};
pub use rankings::{calculate_rankings, calculate_team_cards};
pub use schedule::{build_random_schedule, ScheduleTemplates, TEAMS_PER_MATCH};
