/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::MatchType;

/// A window of consecutive, evenly spaced matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub id: u64,
    pub match_type: MatchType,
    pub start_time: DateTime<Utc>,
    pub num_matches: u32,
    pub match_spacing_sec: u32,
}

impl ScheduleBlock {
    /// Time right after the last match slot of the block.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::seconds(i64::from(self.num_matches) * i64::from(self.match_spacing_sec))
    }
}

/// A pause inserted before the match with order `type_order_before`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduledBreak {
    pub id: u64,
    pub match_type: MatchType,
    pub type_order_before: u32,
    pub time: DateTime<Utc>,
    pub duration_sec: u32,
    pub description: String,
}
