/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team's off-field interview with one judge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JudgingSlot {
    pub id: u64,
    pub time: DateTime<Utc>,
    pub team_id: u32,
    pub previous_match_number: Option<u32>,
    pub previous_match_time: Option<DateTime<Utc>>,
    pub next_match_number: Option<u32>,
    pub next_match_time: Option<DateTime<Utc>>,
    /// 1-indexed.
    pub judge_number: u32,
}
