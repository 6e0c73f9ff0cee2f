/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use serde::{Deserialize, Serialize};

/// A registered team.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub nickname: String,
    /// Per-team key provisioned onto the access point for its station.
    pub wpa_key: String,
    /// Sticky flag: the team carried a card in an earlier match of the
    /// current match type.
    pub yellow_card: bool,
}

impl Team {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}
