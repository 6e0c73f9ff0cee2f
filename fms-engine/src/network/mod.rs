/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Field network peripherals: the team access point and the SCC switches.

pub mod access_point;
pub mod scc_switch;

pub use access_point::{AccessPoint, AccessPointError, TeamWifiStatus};
pub use scc_switch::{SccSettings, SccSwitch, SccSwitchError, ShellConnector, ShellSession, SwitchStatus};
