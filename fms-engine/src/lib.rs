/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! FMS engine – tournament logic and field peripherals of a robotics event.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/       – YAML event settings
//! ├── model/        – persisted entities (teams, alliances, matches, …)
//! ├── game/         – match outcome and ranking order of the current game
//! ├── store/        – persistence trait + in-memory backend
//! ├── playoff/      – single / double elimination bracket
//! ├── tournament/   – qualification schedule, judging schedule, rankings
//! ├── plc/          – Modbus/TCP field PLC
//! ├── sacn/         – E1.31 hub lighting
//! ├── network/      – access point and SCC switches
//! ├── notifier      – change fan-out
//! └── arena/        – supervisor of one running event
//! ```

pub mod arena;
pub mod config;
pub mod game;
pub mod model;
pub mod network;
pub mod notifier;
pub mod playoff;
pub mod plc;
pub mod sacn;
pub mod store;
pub mod tournament;

#[cfg(test)]
mod test_helpers;
