/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Event settings loading and management.
//!
//! The expected YAML structure is:
//! ```yaml
//! event:
//!   name: "Sample Event"
//!   num_playoff_alliances: 8
//!   playoff_type: double_elimination
//! schedules_dir: "schedules"
//! plc:
//!   address: "10.0.100.10"
//! lighting:
//!   red_hub:  { host: "10.0.100.20", universe: 1, start_channel: 0 }
//!   blue_hub: { host: "10.0.100.21", universe: 2, start_channel: 0 }
//! access_point:
//!   address: "10.0.100.2"
//!   password: "secret"
//!   channel: 157
//!   network_security_enabled: true
//! scc:
//!   red:  { address: "10.0.100.48", username: "admin", password: "x", up_commands: [], down_commands: [] }
//!   blue: { address: "10.0.100.49", username: "admin", password: "x", up_commands: [], down_commands: [] }
//! judging:
//!   num_judges: 3
//!   duration_minutes: 23
//!   previous_spacing_minutes: 17
//!   next_spacing_minutes: 14
//! ```
//!
//! Every section is optional; an absent section or field takes the value of
//! [`EventSettings::default`].  An empty PLC address or hub host leaves that
//! peripheral disabled.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::network::SccSettings;
use crate::playoff::PlayoffType;
use crate::tournament::JudgingScheduleParams;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
struct EventConfigFile {
    #[serde(default)]
    event: EventSection,
    #[serde(default = "default_schedules_dir")]
    schedules_dir: PathBuf,
    #[serde(default)]
    plc: PlcSection,
    #[serde(default)]
    lighting: LightingSection,
    #[serde(default)]
    access_point: AccessPointSection,
    #[serde(default)]
    scc: SccSection,
    #[serde(default)]
    judging: JudgingSection,
}

#[derive(Debug, Deserialize)]
struct EventSection {
    #[serde(default = "default_event_name")]
    name: String,
    #[serde(default = "default_num_playoff_alliances")]
    num_playoff_alliances: u32,
    #[serde(default)]
    playoff_type: PlayoffType,
}

impl Default for EventSection {
    fn default() -> Self {
        Self {
            name: default_event_name(),
            num_playoff_alliances: default_num_playoff_alliances(),
            playoff_type: PlayoffType::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PlcSection {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct LightingSection {
    #[serde(default = "default_red_hub")]
    red_hub: LightingTarget,
    #[serde(default = "default_blue_hub")]
    blue_hub: LightingTarget,
}

impl Default for LightingSection {
    fn default() -> Self {
        Self {
            red_hub: default_red_hub(),
            blue_hub: default_blue_hub(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccessPointSection {
    #[serde(default)]
    address: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_ap_channel")]
    channel: u32,
    #[serde(default)]
    network_security_enabled: bool,
}

impl Default for AccessPointSection {
    fn default() -> Self {
        Self {
            address: String::new(),
            password: String::new(),
            channel: default_ap_channel(),
            network_security_enabled: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SccSection {
    #[serde(default)]
    red: SccSettings,
    #[serde(default)]
    blue: SccSettings,
}

/// Judging parameters; each one falls back on its own.
#[derive(Debug, Deserialize)]
struct JudgingSection {
    #[serde(default = "default_num_judges")]
    num_judges: u32,
    #[serde(default = "default_judging_duration")]
    duration_minutes: u32,
    #[serde(default = "default_previous_spacing")]
    previous_spacing_minutes: u32,
    #[serde(default = "default_next_spacing")]
    next_spacing_minutes: u32,
}

impl Default for JudgingSection {
    fn default() -> Self {
        Self {
            num_judges: default_num_judges(),
            duration_minutes: default_judging_duration(),
            previous_spacing_minutes: default_previous_spacing(),
            next_spacing_minutes: default_next_spacing(),
        }
    }
}

fn default_event_name() -> String {
    String::from("Untitled Event")
}

fn default_num_playoff_alliances() -> u32 {
    8
}

fn default_schedules_dir() -> PathBuf {
    PathBuf::from("schedules")
}

fn default_red_hub() -> LightingTarget {
    LightingTarget {
        host: String::new(),
        universe: 1,
        start_channel: 0,
    }
}

fn default_blue_hub() -> LightingTarget {
    LightingTarget {
        host: String::new(),
        universe: 2,
        start_channel: 0,
    }
}

fn default_ap_channel() -> u32 {
    157
}

fn default_num_judges() -> u32 {
    3
}

fn default_judging_duration() -> u32 {
    23
}

fn default_previous_spacing() -> u32 {
    17
}

fn default_next_spacing() -> u32 {
    14
}

// ── Public data structures ────────────────────────────────────────────────────

/// One sACN light bar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LightingTarget {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_universe")]
    pub universe: u16,
    #[serde(default)]
    pub start_channel: usize,
}

fn default_universe() -> u16 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointSettings {
    pub address: String,
    pub password: String,
    pub channel: u32,
    pub network_security_enabled: bool,
}

/// Everything the daemon needs to stand up one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSettings {
    pub name: String,
    pub num_playoff_alliances: u32,
    pub playoff_type: PlayoffType,
    pub schedules_dir: PathBuf,
    /// Empty when the field runs without a PLC.
    pub plc_address: String,
    pub red_hub: LightingTarget,
    pub blue_hub: LightingTarget,
    pub access_point: AccessPointSettings,
    pub scc_red: SccSettings,
    pub scc_blue: SccSettings,
    pub judging: JudgingScheduleParams,
}

impl From<EventConfigFile> for EventSettings {
    fn from(file: EventConfigFile) -> Self {
        Self {
            name: file.event.name,
            num_playoff_alliances: file.event.num_playoff_alliances,
            playoff_type: file.event.playoff_type,
            schedules_dir: file.schedules_dir,
            plc_address: file.plc.address,
            red_hub: file.lighting.red_hub,
            blue_hub: file.lighting.blue_hub,
            access_point: AccessPointSettings {
                address: file.access_point.address,
                password: file.access_point.password,
                channel: file.access_point.channel,
                network_security_enabled: file.access_point.network_security_enabled,
            },
            scc_red: file.scc.red,
            scc_blue: file.scc.blue,
            judging: JudgingScheduleParams {
                num_judges: file.judging.num_judges,
                duration_minutes: file.judging.duration_minutes,
                previous_spacing_minutes: file.judging.previous_spacing_minutes,
                next_spacing_minutes: file.judging.next_spacing_minutes,
            },
        }
    }
}

impl Default for EventSettings {
    fn default() -> Self {
        EventConfigFile {
            schedules_dir: default_schedules_dir(),
            ..Default::default()
        }
        .into()
    }
}

// ── EventConfigManager ────────────────────────────────────────────────────────

/// Loads and holds the event settings.
#[derive(Debug, Default)]
pub struct EventConfigManager {
    settings: EventSettings,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl EventConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces the current settings.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.  The previous settings are kept in that case but
    /// [`is_loaded`](Self::is_loaded) turns false.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading event settings from: {}", path.display());
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        // An empty document parses as unit; treat it as all defaults.
        let file: EventConfigFile = if content.trim().is_empty() {
            EventConfigFile {
                schedules_dir: default_schedules_dir(),
                ..Default::default()
            }
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?
        };

        self.settings = file.into();
        self.loaded = true;

        let s = &self.settings;
        info!(
            event = %s.name,
            playoff_type = %s.playoff_type,
            alliances = s.num_playoff_alliances,
            "Successfully loaded event settings"
        );
        debug!(
            plc = %s.plc_address,
            red_hub = %s.red_hub.host,
            blue_hub = %s.blue_hub.host,
            access_point = %s.access_point.address,
            network_security = s.access_point.network_security_enabled,
            "  Peripherals"
        );
        Ok(())
    }

    pub fn settings(&self) -> &EventSettings {
        &self.settings
    }

    /// Overrides the directory holding the qualification templates.
    pub fn set_schedules_dir(&mut self, dir: impl Into<PathBuf>) {
        self.settings.schedules_dir = dir.into();
    }

    /// Returns `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_without_a_file() {
        let mgr = EventConfigManager::new();
        assert!(!mgr.is_loaded());
        let s = mgr.settings();
        assert_eq!(s.num_playoff_alliances, 8);
        assert_eq!(s.playoff_type, PlayoffType::DoubleElimination);
        assert_eq!(s.schedules_dir, PathBuf::from("schedules"));
        assert!(s.plc_address.is_empty());
        assert_eq!(s.red_hub.universe, 1);
        assert_eq!(s.blue_hub.universe, 2);
        assert_eq!(s.access_point.channel, 157);
        assert!(!s.access_point.network_security_enabled);
        assert_eq!(s.judging.num_judges, 3);
        assert_eq!(s.judging.duration_minutes, 23);
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
event:
  name: "Chezy Champs"
  num_playoff_alliances: 4
  playoff_type: single_elimination
schedules_dir: "/srv/schedules"
plc:
  address: "10.0.100.10"
lighting:
  red_hub:  { host: "10.0.100.20", universe: 5, start_channel: 3 }
  blue_hub: { host: "10.0.100.21", universe: 6 }
access_point:
  address: "10.0.100.2"
  password: "secret"
  channel: 36
  network_security_enabled: true
scc:
  red:
    address: "10.0.100.48"
    username: "admin"
    password: "x"
    up_commands: ["config", "no shutdown"]
    down_commands: ["config", "shutdown"]
judging:
  num_judges: 4
  duration_minutes: 15
"#;
        let f = yaml_tempfile(yaml);
        let mut mgr = EventConfigManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert!(mgr.is_loaded());
        let s = mgr.settings();
        assert_eq!(s.name, "Chezy Champs");
        assert_eq!(s.num_playoff_alliances, 4);
        assert_eq!(s.playoff_type, PlayoffType::SingleElimination);
        assert_eq!(s.schedules_dir, PathBuf::from("/srv/schedules"));
        assert_eq!(s.plc_address, "10.0.100.10");
        assert_eq!(s.red_hub.start_channel, 3);
        assert_eq!(s.blue_hub.start_channel, 0);
        assert_eq!(s.access_point.channel, 36);
        assert!(s.access_point.network_security_enabled);
        assert_eq!(s.scc_red.down_commands, vec!["config", "shutdown"]);
        assert_eq!(s.scc_blue, SccSettings::default());
        assert_eq!(s.judging.num_judges, 4);
        assert_eq!(s.judging.duration_minutes, 15);
        assert_eq!(s.judging.previous_spacing_minutes, 17);
    }

    #[test]
    fn empty_file_loads_defaults() {
        let f = yaml_tempfile("");
        let mut mgr = EventConfigManager::new();
        mgr.load_from_file(f.path()).unwrap();
        assert!(mgr.is_loaded());
        assert_eq!(mgr.settings(), &EventSettings::default());
    }

    #[test]
    fn unknown_playoff_type_is_rejected() {
        let f = yaml_tempfile("event:\n  playoff_type: round_robin\n");
        let mut mgr = EventConfigManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn missing_file_returns_error() {
        let mut mgr = EventConfigManager::new();
        let result = mgr.load_from_file(Path::new("/nonexistent/path/event.yaml"));
        assert!(result.is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn reload_replaces_previous_settings() {
        let f1 = yaml_tempfile("plc:\n  address: \"10.0.0.1\"\n");
        let f2 = yaml_tempfile("event:\n  name: \"Second\"\n");

        let mut mgr = EventConfigManager::new();
        mgr.load_from_file(f1.path()).unwrap();
        assert_eq!(mgr.settings().plc_address, "10.0.0.1");

        mgr.load_from_file(f2.path()).unwrap();
        assert!(mgr.settings().plc_address.is_empty(), "old PLC address must be gone");
        assert_eq!(mgr.settings().name, "Second");
    }

    #[test]
    fn schedules_dir_override() {
        let mut mgr = EventConfigManager::new();
        mgr.set_schedules_dir("/tmp/templates");
        assert_eq!(mgr.settings().schedules_dir, PathBuf::from("/tmp/templates"));
    }
}
