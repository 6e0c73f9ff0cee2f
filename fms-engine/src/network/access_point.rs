/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Client for the field access point's HTTP API.
//!
//! | Endpoint | Use |
//! |---|---|
//! | `POST /configuration` | provision one SSID + WPA key per station |
//! | `GET /status` | radio status and per-station link statistics |
//!
//! Every request carries `Authorization: Bearer <password>`.  The status
//! poller runs only while network security is enabled; with it disabled the
//! teams join an open field network and there is nothing to provision.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::model::Team;

pub const POLL_PERIOD: Duration = Duration::from_secs(1);
pub const CONFIGURE_TIMEOUT: Duration = Duration::from_secs(3);
pub const STATION_NAMES: [&str; 6] = ["red1", "red2", "red3", "blue1", "blue2", "blue3"];

const STATUS_ACTIVE: &str = "ACTIVE";
const STATUS_ERROR: &str = "ERROR";
const STATUS_UNKNOWN: &str = "UNKNOWN";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AccessPointError {
    #[error("access point request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("access point returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("invalid WPA key length {length} for team {team} (must be 8-63 characters)")]
    InvalidWpaKey { team: u32, length: usize },
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationRequest {
    channel: u32,
    station_configurations: BTreeMap<&'static str, StationConfiguration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StationConfiguration {
    ssid: String,
    wpa_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(default)]
    channel: u32,
    #[serde(default)]
    status: String,
    #[serde(default)]
    station_statuses: HashMap<String, Option<StationStatus>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StationStatus {
    ssid: String,
    is_linked: bool,
    rx_rate_mbps: f64,
    tx_rate_mbps: f64,
    signal_noise_ratio: i32,
    bandwidth_used_mbps: f64,
    connection_quality: String,
}

/// Link statistics for the team on one alliance station.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamWifiStatus {
    pub team_id: u32,
    pub radio_linked: bool,
    pub rx_rate_mbps: f64,
    pub tx_rate_mbps: f64,
    pub signal_noise_ratio: i32,
    pub bandwidth_used_mbps: f64,
    /// 0 (unknown) to 4 (excellent).
    pub connection_quality: u8,
}

impl From<&StationStatus> for TeamWifiStatus {
    fn from(station: &StationStatus) -> Self {
        Self {
            // Non-numeric SSIDs map to no team.
            team_id: station.ssid.parse().unwrap_or(0),
            radio_linked: station.is_linked,
            rx_rate_mbps: station.rx_rate_mbps,
            tx_rate_mbps: station.tx_rate_mbps,
            signal_noise_ratio: station.signal_noise_ratio,
            bandwidth_used_mbps: station.bandwidth_used_mbps,
            connection_quality: connection_quality_level(&station.connection_quality),
        }
    }
}

pub fn connection_quality_level(quality: &str) -> u8 {
    match quality {
        "caution" => 1,
        "warning" => 2,
        "good" => 3,
        "excellent" => 4,
        _ => 0,
    }
}

// ── AccessPoint ───────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ApState {
    status: String,
    channel: u32,
    team_wifi_statuses: [TeamWifiStatus; 6],
    /// Teams of the last successful configuration, by station.
    configured_teams: Option<[Option<Team>; 6]>,
}

pub struct AccessPoint {
    base_url: String,
    password: String,
    channel: u32,
    network_security_enabled: bool,
    http: reqwest::Client,
    state: Mutex<ApState>,
}

impl AccessPoint {
    /// `address` is `host` or `host:port`.
    pub fn new(address: &str, password: impl Into<String>, channel: u32, network_security_enabled: bool) -> Self {
        Self {
            base_url: format!("http://{}", address),
            password: password.into(),
            channel,
            network_security_enabled,
            http: reqwest::Client::new(),
            state: Mutex::new(ApState {
                status: STATUS_UNKNOWN.to_string(),
                channel: 0,
                team_wifi_statuses: Default::default(),
                configured_teams: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ApState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn network_security_enabled(&self) -> bool {
        self.network_security_enabled
    }

    /// Last radio status reported by the access point, `"ERROR"` after a
    /// failed poll.
    pub fn status(&self) -> String {
        self.state().status.clone()
    }

    /// Channel the radio reported on the last successful poll.
    pub fn reported_channel(&self) -> u32 {
        self.state().channel
    }

    pub fn team_wifi_statuses(&self) -> [TeamWifiStatus; 6] {
        self.state().team_wifi_statuses.clone()
    }

    /// Provisions all six stations.  An empty station gets a placeholder
    /// network (`no-team-<position>`) so it stops serving the previous
    /// team's SSID.
    pub async fn configure_team_wifi(&self, teams: [Option<Team>; 6]) -> Result<(), AccessPointError> {
        if !self.network_security_enabled {
            return Ok(());
        }

        let mut station_configurations = BTreeMap::new();
        for (position, (station, team)) in STATION_NAMES.iter().zip(teams.iter()).enumerate() {
            let config = match team {
                Some(team) => {
                    let length = team.wpa_key.len();
                    if !(8..=63).contains(&length) {
                        return Err(AccessPointError::InvalidWpaKey { team: team.id, length });
                    }
                    StationConfiguration {
                        ssid: team.id.to_string(),
                        wpa_key: team.wpa_key.clone(),
                    }
                }
                None => {
                    let placeholder = format!("no-team-{}", position + 1);
                    StationConfiguration {
                        ssid: placeholder.clone(),
                        wpa_key: placeholder,
                    }
                }
            };
            station_configurations.insert(*station, config);
        }
        let request = ConfigurationRequest {
            channel: self.channel,
            station_configurations,
        };

        debug!(stations = request.station_configurations.len(), "posting access point configuration");
        let response = self
            .http
            .post(format!("{}/configuration", self.base_url))
            .bearer_auth(&self.password)
            .timeout(CONFIGURE_TIMEOUT)
            .json(&request)
            .send()
            .await?;
        let code = response.status();
        if !code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AccessPointError::Status { code: code.as_u16(), body });
        }

        info!(channel = self.channel, "✓ Access point configured");
        self.state().configured_teams = Some(teams);
        Ok(())
    }

    /// Polls `/status` once and refreshes the per-station statistics.
    /// Re-provisions the access point when it is active but serving SSIDs
    /// other than the last configured teams.
    pub async fn update_monitoring(&self) -> Result<(), AccessPointError> {
        let reply = match self.fetch_status().await {
            Ok(reply) => reply,
            Err(e) => {
                self.state().status = STATUS_ERROR.to_string();
                return Err(e);
            }
        };

        let reconfigure = {
            let mut state = self.state();
            let was_active = state.status == STATUS_ACTIVE;
            state.status = reply.status.clone();
            state.channel = reply.channel;
            for (slot, station) in STATION_NAMES.iter().enumerate() {
                state.team_wifi_statuses[slot] = match reply.station_statuses.get(*station) {
                    Some(Some(status)) => TeamWifiStatus::from(status),
                    _ => TeamWifiStatus::default(),
                };
            }

            if !was_active && state.status == STATUS_ACTIVE {
                info!(channel = reply.channel, "Access point is active");
                for (station, wifi) in STATION_NAMES.iter().zip(state.team_wifi_statuses.iter()) {
                    info!(
                        station,
                        team = wifi.team_id,
                        linked = wifi.radio_linked,
                        quality = wifi.connection_quality,
                        "station status"
                    );
                }
            }

            match &state.configured_teams {
                Some(teams) if state.status == STATUS_ACTIVE => {
                    let expected = teams.iter().map(|t| t.as_ref().map_or(0, |t| t.id));
                    let serving = state.team_wifi_statuses.iter().map(|s| s.team_id);
                    if expected.eq(serving) {
                        None
                    } else {
                        Some(teams.clone())
                    }
                }
                _ => None,
            }
        };

        if let Some(teams) = reconfigure {
            warn!("Access point SSIDs do not match the configured teams; reconfiguring");
            if let Err(e) = self.configure_team_wifi(teams).await {
                error!(error = %e, "Failed to reconfigure access point");
            }
        }
        Ok(())
    }

    async fn fetch_status(&self) -> Result<StatusResponse, AccessPointError> {
        let response = self
            .http
            .get(format!("{}/status", self.base_url))
            .bearer_auth(&self.password)
            .send()
            .await?;
        let code = response.status();
        if !code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AccessPointError::Status { code: code.as_u16(), body });
        }
        Ok(response.json().await?)
    }

    /// Polls the access point until `shutdown` flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        if !self.network_security_enabled {
            debug!("network security disabled; access point poller not started");
            return;
        }
        info!(url = %self.base_url, "=== AccessPoint::run() ===");
        let mut ticker = interval(POLL_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            if let Err(e) = self.update_monitoring().await {
                warn!(error = %e, "Access point poll failed");
            }
        }
        info!("Access point poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[derive(Clone, Default)]
    struct FakeAp {
        configurations: Arc<Mutex<Vec<Value>>>,
        /// Canned `/status` reply; `Null` serves whatever was configured.
        status: Arc<Mutex<Value>>,
        reject: Arc<Mutex<bool>>,
        /// Station name → SSID, as applied from each configuration.
        serving: Arc<Mutex<BTreeMap<String, String>>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == "Bearer secret")
    }

    async fn post_configuration(
        State(ap): State<FakeAp>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, "unauthorized".into());
        }
        if *ap.reject.lock().unwrap() {
            return (StatusCode::BAD_REQUEST, "bad channel".into());
        }
        if let Some(stations) = body["stationConfigurations"].as_object() {
            let mut serving = ap.serving.lock().unwrap();
            for (station, config) in stations {
                serving.insert(station.clone(), config["ssid"].as_str().unwrap_or_default().to_string());
            }
        }
        ap.configurations.lock().unwrap().push(body);
        (StatusCode::OK, String::new())
    }

    async fn get_status(State(ap): State<FakeAp>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let canned = ap.status.lock().unwrap().clone();
        if !canned.is_null() {
            return Ok(Json(canned));
        }
        let stations: serde_json::Map<String, Value> = ap
            .serving
            .lock()
            .unwrap()
            .iter()
            .map(|(station, ssid)| (station.clone(), json!({ "ssid": ssid, "isLinked": true })))
            .collect();
        Ok(Json(json!({ "channel": 157, "status": "ACTIVE", "stationStatuses": stations })))
    }

    async fn spawn_fake_ap() -> (FakeAp, String) {
        let ap = FakeAp::default();
        let app = Router::new()
            .route("/configuration", post(post_configuration))
            .route("/status", get(get_status))
            .with_state(ap.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (ap, address)
    }

    fn team(id: u32, key: &str) -> Option<Team> {
        Some(Team {
            id,
            wpa_key: key.to_string(),
            ..Default::default()
        })
    }

    // ── configuration ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn configure_fills_empty_stations_with_placeholders() {
        let (fake, address) = spawn_fake_ap().await;
        let ap = AccessPoint::new(&address, "secret", 157, true);

        ap.configure_team_wifi([team(254, "aaaaaaaa"), None, None, team(1114, "bbbbbbbb"), None, None])
            .await
            .unwrap();

        let posted = fake.configurations.lock().unwrap().clone();
        assert_eq!(posted.len(), 1);
        assert_eq!(
            posted[0],
            json!({
                "channel": 157,
                "stationConfigurations": {
                    "red1": { "ssid": "254", "wpaKey": "aaaaaaaa" },
                    "red2": { "ssid": "no-team-2", "wpaKey": "no-team-2" },
                    "red3": { "ssid": "no-team-3", "wpaKey": "no-team-3" },
                    "blue1": { "ssid": "1114", "wpaKey": "bbbbbbbb" },
                    "blue2": { "ssid": "no-team-5", "wpaKey": "no-team-5" },
                    "blue3": { "ssid": "no-team-6", "wpaKey": "no-team-6" }
                }
            })
        );
    }

    #[tokio::test]
    async fn partial_lineup_replaces_previous_teams_and_settles() {
        let (fake, address) = spawn_fake_ap().await;
        let ap = AccessPoint::new(&address, "secret", 157, true);
        let key = "abcdefgh";

        ap.configure_team_wifi([
            team(1, key),
            team(2, key),
            team(3, key),
            team(4, key),
            team(5, key),
            team(6, key),
        ])
        .await
        .unwrap();
        ap.configure_team_wifi([team(7, key), None, None, None, None, None])
            .await
            .unwrap();

        for _ in 0..5 {
            ap.update_monitoring().await.unwrap();
        }

        assert_eq!(fake.configurations.lock().unwrap().len(), 2);
        let serving: Vec<u32> = ap.team_wifi_statuses().iter().map(|s| s.team_id).collect();
        assert_eq!(serving, vec![7, 0, 0, 0, 0, 0]);
        assert_eq!(fake.serving.lock().unwrap()["blue3"], "no-team-6");
    }

    #[tokio::test]
    async fn configure_rejects_bad_wpa_key() {
        let ap = AccessPoint::new("127.0.0.1:9", "secret", 157, true);
        let err = ap
            .configure_team_wifi([team(254, "short"), None, None, None, None, None])
            .await
            .unwrap_err();
        assert!(matches!(err, AccessPointError::InvalidWpaKey { team: 254, length: 5 }));

        let long = "x".repeat(64);
        let err = ap
            .configure_team_wifi([None, team(1, &long), None, None, None, None])
            .await
            .unwrap_err();
        assert!(matches!(err, AccessPointError::InvalidWpaKey { team: 1, length: 64 }));
    }

    #[tokio::test]
    async fn configure_surfaces_error_status() {
        let (fake, address) = spawn_fake_ap().await;
        *fake.reject.lock().unwrap() = true;
        let ap = AccessPoint::new(&address, "secret", 157, true);

        let err = ap
            .configure_team_wifi([team(254, "aaaaaaaa"), None, None, None, None, None])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "access point returned status 400: bad channel");
        assert_eq!(ap.status(), "UNKNOWN");
    }

    #[tokio::test]
    async fn configure_is_skipped_without_network_security() {
        let ap = AccessPoint::new("127.0.0.1:9", "secret", 157, false);
        ap.configure_team_wifi([team(254, "short"), None, None, None, None, None])
            .await
            .unwrap();
    }

    // ── monitoring ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn monitoring_maps_station_statuses() {
        let (fake, address) = spawn_fake_ap().await;
        *fake.status.lock().unwrap() = json!({
            "channel": 157,
            "status": "ACTIVE",
            "stationStatuses": {
                "red1": {
                    "ssid": "254", "isLinked": true, "rxRateMbps": 12.5, "txRateMbps": 6.0,
                    "signalNoiseRatio": 40, "bandwidthUsedMbps": 1.5, "connectionQuality": "excellent"
                },
                "red2": { "ssid": "no-team", "isLinked": false, "connectionQuality": "caution" },
                "blue3": null
            }
        });
        let ap = AccessPoint::new(&address, "secret", 157, true);

        ap.update_monitoring().await.unwrap();
        assert_eq!(ap.status(), "ACTIVE");
        assert_eq!(ap.reported_channel(), 157);
        let statuses = ap.team_wifi_statuses();
        assert_eq!(statuses[0].team_id, 254);
        assert!(statuses[0].radio_linked);
        assert_eq!(statuses[0].rx_rate_mbps, 12.5);
        assert_eq!(statuses[0].connection_quality, 4);
        assert_eq!(statuses[1].team_id, 0);
        assert_eq!(statuses[1].connection_quality, 1);
        assert_eq!(statuses[5], TeamWifiStatus::default());
    }

    #[tokio::test]
    async fn monitoring_failure_sets_error_status() {
        let ap = AccessPoint::new("127.0.0.1:9", "wrong", 157, true);
        assert!(ap.update_monitoring().await.is_err());
        assert_eq!(ap.status(), "ERROR");
    }

    #[tokio::test]
    async fn active_with_wrong_ssids_triggers_reconfigure() {
        let (fake, address) = spawn_fake_ap().await;
        let ap = AccessPoint::new(&address, "secret", 157, true);
        ap.configure_team_wifi([team(254, "aaaaaaaa"), None, None, None, None, None])
            .await
            .unwrap();

        *fake.status.lock().unwrap() = json!({
            "channel": 157,
            "status": "ACTIVE",
            "stationStatuses": { "red1": { "ssid": "1114" } }
        });
        ap.update_monitoring().await.unwrap();
        assert_eq!(fake.configurations.lock().unwrap().len(), 2);

        *fake.status.lock().unwrap() = json!({
            "channel": 157,
            "status": "ACTIVE",
            "stationStatuses": { "red1": { "ssid": "254" } }
        });
        ap.update_monitoring().await.unwrap();
        assert_eq!(fake.configurations.lock().unwrap().len(), 2);
    }

    #[test]
    fn quality_levels() {
        assert_eq!(connection_quality_level("warning"), 2);
        assert_eq!(connection_quality_level("good"), 3);
        assert_eq!(connection_quality_level("bogus"), 0);
    }
}
