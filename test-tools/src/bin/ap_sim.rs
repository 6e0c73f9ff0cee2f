/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Stand-in field access point for bench testing.
//!
//! Accepts `POST /configuration`, reports `CONFIGURING` for a moment and
//! then serves every configured station as linked on `GET /status`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::info;

use fms_engine::network::access_point::STATION_NAMES;

#[derive(Debug, Parser)]
#[command(name = "ap-sim", about = "Simulated field access point (HTTP API) – not for production")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = 8081)]
    port: u16,

    /// Bearer token the engine must present.
    #[arg(long, default_value = "password")]
    password: String,

    /// Seconds spent in CONFIGURING after each configuration.
    #[arg(long, default_value_t = 2)]
    configure_delay: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationRequest {
    channel: u32,
    #[serde(default)]
    station_configurations: BTreeMap<String, StationConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationConfiguration {
    ssid: String,
    wpa_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReply {
    channel: u32,
    status: &'static str,
    station_statuses: BTreeMap<&'static str, Option<StationStatus>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StationStatus {
    ssid: String,
    is_linked: bool,
    rx_rate_mbps: f64,
    tx_rate_mbps: f64,
    signal_noise_ratio: i32,
    bandwidth_used_mbps: f64,
    connection_quality: &'static str,
}

#[derive(Default)]
struct Radio {
    channel: u32,
    ssids: BTreeMap<String, String>,
    configured_at: Option<Instant>,
}

#[derive(Clone)]
struct AppState {
    password: Arc<String>,
    configure_delay: Duration,
    radio: Arc<Mutex<Radio>>,
}

impl AppState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map_or(false, |token| token == self.password.as_str())
    }
}

async fn configure(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ConfigurationRequest>,
) -> (StatusCode, String) {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token".into());
    }
    for (station, config) in &request.station_configurations {
        if !STATION_NAMES.contains(&station.as_str()) {
            return (StatusCode::BAD_REQUEST, format!("unknown station {}", station));
        }
        if !(8..=63).contains(&config.wpa_key.len()) {
            return (StatusCode::BAD_REQUEST, format!("invalid WPA key for station {}", station));
        }
    }

    let mut radio = state.radio.lock().unwrap_or_else(|e| e.into_inner());
    radio.channel = request.channel;
    radio.ssids = request
        .station_configurations
        .into_iter()
        .map(|(station, config)| (station, config.ssid))
        .collect();
    radio.configured_at = Some(Instant::now());
    info!(channel = radio.channel, stations = ?radio.ssids, "configuration received");
    (StatusCode::ACCEPTED, String::new())
}

async fn status(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<StatusReply>, StatusCode> {
    if !state.authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let radio = state.radio.lock().unwrap_or_else(|e| e.into_inner());
    let status = match radio.configured_at {
        Some(at) if at.elapsed() < state.configure_delay => "CONFIGURING",
        _ => "ACTIVE",
    };
    let station_statuses = STATION_NAMES
        .iter()
        .map(|station| {
            let entry = radio.ssids.get(*station).map(|ssid| StationStatus {
                ssid: ssid.clone(),
                is_linked: status == "ACTIVE",
                rx_rate_mbps: 20.0,
                tx_rate_mbps: 10.0,
                signal_noise_ratio: 42,
                bandwidth_used_mbps: 1.25,
                connection_quality: "good",
            });
            (*station, entry)
        })
        .collect();
    Ok(Json(StatusReply {
        channel: radio.channel,
        status,
        station_statuses,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let state = AppState {
        password: Arc::new(cli.password),
        configure_delay: Duration::from_secs(cli.configure_delay),
        radio: Arc::new(Mutex::new(Radio::default())),
    };
    let app = Router::new()
        .route("/configuration", post(configure))
        .route("/status", get(status))
        .with_state(state);

    let address = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Cannot listen on {}", address))?;
    info!(%address, "Access point simulator listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
