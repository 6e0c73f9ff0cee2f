/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Team Ethernet kill switch on the alliance scoring-table switches (SCC).
//!
//! Each switch is reconfigured by logging in over SSH, opening an
//! interactive shell and typing an "up" or "down" command list.  The SSH
//! transport itself sits behind [`ShellConnector`]; this module owns the
//! pacing, the timeouts and the reported status.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

pub const SSH_PORT: u16 = 22;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);
pub const LINE_PACING: Duration = Duration::from_millis(150);

#[derive(Debug, Error)]
pub enum SccSwitchError {
    #[error("timed out connecting to switch {address}")]
    ConnectTimeout { address: String },

    #[error("failed to open shell on switch {address}: {source}")]
    Connect { address: String, source: io::Error },

    #[error("failed to write command to switch: {0}")]
    Write(#[source] io::Error),

    #[error("timed out waiting for command sequence to complete")]
    CompletionTimeout,

    #[error("failed to run command sequence: {0}")]
    Shell(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchStatus {
    Unknown,
    Configuring,
    Active,
    Disabled,
    Error,
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwitchStatus::Unknown => "UNKNOWN",
            SwitchStatus::Configuring => "CONFIGURING",
            SwitchStatus::Active => "ACTIVE",
            SwitchStatus::Disabled => "DISABLED",
            SwitchStatus::Error => "ERROR",
        })
    }
}

/// Login and command lists of one switch, as read from the event settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SccSettings {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub up_commands: Vec<String>,
    #[serde(default)]
    pub down_commands: Vec<String>,
}

/// Where and as whom to open a shell.  Host keys are not verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTarget {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// An interactive shell with a PTY.
pub trait ShellSession: Send {
    fn send_line(&mut self, line: &str) -> impl Future<Output = io::Result<()>> + Send;

    /// Waits for the remote side to close the shell; returns its output.
    fn wait(self) -> impl Future<Output = io::Result<String>> + Send;
}

/// Opens password-authenticated shells.
pub trait ShellConnector: Send + Sync {
    type Session: ShellSession;

    fn connect(&self, target: &ShellTarget) -> impl Future<Output = io::Result<Self::Session>> + Send;
}

pub struct SccSwitch<C: ShellConnector> {
    name: &'static str,
    settings: SccSettings,
    connector: C,
    pacing: Duration,
    status: Mutex<SwitchStatus>,
    run_lock: tokio::sync::Mutex<()>,
}

impl<C: ShellConnector> SccSwitch<C> {
    pub fn new(name: &'static str, settings: SccSettings, connector: C) -> Self {
        Self {
            name,
            settings,
            connector,
            pacing: LINE_PACING,
            status: Mutex::new(SwitchStatus::Unknown),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn status_guard(&self) -> MutexGuard<'_, SwitchStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> SwitchStatus {
        *self.status_guard()
    }

    fn set_status(&self, status: SwitchStatus) {
        *self.status_guard() = status;
    }

    /// Runs the up or down command list.  Concurrent calls are serialised.
    pub async fn set_team_ethernet_enabled(&self, enabled: bool) -> Result<(), SccSwitchError> {
        let _running = self.run_lock.lock().await;
        self.set_status(SwitchStatus::Configuring);

        let commands = if enabled {
            &self.settings.up_commands
        } else {
            &self.settings.down_commands
        };
        match self.run_command_sequence(commands).await {
            Ok(output) => {
                debug!(switch = self.name, output = %output.trim_end(), "switch output");
                let status = if enabled {
                    SwitchStatus::Active
                } else {
                    SwitchStatus::Disabled
                };
                info!(switch = self.name, %status, "✓ Team Ethernet state applied");
                self.set_status(status);
                Ok(())
            }
            Err(e) => {
                warn!(switch = self.name, error = %e, "Failed to set team Ethernet state");
                self.set_status(SwitchStatus::Error);
                Err(e)
            }
        }
    }

    async fn run_command_sequence(&self, commands: &[String]) -> Result<String, SccSwitchError> {
        let target = ShellTarget {
            address: self.settings.address.clone(),
            port: SSH_PORT,
            username: self.settings.username.clone(),
            password: self.settings.password.clone(),
        };
        let mut session = timeout(CONNECT_TIMEOUT, self.connector.connect(&target))
            .await
            .map_err(|_| SccSwitchError::ConnectTimeout {
                address: target.address.clone(),
            })?
            .map_err(|source| SccSwitchError::Connect {
                address: target.address.clone(),
                source,
            })?;

        for command in commands.iter().map(String::as_str).chain(["exit"]) {
            session.send_line(command).await.map_err(SccSwitchError::Write)?;
            sleep(self.pacing).await;
        }

        timeout(COMPLETION_TIMEOUT, session.wait())
            .await
            .map_err(|_| SccSwitchError::CompletionTimeout)?
            .map_err(SccSwitchError::Shell)
    }
}
