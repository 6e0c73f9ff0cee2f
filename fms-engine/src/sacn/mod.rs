/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! E1.31 (streaming ACN) output for the hub light bars.
//!
//! Each hub is one [`SacnController`]: a target colour, a UDP socket to the
//! fixture, and a loop that sends a data packet whenever the colour changes
//! and at least once per [`HEARTBEAT_INTERVAL`] so the fixture does not
//! time out.
//!
//! # Packet layout
//!
//! | Offset | Bytes | Field |
//! |---|---|---|
//! | 0 | 2 | preamble size `0x0010` |
//! | 2 | 2 | postamble size |
//! | 4 | 12 | `"ASC-E1.17"` packet identifier |
//! | 16 | 2 | root PDU flags + length |
//! | 18 | 4 | root vector `0x00000004` |
//! | 22 | 16 | CID |
//! | 38 | 2 | framing PDU flags + length |
//! | 40 | 4 | framing vector `0x00000002` |
//! | 44 | 64 | source name |
//! | 108 | 1 | priority |
//! | 111 | 1 | sequence number |
//! | 113 | 2 | universe |
//! | 115 | 2 | DMP PDU flags + length |
//! | 117 | 6 | DMP vector, address type, first address, increment |
//! | 123 | 2 | property value count |
//! | 125 | 1 | DMX start code |
//! | 126 | n | channel data |

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const SACN_PORT: u16 = 5568;
pub const SOURCE_NAME: &str = "Cheesy Arena";
/// Component identifier sent in every root layer.  Receivers key sources on
/// it, so it stays fixed across restarts.
pub const CID: [u8; 16] = *b"Cheesy Arena\0\0\0\0";
pub const PRIORITY: u8 = 100;
pub const TICK_INTERVAL: Duration = Duration::from_millis(23);
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);
pub const CHANNEL_DATA_OFFSET: usize = 126;

const ACN_PACKET_IDENTIFIER: &[u8; 12] = b"ASC-E1.17\0\0\0";
const SEQUENCE_OFFSET: usize = 111;
const UNIVERSE_OFFSET: usize = 113;

// ── Color ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const PURPLE: Color = Color::new(128, 0, 128);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ── Packet ────────────────────────────────────────────────────────────────────

fn put_flags_and_length(packet: &mut [u8], offset: usize, length: usize) {
    let value = 0x7000 | (length as u16 & 0x0FFF);
    packet[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

/// A data packet for `num_channels` DMX slots with every field filled in
/// except sequence number, universe and channel data.
pub fn create_blank_packet(num_channels: usize) -> Vec<u8> {
    let size = CHANNEL_DATA_OFFSET + num_channels;
    let mut packet = vec![0u8; size];

    packet[0..2].copy_from_slice(&0x0010u16.to_be_bytes());
    packet[4..16].copy_from_slice(ACN_PACKET_IDENTIFIER);

    put_flags_and_length(&mut packet, 16, size - 16);
    packet[18..22].copy_from_slice(&0x0000_0004u32.to_be_bytes());
    packet[22..38].copy_from_slice(&CID);

    put_flags_and_length(&mut packet, 38, size - 38);
    packet[40..44].copy_from_slice(&0x0000_0002u32.to_be_bytes());
    let name = SOURCE_NAME.as_bytes();
    packet[44..44 + name.len()].copy_from_slice(name);
    packet[108] = PRIORITY;

    put_flags_and_length(&mut packet, 115, size - 115);
    packet[117] = 0x02;
    packet[118] = 0xA1;
    packet[121..123].copy_from_slice(&0x0001u16.to_be_bytes());
    packet[123..125].copy_from_slice(&(1 + num_channels as u16).to_be_bytes());
    packet
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct SacnState {
    target: Color,
    last_sent: Option<Color>,
    last_send: Option<Instant>,
    sequence: u8,
    healthy: bool,
}

/// The loop's side of a controller: socket and reusable packet buffer.
struct Output {
    socket: Option<UdpSocket>,
    packet: Vec<u8>,
}

/// One light bar on one sACN universe.
pub struct SacnController {
    host: String,
    port: u16,
    universe: u16,
    start_channel: usize,
    state: Mutex<SacnState>,
}

impl SacnController {
    /// An empty `host` disables the controller.
    pub fn new(host: impl Into<String>, universe: u16, start_channel: usize) -> Self {
        Self {
            host: host.into(),
            port: SACN_PORT,
            universe,
            start_channel,
            state: Mutex::new(SacnState {
                target: Color::OFF,
                last_sent: None,
                last_send: None,
                sequence: 0,
                healthy: false,
            }),
        }
    }

    /// Sends to `port` instead of the standard sACN port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn state(&self) -> MutexGuard<'_, SacnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_enabled(&self) -> bool {
        !self.host.is_empty()
    }

    pub fn is_healthy(&self) -> bool {
        self.state().healthy
    }

    pub fn universe(&self) -> u16 {
        self.universe
    }

    pub fn color(&self) -> Color {
        self.state().target
    }

    /// Takes effect on the next tick.
    pub fn set_color(&self, color: Color) {
        self.state().target = color;
    }

    fn new_output(&self) -> Output {
        Output {
            socket: None,
            packet: create_blank_packet(self.start_channel + 3),
        }
    }

    /// Runs until `shutdown` flips.  Returns immediately when disabled.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        if !self.is_enabled() {
            debug!(universe = self.universe, "sACN controller disabled");
            return;
        }
        info!(host = %self.host, universe = self.universe, "=== SacnController::run() ===");
        let mut output = self.new_output();
        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            self.tick(&mut output, Instant::now()).await;
        }
        info!(universe = self.universe, "sACN loop stopped");
    }

    /// Sends a packet if the colour changed or the heartbeat is due.
    /// Returns whether a packet went out.
    async fn tick(&self, output: &mut Output, now: Instant) -> bool {
        let (color, sequence) = {
            let mut state = self.state();
            let heartbeat_due = state
                .last_send
                .map_or(true, |t| now.duration_since(t) >= HEARTBEAT_INTERVAL);
            if state.last_sent == Some(state.target) && !heartbeat_due {
                return false;
            }
            state.sequence = state.sequence.wrapping_add(1);
            (state.target, state.sequence)
        };

        output.packet[SEQUENCE_OFFSET] = sequence;
        output.packet[UNIVERSE_OFFSET..UNIVERSE_OFFSET + 2].copy_from_slice(&self.universe.to_be_bytes());
        let channel = CHANNEL_DATA_OFFSET + self.start_channel;
        output.packet[channel..channel + 3].copy_from_slice(&[color.r, color.g, color.b]);

        match self.send(output).await {
            Ok(()) => {
                let mut state = self.state();
                state.last_sent = Some(color);
                state.last_send = Some(now);
                if !state.healthy {
                    info!(host = %self.host, universe = self.universe, "✓ sACN output healthy");
                }
                state.healthy = true;
                true
            }
            Err(e) => {
                warn!(host = %self.host, universe = self.universe, error = %e, "sACN send failed");
                output.socket = None;
                self.state().healthy = false;
                false
            }
        }
    }

    async fn send(&self, output: &mut Output) -> io::Result<()> {
        if output.socket.is_none() {
            let socket = UdpSocket::bind("0.0.0.0:0").await?;
            socket.connect((self.host.as_str(), self.port)).await?;
            output.socket = Some(socket);
        }
        if let Some(socket) = &output.socket {
            socket.send(&output.packet).await?;
        }
        Ok(())
    }
}
