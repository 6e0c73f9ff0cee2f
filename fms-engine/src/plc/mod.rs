/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Field PLC: I/O image, control loop and the query/setter surface used by
//! the rest of the engine.
//!
//! # Tick contract
//!
//! | Step | Action |
//! |---|---|
//! | 1 | write all coils with `heartbeat` set |
//! | 2 | read all discrete inputs |
//! | 3 | read all holding registers |
//! | 4 | advance the cycle counter, notify listeners if the image changed |
//!
//! Any failed step aborts the tick, marks the PLC unhealthy and drops the
//! connection.  The loop reconnects on the next tick and backs off for
//! [`RETRY_INTERVAL`] when the connect itself fails.
//!
//! Setters only touch the pending coil image; it reaches the PLC on the next
//! write.  E-stop and A-stop inputs are normally closed, so a `false` input
//! reads as an active stop.

pub mod io;
pub mod modbus;
pub mod simulation;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::notifier::Notifier;
use io::{ArmorBlock, Coil, Input, IoImage, Register, INPUT_COUNT, REGISTER_COUNT};
use modbus::{ModbusClient, ModbusConnector, ModbusError};

pub const LOOP_PERIOD: Duration = Duration::from_millis(100);
pub const RETRY_INTERVAL: Duration = Duration::from_secs(3);
pub const CYCLE_COUNTER_MAX: u32 = 100;
/// Number of coil writes the match-reset pulse stays high for.
const MATCH_RESET_TICKS: u32 = 5;

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PlcState {
    image: IoImage,
    published: IoImage,
    healthy: bool,
    cycle_counter: u32,
    match_reset_ticks: u32,
    simulation_step: u32,
}

impl PlcState {
    fn advance_cycle(&mut self) {
        self.cycle_counter = (self.cycle_counter + 1) % CYCLE_COUNTER_MAX;
    }

    /// The new image, if it differs from the last one published.
    fn take_change(&mut self) -> Option<IoImage> {
        if self.image == self.published {
            return None;
        }
        self.published = self.image.clone();
        Some(self.image.clone())
    }
}

pub struct Plc {
    address: String,
    state: Mutex<PlcState>,
    io_change: Notifier<IoImage>,
}

impl Plc {
    /// An empty `address` disables the PLC.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            state: Mutex::new(PlcState::default()),
            io_change: Notifier::new("plcIoChange", 16),
        }
    }

    fn state(&self) -> MutexGuard<'_, PlcState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_enabled(&self) -> bool {
        !self.address.is_empty()
    }

    pub fn is_healthy(&self) -> bool {
        self.state().healthy
    }

    pub fn io_change_notifier(&self) -> &Notifier<IoImage> {
        &self.io_change
    }

    pub fn io_image(&self) -> IoImage {
        self.state().image.clone()
    }

    // ── Loop ──────────────────────────────────────────────────────────────────

    /// Runs the control loop until `shutdown` flips or its sender goes away.
    pub async fn run<K: ModbusConnector>(self: Arc<Self>, connector: K, mut shutdown: watch::Receiver<bool>) {
        info!(address = %self.address, enabled = self.is_enabled(), "=== Plc::run() ===");
        let mut client: Option<K::Client> = None;
        let mut ticker = interval(LOOP_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if client.is_none() && self.is_enabled() {
                match self.connect(&connector).await {
                    Ok(c) => client = Some(c),
                    Err(e) => {
                        warn!(address = %self.address, error = %e, "PLC connect failed");
                        self.state().healthy = false;
                        tokio::select! {
                            _ = sleep(RETRY_INTERVAL) => continue,
                            _ = shutdown.changed() => break,
                        }
                    }
                }
            }

            match client.as_mut() {
                Some(c) => {
                    if !self.update(c).await {
                        client = None;
                    }
                }
                None => self.idle_tick(),
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
        }
        info!("PLC loop stopped");
    }

    async fn connect<K: ModbusConnector>(&self, connector: &K) -> Result<K::Client, ModbusError> {
        let mut client = connector.connect(&self.address).await?;
        info!(address = %self.address, "✓ Connected to PLC");
        // Coils are only written on change otherwise; push the current image now.
        self.write_coils(&mut client).await?;
        Ok(client)
    }

    /// One tick against a live connection.  Returns the resulting health.
    pub async fn update<C: ModbusClient>(&self, client: &mut C) -> bool {
        let result = self.exchange(client).await;
        if let Err(e) = &result {
            warn!(error = %e, "PLC error");
        }

        let change = {
            let mut state = self.state();
            state.healthy = result.is_ok();
            state.advance_cycle();
            state.take_change()
        };
        if let Some(image) = change {
            self.io_change.notify(image);
        }
        result.is_ok()
    }

    /// A tick with no connection: unhealthy, but the cycle counter keeps
    /// running for light animations.
    fn idle_tick(&self) {
        let change = {
            let mut state = self.state();
            state.healthy = false;
            state.advance_cycle();
            state.take_change()
        };
        if let Some(image) = change {
            self.io_change.notify(image);
        }
    }

    async fn exchange<C: ModbusClient>(&self, client: &mut C) -> Result<(), ModbusError> {
        self.write_coils(client).await?;
        self.read_inputs(client).await?;
        self.read_registers(client).await
    }

    async fn write_coils<C: ModbusClient>(&self, client: &mut C) -> Result<(), ModbusError> {
        let coils = {
            let mut state = self.state();
            state.image.set_coil(Coil::Heartbeat, true);
            state.image.coils
        };
        client.write_multiple_coils(0, &coils).await?;

        let mut state = self.state();
        if state.match_reset_ticks > 0 {
            state.match_reset_ticks -= 1;
            if state.match_reset_ticks == 0 {
                state.image.set_coil(Coil::MatchReset, false);
            }
        }
        Ok(())
    }

    async fn read_inputs<C: ModbusClient>(&self, client: &mut C) -> Result<(), ModbusError> {
        let values = client.read_discrete_inputs(0, INPUT_COUNT as u16).await?;
        if values.len() < INPUT_COUNT {
            return Err(ModbusError::Protocol(format!(
                "insufficient length of PLC inputs: got {}, expected {INPUT_COUNT}",
                values.len()
            )));
        }
        self.state().image.inputs.copy_from_slice(&values[..INPUT_COUNT]);
        Ok(())
    }

    async fn read_registers<C: ModbusClient>(&self, client: &mut C) -> Result<(), ModbusError> {
        let values = client.read_holding_registers(0, REGISTER_COUNT as u16).await?;
        if values.len() < REGISTER_COUNT {
            return Err(ModbusError::Protocol(format!(
                "insufficient length of PLC registers: got {}, expected {REGISTER_COUNT}",
                values.len()
            )));
        }
        self.state().image.registers.copy_from_slice(&values[..REGISTER_COUNT]);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// True while the field e-stop is pressed.
    pub fn field_estop(&self) -> bool {
        self.is_enabled() && !self.state().image.input(Input::FieldEStop)
    }

    /// Per-station e-stops as `(red, blue)`; true means active.
    pub fn team_estops(&self) -> ([bool; 3], [bool; 3]) {
        self.active_low_triplets(
            [Input::Red1EStop, Input::Red2EStop, Input::Red3EStop],
            [Input::Blue1EStop, Input::Blue2EStop, Input::Blue3EStop],
        )
    }

    /// Per-station autonomous stops as `(red, blue)`; true means active.
    pub fn team_astops(&self) -> ([bool; 3], [bool; 3]) {
        self.active_low_triplets(
            [Input::Red1AStop, Input::Red2AStop, Input::Red3AStop],
            [Input::Blue1AStop, Input::Blue2AStop, Input::Blue3AStop],
        )
    }

    fn active_low_triplets(&self, red: [Input; 3], blue: [Input; 3]) -> ([bool; 3], [bool; 3]) {
        if !self.is_enabled() {
            return ([false; 3], [false; 3]);
        }
        let state = self.state();
        (
            red.map(|i| !state.image.input(i)),
            blue.map(|i| !state.image.input(i)),
        )
    }

    /// Whether anything is plugged into each station's SCC port.
    pub fn ethernet_connected(&self) -> ([bool; 3], [bool; 3]) {
        let state = self.state();
        (
            [Input::RedConnected1, Input::RedConnected2, Input::RedConnected3].map(|i| state.image.input(i)),
            [Input::BlueConnected1, Input::BlueConnected2, Input::BlueConnected3].map(|i| state.image.input(i)),
        )
    }

    /// Connection status of each remote I/O block, keyed by block name.
    pub fn armor_block_statuses(&self) -> BTreeMap<&'static str, bool> {
        let mask = self.state().image.register(Register::FieldIoConnection);
        ArmorBlock::ALL
            .iter()
            .map(|b| (b.name(), mask & (1 << b.index()) != 0))
            .collect()
    }

    /// `(red_amplify, red_coop, blue_amplify, blue_coop)`
    pub fn amp_buttons(&self) -> (bool, bool, bool, bool) {
        let state = self.state();
        (
            state.image.input(Input::RedAmplify),
            state.image.input(Input::RedCoop),
            state.image.input(Input::BlueAmplify),
            state.image.input(Input::BlueCoop),
        )
    }

    /// `(red_amp, red_speaker, blue_amp, blue_speaker)` note counts since
    /// the last match reset.
    pub fn amp_speaker_note_counts(&self) -> (u16, u16, u16, u16) {
        let state = self.state();
        (
            state.image.register(Register::RedAmp),
            state.image.register(Register::RedSpeaker),
            state.image.register(Register::BlueAmp),
            state.image.register(Register::BlueSpeaker),
        )
    }

    /// True during the `index`-th of `max` phases, each `duration` ticks long.
    pub fn cycle_state(&self, max: u32, index: u32, duration: u32) -> bool {
        if max == 0 || duration == 0 {
            return false;
        }
        self.state().cycle_counter / duration % max == index
    }

    // ── Setters ───────────────────────────────────────────────────────────────

    fn set_coils(&self, values: &[(Coil, bool)]) {
        let mut state = self.state();
        for &(coil, value) in values {
            state.image.set_coil(coil, value);
        }
    }

    /// Pulses the match-reset coil so the PLC clears its counters.
    pub fn reset_match(&self) {
        let mut state = self.state();
        state.image.set_coil(Coil::MatchReset, true);
        state.match_reset_ticks = MATCH_RESET_TICKS;
        debug!("match reset requested");
    }

    pub fn set_stack_lights(&self, red: bool, blue: bool, orange: bool, green: bool) {
        self.set_coils(&[
            (Coil::StackLightRed, red),
            (Coil::StackLightBlue, blue),
            (Coil::StackLightOrange, orange),
            (Coil::StackLightGreen, green),
        ]);
    }

    pub fn set_stack_buzzer(&self, state: bool) {
        self.set_coils(&[(Coil::StackLightBuzzer, state)]);
    }

    pub fn set_field_reset_light(&self, state: bool) {
        self.set_coils(&[(Coil::FieldResetLight, state)]);
    }

    pub fn set_speaker_motors(&self, state: bool) {
        self.set_coils(&[(Coil::SpeakerMotors, state)]);
    }

    pub fn set_speaker_lights(&self, red: bool, blue: bool) {
        self.set_coils(&[(Coil::RedSpeakerLight, red), (Coil::BlueSpeakerLight, blue)]);
    }

    pub fn set_subwoofer_countdown(&self, red: bool, blue: bool) {
        self.set_coils(&[(Coil::RedSubwooferCountdown, red), (Coil::BlueSubwooferCountdown, blue)]);
    }

    pub fn set_amp_lights(
        &self,
        red_low: bool,
        red_high: bool,
        red_coop: bool,
        blue_low: bool,
        blue_high: bool,
        blue_coop: bool,
    ) {
        self.set_coils(&[
            (Coil::RedAmpLightLow, red_low),
            (Coil::RedAmpLightHigh, red_high),
            (Coil::RedAmpLightCoop, red_coop),
            (Coil::BlueAmpLightLow, blue_low),
            (Coil::BlueAmpLightHigh, blue_high),
            (Coil::BlueAmpLightCoop, blue_coop),
        ]);
    }

    pub fn set_post_match_subwoofer_lights(&self, state: bool) {
        self.set_coils(&[(Coil::PostMatchSubwooferLights, state)]);
    }

    /// Cuts (`true`) or restores the ethernet port of each station.
    pub fn set_team_ethernet_disabled(&self, red: [bool; 3], blue: [bool; 3]) {
        self.set_coils(&[
            (Coil::Red1EthernetDisable, red[0]),
            (Coil::Red2EthernetDisable, red[1]),
            (Coil::Red3EthernetDisable, red[2]),
            (Coil::Blue1EthernetDisable, blue[0]),
            (Coil::Blue2EthernetDisable, blue[1]),
            (Coil::Blue3EthernetDisable, blue[2]),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ── fake client ───────────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeModbusClient {
        inputs: [bool; 32],
        registers: [u16; 32],
        coils: [bool; 32],
        return_error: bool,
        short_inputs: bool,
    }

    impl ModbusClient for FakeModbusClient {
        async fn read_discrete_inputs(&mut self, address: u16, quantity: u16) -> Result<Vec<bool>, ModbusError> {
            assert_eq!(address, 0);
            if self.return_error {
                return Err(ModbusError::Protocol("dummy error".into()));
            }
            let quantity = if self.short_inputs { quantity - 1 } else { quantity };
            Ok(self.inputs[..quantity as usize].to_vec())
        }

        async fn read_holding_registers(&mut self, address: u16, quantity: u16) -> Result<Vec<u16>, ModbusError> {
            assert_eq!(address, 0);
            Ok(self.registers[..quantity as usize].to_vec())
        }

        async fn write_multiple_coils(&mut self, address: u16, values: &[bool]) -> Result<(), ModbusError> {
            assert_eq!(address, 0);
            self.coils[..values.len()].copy_from_slice(values);
            Ok(())
        }
    }

    fn setup() -> (Plc, FakeModbusClient) {
        (Plc::new("dummy"), FakeModbusClient::default())
    }

    // ── basics ────────────────────────────────────────────────────────────────

    #[test]
    fn enabled_iff_address_configured() {
        assert!(!Plc::new("").is_enabled());
        assert!(Plc::new("10.0.100.10").is_enabled());
    }

    #[tokio::test]
    async fn cycle_state_phases() {
        let (plc, mut client) = setup();
        let expected = [false, false, true, true, false, false, false, false, true, true, false, false];
        for want in expected {
            assert_eq!(plc.cycle_state(3, 1, 2), want);
            plc.update(&mut client).await;
        }
    }

    #[tokio::test]
    async fn cycle_counter_wraps() {
        let (plc, mut client) = setup();
        for _ in 0..CYCLE_COUNTER_MAX {
            plc.update(&mut client).await;
        }
        assert!(plc.cycle_state(CYCLE_COUNTER_MAX, 0, 1));
    }

    // ── inputs ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn estops_are_normally_closed() {
        let (plc, mut client) = setup();
        client.inputs[0] = true;
        plc.update(&mut client).await;
        assert!(!plc.field_estop());
        client.inputs[0] = false;
        plc.update(&mut client).await;
        assert!(plc.field_estop());

        for i in 1..=12 {
            client.inputs[i] = true;
        }
        plc.update(&mut client).await;
        assert_eq!(plc.team_estops(), ([false; 3], [false; 3]));
        assert_eq!(plc.team_astops(), ([false; 3], [false; 3]));

        client.inputs[1] = false;
        client.inputs[4] = false;
        plc.update(&mut client).await;
        assert_eq!(plc.team_estops(), ([true, false, false], [false; 3]));
        assert_eq!(plc.team_astops(), ([false, true, false], [false; 3]));

        client.inputs[11] = false;
        client.inputs[8] = false;
        plc.update(&mut client).await;
        assert_eq!(plc.team_estops(), ([true, false, false], [false, false, true]));
        assert_eq!(plc.team_astops(), ([false, true, false], [true, false, false]));
    }

    #[tokio::test]
    async fn disabled_plc_reports_no_stops() {
        let plc = Plc::new("");
        let mut client = FakeModbusClient::default();
        plc.update(&mut client).await;
        assert!(!plc.field_estop());
        assert_eq!(plc.team_estops(), ([false; 3], [false; 3]));
    }

    #[tokio::test]
    async fn ethernet_and_amp_inputs() {
        let (plc, mut client) = setup();
        client.inputs[13] = true;
        client.inputs[17] = true;
        client.inputs[20] = true;
        client.inputs[21] = true;
        plc.update(&mut client).await;
        assert_eq!(plc.ethernet_connected(), ([true, false, false], [false, true, false]));
        assert_eq!(plc.amp_buttons(), (false, true, true, false));
    }

    // ── registers ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn armor_block_bits() {
        let (plc, mut client) = setup();
        for value in 0u16..16 {
            client.registers[0] = value;
            plc.update(&mut client).await;
            let statuses = plc.armor_block_statuses();
            assert_eq!(statuses["RedDs"], value & 1 != 0);
            assert_eq!(statuses["BlueDs"], value & 2 != 0);
            assert_eq!(statuses["RedIoLink"], value & 4 != 0);
            assert_eq!(statuses["BlueIoLink"], value & 8 != 0);
        }
    }

    #[tokio::test]
    async fn note_counts() {
        let (plc, mut client) = setup();
        client.registers[1] = 12;
        client.registers[2] = 34;
        client.registers[3] = 56;
        client.registers[4] = 78;
        plc.update(&mut client).await;
        assert_eq!(plc.amp_speaker_note_counts(), (56, 12, 78, 34));
    }

    // ── coils ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn heartbeat_and_setters_reach_the_plc() {
        let (plc, mut client) = setup();
        assert!(!client.coils[0]);
        plc.update(&mut client).await;
        assert!(client.coils[0]);

        plc.set_stack_lights(true, false, true, false);
        plc.set_stack_buzzer(true);
        plc.set_field_reset_light(true);
        plc.update(&mut client).await;
        assert_eq!(&client.coils[2..8], &[false, true, true, false, true, true]);

        plc.set_speaker_motors(true);
        plc.set_speaker_lights(false, true);
        plc.set_subwoofer_countdown(true, false);
        plc.set_amp_lights(true, false, true, false, true, false);
        plc.set_post_match_subwoofer_lights(true);
        plc.update(&mut client).await;
        assert_eq!(
            &client.coils[8..20],
            &[true, false, true, true, false, true, false, true, false, true, false, true]
        );

        plc.set_team_ethernet_disabled([true, false, false], [false, false, true]);
        plc.update(&mut client).await;
        assert_eq!(&client.coils[20..26], &[true, false, false, false, false, true]);
    }

    #[tokio::test]
    async fn match_reset_is_a_short_pulse() {
        let (plc, mut client) = setup();
        plc.reset_match();
        for _ in 0..MATCH_RESET_TICKS {
            plc.update(&mut client).await;
            assert!(client.coils[1]);
        }
        plc.update(&mut client).await;
        assert!(!client.coils[1]);
    }

    // ── health & notification ─────────────────────────────────────────────────

    #[tokio::test]
    async fn errors_mark_unhealthy() {
        let (plc, mut client) = setup();
        assert!(!plc.is_healthy());
        assert!(plc.update(&mut client).await);
        assert!(plc.is_healthy());

        client.return_error = true;
        assert!(!plc.update(&mut client).await);
        assert!(!plc.is_healthy());

        plc.idle_tick();
        assert!(!plc.is_healthy());
    }

    #[tokio::test]
    async fn short_input_reply_marks_unhealthy() {
        let (plc, mut client) = setup();
        client.short_inputs = true;
        assert!(!plc.update(&mut client).await);
        assert!(!plc.is_healthy());
        // The coil write still went out before the read failed.
        assert!(client.coils[0]);
    }

    #[tokio::test]
    async fn change_notifier_fires_once_per_change() {
        let (plc, mut client) = setup();
        let mut rx = plc.io_change_notifier().subscribe();

        plc.update(&mut client).await;
        let image = rx.try_recv().unwrap();
        assert!(image.coil(Coil::Heartbeat));

        plc.update(&mut client).await;
        assert!(rx.try_recv().is_err());

        client.inputs[19] = true;
        plc.update(&mut client).await;
        assert!(rx.try_recv().unwrap().input(Input::RedAmplify));
        assert!(rx.try_recv().is_err());
    }

    // ── loop ──────────────────────────────────────────────────────────────────

    struct CountingConnector {
        attempts: Arc<AtomicUsize>,
    }

    impl ModbusConnector for CountingConnector {
        type Client = FakeModbusClient;

        async fn connect(&self, _host: &str) -> Result<FakeModbusClient, ModbusError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(FakeModbusClient::default())
        }
    }

    #[tokio::test]
    async fn loop_connects_and_stops_on_shutdown() {
        let plc = Arc::new(Plc::new("dummy"));
        let attempts = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(plc.clone().run(
            CountingConnector {
                attempts: attempts.clone(),
            },
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(plc.is_healthy());
        tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
