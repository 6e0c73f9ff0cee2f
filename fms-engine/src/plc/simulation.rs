/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scripted PLC input for running the field without hardware.
//!
//! The script is keyed on match time: each step fires once when the match
//! clock passes its threshold, so replaying the same clock gives the same
//! image.  Match time zero rewinds the script.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::io::{Input, IoImage, Register};
use super::{Plc, LOOP_PERIOD};

/// Length of one simulated match, after which the script starts over.
pub const SIMULATED_MATCH_SECS: f64 = 160.0;

/// Match time after which each scripted step fires.
const STEP_THRESHOLDS: [f64; 8] = [3.0, 10.0, 15.0, 16.0, 30.0, 31.0, 60.0, 135.0];

fn apply_step(step: usize, io: &mut IoImage) {
    match step {
        0 => {
            io.set_register(Register::FieldIoConnection, 0b1111);
            for input in [
                Input::RedConnected1,
                Input::RedConnected2,
                Input::RedConnected3,
                Input::BlueConnected1,
                Input::BlueConnected2,
                Input::BlueConnected3,
            ] {
                io.set_input(input, true);
            }
        }
        1 => {
            io.set_register(Register::RedSpeaker, 2);
            io.set_register(Register::BlueSpeaker, 1);
        }
        2 => {
            io.set_register(Register::RedAmp, 1);
            io.set_input(Input::RedAmplify, true);
        }
        3 => io.set_input(Input::RedAmplify, false),
        4 => {
            io.set_register(Register::BlueAmp, 2);
            io.set_input(Input::BlueCoop, true);
        }
        5 => io.set_input(Input::BlueCoop, false),
        6 => {
            io.set_register(Register::RedSpeaker, 7);
            io.set_register(Register::BlueSpeaker, 9);
        }
        7 => io.set_register(Register::Miscounts, 1),
        _ => {}
    }
}

impl Plc {
    /// Advances the scripted input image to `match_time_sec` and runs one
    /// idle tick's worth of bookkeeping.
    pub fn simulate_input(&self, match_time_sec: f64) {
        let change = {
            let mut state = self.state();
            if match_time_sec == 0.0 {
                state.simulation_step = 0;
                state.image.inputs = IoImage::default().inputs;
                state.image.registers = IoImage::default().registers;
            }
            while let Some(&threshold) = STEP_THRESHOLDS.get(state.simulation_step as usize) {
                if match_time_sec <= threshold {
                    break;
                }
                let step = state.simulation_step as usize;
                apply_step(step, &mut state.image);
                state.simulation_step += 1;
            }
            state.advance_cycle();
            state.take_change()
        };
        if let Some(image) = change {
            self.io_change.notify(image);
        }
    }

    /// Drives [`simulate_input`](Self::simulate_input) from a free-running
    /// clock that restarts every [`SIMULATED_MATCH_SECS`].
    pub async fn run_simulation(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!("=== Plc::run_simulation() ===");
        let mut ticker = interval(LOOP_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let start = Instant::now();
        let mut previous = 0.0;
        self.simulate_input(0.0);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            let match_time = simulated_match_time(start.elapsed());
            if match_time < previous {
                debug!("simulated match restarted");
                self.simulate_input(0.0);
            }
            previous = match_time;
            self.simulate_input(match_time);
        }
        info!("PLC simulation stopped");
    }
}

/// Match time of a simulated clock `since` the given start.
pub fn simulated_match_time(since: Duration) -> f64 {
    since.as_secs_f64() % SIMULATED_MATCH_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_advances_with_match_time() {
        let plc = Plc::new("");
        plc.simulate_input(0.0);
        assert_eq!(plc.ethernet_connected(), ([false; 3], [false; 3]));

        plc.simulate_input(5.0);
        assert_eq!(plc.ethernet_connected(), ([true; 3], [true; 3]));
        assert_eq!(plc.armor_block_statuses().values().filter(|v| **v).count(), 4);

        plc.simulate_input(15.5);
        assert_eq!(plc.amp_buttons(), (true, false, false, false));
        assert_eq!(plc.amp_speaker_note_counts(), (1, 2, 0, 1));

        plc.simulate_input(16.5);
        assert_eq!(plc.amp_buttons(), (false, false, false, false));

        plc.simulate_input(150.0);
        assert_eq!(plc.amp_speaker_note_counts(), (1, 7, 2, 9));
    }

    #[test]
    fn match_time_zero_rewinds() {
        let plc = Plc::new("");
        plc.simulate_input(100.0);
        assert_eq!(plc.amp_speaker_note_counts(), (1, 7, 2, 9));

        plc.simulate_input(0.0);
        assert_eq!(plc.amp_speaker_note_counts(), (0, 0, 0, 0));
        assert_eq!(plc.ethernet_connected(), ([false; 3], [false; 3]));
    }

    #[test]
    fn simulation_fires_change_notifier() {
        let plc = Plc::new("");
        let mut rx = plc.io_change_notifier().subscribe();
        plc.simulate_input(0.0);
        assert!(rx.try_recv().is_err());
        plc.simulate_input(4.0);
        assert!(rx.try_recv().unwrap().input(Input::RedConnected1));
    }

    #[test]
    fn simulated_clock_wraps() {
        assert_eq!(simulated_match_time(Duration::from_secs(170)), 10.0);
    }
}
