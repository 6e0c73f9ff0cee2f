/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Address map of the field PLC.
//!
//! Each enum's discriminant is the Modbus address of the point; `ALL` lists
//! the points in address order and `name()` is the label shown on the field
//! I/O page.

use serde::Serialize;

macro_rules! io_points {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const COUNT: usize = Self::ALL.len();

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn index(self) -> usize {
                self as usize
            }
        }
    };
}

io_points!(
    /// Discrete inputs.  E-stop and A-stop circuits are normally closed.
    Input {
        FieldEStop => "fieldEStop",
        Red1EStop => "red1EStop",
        Red1AStop => "red1AStop",
        Red2EStop => "red2EStop",
        Red2AStop => "red2AStop",
        Red3EStop => "red3EStop",
        Red3AStop => "red3AStop",
        Blue1EStop => "blue1EStop",
        Blue1AStop => "blue1AStop",
        Blue2EStop => "blue2EStop",
        Blue2AStop => "blue2AStop",
        Blue3EStop => "blue3EStop",
        Blue3AStop => "blue3AStop",
        RedConnected1 => "redConnected1",
        RedConnected2 => "redConnected2",
        RedConnected3 => "redConnected3",
        BlueConnected1 => "blueConnected1",
        BlueConnected2 => "blueConnected2",
        BlueConnected3 => "blueConnected3",
        RedAmplify => "redAmplify",
        RedCoop => "redCoop",
        BlueAmplify => "blueAmplify",
        BlueCoop => "blueCoop",
    }
);

io_points!(
    /// 16-bit holding registers.
    Register {
        FieldIoConnection => "fieldIoConnection",
        RedSpeaker => "redSpeaker",
        BlueSpeaker => "blueSpeaker",
        RedAmp => "redAmp",
        BlueAmp => "blueAmp",
        Miscounts => "miscounts",
    }
);

io_points!(
    /// Coils.  Written as one block every tick.
    Coil {
        Heartbeat => "heartbeat",
        MatchReset => "matchReset",
        StackLightGreen => "stackLightGreen",
        StackLightOrange => "stackLightOrange",
        StackLightRed => "stackLightRed",
        StackLightBlue => "stackLightBlue",
        StackLightBuzzer => "stackLightBuzzer",
        FieldResetLight => "fieldResetLight",
        SpeakerMotors => "speakerMotors",
        RedSpeakerLight => "redSpeakerLight",
        BlueSpeakerLight => "blueSpeakerLight",
        RedSubwooferCountdown => "redSubwooferCountdown",
        BlueSubwooferCountdown => "blueSubwooferCountdown",
        RedAmpLightLow => "redAmpLightLow",
        RedAmpLightHigh => "redAmpLightHigh",
        RedAmpLightCoop => "redAmpLightCoop",
        BlueAmpLightLow => "blueAmpLightLow",
        BlueAmpLightHigh => "blueAmpLightHigh",
        BlueAmpLightCoop => "blueAmpLightCoop",
        PostMatchSubwooferLights => "postMatchSubwooferLights",
        Red1EthernetDisable => "red1EthernetDisable",
        Red2EthernetDisable => "red2EthernetDisable",
        Red3EthernetDisable => "red3EthernetDisable",
        Blue1EthernetDisable => "blue1EthernetDisable",
        Blue2EthernetDisable => "blue2EthernetDisable",
        Blue3EthernetDisable => "blue3EthernetDisable",
    }
);

io_points!(
    /// Bits of the `fieldIoConnection` register, one per remote I/O block.
    ArmorBlock {
        RedDs => "RedDs",
        BlueDs => "BlueDs",
        RedIoLink => "RedIoLink",
        BlueIoLink => "BlueIoLink",
    }
);

pub const INPUT_COUNT: usize = Input::COUNT;
pub const REGISTER_COUNT: usize = Register::COUNT;
pub const COIL_COUNT: usize = Coil::COUNT;

/// The whole PLC I/O image, as published to change listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoImage {
    pub inputs: [bool; INPUT_COUNT],
    pub registers: [u16; REGISTER_COUNT],
    pub coils: [bool; COIL_COUNT],
}

impl Default for IoImage {
    fn default() -> Self {
        Self {
            inputs: [false; INPUT_COUNT],
            registers: [0; REGISTER_COUNT],
            coils: [false; COIL_COUNT],
        }
    }
}

impl IoImage {
    pub fn input(&self, input: Input) -> bool {
        self.inputs[input.index()]
    }

    pub fn register(&self, register: Register) -> u16 {
        self.registers[register.index()]
    }

    pub fn coil(&self, coil: Coil) -> bool {
        self.coils[coil.index()]
    }

    pub fn set_coil(&mut self, coil: Coil, value: bool) {
        self.coils[coil.index()] = value;
    }

    pub fn set_input(&mut self, input: Input, value: bool) {
        self.inputs[input.index()] = value;
    }

    pub fn set_register(&mut self, register: Register, value: u16) {
        self.registers[register.index()] = value;
    }
}

pub fn input_names() -> Vec<&'static str> {
    Input::ALL.iter().map(|i| i.name()).collect()
}

pub fn register_names() -> Vec<&'static str> {
    Register::ALL.iter().map(|r| r.name()).collect()
}

pub fn coil_names() -> Vec<&'static str> {
    Coil::ALL.iter().map(|c| c.name()).collect()
}
