// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Hardware seams.
//!
//! Every physical device the controller touches sits behind one of these
//! traits, and the whole rig is injected at startup as a [`Peripherals`]
//! bundle. Drivers own calibration, debouncing, and pin-level concerns; the
//! controller only sees the narrow contracts below.

use crate::storage::StorageLevel;
use std::time::{Duration, Instant};

/// The two operator buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Green,
    Red,
}

/// Calibrated load cell.
pub trait WeightSensor {
    /// Raw offset/scale-corrected reading in grams. May drift slightly
    /// negative around the tare point.
    fn read(&mut self) -> f64;

    /// Reading with negative drift clamped to zero. All threshold
    /// comparisons and credit math go through this.
    fn read_grams(&mut self) -> f64 {
        self.read().max(0.0)
    }
}

/// Opaque token for a captured frame, minted by the classifier driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle(u64);

impl ImageHandle {
    pub fn new(token: u64) -> Self {
        ImageHandle(token)
    }

    pub fn token(&self) -> u64 {
        self.0
    }
}

/// Container recognition service.
///
/// `capture` blocks for the camera's preview delay; `classify` returns the
/// decision directly rather than through any shared slot.
pub trait Classifier {
    fn capture(&mut self) -> ImageHandle;
    fn classify(&mut self, image: ImageHandle) -> bool;
}

/// Coin hopper with a pulse counter on the coin exit.
pub trait CoinDispenser {
    fn activate(&mut self);
    fn deactivate(&mut self);
    /// Edge-triggered and debounced by the driver; a single coin must never
    /// report more than one pulse.
    fn pulse_detected(&mut self) -> bool;
}

/// Intake conveyor relay.
pub trait Conveyor {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

/// Two-line character display, the two buttons, and the numeric keypad.
pub trait HumanIo {
    fn render(&mut self, line1: &str, line2: &str);
    fn clear(&mut self);
    fn button_pressed(&mut self, button: Button) -> bool;
    /// Next keypad digit if one is buffered.
    fn next_key(&mut self) -> Option<char>;
}

/// Three-lamp fill indicator. Lamps are mutually exclusive.
pub trait IndicatorPanel {
    fn set_level(&mut self, level: StorageLevel);
    fn all_off(&mut self);
}

/// Host power control, used only by the terminal shutdown path.
pub trait HostPower {
    fn power_off(&mut self);
}

/// Time source. Injected so every pause and timeout in the controller is
/// observable and steppable from tests.
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
    fn now(&mut self) -> Instant;
}

/// Wall-clock [`Clock`] backed by `std::thread::sleep`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// The full device rig, owned by the session controller.
pub struct Peripherals {
    pub io: Box<dyn HumanIo>,
    pub indicator: Box<dyn IndicatorPanel>,
    pub storage_scale: Box<dyn WeightSensor>,
    pub intake_scale: Box<dyn WeightSensor>,
    pub classifier: Box<dyn Classifier>,
    pub conveyor: Box<dyn Conveyor>,
    pub dispenser: Box<dyn CoinDispenser>,
    pub power: Box<dyn HostPower>,
    pub clock: Box<dyn Clock>,
}

impl Peripherals {
    /// Drives every output line to its idle state and blanks the display.
    /// Called on both shutdown paths before requesting host power-off.
    pub fn release_all(&mut self) {
        self.conveyor.deactivate();
        self.dispenser.deactivate();
        self.indicator.all_off();
        self.io.clear();
    }
}

/// The shutdown gesture: both buttons held at once.
///
/// Both lines are polled on every check, one poll per button. Used by the
/// idle loop and by the full-storage blocking loop.
pub fn shutdown_chord(io: &mut dyn HumanIo) -> bool {
    let green = io.button_pressed(Button::Green);
    let red = io.button_pressed(Button::Red);
    green && red
}
