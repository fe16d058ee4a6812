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

//! Scripted fake rig shared by the integration suites.
//!
//! Button presses, keypad digits, scale readings, and classifier verdicts
//! are queued up front; the rig records screens, indicator changes, actuator
//! activity, and sleeps for assertions afterwards. Button queues fall back
//! to per-button "held" flags once exhausted so scripts can model a held
//! button without enumerating every poll.

#![allow(dead_code)]

use revend::hal::{
    Button, Classifier, Clock, CoinDispenser, Conveyor, HostPower, HumanIo, ImageHandle,
    IndicatorPanel, Peripherals, WeightSensor,
};
use revend::{KioskConfig, StorageLevel};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Fast pacing for tests: every pause is zero-length and the pulse timeout
/// is short enough for fault scenarios to resolve in a few fake-clock steps.
pub fn fast_config() -> KioskConfig {
    KioskConfig {
        debounce_ms: 0,
        settle_ms: 0,
        tick_ms: 0,
        conveyor_pulse_ms: 0,
        banner_ms: 0,
        summary_ms: 0,
        thank_you_ms: 0,
        reject_ms: 0,
        notice_ms: 0,
        pulse_timeout_ms: 50,
        account_display_secs: 1,
        ..KioskConfig::default()
    }
}

#[derive(Default)]
pub struct RigState {
    pub green: VecDeque<bool>,
    pub red: VecDeque<bool>,
    pub held_green: bool,
    pub held_red: bool,
    pub keys: VecDeque<char>,

    pub intake: VecDeque<f64>,
    pub last_intake: f64,
    pub storage: VecDeque<f64>,
    pub last_storage: f64,

    pub classifications: VecDeque<bool>,
    pub captures: u32,

    pub conveyor_on: bool,
    pub conveyor_cycles: u32,

    pub hopper_on: bool,
    pub hopper_coins: u64,
    pub pulses_emitted: u64,
    pub hopper_activations: u32,
    pub hopper_deactivations: u32,

    /// Indicator history; `None` records an `all_off`.
    pub indicator: Vec<Option<StorageLevel>>,
    pub screens: Vec<(String, String)>,
    pub clears: u32,

    pub sleeps: Vec<Duration>,
    pub now_ms: u64,
    pub auto_step_ms: u64,

    pub power_off: bool,
}

pub struct Rig {
    pub state: Rc<RefCell<RigState>>,
}

impl Rig {
    pub fn new() -> Self {
        let state = RigState {
            auto_step_ms: 1,
            ..RigState::default()
        };
        Rig {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn peripherals(&self) -> Peripherals {
        Peripherals {
            io: Box::new(FakeIo(self.state.clone())),
            indicator: Box::new(FakeIndicator(self.state.clone())),
            storage_scale: Box::new(FakeStorageScale(self.state.clone())),
            intake_scale: Box::new(FakeIntakeScale(self.state.clone())),
            classifier: Box::new(FakeClassifier(self.state.clone())),
            conveyor: Box::new(FakeConveyor(self.state.clone())),
            dispenser: Box::new(FakeDispenser(self.state.clone())),
            power: Box::new(FakePower(self.state.clone())),
            clock: Box::new(FakeClock {
                state: self.state.clone(),
                base: Instant::now(),
            }),
        }
    }

    /// Queues one poll result for each button.
    pub fn push_buttons(&self, green: bool, red: bool) {
        let mut state = self.state.borrow_mut();
        state.green.push_back(green);
        state.red.push_back(red);
    }

    pub fn push_green(&self, presses: &[bool]) {
        self.state.borrow_mut().green.extend(presses.iter().copied());
    }

    pub fn push_red(&self, presses: &[bool]) {
        self.state.borrow_mut().red.extend(presses.iter().copied());
    }

    pub fn hold(&self, button: Button) {
        let mut state = self.state.borrow_mut();
        match button {
            Button::Green => state.held_green = true,
            Button::Red => state.held_red = true,
        }
    }

    pub fn type_keys(&self, keys: &str) {
        self.state.borrow_mut().keys.extend(keys.chars());
    }

    pub fn intake_reads(&self, grams: &[f64]) {
        self.state.borrow_mut().intake.extend(grams.iter().copied());
    }

    pub fn storage_reads(&self, grams: &[f64]) {
        self.state.borrow_mut().storage.extend(grams.iter().copied());
    }

    pub fn classifier_verdicts(&self, verdicts: &[bool]) {
        self.state
            .borrow_mut()
            .classifications
            .extend(verdicts.iter().copied());
    }

    pub fn load_hopper(&self, coins: u64) {
        self.state.borrow_mut().hopper_coins = coins;
    }

    pub fn screen_shown(&self, line1: &str, line2: &str) -> bool {
        self.state
            .borrow()
            .screens
            .iter()
            .any(|(l1, l2)| l1 == line1 && l2 == line2)
    }

    pub fn screens_with_line1(&self, line1: &str) -> usize {
        self.state
            .borrow()
            .screens
            .iter()
            .filter(|(l1, _)| l1 == line1)
            .count()
    }

    pub fn last_screen(&self) -> Option<(String, String)> {
        self.state.borrow().screens.last().cloned()
    }
}

type Shared = Rc<RefCell<RigState>>;

struct FakeIo(Shared);

impl HumanIo for FakeIo {
    fn render(&mut self, line1: &str, line2: &str) {
        self.0
            .borrow_mut()
            .screens
            .push((line1.to_owned(), line2.to_owned()));
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clears += 1;
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        let mut state = self.0.borrow_mut();
        match button {
            Button::Green => state.green.pop_front().unwrap_or(state.held_green),
            Button::Red => state.red.pop_front().unwrap_or(state.held_red),
        }
    }

    fn next_key(&mut self) -> Option<char> {
        self.0.borrow_mut().keys.pop_front()
    }
}

struct FakeIndicator(Shared);

impl IndicatorPanel for FakeIndicator {
    fn set_level(&mut self, level: StorageLevel) {
        self.0.borrow_mut().indicator.push(Some(level));
    }

    fn all_off(&mut self) {
        self.0.borrow_mut().indicator.push(None);
    }
}

struct FakeStorageScale(Shared);

impl WeightSensor for FakeStorageScale {
    fn read(&mut self) -> f64 {
        let mut state = self.0.borrow_mut();
        if let Some(grams) = state.storage.pop_front() {
            state.last_storage = grams;
        }
        state.last_storage
    }
}

struct FakeIntakeScale(Shared);

impl WeightSensor for FakeIntakeScale {
    fn read(&mut self) -> f64 {
        let mut state = self.0.borrow_mut();
        if let Some(grams) = state.intake.pop_front() {
            state.last_intake = grams;
        }
        state.last_intake
    }
}

struct FakeClassifier(Shared);

impl Classifier for FakeClassifier {
    fn capture(&mut self) -> ImageHandle {
        let mut state = self.0.borrow_mut();
        state.captures += 1;
        ImageHandle::new(state.captures as u64)
    }

    fn classify(&mut self, _image: ImageHandle) -> bool {
        self.0
            .borrow_mut()
            .classifications
            .pop_front()
            .unwrap_or(false)
    }
}

struct FakeConveyor(Shared);

impl Conveyor for FakeConveyor {
    fn activate(&mut self) {
        self.0.borrow_mut().conveyor_on = true;
    }

    fn deactivate(&mut self) {
        let mut state = self.0.borrow_mut();
        if state.conveyor_on {
            state.conveyor_cycles += 1;
        }
        state.conveyor_on = false;
    }
}

struct FakeDispenser(Shared);

impl CoinDispenser for FakeDispenser {
    fn activate(&mut self) {
        let mut state = self.0.borrow_mut();
        state.hopper_on = true;
        state.hopper_activations += 1;
    }

    fn deactivate(&mut self) {
        let mut state = self.0.borrow_mut();
        state.hopper_on = false;
        state.hopper_deactivations += 1;
    }

    fn pulse_detected(&mut self) -> bool {
        let mut state = self.0.borrow_mut();
        if state.hopper_on && state.hopper_coins > 0 {
            state.hopper_coins -= 1;
            state.pulses_emitted += 1;
            true
        } else {
            false
        }
    }
}

struct FakePower(Shared);

impl HostPower for FakePower {
    fn power_off(&mut self) {
        self.0.borrow_mut().power_off = true;
    }
}

struct FakeClock {
    state: Shared,
    base: Instant,
}

impl Clock for FakeClock {
    fn sleep(&mut self, duration: Duration) {
        let mut state = self.state.borrow_mut();
        state.sleeps.push(duration);
        state.now_ms += duration.as_millis() as u64;
    }

    fn now(&mut self) -> Instant {
        let mut state = self.state.borrow_mut();
        state.now_ms += state.auto_step_ms;
        self.base + Duration::from_millis(state.now_ms)
    }
}
