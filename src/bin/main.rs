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

//! Kiosk daemon entry point.
//!
//! On real hardware the rig below is replaced by the GPIO/load-cell/LCD
//! drivers. This binary wires a scripted bench rig instead: it deposits one
//! container into a freshly created account, redeems two coins from a seeded
//! account, and then powers off via the shutdown chord, writing the final
//! account states as CSV to stdout.

use clap::Parser;
use csv::Writer;
use parking_lot::Mutex;
use revend::hal::{
    Button, Classifier, Clock, CoinDispenser, Conveyor, HostPower, HumanIo, ImageHandle,
    IndicatorPanel, Peripherals, SystemClock, WeightSensor,
};
use revend::{AccountId, KioskConfig, MemoryLedger, SessionController, StorageLevel};
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Reverse-vending kiosk controller (bench rig).
///
/// Runs the session loop against a scripted simulation of the kiosk
/// hardware and prints the resulting account balances as CSV.
#[derive(Parser, Debug)]
#[command(name = "revend")]
#[command(about = "A reverse-vending kiosk controller", long_about = None)]
struct Args {
    /// Path to a JSON config overriding the built-in kiosk constants
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => match KioskConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => bench_config(),
    };

    let ledger = MemoryLedger::new();
    // Seeded account the redeem leg of the script draws from.
    ledger.seed(seeded_account(), dec!(5));

    let hw = bench_rig();
    let mut controller = SessionController::new(cfg, ledger, hw).with_rng_seed(42);
    controller.run();

    if let Err(e) = write_report(controller.ledger(), std::io::stdout()) {
        eprintln!("Error writing account report: {}", e);
        process::exit(1);
    }
}

fn seeded_account() -> AccountId {
    // Infallible: the literal is eleven digits.
    AccountId::parse("00000000042").unwrap_or_else(|_| unreachable!())
}

/// Default constants with bench-speed pacing.
fn bench_config() -> KioskConfig {
    KioskConfig {
        debounce_ms: 10,
        settle_ms: 10,
        tick_ms: 20,
        conveyor_pulse_ms: 50,
        banner_ms: 20,
        summary_ms: 20,
        thank_you_ms: 20,
        reject_ms: 20,
        notice_ms: 20,
        pulse_timeout_ms: 500,
        account_display_secs: 1,
        ..KioskConfig::default()
    }
}

/// Account report in CSV form, one row per account.
fn write_report<W: std::io::Write>(ledger: &MemoryLedger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for record in ledger.snapshot() {
        wtr.serialize(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Scripted bench rig
// ---------------------------------------------------------------------------

#[derive(Default)]
struct BenchState {
    green: VecDeque<bool>,
    red: VecDeque<bool>,
    keys: VecDeque<char>,
    intake: VecDeque<f64>,
    last_intake: f64,
    storage_grams: f64,
    classifications: VecDeque<bool>,
    frames: u64,
    hopper_on: bool,
    hopper_coins: u64,
}

type Shared = Arc<Mutex<BenchState>>;

/// Builds the scripted rig: transaction button presses, the new-account
/// display, one 250 g container, an intake cancel, then an 11-digit account
/// entry with a 2-coin redemption, and finally the shutdown chord. Exhausted
/// button queues read as held, so a mis-stepped script drains into the chord
/// instead of hanging.
fn bench_rig() -> Peripherals {
    let mut state = BenchState {
        storage_grams: 1200.0,
        hopper_coins: 10,
        last_intake: 0.0,
        ..BenchState::default()
    };

    // Tick 1: green selects deposit; red at the menu creates an account;
    // red declines more display time; red cancels at the intake once the
    // first container has been processed.
    state.green.extend([false, true, true, false, false]);
    state.red.extend([false, false, true, true, true]);

    // Tick 2: red selects redeem; amount "2" confirmed with green.
    state.green.extend([false, false, false, false, true]);
    state.red.extend([false, true, true, false]);

    // Tick 3: both buttons held.
    state.green.push_back(true);
    state.red.push_back(true);

    state.keys.extend("00000000042".chars());
    state.keys.push_back('2');

    state.intake.extend([250.0, 250.0, 0.0]);
    state.classifications.push_back(true);

    let shared: Shared = Arc::new(Mutex::new(state));

    Peripherals {
        io: Box::new(BenchIo(shared.clone())),
        indicator: Box::new(BenchIndicator),
        storage_scale: Box::new(BenchStorageScale(shared.clone())),
        intake_scale: Box::new(BenchIntakeScale(shared.clone())),
        classifier: Box::new(BenchClassifier(shared.clone())),
        conveyor: Box::new(BenchConveyor),
        dispenser: Box::new(BenchDispenser(shared.clone())),
        power: Box::new(BenchPower),
        clock: Box::new(SystemClock),
    }
}

struct BenchIo(Shared);

impl HumanIo for BenchIo {
    fn render(&mut self, line1: &str, line2: &str) {
        debug!(line1, line2, "lcd");
    }

    fn clear(&mut self) {
        debug!("lcd cleared");
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        let mut state = self.0.lock();
        let queue = match button {
            Button::Green => &mut state.green,
            Button::Red => &mut state.red,
        };
        // Script exhausted: read as held so the chord ends the run.
        queue.pop_front().unwrap_or(true)
    }

    fn next_key(&mut self) -> Option<char> {
        self.0.lock().keys.pop_front()
    }
}

struct BenchIndicator;

impl IndicatorPanel for BenchIndicator {
    fn set_level(&mut self, level: StorageLevel) {
        debug!(?level, "indicator");
    }

    fn all_off(&mut self) {
        debug!("indicator off");
    }
}

struct BenchStorageScale(Shared);

impl WeightSensor for BenchStorageScale {
    fn read(&mut self) -> f64 {
        self.0.lock().storage_grams
    }
}

struct BenchIntakeScale(Shared);

impl WeightSensor for BenchIntakeScale {
    fn read(&mut self) -> f64 {
        let mut state = self.0.lock();
        if let Some(grams) = state.intake.pop_front() {
            state.last_intake = grams;
        }
        state.last_intake
    }
}

struct BenchClassifier(Shared);

impl Classifier for BenchClassifier {
    fn capture(&mut self) -> ImageHandle {
        let mut state = self.0.lock();
        state.frames += 1;
        ImageHandle::new(state.frames)
    }

    fn classify(&mut self, image: ImageHandle) -> bool {
        let decision = self.0.lock().classifications.pop_front().unwrap_or(false);
        debug!(frame = image.token(), decision, "classified");
        decision
    }
}

struct BenchConveyor;

impl Conveyor for BenchConveyor {
    fn activate(&mut self) {
        debug!("conveyor on");
    }

    fn deactivate(&mut self) {
        debug!("conveyor off");
    }
}

struct BenchDispenser(Shared);

impl CoinDispenser for BenchDispenser {
    fn activate(&mut self) {
        self.0.lock().hopper_on = true;
    }

    fn deactivate(&mut self) {
        self.0.lock().hopper_on = false;
    }

    fn pulse_detected(&mut self) -> bool {
        let mut state = self.0.lock();
        if state.hopper_on && state.hopper_coins > 0 {
            state.hopper_coins -= 1;
            true
        } else {
            false
        }
    }
}

struct BenchPower;

impl HostPower for BenchPower {
    fn power_off(&mut self) {
        info!("host power-off requested");
    }
}
