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

//! Top-level session loop.
//!
//! Composes storage supervision, transaction selection, and the two flows.
//! [`SessionController::tick`] is the single externally-invoked step; the
//! daemon simply calls it until it reports [`Tick::Halt`].

use crate::config::KioskConfig;
use crate::deposit::DepositFlow;
use crate::hal::{Button, Peripherals, shutdown_chord};
use crate::ledger::Ledger;
use crate::redeem::RedeemFlow;
use crate::storage::{StorageCheck, StorageMonitor};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Selecting,
    InDeposit,
    InRedeem,
    ShuttingDown,
}

/// Outcome of the transaction menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    None,
    Deposit,
    Redeem,
}

/// Whether the daemon should keep ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Halt,
}

pub struct SessionController<L: Ledger> {
    cfg: KioskConfig,
    ledger: L,
    hw: Peripherals,
    monitor: StorageMonitor,
    state: SessionState,
    rng: StdRng,
}

impl<L: Ledger> SessionController<L> {
    pub fn new(cfg: KioskConfig, ledger: L, hw: Peripherals) -> Self {
        let monitor = StorageMonitor::new(&cfg);
        Self {
            cfg,
            ledger,
            hw,
            monitor,
            state: SessionState::Idle,
            rng: StdRng::from_entropy(),
        }
    }

    /// Pins the account id generator to a seed. Test hook.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Runs the daemon loop until shutdown.
    pub fn run(&mut self) {
        info!("kiosk session loop started");
        while self.tick() == Tick::Continue {}
        info!("kiosk session loop ended");
    }

    /// One idle-loop iteration: idle screen, storage supervision, shutdown
    /// chord, operator intent, and at most one delegated transaction.
    pub fn tick(&mut self) -> Tick {
        self.state = SessionState::Idle;
        self.hw.io.render("Bottle deposit", "kiosk ready");

        if self.monitor.evaluate(&mut self.hw) == StorageCheck::Shutdown {
            return self.shut_down();
        }

        if shutdown_chord(self.hw.io.as_mut()) {
            return self.shut_down();
        }

        let green = self.hw.io.button_pressed(Button::Green);
        let red = self.hw.io.button_pressed(Button::Red);
        if green || red {
            self.hw.clock.sleep(self.cfg.debounce());
            match self.select_transaction() {
                TransactionKind::Deposit => {
                    self.state = SessionState::InDeposit;
                    let result =
                        DepositFlow::new(&self.cfg, &self.ledger, &mut self.hw).run(&mut self.rng);
                    match result {
                        Ok(outcome) => info!(?outcome, "deposit flow finished"),
                        Err(err) => error!(%err, "deposit flow failed"),
                    }
                }
                TransactionKind::Redeem => {
                    self.state = SessionState::InRedeem;
                    match RedeemFlow::new(&self.cfg, &self.ledger, &mut self.hw).run() {
                        Ok(outcome) => info!(?outcome, "redeem flow finished"),
                        Err(err) => error!(%err, "redeem flow failed"),
                    }
                }
                TransactionKind::None => {}
            }
            self.state = SessionState::Idle;
        }

        Tick::Continue
    }

    /// Transaction menu with a fixed polling window. Green is checked before
    /// red on each tick, so the first press wins; an exhausted window selects
    /// nothing.
    fn select_transaction(&mut self) -> TransactionKind {
        self.state = SessionState::Selecting;
        self.hw.io.render("G:Deposit bottle", "R:Redeem credits");
        self.hw.clock.sleep(self.cfg.debounce());

        let mut remaining = self.cfg.select_window_ticks;
        while remaining > 0 {
            if self.hw.io.button_pressed(Button::Green) {
                self.hw.clock.sleep(self.cfg.debounce());
                self.hw.io.clear();
                return TransactionKind::Deposit;
            }
            if self.hw.io.button_pressed(Button::Red) {
                self.hw.clock.sleep(self.cfg.debounce());
                self.hw.io.clear();
                return TransactionKind::Redeem;
            }
            self.hw.clock.sleep(self.cfg.tick());
            remaining -= 1;
        }

        self.hw.io.clear();
        TransactionKind::None
    }

    /// Terminal: release the whole rig, show the power-off notice, and ask
    /// the host to shut down. There is no transition out of this state.
    fn shut_down(&mut self) -> Tick {
        self.state = SessionState::ShuttingDown;
        info!("shutdown requested");
        self.hw.release_all();
        self.hw.io.render("Shutting down", "Turn off switch");
        self.hw.power.power_off();
        Tick::Halt
    }
}
