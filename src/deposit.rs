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

//! Container deposit flow.
//!
//! Per-item pipeline: wait for weight on the intake tray, validate the
//! reading, classify the captured image, run the item into the bin, and
//! credit the account. Runs to completion once entered.

use crate::account::{AccountManager, account_missing};
use crate::base::AccountId;
use crate::config::KioskConfig;
use crate::error::KioskError;
use crate::hal::{Button, Peripherals};
use crate::ledger::Ledger;
use rand::RngCore;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::info;

/// Decimal places carried by deposit credits.
pub const CREDIT_DP: u32 = 2;

/// Credit for one container: `grams * price_per_kilo / weight_scale`,
/// rounded to two decimals.
pub fn deposit_credit(grams: f64, cfg: &KioskConfig) -> Decimal {
    let weight = Decimal::from_f64(grams).unwrap_or(Decimal::ZERO);
    (weight * cfg.price_per_kilo / cfg.weight_scale).round_dp(CREDIT_DP)
}

/// How a deposit session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositOutcome {
    /// The operator finished or declined a retry; the summary was shown.
    Completed { items: u32, total: Decimal },
    /// Red pressed while waiting for an item. Aborts without a summary.
    Cancelled,
    /// No account was resolved at the menu.
    UnknownAccount,
}

pub struct DepositFlow<'a, L: Ledger> {
    cfg: &'a KioskConfig,
    ledger: &'a L,
    hw: &'a mut Peripherals,
}

impl<'a, L: Ledger> DepositFlow<'a, L> {
    pub fn new(cfg: &'a KioskConfig, ledger: &'a L, hw: &'a mut Peripherals) -> Self {
        Self { cfg, ledger, hw }
    }

    pub fn run(&mut self, rng: &mut dyn RngCore) -> Result<DepositOutcome, KioskError> {
        self.hw.io.render("Transaction:", "Deposit bottles");
        self.hw.clock.sleep(self.cfg.banner());

        let account =
            AccountManager::new(self.cfg, self.ledger, &mut *self.hw).account_menu(rng)?;
        let Some(account) = account else {
            account_missing(self.cfg, self.hw);
            return Ok(DepositOutcome::UnknownAccount);
        };
        AccountManager::new(self.cfg, self.ledger, &mut *self.hw).show_summary(&account)?;

        let mut items = 0u32;
        let mut total = Decimal::ZERO;

        loop {
            self.hw.io.render("Insert bottle", "R: Cancel");

            if self.wait_for_item() {
                info!(items, %total, "deposit cancelled at intake");
                self.hw.io.clear();
                return Ok(DepositOutcome::Cancelled);
            }

            // Let the item settle before judging the weight.
            self.hw.clock.sleep(self.cfg.settle());
            let grams = self.hw.intake_scale.read_grams();

            // The tray-empty sentinel sits inside the valid range and must
            // be excluded separately.
            let weight_ok =
                grams <= self.cfg.bottle_max_grams && grams != self.cfg.tray_empty_grams;

            if weight_ok {
                self.hw.io.render("Processing image", "Please wait ...");
                let image = self.hw.classifier.capture();
                if self.hw.classifier.classify(image) {
                    self.run_conveyor();
                    let credit = deposit_credit(grams, self.cfg);
                    self.credit_account(&account, credit)?;
                    items += 1;
                    total += credit;
                    info!(account = %account, grams, %credit, "container accepted");
                } else if !self.try_again() {
                    break;
                }
            } else if !self.try_again() {
                break;
            }
        }

        self.hw
            .io
            .render(&format!("Count: {items}"), &format!("Total: {total}"));
        self.hw.clock.sleep(self.cfg.summary());
        self.hw.io.clear();
        info!(account = %account, items, %total, "deposit finished");
        Ok(DepositOutcome::Completed { items, total })
    }

    /// Polls the intake scale until an item is present. Returns `true` if
    /// the operator cancelled instead.
    fn wait_for_item(&mut self) -> bool {
        let mut grams = self.hw.intake_scale.read_grams();
        loop {
            if grams > self.cfg.presence_grams {
                return false;
            }
            if self.hw.io.button_pressed(Button::Red) {
                self.hw.clock.sleep(self.cfg.debounce());
                return true;
            }
            grams = self.hw.intake_scale.read_grams();
        }
    }

    /// Timed relay pulse moving the accepted container into the bin.
    fn run_conveyor(&mut self) {
        self.hw.conveyor.activate();
        self.hw.clock.sleep(self.cfg.conveyor_pulse());
        self.hw.conveyor.deactivate();
    }

    /// Both operands are rounded to two decimals before summation so repeated
    /// deposits cannot accumulate drift.
    fn credit_account(&mut self, id: &AccountId, credit: Decimal) -> Result<(), KioskError> {
        let balance = self.ledger.balance(id)?;
        let updated = balance.round_dp(CREDIT_DP) + credit.round_dp(CREDIT_DP);
        self.ledger.set_balance(id, updated)
    }

    /// Rejected-item prompt. Green keeps the loop going, red ends it (the
    /// summary is still shown, unlike an intake cancel).
    fn try_again(&mut self) -> bool {
        self.hw.io.render("Invalid object", "Try again?");
        loop {
            if self.hw.io.button_pressed(Button::Green) {
                self.hw.clock.sleep(self.cfg.debounce());
                return true;
            }
            if self.hw.io.button_pressed(Button::Red) {
                self.hw.clock.sleep(self.cfg.debounce());
                return false;
            }
        }
    }
}
