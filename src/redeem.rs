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

//! Credit redemption flow.
//!
//! Keypad amount entry, validation against the truncated balance, a
//! pulse-counted coin dispense with a per-pulse timeout, and the debit.
//! Redemption operates in whole coin units; deposit credit is fractional.

use crate::account::{AccountManager, account_missing};
use crate::config::KioskConfig;
use crate::error::KioskError;
use crate::hal::{Button, Peripherals};
use crate::ledger::Ledger;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Keypad entry width; one display row holds the prompt remainder.
const AMOUNT_MAX_DIGITS: usize = 9;

/// How a redemption session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Coins dispensed and debited in full.
    Redeemed { amount: u64 },
    /// Operator declined another attempt after an invalid amount.
    Declined,
    /// No account was resolved from keypad entry.
    UnknownAccount,
    /// The hopper went silent mid-run. Only `dispensed` coins were debited.
    DispenseFault { dispensed: u64, requested: u64 },
}

/// A request is valid when it does not exceed the whole-unit balance.
pub fn redeem_is_valid(amount: u64, balance: Decimal) -> bool {
    Decimal::from(amount) <= balance.trunc()
}

/// Whole-unit debit. Any fractional remainder accumulated from deposits is
/// truncated away with it, matching the deployed kiosk's integer redemption
/// arithmetic.
pub fn debit(balance: Decimal, coins: u64) -> Decimal {
    balance.trunc() - Decimal::from(coins)
}

pub struct RedeemFlow<'a, L: Ledger> {
    cfg: &'a KioskConfig,
    ledger: &'a L,
    hw: &'a mut Peripherals,
}

impl<'a, L: Ledger> RedeemFlow<'a, L> {
    pub fn new(cfg: &'a KioskConfig, ledger: &'a L, hw: &'a mut Peripherals) -> Self {
        Self { cfg, ledger, hw }
    }

    pub fn run(&mut self) -> Result<RedeemOutcome, KioskError> {
        self.hw.io.render("Transaction:", "Redeem credits");
        self.hw.clock.sleep(self.cfg.banner());

        let account =
            AccountManager::new(self.cfg, self.ledger, &mut *self.hw).lookup_existing();
        let Some(account) = account else {
            account_missing(self.cfg, self.hw);
            return Ok(RedeemOutcome::UnknownAccount);
        };
        AccountManager::new(self.cfg, self.ledger, &mut *self.hw).show_summary(&account)?;

        loop {
            let amount = self.read_amount();
            let balance = self.ledger.balance(&account)?;

            if redeem_is_valid(amount, balance) {
                let (dispensed, faulted) = self.dispense(amount);
                self.ledger.set_balance(&account, debit(balance, dispensed))?;

                if faulted {
                    warn!(account = %account, dispensed, requested = amount, "dispense fault");
                    self.hw.io.render("Dispense fault", "Call attendant");
                    self.hw.clock.sleep(self.cfg.notice());
                    self.hw.io.clear();
                    return Ok(RedeemOutcome::DispenseFault {
                        dispensed,
                        requested: amount,
                    });
                }

                info!(account = %account, amount, "credits redeemed");
                self.hw.io.render("Thank you", "Save the planet");
                self.hw.clock.sleep(self.cfg.thank_you());
                self.hw.io.clear();
                return Ok(RedeemOutcome::Redeemed { amount });
            }

            info!(account = %account, amount, %balance, "redemption amount over balance");
            self.hw.io.render("Invalid amount", "Try again?");
            self.hw.clock.sleep(self.cfg.reject());
            if !self.try_again() {
                self.hw.io.clear();
                return Ok(RedeemOutcome::Declined);
            }
        }
    }

    /// Keypad amount entry. Green confirms; red zeroes the entry, which the
    /// caller then runs as a zero-coin redemption.
    fn read_amount(&mut self) -> u64 {
        self.hw.io.render("Enter amount:", "");
        let mut digits = String::new();
        loop {
            if let Some(key) = self.hw.io.next_key() {
                if key.is_ascii_digit() && digits.len() < AMOUNT_MAX_DIGITS {
                    self.hw.clock.sleep(self.cfg.debounce());
                    digits.push(key);
                }
            }
            self.hw.io.render("Enter amount:", &digits);
            if self.hw.io.button_pressed(Button::Green) {
                self.hw.clock.sleep(self.cfg.debounce());
                break;
            }
            if self.hw.io.button_pressed(Button::Red) {
                digits.clear();
                self.hw.clock.sleep(self.cfg.debounce());
                break;
            }
        }
        digits.parse().unwrap_or(0)
    }

    /// Runs the hopper until `amount` pulses are counted. A silent gap longer
    /// than the pulse timeout aborts the run as faulted. The hopper is
    /// deactivated unconditionally on every exit path.
    fn dispense(&mut self, amount: u64) -> (u64, bool) {
        if amount == 0 {
            return (0, false);
        }

        self.hw.io.render("Dispensing coins", "Please wait ...");
        self.hw.dispenser.activate();

        let mut dispensed = 0u64;
        let mut deadline = self.hw.clock.now() + self.cfg.pulse_timeout();
        while dispensed < amount {
            if self.hw.dispenser.pulse_detected() {
                dispensed += 1;
                deadline = self.hw.clock.now() + self.cfg.pulse_timeout();
            } else if self.hw.clock.now() >= deadline {
                self.hw.dispenser.deactivate();
                return (dispensed, true);
            }
        }

        self.hw.dispenser.deactivate();
        (dispensed, false)
    }

    fn try_again(&mut self) -> bool {
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
