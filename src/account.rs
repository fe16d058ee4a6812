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

//! Account creation and lookup.
//!
//! The manager fronts the ledger for the two flows: it opens new accounts
//! with freshly generated identifiers and resolves operator-entered ones.

use crate::base::{ACCOUNT_ID_LEN, AccountId};
use crate::config::KioskConfig;
use crate::error::KioskError;
use crate::hal::{Button, Peripherals};
use crate::ledger::Ledger;
use rand::RngCore;
use tracing::{debug, info};

/// Generates candidate identifiers until one is free in the ledger.
///
/// The identifier space makes collisions negligible, but the loop is
/// unbounded and stays correct across arbitrarily many retries.
pub fn fresh_account_id<L: Ledger + ?Sized>(ledger: &L, rng: &mut dyn RngCore) -> AccountId {
    loop {
        let candidate = AccountId::generate(rng);
        if !ledger.exists(&candidate) {
            return candidate;
        }
        debug!(%candidate, "generated id already taken, retrying");
    }
}

/// Shared "account does not exist" notice.
pub(crate) fn account_missing(cfg: &KioskConfig, hw: &mut Peripherals) {
    hw.io.render("Account does", "not exist!");
    hw.clock.sleep(cfg.notice());
    hw.io.clear();
}

pub struct AccountManager<'a, L: Ledger> {
    cfg: &'a KioskConfig,
    ledger: &'a L,
    hw: &'a mut Peripherals,
}

impl<'a, L: Ledger> AccountManager<'a, L> {
    pub fn new(cfg: &'a KioskConfig, ledger: &'a L, hw: &'a mut Peripherals) -> Self {
        Self { cfg, ledger, hw }
    }

    /// Create-vs-enter choice. Blocks until a button is pressed: green routes
    /// to [`lookup_existing`](Self::lookup_existing), red opens a new account.
    pub fn account_menu(
        &mut self,
        rng: &mut dyn RngCore,
    ) -> Result<Option<AccountId>, KioskError> {
        self.hw.io.render("G:Enter account", "R:New account");
        loop {
            if self.hw.io.button_pressed(Button::Green) {
                self.hw.clock.sleep(self.cfg.debounce());
                return Ok(self.lookup_existing());
            }
            if self.hw.io.button_pressed(Button::Red) {
                self.hw.clock.sleep(self.cfg.debounce());
                return Ok(Some(self.create_account(rng)?));
            }
        }
    }

    /// Opens a zero-balance account under a fresh identifier and shows the
    /// number until the operator confirms having noted it down.
    pub fn create_account(&mut self, rng: &mut dyn RngCore) -> Result<AccountId, KioskError> {
        self.hw.io.render("Creating your", "account number");
        let id = fresh_account_id(self.ledger, rng);
        self.ledger.create(id.clone())?;
        info!(account = %id, "account created");
        self.show_new_account(&id);
        Ok(id)
    }

    /// Displays the new account number, re-offering the display window until
    /// the operator declines more time.
    fn show_new_account(&mut self, id: &AccountId) {
        let mut remaining = self.cfg.account_display_secs;
        loop {
            self.hw.io.render("New account no.:", id.as_str());
            self.hw.clock.sleep(self.cfg.tick());
            if remaining == 0 {
                self.hw.io.render("Do you need more", "time? G:Yes R:No");
                loop {
                    if self.hw.io.button_pressed(Button::Green) {
                        remaining = self.cfg.account_display_secs;
                        break;
                    }
                    if self.hw.io.button_pressed(Button::Red) {
                        self.hw.io.clear();
                        return;
                    }
                }
            } else {
                remaining -= 1;
            }
        }
    }

    /// Keypad entry of an existing account number.
    ///
    /// Digit entry itself is unbounded, but only `lookup_attempts` tries at
    /// an identifier that exists in the ledger are allowed before giving up.
    pub fn lookup_existing(&mut self) -> Option<AccountId> {
        for attempt in 0..self.cfg.lookup_attempts {
            let id = self.read_account_digits();
            if self.ledger.exists(&id) {
                return Some(id);
            }
            info!(attempt, "entered account not found");
            self.hw.io.render("Invalid account!", "");
            self.hw.clock.sleep(self.cfg.reject());
            self.hw.io.clear();
        }
        None
    }

    fn read_account_digits(&mut self) -> AccountId {
        self.hw.io.render("Enter account:", "");
        let mut digits = String::with_capacity(ACCOUNT_ID_LEN);
        while digits.len() < ACCOUNT_ID_LEN {
            if let Some(key) = self.hw.io.next_key() {
                if key.is_ascii_digit() {
                    self.hw.clock.sleep(self.cfg.debounce());
                    digits.push(key);
                }
            }
            self.hw.io.render("Enter account:", &digits);
        }
        AccountId::from_digits(digits)
    }

    /// Renders the account number and balance for the summary duration.
    pub fn show_summary(&mut self, id: &AccountId) -> Result<(), KioskError> {
        let balance = self.ledger.balance(id)?;
        self.hw
            .io
            .render(&format!("A#: {id}"), &format!("Credits: {balance}"));
        self.hw.clock.sleep(self.cfg.summary());
        self.hw.io.clear();
        Ok(())
    }
}
