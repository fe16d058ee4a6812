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

//! Account ledger service.
//!
//! The ledger is the durable mapping from account identifier to credit
//! balance. The controller consumes it through the [`Ledger`] trait and
//! requires read-your-write consistency within the process; [`MemoryLedger`]
//! is the in-process implementation.

use crate::base::AccountId;
use crate::error::KioskError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use serde::Serialize;

/// Durable account store.
///
/// Balances are non-negative decimals. Only the deposit flow credits and
/// only the redeem flow debits; the controller is single-threaded so no two
/// mutators ever race.
pub trait Ledger {
    fn exists(&self, id: &AccountId) -> bool;

    /// Inserts a zero-balance record.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::DuplicateAccount`] if the identifier is taken.
    fn create(&self, id: AccountId) -> Result<(), KioskError>;

    /// # Errors
    ///
    /// Returns [`KioskError::AccountNotFound`] for an unknown identifier.
    fn balance(&self, id: &AccountId) -> Result<Decimal, KioskError>;

    /// # Errors
    ///
    /// Returns [`KioskError::AccountNotFound`] for an unknown identifier.
    fn set_balance(&self, id: &AccountId, amount: Decimal) -> Result<(), KioskError>;
}

/// Snapshot row for the operator account report.
#[derive(Debug, Serialize)]
pub struct AccountRecord {
    pub account: AccountId,
    pub credits: Decimal,
}

/// In-memory [`Ledger`] keyed by account identifier.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: DashMap<AccountId, Decimal>,
}

impl MemoryLedger {
    const DECIMAL_PRECISION: u32 = 2;

    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Seeds an account with a starting balance. Test and provisioning hook;
    /// the kiosk itself only creates zero-balance accounts.
    pub fn seed(&self, id: AccountId, balance: Decimal) {
        self.accounts.insert(id, balance);
    }

    /// All accounts, sorted by identifier for stable report output.
    pub fn snapshot(&self) -> Vec<AccountRecord> {
        let mut rows: Vec<AccountRecord> = self
            .accounts
            .iter()
            .map(|entry| AccountRecord {
                account: entry.key().clone(),
                credits: entry.value().round_dp(Self::DECIMAL_PRECISION),
            })
            .collect();
        rows.sort_by(|a, b| a.account.as_str().cmp(b.account.as_str()));
        rows
    }
}

impl Ledger for MemoryLedger {
    fn exists(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    fn create(&self, id: AccountId) -> Result<(), KioskError> {
        // Entry API for an atomic check-and-insert.
        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(KioskError::DuplicateAccount),
            Entry::Vacant(entry) => {
                entry.insert(Decimal::ZERO);
                Ok(())
            }
        }
    }

    fn balance(&self, id: &AccountId) -> Result<Decimal, KioskError> {
        self.accounts
            .get(id)
            .map(|entry| *entry.value())
            .ok_or(KioskError::AccountNotFound)
    }

    fn set_balance(&self, id: &AccountId, amount: Decimal) -> Result<(), KioskError> {
        match self.accounts.get_mut(id) {
            Some(mut entry) => {
                *entry.value_mut() = amount;
                Ok(())
            }
            None => Err(KioskError::AccountNotFound),
        }
    }
}
