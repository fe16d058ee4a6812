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

//! Core identifier type for kiosk accounts.

use crate::error::KioskError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in an account identifier.
pub const ACCOUNT_ID_LEN: usize = 11;

/// Unique identifier for a kiosk account.
///
/// Wraps an 11-digit numeric string, either operator-entered on the keypad
/// or randomly generated when a new account is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Validates and wraps an operator-entered identifier.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::InvalidAccountId`] unless the input is exactly
    /// eleven ASCII digits.
    pub fn parse(input: &str) -> Result<Self, KioskError> {
        if input.len() != ACCOUNT_ID_LEN || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KioskError::InvalidAccountId);
        }
        Ok(AccountId(input.to_owned()))
    }

    /// Generates a random candidate identifier.
    ///
    /// Uniqueness against the ledger is the caller's responsibility; see
    /// [`crate::account::fresh_account_id`].
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let digits = (0..ACCOUNT_ID_LEN)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        AccountId(digits)
    }

    /// Wraps digits already validated by the keypad collection loop.
    pub(crate) fn from_digits(digits: String) -> Self {
        debug_assert!(digits.len() == ACCOUNT_ID_LEN);
        debug_assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        AccountId(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
