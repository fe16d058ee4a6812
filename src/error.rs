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

//! Error types for the kiosk controller.

use thiserror::Error;

/// Controller and ledger errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KioskError {
    /// Account identifier is not eleven ASCII digits
    #[error("account identifier must be 11 digits")]
    InvalidAccountId,

    /// Referenced account does not exist in the ledger
    #[error("account not found")]
    AccountNotFound,

    /// Account identifier already exists in the ledger
    #[error("account already exists")]
    DuplicateAccount,
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
