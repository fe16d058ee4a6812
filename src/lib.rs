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

//! # Revend
//!
//! Controller for a reverse-vending ("bottle deposit") kiosk. The controller
//! sequences account selection, deposit validation, credit accounting, and
//! coin redemption, while supervising the storage bin fill level.
//!
//! ## Core Components
//!
//! - [`SessionController`]: top-level state machine ticked by the daemon
//! - [`StorageMonitor`]: bin fill supervision with operation gating
//! - [`AccountManager`]: account creation and keypad lookup
//! - [`DepositFlow`] / [`RedeemFlow`]: the two transaction pipelines
//! - [`Ledger`]: account balance service, with [`MemoryLedger`] in-process
//! - [`hal`]: trait seams for every physical device, injected at startup
//!
//! ## Example
//!
//! ```
//! use revend::{AccountId, KioskConfig, Ledger, MemoryLedger, deposit_credit};
//! use rust_decimal_macros::dec;
//!
//! let ledger = MemoryLedger::new();
//! let id = AccountId::parse("01234567890").unwrap();
//! ledger.create(id.clone()).unwrap();
//!
//! // A 250 g container at the default 10-per-kilo pricing credits 2.50.
//! let credit = deposit_credit(250.0, &KioskConfig::default());
//! assert_eq!(credit, dec!(2.50));
//! ```
//!
//! ## Concurrency
//!
//! The controller is single-threaded, cooperative, and poll-driven. Exactly
//! one transaction is active at a time; the ledger relies on that absence of
//! concurrent mutators rather than on locking.

pub mod account;
pub mod base;
pub mod config;
pub mod deposit;
pub mod error;
pub mod hal;
pub mod ledger;
pub mod redeem;
pub mod session;
pub mod storage;

pub use account::AccountManager;
pub use base::AccountId;
pub use config::KioskConfig;
pub use deposit::{DepositFlow, DepositOutcome, deposit_credit};
pub use error::{ConfigError, KioskError};
pub use hal::{Button, Peripherals};
pub use ledger::{AccountRecord, Ledger, MemoryLedger};
pub use redeem::{RedeemFlow, RedeemOutcome};
pub use session::{SessionController, SessionState, Tick, TransactionKind};
pub use storage::{StorageCheck, StorageLevel, StorageMonitor};
