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

mod common;

use common::{Rig, fast_config};
use rand::SeedableRng;
use rand::rngs::StdRng;
use revend::hal::Button;
use revend::{AccountId, AccountManager, Ledger, MemoryLedger};
use rust_decimal_macros::dec;

#[test]
fn menu_red_opens_a_zero_balance_account() {
    let ledger = MemoryLedger::new();
    let cfg = fast_config();

    let rig = Rig::new();
    rig.push_green(&[false]);
    rig.push_red(&[true]); // new account
    rig.hold(Button::Red); // decline more display time

    let mut hw = rig.peripherals();
    let mut rng = StdRng::seed_from_u64(42);
    let id = AccountManager::new(&cfg, &ledger, &mut hw)
        .account_menu(&mut rng)
        .unwrap()
        .unwrap();

    assert!(ledger.exists(&id));
    assert_eq!(ledger.balance(&id).unwrap(), dec!(0));
    assert!(rig.screen_shown("Creating your", "account number"));
    assert!(rig.screen_shown("New account no.:", id.as_str()));
}

#[test]
fn green_at_the_time_prompt_extends_the_display() {
    let ledger = MemoryLedger::new();
    let cfg = fast_config(); // one-second display window

    let rig = Rig::new();
    rig.push_green(&[false, true, false]); // menu, extend once, then decline
    rig.push_red(&[true, true]);

    let mut hw = rig.peripherals();
    let mut rng = StdRng::seed_from_u64(42);
    let id = AccountManager::new(&cfg, &ledger, &mut hw)
        .account_menu(&mut rng)
        .unwrap()
        .unwrap();

    // Two renders per window, and the window ran twice.
    assert_eq!(rig.screens_with_line1("New account no.:"), 4);
    assert_eq!(rig.screens_with_line1("Do you need more"), 2);
    assert!(ledger.exists(&id));
}

#[test]
fn lookup_gives_up_after_three_attempts() {
    let ledger = MemoryLedger::new();
    let cfg = fast_config();

    let rig = Rig::new();
    rig.type_keys(&"0".repeat(33));

    let mut hw = rig.peripherals();
    let found = AccountManager::new(&cfg, &ledger, &mut hw).lookup_existing();

    assert_eq!(found, None);
    assert_eq!(rig.screens_with_line1("Invalid account!"), 3);
}

#[test]
fn lookup_succeeds_on_a_later_attempt() {
    let ledger = MemoryLedger::new();
    let good = AccountId::parse("11111111111").unwrap();
    ledger.create(good.clone()).unwrap();
    let cfg = fast_config();

    let rig = Rig::new();
    rig.type_keys("99999999999"); // first attempt misses
    rig.type_keys("11111111111");

    let mut hw = rig.peripherals();
    let found = AccountManager::new(&cfg, &ledger, &mut hw).lookup_existing();

    assert_eq!(found, Some(good));
    assert_eq!(rig.screens_with_line1("Invalid account!"), 1);
}

#[test]
fn non_digit_keys_are_ignored_during_entry() {
    let ledger = MemoryLedger::new();
    let id = AccountId::parse("12345678901").unwrap();
    ledger.create(id.clone()).unwrap();
    let cfg = fast_config();

    let rig = Rig::new();
    rig.type_keys("ab#12345678901");

    let mut hw = rig.peripherals();
    let found = AccountManager::new(&cfg, &ledger, &mut hw).lookup_existing();

    assert_eq!(found, Some(id));
}

#[test]
fn summary_shows_the_account_and_balance() {
    let ledger = MemoryLedger::new();
    let id = AccountId::parse("12345678901").unwrap();
    ledger.seed(id.clone(), dec!(3.25));
    let cfg = fast_config();

    let rig = Rig::new();
    let mut hw = rig.peripherals();
    AccountManager::new(&cfg, &ledger, &mut hw)
        .show_summary(&id)
        .unwrap();

    assert!(rig.screen_shown("A#: 12345678901", "Credits: 3.25"));
}
