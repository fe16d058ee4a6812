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

//! Kiosk configuration: weight thresholds, pricing, and timing.
//!
//! Defaults mirror the firmware constants of the deployed kiosk; a JSON file
//! can override any subset of fields.

use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Storage bin reading at which the kiosk stops accepting containers.
    pub storage_max_grams: f64,
    /// Storage bin reading at which the yellow indicator comes on.
    pub storage_warn_grams: f64,

    /// Intake reading above which an item is considered present.
    pub presence_grams: f64,
    /// Heaviest reading still accepted as a single container.
    pub bottle_max_grams: f64,
    /// Exact reading the intake scale reports with nothing on the tray.
    /// Excluded from acceptance even though it sits below `bottle_max_grams`.
    pub tray_empty_grams: f64,

    /// Credit per kilogram of container weight.
    pub price_per_kilo: Decimal,
    /// Grams per pricing unit (1000 prices per kilogram).
    pub weight_scale: Decimal,

    /// One-second ticks the transaction menu stays open.
    pub select_window_ticks: u32,
    /// Attempts at entering an existing account before giving up.
    pub lookup_attempts: u32,
    /// Seconds the new-account number stays on screen before offering more time.
    pub account_display_secs: u32,

    pub debounce_ms: u64,
    pub settle_ms: u64,
    pub tick_ms: u64,
    pub conveyor_pulse_ms: u64,
    pub banner_ms: u64,
    pub summary_ms: u64,
    pub thank_you_ms: u64,
    pub reject_ms: u64,
    pub notice_ms: u64,
    /// Longest gap between coin pulses before the dispense is declared faulted.
    pub pulse_timeout_ms: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            storage_max_grams: 5000.0,
            storage_warn_grams: 3000.0,
            presence_grams: 1.0,
            bottle_max_grams: 500.0,
            tray_empty_grams: 0.0,
            price_per_kilo: dec!(10),
            weight_scale: dec!(1000),
            select_window_ticks: 5,
            lookup_attempts: 3,
            account_display_secs: 11,
            debounce_ms: 300,
            settle_ms: 300,
            tick_ms: 1000,
            conveyor_pulse_ms: 5000,
            banner_ms: 3000,
            summary_ms: 3000,
            thank_you_ms: 2000,
            reject_ms: 1000,
            notice_ms: 3000,
            pulse_timeout_ms: 10_000,
        }
    }
}

impl KioskConfig {
    /// Loads a configuration file, falling back to defaults for absent fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn conveyor_pulse(&self) -> Duration {
        Duration::from_millis(self.conveyor_pulse_ms)
    }

    pub fn banner(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }

    pub fn summary(&self) -> Duration {
        Duration::from_millis(self.summary_ms)
    }

    pub fn thank_you(&self) -> Duration {
        Duration::from_millis(self.thank_you_ms)
    }

    pub fn reject(&self) -> Duration {
        Duration::from_millis(self.reject_ms)
    }

    pub fn notice(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn pulse_timeout(&self) -> Duration {
        Duration::from_millis(self.pulse_timeout_ms)
    }
}
