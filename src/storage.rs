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

//! Storage bin supervision.
//!
//! The monitor classifies the bin load cell reading into a fill level on
//! every session tick, drives the indicator lamps, and suspends all kiosk
//! operation while the bin is full.

use crate::config::KioskConfig;
use crate::hal::{Peripherals, shutdown_chord};
use tracing::info;

/// Bin fill level, recomputed on every poll and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLevel {
    Low,
    Warning,
    Full,
}

/// Result of one storage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCheck {
    /// The kiosk may operate; carries the current fill level.
    Ready(StorageLevel),
    /// The shutdown chord fired while the bin was full.
    Shutdown,
}

pub struct StorageMonitor {
    max_grams: f64,
    warn_grams: f64,
}

impl StorageMonitor {
    pub fn new(cfg: &KioskConfig) -> Self {
        Self {
            max_grams: cfg.storage_max_grams,
            warn_grams: cfg.storage_warn_grams,
        }
    }

    /// Threshold classification.
    ///
    /// A reading exactly at the warning threshold is `Warning`; exactly at
    /// the maximum is `Full`.
    pub fn classify(&self, grams: f64) -> StorageLevel {
        if grams >= self.max_grams {
            StorageLevel::Full
        } else if grams >= self.warn_grams {
            StorageLevel::Warning
        } else {
            StorageLevel::Low
        }
    }

    /// One supervision pass, called at the top of every session tick.
    ///
    /// While the bin reads full this blocks, re-polling the scale and the
    /// shutdown chord, until an operator empties the bin below the maximum.
    /// No deposits or redemptions happen during that time.
    pub fn evaluate(&self, hw: &mut Peripherals) -> StorageCheck {
        let mut grams = hw.storage_scale.read_grams();

        if self.classify(grams) == StorageLevel::Full {
            hw.indicator.set_level(StorageLevel::Full);
            hw.io.render("Storage full", "Collect bottles");
            info!(grams, "storage bin full, suspending operation");

            loop {
                grams = hw.storage_scale.read_grams();
                if grams < self.max_grams {
                    break;
                }
                if shutdown_chord(hw.io.as_mut()) {
                    return StorageCheck::Shutdown;
                }
            }

            hw.io.clear();
            info!(grams, "storage bin emptied, resuming");
        }

        let level = self.classify(grams);
        hw.indicator.set_level(level);
        StorageCheck::Ready(level)
    }
}
