// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3D printing tolerance lookup
//!
//! Wider nozzles spread filament further and print less precisely, so both the
//! bolt shaft and the nut bore need more clearance as the nozzle grows.

use serde::{Deserialize, Serialize};

/// Clearances applied to printed mating parts (millimeters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintTolerance {
    /// Subtracted from the bolt shaft radius
    pub shaft_offset: f64,
    /// Added to the nut bore radius
    pub bore_clearance: f64,
}

/// Upper nozzle bound (inclusive) and the tolerance used up to it
const BANDS: [(f64, PrintTolerance); 3] = [
    (
        0.2,
        PrintTolerance {
            shaft_offset: 0.15,
            bore_clearance: 0.25,
        },
    ),
    (
        0.4,
        PrintTolerance {
            shaft_offset: 0.2,
            bore_clearance: 0.35,
        },
    ),
    (
        0.6,
        PrintTolerance {
            shaft_offset: 0.3,
            bore_clearance: 0.5,
        },
    ),
];

const TOP_BAND: PrintTolerance = PrintTolerance {
    shaft_offset: 0.4,
    bore_clearance: 0.6,
};

impl PrintTolerance {
    /// The full lookup table as `(upper bound, tolerance)` pairs; the last
    /// entry has an infinite bound.
    pub fn bands() -> Vec<(f64, PrintTolerance)> {
        let mut bands = BANDS.to_vec();
        bands.push((f64::INFINITY, TOP_BAND));
        bands
    }
}

/// Resolve the tolerance band for a nozzle size. Any value is accepted.
pub fn resolve(nozzle_size: f64) -> PrintTolerance {
    BANDS
        .iter()
        .find(|(limit, _)| nozzle_size <= *limit)
        .map(|(_, tolerance)| *tolerance)
        .unwrap_or(TOP_BAND)
}
