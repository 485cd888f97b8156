// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for Boltforge

pub mod reporter;
pub mod runner;

pub use reporter::Reporter;
pub use runner::{output_path, write_artifact, GenerateResult, PartReport, Runner};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr tracing subscriber. `RUST_LOG` wins over `-v` flags.
pub fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "boltforge=info",
            2 => "boltforge=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed, e.g. by a test harness
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .try_init();
}
