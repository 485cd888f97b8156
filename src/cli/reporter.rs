// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::{GenerateResult, PartReport};
use crate::tolerance::PrintTolerance;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a finished generate run
    pub fn report_generate(output: &Path, result: &GenerateResult) {
        let batch = &result.layout;
        println!();
        Self::rule();
        println!("{} {}", "Generated:".bold(), output.display().to_string().cyan());
        Self::rule();
        println!(
            "  {} {} ({} x {} grid, slot {:.1} mm)",
            "Kits:".bright_black(),
            batch.quantity.to_string().cyan(),
            batch.grid.columns,
            batch.grid.rows,
            batch.slot
        );
        println!("  {} {}", "Parts:".bright_black(), batch.parts.len().to_string().cyan());
        println!(
            "  {} {}",
            "Triangles:".bright_black(),
            batch.triangle_count().to_string().cyan()
        );
        println!("  {} {}", "Size:".bright_black(), Self::format_bytes(result.bytes.len()).cyan());
        println!(
            "  {} {} generate, {} export",
            "Time:".bright_black(),
            Self::format_duration(result.generate_time).yellow(),
            Self::format_duration(result.export_time).yellow()
        );

        let warnings = batch.warnings();
        if !warnings.is_empty() {
            println!("\n{}", "Fallbacks:".bold());
            for (part, warning) in warnings {
                println!("  {} {}: {}", "⚠️".yellow(), part, warning.to_string().yellow());
            }
        }
        Self::rule();
    }

    /// Report geometry statistics per part kind
    pub fn report_inspect(reports: &[PartReport]) {
        for report in reports {
            let stats = &report.stats;
            let [w, d, h] = stats.size();
            println!();
            Self::rule();
            println!("{} {} x{}", "Part:".bold(), report.kind.to_string().cyan(), report.count);
            Self::rule();

            if stats.is_watertight {
                println!("{} {}", "✅".green(), "Closed manifold".green().bold());
            } else {
                println!("{} {}", "❌".red(), "Open or non-manifold surface".red().bold());
            }
            println!("  {} {:.3} mm³", "Volume:".bright_black(), stats.volume);
            println!("  {} {:.3} mm²", "Surface:".bright_black(), stats.surface_area);
            println!("  {} {:.2} x {:.2} x {:.2} mm", "Size:".bright_black(), w, d, h);
            println!(
                "  {} {} / {}",
                "Vertices / triangles:".bright_black(),
                stats.vertex_count.to_string().cyan(),
                stats.triangle_count.to_string().cyan()
            );
            for warning in &report.warnings {
                println!("  {} {}", "⚠️".yellow(), warning.yellow());
            }
        }
        Self::rule();
    }

    /// Print the nozzle tolerance bands
    pub fn report_tolerance_table(bands: &[(f64, PrintTolerance)]) {
        println!("{}", "Nozzle tolerance bands".bold());
        println!(
            "  {:<12} {:>14} {:>16}",
            "nozzle ≤".bright_black(),
            "shaft offset".bright_black(),
            "bore clearance".bright_black()
        );
        for (limit, tolerance) in bands {
            let limit = if limit.is_finite() {
                format!("{:.1} mm", limit)
            } else {
                "larger".to_string()
            };
            println!(
                "  {:<12} {:>14} {:>16}",
                limit.cyan(),
                format!("{:.2} mm", tolerance.shaft_offset),
                format!("{:.2} mm", tolerance.bore_clearance)
            );
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    fn format_bytes(bytes: usize) -> String {
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KiB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
