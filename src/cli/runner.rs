// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Command execution for the CLI: generate, export and inspect batches

use crate::config::KitConfig;
use crate::geometry::{analyze, GeometryStats};
use crate::io::{self, ExportFormat};
use crate::layout::{layout, KitLayout};
use crate::parts::PartKind;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of a generate-and-export run
pub struct GenerateResult {
    pub layout: KitLayout,
    pub bytes: Vec<u8>,
    pub generate_time: Duration,
    pub export_time: Duration,
}

/// Geometry report for one merged part kind
#[derive(Debug, Clone, Serialize)]
pub struct PartReport {
    pub kind: PartKind,
    pub count: usize,
    pub stats: GeometryStats,
    pub warnings: Vec<String>,
}

/// Runner for CLI commands
#[derive(Debug, Clone)]
pub struct Runner {
    config: KitConfig,
}

impl Runner {
    pub fn new(config: KitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    /// Build the batch and encode it
    pub fn generate(&self, format: ExportFormat) -> Result<GenerateResult> {
        let start = Instant::now();
        let batch = layout(&self.config.fastener, &self.config.quality).context("Failed to generate fastener kit")?;
        let generate_time = start.elapsed();

        let start = Instant::now();
        let bytes = io::export(&batch, format).with_context(|| format!("Failed to export {}", format))?;
        let export_time = start.elapsed();

        Ok(GenerateResult {
            layout: batch,
            bytes,
            generate_time,
            export_time,
        })
    }

    /// Analyze each merged part kind of the batch
    pub fn inspect(&self) -> Result<Vec<PartReport>> {
        let batch = layout(&self.config.fastener, &self.config.quality).context("Failed to generate fastener kit")?;
        let meshes = io::merge_by_kind(&batch).context("Failed to merge parts")?;

        Ok(meshes
            .iter()
            .map(|(kind, mesh)| {
                let parts: Vec<_> = batch.parts.iter().filter(|p| p.kind == *kind).collect();
                let warnings = parts
                    .first()
                    .map(|p| p.warnings.iter().map(ToString::to_string).collect())
                    .unwrap_or_default();
                PartReport {
                    kind: *kind,
                    count: parts.len(),
                    stats: analyze(mesh),
                    warnings,
                }
            })
            .collect())
    }
}

/// Output path with the format's extension when none was given
pub fn output_path(output: &Path, format: ExportFormat) -> PathBuf {
    if output.extension().is_some() {
        output.to_path_buf()
    } else {
        output.with_extension(format.extension())
    }
}

/// Write a finished artifact in one call
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
