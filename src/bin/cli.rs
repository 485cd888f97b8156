// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boltforge CLI

use anyhow::Result;
use boltforge::cli::{init_tracing, output_path, write_artifact, Reporter, Runner};
use boltforge::{ExportFormat, KitConfig, MeshQuality, PrintTolerance, QualityPreset};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "boltforge")]
#[command(author, version, about = "Parametric bolt, nut and washer kit generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// ZIP of binary STL files, one per part
    Stl,
    /// 3MF package
    #[value(name = "3mf")]
    ThreeMf,
    /// glTF scene with embedded buffer
    Gltf,
    /// Binary glTF
    Glb,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Stl => ExportFormat::Stl,
            Format::ThreeMf => ExportFormat::ThreeMf,
            Format::Gltf => ExportFormat::Gltf,
            Format::Glb => ExportFormat::Glb,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Quality {
    Draft,
    Standard,
    Fine,
}

impl From<Quality> for QualityPreset {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Draft => QualityPreset::Draft,
            Quality::Standard => QualityPreset::Standard,
            Quality::Fine => QualityPreset::Fine,
        }
    }
}

/// Options shared by commands that build a batch
#[derive(clap::Args)]
struct KitArgs {
    /// TOML config file (defaults to ./boltforge.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of kits in the batch
    #[arg(long)]
    quantity: Option<u32>,

    /// Printer nozzle size in millimeters
    #[arg(long)]
    nozzle: Option<f64>,

    /// Include a matching nut in every kit
    #[arg(long)]
    nut: bool,

    /// Include a washer in every kit
    #[arg(long)]
    washer: bool,

    /// Tessellation preset
    #[arg(long, value_enum)]
    quality: Option<Quality>,
}

impl KitArgs {
    /// Config file and environment, then command-line flags on top
    fn load(&self) -> Result<KitConfig> {
        let mut config = KitConfig::load(self.config.as_deref())?;
        if let Some(quantity) = self.quantity {
            config.fastener.quantity = quantity;
        }
        if let Some(nozzle) = self.nozzle {
            config.fastener.nozzle_size = nozzle;
        }
        config.fastener.has_nut |= self.nut;
        config.fastener.has_washer |= self.washer;
        if let Some(quality) = self.quality {
            config.quality = MeshQuality::preset(quality.into());
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch and write it in the chosen format
    Generate {
        #[command(flatten)]
        kit: KitArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "stl")]
        format: Format,

        /// Output file; the format's extension is added when missing
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print geometry statistics for each part of the kit
    Inspect {
        #[command(flatten)]
        kit: KitArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the nozzle tolerance table
    Tolerance,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        if !cli.quiet {
            Reporter::report_error(&format!("{:#}", e));
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Generate { kit, format, output } => generate_command(kit, *format, output, cli.quiet),
        Commands::Inspect { kit, json } => inspect_command(kit, *json),
        Commands::Tolerance => {
            Reporter::report_tolerance_table(&PrintTolerance::bands());
            Ok(())
        }
    }
}

fn generate_command(kit: &KitArgs, format: Format, output: &Path, quiet: bool) -> Result<()> {
    let format = ExportFormat::from(format);
    let runner = Runner::new(kit.load()?);
    let result = runner.generate(format)?;

    let path = output_path(output, format);
    write_artifact(&path, &result.bytes)?;

    if !quiet {
        let warnings = result.layout.warnings().len();
        if warnings > 0 {
            Reporter::report_warning(&format!("{} part(s) used fallback geometry", warnings));
        }
        Reporter::report_generate(&path, &result);
    }
    Ok(())
}

fn inspect_command(kit: &KitArgs, json: bool) -> Result<()> {
    let reports = Runner::new(kit.load()?).inspect()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        Reporter::report_inspect(&reports);
    }
    Ok(())
}
