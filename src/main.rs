use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use frontgen::checker::DriftReport;
use frontgen::transform::GeneratedFile;
use frontgen::writer::{self, WriteOutcome};
use frontgen::{Config, EnumRequest, Generator, TranslationRequest, TranslatorRequest};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frontgen")]
#[command(about = "Generate frontend enum modules, locale bundles and translator helpers from backend sources")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "frontgen.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate enum modules
    Enums {
        /// Enum short or qualified names; all included enums when omitted
        names: Vec<String>,
        #[arg(long)]
        format: Option<String>,
        /// Report drift against existing files instead of writing
        #[arg(long)]
        check: bool,
    },
    /// Generate locale bundles
    Translations {
        /// Locales to generate; the configured locales when omitted
        locales: Vec<String>,
        #[arg(long)]
        format: Option<String>,
        /// Flatten nested keys to dot notation
        #[arg(long, overrides_with = "no_flat")]
        flat: bool,
        /// Keep nested keys even when the config sets `flat = true`
        #[arg(long, overrides_with = "flat")]
        no_flat: bool,
        /// Target i18n library syntax
        #[arg(long)]
        library: Option<String>,
    },
    /// Generate translator helpers
    Translators {
        names: Vec<String>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        runtime: Option<String>,
    },
    /// Generate every artifact kind
    All {
        /// Report enum drift instead of writing
        #[arg(long)]
        check: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("frontgen={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve `--flat` / `--no-flat`; None leaves the config value in place.
fn flat_override(flat: bool, no_flat: bool) -> Option<bool> {
    match (flat, no_flat) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn write_files(files: &[GeneratedFile]) -> Result<()> {
    let results = writer::write_all(files)?;
    let mut written = 0;
    for (path, outcome) in &results {
        match outcome {
            WriteOutcome::Written => {
                println!("  Written {}", path.display());
                written += 1;
            }
            WriteOutcome::Unchanged => println!("  No changes for {}", path.display()),
        }
    }
    if written == 0 {
        println!("  No changes, skipping all writes");
    }
    Ok(())
}

fn print_report(report: &DriftReport) {
    if report.is_in_sync() {
        println!("  Enum modules are in sync");
    } else {
        print!("{}", report);
    }
}

/// Run one command. Returns false when drift was detected.
fn run(cli: &Cli, config: Config, project_root: &Path) -> Result<bool> {
    println!("[1/3] Scanning sources...");
    let generator = Generator::new(config, project_root).context("Failed to prepare generator")?;
    println!("  Found {} enums", generator.registry().len());

    match &cli.command {
        Command::Enums {
            names,
            format,
            check,
        } => {
            let request = EnumRequest {
                names: names.clone(),
                format: format.clone(),
            };
            if *check {
                println!("\n[2/3] Checking enum modules...");
                let report = generator.check_enums(&request)?;
                print_report(&report);
                return Ok(report.is_in_sync());
            }
            println!("\n[2/3] Generating enum modules...");
            let files = generator.generate_enums(&request)?;
            println!("\n[3/3] Writing {} file(s)...", files.len());
            write_files(&files)?;
        }
        Command::Translations {
            locales,
            format,
            flat,
            no_flat,
            library,
        } => {
            let request = TranslationRequest {
                locales: locales.clone(),
                format: format.clone(),
                flat: flat_override(*flat, *no_flat),
                library: library.clone(),
            };
            println!("\n[2/3] Generating locale bundles...");
            let files = generator.generate_translations(&request)?;
            println!("\n[3/3] Writing {} file(s)...", files.len());
            write_files(&files)?;
        }
        Command::Translators {
            names,
            format,
            runtime,
        } => {
            let request = TranslatorRequest {
                names: names.clone(),
                format: format.clone(),
                runtime: runtime.clone(),
            };
            println!("\n[2/3] Generating translator helpers...");
            let files = generator.generate_translators(&request)?;
            println!("\n[3/3] Writing {} file(s)...", files.len());
            write_files(&files)?;
        }
        Command::All { check } => {
            if *check {
                println!("\n[2/3] Checking enum modules...");
                let report = generator.check_enums(&EnumRequest::default())?;
                print_report(&report);
                return Ok(report.is_in_sync());
            }
            println!("\n[2/3] Generating all artifacts...");
            let files = generator.generate_all()?;
            println!("\n[3/3] Writing {} file(s)...", files.len());
            write_files(&files)?;
        }
    }

    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start = Instant::now();

    let result = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))
        .and_then(|config| {
            let project_root = cli
                .config
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            run(&cli, config, project_root)
        });

    match result {
        Ok(true) => {
            println!("\nDone in {:?}", start.elapsed());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("\nDrift detected");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
