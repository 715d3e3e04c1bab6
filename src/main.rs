use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use covrep::cli;
use covrep::config::{Overrides, ReportConfig};
use covrep::detect::Format;
use covrep::render::Style;

/// covrep — line coverage reports with full, partial and missed statements.
#[derive(Parser)]
#[command(name = "covrep", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a coverage report.
    Report {
        /// Path to the coverage file.
        file: PathBuf,

        /// Override format detection.
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Output style (default from config, else text).
        #[arg(long, value_enum)]
        style: Option<Style>,

        /// Report title.
        #[arg(long)]
        title: Option<String>,

        /// Config file (default: ./covrep.toml if present).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Do not render annotated source blocks.
        #[arg(long)]
        no_source: bool,

        /// Directory that relative source filenames are resolved against.
        #[arg(long)]
        source_root: Option<PathBuf>,

        /// Write the report to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show missed and partially covered lines for one source file.
    Uncovered {
        /// Path to the coverage file.
        file: PathBuf,

        /// The source file path (as stored in the coverage data).
        source_file: String,

        /// Override format detection.
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Commands::Report {
            file,
            format,
            style,
            title,
            config,
            no_source,
            source_root,
            output,
        } => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            let config = ReportConfig::discover(config.as_deref(), &cwd)
                .context("Failed to load config")?
                .merge_overrides(Overrides {
                    title,
                    no_source,
                    source_root,
                    style,
                });
            let report = cli::cmd_report(&file, format, &config)?;
            if let Some(path) = output {
                std::fs::write(&path, report)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                return Ok(());
            }
            report
        }
        Commands::Uncovered {
            file,
            source_file,
            format,
        } => cli::cmd_uncovered(&file, &source_file, format)?,
    };

    print!("{output}");
    Ok(())
}
