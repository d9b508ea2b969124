//! Cardscry CLI - Trading-card identification tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cardscry_core::PreprocessMode;

mod commands;
mod exit_codes;
mod feed;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODE_HELP: &str = "\
Exit codes:
  0   success
  1   general error
  64  usage error
  65  no card detected or unusable image data
  66  cannot read an input file
  69  feed or card catalog unreachable
  74  cannot write an output file";

#[derive(Parser)]
#[command(name = "cardscry")]
#[command(author, version, about = "Trading-card identification by perceptual fingerprints", long_about = None)]
#[command(after_help = EXIT_CODE_HELP)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorWhen::Auto)]
    color: ColorWhen,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorWhen {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the card catalog from a Scryfall bulk data feed
    Ingest {
        /// Bulk data index URL
        #[arg(long, default_value = "https://api.scryfall.com/bulk-data")]
        feed_url: String,

        /// Bulk entry type to download
        #[arg(long, default_value = "default_cards")]
        bulk_type: String,

        /// PostgreSQL connection URL (defaults to $DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,

        /// Stop after indexing this many cards
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Identify a card photo against the catalog
    Identify {
        /// Path to the card photo
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// PostgreSQL connection URL (defaults to $DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Print the five fingerprints of an image
    Hash {
        /// Path to the image
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Cut the card out of a photo and save a perspective-corrected crop
    Crop {
        /// Path to the card photo
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (defaults to <input stem>-crop.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Binarization mode used to find the card outline
        #[arg(short, long, default_value = "otsu")]
        mode: PreprocessMode,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorWhen::Always => colored::control::set_override(true),
        ColorWhen::Never => colored::control::set_override(false),
        ColorWhen::Auto => {}
    }

    let ansi = !matches!(cli.color, ColorWhen::Never);
    init_tracing(cli.verbose, cli.quiet, ansi);

    let result = match cli.command {
        Commands::Ingest {
            feed_url,
            bulk_type,
            database_url,
            limit,
        } => commands::ingest::execute(feed_url, bulk_type, database_url, limit, cli.quiet).await,
        Commands::Identify { file, database_url } => {
            commands::identify::execute(file, database_url, cli.quiet).await
        }
        Commands::Hash { file } => commands::hash::execute(file).await,
        Commands::Crop { file, output, mode } => {
            commands::crop::execute(file, output, mode, cli.quiet).await
        }
    };

    if let Err(err) = result {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("{} {}", "Error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}

fn init_tracing(verbose: bool, quiet: bool, ansi: bool) {
    let default_filter = if verbose {
        "cardscry=debug,cardscry_core=debug"
    } else if quiet {
        "cardscry=error,cardscry_core=error"
    } else {
        "cardscry=info,cardscry_core=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .init();
}
