//! affirank: rank retailer products linked from creator posts

mod commands;

use affirank::config::{Config, LogFormat, DEFAULT_CONFIG_FILE};
use affirank::input::InputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "affirank")]
#[command(about = "Rank affiliate products by how often posts link to them")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank products linked from a post dump and export a CSV report
    Rank {
        /// Post dump (`-` reads stdin)
        input: PathBuf,

        /// Input format (detected from the extension if not specified)
        #[arg(short, long, value_enum)]
        format: Option<CliInputFormat>,

        /// Only title and export the top N products
        #[arg(short, long)]
        max_titles: Option<usize>,

        /// Delay between title requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Skip title lookups
        #[arg(long)]
        no_titles: bool,

        /// Directory for the CSV report
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print every retailer link found in a post dump with its key
    Extract {
        /// Post dump (`-` reads stdin)
        input: PathBuf,

        /// Input format (detected from the extension if not specified)
        #[arg(short, long, value_enum)]
        format: Option<CliInputFormat>,
    },

    /// Resolve the title for one product key or URL
    Title {
        /// `retailer:identifier` key or product URL
        target: String,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// CLI input format (mirrors InputFormat with clap support)
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliInputFormat {
    /// One JSON object per line with `text` and optional `url`
    Jsonl,
    /// Plain text, posts separated by blank lines
    Text,
}

impl From<CliInputFormat> for InputFormat {
    fn from(format: CliInputFormat) -> Self {
        match format {
            CliInputFormat::Jsonl => InputFormat::Jsonl,
            CliInputFormat::Text => InputFormat::Text,
        }
    }
}

fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter_directive(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init needs no existing config
    if let Commands::Init { path, force } = &cli.command {
        return commands::init::init_config(path, *force);
    }

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Rank {
            input,
            format,
            max_titles,
            delay_ms,
            no_titles,
            output_dir,
        } => {
            let options = commands::rank::RankOptions {
                format: format.map(Into::into),
                max_titles,
                delay_ms,
                no_titles,
                output_dir,
            };
            commands::rank::rank_posts(config, input, options).await
        }
        Commands::Extract { input, format } => {
            commands::extract::extract_links(config, input, format.map(Into::into))
        }
        Commands::Title { target } => commands::title::resolve_title(config, target).await,
        Commands::Init { .. } => Ok(()),
    }
}
