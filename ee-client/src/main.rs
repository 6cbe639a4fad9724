use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod commands;

#[derive(Parser)]
#[command(
    name = "eecache",
    about = "Tool for reading Evolution Engine cache archives",
    version,
    author,
    long_about = "Loads the paired .toc/.cache archive segments of a game \
                  installation and lists or extracts their contents, with \
                  locale-aware lookup and on-demand decompression."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Directory to probe for the native codec library
    #[arg(long, global = true)]
    codec_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered key in a cache directory
    List {
        /// Directory containing the .toc/.cache pairs
        cache_dir: PathBuf,
    },

    /// Extract cache contents to a directory tree
    Extract {
        /// Directory containing the .toc/.cache pairs
        cache_dir: PathBuf,

        /// Destination root; files land under variant/locale/path
        output_dir: PathBuf,

        /// Only extract paths containing this substring (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    match cli.command {
        Commands::List { cache_dir } => {
            commands::list::handle(&cache_dir, cli.codec_dir.as_deref())?;
        }
        Commands::Extract {
            cache_dir,
            output_dir,
            filter,
        } => {
            commands::extract::handle(
                &cache_dir,
                &output_dir,
                filter.as_deref(),
                cli.codec_dir.as_deref(),
            )?;
        }
    }

    Ok(())
}
