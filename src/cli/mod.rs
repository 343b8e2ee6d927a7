use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mztab::error::Level;

mod config;
mod format;
mod info;
mod validate;

pub use validate::ValidateArgs;

/// mztab - mzTab-M validator, inspector and formatter
#[derive(Parser)]
#[command(name = "mztab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Minimum diagnostic level.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LevelArg {
    /// Everything
    Info,
    /// Warnings and errors
    Warn,
    /// Errors only
    Error,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Info => Level::Info,
            LevelArg::Warn => Level::Warn,
            LevelArg::Error => Level::Error,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an mzTab-M file and report every diagnostic
    Validate {
        /// Input mzTab-M file (optionally gzip-compressed)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Minimum level to report
        #[arg(short, long, value_enum)]
        level: Option<LevelArg>,

        /// Abort after this many diagnostics
        #[arg(short = 'm', long)]
        max_errors: Option<usize>,

        /// CV mapping rule file (PSI CvMapping XML or JSON)
        #[arg(long, value_name = "RULES")]
        mapping: Option<PathBuf>,

        /// OBO ontology used to resolve child terms
        #[arg(long, value_name = "OBO")]
        ontology: Option<PathBuf>,

        /// Report parameters no rule term allows as errors
        #[arg(long)]
        strict_terms: bool,

        /// Timeout per term lookup in milliseconds
        #[arg(long, value_name = "MS")]
        lookup_timeout_ms: Option<u64>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-render an mzTab-M file in canonical layout
    Format {
        /// Input mzTab-M file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file; `.gz` compresses, stdout when omitted
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Drop comment lines
        #[arg(long)]
        no_comments: bool,

        /// Do not separate sections with empty lines
        #[arg(long)]
        compact: bool,
    },

    /// Display a summary of an mzTab-M file
    Info {
        /// Input mzTab-M file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate {
            file,
            level,
            max_errors,
            mapping,
            ontology,
            strict_terms,
            lookup_timeout_ms,
            config,
            json,
        } => validate::run(ValidateArgs {
            file,
            level: level.map(Level::from),
            max_errors,
            mapping,
            ontology,
            strict_terms,
            lookup_timeout_ms,
            config,
            json,
        }),
        Commands::Format {
            input,
            output,
            no_comments,
            compact,
        } => format::run(input, output, no_comments, compact),
        Commands::Info { file } => info::run(file),
    }
}
