//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{inbox, piece, report, stitch, yarn};
use crate::logging;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "crochet")]
#[command(author, version, about = "Track crochet pieces, yarn and stitches, and price your work")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new crochet project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage pieces
    #[command(subcommand)]
    Piece(piece::PieceCommands),

    /// Manage the yarn inventory
    #[command(subcommand)]
    Yarn(yarn::YarnCommands),

    /// Manage the stitch library
    #[command(subcommand)]
    Stitch(stitch::StitchCommands),

    /// Calculate the suggested price of a piece
    Price {
        /// Piece ID
        id: String,

        /// Compare with what similar pieces sold for
        #[arg(long, short = 'c')]
        compare: bool,

        /// Show a suggested price range
        #[arg(long, short = 'r')]
        range: bool,

        /// Store the suggested price on the piece
        #[arg(long)]
        save: bool,
    },

    /// Estimate the work time of a piece
    Time {
        /// Piece ID
        id: String,

        /// Predict a completion date
        #[arg(long, short = 'p')]
        predict: bool,

        /// Hours worked per week (defaults to time.hours_per_week)
        #[arg(long, short = 'w')]
        hours_per_week: Option<f64>,
    },

    /// Show hours, completion and inventory statistics
    Stats,

    /// File photos from the inboxes
    #[command(subcommand)]
    Inbox(inbox::InboxCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("crochet starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created data directory at: {}", project.data_dir().display()),
            );
            output.success(&format!("Initialized crochet project at {}", project.root().display()));
        }

        Commands::Piece(cmd) => piece::run(cmd, &output)?,
        Commands::Yarn(cmd) => yarn::run(cmd, &output)?,
        Commands::Stitch(cmd) => stitch::run(cmd, &output)?,

        Commands::Price {
            id,
            compare,
            range,
            save,
        } => report::price(&output, &id, compare, range, save)?,
        Commands::Time { id, predict, hours_per_week } => {
            report::time(&output, &id, predict, hours_per_week)?
        }
        Commands::Stats => report::stats(&output)?,

        Commands::Inbox(cmd) => inbox::run(cmd, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
