//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Records | Pieces, yarn, stitches | `piece add`, `piece log`, `yarn list`, `stitch show` |
//! | Reports | Derived numbers | `price`, `time`, `stats` |
//! | Photos | Inbox filing | `inbox status`, `inbox file` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on stderr:
//! ```bash
//! crochet --verbose price PIECE-001
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod input;
mod piece;
mod yarn;
mod stitch;
mod report;
mod inbox;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
