//! # Storage Layer
//!
//! Persistence for crochet projects in plain, hand-editable files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Pieces | JSON | `.crochet/pieces.json` |
//! | Yarns | JSON | `.crochet/yarns.json` |
//! | Stitches | JSON | `.crochet/stitches.json` |
//! | Config | TOML | `.crochet/config.toml` |
//! | Photos | Image files | `images/{pieces,yarns,stitches}/` |
//!
//! ## Concurrency Safety
//!
//! - [`RecordFile`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .crochet/
//! ├── pieces.json           # Finished and in-progress pieces
//! ├── yarns.json            # Yarn inventory
//! ├── stitches.json         # Stitch library
//! └── config.toml           # Pricing and time settings
//! images/
//! ├── pieces/
//! │   ├── inbox/            # New photos waiting to be filed
//! │   └── PIECE-001/        # Filed photos of one piece
//! ├── yarns/inbox/
//! └── stitches/inbox/
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a crochet project
//! - [`JsonStore`] - The three collections, usable as a `RecordStore`
//! - [`Config`] - Project and global configuration
//! - [`PhotoInbox`] - Files inbox photos under record IDs

mod records;
mod store;
mod config;
mod project;
mod photos;

pub use records::RecordFile;
pub use store::JsonStore;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError};
pub use photos::{group_photos, infer_descriptor, plan_renames, PhotoGroup, PhotoInbox, PlannedMove};
