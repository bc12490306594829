//! crochet-ledger - A local-first record book for crochet work
//!
//! Keeps pieces, yarn and stitches in plain JSON files next to their
//! photos, and derives suggested prices, time estimates and statistics
//! from them.

pub mod domain;
pub mod storage;
pub mod cli;
pub mod logging;

pub use domain::{
    EntityId, Piece, PieceType, PriceBreakdown, PricingConfig, PricingEngine, Stitch,
    TimeEstimate, TimeEstimator, WorkStatus, Yarn,
};
