//! Domain models for crochet-ledger
//!
//! Contains the records and the pricing, timing and statistics logic
//! without any I/O concerns. Calculations read records through
//! [`RecordStore`] and take their tables by constructor.

mod id;
mod record;
mod piece;
mod yarn;
mod stitch;
mod catalog;
mod pricing;
mod timing;
mod stats;
mod dates;

pub use id::{EntityId, EntityKind, IdError};
pub use record::{Lifecycle, Record};
pub use piece::{
    normalize_type, Destination, Dimensions, Piece, PieceType, ValidationError, WorkSession,
    WorkStatus,
};
pub use yarn::{Material, Yarn};
pub use stitch::{Stitch, StitchCategory};
pub use catalog::{Catalog, RecordStore, StoreError};
pub use pricing::{
    hours_to_decimal, round_to_step, MarketComparison, MarketVerdict, PriceBreakdown, PriceRange,
    PricingConfig, PricingEngine, PricingError, RangeBasis,
};
pub use timing::{Confidence, TimeConfig, TimeEstimate, TimeEstimator};
pub use stats::{average_hours, counts_toward_average, get_statistics, Statistics, TypeHours};
pub use dates::{date_from_filename, parse_date, DateError};
