//! Piece domain model
//!
//! A piece is a crochet project, in progress or complete. It is the subject
//! of both the price calculation and the time estimate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::{EntityId, EntityKind};
use super::record::{Lifecycle, Record};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid {field}: '{value}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("Hours must be a non-negative number, got {0}")]
    NegativeHours(f64),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Measurements must be positive centimetres, got {0}")]
    InvalidMeasurement(f64),
}

/// Category of piece; drives the size factor and the default time estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceType {
    Shawl,
    Scarf,
    BedThrow,
    Blanket,
    Cowl,
    Poncho,
    Cardigan,
    Hat,
    Bag,
    HomeDecor,
    Other,
}

impl PieceType {
    pub const ALL: [PieceType; 11] = [
        PieceType::Shawl,
        PieceType::Scarf,
        PieceType::BedThrow,
        PieceType::Blanket,
        PieceType::Cowl,
        PieceType::Poncho,
        PieceType::Cardigan,
        PieceType::Hat,
        PieceType::Bag,
        PieceType::HomeDecor,
        PieceType::Other,
    ];

    /// Key used in the configuration lookup tables
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceType::Shawl => "shawl",
            PieceType::Scarf => "scarf",
            PieceType::BedThrow => "bed_throw",
            PieceType::Blanket => "blanket",
            PieceType::Cowl => "cowl",
            PieceType::Poncho => "poncho",
            PieceType::Cardigan => "cardigan",
            PieceType::Hat => "hat",
            PieceType::Bag => "bag",
            PieceType::HomeDecor => "home_decor",
            PieceType::Other => "other",
        }
    }
}

/// Lookup key for a type name: trimmed, lowercase, dashes as underscores
pub fn normalize_type(name: &str) -> String {
    name.trim().to_lowercase().replace('-', "_")
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = normalize_type(s);
        PieceType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "piece type",
                value: s.to_string(),
            })
    }
}

/// Work progress of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    InProgress,
    Finished,
    /// Finished and blocked/packaged, ready to hand over
    Ready,
}

impl WorkStatus {
    /// Finished and ready pieces both count as complete work
    pub fn is_complete(&self) -> bool {
        matches!(self, WorkStatus::Finished | WorkStatus::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::InProgress => "in_progress",
            WorkStatus::Finished => "finished",
            WorkStatus::Ready => "ready",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "in_progress" | "wip" => Ok(WorkStatus::InProgress),
            "finished" | "done" => Ok(WorkStatus::Finished),
            "ready" => Ok(WorkStatus::Ready),
            _ => Err(ValidationError::UnknownValue {
                field: "work status",
                value: s.to_string(),
            }),
        }
    }
}

/// Where a piece is headed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    #[default]
    ForSale,
    Sold,
    ForGift,
    Gifted,
    ForSelf,
    InUse,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::ForSale => "for_sale",
            Destination::Sold => "sold",
            Destination::ForGift => "for_gift",
            Destination::Gifted => "gifted",
            Destination::ForSelf => "for_self",
            Destination::InUse => "in_use",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "for_sale" => Ok(Destination::ForSale),
            "sold" => Ok(Destination::Sold),
            "for_gift" => Ok(Destination::ForGift),
            "gifted" => Ok(Destination::Gifted),
            "for_self" => Ok(Destination::ForSelf),
            "in_use" => Ok(Destination::InUse),
            _ => Err(ValidationError::UnknownValue {
                field: "destination",
                value: s.to_string(),
            }),
        }
    }
}

/// A single sitting of work on a piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkSession {
    pub fn new(date: NaiveDate, hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(ValidationError::NegativeHours(hours));
        }
        Ok(Self {
            date,
            hours,
            notes: None,
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Finished size in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_cm: Option<f64>,
}

impl Dimensions {
    /// Builds dimensions from whichever measurements were given.
    ///
    /// Returns `None` when all three are absent.
    pub fn from_parts(
        width_cm: Option<f64>,
        length_cm: Option<f64>,
        depth_cm: Option<f64>,
    ) -> Result<Option<Self>, ValidationError> {
        for value in [width_cm, length_cm, depth_cm].into_iter().flatten() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidMeasurement(value));
            }
        }
        if width_cm.is_none() && length_cm.is_none() && depth_cm.is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            width_cm,
            length_cm,
            depth_cm,
        }))
    }

    /// Overlays the given measurements, keeping the rest
    pub fn merge(self, other: Dimensions) -> Self {
        Self {
            width_cm: other.width_cm.or(self.width_cm),
            length_cm: other.length_cm.or(self.length_cm),
            depth_cm: other.depth_cm.or(self.depth_cm),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [self.width_cm, self.length_cm, self.depth_cm]
            .into_iter()
            .flatten()
            .map(|v| format!("{v}"))
            .collect();
        write!(f, "{} cm", parts.join(" x "))
    }
}

/// A crochet piece (finished or in progress)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: EntityId,
    pub name: String,

    /// Kept as written; see [`Piece::piece_type`]
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub work_status: WorkStatus,

    #[serde(default)]
    pub destination: Destination,

    /// First entry is the main stitch
    #[serde(default)]
    pub stitches_used: Vec<EntityId>,

    /// One entry per unit (ball) consumed; duplicates are meaningful
    #[serde(default)]
    pub yarns_used: Vec<EntityId>,

    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_started: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_finished: Option<NaiveDate>,

    /// Legacy single total, only used when no sessions are recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<f64>,

    #[serde(default)]
    pub work_sessions: Vec<WorkSession>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_size_mm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,

    /// Asking price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_recipient: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Piece {
    pub fn new(id: EntityId, name: impl Into<String>, piece_type: PieceType) -> Self {
        Self {
            id,
            name: name.into(),
            type_name: piece_type.as_str().to_string(),
            work_status: WorkStatus::default(),
            destination: Destination::default(),
            stitches_used: Vec::new(),
            yarns_used: Vec::new(),
            photos: Vec::new(),
            date_started: None,
            date_finished: None,
            work_hours: None,
            work_sessions: Vec::new(),
            hook_size_mm: None,
            dimensions: None,
            price: None,
            suggested_price: None,
            sold_date: None,
            sold_price: None,
            sale_platform: None,
            sale_link: None,
            gift_recipient: None,
            notes: None,
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn with_status(mut self, status: WorkStatus) -> Self {
        self.work_status = status;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_stitches(mut self, stitches: Vec<EntityId>) -> Self {
        self.stitches_used = stitches;
        self
    }

    pub fn with_yarns(mut self, yarns: Vec<EntityId>) -> Self {
        self.yarns_used = yarns;
        self
    }

    pub fn with_work_hours(mut self, hours: f64) -> Self {
        self.work_hours = Some(hours);
        self
    }

    pub fn with_session(mut self, session: WorkSession) -> Self {
        self.work_sessions.push(session);
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Recognized type, `None` for names outside [`PieceType::ALL`]
    pub fn piece_type(&self) -> Option<PieceType> {
        self.type_name.parse().ok()
    }

    /// Key used for config lookups and for grouping similar pieces
    pub fn type_key(&self) -> String {
        normalize_type(&self.type_name)
    }

    pub fn same_type(&self, other: &Piece) -> bool {
        self.type_key() == other.type_key()
    }

    /// Total hours logged on this piece.
    ///
    /// Sum of session hours when any sessions exist, otherwise the legacy
    /// `work_hours` value, otherwise zero. Every calculation goes through
    /// this method.
    pub fn total_hours(&self) -> f64 {
        if !self.work_sessions.is_empty() {
            return self.work_sessions.iter().map(|s| s.hours).sum();
        }
        self.work_hours.unwrap_or(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.work_status.is_complete()
    }

    /// The first stitch listed, used for similar-piece lookups
    pub fn main_stitch(&self) -> Option<&EntityId> {
        self.stitches_used.first()
    }

    pub fn uses_stitch(&self, stitch: &EntityId) -> bool {
        self.stitches_used.contains(stitch)
    }

    pub fn is_sold(&self) -> bool {
        self.destination == Destination::Sold
    }

    pub fn log_session(&mut self, session: WorkSession) {
        self.work_sessions.push(session);
    }

    /// Marks the piece sold at `price`
    pub fn sell(
        &mut self,
        price: Decimal,
        on: NaiveDate,
        platform: Option<String>,
        link: Option<String>,
    ) {
        self.destination = Destination::Sold;
        self.sold_price = Some(price);
        self.sold_date = Some(on);
        if platform.is_some() {
            self.sale_platform = platform;
        }
        if link.is_some() {
            self.sale_link = link;
        }
    }

    /// Marks the piece as given away to `recipient`
    pub fn give(&mut self, recipient: impl Into<String>) {
        self.destination = Destination::Gifted;
        self.gift_recipient = Some(recipient.into());
    }

    /// Changes the work status, stamping the finish date on first completion
    pub fn set_status(&mut self, status: WorkStatus, today: NaiveDate) {
        self.work_status = status;
        if status.is_complete() && self.date_finished.is_none() {
            self.date_finished = Some(today);
        }
    }
}

impl Record for Piece {
    const KIND: EntityKind = EntityKind::Piece;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}
