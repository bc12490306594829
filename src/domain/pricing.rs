//! Suggested price calculation
//!
//! A price is built from material cost and labor, adjusted for stitch
//! complexity scaled by piece size, marked up by the profit margin and
//! rounded to a friendly step:
//!
//! ```text
//! subtotal              = material_cost + labor_cost
//! complexity_adjustment = subtotal × (complexity_factor − 1) × size_factor
//! adjusted_subtotal     = subtotal + complexity_adjustment
//! total                 = adjusted_subtotal × (1 + profit_margin)
//! rounded_price         = total to the nearest multiple of round_to, half away from zero
//! ```
//!
//! All money is [`Decimal`]; binary floats never enter the chain.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{RecordStore, StoreError};
use super::id::EntityId;
use super::piece::{Piece, PieceType};
use super::stitch::StitchCategory;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Piece not found: {0}")]
    PieceNotFound(EntityId),

    #[error("Logged hours cannot be priced: {0}")]
    UnrepresentableHours(f64),

    #[error("Price of {0} is too large to calculate")]
    Overflow(EntityId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Economic assumptions used by [`PricingEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Currency per hour of work
    pub hourly_rate: Decimal,

    /// Markup fraction applied to the adjusted subtotal
    pub profit_margin: Decimal,

    /// Reserved floor margin; not applied to the price
    pub min_margin: Decimal,

    /// Rounding step in whole currency units
    pub round_to: u32,

    /// Stitch category name to complexity multiplier
    pub stitch_complexity: BTreeMap<String, Decimal>,

    /// Piece type name to size multiplier
    pub size_factors: BTreeMap<String, Decimal>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let stitch_complexity = [
            (StitchCategory::Basic, Decimal::new(100, 2)),
            (StitchCategory::Textured, Decimal::new(115, 2)),
            (StitchCategory::Lace, Decimal::new(125, 2)),
            (StitchCategory::Colorwork, Decimal::new(130, 2)),
            (StitchCategory::Specialty, Decimal::new(140, 2)),
        ]
        .into_iter()
        .map(|(c, f)| (c.as_str().to_string(), f))
        .collect();

        let size_factors = [
            (PieceType::Hat, Decimal::new(8, 1)),
            (PieceType::Cowl, Decimal::new(9, 1)),
            (PieceType::Scarf, Decimal::new(10, 1)),
            (PieceType::Shawl, Decimal::new(12, 1)),
            (PieceType::Blanket, Decimal::new(15, 1)),
            (PieceType::Other, Decimal::new(10, 1)),
        ]
        .into_iter()
        .map(|(t, f)| (t.as_str().to_string(), f))
        .collect();

        Self {
            hourly_rate: Decimal::new(800, 2),
            profit_margin: Decimal::new(20, 2),
            min_margin: Decimal::new(10, 2),
            round_to: 5,
            stitch_complexity,
            size_factors,
        }
    }
}

impl PricingConfig {
    /// Multiplier for a stitch category, 1.0 when the table lacks it
    pub fn complexity_of(&self, category: StitchCategory) -> Decimal {
        self.stitch_complexity
            .get(category.as_str())
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Multiplier for a piece type key, 1.0 when the table lacks it
    pub fn size_of(&self, type_key: &str) -> Decimal {
        self.size_factors
            .get(type_key)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

/// Every intermediate value of one price calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub material_cost: Decimal,
    pub labor_cost: Decimal,
    pub subtotal: Decimal,
    pub complexity_factor: Decimal,
    pub size_factor: Decimal,
    pub complexity_adjustment: Decimal,
    pub adjusted_subtotal: Decimal,
    pub profit_amount: Decimal,
    pub total: Decimal,
    pub rounded_price: Decimal,
}

/// Where a suggested range came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RangeBasis {
    /// Min and max of priced pieces of the same type
    Comparables { count: usize },
    /// ±20% around this piece's own rounded price
    OwnPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub basis: RangeBasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketVerdict {
    NoData,
    AboveMarket,
    BelowMarket,
    InLine,
}

impl MarketVerdict {
    pub fn recommendation(&self) -> &'static str {
        match self {
            MarketVerdict::NoData => "Use suggested price as starting point",
            MarketVerdict::AboveMarket => {
                "Suggested price is significantly higher than market average. Consider lowering."
            }
            MarketVerdict::BelowMarket => {
                "Suggested price is below market average. You may be able to charge more."
            }
            MarketVerdict::InLine => "Suggested price is in line with market.",
        }
    }
}

/// Suggested price set against what similar pieces actually sold for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketComparison {
    pub suggested_price: Decimal,
    pub avg_sold_price: Option<Decimal>,
    pub difference: Option<Decimal>,
    pub difference_pct: Option<Decimal>,
    pub similar_pieces_count: usize,
    pub verdict: MarketVerdict,
    pub recommendation: &'static str,
}

/// Percentage beyond which a price is out of line with the market
const MARKET_TOLERANCE_PCT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Spread of the fallback range around the piece's own price
const RANGE_LOW: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
const RANGE_HIGH: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// Prices pieces read from a [`RecordStore`]
pub struct PricingEngine<'a, S> {
    store: &'a S,
    config: PricingConfig,
}

impl<'a, S: RecordStore> PricingEngine<'a, S> {
    pub fn new(store: &'a S, config: PricingConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Full price breakdown for one piece
    pub fn calculate_price(&self, piece_id: &EntityId) -> Result<PriceBreakdown, PricingError> {
        let piece = self.require_piece(piece_id)?;
        self.price_piece(&piece)
    }

    /// Breakdown for a piece already in hand
    pub fn price_piece(&self, piece: &Piece) -> Result<PriceBreakdown, PricingError> {
        let overflow = || PricingError::Overflow(piece.id.clone());

        let material_cost = self.material_cost(piece)?;
        let labor_cost = self.labor_cost(piece)?;
        let subtotal = material_cost.checked_add(labor_cost).ok_or_else(overflow)?;

        let complexity_factor = self.complexity_factor(piece)?;
        let size_factor = self.config.size_of(&piece.type_key());

        let complexity_adjustment = complexity_factor
            .checked_sub(Decimal::ONE)
            .and_then(|extra| subtotal.checked_mul(extra))
            .and_then(|v| v.checked_mul(size_factor))
            .ok_or_else(overflow)?;
        let adjusted_subtotal = subtotal
            .checked_add(complexity_adjustment)
            .ok_or_else(overflow)?;

        let profit_amount = adjusted_subtotal
            .checked_mul(self.config.profit_margin)
            .ok_or_else(overflow)?;
        let total = adjusted_subtotal
            .checked_add(profit_amount)
            .ok_or_else(overflow)?;
        let rounded_price = round_to_step(total, self.config.round_to).ok_or_else(overflow)?;

        tracing::debug!(
            piece = %piece.id,
            %material_cost,
            %labor_cost,
            %complexity_factor,
            %size_factor,
            %rounded_price,
            "priced piece"
        );

        Ok(PriceBreakdown {
            material_cost,
            labor_cost,
            subtotal,
            complexity_factor,
            size_factor,
            complexity_adjustment,
            adjusted_subtotal,
            profit_amount,
            total,
            rounded_price,
        })
    }

    /// Sum of price paid per yarn entry; each entry is one ball
    pub fn material_cost(&self, piece: &Piece) -> Result<Decimal, PricingError> {
        let mut total = Decimal::ZERO;
        for yarn_id in &piece.yarns_used {
            if let Some(price) = self.store.get_yarn(yarn_id)?.and_then(|y| y.price_paid) {
                total = total
                    .checked_add(price)
                    .ok_or_else(|| PricingError::Overflow(piece.id.clone()))?;
            }
        }
        Ok(total)
    }

    pub fn labor_cost(&self, piece: &Piece) -> Result<Decimal, PricingError> {
        hours_to_decimal(piece.total_hours())?
            .checked_mul(self.config.hourly_rate)
            .ok_or_else(|| PricingError::Overflow(piece.id.clone()))
    }

    /// Mean complexity of the stitches that resolve; 1 when none do
    pub fn complexity_factor(&self, piece: &Piece) -> Result<Decimal, PricingError> {
        let mut sum = Decimal::ZERO;
        let mut count = 0u32;

        for stitch_id in &piece.stitches_used {
            if let Some(stitch) = self.store.get_stitch(stitch_id)? {
                sum = sum
                    .checked_add(self.config.complexity_of(stitch.category()))
                    .ok_or_else(|| PricingError::Overflow(piece.id.clone()))?;
                count += 1;
            }
        }

        if count == 0 {
            return Ok(Decimal::ONE);
        }
        Ok(sum / Decimal::from(count))
    }

    /// Min/max asking price of other active pieces of the same type
    pub fn suggest_price_range(&self, piece_id: &EntityId) -> Result<PriceRange, PricingError> {
        let piece = self.require_piece(piece_id)?;

        let prices: Vec<Decimal> = self
            .store
            .list_pieces(false)?
            .into_iter()
            .filter(|p| p.same_type(&piece) && &p.id != piece_id)
            .filter_map(|p| p.price)
            .collect();

        match (prices.iter().min(), prices.iter().max()) {
            (Some(&min), Some(&max)) => Ok(PriceRange {
                min,
                max,
                basis: RangeBasis::Comparables {
                    count: prices.len(),
                },
            }),
            _ => {
                let base = self.price_piece(&piece)?.rounded_price;
                let spread = |factor: Decimal| {
                    base.checked_mul(factor)
                        .ok_or_else(|| PricingError::Overflow(piece_id.clone()))
                };
                Ok(PriceRange {
                    min: spread(RANGE_LOW)?,
                    max: spread(RANGE_HIGH)?,
                    basis: RangeBasis::OwnPrice,
                })
            }
        }
    }

    /// Compares the suggested price with sold pieces of the same type,
    /// archived ones included
    pub fn compare_to_market(&self, piece_id: &EntityId) -> Result<MarketComparison, PricingError> {
        let piece = self.require_piece(piece_id)?;
        let suggested_price = self.price_piece(&piece)?.rounded_price;

        let sold: Vec<Decimal> = self
            .store
            .list_pieces(true)?
            .into_iter()
            .filter(|p| p.same_type(&piece) && p.is_sold())
            .filter_map(|p| p.sold_price)
            .collect();

        if sold.is_empty() {
            return Ok(MarketComparison {
                suggested_price,
                avg_sold_price: None,
                difference: None,
                difference_pct: None,
                similar_pieces_count: 0,
                verdict: MarketVerdict::NoData,
                recommendation: MarketVerdict::NoData.recommendation(),
            });
        }

        let overflow = || PricingError::Overflow(piece_id.clone());
        let sum = sold
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
            .ok_or_else(overflow)?;
        let avg = sum / Decimal::from(sold.len());
        let difference = suggested_price.checked_sub(avg).ok_or_else(overflow)?;
        let difference_pct = if avg.is_zero() {
            Decimal::ZERO
        } else {
            difference
                .checked_div(avg)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(overflow)?
        };

        let verdict = if difference_pct > MARKET_TOLERANCE_PCT {
            MarketVerdict::AboveMarket
        } else if difference_pct < -MARKET_TOLERANCE_PCT {
            MarketVerdict::BelowMarket
        } else {
            MarketVerdict::InLine
        };

        Ok(MarketComparison {
            suggested_price,
            avg_sold_price: Some(avg),
            difference: Some(difference),
            difference_pct: Some(difference_pct),
            similar_pieces_count: sold.len(),
            verdict,
            recommendation: verdict.recommendation(),
        })
    }

    fn require_piece(&self, piece_id: &EntityId) -> Result<Piece, PricingError> {
        self.store
            .get_piece(piece_id)?
            .ok_or_else(|| PricingError::PieceNotFound(piece_id.clone()))
    }
}

/// Rounds to the nearest multiple of `step`, halves away from zero.
///
/// `None` when the rounded value no longer fits in a [`Decimal`].
pub fn round_to_step(value: Decimal, step: u32) -> Option<Decimal> {
    let step = Decimal::from(step.max(1));
    (value / step)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(step)
}

/// Exact decimal for an hours value, taken from its shortest text form
pub fn hours_to_decimal(hours: f64) -> Result<Decimal, PricingError> {
    Decimal::from_str(&hours.to_string()).map_err(|_| PricingError::UnrepresentableHours(hours))
}
