//! Work time estimation
//!
//! An estimate is produced by the first tier that has something to say:
//!
//! 1. complete pieces report their own logged hours
//! 2. the average of complete pieces sharing the main stitch
//! 3. the average of complete pieces of the same type
//! 4. a fixed default per type
//!
//! Estimation never fails. A missing piece or an unreadable store yields a
//! low-confidence empty estimate whose basis says why.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::catalog::RecordStore;
use super::id::EntityId;
use super::piece::{Piece, PieceType};
use super::stats::{average_hours, counts_toward_average};

/// Time defaults used by [`TimeEstimator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Pace assumed when predicting a completion date
    pub hours_per_week: f64,

    /// Default for types missing from `default_hours`
    pub fallback_hours: f64,

    /// Piece type name to default total hours
    pub default_hours: BTreeMap<String, f64>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        let default_hours = [
            (PieceType::Hat, 6.0),
            (PieceType::Cowl, 8.0),
            (PieceType::Scarf, 12.0),
            (PieceType::Shawl, 20.0),
            (PieceType::Blanket, 40.0),
            (PieceType::Other, 15.0),
        ]
        .into_iter()
        .map(|(t, h)| (t.as_str().to_string(), h))
        .collect();

        Self {
            hours_per_week: 5.0,
            fallback_hours: 15.0,
            default_hours,
        }
    }
}

impl TimeConfig {
    /// Default hours for a type key, `fallback_hours` when unlisted
    pub fn default_for(&self, type_key: &str) -> f64 {
        self.default_hours
            .get(type_key)
            .copied()
            .unwrap_or(self.fallback_hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEstimate {
    pub total_hours_logged: f64,
    pub estimated_total_hours: Option<f64>,
    /// Never negative
    pub estimated_remaining_hours: Option<f64>,
    pub estimated_completion_date: Option<NaiveDate>,
    pub confidence: Confidence,
    pub basis: String,
}

impl TimeEstimate {
    fn empty(basis: &str) -> Self {
        Self {
            total_hours_logged: 0.0,
            estimated_total_hours: None,
            estimated_remaining_hours: None,
            estimated_completion_date: None,
            confidence: Confidence::Low,
            basis: basis.to_string(),
        }
    }

    fn projected(logged: f64, total: f64, confidence: Confidence, basis: String) -> Self {
        Self {
            total_hours_logged: logged,
            estimated_total_hours: Some(total),
            estimated_remaining_hours: Some((total - logged).max(0.0)),
            estimated_completion_date: None,
            confidence,
            basis,
        }
    }
}

/// Estimates work hours for pieces read from a [`RecordStore`]
pub struct TimeEstimator<'a, S> {
    store: &'a S,
    config: TimeConfig,
}

impl<'a, S: RecordStore> TimeEstimator<'a, S> {
    pub fn new(store: &'a S, config: TimeConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TimeConfig {
        &self.config
    }

    pub fn estimate_total_hours(&self, piece_id: &EntityId) -> TimeEstimate {
        match self.store.get_piece(piece_id) {
            Ok(Some(piece)) => self.estimate_piece(&piece),
            Ok(None) => TimeEstimate::empty("Piece not found"),
            Err(e) => {
                tracing::warn!(piece = %piece_id, error = %e, "time estimate degraded");
                TimeEstimate::empty("Record store unavailable")
            }
        }
    }

    pub fn estimate_piece(&self, piece: &Piece) -> TimeEstimate {
        if let Some(done) = complete_tier(piece) {
            return done;
        }

        let history = match self.store.list_pieces(true) {
            Ok(pieces) => pieces,
            Err(e) => {
                tracing::warn!(piece = %piece.id, error = %e, "no history for time estimate");
                Vec::new()
            }
        };

        stitch_tier(piece, &history)
            .or_else(|| type_tier(piece, &history))
            .unwrap_or_else(|| default_tier(piece, &self.config))
    }

    /// Completion date at `hours_per_week`, counted from today
    pub fn predict_completion_date(
        &self,
        piece_id: &EntityId,
        hours_per_week: f64,
    ) -> Option<NaiveDate> {
        self.predict_completion_date_from(piece_id, hours_per_week, Local::now().date_naive())
    }

    /// Whole weeks of remaining work, converted to days and truncated
    pub fn predict_completion_date_from(
        &self,
        piece_id: &EntityId,
        hours_per_week: f64,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        if !hours_per_week.is_finite() || hours_per_week <= 0.0 {
            return None;
        }

        let remaining = self
            .estimate_total_hours(piece_id)
            .estimated_remaining_hours
            .filter(|r| *r > 0.0)?;

        let days = (remaining / hours_per_week * 7.0) as u64;
        today.checked_add_days(Days::new(days))
    }
}

fn complete_tier(piece: &Piece) -> Option<TimeEstimate> {
    if !piece.is_complete() {
        return None;
    }

    let logged = piece.total_hours();
    Some(TimeEstimate {
        total_hours_logged: logged,
        estimated_total_hours: Some(logged),
        estimated_remaining_hours: Some(0.0),
        estimated_completion_date: piece.date_finished,
        confidence: Confidence::High,
        basis: "Piece is complete".to_string(),
    })
}

/// Complete pieces sharing the main stitch, narrowed to the same type
/// when any of them match it
fn stitch_tier(piece: &Piece, history: &[Piece]) -> Option<TimeEstimate> {
    let stitch = piece.main_stitch()?;

    let matches: Vec<&Piece> = history
        .iter()
        .filter(|p| p.uses_stitch(stitch) && counts_toward_average(p))
        .collect();

    let same_type: Vec<&Piece> = matches
        .iter()
        .copied()
        .filter(|p| p.same_type(piece))
        .collect();

    let (pool, basis) = if same_type.is_empty() {
        (matches, format!("Based on pieces using {stitch}"))
    } else {
        (
            same_type,
            format!("Based on similar {} pieces using {stitch}", piece.type_key()),
        )
    };

    let avg = average_hours(pool)?;
    Some(TimeEstimate::projected(
        piece.total_hours(),
        avg,
        Confidence::Medium,
        basis,
    ))
}

fn type_tier(piece: &Piece, history: &[Piece]) -> Option<TimeEstimate> {
    let avg = average_hours(
        history
            .iter()
            .filter(|p| p.same_type(piece) && counts_toward_average(p)),
    )?;

    Some(TimeEstimate::projected(
        piece.total_hours(),
        avg,
        Confidence::Medium,
        format!("Based on average for {} pieces", piece.type_key()),
    ))
}

fn default_tier(piece: &Piece, config: &TimeConfig) -> TimeEstimate {
    let key = piece.type_key();
    TimeEstimate::projected(
        piece.total_hours(),
        config.default_for(&key),
        Confidence::Low,
        format!("Using default estimate for {key}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Catalog, StoreError};
    use crate::domain::piece::{WorkSession, WorkStatus};
    use crate::domain::record::Record;
    use crate::domain::stitch::Stitch;
    use crate::domain::yarn::Yarn;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn done(n: u32, piece_type: PieceType, stitch: u32, hours: f64) -> Piece {
        Piece::new(EntityId::piece(n), format!("Done {n}"), piece_type)
            .with_status(WorkStatus::Finished)
            .with_stitches(vec![EntityId::stitch(stitch)])
            .with_work_hours(hours)
    }

    fn wip(n: u32, piece_type: PieceType, stitches: Vec<EntityId>, hours: f64) -> Piece {
        Piece::new(EntityId::piece(n), format!("Wip {n}"), piece_type)
            .with_stitches(stitches)
            .with_work_hours(hours)
    }

    fn estimator(catalog: &Catalog) -> TimeEstimator<'_, Catalog> {
        TimeEstimator::new(catalog, TimeConfig::default())
    }

    #[test]
    fn complete_piece_short_circuits_other_tiers() {
        let mut finished = done(1, PieceType::Scarf, 1, 9.0);
        finished.date_finished = Some(date(2026, 3, 1));
        let catalog = Catalog::from_records(
            vec![finished, done(2, PieceType::Scarf, 1, 30.0)],
            vec![],
            vec![],
        );

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.confidence, Confidence::High);
        assert_eq!(est.estimated_total_hours, Some(9.0));
        assert_eq!(est.estimated_remaining_hours, Some(0.0));
        assert_eq!(est.estimated_completion_date, Some(date(2026, 3, 1)));
        assert_eq!(est.basis, "Piece is complete");
    }

    #[test]
    fn main_stitch_average_prefers_same_type() {
        let catalog = Catalog::from_records(
            vec![
                wip(1, PieceType::Shawl, vec![EntityId::stitch(7), EntityId::stitch(2)], 4.0),
                done(2, PieceType::Shawl, 7, 18.0),
                done(3, PieceType::Shawl, 7, 22.0),
                done(4, PieceType::Blanket, 7, 60.0),
            ],
            vec![],
            vec![],
        );

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.confidence, Confidence::Medium);
        assert_eq!(est.estimated_total_hours, Some(20.0));
        assert_eq!(est.estimated_remaining_hours, Some(16.0));
        assert_eq!(est.basis, "Based on similar shawl pieces using STITCH-007");
    }

    #[test]
    fn main_stitch_average_drops_type_filter_when_it_empties() {
        let catalog = Catalog::from_records(
            vec![
                wip(1, PieceType::Cowl, vec![EntityId::stitch(7)], 0.0),
                done(2, PieceType::Shawl, 7, 10.0),
                done(3, PieceType::Blanket, 7, 30.0),
            ],
            vec![],
            vec![],
        );

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.estimated_total_hours, Some(20.0));
        assert_eq!(est.confidence, Confidence::Medium);
        assert_eq!(est.basis, "Based on pieces using STITCH-007");
    }

    #[test]
    fn only_the_main_stitch_is_matched() {
        let catalog = Catalog::from_records(
            vec![
                wip(1, PieceType::Hat, vec![EntityId::stitch(1), EntityId::stitch(2)], 1.0),
                done(2, PieceType::Bag, 2, 50.0),
            ],
            vec![],
            vec![],
        );

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.confidence, Confidence::Low);
        assert_eq!(est.estimated_total_hours, Some(6.0));
    }

    #[test]
    fn type_average_used_when_no_stitch_data() {
        let mut archived = done(3, PieceType::Scarf, 9, 14.0);
        archived.archive(None, date(2026, 1, 1));
        let catalog = Catalog::from_records(
            vec![
                wip(1, PieceType::Scarf, vec![], 3.0),
                done(2, PieceType::Scarf, 8, 10.0),
                archived,
                done(4, PieceType::Scarf, 8, 0.0),
            ],
            vec![],
            vec![],
        );

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.estimated_total_hours, Some(12.0));
        assert_eq!(est.estimated_remaining_hours, Some(9.0));
        assert_eq!(est.basis, "Based on average for scarf pieces");
    }

    #[test]
    fn hat_without_data_uses_default() {
        let catalog =
            Catalog::from_records(vec![wip(1, PieceType::Hat, vec![], 0.0)], vec![], vec![]);

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.estimated_total_hours, Some(6.0));
        assert_eq!(est.confidence, Confidence::Low);
        assert_eq!(est.basis, "Using default estimate for hat");
    }

    #[test]
    fn unlisted_type_uses_fallback_and_remaining_is_clamped() {
        let catalog =
            Catalog::from_records(vec![wip(1, PieceType::Poncho, vec![], 25.0)], vec![], vec![]);

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.estimated_total_hours, Some(15.0));
        assert_eq!(est.estimated_remaining_hours, Some(0.0));
    }

    #[test]
    fn unrecognized_stored_type_uses_fallback_hours() {
        let mut toy = wip(1, PieceType::Other, vec![], 2.0);
        toy.type_name = "Amigurumi".to_string();
        let catalog = Catalog::from_records(vec![toy], vec![], vec![]);

        let est = estimator(&catalog).estimate_total_hours(&EntityId::piece(1));
        assert_eq!(est.estimated_total_hours, Some(15.0));
        assert_eq!(est.estimated_remaining_hours, Some(13.0));
        assert_eq!(est.basis, "Using default estimate for amigurumi");
    }

    #[test]
    fn missing_piece_degrades_to_empty_estimate() {
        let est = estimator(&Catalog::new()).estimate_total_hours(&EntityId::piece(3));

        assert_eq!(est.total_hours_logged, 0.0);
        assert_eq!(est.estimated_total_hours, None);
        assert_eq!(est.confidence, Confidence::Low);
        assert_eq!(est.basis, "Piece not found");
    }

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn get_piece(&self, _: &EntityId) -> Result<Option<Piece>, StoreError> {
            Err(StoreError::Read {
                collection: "pieces",
                message: "disk on fire".to_string(),
            })
        }

        fn get_yarn(&self, _: &EntityId) -> Result<Option<Yarn>, StoreError> {
            Ok(None)
        }

        fn get_stitch(&self, _: &EntityId) -> Result<Option<Stitch>, StoreError> {
            Ok(None)
        }

        fn list_pieces(&self, _: bool) -> Result<Vec<Piece>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn store_failure_degrades_to_empty_estimate() {
        let estimator = TimeEstimator::new(&BrokenStore, TimeConfig::default());
        let est = estimator.estimate_total_hours(&EntityId::piece(1));

        assert_eq!(est.basis, "Record store unavailable");
        assert_eq!(est.confidence, Confidence::Low);
    }

    #[test]
    fn prediction_truncates_to_whole_days() {
        let today = date(2026, 5, 1);

        // Default hat is 6h: 10h remaining needs a bigger default
        let mut config = TimeConfig::default();
        config.default_hours.insert("hat".to_string(), 10.0);
        config.default_hours.insert("cowl".to_string(), 11.0);
        let catalog = Catalog::from_records(
            vec![
                wip(1, PieceType::Hat, vec![], 0.0),
                wip(2, PieceType::Cowl, vec![], 0.0),
            ],
            vec![],
            vec![],
        );
        let estimator = TimeEstimator::new(&catalog, config);

        assert_eq!(
            estimator.predict_completion_date_from(&EntityId::piece(1), 5.0, today),
            Some(date(2026, 5, 15))
        );
        assert_eq!(
            estimator.predict_completion_date_from(&EntityId::piece(2), 5.0, today),
            Some(date(2026, 5, 16))
        );
    }

    #[test]
    fn no_prediction_without_remaining_work_or_pace() {
        let today = date(2026, 5, 1);
        let finished = Piece::new(EntityId::piece(1), "Done", PieceType::Hat)
            .with_status(WorkStatus::Ready)
            .with_session(WorkSession::new(today, 5.0).unwrap());
        let catalog = Catalog::from_records(
            vec![finished, wip(2, PieceType::Hat, vec![], 1.0)],
            vec![],
            vec![],
        );
        let estimator = estimator(&catalog);

        assert_eq!(estimator.predict_completion_date_from(&EntityId::piece(1), 5.0, today), None);
        assert_eq!(estimator.predict_completion_date_from(&EntityId::piece(9), 5.0, today), None);
        assert_eq!(estimator.predict_completion_date_from(&EntityId::piece(2), 0.0, today), None);
        assert!(estimator.predict_completion_date_from(&EntityId::piece(2), 5.0, today).is_some());
    }
}
