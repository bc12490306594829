//! Hour statistics across all pieces

use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog::{RecordStore, StoreError};
use super::piece::{Piece, WorkStatus};

/// Complete pieces with hours logged are the only ones averaged
pub fn counts_toward_average(piece: &Piece) -> bool {
    piece.is_complete() && piece.total_hours() > 0.0
}

/// Mean total hours of the given pieces, `None` when there are none
pub fn average_hours<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> Option<f64> {
    let (sum, count) = pieces
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), p| (sum + p.total_hours(), count + 1));

    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeHours {
    pub total_hours: f64,
    pub count: usize,
    pub average_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    /// Every piece counts here, whatever its status or hours
    pub total_hours_all_time: f64,
    pub pieces_completed: usize,
    pub pieces_in_progress: usize,
    /// Keyed by type as stored, lowercased
    pub averages_by_type: BTreeMap<String, TypeHours>,
}

impl Statistics {
    pub fn from_pieces<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> Self {
        let mut stats = Statistics::default();

        for piece in pieces {
            let hours = piece.total_hours();
            stats.total_hours_all_time += hours;

            if piece.is_complete() {
                stats.pieces_completed += 1;
            } else if piece.work_status == WorkStatus::InProgress {
                stats.pieces_in_progress += 1;
            }

            if counts_toward_average(piece) {
                let entry = stats.averages_by_type.entry(piece.type_key()).or_default();
                entry.total_hours += hours;
                entry.count += 1;
            }
        }

        for entry in stats.averages_by_type.values_mut() {
            entry.average_hours = entry.total_hours / entry.count as f64;
        }

        stats
    }
}

/// Statistics over every piece in the store, archived ones included
pub fn get_statistics<S: RecordStore>(store: &S) -> Result<Statistics, StoreError> {
    let pieces = store.list_pieces(true)?;
    Ok(Statistics::from_pieces(&pieces))
}
