//! Read access to the project's records
//!
//! The calculations never touch files. They read through [`RecordStore`],
//! which the storage layer implements over the JSON collections and
//! [`Catalog`] implements over an in-memory snapshot.

use std::collections::BTreeMap;

use thiserror::Error;

use super::id::EntityId;
use super::piece::Piece;
use super::record::Record;
use super::stitch::Stitch;
use super::yarn::Yarn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {collection}: {message}")]
    Read {
        collection: &'static str,
        message: String,
    },
}

/// Lookup interface consumed by the pricing, timing and statistics code
pub trait RecordStore {
    fn get_piece(&self, id: &EntityId) -> Result<Option<Piece>, StoreError>;

    fn get_yarn(&self, id: &EntityId) -> Result<Option<Yarn>, StoreError>;

    fn get_stitch(&self, id: &EntityId) -> Result<Option<Stitch>, StoreError>;

    fn list_pieces(&self, include_archived: bool) -> Result<Vec<Piece>, StoreError>;
}

/// All records of a project, loaded once
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pieces: BTreeMap<EntityId, Piece>,
    yarns: BTreeMap<EntityId, Yarn>,
    stitches: BTreeMap<EntityId, Stitch>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(
        pieces: impl IntoIterator<Item = Piece>,
        yarns: impl IntoIterator<Item = Yarn>,
        stitches: impl IntoIterator<Item = Stitch>,
    ) -> Self {
        let mut catalog = Self::new();
        pieces.into_iter().for_each(|p| catalog.insert_piece(p));
        yarns.into_iter().for_each(|y| catalog.insert_yarn(y));
        stitches.into_iter().for_each(|s| catalog.insert_stitch(s));
        catalog
    }

    pub fn insert_piece(&mut self, piece: Piece) {
        self.pieces.insert(piece.id.clone(), piece);
    }

    pub fn insert_yarn(&mut self, yarn: Yarn) {
        self.yarns.insert(yarn.id.clone(), yarn);
    }

    pub fn insert_stitch(&mut self, stitch: Stitch) {
        self.stitches.insert(stitch.id.clone(), stitch);
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn yarns(&self) -> impl Iterator<Item = &Yarn> {
        self.yarns.values()
    }

    pub fn stitches(&self) -> impl Iterator<Item = &Stitch> {
        self.stitches.values()
    }
}

impl RecordStore for Catalog {
    fn get_piece(&self, id: &EntityId) -> Result<Option<Piece>, StoreError> {
        Ok(self.pieces.get(id).cloned())
    }

    fn get_yarn(&self, id: &EntityId) -> Result<Option<Yarn>, StoreError> {
        Ok(self.yarns.get(id).cloned())
    }

    fn get_stitch(&self, id: &EntityId) -> Result<Option<Stitch>, StoreError> {
        Ok(self.stitches.get(id).cloned())
    }

    fn list_pieces(&self, include_archived: bool) -> Result<Vec<Piece>, StoreError> {
        Ok(self
            .pieces
            .values()
            .filter(|p| include_archived || !p.is_archived())
            .cloned()
            .collect())
    }
}
