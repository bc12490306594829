//! The project's three collections behind one handle

use std::path::Path;

use anyhow::Result;

use super::records::RecordFile;
use crate::domain::{Catalog, EntityId, Piece, Record, RecordStore, Stitch, StoreError, Yarn};

/// Record store over the JSON files of a project.
///
/// Every [`RecordStore`] call re-reads the file it needs. Commands that
/// run several calculations take a [`JsonStore::snapshot`] instead.
pub struct JsonStore {
    pieces: RecordFile<Piece>,
    yarns: RecordFile<Yarn>,
    stitches: RecordFile<Stitch>,
}

impl JsonStore {
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            pieces: RecordFile::for_project(project_root),
            yarns: RecordFile::for_project(project_root),
            stitches: RecordFile::for_project(project_root),
        }
    }

    pub fn pieces(&self) -> &RecordFile<Piece> {
        &self.pieces
    }

    pub fn yarns(&self) -> &RecordFile<Yarn> {
        &self.yarns
    }

    pub fn stitches(&self) -> &RecordFile<Stitch> {
        &self.stitches
    }

    /// Loads every record, archived included, into memory
    pub fn snapshot(&self) -> Result<Catalog> {
        Ok(Catalog::from_records(
            self.pieces.read_all()?,
            self.yarns.read_all()?,
            self.stitches.read_all()?,
        ))
    }
}

fn store_error<T: Record>(e: anyhow::Error) -> StoreError {
    StoreError::Read {
        collection: T::KIND.plural(),
        message: format!("{:#}", e),
    }
}

impl RecordStore for JsonStore {
    fn get_piece(&self, id: &EntityId) -> Result<Option<Piece>, StoreError> {
        self.pieces.get(id).map_err(store_error::<Piece>)
    }

    fn get_yarn(&self, id: &EntityId) -> Result<Option<Yarn>, StoreError> {
        self.yarns.get(id).map_err(store_error::<Yarn>)
    }

    fn get_stitch(&self, id: &EntityId) -> Result<Option<Stitch>, StoreError> {
        self.stitches.get(id).map_err(store_error::<Stitch>)
    }

    fn list_pieces(&self, include_archived: bool) -> Result<Vec<Piece>, StoreError> {
        self.pieces
            .list(include_archived)
            .map_err(store_error::<Piece>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PieceType, PricingConfig, PricingEngine, StitchCategory};
    use rust_decimal::Decimal;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prices_straight_from_files() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::for_project(dir.path());

        let yarn = store
            .yarns()
            .create(Yarn::new(EntityId::yarn(1), "Cotton", "blue").with_price(Decimal::new(5, 0)))
            .unwrap();
        let stitch = store
            .stitches()
            .create(
                Stitch::new(EntityId::stitch(1), "Puff").with_category(StitchCategory::Textured),
            )
            .unwrap();
        let piece = store
            .pieces()
            .create(
                Piece::new(EntityId::piece(1), "Hat", PieceType::Hat)
                    .with_yarns(vec![yarn.id.clone()])
                    .with_stitches(vec![stitch.id.clone()])
                    .with_work_hours(2.0),
            )
            .unwrap();

        let engine = PricingEngine::new(&store, PricingConfig::default());
        let direct = engine.calculate_price(&piece.id).unwrap();

        let snapshot = store.snapshot().unwrap();
        let engine = PricingEngine::new(&snapshot, PricingConfig::default());
        assert_eq!(engine.calculate_price(&piece.id).unwrap(), direct);
        assert_eq!(direct.material_cost, Decimal::new(5, 0));
    }

    #[test]
    fn unreadable_file_surfaces_as_store_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::for_project(dir.path());
        fs::create_dir_all(dir.path().join(".crochet")).unwrap();
        fs::write(store.pieces().path(), "not json").unwrap();

        let err = store.list_pieces(true).unwrap_err();
        assert!(err.to_string().contains("pieces"));
    }
}
