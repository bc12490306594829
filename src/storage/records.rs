//! JSON storage for records
//!
//! Each kind lives in its own file, `.crochet/{pieces,yarns,stitches}.json`:
//!
//! ```json
//! {"_meta": {"next_id": 4, "last_updated": "..."}, "pieces": [ ... ]}
//! ```
//!
//! Files are rewritten whole. Reads take a shared lock, writes go to a
//! locked temp file that is renamed over the original.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use fs2::FileExt;
use serde_json::{json, Map, Value};

use crate::domain::{EntityId, Record};

/// One collection file holding records of type `T`
pub struct RecordFile<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Record> RecordFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// The collection file for `T` inside a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(
            project_root
                .join(".crochet")
                .join(format!("{}.json", T::KIND.plural())),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record, archived ones included
    pub fn read_all(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {}", self.path.display()))?;

        let document: Value = serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        let key = T::KIND.plural();
        let items = match document.get(key) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => bail!("'{}' in {} is not a list", key, self.path.display()),
        };

        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                T::deserialize(item).with_context(|| {
                    format!("Failed to parse {} entry {} in {}", key, i + 1, self.path.display())
                })
            })
            .collect::<Result<Vec<T>>>()?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "read records");
        Ok(records)
    }

    pub fn list(&self, include_archived: bool) -> Result<Vec<T>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| include_archived || !r.is_archived())
            .collect())
    }

    /// Looks a record up by ID, archived or not
    pub fn get(&self, id: &EntityId) -> Result<Option<T>> {
        Ok(self.read_all()?.into_iter().find(|r| r.id() == id))
    }

    /// Writes all records (full rewrite), ordered by ID
    pub fn write_all(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut sorted: Vec<&T> = records.iter().collect();
        sorted.sort_by(|a, b| a.id().cmp(b.id()));

        // null once the numbering is exhausted; create() refuses from then on
        let next_id = EntityId::next_after(T::KIND, sorted.iter().map(|r| r.id()))
            .ok()
            .map(|id| id.number());
        let mut document = Map::new();
        document.insert(
            "_meta".to_string(),
            json!({
                "next_id": next_id,
                "last_updated": Utc::now().to_rfc3339(),
            }),
        );
        document.insert(
            T::KIND.plural().to_string(),
            serde_json::to_value(&sorted)
                .with_context(|| format!("Failed to serialize {}", T::KIND.plural()))?,
        );

        let temp_path = self.path.with_extension("json.tmp");
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive().with_context(|| {
                format!("Failed to acquire write lock on {}", temp_path.display())
            })?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, &document)
                .context("Failed to write record file")?;
            writeln!(writer).context("Failed to write record file")?;
            writer.flush().context("Failed to flush record file")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!(path = %self.path.display(), count = sorted.len(), "wrote records");
        Ok(())
    }

    /// Stores a new record under the next sequential ID
    pub fn create(&self, mut record: T) -> Result<T> {
        let mut records = self.read_all()?;

        let id = EntityId::next_after(T::KIND, records.iter().map(|r| r.id()))?;
        record.set_id(id);
        record.stamp_created(Utc::now());

        records.push(record.clone());
        self.write_all(&records)?;

        tracing::info!(id = %record.id(), "created {}", T::KIND);
        Ok(record)
    }

    /// Overwrites an existing record in full
    pub fn update(&self, mut record: T) -> Result<T> {
        let mut records = self.read_all()?;

        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| anyhow::anyhow!("Record not found: {}", record.id()))?;

        record.touch(Utc::now());
        *slot = record.clone();
        self.write_all(&records)?;

        tracing::info!(id = %record.id(), "updated {}", T::KIND);
        Ok(record)
    }

    /// Soft-deletes a record
    pub fn archive(&self, id: &EntityId, reason: Option<String>, on: NaiveDate) -> Result<T> {
        let mut record = self
            .get(id)?
            .ok_or_else(|| anyhow::anyhow!("Record not found: {}", id))?;

        record.archive(reason, on);
        let record = self.update(record)?;

        tracing::info!(id = %id, "archived {}", T::KIND);
        Ok(record)
    }
}
