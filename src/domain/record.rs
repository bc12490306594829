//! Common shape of every stored record
//!
//! Pieces, yarns and stitches share the same lifecycle: created once with a
//! sequential ID, overwritten in full on update, and soft-deleted through an
//! `archived` flag. They are never hard-deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::id::{EntityId, EntityKind};

/// Archive flag and timestamps, flattened into each record's JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifecycle {
    #[serde(default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A record that lives in one of the project's collections
pub trait Record: Clone + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    fn set_id(&mut self, id: EntityId);

    fn lifecycle(&self) -> &Lifecycle;

    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    fn is_archived(&self) -> bool {
        self.lifecycle().archived
    }

    /// Soft-deletes the record
    fn archive(&mut self, reason: Option<String>, on: NaiveDate) {
        let lifecycle = self.lifecycle_mut();
        lifecycle.archived = true;
        lifecycle.archived_date = Some(on);
        lifecycle.archived_reason = reason;
    }

    /// Sets both timestamps for a freshly created record
    fn stamp_created(&mut self, now: DateTime<Utc>) {
        let lifecycle = self.lifecycle_mut();
        lifecycle.created_at = Some(now);
        lifecycle.updated_at = Some(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.lifecycle_mut().updated_at = Some(now);
    }
}
