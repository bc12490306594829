//! Helpers for turning command-line strings into domain values

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::domain::{parse_date, EntityId, EntityKind, ValidationError};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses an optional date argument in any accepted format
pub fn date_arg(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(|v| parse_date(v).map_err(Into::into)).transpose()
}

/// Parses an ID argument that must be of `kind`
pub fn id_arg(value: &str, kind: EntityKind) -> Result<EntityId> {
    Ok(EntityId::parse_kind(value, kind)?)
}

pub fn id_args(values: &[String], kind: EntityKind) -> Result<Vec<EntityId>> {
    values.iter().map(|v| id_arg(v, kind)).collect()
}

pub fn name_arg(value: &str) -> Result<String> {
    let name = value.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty("Name").into());
    }
    Ok(name.to_string())
}

pub fn hours_arg(hours: f64) -> Result<f64> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ValidationError::NegativeHours(hours).into());
    }
    Ok(hours)
}
