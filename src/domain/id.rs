//! Sequential ID system for pieces, yarns and stitches
//!
//! ID Format: `{KIND}-{number}` zero-padded to three digits
//! (e.g., `PIECE-001`, `YARN-042`, `STITCH-1000`).
//!
//! Numbers are assigned once, never reused: the next ID of a kind is one
//! past the highest number ever handed out, archived records included.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid ID format: expected 'PIECE-NNN', 'YARN-NNN' or 'STITCH-NNN', got '{0}'")]
    Invalid(String),

    #[error("Expected a {expected} ID, got '{got}'")]
    WrongKind { expected: EntityKind, got: String },

    #[error("No {0} IDs left to assign")]
    Exhausted(EntityKind),
}

/// The three kinds of records kept in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Piece,
    Yarn,
    Stitch,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Piece, EntityKind::Yarn, EntityKind::Stitch];

    /// ID prefix without the dash
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Piece => "PIECE",
            EntityKind::Yarn => "YARN",
            EntityKind::Stitch => "STITCH",
        }
    }

    /// Plural name, used for collection keys and photo folders
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Piece => "pieces",
            EntityKind::Yarn => "yarns",
            EntityKind::Stitch => "stitches",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Piece => "piece",
            EntityKind::Yarn => "yarn",
            EntityKind::Stitch => "stitch",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record ID in the format `KIND-NNN`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    kind: EntityKind,
    number: u32,
}

impl EntityId {
    pub fn new(kind: EntityKind, number: u32) -> Self {
        Self { kind, number }
    }

    pub fn piece(number: u32) -> Self {
        Self::new(EntityKind::Piece, number)
    }

    pub fn yarn(number: u32) -> Self {
        Self::new(EntityKind::Yarn, number)
    }

    pub fn stitch(number: u32) -> Self {
        Self::new(EntityKind::Stitch, number)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Returns the next free ID of `kind`, one past the highest existing number
    pub fn next_after<'a>(
        kind: EntityKind,
        existing: impl IntoIterator<Item = &'a EntityId>,
    ) -> Result<Self, IdError> {
        let max = existing
            .into_iter()
            .filter(|id| id.kind == kind)
            .map(|id| id.number)
            .max()
            .unwrap_or(0);

        max.checked_add(1)
            .map(|number| Self::new(kind, number))
            .ok_or(IdError::Exhausted(kind))
    }

    /// Parses an ID and checks that it is of the expected kind
    pub fn parse_kind(s: &str, expected: EntityKind) -> Result<Self, IdError> {
        let id: EntityId = s.parse()?;
        if id.kind != expected {
            return Err(IdError::WrongKind {
                expected,
                got: s.trim().to_string(),
            });
        }
        Ok(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.kind.prefix(), self.number)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, digits) = s
            .split_once('-')
            .ok_or_else(|| IdError::Invalid(s.to_string()))?;

        let kind = EntityKind::ALL
            .into_iter()
            .find(|k| k.prefix().eq_ignore_ascii_case(prefix))
            .ok_or_else(|| IdError::Invalid(s.to_string()))?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::Invalid(s.to_string()));
        }

        let number: u32 = digits
            .parse()
            .map_err(|_| IdError::Invalid(s.to_string()))?;
        if number == 0 {
            return Err(IdError::Invalid(s.to_string()));
        }

        Ok(Self { kind, number })
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_format_is_zero_padded() {
        assert_eq!(EntityId::piece(1).to_string(), "PIECE-001");
        assert_eq!(EntityId::yarn(42).to_string(), "YARN-042");
        assert_eq!(EntityId::stitch(1234).to_string(), "STITCH-1234");
    }

    #[test]
    fn id_parses_correctly() {
        let id: EntityId = "PIECE-007".parse().unwrap();
        assert_eq!(id.kind(), EntityKind::Piece);
        assert_eq!(id.number(), 7);

        let id: EntityId = " yarn-12 ".parse().unwrap();
        assert_eq!(id, EntityId::yarn(12));
    }

    #[test]
    fn id_rejects_invalid_format() {
        assert!("invalid".parse::<EntityId>().is_err());
        assert!("PIECE-".parse::<EntityId>().is_err());
        assert!("PIECE-abc".parse::<EntityId>().is_err());
        assert!("PIECE-000".parse::<EntityId>().is_err());
        assert!("HOOK-001".parse::<EntityId>().is_err());
        assert!("PIECE--1".parse::<EntityId>().is_err());
    }

    #[test]
    fn parse_kind_rejects_other_kinds() {
        assert!(EntityId::parse_kind("YARN-001", EntityKind::Yarn).is_ok());

        let err = EntityId::parse_kind("YARN-001", EntityKind::Piece).unwrap_err();
        assert!(matches!(err, IdError::WrongKind { expected: EntityKind::Piece, .. }));
    }

    #[test]
    fn next_after_skips_to_highest_number_of_kind() {
        let ids = vec![
            EntityId::piece(1),
            EntityId::piece(7),
            EntityId::yarn(30),
            EntityId::piece(3),
        ];

        assert_eq!(EntityId::next_after(EntityKind::Piece, &ids), Ok(EntityId::piece(8)));
        assert_eq!(EntityId::next_after(EntityKind::Yarn, &ids), Ok(EntityId::yarn(31)));
        assert_eq!(EntityId::next_after(EntityKind::Stitch, &ids), Ok(EntityId::stitch(1)));
    }

    #[test]
    fn next_after_reports_exhausted_numbers() {
        let ids = vec![EntityId::yarn(u32::MAX)];

        assert_eq!(
            EntityId::next_after(EntityKind::Yarn, &ids),
            Err(IdError::Exhausted(EntityKind::Yarn))
        );
    }

    #[test]
    fn id_serializes_as_string() {
        let id = EntityId::stitch(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"STITCH-005\"");

        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_order_by_kind_then_number() {
        let mut ids = vec![EntityId::piece(10), EntityId::piece(2), EntityId::piece(9)];
        ids.sort();
        assert_eq!(ids, vec![EntityId::piece(2), EntityId::piece(9), EntityId::piece(10)]);
    }
}
