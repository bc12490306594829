//! Stitch library model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{EntityId, EntityKind};
use super::piece::ValidationError;
use super::record::{Lifecycle, Record};

/// Difficulty class of a stitch, keyed into the complexity table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StitchCategory {
    #[default]
    Basic,
    Textured,
    Lace,
    Colorwork,
    Specialty,
}

impl StitchCategory {
    pub const ALL: [StitchCategory; 5] = [
        StitchCategory::Basic,
        StitchCategory::Textured,
        StitchCategory::Lace,
        StitchCategory::Colorwork,
        StitchCategory::Specialty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StitchCategory::Basic => "basic",
            StitchCategory::Textured => "textured",
            StitchCategory::Lace => "lace",
            StitchCategory::Colorwork => "colorwork",
            StitchCategory::Specialty => "specialty",
        }
    }

    /// Lenient lookup: unknown names fall back to basic
    pub fn from_name(name: &str) -> Self {
        let needle = name.trim().to_lowercase();
        StitchCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .unwrap_or_default()
    }
}

impl fmt::Display for StitchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user input, unlike [`StitchCategory::from_name`]
impl FromStr for StitchCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        StitchCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "stitch category",
                value: s.to_string(),
            })
    }
}

/// A crochet stitch or technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stitch {
    pub id: EntityId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,

    /// Kept as written; see [`Stitch::category`]
    #[serde(default, rename = "category", skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_link: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Stitch {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            abbreviation: None,
            category_name: None,
            description: String::new(),
            instruction_link: None,
            photos: Vec::new(),
            notes: None,
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn with_category(mut self, category: StitchCategory) -> Self {
        self.category_name = Some(category.as_str().to_string());
        self
    }

    /// Effective category; absent or unrecognized means basic
    pub fn category(&self) -> StitchCategory {
        self.category_name
            .as_deref()
            .map(StitchCategory::from_name)
            .unwrap_or_default()
    }
}

impl Record for Stitch {
    const KIND: EntityKind = EntityKind::Stitch;

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
