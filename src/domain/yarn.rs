//! Yarn inventory model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{EntityId, EntityKind};
use super::piece::ValidationError;
use super::record::{Lifecycle, Record};

/// Primary fibre of a yarn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Cotton,
    Wool,
    Acrylic,
    Silk,
    #[default]
    Blend,
    Other,
}

impl Material {
    pub const ALL: [Material; 6] = [
        Material::Cotton,
        Material::Wool,
        Material::Acrylic,
        Material::Silk,
        Material::Blend,
        Material::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Cotton => "cotton",
            Material::Wool => "wool",
            Material::Acrylic => "acrylic",
            Material::Silk => "silk",
            Material::Blend => "blend",
            Material::Other => "other",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Material::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "material",
                value: s.to_string(),
            })
    }
}

fn default_quantity() -> u32 {
    1
}

/// A yarn in the stash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yarn {
    pub id: EntityId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub material: Material,

    /// Free-form weight class (lace, dk, worsted, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_category: Option<String>,

    /// Price of one ball
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_paid: Option<Decimal>,

    #[serde(default = "default_quantity")]
    pub quantity_owned: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,

    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Yarn {
    pub fn new(id: EntityId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            brand: None,
            color: color.into(),
            material: Material::default(),
            weight_category: None,
            price_paid: None,
            quantity_owned: default_quantity(),
            purchase_date: None,
            photos: Vec::new(),
            notes: None,
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price_paid = Some(price);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

impl Record for Yarn {
    const KIND: EntityKind = EntityKind::Yarn;

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
