//! Product catalog entity

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Stable product identifier. Matching is exact and case-sensitive.
pub type ProductId = String;

/// Product size as found in persisted catalog data.
///
/// Catalog files mix plain sizes (`37`, `7.5`, `"M"`) with width/height
/// records (`{"h": 30, "w": 28}`). Each shape is kept as its own variant and
/// written back in the shape it was read. Numbers keep their JSON
/// representation, so integers stay integers and fractions stay fractions.
/// Any other JSON value lands in [`Size::Other`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Size {
    /// Height/width pair, e.g. trouser inseam and waist.
    Dimensions { h: Number, w: Number },
    /// A single numeric size.
    Scalar(Number),
    /// A free-form size label.
    Label(String),
    /// No size recorded (`null` or absent).
    #[default]
    Unspecified,
    /// Any other JSON shape, kept verbatim.
    Other(Value),
}

impl Size {
    pub fn dimensions(h: impl Into<Number>, w: impl Into<Number>) -> Self {
        Self::Dimensions {
            h: h.into(),
            w: w.into(),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }
}

impl From<i64> for Size {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for Size {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

/// Non-finite values have no JSON form and become [`Size::Unspecified`].
impl From<f64> for Size {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Unspecified, Self::Scalar)
    }
}

impl From<&str> for Size {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for Size {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimensions { h, w } => write!(f, "{}x{}", h, w),
            Self::Scalar(n) => write!(f, "{}", n),
            Self::Label(s) => f.write_str(s),
            Self::Unspecified => Ok(()),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Text attributes may be missing or `null` in catalog files; both read as "".
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Product - one catalog item.
///
/// Identity is by `id` alone. Two products sharing an id with different
/// attributes are two versions of the same item, not duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    #[serde(default, skip_serializing_if = "Size::is_unspecified")]
    pub size: Size,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        size: impl Into<Size>,
        name: impl Into<String>,
        color: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            size: size.into(),
            name: name.into(),
            color: color.into(),
            category: category.into(),
        }
    }

    /// The product identifier. Fixed at construction.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when both values describe the same catalog item.
    pub fn same_identity(&self, other: &Product) -> bool {
        self.id == other.id
    }

    pub fn with_size(mut self, size: impl Into<Size>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}
