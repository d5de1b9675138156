//! Facet set → backend-agnostic filter predicate.
//!
//! The predicate is a flat conjunction of field constraints. Store
//! implementations translate it into their own query language; sorting is
//! not part of it (see [`super::sort`]).

use crate::facets::{Beds, FacetSet, Feed};
use crate::models::ListingStatus;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Status,
    IsUniHub,
    Area,
    PropertyType,
    Price,
    Beds,
    Baths,
    PetsAllowed,
    Amenities,
    EwaIncluded,
}

impl Field {
    /// Column name in the listings table
    pub fn column(self) -> &'static str {
        match self {
            Field::Status => "status",
            Field::IsUniHub => "is_uni_hub",
            Field::Area => "area",
            Field::PropertyType => "property_type",
            Field::Price => "price",
            Field::Beds => "beds",
            Field::Baths => "baths",
            Field::PetsAllowed => "pets_allowed",
            Field::Amenities => "amenities",
            Field::EwaIncluded => "ewa_included",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Eq { field: Field, value: Value },
    Gte { field: Field, value: Value },
    Lte { field: Field, value: Value },
    /// Field equals one of the values
    In { field: Field, values: Vec<String> },
    /// Field equals one of the values, ignoring ASCII case
    InIgnoreCase { field: Field, values: Vec<String> },
    /// Array field holds every one of the values
    ContainsAll { field: Field, values: Vec<String> },
}

impl Condition {
    pub fn field(&self) -> Field {
        match self {
            Condition::Eq { field, .. }
            | Condition::Gte { field, .. }
            | Condition::Lte { field, .. }
            | Condition::In { field, .. }
            | Condition::InIgnoreCase { field, .. }
            | Condition::ContainsAll { field, .. } => *field,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq { field, value } => write!(f, "{} = {}", field.column(), value),
            Condition::Gte { field, value } => write!(f, "{} >= {}", field.column(), value),
            Condition::Lte { field, value } => write!(f, "{} <= {}", field.column(), value),
            Condition::In { field, values } => {
                write!(f, "{} in ({})", field.column(), values.join(", "))
            }
            Condition::InIgnoreCase { field, values } => {
                write!(f, "lower({}) in ({})", field.column(), values.join(", "))
            }
            Condition::ContainsAll { field, values } => {
                write!(f, "{} contains ({})", field.column(), values.join(", "))
            }
        }
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Predicate {
    pub all: Vec<Condition>,
}

impl Predicate {
    pub fn conditions(&self) -> &[Condition] {
        &self.all
    }

    pub fn on(&self, field: Field) -> impl Iterator<Item = &Condition> {
        self.all.iter().filter(move |c| c.field() == field)
    }

    fn push(&mut self, condition: Condition) {
        self.all.push(condition);
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.all.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// Build the filter predicate for a facet set.
///
/// Bounds that do not fit the backend's integer type are skipped rather than
/// rejected, so a bad value widens the result set instead of emptying it.
pub fn build(facets: &FacetSet) -> Predicate {
    let mut predicate = Predicate::default();

    predicate.push(Condition::Eq {
        field: Field::Status,
        value: Value::Text(ListingStatus::Approved.as_str().to_string()),
    });
    predicate.push(Condition::Eq {
        field: Field::IsUniHub,
        value: Value::Bool(facets.feed == Feed::UniHub),
    });

    if !facets.areas.is_empty() {
        predicate.push(Condition::InIgnoreCase {
            field: Field::Area,
            values: facets.areas.clone(),
        });
    }

    if !facets.property_types.is_empty() {
        predicate.push(Condition::In {
            field: Field::PropertyType,
            values: facets
                .property_types
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        });
    }

    if let Some(min) = facets.price_min.and_then(|v| i64::try_from(v).ok()) {
        predicate.push(Condition::Gte {
            field: Field::Price,
            value: Value::Int(min),
        });
    }
    if let Some(max) = facets.price_max.and_then(|v| i64::try_from(v).ok()) {
        predicate.push(Condition::Lte {
            field: Field::Price,
            value: Value::Int(max),
        });
    }

    if let Some(beds) = facets.beds {
        let value = Value::Int(i64::from(beds.count()));
        let field = Field::Beds;
        predicate.push(match beds {
            Beds::Studio => Condition::Eq { field, value },
            Beds::FourPlus => Condition::Gte { field, value },
            _ if facets.beds_exact => Condition::Eq { field, value },
            _ => Condition::Gte { field, value },
        });
    }

    if let Some(baths) = facets.baths {
        let value = Value::Float(baths.value());
        let field = Field::Baths;
        predicate.push(if facets.baths_exact {
            Condition::Eq { field, value }
        } else {
            Condition::Gte { field, value }
        });
    }

    if !facets.pets.is_empty() {
        predicate.push(Condition::ContainsAll {
            field: Field::PetsAllowed,
            values: facets.pets.iter().map(|p| p.as_str().to_string()).collect(),
        });
    }
    if !facets.amenities.is_empty() {
        predicate.push(Condition::ContainsAll {
            field: Field::Amenities,
            values: facets.amenities.clone(),
        });
    }
    if facets.ewa_included {
        predicate.push(Condition::Eq {
            field: Field::EwaIncluded,
            value: Value::Bool(true),
        });
    }

    predicate
}
