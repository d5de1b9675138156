use super::traits::ListingStore;
use super::types::Page;
use crate::error::Result;
use crate::facets::SortKey;
use crate::models::ListingSummary;
use crate::query::{Condition, Direction, Field, OrderTerm, Predicate, Value};
use async_trait::async_trait;
use std::cmp::Ordering;
use tracing::debug;

/// Listing store over an in-process vector. Evaluates predicates the way the
/// hosted database would; used for fixtures, offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    listings: Vec<ListingSummary>,
}

impl MemoryStore {
    pub fn new(listings: Vec<ListingSummary>) -> Self {
        Self { listings }
    }

    /// Load listings from a JSON array, the same shape the REST backend returns.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    fn matching<'a>(
        &'a self,
        predicate: &'a Predicate,
    ) -> impl Iterator<Item = &'a ListingSummary> {
        self.listings.iter().filter(move |l| matches(predicate, l))
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let count = self.matching(predicate).count() as u64;
        debug!("memory count: {} of {}", count, self.listings.len());
        Ok(count)
    }

    async fn fetch(
        &self,
        predicate: &Predicate,
        sort: SortKey,
        page: Page,
    ) -> Result<Vec<ListingSummary>> {
        let mut rows: Vec<&ListingSummary> = self.matching(predicate).collect();
        let order = sort.order_by();
        rows.sort_by(|a, b| compare(order, a, b));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

enum FieldValue<'a> {
    Bool(bool),
    Number(f64),
    Text(Option<&'a str>),
    List(&'a [String]),
}

fn field_value(listing: &ListingSummary, field: Field) -> FieldValue<'_> {
    match field {
        Field::Status => FieldValue::Text(Some(listing.status.as_str())),
        Field::IsUniHub => FieldValue::Bool(listing.is_uni_hub),
        Field::Area => FieldValue::Text(listing.location.area.as_deref()),
        Field::PropertyType => FieldValue::Text(listing.property_type.map(|t| t.as_str())),
        Field::Price => FieldValue::Number(listing.price as f64),
        Field::Beds => FieldValue::Number(f64::from(listing.beds)),
        Field::Baths => FieldValue::Number(listing.baths),
        Field::PetsAllowed => FieldValue::List(&listing.pets_allowed),
        Field::Amenities => FieldValue::List(&listing.amenities),
        Field::EwaIncluded => FieldValue::Bool(listing.ewa_included),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

/// Whether a listing satisfies every condition of the predicate.
pub fn matches(predicate: &Predicate, listing: &ListingSummary) -> bool {
    predicate.all.iter().all(|c| satisfies(c, listing))
}

fn satisfies(condition: &Condition, listing: &ListingSummary) -> bool {
    let actual = field_value(listing, condition.field());
    match (condition, actual) {
        (Condition::Eq { value, .. }, FieldValue::Bool(b)) => *value == Value::Bool(b),
        (Condition::Eq { value, .. }, FieldValue::Number(n)) => as_number(value) == Some(n),
        (Condition::Eq { value: Value::Text(want), .. }, FieldValue::Text(got)) => {
            got == Some(want.as_str())
        }
        (Condition::Gte { value, .. }, FieldValue::Number(n)) => {
            as_number(value).is_some_and(|bound| n >= bound)
        }
        (Condition::Lte { value, .. }, FieldValue::Number(n)) => {
            as_number(value).is_some_and(|bound| n <= bound)
        }
        (Condition::In { values, .. }, FieldValue::Text(Some(got))) => {
            values.iter().any(|v| v == got)
        }
        (Condition::InIgnoreCase { values, .. }, FieldValue::Text(Some(got))) => {
            values.iter().any(|v| v.to_lowercase() == got.to_lowercase())
        }
        (Condition::ContainsAll { values, .. }, FieldValue::List(have)) => {
            values.iter().all(|v| have.contains(v))
        }
        // Type mismatch or NULL column: no match, as in SQL.
        _ => false,
    }
}

fn compare(order: &[OrderTerm], a: &ListingSummary, b: &ListingSummary) -> Ordering {
    for term in order {
        let ordering = compare_column(term, a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.id.cmp(&b.id)
}

fn compare_column(term: &OrderTerm, a: &ListingSummary, b: &ListingSummary) -> Ordering {
    let directed = |ord: Ordering| match term.direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    };

    match term.column {
        "created_at" => directed(a.created_at.cmp(&b.created_at)),
        "price" => directed(a.price.cmp(&b.price)),
        "is_featured" => directed(a.is_featured.cmp(&b.is_featured)),
        "area_sqm" => match (a.area_sqm, b.area_sqm) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (None, None) => Ordering::Equal,
            (None, Some(_)) if term.nulls_last => Ordering::Greater,
            (Some(_), None) if term.nulls_last => Ordering::Less,
            (x, y) => directed(x.cmp(&y)),
        },
        _ => Ordering::Equal,
    }
}
