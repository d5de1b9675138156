//! Faceted listing search for the rentals discover feed: URL facet codec,
//! filter predicate builder, sort/tab resolution, display labels and a
//! debounced count client over a pluggable listing store.

pub mod config;
pub mod count;
pub mod error;
pub mod facets;
pub mod format;
pub mod models;
pub mod query;
pub mod store;

pub use config::Config;
pub use count::{CountClient, CountState, CountSubscription};
pub use error::{Error, Result};
pub use facets::{FacetDraft, FacetSet};
pub use query::Predicate;
pub use store::ListingStore;
