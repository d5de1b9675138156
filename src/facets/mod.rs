pub mod codec;
pub mod draft;
pub mod types;

pub use codec::{apply_query, decode, decode_strict, encode, reset_query, select_sort, select_tab};
pub use draft::FacetDraft;
pub use types::{Baths, Beds, FacetSet, Feed, Pet, PropertyType, SortKey, Tab};
