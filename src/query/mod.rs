pub mod predicate;
pub mod sort;

pub use predicate::{build, Condition, Field, Predicate, Value};
pub use sort::{resolve, resolve_sort, Direction, OrderTerm};
