pub mod memory;
pub mod postgrest;
pub mod traits;
pub mod types;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use traits::ListingStore;
pub use types::Page;
