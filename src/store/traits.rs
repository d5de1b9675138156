use crate::error::Result;
use crate::facets::SortKey;
use crate::models::ListingSummary;
use crate::query::Predicate;
use async_trait::async_trait;
use super::types::Page;

/// Query capability of the external listings data service.
/// Implementations own the transport; callers only hand over the predicate,
/// sort and page.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Number of listings matching the predicate
    async fn count(&self, predicate: &Predicate) -> Result<u64>;

    /// One page of matching listings in the given order
    async fn fetch(
        &self,
        predicate: &Predicate,
        sort: SortKey,
        page: Page,
    ) -> Result<Vec<ListingSummary>>;

    /// Get the name of the backend
    fn backend_name(&self) -> &'static str;
}
