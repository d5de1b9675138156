use crate::facets::{FacetSet, SortKey, Tab};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// One `ORDER BY` term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    pub column: &'static str,
    pub direction: Direction,
    pub nulls_last: bool,
}

impl OrderTerm {
    const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Desc,
            nulls_last: false,
        }
    }

    const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Asc,
            nulls_last: false,
        }
    }

    const fn nulls_last(self) -> Self {
        Self {
            nulls_last: true,
            ..self
        }
    }
}

static NEWEST: [OrderTerm; 1] = [OrderTerm::desc("created_at")];
static PRICE_ASC: [OrderTerm; 1] = [OrderTerm::asc("price")];
static PRICE_DESC: [OrderTerm; 1] = [OrderTerm::desc("price")];
static FEATURED_FIRST: [OrderTerm; 2] = [
    OrderTerm::desc("is_featured"),
    OrderTerm::desc("created_at"),
];
static AREA_SQM_FIRST: [OrderTerm; 2] = [
    OrderTerm::desc("area_sqm").nulls_last(),
    OrderTerm::desc("created_at"),
];

impl SortKey {
    /// Backend ordering for this sort key
    pub fn order_by(self) -> &'static [OrderTerm] {
        match self {
            SortKey::Newest => &NEWEST,
            SortKey::PriceAsc => &PRICE_ASC,
            SortKey::PriceDesc => &PRICE_DESC,
            SortKey::FeaturedFirst => &FEATURED_FIRST,
            SortKey::AreaSqmFirst => &AREA_SQM_FIRST,
        }
    }
}

/// Canned tabs override any explicit sort; current-search honours it.
pub fn resolve_sort(tab: Tab, explicit: Option<SortKey>) -> SortKey {
    match tab {
        Tab::Newest => SortKey::Newest,
        Tab::Popular => SortKey::PriceDesc,
        Tab::CurrentSearch => explicit.unwrap_or_default(),
    }
}

pub fn resolve(facets: &FacetSet) -> SortKey {
    resolve_sort(facets.tab, facets.sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::{decode, select_sort, select_tab};

    #[test]
    fn test_tabs_force_their_sort() {
        for explicit in [None, Some(SortKey::PriceAsc), Some(SortKey::FeaturedFirst)] {
            assert_eq!(resolve_sort(Tab::Newest, explicit), SortKey::Newest);
            assert_eq!(resolve_sort(Tab::Popular, explicit), SortKey::PriceDesc);
        }
    }

    #[test]
    fn test_current_search_uses_explicit_or_default() {
        assert_eq!(resolve_sort(Tab::CurrentSearch, None), SortKey::Newest);
        assert_eq!(
            resolve_sort(Tab::CurrentSearch, Some(SortKey::AreaSqmFirst)),
            SortKey::AreaSqmFirst
        );
    }

    #[test]
    fn test_tab_then_sort_control() {
        let query = select_tab("sort=price_asc", Tab::Newest);
        assert_eq!(resolve(&decode(&query)), SortKey::Newest);

        let query = select_sort(&query, SortKey::PriceAsc);
        let facets = decode(&query);
        assert_eq!(facets.tab, Tab::CurrentSearch);
        assert_eq!(resolve(&facets), SortKey::PriceAsc);
    }

    #[test]
    fn test_order_terms() {
        assert_eq!(SortKey::Newest.order_by(), &[OrderTerm::desc("created_at")]);
        let area = SortKey::AreaSqmFirst.order_by();
        assert_eq!(area[0].column, "area_sqm");
        assert!(area[0].nulls_last);
        assert_eq!(area[1].column, "created_at");
    }
}
