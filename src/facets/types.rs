use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Top-level partition of the listing catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feed {
    #[default]
    Rentals,
    UniHub,
}

impl Feed {
    pub fn as_str(self) -> &'static str {
        match self {
            Feed::Rentals => "rentals",
            Feed::UniHub => "uni-hub",
        }
    }

    /// Anything other than `uni-hub` is the rentals feed.
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "uni-hub" => Feed::UniHub,
            _ => Feed::Rentals,
        }
    }
}

/// Canned view preset shown in the tab bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Newest,
    #[default]
    CurrentSearch,
    Popular,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Newest, Tab::CurrentSearch, Tab::Popular];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Newest => "newest",
            Tab::CurrentSearch => "current-search",
            Tab::Popular => "popular",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.as_str() == value.trim())
    }
}

/// Explicit ordering of the listing feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    FeaturedFirst,
    AreaSqmFirst,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Newest,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::FeaturedFirst,
        SortKey::AreaSqmFirst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::FeaturedFirst => "featured_first",
            SortKey::AreaSqmFirst => "area_sqm_first",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Studio,
    Apartment,
    Villa,
    Home,
    Compound,
    Penthouse,
    Shared,
}

impl PropertyType {
    pub const ALL: [PropertyType; 7] = [
        PropertyType::Studio,
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Home,
        PropertyType::Compound,
        PropertyType::Penthouse,
        PropertyType::Shared,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Studio => "studio",
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Home => "home",
            PropertyType::Compound => "compound",
            PropertyType::Penthouse => "penthouse",
            PropertyType::Shared => "shared",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pet {
    Cats,
    Dogs,
    SmallPets,
}

impl Pet {
    pub const ALL: [Pet; 3] = [Pet::Cats, Pet::Dogs, Pet::SmallPets];

    pub fn as_str(self) -> &'static str {
        match self {
            Pet::Cats => "cats",
            Pet::Dogs => "dogs",
            Pet::SmallPets => "small_pets",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|pet| pet.as_str() == value)
    }
}

/// Bedroom facet. Studio is a real filter value (zero bedrooms),
/// distinct from "no constraint" which is `None` on the facet set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Beds {
    Studio,
    One,
    Two,
    Three,
    FourPlus,
}

impl Beds {
    pub fn count(self) -> u32 {
        match self {
            Beds::Studio => 0,
            Beds::One => 1,
            Beds::Two => 2,
            Beds::Three => 3,
            Beds::FourPlus => 4,
        }
    }

    /// Canonical wire form: studio is always `0`.
    pub fn as_param(self) -> &'static str {
        match self {
            Beds::Studio => "0",
            Beds::One => "1",
            Beds::Two => "2",
            Beds::Three => "3",
            Beds::FourPlus => "4+",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "studio" => Some(Beds::Studio),
            "1" => Some(Beds::One),
            "2" => Some(Beds::Two),
            "3" => Some(Beds::Three),
            "4" | "4+" => Some(Beds::FourPlus),
            _ => None,
        }
    }
}

/// Bathroom facet in half steps from 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Baths(u8);

impl Baths {
    const MIN_HALVES: u8 = 2;
    const MAX_HALVES: u8 = 8;

    pub fn from_halves(halves: u8) -> Option<Self> {
        (Self::MIN_HALVES..=Self::MAX_HALVES)
            .contains(&halves)
            .then_some(Baths(halves))
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    pub fn from_param(value: &str) -> Option<Self> {
        let parsed: f64 = value.trim().parse().ok()?;
        if !parsed.is_finite() {
            return None;
        }
        let halves = parsed * 2.0;
        if halves.fract() != 0.0 || halves < 0.0 || halves > f64::from(u8::MAX) {
            return None;
        }
        Self::from_halves(halves as u8)
    }

    pub fn as_param(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Baths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

/// Everything the user is filtering the discover feed by
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSet {
    pub feed: Feed,
    /// Location names, case preserved
    pub areas: Vec<String>,
    pub property_types: Vec<PropertyType>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub beds: Option<Beds>,
    /// Equality instead of at-least; ignored when `beds` is unset
    pub beds_exact: bool,
    pub baths: Option<Baths>,
    /// Equality instead of at-least; ignored when `baths` is unset
    pub baths_exact: bool,
    pub pets: Vec<Pet>,
    pub amenities: Vec<String>,
    /// Utilities (electricity & water) included in rent
    pub ewa_included: bool,
    pub tab: Tab,
    /// Explicit sort override; `None` means the default ordering
    pub sort: Option<SortKey>,
}

impl FacetSet {
    pub fn for_feed(feed: Feed) -> Self {
        Self {
            feed,
            ..Self::default()
        }
    }

    /// True when no filtering facet is set. Feed, tab and sort are not filters.
    pub fn is_unfiltered(&self) -> bool {
        self.areas.is_empty()
            && self.property_types.is_empty()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.beds.is_none()
            && self.baths.is_none()
            && self.pets.is_empty()
            && self.amenities.is_empty()
            && !self.ewa_included
    }

    /// Equality that ignores list ordering and exact flags on unset facets.
    pub fn equivalent(&self, other: &FacetSet) -> bool {
        fn same_members<T: Eq + std::hash::Hash>(a: &[T], b: &[T]) -> bool {
            a.iter().collect::<HashSet<_>>() == b.iter().collect::<HashSet<_>>()
        }

        self.feed == other.feed
            && same_members(&self.areas, &other.areas)
            && same_members(&self.property_types, &other.property_types)
            && self.price_min == other.price_min
            && self.price_max == other.price_max
            && self.beds == other.beds
            && (self.beds.is_none() || self.beds_exact == other.beds_exact)
            && self.baths == other.baths
            && (self.baths.is_none() || self.baths_exact == other.baths_exact)
            && same_members(&self.pets, &other.pets)
            && same_members(&self.amenities, &other.amenities)
            && self.ewa_included == other.ewa_included
            && self.tab == other.tab
            && self.sort == other.sort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_normalizes_unknown_values() {
        assert_eq!(Feed::from_param("uni-hub"), Feed::UniHub);
        assert_eq!(Feed::from_param("rentals"), Feed::Rentals);
        assert_eq!(Feed::from_param("commercial"), Feed::Rentals);
        assert_eq!(Feed::from_param(""), Feed::Rentals);
    }

    #[test]
    fn test_beds_studio_synonyms() {
        assert_eq!(Beds::from_param("studio"), Some(Beds::Studio));
        assert_eq!(Beds::from_param("0"), Some(Beds::Studio));
        assert_eq!(Beds::Studio.as_param(), "0");
        assert_eq!(Beds::from_param("4"), Some(Beds::FourPlus));
        assert_eq!(Beds::FourPlus.as_param(), "4+");
        assert_eq!(Beds::from_param("7"), None);
        assert_eq!(Beds::from_param(""), None);
    }

    #[test]
    fn test_baths_half_steps() {
        assert_eq!(Baths::from_param("1.5").map(Baths::value), Some(1.5));
        assert_eq!(Baths::from_param("4").map(|b| b.to_string()), Some("4".to_string()));
        assert_eq!(Baths::from_param("2.5").map(|b| b.as_param()), Some("2.5".to_string()));
        assert_eq!(Baths::from_param("0.5"), None);
        assert_eq!(Baths::from_param("4.5"), None);
        assert_eq!(Baths::from_param("1.25"), None);
        assert_eq!(Baths::from_param("NaN"), None);
        assert_eq!(Baths::from_param("many"), None);
    }

    #[test]
    fn test_property_type_is_case_insensitive() {
        assert_eq!(PropertyType::from_param("Villa"), Some(PropertyType::Villa));
        assert_eq!(PropertyType::from_param("castle"), None);
    }

    #[test]
    fn test_equivalent_ignores_order_and_dangling_exact_flag() {
        let a = FacetSet {
            areas: vec!["Juffair".into(), "Manama".into()],
            property_types: vec![PropertyType::Villa, PropertyType::Apartment],
            beds_exact: true,
            ..FacetSet::default()
        };
        let b = FacetSet {
            areas: vec!["Manama".into(), "Juffair".into()],
            property_types: vec![PropertyType::Apartment, PropertyType::Villa],
            ..FacetSet::default()
        };
        assert!(a.equivalent(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unfiltered_ignores_presentation_fields() {
        let facets = FacetSet {
            feed: Feed::UniHub,
            tab: Tab::Popular,
            sort: Some(SortKey::PriceAsc),
            ..FacetSet::default()
        };
        assert!(facets.is_unfiltered());
        assert!(!FacetSet {
            ewa_included: true,
            ..FacetSet::default()
        }
        .is_unfiltered());
    }
}
