//! Query-string codec for the discover feed facets.
//!
//! The URL is the only place facet state lives between navigations, so every
//! surface decodes from it and writes back through [`encode`]. Keys this module
//! does not recognize (pagination, map viewport, ...) pass through untouched.

use super::types::{Baths, Beds, FacetSet, Feed, Pet, PropertyType, SortKey, Tab};
use crate::error::{Error, Result};
use url::form_urlencoded;

pub mod keys {
    pub const FEED: &str = "feed";
    pub const TAB: &str = "tab";
    pub const SORT: &str = "sort";
    pub const AREA: &str = "area";
    pub const TYPE: &str = "type";
    pub const PRICE_MIN: &str = "price_min";
    pub const PRICE_MAX: &str = "price_max";
    pub const BEDS: &str = "beds";
    pub const BATHS: &str = "baths";
    pub const BEDS_ONLY: &str = "beds_only";
    pub const BATHS_ONLY: &str = "baths_only";
    pub const PETS: &str = "pets";
    pub const AMENITIES: &str = "amenities";
    pub const EWA: &str = "ewa";

    pub const RECOGNIZED: [&str; 14] = [
        FEED, TAB, SORT, AREA, TYPE, PRICE_MIN, PRICE_MAX, BEDS, BATHS, BEDS_ONLY, BATHS_ONLY,
        PETS, AMENITIES, EWA,
    ];

    pub fn is_recognized(key: &str) -> bool {
        RECOGNIZED.contains(&key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Lenient,
    Strict,
}

/// Decode a query string into a facet set. Malformed values are treated as
/// absent (or the default for `feed`/`tab`); this never fails.
pub fn decode(query: &str) -> FacetSet {
    match decode_with(query, Mode::Lenient) {
        Ok(facets) => facets,
        // Lenient mode has no error paths.
        Err(_) => FacetSet::default(),
    }
}

/// Decode a query string, rejecting malformed numbers and unknown enum values.
/// Use this when the query string does not come from the app's own controls.
pub fn decode_strict(query: &str) -> Result<FacetSet> {
    decode_with(query, Mode::Strict)
}

/// Encode `facets` on top of `base`, replacing every recognized key and keeping
/// the rest in their original order.
pub fn encode(facets: &FacetSet, base: &str) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    for (key, value) in pairs(base) {
        if !keys::is_recognized(&key) {
            out.append_pair(&key, &value);
        }
    }

    out.append_pair(keys::FEED, facets.feed.as_str());
    out.append_pair(keys::TAB, facets.tab.as_str());
    if let Some(sort) = facets.sort {
        out.append_pair(keys::SORT, sort.as_str());
    }
    if !facets.areas.is_empty() {
        out.append_pair(keys::AREA, &facets.areas.join(","));
    }
    if !facets.property_types.is_empty() {
        out.append_pair(keys::TYPE, &join_tags(&facets.property_types, |t| t.as_str()));
    }
    if let Some(min) = facets.price_min {
        out.append_pair(keys::PRICE_MIN, &min.to_string());
    }
    if let Some(max) = facets.price_max {
        out.append_pair(keys::PRICE_MAX, &max.to_string());
    }
    if let Some(beds) = facets.beds {
        out.append_pair(keys::BEDS, beds.as_param());
        if facets.beds_exact {
            out.append_pair(keys::BEDS_ONLY, "true");
        }
    }
    if let Some(baths) = facets.baths {
        out.append_pair(keys::BATHS, &baths.as_param());
        if facets.baths_exact {
            out.append_pair(keys::BATHS_ONLY, "true");
        }
    }
    if !facets.pets.is_empty() {
        out.append_pair(keys::PETS, &join_tags(&facets.pets, |p| p.as_str()));
    }
    if !facets.amenities.is_empty() {
        out.append_pair(keys::AMENITIES, &facets.amenities.join(","));
    }
    if facets.ewa_included {
        out.append_pair(keys::EWA, "true");
    }

    out.finish()
}

/// Encode an edited facet set. Applying an edit always lands on the
/// current-search tab.
pub fn apply_query(facets: &FacetSet, base: &str) -> String {
    let applied = FacetSet {
        tab: Tab::CurrentSearch,
        ..facets.clone()
    };
    encode(&applied, base)
}

/// Clear every recognized facet except `feed`, forcing the current-search tab.
pub fn reset_query(base: &str) -> String {
    let current = decode(base);
    encode(&FacetSet::for_feed(current.feed), base)
}

/// Switch tabs without touching any other parameter.
pub fn select_tab(base: &str, tab: Tab) -> String {
    let mut facets = decode(base);
    facets.tab = tab;
    encode(&facets, base)
}

/// Pick an explicit sort from the sort control. The tab follows to
/// current-search so the two never disagree.
pub fn select_sort(base: &str, sort: SortKey) -> String {
    let mut facets = decode(base);
    facets.sort = Some(sort);
    facets.tab = Tab::CurrentSearch;
    encode(&facets, base)
}

fn pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    let query = query.trim().trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned()))
}

fn join_tags<T: Copy>(tags: &[T], as_str: impl Fn(T) -> &'static str) -> String {
    tags.iter().map(|t| as_str(*t)).collect::<Vec<_>>().join(",")
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn decode_with(query: &str, mode: Mode) -> Result<FacetSet> {
    let mut facets = FacetSet::default();

    // Last occurrence of a key wins.
    for (key, value) in pairs(query) {
        let value = value.as_str();
        match key.as_str() {
            keys::FEED => {
                facets.feed = Feed::from_param(value);
                let given = value.trim();
                if mode == Mode::Strict && !given.is_empty() && facets.feed.as_str() != given {
                    return Err(Error::invalid_facet(&key, value));
                }
            }
            keys::TAB => {
                facets.tab = parse_enum(&key, value, mode, Tab::from_param)?.unwrap_or_default();
            }
            keys::SORT => facets.sort = parse_enum(&key, value, mode, SortKey::from_param)?,
            keys::AREA => {
                let mut areas: Vec<String> = Vec::new();
                for area in split_list(value) {
                    if !areas.iter().any(|a| a.eq_ignore_ascii_case(area)) {
                        areas.push(area.to_string());
                    }
                }
                facets.areas = areas;
            }
            keys::TYPE => {
                facets.property_types = parse_tags(&key, value, mode, PropertyType::from_param)?
            }
            keys::PETS => facets.pets = parse_tags(&key, value, mode, Pet::from_param)?,
            keys::AMENITIES => {
                let mut amenities: Vec<String> = Vec::new();
                for amenity in split_list(value) {
                    let amenity = amenity.to_ascii_lowercase();
                    if !amenities.contains(&amenity) {
                        amenities.push(amenity);
                    }
                }
                facets.amenities = amenities;
            }
            keys::PRICE_MIN => facets.price_min = parse_amount(&key, value, mode)?,
            keys::PRICE_MAX => facets.price_max = parse_amount(&key, value, mode)?,
            keys::BEDS => facets.beds = parse_enum(&key, value, mode, Beds::from_param)?,
            keys::BATHS => facets.baths = parse_enum(&key, value, mode, Baths::from_param)?,
            keys::BEDS_ONLY => facets.beds_exact = parse_flag(&key, value, mode)?,
            keys::BATHS_ONLY => facets.baths_exact = parse_flag(&key, value, mode)?,
            keys::EWA => facets.ewa_included = parse_flag(&key, value, mode)?,
            _ => {}
        }
    }

    Ok(facets)
}

/// Empty values are absent in both modes; anything else must parse in strict mode.
fn parse_enum<T>(
    key: &str,
    value: &str,
    mode: Mode,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    match parse(value) {
        Some(parsed) => Ok(Some(parsed)),
        None if mode == Mode::Strict => Err(Error::invalid_facet(key, value)),
        None => Ok(None),
    }
}

fn parse_tags<T: PartialEq>(
    key: &str,
    value: &str,
    mode: Mode,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>> {
    let mut tags = Vec::new();
    for item in split_list(value) {
        if let Some(tag) = parse_enum(key, item, mode, &parse)? {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    Ok(tags)
}

fn parse_amount(key: &str, value: &str, mode: Mode) -> Result<Option<u64>> {
    parse_enum(key, value, mode, |v| v.trim().parse::<u64>().ok())
}

fn parse_flag(key: &str, value: &str, mode: Mode) -> Result<bool> {
    match value.trim() {
        "" | "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ if mode == Mode::Strict => Err(Error::invalid_facet(key, value)),
        _ => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FacetSet {
        FacetSet {
            feed: Feed::UniHub,
            areas: vec!["Juffair".into(), "Seef District".into()],
            property_types: vec![PropertyType::Villa, PropertyType::Apartment],
            price_min: Some(300),
            price_max: Some(900),
            beds: Some(Beds::Two),
            beds_exact: true,
            baths: Baths::from_param("1.5"),
            baths_exact: false,
            pets: vec![Pet::Cats],
            amenities: vec!["pool".into(), "gym".into()],
            ewa_included: true,
            tab: Tab::CurrentSearch,
            sort: Some(SortKey::PriceAsc),
        }
    }

    #[test]
    fn test_round_trip() {
        let facets = sample();
        let decoded = decode(&encode(&facets, ""));
        assert!(decoded.equivalent(&facets), "{decoded:?}");
    }

    #[test]
    fn test_round_trip_every_scalar_value() {
        let beds = [
            None,
            Some(Beds::Studio),
            Some(Beds::One),
            Some(Beds::Two),
            Some(Beds::Three),
            Some(Beds::FourPlus),
        ];
        let baths: Vec<Option<Baths>> = std::iter::once(None)
            .chain((2..=8).map(Baths::from_halves))
            .collect();
        let sorts: Vec<Option<SortKey>> =
            std::iter::once(None).chain(SortKey::ALL.map(Some)).collect();

        for feed in [Feed::Rentals, Feed::UniHub] {
            for tab in Tab::ALL {
                for sort in &sorts {
                    for exact in [false, true] {
                        for (bed, bath) in beds.iter().zip(baths.iter().cycle()) {
                            let facets = FacetSet {
                                feed,
                                tab,
                                sort: *sort,
                                beds: *bed,
                                beds_exact: exact,
                                baths: *bath,
                                baths_exact: !exact,
                                ..sample()
                            };
                            let decoded = decode(&encode(&facets, ""));
                            assert!(decoded.equivalent(&facets), "{facets:?} -> {decoded:?}");
                        }
                        for bath in &baths {
                            let facets = FacetSet {
                                feed,
                                tab,
                                sort: *sort,
                                baths: *bath,
                                baths_exact: exact,
                                ..FacetSet::default()
                            };
                            let decoded = decode(&encode(&facets, ""));
                            assert!(decoded.equivalent(&facets), "{facets:?} -> {decoded:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_round_trip_of_empty_set() {
        let facets = FacetSet::default();
        let query = encode(&facets, "");
        assert_eq!(query, "feed=rentals&tab=current-search");
        assert!(decode(&query).equivalent(&facets));
    }

    #[test]
    fn test_list_order_does_not_matter() {
        let a = decode("type=villa,apartment&area=Juffair,Manama");
        let b = decode("type=apartment,villa&area=Manama,Juffair");
        assert!(a.equivalent(&b));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let facets = FacetSet {
            areas: vec![],
            property_types: vec![],
            ..FacetSet::default()
        };
        let query = encode(&facets, "area=Juffair&type=villa");
        assert!(!query.contains("area="));
        assert!(!query.contains("type="));
    }

    #[test]
    fn test_unrecognized_keys_pass_through() {
        let facets = decode("page=3&beds=2&zoom=12");
        let query = encode(&facets, "page=3&beds=2&zoom=12");
        assert!(query.starts_with("page=3&zoom=12&"));
        assert!(query.contains("beds=2"));
    }

    #[test]
    fn test_studio_synonym() {
        let from_word = decode("beds=studio");
        let from_zero = decode("beds=0");
        assert_eq!(from_word, from_zero);
        assert_eq!(from_word.beds, Some(Beds::Studio));
        assert!(encode(&from_word, "").contains("beds=0"));
        assert!(encode(&from_zero, "").contains("beds=0"));
    }

    #[test]
    fn test_four_plus_encodes_literally() {
        let facets = decode("beds=4%2B");
        assert_eq!(facets.beds, Some(Beds::FourPlus));
        let reparsed = decode(&encode(&facets, ""));
        assert_eq!(reparsed.beds, Some(Beds::FourPlus));
    }

    #[test]
    fn test_malformed_numbers_are_absent() {
        let facets = decode("price_min=abc&price_max=-5&beds=9&baths=0.75");
        assert_eq!(facets.price_min, None);
        assert_eq!(facets.price_max, None);
        assert_eq!(facets.beds, None);
        assert_eq!(facets.baths, None);
    }

    #[test]
    fn test_unknown_feed_and_tab_fall_back_to_defaults() {
        let facets = decode("feed=commercial&tab=trending&sort=random");
        assert_eq!(facets.feed, Feed::Rentals);
        assert_eq!(facets.tab, Tab::CurrentSearch);
        assert_eq!(facets.sort, None);
    }

    #[test]
    fn test_exact_flags_use_presence_encoding() {
        let facets = FacetSet {
            beds: Some(Beds::Two),
            beds_exact: false,
            baths: Baths::from_param("2"),
            baths_exact: true,
            ..FacetSet::default()
        };
        let query = encode(&facets, "");
        assert!(!query.contains("beds_only"));
        assert!(query.contains("baths_only=true"));

        assert!(decode("beds=2&beds_only").beds_exact);
        assert!(!decode("beds=2&beds_only=false").beds_exact);
    }

    #[test]
    fn test_exact_flag_dropped_without_value() {
        let facets = FacetSet {
            beds: None,
            beds_exact: true,
            ..FacetSet::default()
        };
        assert!(!encode(&facets, "").contains("beds_only"));
    }

    #[test]
    fn test_area_dedup_is_case_insensitive() {
        let facets = decode("area=Juffair, juffair ,Manama,,");
        assert_eq!(facets.areas, vec!["Juffair".to_string(), "Manama".to_string()]);
    }

    #[test]
    fn test_apply_forces_current_search() {
        let facets = FacetSet {
            tab: Tab::Popular,
            beds: Some(Beds::One),
            ..FacetSet::default()
        };
        let query = apply_query(&facets, "tab=popular");
        assert_eq!(decode(&query).tab, Tab::CurrentSearch);
    }

    #[test]
    fn test_reset_preserves_feed_and_is_idempotent() {
        let base = "feed=uni-hub&tab=popular&beds=2&area=Juffair&price_min=200&page=2";
        let once = reset_query(base);
        let twice = reset_query(&once);
        assert_eq!(once, twice);

        let facets = decode(&once);
        assert_eq!(facets.feed, Feed::UniHub);
        assert_eq!(facets.tab, Tab::CurrentSearch);
        assert!(facets.is_unfiltered());
        assert!(once.contains("page=2"));
    }

    #[test]
    fn test_select_tab_keeps_sort_param() {
        let query = select_tab("sort=price_asc&tab=current-search", Tab::Newest);
        let facets = decode(&query);
        assert_eq!(facets.tab, Tab::Newest);
        assert_eq!(facets.sort, Some(SortKey::PriceAsc));
    }

    #[test]
    fn test_select_sort_switches_tab() {
        let query = select_sort("tab=newest", SortKey::PriceDesc);
        let facets = decode(&query);
        assert_eq!(facets.tab, Tab::CurrentSearch);
        assert_eq!(facets.sort, Some(SortKey::PriceDesc));
    }

    #[test]
    fn test_leading_question_mark_is_ignored() {
        assert_eq!(decode("?beds=1").beds, Some(Beds::One));
    }

    #[test]
    fn test_strict_decoding_rejects_malformed_input() {
        assert!(decode_strict("beds=2&price_min=100&type=villa").is_ok());
        assert!(decode_strict("price_min=").is_ok());

        for query in [
            "price_min=abc",
            "beds=9",
            "type=castle",
            "feed=commercial",
            "sort=random",
            "beds_only=maybe",
        ] {
            match decode_strict(query) {
                Err(Error::InvalidFacet { .. }) => {}
                other => panic!("{query}: expected InvalidFacet, got {other:?}"),
            }
        }
    }
}
