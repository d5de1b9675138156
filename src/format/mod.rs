//! Display strings derived from a facet set: the feed title, the summary
//! pills and the bucketed result-count label.

use crate::facets::{Beds, FacetSet, Feed};
use std::fmt;

/// Currency prefix for price pills
pub const CURRENCY: &str = "BD";

/// Shown on the apply button when no count is available
pub const FALLBACK_BUTTON_LABEL: &str = "Show listings";

/// Summary chip for one active filter, or the "+N" overflow chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pill {
    Label(String),
    Overflow(usize),
}

impl fmt::Display for Pill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pill::Label(label) => f.write_str(label),
            Pill::Overflow(n) => write!(f, "+{n}"),
        }
    }
}

const PLURALS: [(&str, &str); 7] = [
    ("studio", "Studios"),
    ("apartment", "Apartments"),
    ("villa", "Villas"),
    ("home", "Homes"),
    ("compound", "Compounds"),
    ("penthouse", "Penthouses"),
    ("shared", "Shared Spaces"),
];

/// Plural display name for a property-type tag.
pub fn pluralize(tag: &str) -> String {
    if let Some((_, plural)) = PLURALS.iter().find(|(t, _)| t.eq_ignore_ascii_case(tag)) {
        return plural.to_string();
    }
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => format!("{}{}s", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// "A", "A & B", or "A, B, C"
pub fn join_items<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} & {}", a.as_ref(), b.as_ref()),
        _ => items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

pub fn title(facets: &FacetSet) -> String {
    let types: Vec<String> = facets
        .property_types
        .iter()
        .map(|t| pluralize(t.as_str()))
        .collect();

    match (types.is_empty(), facets.areas.is_empty()) {
        (false, false) => format!("{} in {}", join_items(&types), join_items(&facets.areas)),
        (true, false) => format!("Listings in {}", join_items(&facets.areas)),
        (false, true) => join_items(&types),
        (true, true) => match facets.feed {
            Feed::Rentals => "Rentals".to_string(),
            Feed::UniHub => "Uni Hub listings".to_string(),
        },
    }
}

/// Pills in fixed order: price, beds, baths, EWA, then overflow for the
/// remaining active facets that have no pill of their own.
pub fn pills(facets: &FacetSet) -> Vec<Pill> {
    let mut pills = Vec::new();

    match (facets.price_min, facets.price_max) {
        (Some(min), Some(max)) => pills.push(Pill::Label(format!(
            "{CURRENCY} {}–{}",
            group_thousands(min),
            group_thousands(max)
        ))),
        (Some(min), None) => {
            pills.push(Pill::Label(format!("{CURRENCY} {}+", group_thousands(min))))
        }
        (None, Some(max)) => pills.push(Pill::Label(format!(
            "Up to {CURRENCY} {}",
            group_thousands(max)
        ))),
        (None, None) => {}
    }

    if let Some(beds) = facets.beds {
        let label = match beds {
            Beds::Studio => "Studio".to_string(),
            Beds::FourPlus => "4+ beds".to_string(),
            Beds::One if facets.beds_exact => "1 bed".to_string(),
            _ if facets.beds_exact => format!("{} beds", beds.count()),
            _ => format!("{}+ beds", beds.count()),
        };
        pills.push(Pill::Label(label));
    }

    if let Some(baths) = facets.baths {
        let label = if !facets.baths_exact {
            format!("{baths}+ baths")
        } else if baths.value() == 1.0 {
            "1 bath".to_string()
        } else {
            format!("{baths} baths")
        };
        pills.push(Pill::Label(label));
    }

    if facets.ewa_included {
        pills.push(Pill::Label("EWA included".to_string()));
    }

    let remaining = facets.pets.len() + facets.amenities.len();
    if remaining > 0 {
        pills.push(Pill::Overflow(remaining));
    }

    pills
}

/// Bucketed result count, e.g. "3 listings", "40+ listings", "1,000+ listings".
pub fn format_count(count: u64) -> String {
    match count {
        1 => "1 listing".to_string(),
        0..=4 => format!("{count} listings"),
        5..=9 => "5+ listings".to_string(),
        10..=99 => format!("{}+ listings", count / 10 * 10),
        100..=999 => "100+ listings".to_string(),
        1_000..=9_999 => "1,000+ listings".to_string(),
        _ => format!("{}+ listings", group_thousands(count / 10_000 * 10_000)),
    }
}

/// Label for the panel's apply button. `None` when no count is available.
pub fn button_label(count: Option<u64>) -> String {
    match count {
        Some(count) => format!("Show {}", format_count(count)),
        None => FALLBACK_BUTTON_LABEL.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::decode;

    #[test]
    fn test_format_count_buckets() {
        assert_eq!(format_count(0), "0 listings");
        assert_eq!(format_count(1), "1 listing");
        assert_eq!(format_count(3), "3 listings");
        assert_eq!(format_count(7), "5+ listings");
        assert_eq!(format_count(12), "10+ listings");
        assert_eq!(format_count(42), "40+ listings");
        assert_eq!(format_count(150), "100+ listings");
        assert_eq!(format_count(2_500), "1,000+ listings");
        assert_eq!(format_count(12_000), "10,000+ listings");
        assert_eq!(format_count(123_456), "120,000+ listings");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_title_defaults_per_feed() {
        assert_eq!(title(&decode("")), "Rentals");
        assert_eq!(title(&decode("feed=uni-hub")), "Uni Hub listings");
    }

    #[test]
    fn test_title_scenarios() {
        assert_eq!(title(&decode("type=villa")), "Villas");
        assert_eq!(title(&decode("area=Juffair")), "Listings in Juffair");
        assert_eq!(
            title(&decode("type=villa,apartment&area=Juffair")),
            "Villas & Apartments in Juffair"
        );
        assert_eq!(
            title(&decode("type=villa,apartment,studio&area=Juffair,Manama,Riffa")),
            "Villas, Apartments, Studios in Juffair, Manama, Riffa"
        );
    }

    #[test]
    fn test_pluralize_fallback() {
        assert_eq!(pluralize("villa"), "Villas");
        assert_eq!(pluralize("townhouse"), "Townhouses");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_no_facets_no_pills() {
        assert!(pills(&decode("feed=uni-hub&area=Juffair&type=villa&sort=price_asc")).is_empty());
    }

    #[test]
    fn test_pill_order() {
        let facets = decode(
            "ewa=true&baths=1.5&beds=2&beds_only=true&price_max=1200&price_min=300\
             &pets=cats,dogs&amenities=pool",
        );
        let labels: Vec<String> = pills(&facets).iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec!["BD 300–1,200", "2 beds", "1.5+ baths", "EWA included", "+3"]
        );
    }

    #[test]
    fn test_single_sided_price_and_studio() {
        assert_eq!(
            pills(&decode("price_min=500&beds=studio")),
            vec![
                Pill::Label("BD 500+".to_string()),
                Pill::Label("Studio".to_string())
            ]
        );
        assert_eq!(
            pills(&decode("price_max=800&beds=1&baths=1&baths_only=true")),
            vec![
                Pill::Label("Up to BD 800".to_string()),
                Pill::Label("1+ beds".to_string()),
                Pill::Label("1 bath".to_string())
            ]
        );
    }

    #[test]
    fn test_button_label() {
        assert_eq!(button_label(Some(42)), "Show 40+ listings");
        assert_eq!(button_label(None), "Show listings");
    }
}
