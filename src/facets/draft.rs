use super::codec;
use super::types::{Baths, Beds, FacetSet, Pet, PropertyType, Tab};

/// Editable copy of the facet set while a filter or search panel is open.
///
/// A draft is always opened from the canonical facet set decoded from the URL
/// and is thrown away on close. Nothing is committed until [`FacetDraft::apply`].
#[derive(Debug, Clone)]
pub struct FacetDraft {
    facets: FacetSet,
}

impl FacetDraft {
    pub fn open(current: &FacetSet) -> Self {
        Self {
            facets: current.clone(),
        }
    }

    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }

    /// Replace the area list from free text, comma separated.
    pub fn set_area_text(&mut self, text: &str) {
        let mut areas: Vec<String> = Vec::new();
        for area in text.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            if !areas.iter().any(|a| a.eq_ignore_ascii_case(area)) {
                areas.push(area.to_string());
            }
        }
        self.facets.areas = areas;
    }

    pub fn toggle_property_type(&mut self, kind: PropertyType) {
        toggle(&mut self.facets.property_types, kind);
    }

    pub fn set_price_min_input(&mut self, input: &str) {
        self.facets.price_min = parse_price_input(input);
    }

    pub fn set_price_max_input(&mut self, input: &str) {
        self.facets.price_max = parse_price_input(input);
    }

    pub fn set_beds(&mut self, beds: Option<Beds>) {
        self.facets.beds = beds;
        if beds.is_none() {
            self.facets.beds_exact = false;
        }
    }

    pub fn set_beds_exact(&mut self, exact: bool) {
        self.facets.beds_exact = exact;
    }

    pub fn set_baths(&mut self, baths: Option<Baths>) {
        self.facets.baths = baths;
        if baths.is_none() {
            self.facets.baths_exact = false;
        }
    }

    pub fn set_baths_exact(&mut self, exact: bool) {
        self.facets.baths_exact = exact;
    }

    pub fn toggle_pet(&mut self, pet: Pet) {
        toggle(&mut self.facets.pets, pet);
    }

    pub fn toggle_amenity(&mut self, amenity: &str) {
        let amenity = amenity.trim().to_ascii_lowercase();
        if !amenity.is_empty() {
            toggle(&mut self.facets.amenities, amenity);
        }
    }

    pub fn set_ewa_included(&mut self, included: bool) {
        self.facets.ewa_included = included;
    }

    /// Clear every filter inside the panel. Feed and sort survive.
    pub fn clear(&mut self) {
        self.facets = FacetSet {
            feed: self.facets.feed,
            tab: self.facets.tab,
            sort: self.facets.sort,
            ..FacetSet::default()
        };
    }

    /// Commit the draft. The min/max price pair is put back in order and the
    /// tab becomes current-search.
    pub fn apply(self) -> FacetSet {
        let mut facets = self.facets;
        if let (Some(min), Some(max)) = (facets.price_min, facets.price_max) {
            if min > max {
                facets.price_min = Some(max);
                facets.price_max = Some(min);
            }
        }
        facets.tab = Tab::CurrentSearch;
        facets
    }

    /// Commit the draft and produce the query string to navigate to.
    pub fn apply_query(self, base: &str) -> String {
        codec::apply_query(&self.apply(), base)
    }
}

/// Parse a typed price, ignoring separators and currency symbols.
pub fn parse_price_input(input: &str) -> Option<u64> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}
