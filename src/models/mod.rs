use crate::facets::PropertyType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation lifecycle of a listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
    Archived,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
            ListingStatus::Archived => "archived",
        }
    }
}

/// Location information for a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub area: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Read-side listing row as returned by the data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: String,
    pub title: String,
    pub status: ListingStatus,
    pub property_type: Option<PropertyType>,
    /// Monthly rent in whole currency units
    pub price: i64,
    pub beds: u32,
    pub baths: f64,
    #[serde(flatten)]
    pub location: Location,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub pets_allowed: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub ewa_included: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub is_uni_hub: bool,
    pub area_sqm: Option<u32>,
    pub created_at: DateTime<Utc>,
}
