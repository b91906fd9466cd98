use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location assumed for users who never set one
pub const DEFAULT_LOCATION: &str = "slo";

/// Denormalized copy of a restaurant, frozen at the moment the user favorited
/// it. Later catalog edits do not propagate into stored snapshots.
///
/// Only `name` is required — it is the membership key for favorites and for
/// the reconciler's exclusion rule. Everything else is whatever the catalog
/// happened to carry, so partial payloads must decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range_usd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_delivery: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cuisines: Vec<String>,
}

/// One user's rating/review/photos for a restaurant they visited.
///
/// Invariant: at most one record per restaurant per user, keyed by
/// `restaurant_id` (falling back to `name` when matching an upsert).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub restaurant_id: String,
    pub name: String,
    /// Integer stars, 1-5
    pub rating: i16,
    #[serde(default)]
    pub review: String,
    /// Encoded image payloads (URLs or data URIs), stored opaquely
    #[serde(default)]
    pub images: Vec<String>,
    pub visit_date: DateTime<Utc>,
}

/// Per-user restaurant-list filters, persisted verbatim for the client.
///
/// Key casing mirrors the wire format the frontend already speaks
/// (`searchQuery` camel-cased, the rest as-is).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Filters {
    #[serde(rename = "searchQuery")]
    pub search_query: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
    pub min_rating: f64,
}

/// Raw output of the recommendation computation, exactly as the external
/// process printed it. The list may still contain the reference favorite;
/// removing it is the reconciler's job, not the bridge's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    #[serde(default)]
    pub reference_favorite: Option<RestaurantSnapshot>,
    #[serde(default)]
    pub recommendations: Vec<RestaurantSnapshot>,
}
