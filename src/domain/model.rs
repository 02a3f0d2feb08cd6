use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Coordinate pair in WGS84 degrees (latitude -90..=90, longitude -180..=180).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// City/region hints returned by a reverse geocoder. Either field may be
/// absent when the lookup has no answer for the coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodedAddress {
    pub city: Option<String>,
    pub region: Option<String>,
}

/// A user location reduced to coordinates plus display metadata, ready for
/// distance math. Produced once per user action and persisted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub city: String,
    pub state: String,
    pub display_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Church {
    pub id: i64,
    pub name: String,
    pub senior_pastor: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub follower_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub church_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub favorites_count: Option<u32>,
    pub like_count: Option<u32>,
    pub church_name: Option<String>,
    pub church_logo: Option<String>,
}

impl Event {
    /// Both latitude and longitude are optional on the wire; an event only
    /// has usable coordinates when both are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesCounts {
    pub followed_churches: u32,
    pub liked_events: u32,
}

/// Payload of `GET /favorites/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesSummary {
    pub followed_churches: Vec<Church>,
    pub liked_events: Vec<Event>,
    pub counts: FavoritesCounts,
}

/// Everything the ranking pass needs, gathered by the extract stage.
#[derive(Debug, Clone)]
pub struct FeedInputs {
    pub events: Vec<Event>,
    pub user_location: Option<ResolvedLocation>,
    pub followed_church_ids: HashSet<i64>,
}

/// The persisted output of one feed build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedFeed {
    pub generated_at: DateTime<Utc>,
    pub location: Option<ResolvedLocation>,
    pub event_count: usize,
    pub events: Vec<Event>,
}
