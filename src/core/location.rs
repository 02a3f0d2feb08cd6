//! Turns free-form location input (zip code or "City, State") or device
//! coordinates into a normalized location record, and provides the distance
//! math the ranker builds on.

use crate::core::gazetteer;
use crate::domain::model::{Coordinates, GeocodedAddress, ResolvedLocation};
use crate::domain::ports::ReverseGeocoder;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip pattern is valid"));

/// Expected, recoverable outcomes of a lookup. `NotFound` means the input was
/// well-formed but absent from the offline tables; `InvalidFormat` means it
/// did not parse into a zip or "City, State" shape at all. Callers branch on
/// these to offer different recovery actions (retry vs. switch to GPS).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("location {query:?} is not covered by the offline location tables")]
    NotFound { query: String },

    #[error("could not parse {input:?} as a zip code or \"City, State\"")]
    InvalidFormat {
        input: String,
        suggestions: Vec<String>,
    },
}

/// Resolves a 5-digit (or ZIP+4) code against the major-metro table.
pub fn resolve_from_zip(zip: &str) -> Result<ResolvedLocation, ResolveError> {
    let trimmed = zip.trim();
    if !ZIP_PATTERN.is_match(trimmed) {
        return Err(ResolveError::InvalidFormat {
            input: trimmed.to_string(),
            suggestions: Vec::new(),
        });
    }

    match gazetteer::zip_coordinates(trimmed) {
        Some(entry) => Ok(ResolvedLocation {
            coordinates: entry.coordinates,
            city: entry.city.to_string(),
            state: entry.state.to_string(),
            display_address: format!("{}, {} {}", entry.city, entry.state, trimmed),
        }),
        None => Err(ResolveError::NotFound {
            query: trimmed.to_string(),
        }),
    }
}

/// Resolves a `"City, State"` (or `"City, Country"`) string against the city
/// table. Whitespace around the comma is irrelevant; the user's own casing is
/// kept for display.
pub fn resolve_from_city_state(input: &str) -> Result<ResolvedLocation, ResolveError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();

    if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ResolveError::InvalidFormat {
            input: trimmed.to_string(),
            suggestions: format_suggestions(trimmed),
        });
    }

    let (city, state) = (parts[0], parts[1]);
    match gazetteer::city_coordinates(city, state) {
        Some(coordinates) => Ok(ResolvedLocation {
            coordinates,
            city: city.to_string(),
            state: state.to_string(),
            display_address: format!("{}, {}", city, state),
        }),
        None => Err(ResolveError::NotFound {
            query: format!("{}, {}", city, state),
        }),
    }
}

/// Combined manual-entry path: zip-shaped input goes down the zip path,
/// everything else falls through to city/state parsing.
pub fn resolve_manual_input(input: &str) -> Result<ResolvedLocation, ResolveError> {
    let trimmed = input.trim();
    if ZIP_PATTERN.is_match(trimmed) {
        resolve_from_zip(trimmed)
    } else {
        resolve_from_city_state(trimmed)
    }
}

/// Builds a location from device coordinates plus whatever the injected
/// reverse geocoder knows about them. Never fails: missing city or region
/// degrade to the literal "Unknown".
pub fn resolve_from_device_coordinates(
    coordinates: Coordinates,
    geocoder: &dyn ReverseGeocoder,
) -> ResolvedLocation {
    let address = geocoder.reverse_geocode(coordinates);
    let city = address.city.unwrap_or_else(|| "Unknown".to_string());
    let state = address.region.unwrap_or_else(|| "Unknown".to_string());
    ResolvedLocation {
        coordinates,
        display_address: format!("{}, {}", city, state),
        city,
        state,
    }
}

/// Great-circle distance in miles (Haversine).
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    const EARTH_RADIUS_MILES: f64 = 3959.0;

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Nearest city-table entry within `max_distance_miles`, as display-ready
/// `(city, state)` strings.
pub fn nearest_city(coordinates: Coordinates, max_distance_miles: f64) -> Option<(String, String)> {
    let mut best: Option<(f64, &'static str)> = None;
    for (key, city_coords) in gazetteer::city_entries() {
        let distance = distance_miles(coordinates, city_coords);
        if best.map_or(true, |(best_distance, _)| distance < best_distance) {
            best = Some((distance, key));
        }
    }

    let (distance, key) = best?;
    if distance > max_distance_miles {
        return None;
    }
    let (city, state) = key.split_once(", ")?;
    Some((title_case(city), display_region(state)))
}

/// Offline reverse geocoder backed by the same city table: snaps coordinates
/// to the nearest covered city, or reports nothing when none is in range.
#[derive(Debug, Clone)]
pub struct GazetteerReverseGeocoder {
    max_distance_miles: f64,
}

impl GazetteerReverseGeocoder {
    pub fn new(max_distance_miles: f64) -> Self {
        Self { max_distance_miles }
    }
}

impl Default for GazetteerReverseGeocoder {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl ReverseGeocoder for GazetteerReverseGeocoder {
    fn reverse_geocode(&self, coordinates: Coordinates) -> GeocodedAddress {
        match nearest_city(coordinates, self.max_distance_miles) {
            Some((city, region)) => GeocodedAddress {
                city: Some(city),
                region: Some(region),
            },
            None => GeocodedAddress::default(),
        }
    }
}

/// Sample inputs shown when the user needs format guidance.
pub fn location_examples() -> &'static [&'static str] {
    &[
        "Atlanta, GA",
        "New York, NY",
        "Los Angeles, CA",
        "Chicago, IL",
        "Houston, TX",
        "Toronto, Ontario",
        "London, UK",
        "Paris, France",
        "Tokyo, Japan",
        "Sydney, Australia",
        "Berlin, Germany",
        "Dubai, UAE",
        "Mexico City, Mexico",
    ]
}

fn format_suggestions(input: &str) -> Vec<String> {
    match input.to_lowercase().as_str() {
        "ny" => vec![
            "New York, NY".to_string(),
            "10001 (New York City zip code)".to_string(),
        ],
        "ca" => vec![
            "Los Angeles, CA".to_string(),
            "90210 (Los Angeles zip code)".to_string(),
        ],
        "ga" => vec![
            "Atlanta, GA".to_string(),
            "30309 (Atlanta zip code)".to_string(),
        ],
        "tx" => vec!["Houston, TX".to_string(), "Dallas, TX".to_string()],
        _ => Vec::new(),
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_region(value: &str) -> String {
    if value.len() <= 2 {
        value.to_uppercase()
    } else {
        title_case(value)
    }
}
