//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A geographic coordinate in decimal degrees.
///
/// Deserializes from both `{latitude, longitude}` and the provider's
/// `{lat, lng}` shape; always serializes as `{latitude, longitude}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite, latitude within -90..=90 and longitude within -180..=180.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Selects the geocode lookup mode.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceQuery {
    ByPlaceId(String),
    ByLocation(Position),
}

impl PlaceQuery {
    pub(crate) fn validate(&self) -> Result<(), GeoError> {
        match self {
            Self::ByPlaceId(id) if id.trim().is_empty() => {
                Err(GeoError::InvalidQuery("empty place identifier".into()))
            }
            Self::ByLocation(pos) if !pos.is_valid() => Err(GeoError::InvalidQuery(format!(
                "coordinate out of range: {}",
                pos
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByPlaceId(id) => write!(f, "place_id={}", id),
            Self::ByLocation(pos) => write!(f, "latlng={}", pos),
        }
    }
}

/// One typed piece of a structured address (e.g. `locality`, `country`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub types: Vec<String>,
    pub long_name: String,
    pub short_name: String,
}

impl AddressComponent {
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// Rectangular bounds of a place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: Position,
    pub southwest: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

/// A single geocode hit as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    /// Types of the place itself (not of its components).
    #[serde(default)]
    pub types: Vec<String>,
}

/// Raw provider envelope: a status string plus whatever results came back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    pub const STATUS_OK: &'static str = "OK";

    pub fn ok(results: Vec<GeocodeResult>) -> Self {
        Self {
            status: Self::STATUS_OK.into(),
            results,
            error_message: None,
        }
    }

    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            results: Vec::new(),
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityMatchResult {
    pub same: bool,
}

impl CityMatchResult {
    pub const SAME: Self = Self { same: true };
    pub const DIFFERENT: Self = Self { same: false };
}

/// Location pipeline errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Non-OK status or an empty result list.
    #[error("No geocode results for {query} (status {status})")]
    NotFound { query: String, status: String },
    #[error("Invalid geocode query: {0}")]
    InvalidQuery(String),
    /// Geolocation absent, denied, or failed on the device.
    #[error("Device location unavailable: {0}")]
    CapabilityUnavailable(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}
