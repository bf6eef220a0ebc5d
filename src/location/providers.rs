//! Location providers: HTTP geocoding API and IP-based device location.
//!
//! Both use blocking `ureq` calls moved onto tokio's blocking pool, so a
//! request that nobody waits for any more still runs to completion and its
//! answer is simply dropped.

use std::time::Duration;

use serde::Deserialize;

use super::geocoder::{DeviceLocator, GeocodeProvider, ProviderFuture};
use super::types::{GeoError, GeocodeResponse, PlaceQuery, Position};

/// Google Geocoding API JSON endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_USER_AGENT: &str = "placesense/0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ─── Configuration ──────────────────────────────────────────────

/// Configuration for [`HttpGeocodeProvider`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_agent: String,
    /// Transport timeout for a single request.
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

// ─── Geocoding API provider ─────────────────────────────────────

pub struct HttpGeocodeProvider {
    agent: ureq::Agent,
    config: ProviderConfig,
}

impl HttpGeocodeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            agent: config.agent(),
            config,
        }
    }

    fn request_url(&self, query: &PlaceQuery) -> String {
        let lookup = match query {
            PlaceQuery::ByPlaceId(id) => format!("place_id={}", urlencod(id)),
            PlaceQuery::ByLocation(pos) => format!("latlng={},{}", pos.latitude, pos.longitude),
        };
        match &self.config.api_key {
            Some(key) => format!("{}?{}&key={}", self.config.base_url, lookup, urlencod(key)),
            None => format!("{}?{}", self.config.base_url, lookup),
        }
    }
}

impl GeocodeProvider for HttpGeocodeProvider {
    fn geocode(&self, query: PlaceQuery) -> ProviderFuture<'_, GeocodeResponse> {
        let url = self.request_url(&query);
        let agent = self.agent.clone();
        Box::pin(async move {
            log::debug!("geocode request {}", query);
            tokio::task::spawn_blocking(move || fetch_json::<GeocodeResponse>(&agent, &url))
                .await
                .map_err(|e| GeoError::Network(format!("geocode worker failed: {}", e)))?
        })
    }
}

fn fetch_json<T: serde::de::DeserializeOwned>(agent: &ureq::Agent, url: &str) -> Result<T, GeoError> {
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => GeoError::Network(format!("HTTP status {}", code)),
        ureq::Error::Transport(t) => GeoError::Network(t.to_string()),
    })?;

    response
        .into_json()
        .map_err(|e| GeoError::InvalidResponse(e.to_string()))
}

// ─── IP-based device location ───────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Device location through IP geolocation, for hosts without a GPS/browser API.
pub struct IpLocator {
    agent: ureq::Agent,
    url: String,
}

impl IpLocator {
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_url(config, DEFAULT_IP_LOOKUP_URL)
    }

    pub fn with_url(config: &ProviderConfig, url: impl Into<String>) -> Self {
        Self {
            agent: config.agent(),
            url: url.into(),
        }
    }
}

impl DeviceLocator for IpLocator {
    fn current_position(&self) -> ProviderFuture<'_, Position> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let result = tokio::task::spawn_blocking(move || fetch_json::<IpApiResult>(&agent, &url))
                .await
                .map_err(|e| GeoError::CapabilityUnavailable(e.to_string()))?
                .map_err(|e| GeoError::CapabilityUnavailable(e.to_string()))?;
            ip_position(result)
        })
    }
}

fn ip_position(r: IpApiResult) -> Result<Position, GeoError> {
    if r.error {
        return Err(GeoError::CapabilityUnavailable(
            r.reason.unwrap_or_else(|| "IP lookup refused".into()),
        ));
    }
    let lat = r
        .latitude
        .ok_or_else(|| GeoError::CapabilityUnavailable("no latitude".into()))?;
    let lon = r
        .longitude
        .ok_or_else(|| GeoError::CapabilityUnavailable("no longitude".into()))?;
    let pos = Position::new(lat, lon);
    if !pos.is_valid() {
        return Err(GeoError::CapabilityUnavailable(format!("out of range: {}", pos)));
    }
    Ok(pos)
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencod(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
