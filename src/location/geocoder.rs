//! Single-shot geocode lookups against the configured provider.
//!
//! The provider reports a status plus a (possibly empty) result list; the
//! [`Geocoder`] turns anything other than `OK` with at least one result into
//! [`GeoError::NotFound`], so a successful list is never empty.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::types::{GeoError, GeocodeResponse, GeocodeResult, PlaceQuery, Position};

/// Boxed future returned by provider capabilities.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GeoError>> + Send + 'a>>;

/// The provider's geocoding capability: one round trip per call.
pub trait GeocodeProvider: Send + Sync + 'static {
    fn geocode(&self, query: PlaceQuery) -> ProviderFuture<'_, GeocodeResponse>;
}

/// The device's "where am I" capability (browser geolocation, IP lookup, ...).
pub trait DeviceLocator: Send + Sync + 'static {
    fn current_position(&self) -> ProviderFuture<'_, Position>;
}

/// Geocode front end shared by every pipeline.
#[derive(Clone)]
pub struct Geocoder {
    provider: Arc<dyn GeocodeProvider>,
}

impl Geocoder {
    pub fn new(provider: Arc<dyn GeocodeProvider>) -> Self {
        Self { provider }
    }

    /// Geocode a place identifier or a coordinate.
    ///
    /// The returned future owns its handle on the provider, so it can be
    /// spawned or held across a drag gesture without borrowing `self`.
    pub fn geocode(
        &self,
        query: PlaceQuery,
    ) -> impl Future<Output = Result<Vec<GeocodeResult>, GeoError>> + Send + 'static {
        let provider = Arc::clone(&self.provider);
        async move {
            query.validate()?;
            let label = query.to_string();
            let response = provider.geocode(query).await?;
            accept_response(&label, response)
        }
    }

    pub fn reverse(
        &self,
        position: Position,
    ) -> impl Future<Output = Result<Vec<GeocodeResult>, GeoError>> + Send + 'static {
        self.geocode(PlaceQuery::ByLocation(position))
    }
}

fn accept_response(query: &str, response: GeocodeResponse) -> Result<Vec<GeocodeResult>, GeoError> {
    if response.status != GeocodeResponse::STATUS_OK || response.results.is_empty() {
        log::debug!(
            "geocode {} -> {} ({} results){}",
            query,
            response.status,
            response.results.len(),
            response
                .error_message
                .as_deref()
                .map(|m| format!(": {}", m))
                .unwrap_or_default(),
        );
        return Err(GeoError::NotFound {
            query: query.to_string(),
            status: response.status,
        });
    }
    log::debug!("geocode {} -> {} results", query, response.results.len());
    Ok(response.results)
}
