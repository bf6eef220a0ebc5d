//! Location pipelines for a map-centric interface.
//!
//! Provides geocode lookups, address-component extraction, initial-position
//! resolution with fallbacks, same-city matching, and the drag-to-reverse-geocode
//! marker stream, all on top of a single geocoding provider.

pub mod city;
pub mod components;
pub mod drag;
pub mod geocoder;
pub mod map;
pub mod providers;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use city::CityMatcher;
pub use components::{extract, is_city, is_country, ComponentSource, COUNTRY, LOCALITY};
pub use drag::{DragSignal, DragSubscription, MarkerDragStream};
pub use geocoder::{DeviceLocator, GeocodeProvider, Geocoder};
pub use map::{MapAdapter, MapSurface};
pub use providers::{HttpGeocodeProvider, IpLocator, ProviderConfig};
pub use resolver::{PositionInput, PositionResolver, DEFAULT_FALLBACK};
pub use types::{
    AddressComponent, CityMatchResult, GeoError, GeocodeResult, Geometry, PlaceQuery, Position,
    Viewport,
};
