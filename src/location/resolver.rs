//! Position resolver: orchestrates the fallback chain for the initial map position.
//!
//! Flow:  explicit position → place identifier (geocode, no fallback) →
//!        device location → configured fallback position

use std::sync::Arc;

use super::geocoder::{DeviceLocator, Geocoder};
use super::types::{GeoError, PlaceQuery, Position};

/// Used when no device location can be obtained.
pub const DEFAULT_FALLBACK: Position = Position::new(35.0, 33.0);

/// What the caller knows about the starting position.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionInput {
    Position(Position),
    PlaceId(String),
}

impl From<Position> for PositionInput {
    fn from(pos: Position) -> Self {
        Self::Position(pos)
    }
}

impl From<&str> for PositionInput {
    fn from(id: &str) -> Self {
        Self::PlaceId(id.to_string())
    }
}

impl From<String> for PositionInput {
    fn from(id: String) -> Self {
        Self::PlaceId(id)
    }
}

/// The position resolver with its fallback pipeline.
#[derive(Clone)]
pub struct PositionResolver {
    geocoder: Geocoder,
    device: Option<Arc<dyn DeviceLocator>>,
    fallback: Position,
}

impl PositionResolver {
    /// Resolver without device location; absent input resolves to the fallback.
    pub fn new(geocoder: Geocoder) -> Self {
        Self {
            geocoder,
            device: None,
            fallback: DEFAULT_FALLBACK,
        }
    }

    pub fn with_device(mut self, device: Arc<dyn DeviceLocator>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_fallback(mut self, fallback: Position) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Position {
        self.fallback
    }

    /// Resolve the starting position. Only the place-identifier path can fail.
    pub async fn resolve(&self, input: Option<PositionInput>) -> Result<Position, GeoError> {
        match input {
            Some(PositionInput::Position(pos)) => Ok(pos),
            Some(PositionInput::PlaceId(id)) if !id.trim().is_empty() => {
                self.resolve_place_id(id).await
            }
            _ => Ok(self.resolve_device().await),
        }
    }

    async fn resolve_place_id(&self, id: String) -> Result<Position, GeoError> {
        let results = self.geocoder.geocode(PlaceQuery::ByPlaceId(id)).await?;
        // Successful lookups are never empty.
        results
            .first()
            .map(|r| r.geometry.location)
            .ok_or_else(|| GeoError::InvalidResponse("empty result list".into()))
    }

    async fn resolve_device(&self) -> Position {
        let Some(device) = &self.device else {
            log::debug!("no device location capability, using fallback {}", self.fallback);
            return self.fallback;
        };

        match device.current_position().await {
            Ok(pos) => pos,
            Err(e) => {
                log::debug!("device location failed ({}), using fallback {}", e, self.fallback);
                self.fallback
            }
        }
    }
}
