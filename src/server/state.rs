use crate::location::{CityMatcher, Geocoder, PositionResolver};

pub struct AppState {
    pub geocoder: Geocoder,
    pub resolver: PositionResolver,
    pub matcher: CityMatcher,
}

impl AppState {
    /// Wire every pipeline to the same geocoder.
    pub fn new(geocoder: Geocoder, resolver: PositionResolver) -> Self {
        Self {
            matcher: CityMatcher::new(geocoder.clone()),
            geocoder,
            resolver,
        }
    }
}
