//! "Same city?" check between a selected place and the current position.

use std::panic::AssertUnwindSafe;

use futures::future::{self, FutureExt};

use super::components::{extract, LOCALITY};
use super::geocoder::Geocoder;
use super::types::{CityMatchResult, GeoError, GeocodeResult, PlaceQuery, Position};

#[derive(Clone)]
pub struct CityMatcher {
    geocoder: Geocoder,
}

impl CityMatcher {
    pub fn new(geocoder: Geocoder) -> Self {
        Self { geocoder }
    }

    /// Compare the locality of `target_place_id` with that of `current`.
    ///
    /// Never fails: lookup failures, missing localities and panics inside
    /// the pipeline all answer `{ same: false }`.
    pub async fn same_city(&self, target_place_id: &str, current: Position) -> CityMatchResult {
        let pipeline = self.compare(target_place_id.to_string(), current);
        match AssertUnwindSafe(pipeline).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("city match for {} panicked, answering not-same", target_place_id);
                CityMatchResult::DIFFERENT
            }
        }
    }

    async fn compare(&self, target_place_id: String, current: Position) -> CityMatchResult {
        // Target first, current second; both in flight before either settles.
        let (selected, here) = future::join(
            self.geocoder.geocode(PlaceQuery::ByPlaceId(target_place_id)),
            self.geocoder.geocode(PlaceQuery::ByLocation(current)),
        )
        .await;

        match (selected, here) {
            (Ok(selected), Ok(here)) => match_localities(&selected, &here),
            (selected, here) => {
                log_failure("selected place", selected.err());
                log_failure("current position", here.err());
                CityMatchResult::DIFFERENT
            }
        }
    }
}

fn match_localities(selected: &[GeocodeResult], here: &[GeocodeResult]) -> CityMatchResult {
    match (extract(selected, LOCALITY), extract(here, LOCALITY)) {
        (Some(a), Some(b)) => {
            log::debug!("comparing localities '{}' and '{}'", a.long_name, b.long_name);
            CityMatchResult {
                same: a.long_name == b.long_name,
            }
        }
        _ => {
            log::debug!("locality missing on one side, answering not-same");
            CityMatchResult::DIFFERENT
        }
    }
}

fn log_failure(side: &str, error: Option<GeoError>) {
    if let Some(e) = error {
        log::debug!("city match: {} lookup failed: {}", side, e);
    }
}
