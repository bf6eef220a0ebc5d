//! In-memory provider doubles for the pipeline tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

use super::geocoder::{DeviceLocator, GeocodeProvider, ProviderFuture};
use super::types::{
    AddressComponent, GeoError, GeocodeResponse, GeocodeResult, Geometry, PlaceQuery, Position,
};

/// Provider returning canned replies per query and recording every call.
///
/// Unknown queries answer `ZERO_RESULTS`. In gated mode each call parks
/// until the test releases it by call index.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<Vec<(PlaceQuery, Result<GeocodeResponse, GeoError>)>>,
    calls: Mutex<Vec<PlaceQuery>>,
    gated: AtomicBool,
    gates: Mutex<Vec<Option<oneshot::Sender<()>>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        let provider = Self::default();
        provider.gated.store(true, Ordering::SeqCst);
        provider
    }

    pub fn respond(&self, query: PlaceQuery, response: GeocodeResponse) {
        self.replies.lock().unwrap().push((query, Ok(response)));
    }

    pub fn fail(&self, query: PlaceQuery, error: GeoError) {
        self.replies.lock().unwrap().push((query, Err(error)));
    }

    pub fn calls(&self) -> Vec<PlaceQuery> {
        self.calls.lock().unwrap().clone()
    }

    /// Let the `index`-th gated call complete.
    pub fn release(&self, index: usize) {
        let gate = self.gates.lock().unwrap().get_mut(index).and_then(Option::take);
        if let Some(tx) = gate {
            let _ = tx.send(());
        }
    }

    /// Yield to the runtime until at least `n` calls were issued.
    pub async fn wait_for_calls(&self, n: usize) {
        for _ in 0..10_000 {
            if self.calls.lock().unwrap().len() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {} provider calls, saw {:?}", n, self.calls());
    }

    fn lookup(&self, query: &PlaceQuery) -> Result<GeocodeResponse, GeoError> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(q, _)| q == query)
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Ok(GeocodeResponse::with_status("ZERO_RESULTS")))
    }
}

impl GeocodeProvider for ScriptedProvider {
    fn geocode(&self, query: PlaceQuery) -> ProviderFuture<'_, GeocodeResponse> {
        let reply = self.lookup(&query);
        self.calls.lock().unwrap().push(query);
        let gate = if self.gated.load(Ordering::SeqCst) {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push(Some(tx));
            Some(rx)
        } else {
            None
        };
        Box::pin(async move {
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            reply
        })
    }
}

/// Device locator with a fixed answer.
pub struct FixedLocator(pub Result<Position, GeoError>);

impl DeviceLocator for FixedLocator {
    fn current_position(&self) -> ProviderFuture<'_, Position> {
        let answer = self.0.clone();
        Box::pin(async move { answer })
    }
}

pub fn component(long_name: &str, types: &[&str]) -> AddressComponent {
    AddressComponent {
        types: types.iter().map(|t| t.to_string()).collect(),
        long_name: long_name.to_string(),
        short_name: long_name.to_string(),
    }
}

pub fn result_with_components(location: Position, components: Vec<AddressComponent>) -> GeocodeResult {
    GeocodeResult {
        address_components: components,
        geometry: Geometry {
            location,
            viewport: None,
        },
        formatted_address: None,
        place_id: None,
        types: Vec::new(),
    }
}

pub fn result_with_locality(location: Position, city: &str) -> GeocodeResult {
    result_with_components(
        location,
        vec![
            component("1 Main Street", &["route"]),
            component(city, &["locality", "political"]),
            component("Egypt", &["country", "political"]),
        ],
    )
}
