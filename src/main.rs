use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use placesense::location::{
    extract, CityMatcher, GeoError, Geocoder, HttpGeocodeProvider, IpLocator, PlaceQuery, Position,
    PositionInput, PositionResolver, ProviderConfig, DEFAULT_FALLBACK,
};
use placesense::server::{self, AppState};

/// placesense: starting position, reverse geocoding and city matching
/// over a map geocoding provider.
///
/// Examples:
///   placesense position --place-id ChIJ674hC6Y_WBQRujtC6Jay33k
///   placesense position --device ip
///   placesense geocode --lat 30.0444 --lon 31.2357
///   placesense component locality --place-id ChIJ674hC6Y_WBQRujtC6Jay33k
///   placesense same-city ChIJ674hC6Y_WBQRujtC6Jay33k --lat 30.0444 --lon 31.2357
///   placesense serve --port 3000
#[derive(Parser)]
#[command(name = "placesense", version, about, long_about = None)]
struct Cli {
    /// Geocoding API key.
    #[arg(long, env = "PLACESENSE_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Geocoding endpoint (JSON).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10, global = true)]
    timeout: u64,

    /// Device location source: "ip" (IP geolocation) or "none".
    #[arg(long, default_value = "none", value_parser = parse_device, global = true)]
    device: DeviceSource,

    /// Latitude used when no device location is available.
    #[arg(long, allow_hyphen_values = true, global = true)]
    fallback_lat: Option<f64>,

    /// Longitude used when no device location is available.
    #[arg(long, allow_hyphen_values = true, global = true)]
    fallback_lon: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the starting map position.
    Position {
        #[arg(long)]
        place_id: Option<String>,
        #[command(flatten)]
        at: Coordinates,
    },
    /// Geocode a place identifier or reverse-geocode a coordinate.
    Geocode {
        #[arg(long)]
        place_id: Option<String>,
        #[command(flatten)]
        at: Coordinates,
    },
    /// Print the first address component carrying a type tag.
    Component {
        /// Type tag, e.g. locality or country.
        #[arg(index = 1)]
        type_tag: String,
        #[arg(long)]
        place_id: Option<String>,
        #[command(flatten)]
        at: Coordinates,
    },
    /// Check whether a place lies in the same city as a coordinate.
    SameCity {
        #[arg(index = 1)]
        place_id: String,
        #[command(flatten)]
        at: Coordinates,
    },
    /// Run the JSON API server.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(clap::Args)]
struct Coordinates {
    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl Coordinates {
    fn position(&self) -> Result<Option<Position>, String> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let pos = Position::new(lat, lon);
                if !pos.is_valid() {
                    return Err("Invalid coordinates. Lat: -90..90, Lon: -180..180".into());
                }
                Ok(Some(pos))
            }
            (None, None) => Ok(None),
            _ => Err("Provide both --lat and --lon".into()),
        }
    }
}

#[derive(Clone, Copy)]
enum DeviceSource {
    Ip,
    None,
}

fn parse_device(s: &str) -> Result<DeviceSource, String> {
    match s.to_lowercase().as_str() {
        "ip" => Ok(DeviceSource::Ip),
        "none" | "off" => Ok(DeviceSource::None),
        _ => Err(format!("Unknown device source '{}'. Use 'ip' or 'none'.", s)),
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // ── Wire the pipelines ──────────────────────────────────────

    let mut config = ProviderConfig::default().with_timeout(Duration::from_secs(cli.timeout));
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }

    let geocoder = Geocoder::new(Arc::new(HttpGeocodeProvider::new(config.clone())));
    let fallback = match (cli.fallback_lat, cli.fallback_lon) {
        (Some(lat), Some(lon)) => Position::new(lat, lon),
        (None, None) => DEFAULT_FALLBACK,
        _ => fail("Provide both --fallback-lat and --fallback-lon"),
    };
    if !fallback.is_valid() {
        fail("Invalid fallback coordinates. Lat: -90..90, Lon: -180..180");
    }
    let mut resolver = PositionResolver::new(geocoder.clone()).with_fallback(fallback);
    if let DeviceSource::Ip = cli.device {
        resolver = resolver.with_device(Arc::new(IpLocator::new(&config)));
    }

    // ── Dispatch ────────────────────────────────────────────────

    match cli.command {
        Command::Position { place_id, at } => {
            let input = match at.position().unwrap_or_else(|e| fail(e)) {
                Some(pos) => Some(PositionInput::Position(pos)),
                None => place_id.map(PositionInput::from),
            };
            print_json(&or_exit(resolver.resolve(input).await));
        }
        Command::Geocode { place_id, at } => {
            let query = place_query(place_id, &at);
            print_json(&or_exit(geocoder.geocode(query).await));
        }
        Command::Component { type_tag, place_id, at } => {
            let query = place_query(place_id, &at);
            let results = or_exit(geocoder.geocode(query).await);
            print_json(&extract(&results, &type_tag));
        }
        Command::SameCity { place_id, at } => {
            let current = match at.position().unwrap_or_else(|e| fail(e)) {
                Some(pos) => pos,
                None => fail("Provide --lat and --lon for the current position"),
            };
            let result = CityMatcher::new(geocoder).same_city(&place_id, current).await;
            print_json(&result);
        }
        Command::Serve { host, port } => {
            let state = AppState::new(geocoder, resolver);
            if let Err(e) = server::start(&host, port, state).await {
                fail(format!("Server failed on {}:{}: {}", host, port, e));
            }
        }
    }
}

fn place_query(place_id: Option<String>, at: &Coordinates) -> PlaceQuery {
    if let Some(pos) = at.position().unwrap_or_else(|e| fail(e)) {
        return PlaceQuery::ByLocation(pos);
    }
    match place_id {
        Some(id) => PlaceQuery::ByPlaceId(id),
        None => fail("Provide --place-id or --lat/--lon"),
    }
}

fn or_exit<T>(result: Result<T, GeoError>) -> T {
    result.unwrap_or_else(|e| fail(e.to_string()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Failed to encode output: {}", e)),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}
