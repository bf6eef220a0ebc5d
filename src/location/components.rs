//! Address-component lookup over geocode results.
//!
//! First match wins: results are scanned in provider order, and the
//! components of each result in their listed order.

use super::types::{AddressComponent, GeocodeResult};

/// Address-component type for a city-level division.
pub const LOCALITY: &str = "locality";
pub const COUNTRY: &str = "country";

/// Anything that can be searched for a typed address component.
pub trait ComponentSource {
    fn find_component(&self, tag: &str) -> Option<&AddressComponent>;
}

impl ComponentSource for [AddressComponent] {
    fn find_component(&self, tag: &str) -> Option<&AddressComponent> {
        self.iter().find(|c| c.has_type(tag))
    }
}

impl ComponentSource for [GeocodeResult] {
    fn find_component(&self, tag: &str) -> Option<&AddressComponent> {
        self.iter()
            .find_map(|r| r.address_components.find_component(tag))
    }
}

impl ComponentSource for GeocodeResult {
    fn find_component(&self, tag: &str) -> Option<&AddressComponent> {
        self.address_components.find_component(tag)
    }
}

impl<T> ComponentSource for Vec<T>
where
    [T]: ComponentSource,
{
    fn find_component(&self, tag: &str) -> Option<&AddressComponent> {
        self.as_slice().find_component(tag)
    }
}

impl<T: ComponentSource + ?Sized> ComponentSource for &T {
    fn find_component(&self, tag: &str) -> Option<&AddressComponent> {
        (**self).find_component(tag)
    }
}

impl<T: ComponentSource> ComponentSource for Option<T> {
    fn find_component(&self, tag: &str) -> Option<&AddressComponent> {
        self.as_ref().and_then(|s| s.find_component(tag))
    }
}

/// Find the first component tagged `tag`; `None` for an absent or empty source.
pub fn extract<'a, S>(source: &'a S, tag: &str) -> Option<&'a AddressComponent>
where
    S: ComponentSource + ?Sized,
{
    source.find_component(tag)
}

/// The result itself is a city.
pub fn is_city(result: &GeocodeResult) -> bool {
    result.types.iter().any(|t| t == LOCALITY)
}

/// The result itself is a country.
pub fn is_country(result: &GeocodeResult) -> bool {
    result.types.iter().any(|t| t == COUNTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::test_support::{component, result_with_components, result_with_locality};
    use crate::location::types::Position;

    #[test]
    fn test_empty_results_yield_none() {
        let results: Vec<GeocodeResult> = Vec::new();
        assert!(extract(&results, LOCALITY).is_none());
    }

    #[test]
    fn test_absent_source_yields_none() {
        let source: Option<&[AddressComponent]> = None;
        assert!(extract(&source, LOCALITY).is_none());
        let results: Option<Vec<GeocodeResult>> = None;
        assert!(extract(&results, LOCALITY).is_none());
    }

    #[test]
    fn test_match_in_second_result() {
        let results = vec![
            result_with_components(
                Position::new(30.0, 31.0),
                vec![component("Egypt", &["country", "political"])],
            ),
            result_with_locality(Position::new(30.0, 31.2), "Cairo"),
        ];

        let found = extract(&results, LOCALITY).unwrap();
        assert_eq!(found.long_name, "Cairo");
    }

    #[test]
    fn test_first_match_wins_across_results() {
        let results = vec![
            result_with_locality(Position::new(30.0, 31.2), "Cairo"),
            result_with_locality(Position::new(30.0, 31.2), "Giza"),
        ];
        assert_eq!(extract(&results, LOCALITY).unwrap().long_name, "Cairo");
    }

    #[test]
    fn test_first_match_wins_within_components() {
        let components = vec![
            component("Nasr City", &["sublocality", "political"]),
            component("Cairo", &["locality", "political"]),
            component("New Cairo", &["locality", "political"]),
        ];
        assert_eq!(extract(&components, LOCALITY).unwrap().long_name, "Cairo");
        assert_eq!(
            extract(components.as_slice(), "sublocality").unwrap().long_name,
            "Nasr City"
        );
    }

    #[test]
    fn test_missing_type_yields_none() {
        let results = vec![result_with_locality(Position::new(0.0, 0.0), "Cairo")];
        assert!(extract(&results, "postal_code").is_none());
    }

    #[test]
    fn test_city_and_country_kinds() {
        let mut city = result_with_locality(Position::new(30.0, 31.2), "Cairo");
        city.types = vec!["locality".into(), "political".into()];
        let mut country = result_with_locality(Position::new(26.8, 30.8), "Egypt");
        country.types = vec!["country".into(), "political".into()];

        assert!(is_city(&city));
        assert!(!is_country(&city));
        assert!(is_country(&country));
        assert!(!is_city(&country));
    }
}
