//! GeoNames place search, used to center proximity searches.

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::http::{get_json, with_params, Fetch};

use super::lenient;

pub const GEONAMES_URL: &str = "http://api.geonames.org/searchJSON";

/// Account used when none is configured.
pub const DEFAULT_USERNAME: &str = "dmrfill";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    total_results_count: u64,
    #[serde(default, deserialize_with = "lenient::list")]
    geonames: Vec<Place>,
    /// Present instead of results when the request was refused.
    status: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// The best match for a place name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Place {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub lat: String,
    #[serde(deserialize_with = "lenient::string")]
    pub lng: String,
    #[serde(rename = "adminName1", deserialize_with = "lenient::string")]
    pub admin_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub country_code: String,
}

/// Resolves a free-text location such as `Bangor, ME`.
pub fn locate(fetch: &dyn Fetch, query: &str, username: &str) -> Result<Place> {
    let url = with_params(
        GEONAMES_URL,
        [("q", query), ("maxRows", "1"), ("username", username)],
    )?;
    debug!("GeoNames URL {}", url);

    let response: Response = get_json(fetch, &url, "GeoNames")?;
    if let Some(status) = response.status {
        return Err(Error::Network {
            url: url.to_string(),
            message: status.message,
        });
    }
    debug!("GeoNames: {} results", response.total_results_count);
    let place = response
        .geonames
        .into_iter()
        .next()
        .ok_or_else(|| Error::LocationNotFound {
            query: query.to_string(),
        })?;
    info!(
        "Located '{}' at {}, {} ({}, {} {})",
        query, place.lat, place.lng, place.name, place.admin_name, place.country_code
    );
    Ok(place)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::StubFetch;

    const BANGOR: &str = r#"{"totalResultsCount": 412, "geonames": [{
        "adminCode1": "ME", "lng": "-68.77781", "geonameId": 4957280,
        "toponymName": "Bangor", "countryId": "6252001", "fcl": "P",
        "population": 31753, "countryCode": "US", "name": "Bangor",
        "fclName": "city, village,...", "adminName1": "Maine",
        "countryName": "United States", "fcodeName": "seat of a second-order administrative division",
        "lat": "44.80118", "fcode": "PPLA2"}]}"#;

    #[test]
    fn test_locate() {
        let stub = StubFetch::default().route(GEONAMES_URL, BANGOR);
        let place = locate(&stub, "Bangor, ME", DEFAULT_USERNAME).unwrap();
        assert_eq!(place.lat, "44.80118");
        assert_eq!(place.lng, "-68.77781");
        assert_eq!(place.admin_name, "Maine");
        assert_eq!(
            stub.requests.borrow()[0],
            "http://api.geonames.org/searchJSON?q=Bangor%2C+ME&maxRows=1&username=dmrfill"
        );
    }

    #[test]
    fn test_no_result() {
        let stub = StubFetch::default().route(GEONAMES_URL, r#"{"totalResultsCount": 0, "geonames": []}"#);
        let err = locate(&stub, "Nowhere", DEFAULT_USERNAME).unwrap_err();
        assert!(matches!(err, Error::LocationNotFound { ref query } if query == "Nowhere"));
    }

    #[test]
    fn test_refused_request() {
        let stub = StubFetch::default().route(
            GEONAMES_URL,
            r#"{"status": {"message": "user account not enabled to use the free webservice.", "value": 10}}"#,
        );
        let err = locate(&stub, "Bangor", "nobody").unwrap_err();
        assert!(err.to_string().contains("not enabled"));
    }
}
