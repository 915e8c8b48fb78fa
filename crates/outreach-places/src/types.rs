//! Request and response bodies for the directory service and the places proxy.
//!
//! Response types default every collection so an absent or `null` field reads
//! as "nothing found" rather than a decode failure.

use serde::{Deserialize, Serialize};

use outreach_core::PlaceId;

// ---------------------------------------------------------------------------
// Directory service
// ---------------------------------------------------------------------------

/// `get-countries-v3` response: `{ "data": [ { "countries": [...] } ] }`.
#[derive(Debug, Default, Deserialize)]
pub struct CountriesResponse {
    #[serde(default)]
    pub data: Option<Vec<CountriesEntry>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountriesEntry {
    #[serde(default)]
    pub countries: Option<Vec<String>>,
}

/// `get-coords-v3` request body.
#[derive(Debug, Serialize)]
pub struct CitiesRequest<'a> {
    pub country: &'a str,
    pub query: &'a str,
    pub limit: u32,
    pub offset: u32,
}

/// `get-coords-v3` response. The first element of `data` is not a city.
#[derive(Debug, Default, Deserialize)]
pub struct CitiesResponse {
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Places proxy
// ---------------------------------------------------------------------------

/// `get-local-nearby-v2` request body. Radii are whole meters.
#[derive(Debug, Serialize)]
pub struct NearbySearchRequest<'a> {
    pub radius1: u32,
    pub radius2: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub query_string: &'a str,
    pub limit: u32,
    pub api_key: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub place_id_list: Option<Vec<PlaceId>>,
}

/// `get-details-list-stage1` request body.
///
/// Older clients sent the identifiers as `place_ids`; `place_id_list` is the
/// canonical name, matching the nearby-search response field.
#[derive(Debug, Serialize)]
pub struct DetailsRequest<'a> {
    pub place_id_list: &'a [PlaceId],
    pub center_loc: String,
    pub api_key: &'a str,
}

/// `get-details-list-stage1` response. The upstream field really is spelled
/// `succesful_results`.
#[derive(Debug, Default, Deserialize)]
pub struct DetailsResponse {
    #[serde(default, alias = "successful_results")]
    pub succesful_results: Option<Vec<serde_json::Value>>,
}
