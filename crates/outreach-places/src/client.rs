//! HTTP client for the country/city directory service and the places proxy.
//!
//! Both services take POST requests with JSON bodies. The directory service
//! authenticates with an `api_key` query parameter, the places proxy with an
//! `api_key` field in the request body. Non-2xx responses surface as
//! [`PlacesError::Http`]; nothing is retried.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use outreach_core::{AppConfig, City, Country, PlaceDetails, PlaceId, RadiusBand, ResultLimit};

use crate::error::PlacesError;
use crate::types::{
    CitiesRequest, CitiesResponse, CountriesResponse, DetailsRequest, DetailsResponse,
    NearbySearchRequest, NearbySearchResponse,
};

const COUNTRIES_PATH: &str = "get-countries-v3/";
const CITIES_PATH: &str = "get-coords-v3/";
const NEARBY_PATH: &str = "accounts/get-local-nearby-v2/";
const DETAILS_PATH: &str = "accounts/get-details-list-stage1/";

/// Page size for the city list. Large enough to return every city in one call.
pub const CITY_PAGE_LIMIT: u32 = 10_000;

/// Client for the directory service and the places proxy.
///
/// Holds one `reqwest::Client` and a base URL per service. Point the base
/// URLs at a mock server in tests through [`AppConfig`].
pub struct PlacesClient {
    client: Client,
    directory_base: Url,
    places_base: Url,
    directory_api_key: String,
    places_api_key: String,
}

impl PlacesClient {
    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if either
    /// base URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            directory_base: parse_base_url(&config.directory_base_url)?,
            places_base: parse_base_url(&config.places_base_url)?,
            directory_api_key: config.directory_api_key.clone(),
            places_api_key: config.places_api_key.clone(),
        })
    }

    /// Lists the countries the directory service knows about.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or non-2xx status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn list_countries(&self) -> Result<Vec<Country>, PlacesError> {
        let url = self.directory_url(COUNTRIES_PATH);
        let request = self.client.post(url);
        let body: CountriesResponse = Self::send_json(request, "get-countries-v3").await?;

        let countries = body
            .data
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|entry| entry.countries)
            .unwrap_or_default()
            .into_iter()
            .map(Country::new)
            .collect();
        Ok(countries)
    }

    /// Lists every city of `country`.
    ///
    /// The first element of the upstream list is a header record and is
    /// dropped. Records without a usable name and coordinates are skipped.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or non-2xx status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn list_cities(&self, country: &str) -> Result<Vec<City>, PlacesError> {
        let url = self.directory_url(CITIES_PATH);
        let payload = CitiesRequest {
            country,
            query: "all",
            limit: CITY_PAGE_LIMIT,
            offset: 0,
        };
        let request = self.client.post(url).json(&payload);
        let body: CitiesResponse =
            Self::send_json(request, &format!("get-coords-v3(country={country})")).await?;

        let cities = body
            .data
            .unwrap_or_default()
            .into_iter()
            .skip(1)
            .filter_map(|record| match serde_json::from_value::<City>(record) {
                Ok(city) => Some(city),
                Err(e) => {
                    tracing::debug!(country, error = %e, "skipping malformed city record");
                    None
                }
            })
            .collect();
        Ok(cities)
    }

    /// Runs one nearby search over a single radius band around `city`.
    ///
    /// Returns the identifiers in upstream order, or an empty list when the
    /// response carries none.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or non-2xx status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn nearby_search(
        &self,
        city: &City,
        band: RadiusBand,
        query: &str,
        limit: ResultLimit,
    ) -> Result<Vec<PlaceId>, PlacesError> {
        let url = self.places_url(NEARBY_PATH);
        let payload = NearbySearchRequest {
            radius1: band.start_m,
            radius2: band.end_m,
            center_lat: city.lat,
            center_lon: city.lon,
            query_string: query,
            limit: limit.value(),
            api_key: &self.places_api_key,
        };
        let request = self.client.post(url).json(&payload);
        let context = format!(
            "get-local-nearby-v2(radius={}..{})",
            band.start_m, band.end_m
        );
        let body: NearbySearchResponse = Self::send_json(request, &context).await?;
        Ok(body.place_id_list.unwrap_or_default())
    }

    /// Fetches detail records for `place_ids`, using `city` as the location
    /// context.
    ///
    /// Malformed records in the response are skipped; a missing result list
    /// is treated as empty.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or non-2xx status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn fetch_details(
        &self,
        place_ids: &[PlaceId],
        city: &City,
    ) -> Result<Vec<PlaceDetails>, PlacesError> {
        let url = self.places_url(DETAILS_PATH);
        let payload = DetailsRequest {
            place_id_list: place_ids,
            center_loc: city.center_loc(),
            api_key: &self.places_api_key,
        };
        let request = self.client.post(url).json(&payload);
        let body: DetailsResponse =
            Self::send_json(request, "get-details-list-stage1").await?;

        let details = body
            .succesful_results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<PlaceDetails>(record) {
                Ok(d) => Some(d),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed place detail record");
                    None
                }
            })
            .collect();
        Ok(details)
    }

    /// Directory endpoint URL with the `api_key` query parameter attached.
    fn directory_url(&self, path: &str) -> Url {
        let mut url = join(&self.directory_base, path);
        url.query_pairs_mut()
            .append_pair("api_key", &self.directory_api_key);
        url
    }

    fn places_url(&self, path: &str) -> Url {
        join(&self.places_base, path)
    }

    /// Sends the request, asserts a 2xx status, and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] on network failure or a non-2xx status.
    /// Returns [`PlacesError::Deserialize`] if the body does not parse.
    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, PlacesError> {
        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Parses `raw` and normalises it to end with exactly one slash, so relative
/// joins append to the path instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, PlacesError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!("{}{path}", base.path()));
    url
}
