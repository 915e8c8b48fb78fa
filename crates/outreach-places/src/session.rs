//! Search session controller.
//!
//! [`SearchSession`] is the single owner of everything a search screen shows:
//! country and city lists, the current selections and parameters, loading
//! flags, progress, collected identifiers, merged results, the persistent
//! error message, and a queue of transient notices. State changes only go
//! through its methods.
//!
//! Selecting a country invalidates the city list and selected city. Each city
//! fetch takes a generation ticket, and a response whose ticket is older than
//! the latest fetch is discarded.

use std::ops::{Deref, DerefMut};

use outreach_core::{City, Country, PlaceId, Radius, ResultLimit, SearchResult};

use crate::batch::{run_batch_search, BatchError, BatchOutcome, BatchProgress, BatchSearch};
use crate::client::PlacesClient;
use crate::error::PlacesError;

pub const MSG_COUNTRIES_LOADED: &str = "Countries loaded successfully!";
pub const MSG_COUNTRIES_FAILED: &str = "Failed to load countries.";
pub const MSG_CITIES_LOADED: &str = "Cities loaded successfully!";
pub const MSG_CITIES_FAILED: &str = "Failed to load cities.";
pub const MSG_CITY_REQUIRED: &str = "Please select a city before searching.";
pub const MSG_SEARCH_FAILED: &str = "An error occurred during the batch search.";
pub const MSG_DETAILS_FAILED: &str = "Failed to fetch detailed data.";
pub const MSG_NO_RESULTS: &str = "No results found in the specified range.";
pub const MSG_SEARCH_COMPLETED: &str = "Search completed successfully!";
pub const MSG_SEARCH_IN_PROGRESS: &str = "A search is already in progress.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Token tying a city response to the country selection that requested it.
#[derive(Debug)]
pub struct CityFetchTicket {
    generation: u64,
    country: Country,
}

impl CityFetchTicket {
    pub fn country(&self) -> &Country {
        &self.country
    }
}

#[derive(Debug, Default)]
pub struct SearchSession {
    countries: Vec<Country>,
    cities: Vec<City>,
    selected_country: Option<Country>,
    selected_city: Option<City>,
    radius: Radius,
    query: String,
    limit: ResultLimit,
    loading_countries: bool,
    loading_cities: bool,
    is_searching: bool,
    progress: Option<BatchProgress>,
    place_ids: Vec<PlaceId>,
    results: Vec<SearchResult>,
    error: Option<String>,
    notices: Vec<Notice>,
    city_generation: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn selected_country(&self) -> Option<&Country> {
        self.selected_country.as_ref()
    }

    pub fn selected_city(&self) -> Option<&City> {
        self.selected_city.as_ref()
    }

    pub fn radius(&self) -> Radius {
        self.radius
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> ResultLimit {
        self.limit
    }

    pub fn is_loading_countries(&self) -> bool {
        self.loading_countries
    }

    pub fn is_loading_cities(&self) -> bool {
        self.loading_cities
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn progress(&self) -> Option<BatchProgress> {
        self.progress
    }

    /// Identifiers collected by the last search, including those whose
    /// enrichment failed.
    pub fn place_ids(&self) -> &[PlaceId] {
        &self.place_ids
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Persistent error message from the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Take all pending notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the country list, replacing the current one on success.
    pub async fn load_countries(&mut self, client: &PlacesClient) {
        self.loading_countries = true;
        match client.list_countries().await {
            Ok(countries) => {
                tracing::info!(count = countries.len(), "countries loaded");
                self.countries = countries;
                self.notify(NoticeLevel::Success, MSG_COUNTRIES_LOADED);
            }
            Err(e) => self.fail("country list", MSG_COUNTRIES_FAILED, &e),
        }
        self.loading_countries = false;
    }

    /// Select `country` and reload its cities.
    pub async fn select_country(&mut self, client: &PlacesClient, country: Country) {
        let ticket = self.begin_city_fetch(country);
        let result = client.list_cities(&ticket.country.name).await;
        self.finish_city_fetch(ticket, result);
    }

    /// Switch the selected country and invalidate city state.
    ///
    /// The returned ticket must be handed to [`Self::finish_city_fetch`]
    /// together with the city response.
    pub fn begin_city_fetch(&mut self, country: Country) -> CityFetchTicket {
        self.city_generation += 1;
        self.selected_country = Some(country.clone());
        self.selected_city = None;
        self.cities.clear();
        self.loading_cities = true;
        CityFetchTicket {
            generation: self.city_generation,
            country,
        }
    }

    /// Apply a city response. Returns `false` if the ticket is stale and the
    /// response was ignored.
    pub fn finish_city_fetch(
        &mut self,
        ticket: CityFetchTicket,
        result: Result<Vec<City>, PlacesError>,
    ) -> bool {
        if ticket.generation != self.city_generation {
            tracing::debug!(
                country = %ticket.country.name,
                "discarding city list for superseded country selection"
            );
            return false;
        }

        match result {
            Ok(cities) => {
                tracing::info!(
                    country = %ticket.country.name,
                    count = cities.len(),
                    "cities loaded"
                );
                self.cities = cities;
                self.notify(NoticeLevel::Success, MSG_CITIES_LOADED);
            }
            Err(e) => self.fail("city list", MSG_CITIES_FAILED, &e),
        }
        self.loading_cities = false;
        true
    }

    /// Select a city from the current list by name (case-insensitive).
    ///
    /// The first match wins; use [`Self::select_city_at`] to pick among
    /// cities sharing a name. Returns `None` and leaves the selection
    /// unchanged when no city matches.
    pub fn select_city(&mut self, name: &str) -> Option<&City> {
        let wanted = name.trim();
        let mut matches = self
            .cities
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name.eq_ignore_ascii_case(wanted));
        let (index, _) = matches.next()?;
        let others = matches.count();
        if others > 0 {
            tracing::warn!(
                city = wanted,
                duplicates = others,
                "city name is ambiguous; selecting the first match"
            );
        }
        self.select_city_at(index)
    }

    /// Select the city at `index` in the current list.
    ///
    /// Returns `None` and leaves the selection unchanged when out of range.
    pub fn select_city_at(&mut self, index: usize) -> Option<&City> {
        let city = self.cities.get(index)?.clone();
        self.selected_city = Some(city);
        self.selected_city.as_ref()
    }

    pub fn set_radius(&mut self, radius: Radius) {
        self.radius = radius;
    }

    pub fn set_query(&mut self, query: &str) {
        query.clone_into(&mut self.query);
    }

    /// Set the per-request result limit.
    ///
    /// Values outside 20/40/60 leave the limit unchanged and queue an error
    /// notice. Returns whether the value was accepted.
    pub fn set_limit(&mut self, value: u32) -> bool {
        match ResultLimit::try_from(value) {
            Ok(limit) => {
                self.limit = limit;
                true
            }
            Err(e) => {
                tracing::warn!(value, "rejected search limit");
                self.notify(NoticeLevel::Error, &e.to_string());
                false
            }
        }
    }

    /// Run a batch search with the current parameters.
    pub async fn run_search(&mut self, client: &PlacesClient) {
        self.run_search_with_progress(client, |_| {}).await;
    }

    /// Run a batch search, forwarding every progress update to `on_progress`.
    ///
    /// Refused with an error notice while another search is running, and
    /// without a selected city; no request is made in either case. The
    /// searching flag is cleared when the search finishes or its future is
    /// dropped.
    pub async fn run_search_with_progress<F>(&mut self, client: &PlacesClient, mut on_progress: F)
    where
        F: FnMut(&BatchProgress),
    {
        if self.is_searching {
            tracing::warn!("search already in progress; ignoring request");
            self.notify(NoticeLevel::Error, MSG_SEARCH_IN_PROGRESS);
            return;
        }
        let Some(city) = self.selected_city.clone() else {
            self.notify(NoticeLevel::Error, MSG_CITY_REQUIRED);
            return;
        };

        let mut session = SearchInFlight::begin(self);
        session.place_ids.clear();
        session.results.clear();
        session.error = None;
        session.progress = None;

        let query = session.query.clone();
        let search = BatchSearch {
            city: &city,
            radius: session.radius,
            query: &query,
            limit: session.limit,
        };

        let progress = &mut session.progress;
        let outcome = run_batch_search(client, &search, |p| {
            *progress = Some(p);
            on_progress(&p);
        })
        .await;

        match outcome {
            Ok(BatchOutcome::NoResults) => {
                session.notify(NoticeLevel::Info, MSG_NO_RESULTS);
            }
            Ok(BatchOutcome::Enriched { results }) => {
                session.place_ids = results.iter().map(|r| r.place_id.clone()).collect();
                session.results = results;
                session.notify(NoticeLevel::Success, MSG_SEARCH_COMPLETED);
            }
            Ok(BatchOutcome::DetailsFailed { place_ids, error }) => {
                session.place_ids = place_ids;
                session.fail("place details", MSG_DETAILS_FAILED, &error);
            }
            Err(BatchError::Band {
                collected, source, ..
            }) => {
                session.place_ids = collected;
                session.fail("batch search", MSG_SEARCH_FAILED, &source);
            }
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push(Notice {
            level,
            message: message.to_string(),
        });
    }

    fn fail(&mut self, operation: &str, message: &str, error: &PlacesError) {
        tracing::error!(operation, error = %error, "{message}");
        self.error = Some(message.to_string());
        self.notify(NoticeLevel::Error, message);
    }
}

/// Holds the session's searching flag for the lifetime of one search.
struct SearchInFlight<'a> {
    session: &'a mut SearchSession,
}

impl<'a> SearchInFlight<'a> {
    fn begin(session: &'a mut SearchSession) -> Self {
        session.is_searching = true;
        Self { session }
    }
}

impl Deref for SearchInFlight<'_> {
    type Target = SearchSession;

    fn deref(&self) -> &SearchSession {
        self.session
    }
}

impl DerefMut for SearchInFlight<'_> {
    fn deref_mut(&mut self) -> &mut SearchSession {
        self.session
    }
}

impl Drop for SearchInFlight<'_> {
    fn drop(&mut self) {
        self.session.is_searching = false;
    }
}
