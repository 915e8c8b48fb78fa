//! Banded nearby search followed by a single details enrichment call.
//!
//! The nearby-search endpoint caps results per request, so the search radius
//! is split into [`BAND_COUNT`] rings that are queried one after another.
//! Identifiers are appended in band order without deduplication. A failing
//! band stops the run; a failing details call keeps the identifiers.

use thiserror::Error;

use outreach_core::{
    merge_details, partition_bands, City, PlaceId, Radius, RadiusBand, ResultLimit, SearchResult,
    BAND_COUNT,
};

use crate::client::PlacesClient;
use crate::error::PlacesError;

/// Inputs for one batch search.
#[derive(Debug, Clone, Copy)]
pub struct BatchSearch<'a> {
    pub city: &'a City,
    pub radius: Radius,
    pub query: &'a str,
    pub limit: ResultLimit,
}

/// Progress reported while a batch search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchProgress {
    /// About to request `band` (zero-based `band.index`) of `total`.
    Searching { band: RadiusBand, total: u32 },
    /// `completed` bands have returned; `collected` identifiers so far.
    BandComplete {
        completed: u32,
        total: u32,
        collected: usize,
    },
    /// Requesting details for `place_count` identifiers.
    FetchingDetails { place_count: usize },
}

impl std::fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchProgress::Searching { band, total } => write!(
                f,
                "Searching band {} of {total} ({}-{} m)",
                band.index + 1,
                band.start_m,
                band.end_m
            ),
            BatchProgress::BandComplete {
                completed,
                total,
                collected,
            } => write!(
                f,
                "Processed band {completed} of {total}, {collected} places so far"
            ),
            BatchProgress::FetchingDetails { place_count } => {
                write!(f, "Fetching details for {place_count} locations")
            }
        }
    }
}

/// How a batch search that got past the band phase ended.
#[derive(Debug)]
pub enum BatchOutcome {
    /// No band returned any identifier; details were not requested.
    NoResults,
    /// Every identifier mapped through the details lookup, in band order.
    Enriched { results: Vec<SearchResult> },
    /// The details call failed; the collected identifiers are kept.
    DetailsFailed {
        place_ids: Vec<PlaceId>,
        error: PlacesError,
    },
}

#[derive(Debug, Error)]
pub enum BatchError {
    /// Band `band` (one-based) failed. `collected` holds identifiers from the
    /// bands before it only.
    #[error("search band {band} of {total} failed: {source}")]
    Band {
        band: u32,
        total: u32,
        collected: Vec<PlaceId>,
        #[source]
        source: PlacesError,
    },
}

/// Query every band in sequence and concatenate the identifiers.
///
/// # Errors
///
/// Returns [`BatchError::Band`] for the first band that fails; later bands are
/// never requested.
pub async fn collect_place_ids<P>(
    client: &PlacesClient,
    search: &BatchSearch<'_>,
    progress: &mut P,
) -> Result<Vec<PlaceId>, BatchError>
where
    P: FnMut(BatchProgress),
{
    let mut collected: Vec<PlaceId> = Vec::new();

    for band in partition_bands(search.radius) {
        progress(BatchProgress::Searching {
            band,
            total: BAND_COUNT,
        });
        tracing::debug!(
            band = band.index + 1,
            total = BAND_COUNT,
            start_m = band.start_m,
            end_m = band.end_m,
            "requesting nearby search band"
        );

        let ids = match client
            .nearby_search(search.city, band, search.query, search.limit)
            .await
        {
            Ok(ids) => ids,
            Err(source) => {
                tracing::error!(
                    band = band.index + 1,
                    total = BAND_COUNT,
                    error = %source,
                    "nearby search band failed; aborting remaining bands"
                );
                return Err(BatchError::Band {
                    band: band.index + 1,
                    total: BAND_COUNT,
                    collected,
                    source,
                });
            }
        };

        collected.extend(ids);
        progress(BatchProgress::BandComplete {
            completed: band.index + 1,
            total: BAND_COUNT,
            collected: collected.len(),
        });
    }

    Ok(collected)
}

/// Run the full pipeline: banded identifier collection, then one details call.
///
/// # Errors
///
/// Returns [`BatchError::Band`] when any band fails. A details failure is not
/// an error here; it is reported as [`BatchOutcome::DetailsFailed`].
pub async fn run_batch_search<P>(
    client: &PlacesClient,
    search: &BatchSearch<'_>,
    mut progress: P,
) -> Result<BatchOutcome, BatchError>
where
    P: FnMut(BatchProgress),
{
    tracing::info!(
        city = %search.city.name,
        radius = %search.radius,
        query = search.query,
        limit = search.limit.value(),
        "starting batch search"
    );

    let place_ids = collect_place_ids(client, search, &mut progress).await?;
    if place_ids.is_empty() {
        tracing::info!(city = %search.city.name, "batch search found no places");
        return Ok(BatchOutcome::NoResults);
    }

    progress(BatchProgress::FetchingDetails {
        place_count: place_ids.len(),
    });

    match client.fetch_details(&place_ids, search.city).await {
        Ok(details) => {
            let matched = details.len();
            let results = merge_details(&place_ids, details);
            tracing::info!(
                places = results.len(),
                detail_records = matched,
                "batch search completed"
            );
            Ok(BatchOutcome::Enriched { results })
        }
        Err(error) => {
            tracing::error!(
                places = place_ids.len(),
                error = %error,
                "details fetch failed; keeping collected identifiers"
            );
            Ok(BatchOutcome::DetailsFailed { place_ids, error })
        }
    }
}
