pub mod batch;
pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use batch::{
    collect_place_ids, run_batch_search, BatchError, BatchOutcome, BatchProgress, BatchSearch,
};
pub use client::{PlacesClient, CITY_PAGE_LIMIT};
pub use error::PlacesError;
pub use session::{CityFetchTicket, Notice, NoticeLevel, SearchSession};
