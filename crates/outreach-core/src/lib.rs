pub mod app_config;
pub mod campaign;
pub mod config;
pub mod export;
pub mod places;
pub mod search;

use thiserror::Error;

pub use app_config::AppConfig;
pub use campaign::{
    has_required_info, CampaignLaunch, CampaignMethod, CampaignWizard, WizardError, WizardStep,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use export::{write_results_csv, ExportError, CSV_HEADERS};
pub use places::{merge_details, Category, City, Country, PlaceDetails, PlaceId, SearchResult};
pub use search::{partition_bands, Radius, RadiusBand, ResultLimit, BAND_COUNT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("radius must be between 0 and {max} km, got {value}")]
    InvalidRadius { value: f64, max: f64 },

    #[error("Please select either 20, 40, or 60 as the search limit.")]
    InvalidResultLimit(u32),

    #[error("unknown campaign method: {0}")]
    UnknownMethod(String),

    #[error(transparent)]
    Wizard(#[from] WizardError),
}
