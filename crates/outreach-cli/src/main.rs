mod campaign;
mod search;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "outreach")]
#[command(about = "Find nearby places and build outreach campaigns")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the countries offered by the directory service
    Countries,
    /// List the cities of a country
    Cities {
        /// Country name as returned by `countries`
        #[arg(long)]
        country: String,
    },
    /// Run a banded nearby search and print the enriched results
    Search {
        #[command(flatten)]
        search: SearchArgs,
        /// Write the results to this CSV file
        #[arg(long)]
        csv: Option<std::path::PathBuf>,
    },
    /// Search, then walk through method, link, and recipient selection
    Campaign {
        #[command(flatten)]
        search: SearchArgs,
        /// Delivery method: whatsapp, email, or sms
        #[arg(long)]
        method: String,
        /// Campaign link recipients will receive
        #[arg(long)]
        link: String,
        /// Place ID to include as a recipient (repeatable)
        #[arg(long = "recipient")]
        recipients: Vec<String>,
        /// Select every search result as a recipient
        #[arg(long, conflicts_with = "recipients")]
        all: bool,
    },
}

/// Location and search parameters shared by `search` and `campaign`.
#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(long)]
    country: String,
    /// City name; the first match wins when names repeat
    #[arg(long, required_unless_present = "city_index")]
    city: Option<String>,
    /// City position as listed by `cities`
    #[arg(long, conflicts_with = "city")]
    city_index: Option<usize>,
    /// Search radius in kilometers (0-10)
    #[arg(long, default_value = "0")]
    radius: f64,
    /// Free-text query, e.g. "restaurants"
    #[arg(long, default_value = "")]
    query: String,
    /// Results per request: 20, 40, or 60
    #[arg(long, default_value = "20")]
    limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("outreach: run `outreach --help` for available commands");
        return Ok(());
    };

    let config = outreach_core::load_app_config()?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let client = outreach_places::PlacesClient::new(&config)?;

    match command {
        Commands::Countries => search::run_countries(&client).await,
        Commands::Cities { country } => search::run_cities(&client, &country).await,
        Commands::Search { search, csv } => {
            search::run_search(&client, &search, csv.as_deref()).await
        }
        Commands::Campaign {
            search,
            method,
            link,
            recipients,
            all,
        } => {
            let request = campaign::CampaignRequest {
                method: &method,
                link: &link,
                recipients: &recipients,
                all,
            };
            campaign::run_campaign(&client, &search, &request).await
        }
    }
}
