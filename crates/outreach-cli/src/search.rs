//! Directory and search command handlers.
//!
//! Each handler drives a [`SearchSession`] the same way an interactive
//! front-end would: load countries, pick one, pick a city, set parameters,
//! then run the banded search. Session notices are echoed to stderr as they
//! are produced.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use outreach_core::{write_results_csv, Radius, SearchResult};
use outreach_places::{Notice, NoticeLevel, PlacesClient, SearchSession};

use crate::SearchArgs;

/// How the search city is picked from the country's city list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CityChoice<'a> {
    Name(&'a str),
    Index(usize),
}

impl SearchArgs {
    pub(crate) fn city_choice(&self) -> Option<CityChoice<'_>> {
        match (self.city_index, self.city.as_deref()) {
            (Some(index), _) => Some(CityChoice::Index(index)),
            (None, Some(name)) => Some(CityChoice::Name(name)),
            (None, None) => None,
        }
    }
}

pub(crate) async fn run_countries(client: &PlacesClient) -> anyhow::Result<()> {
    let mut session = SearchSession::new();
    session.load_countries(client).await;
    print_notices(&mut session);
    if let Some(err) = session.error() {
        anyhow::bail!("{err}");
    }

    for country in session.countries() {
        println!("{}", country.name);
    }
    Ok(())
}

pub(crate) async fn run_cities(client: &PlacesClient, country: &str) -> anyhow::Result<()> {
    let mut session = SearchSession::new();
    select_location(client, &mut session, country, None).await?;

    println!("{:>6} {:<32} {:>10} {:>11}", "Index", "City", "Lat", "Lon");
    for (index, city) in session.cities().iter().enumerate() {
        println!(
            "{index:>6} {:<32} {:>10.4} {:>11.4}",
            city.name, city.lat, city.lon
        );
    }
    Ok(())
}

pub(crate) async fn run_search(
    client: &PlacesClient,
    args: &SearchArgs,
    csv: Option<&Path>,
) -> anyhow::Result<()> {
    let session = search_session(client, args).await?;

    print_results(session.results());
    if let Some(path) = csv {
        let file = File::create(path)?;
        write_results_csv(BufWriter::new(file), session.results())?;
        println!("wrote {} rows to {}", session.results().len(), path.display());
    }
    Ok(())
}

/// Build a session for `args` and run the search to completion.
///
/// Fails when the location cannot be resolved, the parameters are rejected,
/// or the search itself fails. A search that finds nothing is not an error.
pub(crate) async fn search_session(
    client: &PlacesClient,
    args: &SearchArgs,
) -> anyhow::Result<SearchSession> {
    let radius = Radius::from_km(args.radius)?;

    let mut session = SearchSession::new();
    let Some(city) = args.city_choice() else {
        anyhow::bail!("either --city or --city-index is required");
    };
    select_location(client, &mut session, &args.country, Some(city)).await?;

    session.set_radius(radius);
    session.set_query(&args.query);
    if !session.set_limit(args.limit) {
        print_notices(&mut session);
        anyhow::bail!("invalid search limit {}", args.limit);
    }

    session
        .run_search_with_progress(client, |progress| eprintln!("  {progress}"))
        .await;
    print_notices(&mut session);

    if let Some(err) = session.error() {
        if !session.place_ids().is_empty() {
            eprintln!(
                "{} place IDs were collected before the failure",
                session.place_ids().len()
            );
        }
        anyhow::bail!("{err}");
    }
    Ok(session)
}

async fn select_location(
    client: &PlacesClient,
    session: &mut SearchSession,
    country: &str,
    city: Option<CityChoice<'_>>,
) -> anyhow::Result<()> {
    session.load_countries(client).await;
    print_notices(session);
    if let Some(err) = session.error() {
        anyhow::bail!("{err}");
    }

    let Some(country) = session
        .countries()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(country.trim()))
        .cloned()
    else {
        anyhow::bail!("unknown country '{country}'; run `outreach countries` to list them");
    };

    session.select_country(client, country.clone()).await;
    print_notices(session);
    if let Some(err) = session.error() {
        anyhow::bail!("{err}");
    }

    match city {
        Some(CityChoice::Name(name)) => {
            if session.select_city(name).is_none() {
                anyhow::bail!(
                    "unknown city '{name}' in {}; run `outreach cities --country \"{}\"` to list them",
                    country.name,
                    country.name
                );
            }
        }
        Some(CityChoice::Index(index)) => {
            let count = session.cities().len();
            if session.select_city_at(index).is_none() {
                anyhow::bail!(
                    "city index {index} is out of range; {} has {count} cities",
                    country.name
                );
            }
        }
        None => {}
    }
    Ok(())
}

fn print_notices(session: &mut SearchSession) {
    for notice in session.drain_notices() {
        eprintln!("{}", format_notice(&notice));
    }
}

pub(crate) fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        return;
    }
    println!(
        "{:<4} {:<28} {:<36} {:<18} {:<28}",
        "#", "Place ID", "Name", "Phone", "Email"
    );
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:<4} {:<28} {:<36} {:<18} {:<28}",
            i + 1,
            result.place_id,
            result.name().unwrap_or("-"),
            result.phone().unwrap_or("-"),
            result.email().unwrap_or("-"),
        );
    }
}
