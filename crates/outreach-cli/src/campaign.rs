//! Campaign command handler: search, then walk the wizard to launch.

use outreach_core::{CampaignMethod, CampaignWizard, PlaceId, SearchResult, WizardStep};
use outreach_places::PlacesClient;
use qrcode::render::unicode;
use qrcode::{EcLevel, QrCode};

use crate::search::search_session;
use crate::SearchArgs;

pub(crate) struct CampaignRequest<'a> {
    pub(crate) method: &'a str,
    pub(crate) link: &'a str,
    pub(crate) recipients: &'a [String],
    pub(crate) all: bool,
}

pub(crate) async fn run_campaign(
    client: &PlacesClient,
    args: &SearchArgs,
    request: &CampaignRequest<'_>,
) -> anyhow::Result<()> {
    let method: CampaignMethod = request.method.parse()?;

    let session = search_session(client, args).await?;
    let results = session.results();

    let mut wizard = CampaignWizard::new();
    print_step(wizard.step());
    advance(&mut wizard, results)?;

    wizard.select_method(method);
    println!("  method: {method}");
    advance(&mut wizard, results)?;

    wizard.set_link(request.link);
    println!("  link: {}", wizard.link());
    println!("{}", render_qr(wizard.link())?);
    advance(&mut wizard, results)?;

    select_recipients(&mut wizard, results, request)?;
    let missing = wizard.recipients_missing_contact(results);
    if !missing.is_empty() {
        eprintln!(
            "warning: {} selected recipient(s) have no {} contact and will not be reached:",
            missing.len(),
            method.name()
        );
        for recipient in missing {
            eprintln!(
                "  {} ({})",
                recipient.place_id,
                recipient.name().unwrap_or("unnamed")
            );
        }
    }

    let launch = wizard.start(results)?;
    println!("{}", serde_json::to_string_pretty(&launch)?);
    Ok(())
}

fn advance(wizard: &mut CampaignWizard, results: &[SearchResult]) -> anyhow::Result<()> {
    let step = wizard.next(results)?;
    print_step(step);
    Ok(())
}

fn print_step(step: WizardStep) {
    println!("Step {step}");
}

fn select_recipients(
    wizard: &mut CampaignWizard,
    results: &[SearchResult],
    request: &CampaignRequest<'_>,
) -> anyhow::Result<()> {
    if request.all {
        wizard.toggle_all(results);
        println!("  selected all {} recipients", wizard.selected_recipients().len());
        return Ok(());
    }

    for raw in request.recipients {
        let id = PlaceId::new(raw.trim());
        if !results.iter().any(|r| r.place_id == id) {
            anyhow::bail!("place ID '{id}' is not among the search results");
        }
        if !wizard.selected_recipients().contains(&id) {
            wizard.toggle_recipient(&id);
        }
    }
    println!("  selected {} recipients", wizard.selected_recipients().len());
    Ok(())
}

/// Render `link` as a terminal QR code with high error correction.
pub(crate) fn render_qr(link: &str) -> anyhow::Result<String> {
    let code = QrCode::with_error_correction_level(link.as_bytes(), EcLevel::H)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}
