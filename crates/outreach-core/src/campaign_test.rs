use super::*;
use crate::places::PlaceDetails;

fn result(id: &str, phone: Option<&str>, email: Option<&str>) -> SearchResult {
    SearchResult {
        place_id: PlaceId::new(id),
        details: Some(PlaceDetails {
            place_id: PlaceId::new(id),
            place_name: Some(format!("Place {id}")),
            category: None,
            address: None,
            rating: None,
            phone: phone.map(str::to_string),
            website: None,
            email: email.map(str::to_string),
        }),
    }
}

fn sample_results() -> Vec<SearchResult> {
    vec![
        result("A", Some("+1 555 0100"), None),
        result("B", None, Some("b@example.com")),
    ]
}

/// Drives a fresh wizard up to the recipient step.
fn wizard_at_recipients(results: &[SearchResult]) -> CampaignWizard {
    let mut wizard = CampaignWizard::new();
    wizard.next(results).unwrap();
    wizard.select_method(CampaignMethod::WhatsApp);
    wizard.next(results).unwrap();
    wizard.set_link("https://example.com/promo");
    wizard.next(results).unwrap();
    wizard
}

#[test]
fn starts_on_location_step() {
    let wizard = CampaignWizard::new();
    assert_eq!(wizard.step(), WizardStep::Location);
    assert_eq!(wizard.step().number(), 1);
}

#[test]
fn location_step_requires_results() {
    let mut wizard = CampaignWizard::new();
    assert_eq!(
        wizard.next(&[]),
        Err(WizardError::StepIncomplete(WizardStep::Location))
    );
    assert_eq!(wizard.step(), WizardStep::Location);
}

#[test]
fn method_step_requires_a_method() {
    let results = sample_results();
    let mut wizard = CampaignWizard::new();
    wizard.next(&results).unwrap();
    assert!(!wizard.can_advance(&results));
    wizard.select_method(CampaignMethod::Email);
    assert_eq!(wizard.next(&results), Ok(WizardStep::Link));
}

#[test]
fn link_step_rejects_blank_link() {
    let results = sample_results();
    let mut wizard = CampaignWizard::new();
    wizard.next(&results).unwrap();
    wizard.select_method(CampaignMethod::Sms);
    wizard.next(&results).unwrap();
    wizard.set_link("   ");
    assert_eq!(
        wizard.next(&results),
        Err(WizardError::StepIncomplete(WizardStep::Link))
    );
    wizard.set_link(" https://example.com ");
    assert_eq!(wizard.link(), "https://example.com");
    assert_eq!(wizard.next(&results), Ok(WizardStep::Recipients));
}

#[test]
fn recipient_step_cannot_advance_past_end() {
    let results = sample_results();
    let mut wizard = wizard_at_recipients(&results);
    wizard.toggle_recipient(&PlaceId::new("A"));
    assert_eq!(wizard.next(&results), Err(WizardError::AtLastStep));
}

#[test]
fn back_is_unconditional_and_stops_at_first_step() {
    let results = sample_results();
    let mut wizard = wizard_at_recipients(&results);
    assert_eq!(wizard.back(), WizardStep::Link);
    assert_eq!(wizard.back(), WizardStep::Method);
    assert_eq!(wizard.back(), WizardStep::Location);
    assert_eq!(wizard.back(), WizardStep::Location);
}

#[test]
fn toggle_recipient_adds_then_removes() {
    let mut wizard = CampaignWizard::new();
    let a = PlaceId::new("A");
    wizard.toggle_recipient(&a);
    assert_eq!(wizard.selected_recipients(), &[a.clone()]);
    wizard.toggle_recipient(&a);
    assert!(wizard.selected_recipients().is_empty());
}

#[test]
fn toggle_all_selects_then_clears() {
    let results = sample_results();
    let mut wizard = CampaignWizard::new();
    wizard.toggle_recipient(&PlaceId::new("B"));

    wizard.toggle_all(&results);
    assert!(wizard.all_selected(&results));
    assert_eq!(
        wizard.selected_recipients(),
        &[PlaceId::new("A"), PlaceId::new("B")]
    );

    wizard.toggle_all(&results);
    assert!(wizard.selected_recipients().is_empty());
}

#[test]
fn toggle_all_selects_duplicate_ids_once() {
    let results = vec![
        result("A", None, None),
        result("B", None, None),
        result("A", None, None),
    ];
    let mut wizard = CampaignWizard::new();
    wizard.toggle_all(&results);
    assert_eq!(wizard.selected_recipients().len(), 2);
    assert!(wizard.all_selected(&results));
}

#[test]
fn start_requires_final_step() {
    let results = sample_results();
    let wizard = CampaignWizard::new();
    assert!(matches!(
        wizard.start(&results),
        Err(WizardError::NotAtFinalStep(WizardStep::Location))
    ));
}

#[test]
fn start_requires_a_recipient() {
    let results = sample_results();
    let wizard = wizard_at_recipients(&results);
    assert!(matches!(
        wizard.start(&results),
        Err(WizardError::StepIncomplete(WizardStep::Recipients))
    ));
}

#[test]
fn start_returns_launch_summary() {
    let results = sample_results();
    let mut wizard = wizard_at_recipients(&results);
    wizard.toggle_recipient(&PlaceId::new("B"));

    let launch = wizard.start(&results).expect("campaign should start");
    assert_eq!(launch.method, CampaignMethod::WhatsApp);
    assert_eq!(launch.link, "https://example.com/promo");
    assert_eq!(launch.recipients, vec![PlaceId::new("B")]);
}

#[test]
fn required_info_depends_on_method() {
    let results = sample_results();
    assert!(has_required_info(&results[0], CampaignMethod::WhatsApp));
    assert!(has_required_info(&results[0], CampaignMethod::Sms));
    assert!(!has_required_info(&results[0], CampaignMethod::Email));
    assert!(has_required_info(&results[1], CampaignMethod::Email));
    assert!(!has_required_info(
        &SearchResult::identifier_only(PlaceId::new("C")),
        CampaignMethod::Sms
    ));
}

#[test]
fn missing_contact_lists_selected_recipients_without_info() {
    let results = sample_results();
    let mut wizard = wizard_at_recipients(&results);
    wizard.toggle_all(&results);
    let missing = wizard.recipients_missing_contact(&results);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].place_id, PlaceId::new("B"));
}

#[test]
fn method_parses_case_insensitively() {
    assert_eq!(
        "WhatsApp".parse::<CampaignMethod>(),
        Ok(CampaignMethod::WhatsApp)
    );
    assert_eq!(" sms ".parse::<CampaignMethod>(), Ok(CampaignMethod::Sms));
    assert_eq!(
        "pigeon".parse::<CampaignMethod>(),
        Err(CoreError::UnknownMethod("pigeon".to_string()))
    );
}
