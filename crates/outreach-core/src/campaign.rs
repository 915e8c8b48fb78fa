//! Manual outreach-campaign wizard.
//!
//! A four-step linear state machine: pick a location and run a search, choose
//! a delivery method, enter the campaign link, then select recipients from the
//! search results. Moving forward is gated on the current step being complete;
//! moving back is always allowed. Starting the campaign only produces a
//! [`CampaignLaunch`] record, nothing is sent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::places::{PlaceId, SearchResult};
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WizardStep {
    Location,
    Method,
    Link,
    Recipients,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Location,
        WizardStep::Method,
        WizardStep::Link,
        WizardStep::Recipients,
    ];

    /// One-based position, as shown to the user.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Location => 1,
            WizardStep::Method => 2,
            WizardStep::Link => 3,
            WizardStep::Recipients => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Location => "Select Location",
            WizardStep::Method => "Choose Method",
            WizardStep::Link => "Campaign Link",
            WizardStep::Recipients => "Select Recipients",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            WizardStep::Location => Some(WizardStep::Method),
            WizardStep::Method => Some(WizardStep::Link),
            WizardStep::Link => Some(WizardStep::Recipients),
            WizardStep::Recipients => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Location => None,
            WizardStep::Method => Some(WizardStep::Location),
            WizardStep::Link => Some(WizardStep::Method),
            WizardStep::Recipients => Some(WizardStep::Link),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignMethod {
    WhatsApp,
    Email,
    Sms,
}

impl CampaignMethod {
    pub const ALL: [CampaignMethod; 3] = [
        CampaignMethod::WhatsApp,
        CampaignMethod::Email,
        CampaignMethod::Sms,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CampaignMethod::WhatsApp => "whatsapp",
            CampaignMethod::Email => "email",
            CampaignMethod::Sms => "sms",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CampaignMethod::WhatsApp => "WhatsApp",
            CampaignMethod::Email => "Email",
            CampaignMethod::Sms => "SMS",
        }
    }
}

impl fmt::Display for CampaignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CampaignMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| CoreError::UnknownMethod(s.to_string()))
    }
}

/// Whether `recipient` has the contact field `method` delivers to.
///
/// `WhatsApp` and SMS need a phone number, email needs an address.
pub fn has_required_info(recipient: &SearchResult, method: CampaignMethod) -> bool {
    match method {
        CampaignMethod::WhatsApp | CampaignMethod::Sms => recipient.phone().is_some(),
        CampaignMethod::Email => recipient.email().is_some(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("step {0} is not complete")]
    StepIncomplete(WizardStep),

    #[error("already at the last step")]
    AtLastStep,

    #[error("campaign can only start from the recipient step, currently at {0}")]
    NotAtFinalStep(WizardStep),
}

/// Summary of a started campaign.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignLaunch {
    pub id: Uuid,
    pub method: CampaignMethod,
    pub link: String,
    pub recipients: Vec<PlaceId>,
    pub launched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CampaignWizard {
    step: WizardStep,
    method: Option<CampaignMethod>,
    link: String,
    selected: Vec<PlaceId>,
}

impl Default for CampaignWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Location,
            method: None,
            link: String::new(),
            selected: Vec::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn method(&self) -> Option<CampaignMethod> {
        self.method
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn selected_recipients(&self) -> &[PlaceId] {
        &self.selected
    }

    pub fn select_method(&mut self, method: CampaignMethod) {
        self.method = Some(method);
    }

    pub fn set_link(&mut self, link: &str) {
        link.trim().clone_into(&mut self.link);
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle_recipient(&mut self, id: &PlaceId) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.clone());
        }
    }

    /// Select every recipient, or clear the selection when all are already
    /// selected. Duplicate identifiers in `recipients` are selected once.
    pub fn toggle_all(&mut self, recipients: &[SearchResult]) {
        if self.all_selected(recipients) {
            self.selected.clear();
            return;
        }
        self.selected.clear();
        for recipient in recipients {
            if !self.selected.contains(&recipient.place_id) {
                self.selected.push(recipient.place_id.clone());
            }
        }
    }

    /// True when `recipients` is non-empty and every identifier is selected.
    pub fn all_selected(&self, recipients: &[SearchResult]) -> bool {
        !recipients.is_empty()
            && recipients
                .iter()
                .all(|r| self.selected.contains(&r.place_id))
    }

    /// Selected recipients that lack the contact field for the chosen method.
    pub fn recipients_missing_contact<'a>(
        &self,
        recipients: &'a [SearchResult],
    ) -> Vec<&'a SearchResult> {
        let Some(method) = self.method else {
            return Vec::new();
        };
        let mut missing: Vec<&'a SearchResult> = Vec::new();
        for recipient in recipients {
            if self.selected.contains(&recipient.place_id)
                && !has_required_info(recipient, method)
                && !missing.iter().any(|m| m.place_id == recipient.place_id)
            {
                missing.push(recipient);
            }
        }
        missing
    }

    /// Completeness predicate for the current step.
    pub fn can_advance(&self, results: &[SearchResult]) -> bool {
        match self.step {
            WizardStep::Location => !results.is_empty(),
            WizardStep::Method => self.method.is_some(),
            WizardStep::Link => !self.link.is_empty(),
            WizardStep::Recipients => !self.selected.is_empty(),
        }
    }

    /// Move to the next step.
    ///
    /// # Errors
    ///
    /// [`WizardError::StepIncomplete`] when the current step's predicate does
    /// not hold, [`WizardError::AtLastStep`] on the recipient step.
    pub fn next(&mut self, results: &[SearchResult]) -> Result<WizardStep, WizardError> {
        let next = self.step.next().ok_or(WizardError::AtLastStep)?;
        if !self.can_advance(results) {
            return Err(WizardError::StepIncomplete(self.step));
        }
        self.step = next;
        Ok(next)
    }

    /// Move to the previous step. Stays put on the first step.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Start the campaign from the recipient step.
    ///
    /// # Errors
    ///
    /// [`WizardError::NotAtFinalStep`] before the recipient step,
    /// [`WizardError::StepIncomplete`] when no recipient is selected.
    pub fn start(&self, results: &[SearchResult]) -> Result<CampaignLaunch, WizardError> {
        if self.step != WizardStep::Recipients {
            return Err(WizardError::NotAtFinalStep(self.step));
        }
        if !self.can_advance(results) {
            return Err(WizardError::StepIncomplete(self.step));
        }
        let method = self
            .method
            .ok_or(WizardError::StepIncomplete(WizardStep::Method))?;

        let launch = CampaignLaunch {
            id: Uuid::new_v4(),
            method,
            link: self.link.clone(),
            recipients: self.selected.clone(),
            launched_at: Utc::now(),
        };
        tracing::info!(
            campaign_id = %launch.id,
            method = method.id(),
            link = %launch.link,
            recipients = launch.recipients.len(),
            "campaign started"
        );
        Ok(launch)
    }
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
