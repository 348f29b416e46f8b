//! Structured project summary and the one-shot provider notification.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{RequirementSet, ServiceSet};
use crate::prompts;

/// Flat JSON view of a requirement set; absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub study_phase: Option<String>,
    pub therapeutic_area: Option<String>,
    pub services_needed: Option<ServiceSet>,
    pub patient_population: Option<String>,
    pub timeline: Option<String>,
}

impl ProjectSummary {
    /// Build the summary from collected requirements.
    pub fn from_requirements(requirements: &RequirementSet) -> Self {
        Self {
            study_phase: requirements.study_phase.map(|p| p.label().to_string()),
            therapeutic_area: requirements.therapeutic_area.map(|a| a.label().to_string()),
            services_needed: requirements.services_needed.clone(),
            patient_population: requirements
                .patient_population
                .map(|p| p.label().to_string()),
            timeline: requirements.timeline.clone(),
        }
    }

    /// Export as a single minified JSON line.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Label/value pairs for confirmation messages.
    pub fn display_lines(&self) -> Vec<(&'static str, String)> {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "not specified".into());
        vec![
            ("Study phase", show(&self.study_phase)),
            ("Therapeutic area", show(&self.therapeutic_area)),
            (
                "Services",
                self.services_needed
                    .as_ref()
                    .map(|s| s.iter().collect::<Vec<_>>().join(", "))
                    .unwrap_or_else(|| "not specified".into()),
            ),
            ("Patient population", show(&self.patient_population)),
            ("Timeline", show(&self.timeline)),
        ]
    }
}

/// A project handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDispatch {
    /// Unique dispatch ID
    pub dispatch_id: String,
    /// Conversation the project came from
    pub conversation_id: String,
    /// Selected provider
    pub provider: String,
    /// What was collected
    pub summary: ProjectSummary,
    /// Dispatch timestamp (RFC 3339)
    pub sent_at: String,
}

impl ProjectDispatch {
    pub fn new(conversation_id: &str, provider: &str, requirements: &RequirementSet) -> Self {
        Self {
            dispatch_id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            provider: provider.to_string(),
            summary: ProjectSummary::from_requirements(requirements),
            sent_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Confirmation shown to the user.
    pub fn confirmation(&self) -> String {
        prompts::project_sent(&self.provider, &self.summary.display_lines())
    }
}

/// Hands a project to a provider. Fire-and-forget: no acknowledgement is awaited.
pub trait Notifier: Send + Sync {
    fn notify(&self, dispatch: &ProjectDispatch);
}

/// Notifier that records the dispatch in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, dispatch: &ProjectDispatch) {
        let summary = dispatch
            .summary
            .to_json_line()
            .unwrap_or_else(|e| format!("<unserializable: {e}>"));
        info!(
            dispatch_id = %dispatch.dispatch_id,
            conversation = %dispatch.conversation_id,
            provider = %dispatch.provider,
            %summary,
            "project dispatched to provider"
        );
    }
}
