//! Action dispatch for the dialogue engine.
//!
//! The server keeps no per-conversation memory. Every request rebuilds the form
//! state from the tracker slots, runs one step of the core, and translates the
//! resulting [`FormEvent`]s back into slot instructions.

use cro_match_core::{
    CandidateValue, ConversationState, Field, FormController, FormEvent, LogNotifier, Notifier,
    ProjectDispatch, ProjectSummary, ProviderSelector, RequirementSet, ScoredMatch, Selection,
    TurnInput, TurnOutcome,
};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::protocol::{
    parse_request, ActionRequest, ActionResponse, ErrorResponse, ProtocolError, ProtocolResult,
    Tracker, WireEvent, CRO_NAME_SLOT, OFFERED_CROS_SLOT, PENDING_TIMELINE_SLOT, REQUESTED_SLOT,
};

/// Default name of the requirement form in the dialogue engine.
pub const DEFAULT_FORM_NAME: &str = "project_form";

pub const ACTION_MATCH_CROS: &str = "action_match_cros";
pub const ACTION_SEND_PROJECT: &str = "action_send_project";
pub const ACTION_PROJECT_SUMMARY: &str = "action_project_summary";
pub const ACTION_RESTART_PROJECT: &str = "action_restart_project";

/// Actions this server can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// `validate_<form>`: one form turn
    ValidateForm,
    MatchCros,
    SendProject,
    ProjectSummary,
    RestartProject,
}

impl ActionKind {
    /// Resolve an action name; the validation action is named after the form.
    pub fn from_name(name: &str, form_name: &str) -> Option<Self> {
        match name {
            ACTION_MATCH_CROS => Some(ActionKind::MatchCros),
            ACTION_SEND_PROJECT => Some(ActionKind::SendProject),
            ACTION_PROJECT_SUMMARY => Some(ActionKind::ProjectSummary),
            ACTION_RESTART_PROJECT => Some(ActionKind::RestartProject),
            _ if name.strip_prefix("validate_") == Some(form_name) => {
                Some(ActionKind::ValidateForm)
            }
            _ => None,
        }
    }
}

/// Runs custom actions on behalf of the dialogue engine.
pub struct ActionServer {
    controller: FormController,
    notifier: Box<dyn Notifier>,
    form_name: String,
}

impl ActionServer {
    pub fn new(controller: FormController) -> Self {
        Self {
            controller,
            notifier: Box::new(LogNotifier),
            form_name: DEFAULT_FORM_NAME.to_string(),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_form_name(mut self, form_name: impl Into<String>) -> Self {
        self.form_name = form_name.into();
        self
    }

    pub fn form_name(&self) -> &str {
        &self.form_name
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    /// Handle a raw JSON request and always produce a JSON reply.
    ///
    /// Failures come back as an [`ErrorResponse`] body instead of a response.
    pub fn handle_json(&self, json: &str) -> String {
        let (result, action_name) = match parse_request(json) {
            Ok(request) => {
                let name = request.next_action.clone();
                (self.handle(&request), Some(name))
            }
            Err(e) => (Err(e), None),
        };

        match result {
            Ok(response) => serde_json::to_string(&response).unwrap_or_else(|e| {
                error_body(&format!("failed to serialize response: {e}"), action_name)
            }),
            Err(e) => {
                warn!(error = %e, "action request failed");
                error_body(&e.to_string(), action_name)
            }
        }
    }

    /// Run the requested action.
    pub fn handle(&self, request: &ActionRequest) -> ProtocolResult<ActionResponse> {
        let _span = info_span!(
            "action",
            name = %request.next_action,
            sender = %request.sender_id
        )
        .entered();

        let kind = ActionKind::from_name(&request.next_action, &self.form_name)
            .ok_or_else(|| ProtocolError::UnknownAction(request.next_action.clone()))?;
        debug!(?kind, "dispatching action");

        Ok(match kind {
            ActionKind::ValidateForm => self.validate_form(request),
            ActionKind::MatchCros => self.match_cros(&request.tracker),
            ActionKind::SendProject => self.send_project(request),
            ActionKind::ProjectSummary => self.project_summary(&request.tracker),
            ActionKind::RestartProject => self.restart_project(&request.tracker),
        })
    }

    fn validate_form(&self, request: &ActionRequest) -> ActionResponse {
        let tracker = &request.tracker;
        let requested = tracker.requested_field();
        let mut requirements = RequirementSet::from_slots(&tracker.slots);
        let mut candidates = tracker.candidates();

        // The requested slot holds whatever the engine extracted this turn, not a
        // validated value.
        if let Some(field) = requested {
            if let Some(raw) = tracker
                .slots
                .get(field.slot_name())
                .and_then(CandidateValue::from_json)
            {
                candidates.entry(field).or_insert(raw);
            }
            requirements.unset(field);
        }

        let pending = tracker.pending_quantity();
        let mut state = ConversationState::resume(requirements, pending, requested);
        let restarting = tracker.intent_name() == Some(self.controller.restart_intent());

        let outcome = if requested.is_none() && pending.is_none() && !restarting {
            self.controller.start(&mut state)
        } else {
            let mut turn = TurnInput::new(request.sender_id.as_str(), tracker.text());
            if let Some(intent) = tracker.intent_name() {
                turn = turn.with_intent(intent);
            }
            turn.candidates = candidates;
            self.controller.handle_turn(&mut state, &turn)
        };

        self.to_response(outcome)
    }

    fn match_cros(&self, tracker: &Tracker) -> ActionResponse {
        let requirements = RequirementSet::from_slots(&tracker.slots);
        let matches = self.controller.rank(&requirements);
        info!(surfaced = matches.len(), "ranked providers on request");

        let mut response = ActionResponse::default();
        response.emit(offered_event(&matches));
        response.say(cro_match_core::prompts::ranked_matches(&matches));
        response
    }

    fn send_project(&self, request: &ActionRequest) -> ActionResponse {
        let tracker = &request.tracker;
        let mut response = ActionResponse::default();

        let requirements = RequirementSet::from_slots(&tracker.slots);
        if let Some(next) = requirements.next_missing() {
            debug!(%next, "send requested before the form was complete");
            response.say(cro_match_core::prompts::form_incomplete(next));
            return response;
        }

        let typed = tracker
            .text_slot(CRO_NAME_SLOT)
            .unwrap_or_else(|| tracker.text().trim());
        let offered = tracker.list_slot(OFFERED_CROS_SLOT);

        match ProviderSelector::new(self.controller.catalog()).select(typed, &offered) {
            Selection::Selected(provider) => {
                let dispatch = ProjectDispatch::new(&request.sender_id, &provider.name, &requirements);
                self.notifier.notify(&dispatch);
                response.emit(WireEvent::slot(
                    CRO_NAME_SLOT,
                    Value::String(provider.name.clone()),
                ));
                response.say(dispatch.confirmation());
            }
            Selection::Unknown { prompt } => {
                response.emit(WireEvent::slot(CRO_NAME_SLOT, Value::Null));
                response.say(prompt);
            }
        }
        response
    }

    fn project_summary(&self, tracker: &Tracker) -> ActionResponse {
        let summary = ProjectSummary::from_requirements(&RequirementSet::from_slots(&tracker.slots));
        let mut response = ActionResponse::default();
        match summary.to_json_line() {
            Ok(line) => response.say(line),
            Err(e) => warn!(error = %e, "could not serialize project summary"),
        }
        response
    }

    fn restart_project(&self, tracker: &Tracker) -> ActionResponse {
        let mut state = ConversationState::resume(
            RequirementSet::from_slots(&tracker.slots),
            tracker.pending_quantity(),
            tracker.requested_field(),
        );
        let outcome = self.controller.restart(&mut state);
        self.to_response(outcome)
    }

    /// Translate a core outcome into wire events and messages.
    fn to_response(&self, outcome: TurnOutcome) -> ActionResponse {
        let mut response = ActionResponse::default();

        for event in outcome.events {
            match event {
                FormEvent::SlotSet { field, value } => response.emit(WireEvent::slot(
                    field.slot_name(),
                    value.map(|v| v.to_json()).unwrap_or(Value::Null),
                )),
                FormEvent::AllSlotsCleared => {
                    for field in Field::ORDER {
                        response.emit(WireEvent::slot(field.slot_name(), Value::Null));
                    }
                    response.emit(WireEvent::slot(CRO_NAME_SLOT, Value::Null));
                    response.emit(WireEvent::slot(OFFERED_CROS_SLOT, Value::Null));
                    response.emit(WireEvent::ActiveLoop {
                        name: Some(self.form_name.clone()),
                    });
                }
                FormEvent::PendingTimelineSet(quantity) => {
                    response.emit(WireEvent::slot(PENDING_TIMELINE_SLOT, Value::from(quantity)))
                }
                FormEvent::PendingTimelineCleared => {
                    response.emit(WireEvent::slot(PENDING_TIMELINE_SLOT, Value::Null))
                }
                FormEvent::FieldRequested(field) => response.emit(WireEvent::slot(
                    REQUESTED_SLOT,
                    Value::String(field.slot_name().to_string()),
                )),
                FormEvent::FormCompleted => {
                    response.emit(WireEvent::slot(REQUESTED_SLOT, Value::Null));
                    response.emit(WireEvent::ActiveLoop { name: None });
                }
            }
        }

        if !outcome.matches.is_empty() {
            response.emit(offered_event(&outcome.matches));
        }

        for message in outcome.messages {
            response.say(message);
        }
        response
    }
}

fn offered_event(matches: &[ScoredMatch]) -> WireEvent {
    WireEvent::slot(
        OFFERED_CROS_SLOT,
        Value::Array(
            matches
                .iter()
                .map(|m| Value::String(m.provider.clone()))
                .collect(),
        ),
    )
}

fn error_body(error: &str, action_name: Option<String>) -> String {
    let body = ErrorResponse {
        error: error.to_string(),
        action_name,
    };
    serde_json::to_string(&body).unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
}
