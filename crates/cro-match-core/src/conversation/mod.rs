//! Conversation state controller for the requirement form.
//!
//! ```text
//!              restart intent (any state)
//!        ┌───────────────────────────────────────┐
//!        ▼                                       │
//!  Collecting(field) ── accepted ──► Collecting(next) ── all filled ──► Complete
//!        │                                                                 │
//!        │ bare number for timeline                                  Scoring Engine
//!        ▼
//!  AwaitingTimelineUnit ── unit word ──► Collecting(next after timeline)
//!        │    ▲
//!        └────┘ no unit word (re-prompt)
//! ```
//!
//! The controller only reacts to inbound turns; turn pacing and session expiry
//! belong to the dialogue engine.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span};

use crate::catalog::Catalog;
use crate::models::{CandidateValue, Field, RequirementSet, ScoredMatch, SlotValue};
use crate::prompts;
use crate::scoring::Scorer;
use crate::validator::{SlotValidator, TimelineNormalizer, Validation};

/// Intent name that restarts the form.
pub const DEFAULT_RESTART_INTENT: &str = "start_new_project";

/// Where the form currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Waiting for a value for this field.
    Collecting(Field),
    /// A bare number was given for the timeline; waiting for its unit.
    AwaitingTimelineUnit { quantity: u32 },
    /// Every field is filled.
    Complete,
}

/// Per-conversation state. Never shared between conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub requirements: RequirementSet,
    pub phase: FormPhase,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Fresh form positioned at the first field.
    pub fn new() -> Self {
        Self {
            requirements: RequirementSet::new(),
            phase: FormPhase::Collecting(Field::ORDER[0]),
        }
    }

    /// Rebuild state from the dialogue engine's slot store.
    ///
    /// A pending quantity wins over a stored timeline; otherwise the requested
    /// field is resumed if still missing, then the first missing field.
    pub fn resume(
        mut requirements: RequirementSet,
        pending_quantity: Option<u32>,
        requested: Option<Field>,
    ) -> Self {
        let phase = if let Some(quantity) = pending_quantity {
            requirements.timeline = None;
            FormPhase::AwaitingTimelineUnit { quantity }
        } else {
            match requested {
                Some(field) if !requirements.is_set(field) => FormPhase::Collecting(field),
                _ => match requirements.next_missing() {
                    Some(field) => FormPhase::Collecting(field),
                    None => FormPhase::Complete,
                },
            }
        };
        Self {
            requirements,
            phase,
        }
    }

    /// Quantity awaiting a unit, if any.
    pub fn pending_quantity(&self) -> Option<u32> {
        match self.phase {
            FormPhase::AwaitingTimelineUnit { quantity } => Some(quantity),
            _ => None,
        }
    }

    /// Field currently being elicited, if any.
    pub fn requested_field(&self) -> Option<Field> {
        match self.phase {
            FormPhase::Collecting(field) => Some(field),
            FormPhase::AwaitingTimelineUnit { .. } => Some(Field::Timeline),
            FormPhase::Complete => None,
        }
    }
}

/// One inbound user turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnInput {
    pub conversation_id: String,
    /// Intent recognized by the dialogue engine
    pub intent: Option<String>,
    /// Latest raw user text
    pub text: String,
    /// Per-field candidates extracted by NLU
    pub candidates: BTreeMap<Field, CandidateValue>,
}

impl TurnInput {
    pub fn new(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_candidate(mut self, field: Field, value: impl Into<CandidateValue>) -> Self {
        self.candidates.insert(field, value.into());
        self
    }

    /// Candidate for a field, falling back to the raw text.
    fn candidate_for(&self, field: Field) -> Option<CandidateValue> {
        self.candidates.get(&field).cloned().or_else(|| {
            let text = self.text.trim();
            (!text.is_empty()).then(|| CandidateValue::Single(text.to_string()))
        })
    }
}

/// State-change instruction for the dialogue engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Set (or clear, with `None`) one slot.
    SlotSet {
        field: Field,
        value: Option<SlotValue>,
    },
    /// Every requirement slot was cleared.
    AllSlotsCleared,
    /// A timeline quantity is waiting for its unit.
    PendingTimelineSet(u32),
    /// The pending quantity was resolved or discarded.
    PendingTimelineCleared,
    /// The form now asks for this field.
    FieldRequested(Field),
    /// Every field is filled.
    FormCompleted,
}

/// What a turn produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Messages to render, in order
    pub messages: Vec<String>,
    /// Slot and state instructions, in order
    pub events: Vec<FormEvent>,
    /// Ranked providers, populated when the form completes
    pub matches: Vec<ScoredMatch>,
}

impl TurnOutcome {
    fn say(&mut self, message: String) {
        self.messages.push(message);
    }

    fn emit(&mut self, event: FormEvent) {
        self.events.push(event);
    }
}

/// Drives the requirement form one turn at a time.
pub struct FormController {
    validator: SlotValidator,
    scorer: Scorer,
    catalog: Catalog,
    restart_intent: String,
}

impl FormController {
    /// Create a controller over a catalog.
    pub fn new(catalog: Catalog, scorer: Scorer) -> Self {
        Self {
            validator: SlotValidator::new(),
            scorer,
            catalog,
            restart_intent: DEFAULT_RESTART_INTENT.to_string(),
        }
    }

    /// Use a different intent name for restarting the form.
    pub fn with_restart_intent(mut self, intent: impl Into<String>) -> Self {
        self.restart_intent = intent.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn restart_intent(&self) -> &str {
        &self.restart_intent
    }

    /// Ask for the first field of a freshly started form.
    pub fn start(&self, state: &mut ConversationState) -> TurnOutcome {
        let mut outcome = TurnOutcome::default();
        self.advance(state, &mut outcome);
        outcome
    }

    /// Handle one inbound turn.
    pub fn handle_turn(&self, state: &mut ConversationState, turn: &TurnInput) -> TurnOutcome {
        let _span = info_span!("form_turn", conversation = %turn.conversation_id).entered();

        if turn.intent.as_deref() == Some(self.restart_intent.as_str()) {
            return self.restart(state);
        }

        match state.phase {
            FormPhase::Collecting(field) => self.collect(state, field, turn),
            FormPhase::AwaitingTimelineUnit { quantity } => {
                self.resolve_timeline_unit(state, quantity, &turn.text)
            }
            FormPhase::Complete => {
                debug!("turn received after form completion; nothing to collect");
                TurnOutcome::default()
            }
        }
    }

    /// Clear every field and restart from the first question.
    pub fn restart(&self, state: &mut ConversationState) -> TurnOutcome {
        info!(previous = ?state.phase, "restarting requirement form");

        let mut outcome = TurnOutcome::default();
        if state.pending_quantity().is_some() {
            outcome.emit(FormEvent::PendingTimelineCleared);
        }
        *state = ConversationState::new();
        outcome.emit(FormEvent::AllSlotsCleared);
        outcome.say(prompts::restart_acknowledged());
        self.advance(state, &mut outcome);
        outcome
    }

    /// Rank the catalog against the current requirements.
    pub fn rank(&self, requirements: &RequirementSet) -> Vec<ScoredMatch> {
        self.scorer.score(requirements, &self.catalog)
    }

    fn collect(&self, state: &mut ConversationState, active: Field, turn: &TurnInput) -> TurnOutcome {
        let mut outcome = TurnOutcome::default();

        // Candidates for fields other than the active one are stale.
        for field in turn.candidates.keys().filter(|f| **f != active) {
            debug!(%field, "ignored candidate for inactive field");
        }

        let Some(candidate) = turn.candidate_for(active) else {
            outcome.say(prompts::ask(active));
            return outcome;
        };

        match self
            .validator
            .validate(active, &candidate, Some(active), &state.requirements)
        {
            Validation::Accepted(value) => {
                debug!(field = %active, "slot accepted");
                state.requirements.set(value.clone());
                outcome.emit(FormEvent::SlotSet {
                    field: active,
                    value: Some(value),
                });
                self.advance(state, &mut outcome);
            }
            Validation::Rejected { prompt } => {
                debug!(field = %active, "slot rejected");
                state.requirements.unset(active);
                outcome.emit(FormEvent::SlotSet {
                    field: active,
                    value: None,
                });
                outcome.say(prompt);
            }
            Validation::Deferred { quantity, prompt } => {
                info!(quantity, "timeline needs a unit");
                state.requirements.timeline = None;
                state.phase = FormPhase::AwaitingTimelineUnit { quantity };
                outcome.emit(FormEvent::SlotSet {
                    field: Field::Timeline,
                    value: None,
                });
                outcome.emit(FormEvent::PendingTimelineSet(quantity));
                outcome.say(prompt);
            }
            Validation::Unchanged(_) => outcome.say(prompts::ask(active)),
        }

        outcome
    }

    fn resolve_timeline_unit(
        &self,
        state: &mut ConversationState,
        quantity: u32,
        text: &str,
    ) -> TurnOutcome {
        let mut outcome = TurnOutcome::default();

        let Some(unit) = self.validator.timeline().detect_unit(text) else {
            debug!(quantity, "no unit in follow-up; asking again");
            outcome.say(prompts::ask_timeline_unit(quantity));
            return outcome;
        };

        let timeline = TimelineNormalizer::compose(quantity, unit);
        info!(%timeline, "timeline clarified");
        let value = SlotValue::Timeline(timeline);
        state.requirements.set(value.clone());
        outcome.emit(FormEvent::SlotSet {
            field: Field::Timeline,
            value: Some(value),
        });
        outcome.emit(FormEvent::PendingTimelineCleared);
        self.advance(state, &mut outcome);
        outcome
    }

    /// Move to the next missing field, or complete and score.
    fn advance(&self, state: &mut ConversationState, outcome: &mut TurnOutcome) {
        match state.requirements.next_missing() {
            Some(field) => {
                state.phase = FormPhase::Collecting(field);
                outcome.emit(FormEvent::FieldRequested(field));
                outcome.say(prompts::ask(field));
            }
            None => {
                state.phase = FormPhase::Complete;
                outcome.emit(FormEvent::FormCompleted);
                let matches = self.rank(&state.requirements);
                info!(surfaced = matches.len(), "requirement form complete");
                outcome.say(prompts::ranked_matches(&matches));
                outcome.matches = matches;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientPopulation, StudyPhase, TherapeuticArea};

    fn controller() -> FormController {
        FormController::new(Catalog::builtin(), Scorer::default())
    }

    fn turn(text: &str) -> TurnInput {
        TurnInput::new("conv-1", text)
    }

    #[test]
    fn test_accepts_and_advances() {
        let controller = controller();
        let mut state = ConversationState::new();

        let outcome = controller.handle_turn(&mut state, &turn("Phase 3"));

        assert_eq!(state.requirements.study_phase, Some(StudyPhase::PhaseIII));
        assert_eq!(state.phase, FormPhase::Collecting(Field::TherapeuticArea));
        assert_eq!(
            outcome.events,
            vec![
                FormEvent::SlotSet {
                    field: Field::StudyPhase,
                    value: Some(SlotValue::Phase(StudyPhase::PhaseIII))
                },
                FormEvent::FieldRequested(Field::TherapeuticArea),
            ]
        );
        assert_eq!(outcome.messages, vec![prompts::ask(Field::TherapeuticArea)]);
    }

    #[test]
    fn test_rejection_emits_one_message() {
        let controller = controller();
        let mut state = ConversationState::new();
        state.requirements.set(SlotValue::Phase(StudyPhase::PhaseII));
        state.phase = FormPhase::Collecting(Field::TherapeuticArea);

        let outcome = controller.handle_turn(&mut state, &turn("astrology"));

        assert_eq!(outcome.messages, vec![prompts::invalid_area()]);
        assert_eq!(state.requirements.study_phase, Some(StudyPhase::PhaseII));
        assert_eq!(state.requirements.therapeutic_area, None);
        assert_eq!(state.phase, FormPhase::Collecting(Field::TherapeuticArea));
    }

    #[test]
    fn test_nlu_candidate_preferred_over_text() {
        let controller = controller();
        let mut state = ConversationState::new();
        state.phase = FormPhase::Collecting(Field::ServicesNeeded);

        let input = turn("I need biostats and writing").with_candidate(
            Field::ServicesNeeded,
            vec!["Biostatistics", "medical writing"],
        );
        controller.handle_turn(&mut state, &input);

        let services = state.requirements.services_needed.unwrap();
        assert_eq!(services.len(), 2);
        assert!(services.contains("biostatistics"));
    }

    #[test]
    fn test_stale_candidates_do_not_clobber() {
        let controller = controller();
        let mut state = ConversationState::new();
        state.requirements.set(SlotValue::Area(TherapeuticArea::Cardiology));
        state.phase = FormPhase::Collecting(Field::PatientPopulation);

        let input = turn("adults")
            .with_candidate(Field::TherapeuticArea, "astrology")
            .with_candidate(Field::PatientPopulation, "adults");
        let outcome = controller.handle_turn(&mut state, &input);

        assert_eq!(
            state.requirements.therapeutic_area,
            Some(TherapeuticArea::Cardiology)
        );
        assert_eq!(
            state.requirements.patient_population,
            Some(PatientPopulation::Adults)
        );
        assert!(!outcome.events.iter().any(|e| matches!(
            e,
            FormEvent::SlotSet {
                field: Field::TherapeuticArea,
                ..
            }
        )));
    }

    #[test]
    fn test_timeline_clarification_flow() {
        let controller = controller();
        let mut state = ConversationState::new();
        state.phase = FormPhase::Collecting(Field::Timeline);

        let outcome = controller.handle_turn(&mut state, &turn("12"));
        assert_eq!(state.phase, FormPhase::AwaitingTimelineUnit { quantity: 12 });
        assert_eq!(state.requirements.timeline, None);
        assert!(outcome.events.contains(&FormEvent::PendingTimelineSet(12)));

        let outcome = controller.handle_turn(&mut state, &turn("fortnights"));
        assert_eq!(state.phase, FormPhase::AwaitingTimelineUnit { quantity: 12 });
        assert_eq!(outcome.messages, vec![prompts::ask_timeline_unit(12)]);
        assert!(outcome.events.is_empty());

        let outcome = controller.handle_turn(&mut state, &turn("weeks"));
        assert_eq!(state.requirements.timeline.as_deref(), Some("12 weeks"));
        assert_eq!(state.pending_quantity(), None);
        assert!(outcome.events.contains(&FormEvent::PendingTimelineCleared));
        assert_eq!(state.phase, FormPhase::Collecting(Field::StudyPhase));
    }

    #[test]
    fn test_restart_clears_everything() {
        let controller = controller();
        let mut state = ConversationState::new();
        state.requirements.set(SlotValue::Area(TherapeuticArea::Oncology));
        state.requirements.set(SlotValue::Timeline("6 months".into()));

        let outcome =
            controller.handle_turn(&mut state, &turn("phase 2").with_intent(DEFAULT_RESTART_INTENT));

        assert_eq!(state, ConversationState::new());
        assert_eq!(outcome.events[0], FormEvent::AllSlotsCleared);
        assert_eq!(
            outcome.messages,
            vec![prompts::restart_acknowledged(), prompts::ask(Field::StudyPhase)]
        );
    }

    #[test]
    fn test_restart_discards_pending_quantity() {
        let controller = controller();
        let mut state = ConversationState::new();
        state.phase = FormPhase::AwaitingTimelineUnit { quantity: 3 };

        let outcome = controller.restart(&mut state);

        assert_eq!(outcome.events[0], FormEvent::PendingTimelineCleared);
        assert_eq!(state.pending_quantity(), None);
    }

    #[test]
    fn test_custom_restart_intent() {
        let controller = controller().with_restart_intent("new_request");
        let mut state = ConversationState::new();
        state.requirements.set(SlotValue::Phase(StudyPhase::PhaseI));
        state.phase = FormPhase::Collecting(Field::TherapeuticArea);

        controller.handle_turn(&mut state, &turn("x").with_intent(DEFAULT_RESTART_INTENT));
        assert_eq!(state.requirements.study_phase, Some(StudyPhase::PhaseI));

        controller.handle_turn(&mut state, &turn("x").with_intent("new_request"));
        assert_eq!(state.requirements.study_phase, None);
    }

    #[test]
    fn test_completion_scores_catalog() {
        let controller = controller();
        let mut state = ConversationState::new();
        for text in ["phase iii", "oncology", "clinical trial management", "adults"] {
            controller.handle_turn(&mut state, &turn(text));
        }
        let outcome = controller.handle_turn(&mut state, &turn("six months"));

        assert_eq!(state.phase, FormPhase::Complete);
        assert!(outcome.events.contains(&FormEvent::FormCompleted));
        assert_eq!(outcome.matches.len(), 5);
        assert!(outcome.messages[0].contains("Icon"));
    }

    #[test]
    fn test_resume_prefers_pending_quantity() {
        let mut reqs = RequirementSet::new();
        reqs.set(SlotValue::Timeline("6 months".into()));

        let state = ConversationState::resume(reqs, Some(4), Some(Field::StudyPhase));
        assert_eq!(state.phase, FormPhase::AwaitingTimelineUnit { quantity: 4 });
        assert_eq!(state.requirements.timeline, None);
    }

    #[test]
    fn test_resume_requested_or_first_missing() {
        let mut reqs = RequirementSet::new();
        reqs.set(SlotValue::Phase(StudyPhase::PhaseII));

        let state = ConversationState::resume(reqs.clone(), None, Some(Field::Timeline));
        assert_eq!(state.phase, FormPhase::Collecting(Field::Timeline));

        let state = ConversationState::resume(reqs.clone(), None, Some(Field::StudyPhase));
        assert_eq!(state.phase, FormPhase::Collecting(Field::TherapeuticArea));

        let state = ConversationState::resume(reqs, None, None);
        assert_eq!(state.phase, FormPhase::Collecting(Field::TherapeuticArea));
    }
}
