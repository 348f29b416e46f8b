//! CRO Matchmaker Core Library
//!
//! Business logic for a conversational intake assistant that scopes a clinical
//! research project and matches it against a roster of contract research
//! organizations (CROs).
//!
//! # Architecture
//!
//! ```text
//! User utterance → (dialogue engine + NLU) → candidate value
//!                                                  │
//!                                            Slot Validator ──reject──► clarification
//!                                                  │            │
//!                                                  │         deferred (bare number)
//!                                                  │            ▼
//!                                                  │     AwaitingTimelineUnit
//!                                                  ▼
//!                                            RequirementSet
//!                                                  │ all fields filled
//!                                                  ▼
//!                                Scoring Engine ◄── Provider Catalog
//!                                                  │
//!                                       ranked list (top 5)
//!                                                  │
//!                                         user selects a CRO
//!                                                  │
//!                                       Notifier (fire-and-forget)
//! ```
//!
//! # Core Principle
//!
//! **Nothing in this crate fails a conversation.** Validation and scoring always
//! return normal values plus user-facing messages; the only errors are for loading
//! a malformed catalog at startup.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Provider, RequirementSet, ScoredMatch, etc.)
//! - [`catalog`]: Read-only provider roster
//! - [`validator`]: Slot validator and timeline normalizer
//! - [`scoring`]: Provider scoring engine
//! - [`conversation`]: Form state controller (restart, timeline clarification)
//! - [`selection`]: Typed provider-name resolution
//! - [`export`]: Project summary and dispatch notification
//! - [`prompts`]: User-facing message templates

pub mod catalog;
pub mod conversation;
pub mod export;
pub mod models;
pub mod prompts;
pub mod scoring;
pub mod selection;
pub mod validator;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use conversation::{
    ConversationState, FormController, FormEvent, FormPhase, TurnInput, TurnOutcome,
    DEFAULT_RESTART_INTENT,
};
pub use export::{LogNotifier, Notifier, ProjectDispatch, ProjectSummary};
pub use models::{
    CandidateValue, Field, PatientPopulation, Provider, RequirementSet, ScoreBreakdown,
    ScoredMatch, ServiceSet, SlotValue, StudyPhase, TherapeuticArea,
};
pub use scoring::{Scorer, ScoringConfig, ScoringConfigError};
pub use selection::{ProviderSelector, Selection};
pub use validator::{SlotValidator, TimelineNormalizer, TimelineParse, Validation};
