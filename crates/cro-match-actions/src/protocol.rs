//! Wire format exchanged with the dialogue engine.
//!
//! One request per action call: the engine sends its tracker snapshot and the
//! name of the action to run; we answer with slot events and messages.

use std::collections::BTreeMap;

use cro_match_core::models::{CandidateValue, Field};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Slot carrying the timeline quantity that is waiting for a unit.
pub const PENDING_TIMELINE_SLOT: &str = "pending_timeline_quantity";

/// Slot naming the field the form is asking for.
pub const REQUESTED_SLOT: &str = "requested_slot";

/// Slot holding the provider the user picked.
pub const CRO_NAME_SLOT: &str = "cro_name";

/// Slot holding the provider names last offered to the user.
pub const OFFERED_CROS_SLOT: &str = "offered_cros";

/// Protocol errors.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Action call from the dialogue engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub next_action: String,
    pub sender_id: String,
    #[serde(default)]
    pub tracker: Tracker,
}

/// Conversation snapshot owned by the dialogue engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tracker {
    #[serde(default)]
    pub slots: Map<String, Value>,
    #[serde(default)]
    pub latest_message: LatestMessage,
    #[serde(default)]
    pub active_loop: Option<ActiveLoop>,
}

/// The most recent user message, as classified by NLU.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A slot candidate extracted by NLU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub entity: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveLoop {
    pub name: Option<String>,
}

impl Tracker {
    /// Field the form is currently asking for.
    pub fn requested_field(&self) -> Option<Field> {
        self.slots
            .get(REQUESTED_SLOT)
            .and_then(Value::as_str)
            .and_then(Field::from_slot_name)
    }

    /// Timeline quantity waiting for a unit. Non-integer values are ignored.
    pub fn pending_quantity(&self) -> Option<u32> {
        match self.slots.get(PENDING_TIMELINE_SLOT)? {
            Value::Number(n) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A string slot, if set and non-empty.
    pub fn text_slot(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// A list-of-strings slot; missing or malformed slots are empty.
    pub fn list_slot(&self, name: &str) -> Vec<String> {
        self.slots
            .get(name)
            .and_then(CandidateValue::from_json)
            .map(CandidateValue::into_items)
            .unwrap_or_default()
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.latest_message.intent.as_ref().map(|i| i.name.as_str())
    }

    pub fn text(&self) -> &str {
        self.latest_message.text.as_deref().unwrap_or_default()
    }

    /// Group entities into per-field candidates; repeated entities become a list.
    pub fn candidates(&self) -> BTreeMap<Field, CandidateValue> {
        let mut grouped: BTreeMap<Field, Vec<String>> = BTreeMap::new();
        for entity in &self.latest_message.entities {
            let Some(field) = Field::from_slot_name(&entity.entity) else {
                continue;
            };
            if let Some(candidate) = CandidateValue::from_json(&entity.value) {
                grouped.entry(field).or_default().extend(candidate.into_items());
            }
        }

        grouped
            .into_iter()
            .map(|(field, mut items)| {
                let candidate = if items.len() == 1 {
                    CandidateValue::Single(items.remove(0))
                } else {
                    CandidateValue::Many(items)
                };
                (field, candidate)
            })
            .collect()
    }
}

/// Instruction for the dialogue engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WireEvent {
    /// Set a slot (`null` clears it).
    Slot { name: String, value: Value },
    /// Activate (`Some`) or deactivate (`None`) a form.
    ActiveLoop { name: Option<String> },
}

impl WireEvent {
    pub fn slot(name: &str, value: Value) -> Self {
        WireEvent::Slot {
            name: name.to_string(),
            value,
        }
    }
}

/// A message to render to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub text: String,
}

/// Reply to an action call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub events: Vec<WireEvent>,
    pub responses: Vec<ResponseMessage>,
}

impl ActionResponse {
    pub fn say(&mut self, text: impl Into<String>) {
        self.responses.push(ResponseMessage { text: text.into() });
    }

    pub fn emit(&mut self, event: WireEvent) {
        self.events.push(event);
    }
}

/// Error body returned instead of a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
}

/// Parse an action request.
pub fn parse_request(json: &str) -> ProtocolResult<ActionRequest> {
    let trimmed = json.trim();
    if !trimmed.starts_with('{') {
        return Err(ProtocolError::InvalidFormat(
            "request must be a JSON object".into(),
        ));
    }
    Ok(serde_json::from_str(trimmed)?)
}
