//! End-to-end conversations through the JSON boundary.
//!
//! `Engine` plays the dialogue engine: it owns the slot store, applies the slot
//! events each reply carries, and calls the validation action once per user turn.

use cro_match_actions::{AppConfig, ActionServer, WireEvent};
use cro_match_core::{Notifier, ProjectDispatch};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

struct Engine {
    server: Arc<ActionServer>,
    sender: String,
    slots: Map<String, Value>,
    active_loop: Option<String>,
}

impl Engine {
    fn new(server: ActionServer, sender: &str) -> Self {
        Self::shared(Arc::new(server), sender)
    }

    fn shared(server: Arc<ActionServer>, sender: &str) -> Self {
        Self {
            server,
            sender: sender.to_string(),
            slots: Map::new(),
            active_loop: Some("project_form".into()),
        }
    }

    fn call(&mut self, action: &str, text: &str, intent: Option<&str>) -> Vec<String> {
        let mut latest = json!({ "text": text });
        if let Some(intent) = intent {
            latest["intent"] = json!({ "name": intent });
        }
        let request = json!({
            "next_action": action,
            "sender_id": self.sender,
            "tracker": {
                "slots": self.slots,
                "latest_message": latest,
                "active_loop": { "name": self.active_loop },
            }
        });

        let reply: Value = serde_json::from_str(&self.server.handle_json(&request.to_string()))
            .expect("reply is JSON");
        assert!(reply.get("error").is_none(), "unexpected error reply: {reply}");

        let events: Vec<WireEvent> = serde_json::from_value(reply["events"].clone()).unwrap();
        for event in events {
            match event {
                WireEvent::Slot { name, value } => {
                    self.slots.insert(name, value);
                }
                WireEvent::ActiveLoop { name } => self.active_loop = name,
            }
        }

        reply["responses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["text"].as_str().unwrap().to_string())
            .collect()
    }

    fn say(&mut self, text: &str) -> Vec<String> {
        self.call("validate_project_form", text, Some("inform"))
    }

    fn slot(&self, name: &str) -> Value {
        self.slots.get(name).cloned().unwrap_or(Value::Null)
    }
}

#[derive(Default, Clone)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ProjectDispatch>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, dispatch: &ProjectDispatch) {
        self.sent.lock().unwrap().push(dispatch.clone());
    }
}

fn default_server() -> ActionServer {
    AppConfig::default().build_server().unwrap()
}

#[test]
fn test_full_conversation_and_dispatch() {
    let notifier = RecordingNotifier::default();
    let server = default_server().with_notifier(Box::new(notifier.clone()));
    let mut engine = Engine::new(server, "conv-a");

    let replies = engine.say("I'd like to find a CRO");
    assert_eq!(engine.slot("requested_slot"), "study_phase");
    assert!(replies[0].contains("study phase"));

    engine.say("Phase 3");
    engine.say("Oncology");
    engine.say("clinical trial management");
    engine.say("adults");
    let replies = engine.say("six months");

    assert_eq!(engine.slot("study_phase"), "phase iii");
    assert_eq!(engine.slot("therapeutic_area"), "oncology");
    assert_eq!(engine.slot("timeline"), "6 months");
    assert_eq!(engine.slot("requested_slot"), Value::Null);
    assert_eq!(engine.active_loop, None);

    let offered = engine.slot("offered_cros").as_array().cloned().unwrap();
    assert_eq!(offered.len(), 5);
    // IQVIA and Icon both reach 100; catalog order breaks the tie.
    assert_eq!(offered[0], "IQVIA");
    assert_eq!(offered[1], "Icon");
    assert!(replies
        .last()
        .unwrap()
        .ends_with("Please type the name of the CRO you'd like to select."));

    let replies = engine.call("action_send_project", "icon", Some("select_cro"));
    assert!(replies[0].starts_with("Your project details have been sent to Icon!"));
    assert_eq!(engine.slot("cro_name"), "Icon");

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].conversation_id, "conv-a");
    assert_eq!(sent[0].summary.timeline.as_deref(), Some("6 months"));
}

#[test]
fn test_bare_number_timeline_round_trip() {
    let mut engine = Engine::new(default_server(), "conv-b");
    engine.say("start");
    for text in ["phase 2", "cardiology", "biostatistics", "elderly"] {
        engine.say(text);
    }

    let replies = engine.say("12");
    assert_eq!(replies, vec!["Is that 12 weeks, months or years?".to_string()]);
    assert_eq!(engine.slot("pending_timeline_quantity"), 12);
    assert_eq!(engine.slot("timeline"), Value::Null);

    engine.say("weeks");
    assert_eq!(engine.slot("timeline"), "12 weeks");
    assert_eq!(engine.slot("pending_timeline_quantity"), Value::Null);
    assert_eq!(engine.active_loop, None);
}

#[test]
fn test_rejected_services_keep_form_on_field() {
    let mut engine = Engine::new(default_server(), "conv-c");
    engine.say("hello");
    engine.say("phase 1");
    engine.say("neurology");

    let replies = engine.say("basket weaving");
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("medical device testing"));
    assert_eq!(engine.slot("services_needed"), Value::Null);
    assert_eq!(engine.slot("requested_slot"), "services_needed");
    assert_eq!(engine.slot("study_phase"), "phase i");
}

#[test]
fn test_restart_intent_mid_form() {
    let mut engine = Engine::new(default_server(), "conv-d");
    engine.say("hi");
    engine.say("preclinical");
    engine.say("oncology");

    let replies = engine.call("validate_project_form", "actually, new project", Some("start_new_project"));

    assert_eq!(engine.slot("study_phase"), Value::Null);
    assert_eq!(engine.slot("therapeutic_area"), Value::Null);
    assert_eq!(engine.slot("requested_slot"), "study_phase");
    assert_eq!(engine.active_loop.as_deref(), Some("project_form"));
    assert_eq!(replies.len(), 2);
}

#[test]
fn test_explicit_restart_action_during_clarification() {
    let mut engine = Engine::new(default_server(), "conv-e");
    engine.slots.insert("requested_slot".into(), json!("timeline"));
    engine.slots.insert("study_phase".into(), json!("phase iv"));
    engine.say("3");
    assert_eq!(engine.slot("pending_timeline_quantity"), 3);

    engine.call("action_restart_project", "", None);
    assert_eq!(engine.slot("pending_timeline_quantity"), Value::Null);
    assert_eq!(engine.slot("study_phase"), Value::Null);
    assert_eq!(engine.slot("requested_slot"), "study_phase");
}

#[test]
fn test_match_on_partial_requirements() {
    let mut engine = Engine::new(default_server(), "conv-f");
    engine.slots.insert("therapeutic_area".into(), json!("oncology"));

    let replies = engine.call("action_match_cros", "", None);
    assert_eq!(engine.slot("offered_cros").as_array().map(Vec::len), Some(5));
    assert!(replies[0].starts_with("Here are the CROs that best match your project"));
}

#[test]
fn test_send_before_form_complete() {
    let notifier = RecordingNotifier::default();
    let server = default_server().with_notifier(Box::new(notifier.clone()));
    let mut engine = Engine::new(server, "conv-g");
    engine.slots.insert("study_phase".into(), json!("phase iii"));

    let replies = engine.call("action_send_project", "Icon", None);
    assert!(replies[0].starts_with("I still need a few details first."));
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[test]
fn test_send_to_provider_not_offered() {
    let mut engine = Engine::new(default_server(), "conv-h");
    for (slot, value) in [
        ("study_phase", json!("phase iii")),
        ("therapeutic_area", json!("oncology")),
        ("services_needed", json!(["site monitoring"])),
        ("patient_population", json!("adults")),
        ("timeline", json!("1 years")),
        ("offered_cros", json!(["Icon", "IQVIA"])),
    ] {
        engine.slots.insert(slot.into(), value);
    }

    let replies = engine.call("action_send_project", "Novotech", None);
    assert_eq!(
        replies[0],
        "Sorry, I couldn't find that CRO. Please choose one of: Icon, IQVIA."
    );
    assert_eq!(engine.slot("cro_name"), Value::Null);
}

#[test]
fn test_conversations_are_isolated() {
    let server = Arc::new(default_server());
    let mut first = Engine::shared(Arc::clone(&server), "conv-1");
    let mut second = Engine::shared(server, "conv-2");
    first.say("hi");
    second.say("hi");
    first.say("phase 2");

    assert_eq!(first.slot("study_phase"), "phase ii");
    assert_eq!(second.slot("study_phase"), Value::Null);
    assert_eq!(second.slot("requested_slot"), "study_phase");

    let replies = second.call("action_project_summary", "", None);
    let summary: Value = serde_json::from_str(&replies[0]).unwrap();
    assert_eq!(summary["studyPhase"], Value::Null);
}
