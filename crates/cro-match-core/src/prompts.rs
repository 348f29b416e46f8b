//! User-facing message templates.
//!
//! Every clarification, question and confirmation the core emits is built here so
//! wording stays consistent across the validator, controller and dispatch code.

use crate::models::{
    Field, PatientPopulation, ScoredMatch, StudyPhase, TherapeuticArea, SERVICE_VOCABULARY,
};

/// Question asked to elicit a field.
pub fn ask(field: Field) -> String {
    match field {
        Field::StudyPhase => format!(
            "What study phase is your project in? ({})",
            join_labels(StudyPhase::ALL.iter().map(|p| p.label()))
        ),
        Field::TherapeuticArea => {
            "Which therapeutic area does your project focus on?".to_string()
        }
        Field::ServicesNeeded => {
            "Which services do you need from a CRO? You can list more than one.".to_string()
        }
        Field::PatientPopulation => format!(
            "What patient population will the study enroll? ({})",
            join_labels(PatientPopulation::ALL.iter().map(|p| p.label()))
        ),
        Field::Timeline => {
            "What is your expected project timeline? (for example, 6 months)".to_string()
        }
    }
}

/// Clarification for a therapeutic area outside the vocabulary.
pub fn invalid_area() -> String {
    format!(
        "Sorry, I don't recognize that therapeutic area. Please choose one of: {}.",
        join_labels(TherapeuticArea::ALL.iter().map(|a| a.label()))
    )
}

/// Clarification for a services submission; echoes the full vocabulary.
pub fn invalid_services() -> String {
    format!(
        "Sorry, I can only match these services: {}. Please choose from this list.",
        SERVICE_VOCABULARY.join(", ")
    )
}

/// Clarification for a patient population outside the vocabulary.
pub fn invalid_population() -> String {
    format!(
        "Please choose a patient population: {}.",
        join_labels(PatientPopulation::ALL.iter().map(|p| p.label()))
    )
}

/// Clarification for a timeline that is neither a number nor a duration.
pub fn invalid_timeline() -> String {
    "Please give the timeline as a duration, for example \"6 months\" or \"2 years\".".to_string()
}

/// Clarification for a bare number too large to be a duration.
pub fn timeline_out_of_range() -> String {
    "That number is too large for a project timeline. Please give a duration such as \"18 months\" or \"2 years\".".to_string()
}

/// Unit question for a bare-number timeline.
pub fn ask_timeline_unit(quantity: u32) -> String {
    format!("Is that {quantity} weeks, months or years?")
}

/// Acknowledgement for a mid-form restart.
pub fn restart_acknowledged() -> String {
    "No problem, let's start a new project from the beginning.".to_string()
}

/// Ranked provider list followed by the selection prompt.
pub fn ranked_matches(matches: &[ScoredMatch]) -> String {
    if matches.is_empty() {
        return "I couldn't find any CROs in the roster right now.".to_string();
    }

    let mut msg = String::from("Here are the CROs that best match your project:\n");
    for m in matches {
        msg.push_str(&format!("- {} (score {}): {}\n", m.provider, m.score, m.justification));
    }
    msg.push_str("\nPlease type the name of the CRO you'd like to select.");
    msg
}

/// Clarification when the typed provider name matches nothing offered.
pub fn unknown_provider(offered: &[String]) -> String {
    if offered.is_empty() {
        return "Sorry, I couldn't find that CRO. Please type the name exactly as listed.".into();
    }
    format!(
        "Sorry, I couldn't find that CRO. Please choose one of: {}.",
        offered.join(", ")
    )
}

/// Confirmation after the project is handed to a provider.
pub fn project_sent(provider: &str, lines: &[(&str, String)]) -> String {
    let mut msg = format!("Your project details have been sent to {provider}!\n");
    for (label, value) in lines {
        msg.push_str(&format!("{label}: {value}\n"));
    }
    msg.push_str("The CRO will contact you soon.");
    msg
}

/// Reminder when the form is asked to do something before it is filled.
pub fn form_incomplete(next: Field) -> String {
    format!("I still need a few details first. {}", ask(next))
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_hint_lists_vocabulary() {
        let msg = invalid_services();
        for service in SERVICE_VOCABULARY {
            assert!(msg.contains(service), "missing {service}");
        }
    }

    #[test]
    fn test_phase_question_lists_phases() {
        let msg = ask(Field::StudyPhase);
        assert!(msg.contains("preclinical"));
        assert!(msg.contains("phase iv"));
    }

    #[test]
    fn test_empty_match_list() {
        assert!(ranked_matches(&[]).contains("couldn't find"));
    }

    #[test]
    fn test_project_sent_lists_fields() {
        let msg = project_sent("Icon", &[("Timeline", "6 months".to_string())]);
        assert!(msg.starts_with("Your project details have been sent to Icon!"));
        assert!(msg.contains("Timeline: 6 months"));
    }
}
