//! Slot validator.
//!
//! Turns NLU candidates into canonical slot values or a clarification prompt.
//! Pipeline: NLU candidate → coercion to list → whitelist / timeline rules → Validation

mod timeline;

pub use timeline::*;

use crate::models::{
    is_known_service, CandidateValue, Field, PatientPopulation, RequirementSet, ServiceSet,
    SlotValue, StudyPhase, TherapeuticArea,
};
use crate::prompts;

/// Result of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Canonical value to store.
    Accepted(SlotValue),
    /// Field stays unset; the prompt is sent to the user.
    Rejected { prompt: String },
    /// Timeline needs a unit before it can be stored.
    Deferred { quantity: u32, prompt: String },
    /// Field is not being requested; its stored value passes through.
    Unchanged(Option<SlotValue>),
}

/// Validator for requirement-form slots.
pub struct SlotValidator {
    timeline: TimelineNormalizer,
}

impl Default for SlotValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotValidator {
    pub fn new() -> Self {
        Self {
            timeline: TimelineNormalizer::new(),
        }
    }

    /// Validate a candidate for `field` while `requested` is being elicited.
    ///
    /// Only the requested field is checked; any other field returns its current
    /// value untouched so stale candidates cannot overwrite accepted slots.
    pub fn validate(
        &self,
        field: Field,
        candidate: &CandidateValue,
        requested: Option<Field>,
        current: &RequirementSet,
    ) -> Validation {
        if requested != Some(field) {
            return Validation::Unchanged(current.get(field));
        }

        match field {
            Field::StudyPhase => self.validate_phase(candidate),
            Field::TherapeuticArea => self.validate_area(candidate),
            Field::ServicesNeeded => self.validate_services(candidate),
            Field::PatientPopulation => self.validate_population(candidate),
            Field::Timeline => self.validate_timeline(candidate),
        }
    }

    /// The timeline normalizer, shared with the unit clarification step.
    pub fn timeline(&self) -> &TimelineNormalizer {
        &self.timeline
    }

    fn validate_phase(&self, candidate: &CandidateValue) -> Validation {
        match candidate.first().and_then(StudyPhase::parse) {
            Some(phase) => Validation::Accepted(SlotValue::Phase(phase)),
            None => Validation::Rejected {
                prompt: prompts::ask(Field::StudyPhase),
            },
        }
    }

    fn validate_area(&self, candidate: &CandidateValue) -> Validation {
        match candidate.first().and_then(TherapeuticArea::parse) {
            Some(area) => Validation::Accepted(SlotValue::Area(area)),
            None => Validation::Rejected {
                prompt: prompts::invalid_area(),
            },
        }
    }

    fn validate_services(&self, candidate: &CandidateValue) -> Validation {
        let items = candidate.clone().into_items();
        if items.is_empty() || !items.iter().all(|s| is_known_service(s)) {
            return Validation::Rejected {
                prompt: prompts::invalid_services(),
            };
        }

        let services: ServiceSet = items.into_iter().collect();
        Validation::Accepted(SlotValue::Services(services))
    }

    fn validate_population(&self, candidate: &CandidateValue) -> Validation {
        match candidate.first().and_then(PatientPopulation::parse) {
            Some(population) => Validation::Accepted(SlotValue::Population(population)),
            None => Validation::Rejected {
                prompt: prompts::invalid_population(),
            },
        }
    }

    fn validate_timeline(&self, candidate: &CandidateValue) -> Validation {
        let raw = candidate.first().unwrap_or_default();
        match self.timeline.normalize(raw) {
            TimelineParse::Duration(canonical) => {
                Validation::Accepted(SlotValue::Timeline(canonical))
            }
            TimelineParse::BareQuantity(quantity) => Validation::Deferred {
                quantity,
                prompt: prompts::ask_timeline_unit(quantity),
            },
            TimelineParse::QuantityOutOfRange => Validation::Rejected {
                prompt: prompts::timeline_out_of_range(),
            },
            TimelineParse::Unrecognized => Validation::Rejected {
                prompt: prompts::invalid_timeline(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SERVICE_VOCABULARY;

    fn validate_active(field: Field, candidate: CandidateValue) -> Validation {
        SlotValidator::new().validate(field, &candidate, Some(field), &RequirementSet::new())
    }

    #[test]
    fn test_phase_accepts_roman_and_arabic() {
        assert_eq!(
            validate_active(Field::StudyPhase, "Phase 2".into()),
            Validation::Accepted(SlotValue::Phase(StudyPhase::PhaseII))
        );
        assert_eq!(
            validate_active(Field::StudyPhase, "PRECLINICAL".into()),
            Validation::Accepted(SlotValue::Phase(StudyPhase::Preclinical))
        );
    }

    #[test]
    fn test_phase_reject_repeats_question() {
        assert_eq!(
            validate_active(Field::StudyPhase, "phase seven".into()),
            Validation::Rejected {
                prompt: prompts::ask(Field::StudyPhase)
            }
        );
    }

    #[test]
    fn test_area_is_case_insensitive() {
        assert_eq!(
            validate_active(Field::TherapeuticArea, "ONCOLOGY".into()),
            validate_active(Field::TherapeuticArea, "oncology".into())
        );
        assert!(matches!(
            validate_active(Field::TherapeuticArea, "astrology".into()),
            Validation::Rejected { .. }
        ));
    }

    #[test]
    fn test_services_single_or_list() {
        let single = validate_active(Field::ServicesNeeded, "Biostatistics".into());
        let Validation::Accepted(SlotValue::Services(set)) = single else {
            panic!("expected accepted services, got {single:?}");
        };
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Biostatistics"]);

        let many = validate_active(
            Field::ServicesNeeded,
            vec!["Data Management", "medical writing"].into(),
        );
        let Validation::Accepted(SlotValue::Services(set)) = many else {
            panic!("expected accepted services, got {many:?}");
        };
        assert_eq!(set.len(), 2);
        assert!(set.iter().any(|s| s == "Data Management"));
    }

    #[test]
    fn test_services_one_bad_item_rejects_all() {
        let result = validate_active(
            Field::ServicesNeeded,
            vec!["biostatistics", "underwater basket weaving"].into(),
        );
        let Validation::Rejected { prompt } = result else {
            panic!("expected rejection");
        };
        for service in SERVICE_VOCABULARY {
            assert!(prompt.contains(service));
        }
    }

    #[test]
    fn test_services_empty_list_rejected() {
        assert!(matches!(
            validate_active(Field::ServicesNeeded, CandidateValue::Many(vec![])),
            Validation::Rejected { .. }
        ));
    }

    #[test]
    fn test_population() {
        assert_eq!(
            validate_active(Field::PatientPopulation, "Elderly".into()),
            Validation::Accepted(SlotValue::Population(PatientPopulation::Elderly))
        );
        assert!(matches!(
            validate_active(Field::PatientPopulation, "teenagers".into()),
            Validation::Rejected { .. }
        ));
    }

    #[test]
    fn test_timeline_defers_on_bare_number() {
        assert_eq!(
            validate_active(Field::Timeline, "12".into()),
            Validation::Deferred {
                quantity: 12,
                prompt: prompts::ask_timeline_unit(12)
            }
        );
        assert_eq!(
            validate_active(Field::Timeline, "six months".into()),
            Validation::Accepted(SlotValue::Timeline("6 months".into()))
        );
    }

    #[test]
    fn test_timeline_rejections_explain_why() {
        assert_eq!(
            validate_active(Field::Timeline, "99999999999".into()),
            Validation::Rejected {
                prompt: prompts::timeline_out_of_range()
            }
        );
        assert_eq!(
            validate_active(Field::Timeline, "soon".into()),
            Validation::Rejected {
                prompt: prompts::invalid_timeline()
            }
        );
    }

    #[test]
    fn test_inactive_field_passes_through() {
        let validator = SlotValidator::new();
        let mut current = RequirementSet::new();
        current.set(SlotValue::Area(TherapeuticArea::Cardiology));

        let result = validator.validate(
            Field::TherapeuticArea,
            &"astrology".into(),
            Some(Field::Timeline),
            &current,
        );
        assert_eq!(
            result,
            Validation::Unchanged(Some(SlotValue::Area(TherapeuticArea::Cardiology)))
        );

        let unset = validator.validate(Field::StudyPhase, &"phase 2".into(), None, &current);
        assert_eq!(unset, Validation::Unchanged(None));
    }
}
