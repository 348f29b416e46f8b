//! Project requirement models collected by the intake form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A slot of the requirement form, in elicitation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    StudyPhase,
    TherapeuticArea,
    ServicesNeeded,
    PatientPopulation,
    Timeline,
}

impl Field {
    /// Every required field, in the order the form asks for them.
    pub const ORDER: [Field; 5] = [
        Field::StudyPhase,
        Field::TherapeuticArea,
        Field::ServicesNeeded,
        Field::PatientPopulation,
        Field::Timeline,
    ];

    /// Slot name used by the dialogue engine.
    pub fn slot_name(&self) -> &'static str {
        match self {
            Field::StudyPhase => "study_phase",
            Field::TherapeuticArea => "therapeutic_area",
            Field::ServicesNeeded => "services_needed",
            Field::PatientPopulation => "patient_population",
            Field::Timeline => "timeline",
        }
    }

    /// Parse a slot name.
    pub fn from_slot_name(name: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|f| f.slot_name() == name)
    }

    /// The field asked after this one, if any.
    pub fn next(&self) -> Option<Field> {
        let idx = Self::ORDER.iter().position(|f| f == self)?;
        Self::ORDER.get(idx + 1).copied()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_name())
    }
}

/// Collapse whitespace and lowercase for whitelist comparison.
pub(crate) fn fold(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Study phase of the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudyPhase {
    Preclinical,
    PhaseI,
    PhaseII,
    PhaseIII,
    PhaseIV,
}

impl StudyPhase {
    pub const ALL: [StudyPhase; 5] = [
        StudyPhase::Preclinical,
        StudyPhase::PhaseI,
        StudyPhase::PhaseII,
        StudyPhase::PhaseIII,
        StudyPhase::PhaseIV,
    ];

    /// Canonical label stored in the slot.
    pub fn label(&self) -> &'static str {
        match self {
            StudyPhase::Preclinical => "preclinical",
            StudyPhase::PhaseI => "phase i",
            StudyPhase::PhaseII => "phase ii",
            StudyPhase::PhaseIII => "phase iii",
            StudyPhase::PhaseIV => "phase iv",
        }
    }

    /// Case-insensitive parse of roman or arabic spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "preclinical" => Some(StudyPhase::Preclinical),
            "phase i" | "phase 1" => Some(StudyPhase::PhaseI),
            "phase ii" | "phase 2" => Some(StudyPhase::PhaseII),
            "phase iii" | "phase 3" => Some(StudyPhase::PhaseIII),
            "phase iv" | "phase 4" => Some(StudyPhase::PhaseIV),
            _ => None,
        }
    }

    pub fn is_preclinical(&self) -> bool {
        matches!(self, StudyPhase::Preclinical)
    }

    /// Phases II through IV. Phase I is deliberately not in this class.
    pub fn is_clinical_trial(&self) -> bool {
        matches!(
            self,
            StudyPhase::PhaseII | StudyPhase::PhaseIII | StudyPhase::PhaseIV
        )
    }
}

impl fmt::Display for StudyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Therapeutic area of the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TherapeuticArea {
    Oncology,
    Cardiology,
    Neurology,
    Immunology,
    Diabetes,
    Rheumatology,
    Dermatology,
    Respiratory,
    Gastroenterology,
}

impl TherapeuticArea {
    pub const ALL: [TherapeuticArea; 9] = [
        TherapeuticArea::Oncology,
        TherapeuticArea::Cardiology,
        TherapeuticArea::Neurology,
        TherapeuticArea::Immunology,
        TherapeuticArea::Diabetes,
        TherapeuticArea::Rheumatology,
        TherapeuticArea::Dermatology,
        TherapeuticArea::Respiratory,
        TherapeuticArea::Gastroenterology,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TherapeuticArea::Oncology => "oncology",
            TherapeuticArea::Cardiology => "cardiology",
            TherapeuticArea::Neurology => "neurology",
            TherapeuticArea::Immunology => "immunology",
            TherapeuticArea::Diabetes => "diabetes",
            TherapeuticArea::Rheumatology => "rheumatology",
            TherapeuticArea::Dermatology => "dermatology",
            TherapeuticArea::Respiratory => "respiratory",
            TherapeuticArea::Gastroenterology => "gastroenterology",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let folded = fold(raw);
        Self::ALL.into_iter().find(|a| a.label() == folded)
    }
}

impl fmt::Display for TherapeuticArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Patient population enrolled in the study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientPopulation {
    Adults,
    Pediatric,
    Elderly,
}

impl PatientPopulation {
    pub const ALL: [PatientPopulation; 3] = [
        PatientPopulation::Adults,
        PatientPopulation::Pediatric,
        PatientPopulation::Elderly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PatientPopulation::Adults => "adults",
            PatientPopulation::Pediatric => "pediatric",
            PatientPopulation::Elderly => "elderly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let folded = fold(raw);
        Self::ALL.into_iter().find(|p| p.label() == folded)
    }
}

impl fmt::Display for PatientPopulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Services a provider can be asked for.
pub const SERVICE_VOCABULARY: [&str; 12] = [
    "clinical trial management",
    "regulatory affairs",
    "data management",
    "biostatistics",
    "pharmacovigilance",
    "medical writing",
    "site monitoring",
    "patient recruitment",
    "toxicology",
    "bioanalytical testing",
    "central laboratory",
    "medical device testing",
];

/// Case-insensitive membership in [`SERVICE_VOCABULARY`].
pub fn is_known_service(raw: &str) -> bool {
    let folded = fold(raw);
    SERVICE_VOCABULARY.iter().any(|s| *s == folded)
}

/// Set of requested services.
///
/// Membership is case-insensitive but the spelling the user typed is kept for
/// display. Iteration order is by folded name, which keeps output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSet {
    entries: BTreeMap<String, String>,
}

impl ServiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a service; a case-variant of an existing entry is ignored.
    pub fn insert(&mut self, service: &str) -> bool {
        let key = fold(service);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, service.trim().to_string());
        true
    }

    pub fn contains(&self, service: &str) -> bool {
        self.entries.contains_key(&fold(service))
    }

    /// Services as the user spelled them.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ServiceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ServiceSet::new();
        for service in iter {
            set.insert(service.as_ref());
        }
        set
    }
}

impl Serialize for ServiceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ServiceSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

/// NLU candidate for a slot: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateValue {
    Single(String),
    Many(Vec<String>),
}

impl CandidateValue {
    /// Coerce to a list so callers never branch on shape.
    pub fn into_items(self) -> Vec<String> {
        match self {
            CandidateValue::Single(s) => vec![s],
            CandidateValue::Many(items) => items,
        }
    }

    /// First item, used by single-valued fields.
    pub fn first(&self) -> Option<&str> {
        match self {
            CandidateValue::Single(s) => Some(s),
            CandidateValue::Many(items) => items.first().map(String::as_str),
        }
    }

    /// Interpret a raw slot value from the dialogue engine.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(CandidateValue::Single(s.clone())),
            Value::Number(n) => Some(CandidateValue::Single(n.to_string())),
            Value::Array(items) => Some(CandidateValue::Many(
                items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl From<&str> for CandidateValue {
    fn from(s: &str) -> Self {
        CandidateValue::Single(s.to_string())
    }
}

impl From<Vec<&str>> for CandidateValue {
    fn from(items: Vec<&str>) -> Self {
        CandidateValue::Many(items.into_iter().map(String::from).collect())
    }
}

/// A canonical, validated slot value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Phase(StudyPhase),
    Area(TherapeuticArea),
    Services(ServiceSet),
    Population(PatientPopulation),
    Timeline(String),
}

impl SlotValue {
    /// The field this value belongs to.
    pub fn field(&self) -> Field {
        match self {
            SlotValue::Phase(_) => Field::StudyPhase,
            SlotValue::Area(_) => Field::TherapeuticArea,
            SlotValue::Services(_) => Field::ServicesNeeded,
            SlotValue::Population(_) => Field::PatientPopulation,
            SlotValue::Timeline(_) => Field::Timeline,
        }
    }

    /// Wire representation for the dialogue engine's slot store.
    pub fn to_json(&self) -> Value {
        match self {
            SlotValue::Phase(p) => Value::String(p.label().into()),
            SlotValue::Area(a) => Value::String(a.label().into()),
            SlotValue::Services(s) => {
                Value::Array(s.iter().map(|x| Value::String(x.into())).collect())
            }
            SlotValue::Population(p) => Value::String(p.label().into()),
            SlotValue::Timeline(t) => Value::String(t.clone()),
        }
    }
}

/// The project being scoped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    pub study_phase: Option<StudyPhase>,
    pub therapeutic_area: Option<TherapeuticArea>,
    pub services_needed: Option<ServiceSet>,
    pub patient_population: Option<PatientPopulation>,
    pub timeline: Option<String>,
}

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field.
    pub fn get(&self, field: Field) -> Option<SlotValue> {
        match field {
            Field::StudyPhase => self.study_phase.map(SlotValue::Phase),
            Field::TherapeuticArea => self.therapeutic_area.map(SlotValue::Area),
            Field::ServicesNeeded => self.services_needed.clone().map(SlotValue::Services),
            Field::PatientPopulation => self.patient_population.map(SlotValue::Population),
            Field::Timeline => self.timeline.clone().map(SlotValue::Timeline),
        }
    }

    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::StudyPhase => self.study_phase.is_some(),
            Field::TherapeuticArea => self.therapeutic_area.is_some(),
            Field::ServicesNeeded => self.services_needed.is_some(),
            Field::PatientPopulation => self.patient_population.is_some(),
            Field::Timeline => self.timeline.is_some(),
        }
    }

    /// Store a validated value in its field.
    pub fn set(&mut self, value: SlotValue) {
        match value {
            SlotValue::Phase(p) => self.study_phase = Some(p),
            SlotValue::Area(a) => self.therapeutic_area = Some(a),
            SlotValue::Services(s) => self.services_needed = Some(s),
            SlotValue::Population(p) => self.patient_population = Some(p),
            SlotValue::Timeline(t) => self.timeline = Some(t),
        }
    }

    pub fn unset(&mut self, field: Field) {
        match field {
            Field::StudyPhase => self.study_phase = None,
            Field::TherapeuticArea => self.therapeutic_area = None,
            Field::ServicesNeeded => self.services_needed = None,
            Field::PatientPopulation => self.patient_population = None,
            Field::Timeline => self.timeline = None,
        }
    }

    /// Reset every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// First unfilled field in form order.
    pub fn next_missing(&self) -> Option<Field> {
        Field::ORDER.into_iter().find(|f| !self.is_set(*f))
    }

    pub fn is_complete(&self) -> bool {
        self.next_missing().is_none()
    }

    /// Rebuild from the dialogue engine's slot store.
    ///
    /// Stored values were canonical when written; anything that no longer parses
    /// is treated as unset rather than trusted.
    pub fn from_slots(slots: &serde_json::Map<String, Value>) -> Self {
        let mut set = Self::new();
        let text = |field: Field| slots.get(field.slot_name()).and_then(Value::as_str);

        set.study_phase = text(Field::StudyPhase).and_then(StudyPhase::parse);
        set.therapeutic_area = text(Field::TherapeuticArea).and_then(TherapeuticArea::parse);
        set.patient_population = text(Field::PatientPopulation).and_then(PatientPopulation::parse);
        set.timeline = text(Field::Timeline)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        set.services_needed = slots
            .get(Field::ServicesNeeded.slot_name())
            .and_then(CandidateValue::from_json)
            .map(CandidateValue::into_items)
            .filter(|items| !items.is_empty() && items.iter().all(|s| is_known_service(s)))
            .map(|items| items.into_iter().collect::<ServiceSet>());

        set
    }
}
