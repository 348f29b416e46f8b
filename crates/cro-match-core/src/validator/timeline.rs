//! Timeline normalizer.
//!
//! Handles:
//! - Spelled-out quantities (six→6, for one..ten)
//! - Unit canonicalization (month→months, Year→years, week→weeks)
//! - Bare-number detection, which defers to a unit clarification

use std::collections::HashMap;

use regex::{Captures, Regex};

/// Outcome of normalizing a raw timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineParse {
    /// Contains a duration word; canonical text.
    Duration(String),
    /// A bare integer with no unit yet.
    BareQuantity(u32),
    /// A bare integer too large to hold.
    QuantityOutOfRange,
    /// Neither a number nor a duration.
    Unrecognized,
}

/// Normalizer for free-text project timelines.
pub struct TimelineNormalizer {
    /// Spelled-out number → numeral
    number_words: HashMap<String, String>,
    /// Unit spelling → canonical plural
    units: HashMap<String, &'static str>,
    number_word_regex: Regex,
    unit_regex: Regex,
    glued_unit_regex: Regex,
    bare_integer_regex: Regex,
}

impl Default for TimelineNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineNormalizer {
    /// Create a normalizer with the default number words and units.
    pub fn new() -> Self {
        Self {
            number_words: Self::default_number_words(),
            units: Self::default_units(),
            number_word_regex: Regex::new(
                r"(?i)\b(one|two|three|four|five|six|seven|eight|nine|ten)\b",
            )
            .expect("number word regex"),
            unit_regex: Regex::new(r"(?i)\b(weeks?|months?|years?)\b").expect("unit regex"),
            glued_unit_regex: Regex::new(r"(?i)(\d)(weeks?|months?|years?)\b")
                .expect("glued unit regex"),
            bare_integer_regex: Regex::new(r"^\d+$").expect("bare integer regex"),
        }
    }

    /// Normalize a raw timeline answer.
    pub fn normalize(&self, raw: &str) -> TimelineParse {
        let text = self.substitute_number_words(raw.trim());
        let text = collapse_whitespace(&text);

        if self.bare_integer_regex.is_match(&text) {
            return match text.parse::<u32>() {
                Ok(quantity) => TimelineParse::BareQuantity(quantity),
                Err(_) => TimelineParse::QuantityOutOfRange,
            };
        }

        let text = self.glued_unit_regex.replace_all(&text, "$1 $2");
        if !self.unit_regex.is_match(&text) {
            return TimelineParse::Unrecognized;
        }

        let canonical = self
            .unit_regex
            .replace_all(&text, |caps: &Captures| self.canonical_unit(&caps[1]).to_string());
        TimelineParse::Duration(canonical.into_owned())
    }

    /// Replace spelled-out numbers one..ten with numerals.
    pub fn substitute_number_words(&self, raw: &str) -> String {
        self.number_word_regex
            .replace_all(raw, |caps: &Captures| {
                self.number_words
                    .get(&caps[1].to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| caps[1].to_string())
            })
            .into_owned()
    }

    /// Find the first unit word in a follow-up answer.
    pub fn detect_unit(&self, text: &str) -> Option<&'static str> {
        self.unit_regex
            .captures(text)
            .map(|caps| self.canonical_unit(&caps[1]))
    }

    /// Compose the canonical timeline for a resolved clarification.
    pub fn compose(quantity: u32, unit: &str) -> String {
        format!("{quantity} {unit}")
    }

    fn canonical_unit(&self, unit: &str) -> &'static str {
        let lower = unit.to_lowercase();
        self.units.get(&lower).copied().unwrap_or("months")
    }

    fn default_number_words() -> HashMap<String, String> {
        [
            ("one", "1"),
            ("two", "2"),
            ("three", "3"),
            ("four", "4"),
            ("five", "5"),
            ("six", "6"),
            ("seven", "7"),
            ("eight", "8"),
            ("nine", "9"),
            ("ten", "10"),
        ]
        .into_iter()
        .map(|(w, n)| (w.to_string(), n.to_string()))
        .collect()
    }

    fn default_units() -> HashMap<String, &'static str> {
        let mut map = HashMap::new();
        map.insert("week".into(), "weeks");
        map.insert("weeks".into(), "weeks");
        map.insert("month".into(), "months");
        map.insert("months".into(), "months");
        map.insert("year".into(), "years");
        map.insert("years".into(), "years");
        map
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
