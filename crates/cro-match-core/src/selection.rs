//! Resolve the provider name a user typed after seeing the ranked list.

use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::debug;

use crate::catalog::Catalog;
use crate::models::Provider;
use crate::prompts;

/// Minimum blended similarity for a fuzzy name match.
const MIN_SIMILARITY: f64 = 0.85;

/// Outcome of resolving a typed provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The provider the user meant.
    Selected(Provider),
    /// Nothing close enough; the prompt lists what can be chosen.
    Unknown { prompt: String },
}

/// Resolves free-text provider names against the catalog.
pub struct ProviderSelector<'a> {
    catalog: &'a Catalog,
}

impl<'a> ProviderSelector<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve `typed` among `offered` names, or the whole catalog when `offered` is empty.
    pub fn select(&self, typed: &str, offered: &[String]) -> Selection {
        let query = typed.trim().to_lowercase();
        let candidates: Vec<&Provider> = if offered.is_empty() {
            self.catalog.providers().iter().collect()
        } else {
            offered
                .iter()
                .filter_map(|name| self.catalog.find_by_name(name))
                .collect()
        };

        if query.is_empty() {
            return self.unknown(offered);
        }

        // Exact (case-insensitive) first
        if let Some(provider) = candidates
            .iter()
            .find(|p| p.name.trim().to_lowercase() == query)
        {
            return Selection::Selected((*provider).clone());
        }

        let best = candidates
            .iter()
            .map(|p| (fuzzy_match(&query, &p.name.to_lowercase()), *p))
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((similarity, provider)) if similarity >= MIN_SIMILARITY => {
                debug!(typed, provider = %provider.name, similarity, "fuzzy provider match");
                Selection::Selected(provider.clone())
            }
            _ => self.unknown(offered),
        }
    }

    fn unknown(&self, offered: &[String]) -> Selection {
        Selection::Unknown {
            prompt: prompts::unknown_provider(offered),
        }
    }
}

/// Blend Jaro-Winkler (typos, prefixes) with normalized Levenshtein (overall shape).
fn fuzzy_match(a: &str, b: &str) -> f64 {
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    jw * 0.6 + lev * 0.4
}
