//! Provider scoring using additive bonuses over a fixed floor.
//!
//! Scoring (defaults):
//! - Base score: 80
//! - Therapeutic-area expertise: +10
//! - Each matched service: +5
//! - Study-phase capability: +5 (preclinical or clinical trials, never both)
//! - Special population: +3 (pediatric or geriatric)
//! - Clamped to 100, top 5 surfaced

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::models::{PatientPopulation, Provider, RequirementSet, ScoreBreakdown, ScoredMatch};

/// Scoring weights and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: u32,
    pub max_score: u32,
    pub area_bonus: u32,
    pub service_bonus: u32,
    pub phase_bonus: u32,
    pub population_bonus: u32,
    pub max_results: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 80,
            max_score: 100,
            area_bonus: 10,
            service_bonus: 5,
            phase_bonus: 5,
            population_bonus: 3,
            max_results: 5,
        }
    }
}

/// Scoring configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringConfigError {
    #[error("max_score ({max}) is below base_score ({base})")]
    MaxBelowBase { base: u32, max: u32 },

    #[error("max_results must be at least 1")]
    NoResults,
}

impl ScoringConfig {
    /// Check that every provider can land in `base_score..=max_score` and that
    /// at least one match is surfaced.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if self.max_score < self.base_score {
            return Err(ScoringConfigError::MaxBelowBase {
                base: self.base_score,
                max: self.max_score,
            });
        }
        if self.max_results == 0 {
            return Err(ScoringConfigError::NoResults);
        }
        Ok(())
    }
}

/// Scores a catalog against collected requirements.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Build a scorer from operator-supplied weights.
    pub fn try_new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rank providers, best first.
    ///
    /// Order is (score descending, catalog index ascending), so equal scores keep
    /// catalog order and repeated calls return identical lists.
    pub fn score(&self, requirements: &RequirementSet, catalog: &Catalog) -> Vec<ScoredMatch> {
        let mut scored: Vec<ScoredMatch> = catalog
            .providers()
            .iter()
            .enumerate()
            .map(|(idx, provider)| self.score_provider(idx, provider, requirements))
            // Bonuses are unsigned; nothing falls below the floor today.
            .filter(|m| m.score >= self.config.base_score)
            .collect();

        let candidates = scored.len();
        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.catalog_index.cmp(&b.catalog_index))
        });
        scored.truncate(self.config.max_results);

        debug!(
            candidates,
            surfaced = scored.len(),
            top_score = scored.first().map(|m| m.score),
            "scored provider catalog"
        );
        scored
    }

    /// Score a single provider.
    pub fn score_provider(
        &self,
        catalog_index: usize,
        provider: &Provider,
        requirements: &RequirementSet,
    ) -> ScoredMatch {
        let matched_services: Vec<String> = requirements
            .services_needed
            .iter()
            .flat_map(|set| set.iter())
            .filter(|s| provider.offers_service(s))
            .map(String::from)
            .collect();

        let breakdown = ScoreBreakdown {
            base: self.config.base_score,
            area_bonus: self.score_area(provider, requirements),
            service_bonus: self
                .config
                .service_bonus
                .saturating_mul(u32::try_from(matched_services.len()).unwrap_or(u32::MAX)),
            phase_bonus: self.score_phase(provider, requirements),
            population_bonus: self.score_population(provider, requirements),
            matched_services,
        };

        ScoredMatch {
            provider: provider.name.clone(),
            catalog_index,
            score: breakdown.raw_total().min(self.config.max_score),
            justification: justify(&breakdown, requirements),
            breakdown,
        }
    }

    fn score_area(&self, provider: &Provider, requirements: &RequirementSet) -> u32 {
        match requirements.therapeutic_area {
            Some(area) if provider.covers_area(area.label()) => self.config.area_bonus,
            _ => 0,
        }
    }

    fn score_phase(&self, provider: &Provider, requirements: &RequirementSet) -> u32 {
        match requirements.study_phase {
            Some(phase) if phase.is_preclinical() && provider.has_specialty("preclinical") => {
                self.config.phase_bonus
            }
            Some(phase)
                if phase.is_clinical_trial() && provider.has_specialty("clinical trials") =>
            {
                self.config.phase_bonus
            }
            _ => 0,
        }
    }

    fn score_population(&self, provider: &Provider, requirements: &RequirementSet) -> u32 {
        match requirements.patient_population {
            Some(PatientPopulation::Pediatric) if provider.has_specialty("pediatric") => {
                self.config.population_bonus
            }
            Some(PatientPopulation::Elderly) if provider.has_specialty("geriatric") => {
                self.config.population_bonus
            }
            _ => 0,
        }
    }
}

/// Build the explanation shown next to a match.
fn justify(breakdown: &ScoreBreakdown, requirements: &RequirementSet) -> String {
    if breakdown.is_base_only() {
        return "Meets the general requirements for your project.".to_string();
    }

    let mut reasons = Vec::new();
    if breakdown.area_bonus > 0 {
        if let Some(area) = requirements.therapeutic_area {
            reasons.push(format!("Expertise in {area}."));
        }
    }
    if !breakdown.matched_services.is_empty() {
        reasons.push(format!("Offers {}.", breakdown.matched_services.join(", ")));
    }
    if breakdown.phase_bonus > 0 {
        if let Some(phase) = requirements.study_phase {
            let capability = if phase.is_preclinical() {
                "preclinical research"
            } else {
                "clinical trials"
            };
            reasons.push(format!("Experienced in {capability} for {phase} studies."));
        }
    }
    if breakdown.population_bonus > 0 {
        if let Some(population) = requirements.patient_population {
            reasons.push(format!("Specializes in {population} populations."));
        }
    }
    reasons.join(" ")
}
