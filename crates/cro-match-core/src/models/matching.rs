//! Ranked provider match models produced by the scoring engine.

/// Per-criterion bonuses awarded on top of the base score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Base score every provider starts from
    pub base: u32,
    /// Therapeutic-area expertise bonus
    pub area_bonus: u32,
    /// Sum of per-service bonuses
    pub service_bonus: u32,
    /// Study-phase capability bonus (preclinical or clinical trials)
    pub phase_bonus: u32,
    /// Special-population bonus (pediatric or geriatric)
    pub population_bonus: u32,
    /// Services that matched, in the user's spelling
    pub matched_services: Vec<String>,
}

impl ScoreBreakdown {
    /// Unclamped sum of base and bonuses, saturating at `u32::MAX`.
    pub fn raw_total(&self) -> u32 {
        [
            self.area_bonus,
            self.service_bonus,
            self.phase_bonus,
            self.population_bonus,
        ]
        .into_iter()
        .fold(self.base, u32::saturating_add)
    }

    /// True when no individual criterion contributed.
    pub fn is_base_only(&self) -> bool {
        self.raw_total() == self.base
    }
}

/// A provider ranked against a requirement set. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMatch {
    /// Provider name
    pub provider: String,
    /// Position of the provider in its catalog (tie-break key)
    pub catalog_index: usize,
    /// Final score, clamped to the configured maximum
    pub score: u32,
    /// How the score was reached
    pub breakdown: ScoreBreakdown,
    /// Human-readable explanation of the match
    pub justification: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_totals() {
        let breakdown = ScoreBreakdown {
            base: 80,
            area_bonus: 10,
            service_bonus: 15,
            phase_bonus: 5,
            population_bonus: 0,
            matched_services: vec![],
        };
        assert_eq!(breakdown.raw_total(), 110);
        assert!(!breakdown.is_base_only());

        let bare = ScoreBreakdown {
            base: 80,
            ..Default::default()
        };
        assert!(bare.is_base_only());
    }

    #[test]
    fn test_breakdown_total_saturates() {
        let breakdown = ScoreBreakdown {
            base: 80,
            area_bonus: u32::MAX,
            phase_bonus: 5,
            ..Default::default()
        };
        assert_eq!(breakdown.raw_total(), u32::MAX);
        assert!(!breakdown.is_base_only());
    }
}
