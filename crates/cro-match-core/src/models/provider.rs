//! Service provider (CRO) roster models.

use serde::{Deserialize, Serialize};

/// A single contract research organization in the provider roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    /// Display name - unique within a catalog
    pub name: String,
    /// Capability tags (e.g., ["clinical trials", "pediatric"])
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Therapeutic areas the provider has expertise in (e.g., ["oncology"])
    #[serde(default)]
    pub therapeutic_areas: Vec<String>,
    /// Services offered (e.g., ["clinical trial management", "biostatistics"])
    #[serde(default)]
    pub services: Vec<String>,
}

impl Provider {
    /// Create a provider with no declared expertise.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialties: Vec::new(),
            therapeutic_areas: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Builder helper for specialty tags.
    pub fn with_specialties(mut self, tags: &[&str]) -> Self {
        self.specialties = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Builder helper for therapeutic-area tags.
    pub fn with_areas(mut self, tags: &[&str]) -> Self {
        self.therapeutic_areas = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Builder helper for service tags.
    pub fn with_services(mut self, tags: &[&str]) -> Self {
        self.services = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Check if the provider lists a specialty (case-insensitive).
    pub fn has_specialty(&self, specialty: &str) -> bool {
        contains_ignore_case(&self.specialties, specialty)
    }

    /// Check if the provider covers a therapeutic area (case-insensitive).
    pub fn covers_area(&self, area: &str) -> bool {
        contains_ignore_case(&self.therapeutic_areas, area)
    }

    /// Check if the provider offers a service (case-insensitive).
    pub fn offers_service(&self, service: &str) -> bool {
        contains_ignore_case(&self.services, service)
    }
}

fn contains_ignore_case(tags: &[String], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    tags.iter().any(|t| t.trim().to_lowercase() == needle)
}
