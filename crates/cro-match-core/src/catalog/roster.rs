//! Built-in provider roster.

use crate::models::Provider;

/// The default roster shipped with the service.
pub(super) fn builtin_providers() -> Vec<Provider> {
    vec![
        Provider::new("IQVIA")
            .with_specialties(&["clinical trials", "pediatric", "geriatric"])
            .with_areas(&["oncology", "cardiology", "neurology", "immunology", "diabetes"])
            .with_services(&[
                "clinical trial management",
                "data management",
                "biostatistics",
                "patient recruitment",
                "site monitoring",
                "regulatory affairs",
            ]),
        Provider::new("Icon")
            .with_specialties(&["clinical trials"])
            .with_areas(&["oncology", "cardiology", "respiratory"])
            .with_services(&["clinical trial management", "site monitoring", "pharmacovigilance"]),
        Provider::new("Parexel")
            .with_specialties(&["clinical trials", "geriatric"])
            .with_areas(&["oncology", "neurology", "rheumatology"])
            .with_services(&["regulatory affairs", "medical writing", "clinical trial management"]),
        Provider::new("PPD")
            .with_specialties(&["clinical trials"])
            .with_areas(&["immunology", "respiratory", "gastroenterology"])
            .with_services(&[
                "central laboratory",
                "clinical trial management",
                "bioanalytical testing",
            ]),
        Provider::new("Syneos Health")
            .with_specialties(&["clinical trials"])
            .with_areas(&["dermatology", "neurology", "diabetes"])
            .with_services(&["patient recruitment", "medical writing"]),
        Provider::new("Labcorp Drug Development")
            .with_specialties(&["preclinical", "clinical trials"])
            .with_areas(&["oncology", "immunology"])
            .with_services(&["toxicology", "central laboratory", "bioanalytical testing"]),
        Provider::new("Charles River Laboratories")
            .with_specialties(&["preclinical"])
            .with_areas(&["oncology", "neurology"])
            .with_services(&["toxicology", "bioanalytical testing"]),
        Provider::new("Medpace")
            .with_specialties(&["clinical trials"])
            .with_areas(&["cardiology", "diabetes", "oncology"])
            .with_services(&["clinical trial management", "regulatory affairs", "data management"]),
        Provider::new("WuXi AppTec")
            .with_specialties(&["preclinical"])
            .with_areas(&["oncology", "immunology"])
            .with_services(&["toxicology", "bioanalytical testing", "central laboratory"]),
        Provider::new("Worldwide Clinical Trials")
            .with_specialties(&["clinical trials", "geriatric"])
            .with_areas(&["neurology", "cardiology", "rheumatology"])
            .with_services(&["clinical trial management", "biostatistics"]),
        Provider::new("PSI CRO")
            .with_specialties(&["clinical trials"])
            .with_areas(&["oncology", "respiratory", "gastroenterology"])
            .with_services(&["site monitoring", "patient recruitment"]),
        Provider::new("Novotech")
            .with_specialties(&["clinical trials"])
            .with_areas(&["immunology", "dermatology"])
            .with_services(&["site monitoring", "regulatory affairs"]),
        Provider::new("Premier Research")
            .with_specialties(&["clinical trials", "pediatric"])
            .with_areas(&["neurology", "rheumatology", "dermatology"])
            .with_services(&["clinical trial management", "pharmacovigilance"]),
        Provider::new("Veranex")
            .with_areas(&["cardiology"])
            .with_services(&["medical device testing", "regulatory affairs"]),
        // Statistics shop with no declared therapeutic expertise
        Provider::new("Cytel").with_services(&["biostatistics", "data management"]),
    ]
}
