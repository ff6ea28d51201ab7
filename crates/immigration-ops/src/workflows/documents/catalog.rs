use serde::{Deserialize, Serialize};

/// Visa routes handled by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisaRoute {
    #[serde(rename = "Spouse Visa")]
    Spouse,
    #[serde(rename = "Skilled Worker")]
    SkilledWorker,
    #[serde(rename = "Student Visa")]
    Student,
    #[serde(rename = "Visit Visa")]
    Visit,
    #[serde(rename = "Sponsor Licence")]
    SponsorLicence,
    #[serde(rename = "EUSS")]
    Euss,
    #[serde(rename = "Settlement/ILR")]
    Settlement,
}

const SPOUSE: &[&str] = &[
    "Valid Passport",
    "Marriage Certificate",
    "Financial Evidence (6 months bank statements)",
    "Accommodation Proof (tenancy agreement/mortgage)",
    "English Language Certificate",
    "Relationship Evidence (photos, correspondence)",
];

const SKILLED_WORKER: &[&str] = &[
    "Valid Passport",
    "Certificate of Sponsorship",
    "Job Offer Letter",
    "Payslips (3-6 months)",
    "Qualifications/Degree Certificates",
    "English Language Certificate",
];

const STUDENT: &[&str] = &[
    "Valid Passport",
    "CAS (Confirmation of Acceptance for Studies)",
    "Financial Evidence (tuition + living costs)",
    "Academic Transcripts",
    "ATAS Certificate (if required)",
    "Tuberculosis Test Certificate",
];

const VISIT: &[&str] = &[
    "Valid Passport",
    "Financial Evidence (bank statements)",
    "Accommodation Details",
    "Travel Itinerary",
    "Employment Letter",
];

const SPONSOR_LICENCE: &[&str] = &[
    "Company Registration Documents",
    "Proof of Trading",
    "HR Systems Documentation",
    "Compliance Documents",
    "Key Personnel Details",
];

const EUSS: &[&str] = &[
    "Valid Passport/ID",
    "Proof of Residence in UK",
    "Evidence of Relationship (if applicable)",
    "Comprehensive Sickness Insurance (if required)",
];

const SETTLEMENT: &[&str] = &[
    "Valid Passport",
    "Life in the UK Test Certificate",
    "English Language Certificate",
    "Continuous Residence Evidence",
    "P60/Payslips",
    "Council Tax Bills",
];

impl VisaRoute {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Spouse,
            Self::SkilledWorker,
            Self::Student,
            Self::Visit,
            Self::SponsorLicence,
            Self::Euss,
            Self::Settlement,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Spouse => "Spouse Visa",
            Self::SkilledWorker => "Skilled Worker",
            Self::Student => "Student Visa",
            Self::Visit => "Visit Visa",
            Self::SponsorLicence => "Sponsor Licence",
            Self::Euss => "EUSS",
            Self::Settlement => "Settlement/ILR",
        }
    }

    /// Required evidence in checklist order.
    pub const fn requirement_labels(self) -> &'static [&'static str] {
        match self {
            Self::Spouse => SPOUSE,
            Self::SkilledWorker => SKILLED_WORKER,
            Self::Student => STUDENT,
            Self::Visit => VISIT,
            Self::SponsorLicence => SPONSOR_LICENCE,
            Self::Euss => EUSS,
            Self::Settlement => SETTLEMENT,
        }
    }

    /// Exact, case-sensitive match on the display label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|route| route.label() == label.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_round_trips_through_its_label() {
        for route in VisaRoute::ordered() {
            assert_eq!(VisaRoute::from_label(route.label()), Some(route));
            assert!(!route.requirement_labels().is_empty());
        }
        assert_eq!(VisaRoute::from_label("Tourist Visa"), None);
    }

    #[test]
    fn serde_uses_display_labels() {
        let encoded = serde_json::to_string(&VisaRoute::Settlement).expect("encode");
        assert_eq!(encoded, "\"Settlement/ILR\"");
        let decoded: VisaRoute = serde_json::from_str("\"Skilled Worker\"").expect("decode");
        assert_eq!(decoded, VisaRoute::SkilledWorker);
    }

    #[test]
    fn spouse_catalog_is_ordered() {
        let labels = VisaRoute::Spouse.requirement_labels();
        assert_eq!(labels.first(), Some(&"Valid Passport"));
        assert_eq!(labels.last(), Some(&"Relationship Evidence (photos, correspondence)"));
        assert_eq!(labels.len(), 6);
    }
}
