use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::workflows::deadlines::{DeadlineCategory, DeadlineEntry};

/// Client intake form as submitted. Field names follow the form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIntake {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub client_city: String,
    #[serde(default)]
    pub client_postcode: String,
    #[serde(default)]
    pub visa_type: String,
    #[serde(default)]
    pub deadline1: String,
    #[serde(default)]
    pub deadline2: String,
    #[serde(default)]
    pub deadline3: String,
    #[serde(default)]
    pub deadline4: String,
    #[serde(default)]
    pub case_notes: String,
    #[serde(default, deserialize_with = "checkbox_flag")]
    pub gdpr_consent: bool,
}

impl ClientIntake {
    pub fn deadline_value(&self, category: DeadlineCategory) -> &str {
        match category {
            DeadlineCategory::Submission => &self.deadline1,
            DeadlineCategory::Biometrics => &self.deadline2,
            DeadlineCategory::Decision => &self.deadline3,
            DeadlineCategory::Appeal => &self.deadline4,
        }
    }

    /// One entry per non-blank deadline field, in form order.
    pub fn deadline_entries(&self) -> Vec<DeadlineEntry> {
        DeadlineCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                let value = self.deadline_value(category).trim();
                (!value.is_empty()).then(|| DeadlineEntry::new(category, value))
            })
            .collect()
    }
}

/// HTML checkboxes submit `"on"`; JSON clients send booleans.
fn checkbox_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "yes" | "1"
        ),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub consented: bool,
    pub timestamp: DateTime<Utc>,
}

/// Sample client loaded when demo mode is switched on.
pub fn demo_intake() -> ClientIntake {
    ClientIntake {
        client_name: "John Smith".to_string(),
        client_email: "john.smith@example.com".to_string(),
        client_phone: "+44 7700 900123".to_string(),
        client_address: "123 High Street".to_string(),
        client_city: "London".to_string(),
        client_postcode: "SW1A 1AA".to_string(),
        visa_type: "Spouse Visa".to_string(),
        deadline1: "2025-12-15".to_string(),
        deadline2: "2025-12-20".to_string(),
        deadline3: "2026-02-15".to_string(),
        deadline4: String::new(),
        case_notes: "Client is British citizen sponsoring spouse from USA. Currently on visit visa, switching in-country.".to_string(),
        gdpr_consent: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_form_style_payload() {
        let intake: ClientIntake = serde_json::from_str(
            r#"{"clientName":"Ada","clientEmail":"ada@example.com","visaType":"EUSS","deadline2":"2026-01-10","gdprConsent":"on"}"#,
        )
        .expect("decodes");
        assert_eq!(intake.client_name, "Ada");
        assert!(intake.gdpr_consent);
        assert!(intake.client_phone.is_empty());
    }

    #[test]
    fn blank_deadline_fields_are_skipped() {
        let entries = demo_intake().deadline_entries();
        let categories: Vec<DeadlineCategory> = entries.iter().map(|entry| entry.category).collect();
        assert_eq!(
            categories,
            vec![
                DeadlineCategory::Submission,
                DeadlineCategory::Biometrics,
                DeadlineCategory::Decision
            ]
        );
        assert_eq!(entries[2].due_date, "2026-02-15");
    }

    #[test]
    fn unchecked_consent_deserializes_false() {
        let intake: ClientIntake =
            serde_json::from_str(r#"{"gdprConsent":false}"#).expect("decodes");
        assert!(!intake.gdpr_consent);
        let missing: ClientIntake = serde_json::from_str("{}").expect("decodes");
        assert!(!missing.gdpr_consent);
    }
}
