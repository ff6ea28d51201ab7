use regex::Regex;
use serde::Serialize;

use super::domain::ClientIntake;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^(\+44\s?|0)[0-9\s]{9,13}$";
const POSTCODE_PATTERN: &str = r"(?i)^[A-Z]{1,2}[0-9]{1,2}[A-Z]?\s?[0-9][A-Z]{2}$";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("please correct the errors in the form: {}", field_names(.0))]
    Invalid(Vec<FieldError>),
    #[error("validation pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

fn field_names(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| error.field)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Form-level checks for required fields, contact formats, and consent.
#[derive(Debug, Clone)]
pub struct IntakeValidator {
    email: Regex,
    phone: Regex,
    postcode: Regex,
}

impl IntakeValidator {
    pub fn new() -> Result<Self, IntakeError> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            postcode: Regex::new(POSTCODE_PATTERN)?,
        })
    }

    /// Reports every failing field, not just the first.
    pub fn validate(&self, intake: &ClientIntake) -> Result<(), IntakeError> {
        let mut errors = Vec::new();

        let name = intake.client_name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("clientName", "This field is required"));
        }

        let email = intake.client_email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("clientEmail", "This field is required"));
        } else if !self.email.is_match(email) {
            errors.push(FieldError::new(
                "clientEmail",
                "Please enter a valid email address",
            ));
        }

        let phone = strip_whitespace(&intake.client_phone);
        if !phone.is_empty() && !self.phone.is_match(&phone) {
            errors.push(FieldError::new(
                "clientPhone",
                "Please enter a valid UK phone number (e.g., +44 7700 900000)",
            ));
        }

        let postcode = strip_whitespace(&intake.client_postcode);
        if !postcode.is_empty() && !self.postcode.is_match(&postcode) {
            errors.push(FieldError::new(
                "clientPostcode",
                "Please enter a valid UK postcode (e.g., SW1A 1AA)",
            ));
        }

        if intake.visa_type.trim().is_empty() {
            errors.push(FieldError::new("visaType", "This field is required"));
        }

        if !intake.gdpr_consent {
            errors.push(FieldError::new(
                "gdprConsent",
                "You must accept this to continue",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(IntakeError::Invalid(errors))
        }
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}
