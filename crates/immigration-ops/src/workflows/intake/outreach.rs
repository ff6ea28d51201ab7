use std::fmt::Write as _;

use url::form_urlencoded;

use super::domain::ClientIntake;
use crate::workflows::deadlines::{format_due_date, Deadline};
use crate::workflows::documents::Requirement;

const FALLBACK_PHONE: &str = "+447000000000";
const MAX_LISTED_DOCUMENTS: usize = 3;

/// Pre-filled chat message summarising the client's case.
pub fn outreach_message(
    intake: Option<&ClientIntake>,
    next_deadline: Option<&Deadline>,
    missing: &[Requirement],
) -> String {
    let mut message = String::from("Hi! I've started my UK immigration application.\n\n");

    if let Some(intake) = intake {
        if !intake.client_name.trim().is_empty() {
            let _ = writeln!(message, "Name: {}", intake.client_name.trim());
        }
        if !intake.visa_type.trim().is_empty() {
            let _ = writeln!(message, "Visa Type: {}", intake.visa_type.trim());
        }
    }

    if let Some(deadline) = next_deadline {
        let _ = writeln!(
            message,
            "\nNext Deadline: {} on {}",
            deadline.category.label(),
            format_due_date(deadline.due_date)
        );
    }

    if !missing.is_empty() {
        message.push_str("\nI need help uploading:\n");
        for requirement in missing.iter().take(MAX_LISTED_DOCUMENTS) {
            let _ = writeln!(message, "• {}", requirement.label);
        }
    }

    message.push_str("\nCan you assist me with my application?");
    message
}

/// `wa.me` deep link; whitespace is stripped from the number.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let number: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let number = if number.is_empty() {
        FALLBACK_PHONE.to_string()
    } else {
        number
    };
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/{number}?text={text}")
}
