use url::form_urlencoded::byte_serialize;

use super::domain::Deadline;

const CALENDAR_TEMPLATE_URL: &str = "https://calendar.google.com/calendar/render";

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// All-day Google Calendar event template for the deadline.
pub fn calendar_link(deadline: &Deadline) -> String {
    let label = deadline.category.label();
    let day = deadline.due_date.format("%Y%m%d").to_string();

    format!(
        "{CALENDAR_TEMPLATE_URL}?action=TEMPLATE&text={}&dates={}&details={}",
        encode(&format!("UK Immigration: {label}")),
        encode(&format!("{day}/{day}")),
        encode(&format!("Immigration case deadline: {label}")),
    )
}
