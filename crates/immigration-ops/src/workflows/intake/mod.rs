pub mod domain;
pub mod outreach;
pub mod session;
pub mod validation;

pub use domain::{demo_intake, ClientIntake, ConsentRecord};
pub use outreach::{outreach_message, whatsapp_link};
pub use session::{CaseSession, SessionError, SessionSnapshot};
pub use validation::{FieldError, IntakeError, IntakeValidator};
