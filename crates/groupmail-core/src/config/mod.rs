//! Settings file: SMTP server, sender, and where to find the roster,
//! attachments and run logs.

mod model;
mod validation;

pub use model::{DEFAULT_ROSTER, Security, Settings, SmtpConfig};
pub use validation::{ValidationError, ValidationResult, validate_settings};
