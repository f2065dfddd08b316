//! Settings validation.

use super::model::Settings;

/// Validation error for the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// SMTP host is empty.
    EmptySmtpHost,
    /// Sender address is empty.
    EmptySender,
    /// Sender address format is invalid.
    InvalidSender,
    /// A username is configured without a password.
    MissingPassword,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptySmtpHost => "SMTP server is required",
            Self::EmptySender => "Sender address is required",
            Self::InvalidSender => "Sender address must contain @",
            Self::MissingPassword => "SMTP password is required when a username is set",
        }
    }

    /// Get the settings key this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptySmtpHost => "smtp.host",
            Self::EmptySender | Self::InvalidSender => "sender",
            Self::MissingPassword => "smtp.password",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating settings.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate settings.
///
/// Returns `Ok(())` if valid, or every problem found.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_settings(settings: &Settings) -> ValidationResult {
    let mut errors = Vec::new();

    if settings.smtp.host.trim().is_empty() {
        errors.push(ValidationError::EmptySmtpHost);
    }

    let sender = settings.sender.trim();
    if sender.is_empty() {
        errors.push(ValidationError::EmptySender);
    } else if !sender.contains('@') {
        errors.push(ValidationError::InvalidSender);
    }

    if !settings.smtp.username.trim().is_empty() && settings.smtp.password.is_empty() {
        errors.push(ValidationError::MissingPassword);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
