//! Error types for user registration

use thiserror::Error;

/// Local, pre-flight form rejections. These never reach a remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

/// Failure reported by a remote collaborator. The message is whatever the
/// provider said, if it said anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or("remote call failed"))]
pub struct ProviderError {
    pub message: Option<String>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::silent();
        }
        Self {
            message: Some(message),
        }
    }

    /// A failure that carries no usable message.
    pub fn silent() -> Self {
        Self { message: None }
    }

    /// The provider's message, or `fallback` when there is none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Email already registered. Please use a different email or sign in.")]
    EmailAlreadyRegistered,

    #[error("{0}")]
    EmailCheckFailed(String),

    #[error("{0}")]
    AccountCreationFailed(String),

    #[error("{0}")]
    ProfileSaveFailed(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFileError(#[from] std::io::Error),

    #[error("Failed to parse credentials: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RegistrationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistrationError::Validation(_))
    }

    /// True for failures reported by a remote collaborator mid-sequence.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            RegistrationError::EmailCheckFailed(_)
                | RegistrationError::AccountCreationFailed(_)
                | RegistrationError::ProfileSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_falls_back_when_message_missing() {
        assert_eq!(
            ProviderError::silent().message_or("Authentication failed."),
            "Authentication failed."
        );
        assert_eq!(
            ProviderError::new("   ").message_or("Error saving user data."),
            "Error saving user data."
        );
        assert_eq!(
            ProviderError::new("quota exceeded").message_or("Error saving user data."),
            "quota exceeded"
        );
    }

    #[test]
    fn validation_messages_pass_through() {
        let err: RegistrationError = ValidationError::PasswordTooShort.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }
}
