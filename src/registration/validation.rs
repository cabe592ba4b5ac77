//! Local checks run before any remote call

use crate::registration::error::ValidationError;
use crate::registration::user_info::RegistrationForm;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

// Same shape as the address pattern mobile platforms ship with.
static EMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_ADDRESS.is_match(email)
}

pub fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    // Counted in UTF-16 units, like the length reported by the client platforms.
    if password.encode_utf16().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Runs the form rules in order and stops at the first failure.
pub fn validate(form: &RegistrationForm) -> Result<(), ValidationError> {
    if !is_valid_email(&form.email) {
        return Err(ValidationError::InvalidEmail);
    }
    check_password(&form.password)
}
