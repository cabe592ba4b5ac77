//! Form input and the profile document written for a new account

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the identity provider on account creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registration attempt's worth of input. Every field is trimmed on
/// construction.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: String,
    pub gender: String,
}

impl RegistrationForm {
    pub fn new(
        username: impl AsRef<str>,
        email: impl AsRef<str>,
        password: impl AsRef<str>,
        date_of_birth: impl AsRef<str>,
        gender: impl AsRef<str>,
    ) -> Self {
        Self {
            username: username.as_ref().trim().to_string(),
            email: email.as_ref().trim().to_string(),
            password: password.as_ref().trim().to_string(),
            date_of_birth: date_of_birth.as_ref().trim().to_string(),
            gender: gender.as_ref().trim().to_string(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            dob: self.date_of_birth.clone(),
            gender: self.gender.clone(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("date_of_birth", &self.date_of_birth)
            .field("gender", &self.gender)
            .finish()
    }
}

/// Document stored under `users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub dob: String,
    pub gender: String,
}

impl UserProfile {
    /// Field name/value pairs in document order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("username", self.username.as_str()),
            ("email", self.email.as_str()),
            ("dob", self.dob.as_str()),
            ("gender", self.gender.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_trims_input() {
        let form = RegistrationForm::new(" ada ", " a@b.com\n", " secret1 ", "1990-01-01 ", " Female");
        assert_eq!(form.username, "ada");
        assert_eq!(form.email, "a@b.com");
        assert_eq!(form.password, "secret1");
        assert_eq!(form.date_of_birth, "1990-01-01");
        assert_eq!(form.gender, "Female");
    }

    #[test]
    fn debug_output_hides_password() {
        let form = RegistrationForm::new("ada", "a@b.com", "hunter22", "", "");
        let printed = format!("{:?}", form);
        assert!(!printed.contains("hunter22"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn profile_serializes_with_document_field_names() {
        let form = RegistrationForm::new("ada", "a@b.com", "secret1", "1990-01-01", "Female");
        let json = serde_json::to_value(form.profile()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "username": "ada",
                "email": "a@b.com",
                "dob": "1990-01-01",
                "gender": "Female"
            })
        );
    }
}
