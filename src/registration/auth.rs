//! Firebase authentication: service-account tokens and the Identity Toolkit

use crate::registration::config::RegistrationConfig;
use crate::registration::error::{ProviderError, RegistrationError};
use crate::registration::http::{self, Call, HttpsClient};
use crate::registration::services::IdentityProvider;
use crate::registration::user_info::UserId;
use async_trait::async_trait;
use hyper::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Supplies OAuth bearer tokens for the Google APIs that need one.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer(&self, scope: &str) -> Result<String, ProviderError>;
}

/// A fixed token, such as `owner` for the Firestore emulator.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer(&self, _scope: &str) -> Result<String, ProviderError> {
        Ok(self.0.clone())
    }
}

/// OAuth access tokens minted from a service account key.
pub struct ServiceAccountTokens {
    authenticator: DefaultAuthenticator,
}

impl ServiceAccountTokens {
    pub async fn from_credentials(
        credentials_path: impl AsRef<Path>,
    ) -> Result<Self, RegistrationError> {
        let credentials_path = credentials_path.as_ref();

        let _ = rustls::crypto::ring::default_provider().install_default();

        let key_data = std::fs::read_to_string(credentials_path).map_err(|e| {
            RegistrationError::CredentialsFileError(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read credentials file '{}': {}",
                    credentials_path.display(),
                    e
                ),
            ))
        })?;

        let service_account_key: ServiceAccountKey = serde_json::from_str(&key_data)?;
        info!("Loaded service account {}", service_account_key.client_email);

        let authenticator = ServiceAccountAuthenticator::builder(service_account_key)
            .build()
            .await
            .map_err(|e| {
                RegistrationError::AuthError(format!("Failed to build authenticator: {}", e))
            })?;

        Ok(Self { authenticator })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn bearer(&self, scope: &str) -> Result<String, ProviderError> {
        let token = self
            .authenticator
            .token(&[scope])
            .await
            .map_err(|e| ProviderError::new(format!("Failed to obtain access token: {}", e)))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::new("Access token missing from token response"))
    }
}

/// Identity Toolkit REST client keyed by the project's web API key.
pub struct FirebaseAuth {
    http: HttpsClient,
    api_key: String,
    base_url: String,
    continue_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAuthUriRequest<'a> {
    identifier: &'a str,
    continue_uri: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CreateAuthUriResponse {
    registered: bool,
    signin_methods: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

impl FirebaseAuth {
    pub fn new(http: HttpsClient, config: &RegistrationConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.identity_url.trim_end_matches('/').to_string(),
            continue_uri: config.continue_uri.clone(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.base_url,
            method,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn check_email_in_use(&self, email: &str) -> Result<bool, ProviderError> {
        let url = self.endpoint("createAuthUri");
        let body = CreateAuthUriRequest {
            identifier: email,
            continue_uri: &self.continue_uri,
        };
        let reply: CreateAuthUriResponse =
            http::send_json(&self.http, Call::json(Method::POST, &url, &body)?)
                .await
                .map_err(humanize)?;

        Ok(reply.registered || !reply.signin_methods.is_empty())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, ProviderError> {
        let url = self.endpoint("signUp");
        let body = SignUpRequest {
            email,
            password,
            return_secure_token: true,
        };
        let reply: SignUpResponse =
            http::send_json(&self.http, Call::json(Method::POST, &url, &body)?)
                .await
                .map_err(humanize)?;

        Ok(UserId::new(reply.local_id))
    }
}

/// Turns Identity Toolkit error codes into sentences a user can act on.
pub fn humanize(err: ProviderError) -> ProviderError {
    let Some(raw) = err.message.as_deref() else {
        return err;
    };
    let (code, detail) = match raw.split_once(" : ") {
        Some((code, detail)) => (code.trim(), Some(detail.trim())),
        None => (raw.trim(), None),
    };

    let message = match code {
        "EMAIL_EXISTS" => "The email address is already in use by another account.",
        "INVALID_EMAIL" => "The email address is badly formatted.",
        "MISSING_PASSWORD" => "Password cannot be empty",
        "WEAK_PASSWORD" => detail.unwrap_or("The given password is invalid."),
        "OPERATION_NOT_ALLOWED" => "Email/password sign-in is disabled for this project.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            "We have blocked all requests from this device due to unusual activity. Try again later."
        }
        _ => "",
    }
    .to_string();

    if message.is_empty() {
        err
    } else {
        ProviderError::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_humanized() {
        let err = humanize(ProviderError::new("EMAIL_EXISTS"));
        assert_eq!(
            err.message.as_deref(),
            Some("The email address is already in use by another account.")
        );

        let err = humanize(ProviderError::new(
            "WEAK_PASSWORD : Password should be at least 6 characters",
        ));
        assert_eq!(
            err.message.as_deref(),
            Some("Password should be at least 6 characters")
        );
    }

    #[test]
    fn unknown_and_missing_messages_pass_through() {
        let err = humanize(ProviderError::new("PROJECT_NOT_FOUND"));
        assert_eq!(err.message.as_deref(), Some("PROJECT_NOT_FOUND"));
        assert_eq!(humanize(ProviderError::silent()), ProviderError::silent());
    }

    #[test]
    fn api_key_is_escaped_in_endpoint() {
        let config = RegistrationConfig::new("demo", "k+y/=", "demo.appspot.com");
        let auth = FirebaseAuth::new(http::build_client(), &config);
        assert_eq!(
            auth.endpoint("signUp"),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=k%2By%2F%3D"
        );
    }

    #[tokio::test]
    async fn static_token_ignores_scope() {
        let tokens = StaticToken("owner".to_string());
        assert_eq!(tokens.bearer(DATASTORE_SCOPE).await.unwrap(), "owner");
    }

    #[test]
    fn auth_uri_reply_tolerates_missing_fields() {
        let reply: CreateAuthUriResponse =
            serde_json::from_str(r#"{"kind":"identitytoolkit#CreateAuthUriResponse"}"#).unwrap();
        assert!(!reply.registered);
        assert!(reply.signin_methods.is_empty());

        let reply: CreateAuthUriResponse =
            serde_json::from_str(r#"{"registered":true,"signinMethods":["password"]}"#).unwrap();
        assert!(reply.registered);
        assert_eq!(reply.signin_methods, vec!["password"]);
    }
}
