//! HTTPS plumbing shared by the Firebase services

use crate::registration::error::ProviderError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{header, Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Builds the shared client. When the system trust store cannot be loaded the
/// client falls back to an empty root store: plain `http://` endpoints (local
/// emulators) keep working, TLS handshakes fail with a provider error.
pub fn build_client() -> HttpsClient {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let builder = match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            warn!("Failed to load native root certificates: {}", e);
            let tls = rustls::ClientConfig::builder()
                .with_root_certificates(rustls::RootCertStore::empty())
                .with_no_client_auth();
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(tls)
        }
    };
    let connector = builder
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector)
}

/// One outgoing call. `bearer` is an OAuth access token when the endpoint
/// wants one.
pub struct Call<'a> {
    pub method: Method,
    pub url: &'a str,
    pub bearer: Option<&'a str>,
    pub content_type: &'a str,
    pub body: Vec<u8>,
}

impl<'a> Call<'a> {
    pub fn json(method: Method, url: &'a str, body: &impl Serialize) -> Result<Self, ProviderError> {
        let body = serde_json::to_vec(body).map_err(|e| ProviderError::new(e.to_string()))?;
        Ok(Self {
            method,
            url,
            bearer: None,
            content_type: "application/json",
            body,
        })
    }

    pub fn bearer(mut self, token: &'a str) -> Self {
        self.bearer = Some(token);
        self
    }
}

/// Sends `call` and returns the body of a 2xx reply. Anything else becomes
/// a `ProviderError` carrying the service's own message when it sent one.
pub async fn send(client: &HttpsClient, call: Call<'_>) -> Result<Bytes, ProviderError> {
    let mut builder = Request::builder()
        .method(call.method.clone())
        .uri(call.url)
        .header(header::CONTENT_TYPE, call.content_type);
    if let Some(token) = call.bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(Full::new(Bytes::from(call.body)))
        .map_err(|e| ProviderError::new(format!("Invalid request: {}", e)))?;

    let response = client
        .request(request)
        .await
        .map_err(|e| ProviderError::new(format!("Request to {} failed: {}", host_of(call.url), e)))?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| ProviderError::new(format!("Failed to read response: {}", e)))?
        .to_bytes();

    debug!("{} {} -> {}", call.method, host_of(call.url), status);

    if status.is_success() {
        Ok(body)
    } else {
        Err(error_from_body(status, &body))
    }
}

pub async fn send_json<T: DeserializeOwned>(
    client: &HttpsClient,
    call: Call<'_>,
) -> Result<T, ProviderError> {
    let body = send(client, call).await?;
    serde_json::from_slice(&body)
        .map_err(|e| ProviderError::new(format!("Unexpected response: {}", e)))
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Google APIs wrap failures as `{"error": {"message": ...}}`.
pub fn error_from_body(status: StatusCode, body: &[u8]) -> ProviderError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        return match envelope.error.message {
            Some(message) => ProviderError::new(message),
            None => ProviderError::silent(),
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        debug!("empty error body with status {}", status);
        ProviderError::silent()
    } else {
        ProviderError::new(text)
    }
}

// Keeps query strings (api keys) out of the logs.
fn host_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_error_envelope_yields_message() {
        let body = br#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.message.as_deref(), Some("EMAIL_EXISTS"));
    }

    #[test]
    fn envelope_without_message_is_silent() {
        let err = error_from_body(StatusCode::FORBIDDEN, br#"{"error":{"code":403}}"#);
        assert_eq!(err, ProviderError::silent());
    }

    #[test]
    fn plain_text_and_empty_bodies() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, b"upstream unavailable\n");
        assert_eq!(err.message.as_deref(), Some("upstream unavailable"));

        let err = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(err.message, None);
    }

    #[test]
    fn query_strings_are_not_logged() {
        assert_eq!(
            host_of("https://example.test/v1/accounts:signUp?key=secret"),
            "https://example.test/v1/accounts:signUp"
        );
    }
}
