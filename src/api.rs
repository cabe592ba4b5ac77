//! HTTP API for user registration

use crate::registration::{
    BackendKind, ImageHandle, ImageUpload, Notification, RecordingNotifier, Registrar,
    RegistrationError, RegistrationForm,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registrar: Registrar,
    pub backend: BackendKind,
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "date_of_birth")]
    pub dob: String,
    #[serde(default)]
    pub gender: String,
    /// Base64-encoded image bytes
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: Option<String>,
    pub image: Option<ImageUpload>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub backend: String,
}

// Configure routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/register", post(register_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
        service: "signup".to_string(),
        backend: state.backend.to_string(),
    })
}

fn status_for(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::Validation(_) => StatusCode::BAD_REQUEST,
        RegistrationError::EmailAlreadyRegistered => StatusCode::CONFLICT,
        e if e.is_provider_failure() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    info!("Registration request for {}", payload.email.trim());

    let image = match payload.image.as_deref().map(|b64| STANDARD.decode(b64.trim())) {
        None => None,
        Some(Ok(bytes)) => Some(ImageHandle::Bytes(bytes)),
        Some(Err(e)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RegisterResponse {
                    success: false,
                    message: format!("Invalid image encoding: {}", e),
                    user_id: None,
                    image: None,
                    notifications: vec![],
                }),
            );
        }
    };

    let form = RegistrationForm::new(
        &payload.username,
        &payload.email,
        &payload.password,
        &payload.dob,
        &payload.gender,
    );
    let notifier = RecordingNotifier::new();

    match state.registrar.register(form, image, &notifier).await {
        Ok(registered) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                message: crate::registration::orchestrator::PROFILE_SAVED.to_string(),
                user_id: Some(registered.user_id.to_string()),
                image: Some(registered.image),
                notifications: notifier.take(),
            }),
        ),
        Err(e) => (
            status_for(&e),
            Json(RegisterResponse {
                success: false,
                message: e.to_string(),
                user_id: None,
                image: None,
                notifications: notifier.take(),
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::ValidationError;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            status_for(&ValidationError::InvalidEmail.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&RegistrationError::EmailAlreadyRegistered),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&RegistrationError::ProfileSaveFailed("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&RegistrationError::ConfigError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
