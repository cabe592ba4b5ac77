//! User directory backed by Cloud Firestore
//! Structure: {collection}/{user_id} with string fields username, email, dob, gender

use crate::registration::auth::{TokenSource, DATASTORE_SCOPE};
use crate::registration::config::RegistrationConfig;
use crate::registration::error::ProviderError;
use crate::registration::http::{self, Call, HttpsClient};
use crate::registration::services::DocumentStore;
use crate::registration::user_info::{UserId, UserProfile};
use async_trait::async_trait;
use hyper::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

pub struct FirestoreDirectory {
    http: HttpsClient,
    tokens: Arc<dyn TokenSource>,
    documents_url: String,
}

impl FirestoreDirectory {
    pub fn new(
        http: HttpsClient,
        tokens: Arc<dyn TokenSource>,
        config: &RegistrationConfig,
    ) -> Self {
        let documents_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            config.firestore_url.trim_end_matches('/'),
            config.project_id
        );
        Self {
            http,
            tokens,
            documents_url,
        }
    }

    fn document_url(&self, collection: &str, id: &UserId) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url,
            urlencoding::encode(collection),
            urlencoding::encode(id.as_str())
        )
    }
}

/// Firestore wraps every value in a typed envelope.
pub fn document_body(profile: &UserProfile) -> Value {
    let fields: Map<String, Value> = profile
        .fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), json!({ "stringValue": value })))
        .collect();
    json!({ "fields": fields })
}

#[async_trait]
impl DocumentStore for FirestoreDirectory {
    async fn write_document(
        &self,
        collection: &str,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<(), ProviderError> {
        let token = self.tokens.bearer(DATASTORE_SCOPE).await?;
        let url = self.document_url(collection, id);
        let body = document_body(profile);

        // PATCH without an update mask replaces the whole document.
        http::send(
            &self.http,
            Call::json(Method::PATCH, &url, &body)?.bearer(&token),
        )
        .await?;

        info!("Wrote profile document {}/{}", collection, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::auth::StaticToken;

    #[test]
    fn document_url_escapes_segments() {
        let config = RegistrationConfig::new("demo", "key", "demo.appspot.com");
        let directory = FirestoreDirectory::new(
            http::build_client(),
            Arc::new(StaticToken("owner".to_string())),
            &config,
        );

        assert_eq!(
            directory.document_url("users", &UserId::new("a/b c")),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/users/a%2Fb%20c"
        );
    }

    #[test]
    fn document_body_wraps_string_fields() {
        let profile = UserProfile {
            username: "ada".to_string(),
            email: "a@b.com".to_string(),
            dob: "1990-01-01".to_string(),
            gender: "Female".to_string(),
        };
        assert_eq!(
            document_body(&profile),
            json!({
                "fields": {
                    "username": { "stringValue": "ada" },
                    "email": { "stringValue": "a@b.com" },
                    "dob": { "stringValue": "1990-01-01" },
                    "gender": { "stringValue": "Female" }
                }
            })
        );
    }
}
