// ABOUTME: REST client for the storefront identity endpoints
// Transmits the raw secret; credential hashing is the server's concern

use super::{AuthPayload, IdentityError, IdentityService};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// `reqwest`-based identity client against the storefront REST backend.
pub struct HttpIdentityClient {
    base_url: String,
    http: reqwest::Client,
}

/// Error body shape the backend uses for rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

impl HttpIdentityClient {
    /// Create a client for a backend at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Surface a non-2xx response as a rejection with the server's message.
    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        IdentityError::Rejected(message)
    }
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn authenticate(&self, email: &str, secret: &str) -> Result<AuthPayload, IdentityError> {
        debug!("Authenticating {} against {}", email, self.base_url);
        let response = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(&json!({ "email": email, "password": secret }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(response.json::<AuthPayload>().await?)
    }

    async fn register(&self, email: &str, secret: &str) -> Result<(), IdentityError> {
        debug!("Registering {} against {}", email, self.base_url);
        let response = self
            .http
            .post(self.endpoint("/auth/register"))
            .json(&json!({ "email": email, "password": secret }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }

    async fn invalidate(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(self.endpoint("/auth/logout"))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }
}
