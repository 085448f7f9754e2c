// ABOUTME: Identity service collaborator for the session core
// Defines the async trait the session manager calls and its REST implementation

pub mod client;

pub use client::HttpIdentityClient;

use crate::models::AuthUser;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the identity service collaborator.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Identity service rejected the request: {0}")]
    Rejected(String),
}

/// Successful authenticate response body.
///
/// Both fields are optional so the session manager can detect a response
/// that is missing the user or the token, rather than failing inside
/// deserialization with a less precise error.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    /// The authenticated user, if the service included one.
    #[serde(default)]
    pub user: Option<AuthUser>,
    /// The bearer credential, if the service included one.
    #[serde(default, rename = "accessToken", alias = "access_token")]
    pub access_token: Option<String>,
}

/// Asynchronous identity operations against the storefront backend.
///
/// Injected into the session manager so tests can substitute a stub.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange credentials for a user record and access token.
    async fn authenticate(&self, email: &str, secret: &str) -> Result<AuthPayload, IdentityError>;

    /// Create an account. Does not establish a session.
    async fn register(&self, email: &str, secret: &str) -> Result<(), IdentityError>;

    /// Best-effort server-side session invalidation.
    async fn invalidate(&self, access_token: &str) -> Result<(), IdentityError>;
}
