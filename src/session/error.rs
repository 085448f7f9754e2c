// ABOUTME: Error types for session lifecycle operations
// Failures surfaced to callers of login/register; restore failures resolve
// silently to logged-out and never appear here

use crate::identity::IdentityError;
use crate::session::persistence::StoreError;
use crate::token::TokenError;
use thiserror::Error;

/// Errors surfaced by session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Identity service response was missing the user or access token")]
    MalformedResponse,

    #[error("Access token could not be decoded: {0}")]
    Token(#[from] TokenError),

    #[error("Identity service error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}
