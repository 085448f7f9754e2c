// ABOUTME: Core data model for an authenticated storefront session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record for the logged-in user, as returned by the identity
/// service and persisted between restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend-assigned user id.
    pub id: i64,
    /// Account email address.
    pub email: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Observable lifecycle state of the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Startup restore has not completed yet; session reads are suppressed.
    Initializing,
    /// No live session.
    LoggedOut,
    /// A live session with a scheduled expiry.
    LoggedIn,
}

impl SessionState {
    /// Whether a live session is established.
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn)
    }
}

/// A live session: the user, their bearer credential, and the instant at
/// which the credential expires. Replaced wholesale on a new login, never
/// partially updated.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user.
    pub user: AuthUser,
    /// Opaque bearer token; always paired with `user`.
    pub access_token: String,
    /// Expiry instant decoded from the token's expiry claim.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session's credential has already expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Time remaining until expiry, clamped to zero for expired sessions.
    pub fn remaining(&self) -> std::time::Duration {
        (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}
