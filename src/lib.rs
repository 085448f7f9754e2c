// ABOUTME: Client-side session core for the storefront application
// Exposes the session manager, credential stores, and identity client as a
// library; view components consume it through dependency passing

pub mod config;
pub mod identity;
pub mod models;
pub mod session;
pub mod token;

pub use config::SessionConfig;
pub use identity::{AuthPayload, HttpIdentityClient, IdentityError, IdentityService};
pub use models::{AuthUser, Session, SessionState};
pub use session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionError, SessionManager,
};
