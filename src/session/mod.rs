// ABOUTME: Session module for the storefront client
// Provides the session lifecycle manager, its errors, and credential persistence

pub mod error;
pub mod manager;
pub mod persistence;

pub use error::SessionError;
pub use manager::SessionManager;
pub use persistence::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError};
