// ABOUTME: Core data models for storefront sessions and users

pub mod session;

pub use session::{AuthUser, Session, SessionState};
