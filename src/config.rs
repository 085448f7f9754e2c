// ABOUTME: Configuration for the session core
// Backend location, credential file path, and the two reserved store keys

use std::path::PathBuf;

use crate::session::persistence::FileCredentialStore;

/// Reserved store key for the serialized user record.
pub const USER_KEY: &str = "auth_user";
/// Reserved store key for the raw access token.
pub const TOKEN_KEY: &str = "access_token";

/// Configuration for the session manager and its collaborators.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the storefront REST backend.
    pub api_base_url: String,
    /// Location of the credential file.
    pub credentials_path: PathBuf,
    /// Store key under which the user record is persisted.
    pub user_key: String,
    /// Store key under which the access token is persisted.
    pub token_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            credentials_path: FileCredentialStore::default_path(),
            user_key: USER_KEY.to_string(),
            token_key: TOKEN_KEY.to_string(),
        }
    }
}

impl SessionConfig {
    /// Load configuration, honoring `STOREFRONT_API_URL` and
    /// `STOREFRONT_CREDENTIALS_PATH` environment overrides.
    pub fn load() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("STOREFRONT_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(path) = std::env::var("STOREFRONT_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(path);
        }
        config
    }
}
