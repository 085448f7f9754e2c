// ABOUTME: Shared test fixtures: forged tokens, a stub identity service,
// and seeded credential stores

#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_session::config::{TOKEN_KEY, USER_KEY};
use storefront_session::{
    AuthPayload, AuthUser, IdentityError, IdentityService, MemoryCredentialStore,
};

/// Forge an unsigned JWT whose payload carries the given `exp` claim.
pub fn forge_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{exp}}}"#).as_bytes());
    format!("{header}.{payload}.sig")
}

pub fn test_user() -> AuthUser {
    AuthUser {
        id: 1,
        email: "a@b.com".to_string(),
        name: None,
    }
}

/// A memory store pre-seeded with both credential keys.
pub fn seeded_store(user: &AuthUser, token: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_entries([
        (USER_KEY, serde_json::to_string(user).unwrap().as_str()),
        (TOKEN_KEY, token),
    ]))
}

#[derive(Clone)]
enum AuthScript {
    Respond {
        user: Option<AuthUser>,
        token: Option<String>,
    },
    Reject(String),
}

/// Scriptable identity service that records call counts. Authenticate
/// responses are consumed in order; the last one repeats.
pub struct StubIdentity {
    responses: Mutex<VecDeque<AuthScript>>,
    reject_register: Option<String>,
    pub register_calls: AtomicUsize,
    pub invalidate_calls: AtomicUsize,
}

impl StubIdentity {
    pub fn succeeding(user: AuthUser, token: String) -> Self {
        Self::with_script(AuthScript::Respond {
            user: Some(user),
            token: Some(token),
        })
    }

    /// Authenticate "succeeds" but the body is an empty object.
    pub fn empty_response() -> Self {
        Self::with_script(AuthScript::Respond {
            user: None,
            token: None,
        })
    }

    pub fn rejecting(message: &str) -> Self {
        Self::with_script(AuthScript::Reject(message.to_string()))
    }

    /// Queue a further successful authenticate response.
    pub fn then_succeeding(self, user: AuthUser, token: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(AuthScript::Respond {
                user: Some(user),
                token: Some(token),
            });
        self
    }

    pub fn with_failing_register(mut self, message: &str) -> Self {
        self.reject_register = Some(message.to_string());
        self
    }

    fn with_script(script: AuthScript) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([script])),
            reject_register: None,
            register_calls: AtomicUsize::new(0),
            invalidate_calls: AtomicUsize::new(0),
        }
    }

    fn next_script(&self) -> AuthScript {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().expect("non-empty queue")
        } else {
            responses.front().expect("script queue is empty").clone()
        }
    }
}

#[async_trait::async_trait]
impl IdentityService for StubIdentity {
    async fn authenticate(&self, _email: &str, _secret: &str) -> Result<AuthPayload, IdentityError> {
        match self.next_script() {
            AuthScript::Respond { user, token } => Ok(AuthPayload {
                user,
                access_token: token,
            }),
            AuthScript::Reject(message) => Err(IdentityError::Rejected(message)),
        }
    }

    async fn register(&self, _email: &str, _secret: &str) -> Result<(), IdentityError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        match &self.reject_register {
            Some(message) => Err(IdentityError::Rejected(message.clone())),
            None => Ok(()),
        }
    }

    async fn invalidate(&self, _access_token: &str) -> Result<(), IdentityError> {
        self.invalidate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

static TRACING: std::sync::Once = std::sync::Once::new();

/// Route library tracing through the test harness's captured output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storefront_session=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Let spawned tasks (expiry teardown, server-side invalidation) run.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
