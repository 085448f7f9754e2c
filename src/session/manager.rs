// ABOUTME: Session lifecycle management for the storefront client
// Restores persisted credentials at startup, schedules expiry-driven
// auto-logout, and exposes login/logout/register transitions

use crate::config::SessionConfig;
use crate::identity::{HttpIdentityClient, IdentityService};
use crate::models::{AuthUser, Session, SessionState};
use crate::session::error::SessionError;
use crate::session::persistence::{CredentialStore, FileCredentialStore, StoreError};
use crate::token::{self, TokenError};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Callback invoked when a live session ends, so the view layer can
/// redirect to its login screen without the core depending on routing.
type Navigator = Box<dyn Fn() + Send + Sync>;

/// Scheduled auto-logout task; aborted on drop so every cancellation path
/// (explicit logout, superseding login, manager teardown) kills the timer.
struct ExpiryTimer {
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Mutable session state, shared between the manager and its expiry timer.
struct SessionInner {
    state: SessionState,
    session: Option<Session>,
    ready: bool,
    /// Bumped on every schedule and teardown; a timer that fires with a
    /// stale generation is a no-op.
    generation: u64,
    expiry_timer: Option<ExpiryTimer>,
    navigator: Option<Navigator>,
}

/// Why persisted credentials were discarded at restore.
#[derive(Debug, Error)]
enum RestoreFailure {
    #[error("user record is not valid JSON: {0}")]
    CorruptUser(#[from] serde_json::Error),

    #[error("access token is undecodable: {0}")]
    Token(#[from] TokenError),

    #[error("access token has expired")]
    Expired,
}

/// Owns the current session: restore-once at startup, expiry scheduling,
/// and the login/logout/register transitions.
///
/// Collaborators (credential store, identity service, navigation callback)
/// are injected so tests can construct isolated instances.
pub struct SessionManager {
    inner: Arc<Mutex<SessionInner>>,
    store: Arc<dyn CredentialStore>,
    identity: Arc<dyn IdentityService>,
    user_key: String,
    token_key: String,
}

impl SessionManager {
    /// Create a manager with explicit collaborators.
    pub fn new(
        config: &SessionConfig,
        store: Arc<dyn CredentialStore>,
        identity: Arc<dyn IdentityService>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Initializing,
                session: None,
                ready: false,
                generation: 0,
                expiry_timer: None,
                navigator: None,
            })),
            store,
            identity,
            user_key: config.user_key.clone(),
            token_key: config.token_key.clone(),
        }
    }

    /// Create a manager wired to the file store and REST identity client.
    pub fn from_config(config: &SessionConfig) -> Result<Self, StoreError> {
        let store = Arc::new(FileCredentialStore::open(&config.credentials_path)?);
        let identity = Arc::new(HttpIdentityClient::new(config.api_base_url.as_str()));
        Ok(Self::new(config, store, identity))
    }

    /// Install the navigation callback invoked when a live session ends.
    pub fn with_navigator(self, navigate: impl Fn() + Send + Sync + 'static) -> Self {
        self.lock().navigator = Some(Box::new(navigate));
        self
    }

    /// Restore a persisted session. Runs the restore logic once; later
    /// calls return the current state unchanged.
    ///
    /// Absent credentials resolve to logged-out with the store untouched.
    /// Present-but-invalid credentials (corrupt user record, undecodable
    /// token, expired token) clear the store and resolve to logged-out;
    /// nothing is surfaced to the caller in either case.
    pub fn restore(&self) -> SessionState {
        let mut inner = self.lock();
        if inner.ready {
            return inner.state;
        }

        let user_raw = self.store.get(&self.user_key);
        let token = self.store.get(&self.token_key);

        inner.state = match (user_raw, token) {
            (Some(user_raw), Some(token)) => match Self::revive(&user_raw, token) {
                Ok(session) => {
                    info!("Restored session for {}", session.user.email);
                    let expires_at = session.expires_at;
                    inner.session = Some(session);
                    self.schedule_expiry(&mut inner, expires_at);
                    SessionState::LoggedIn
                }
                Err(reason) => {
                    warn!("Discarding persisted credentials: {}", reason);
                    self.clear_persisted();
                    SessionState::LoggedOut
                }
            },
            _ => {
                debug!("No persisted credentials found");
                SessionState::LoggedOut
            }
        };

        inner.ready = true;
        inner.state
    }

    /// Authenticate against the identity service and establish a session.
    ///
    /// A successful response missing the user or token is rejected as
    /// [`SessionError::MalformedResponse`] with state unchanged. A new
    /// login replaces any previous session wholesale and reschedules the
    /// expiry timer.
    pub async fn login(&self, email: &str, secret: &str) -> Result<AuthUser, SessionError> {
        let payload = self.identity.authenticate(email, secret).await?;

        let (user, access_token) = match (payload.user, payload.access_token) {
            (Some(user), Some(token)) => (user, token),
            _ => return Err(SessionError::MalformedResponse),
        };

        // Decode before persisting so a bad token leaves no trace.
        let expires_at = token::decode_expiry(&access_token)?;
        let serialized = serde_json::to_string(&user).map_err(StoreError::from)?;

        // Persist under the session lock so a concurrently firing expiry
        // timer cannot interleave between the store write and the state swap
        let mut inner = self.lock();
        self.store.set(&self.user_key, &serialized)?;
        self.store.set(&self.token_key, &access_token)?;

        inner.expiry_timer = None;
        inner.session = Some(Session {
            user: user.clone(),
            access_token,
            expires_at,
        });
        inner.state = SessionState::LoggedIn;
        self.schedule_expiry(&mut inner, expires_at);

        info!("Logged in as {}", user.email);
        Ok(user)
    }

    /// End the current session: cancel the expiry timer, clear the store,
    /// drop the in-memory session, notify the navigator, and fire a
    /// best-effort server-side invalidation.
    ///
    /// Idempotent: calling with no live session is a no-op.
    pub fn logout(&self) {
        let mut inner = self.lock();
        end_session(
            &mut inner,
            self.store.as_ref(),
            &self.user_key,
            &self.token_key,
            &self.identity,
        );
    }

    /// Create an account with the identity service.
    ///
    /// Establishes no session; a subsequent [`login`](Self::login) is
    /// required. Failures propagate unchanged.
    pub async fn register(&self, email: &str, secret: &str) -> Result<(), SessionError> {
        self.identity.register(email, secret).await?;
        info!("Registered account for {}", email);
        Ok(())
    }

    /// Whether the startup restore has completed.
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.lock().session.as_ref().map(|s| s.user.clone())
    }

    /// The live bearer token, for attaching to backend requests.
    pub fn access_token(&self) -> Option<String> {
        self.lock().session.as_ref().map(|s| s.access_token.clone())
    }

    /// Validate persisted credentials and rebuild the session.
    fn revive(user_raw: &str, access_token: String) -> Result<Session, RestoreFailure> {
        let user: AuthUser = serde_json::from_str(user_raw)?;
        let expires_at = token::decode_expiry(&access_token)?;
        if expires_at <= Utc::now() {
            return Err(RestoreFailure::Expired);
        }
        Ok(Session {
            user,
            access_token,
            expires_at,
        })
    }

    /// Arrange for auto-logout at `expires_at`, replacing any pending timer.
    fn schedule_expiry(&self, inner: &mut SessionInner, expires_at: DateTime<Utc>) {
        inner.generation += 1;
        let generation = inner.generation;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; session expiry will not fire automatically");
            return;
        };

        let delay = (expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let weak = Arc::downgrade(&self.inner);
        let store = Arc::clone(&self.store);
        let identity = Arc::clone(&self.identity);
        let user_key = self.user_key.clone();
        let token_key = self.token_key.clone();

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            expire(&weak, store.as_ref(), &user_key, &token_key, &identity, generation);
        });
        inner.expiry_timer = Some(ExpiryTimer { handle });

        debug!("Session expiry scheduled in {:?}", delay);
    }

    /// Best-effort removal of both persisted credential fields.
    fn clear_persisted(&self) {
        if let Err(e) = self.store.remove(&self.user_key) {
            warn!("Failed to remove persisted user record: {}", e);
        }
        if let Err(e) = self.store.remove(&self.token_key) {
            warn!("Failed to remove persisted access token: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // Aborts any pending expiry task via ExpiryTimer::drop
        self.lock().expiry_timer.take();
    }
}

/// Expiry timer body: converge on the same teardown as explicit logout.
/// A dropped manager or a stale generation makes this a no-op.
fn expire(
    inner: &Weak<Mutex<SessionInner>>,
    store: &dyn CredentialStore,
    user_key: &str,
    token_key: &str,
    identity: &Arc<dyn IdentityService>,
    generation: u64,
) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut guard = inner.lock().unwrap_or_else(|e| e.into_inner());
    if guard.generation != generation {
        return;
    }
    debug!("Session expiry fired");
    end_session(&mut guard, store, user_key, token_key, identity);
}

/// Shared teardown for explicit logout and expiry firing.
///
/// Side effects (store removal, navigation, server-side invalidation) run
/// only when a live session was actually cleared, which is what makes the
/// logout-vs-expiry race produce exactly one observable teardown.
fn end_session(
    inner: &mut SessionInner,
    store: &dyn CredentialStore,
    user_key: &str,
    token_key: &str,
    identity: &Arc<dyn IdentityService>,
) {
    inner.expiry_timer = None;
    inner.generation += 1;
    inner.state = SessionState::LoggedOut;

    let Some(session) = inner.session.take() else {
        debug!("Logout with no active session; nothing to do");
        return;
    };

    if let Err(e) = store.remove(user_key) {
        warn!("Failed to remove persisted user record: {}", e);
    }
    if let Err(e) = store.remove(token_key) {
        warn!("Failed to remove persisted access token: {}", e);
    }

    info!("Session for {} ended", session.user.email);

    if let Some(navigate) = &inner.navigator {
        navigate();
    }

    // Fire-and-forget: local logout never waits on the network
    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
        let identity = Arc::clone(identity);
        let token = session.access_token;
        runtime.spawn(async move {
            if let Err(e) = identity.invalidate(&token).await {
                debug!("Server-side invalidation failed: {}", e);
            }
        });
    }
}
