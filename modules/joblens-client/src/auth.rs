// Credential lifecycle and the retry-once replay path.
//
// One gateway instance per session. Every outbound request passes through
// `send`, which attaches the current access token and resolves 401s by
// refreshing through the identity provider — single-flight, so N requests
// failing together produce one refresh, never N.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

use joblens_common::SyncError;

use crate::identity::IdentityProvider;

/// Access/refresh token pair. Held in memory only, for the session lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}

/// Collaborator notified when the session ends (failed refresh). The
/// navigation layer redirects to login from here; this is the gateway's only
/// externally visible side effect.
pub trait SessionSink: Send + Sync {
    fn session_expired(&self);
}

/// Sink for contexts with no navigation layer (tests, one-shot tools).
pub struct NullSessionSink;

impl SessionSink for NullSessionSink {
    fn session_expired(&self) {}
}

pub struct AuthGateway {
    http: reqwest::Client,
    identity: Arc<dyn IdentityProvider>,
    session: Arc<dyn SessionSink>,
    creds: RwLock<Option<Credentials>>,
    /// Bumped on every successful refresh or login. A 401 handler that
    /// captured an older value knows a concurrent request already refreshed
    /// and skips its own refresh.
    epoch: AtomicU64,
    logged_out: AtomicBool,
    /// At most one caller talks to the identity provider at a time; the rest
    /// queue here and re-check the epoch once inside.
    refresh_flight: tokio::sync::Mutex<()>,
}

impl AuthGateway {
    pub fn new(
        http: reqwest::Client,
        identity: Arc<dyn IdentityProvider>,
        session: Arc<dyn SessionSink>,
    ) -> Self {
        Self {
            http,
            identity,
            session,
            creds: RwLock::new(None),
            epoch: AtomicU64::new(0),
            logged_out: AtomicBool::new(false),
            refresh_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Exchange username/password for a credential pair and seed the gateway.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SyncError> {
        let creds = self.identity.login(username, password).await?;
        self.set_credentials(creds);
        info!("logged in");
        Ok(())
    }

    pub fn set_credentials(&self, creds: Credentials) {
        *self.creds.write().unwrap() = Some(creds);
        self.logged_out.store(false, Ordering::Release);
        self.epoch.fetch_add(1, Ordering::Release);
    }

    pub fn is_logged_out(&self) -> bool {
        self.logged_out.load(Ordering::Acquire)
    }

    fn access_token(&self) -> Option<String> {
        self.creds.read().unwrap().as_ref().map(|c| c.access.clone())
    }

    /// Send a request, refreshing and replaying once on 401.
    ///
    /// `build` is called per attempt so the replay gets a fresh builder with
    /// the new bearer token. The `retried` flag is explicit loop state: a
    /// request that already replayed fails terminally on a second 401 instead
    /// of triggering another refresh.
    pub async fn send<F>(&self, build: F) -> Result<Response, SyncError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut retried = false;
        loop {
            let observed = self.epoch.load(Ordering::Acquire);
            let mut request = build(&self.http);
            if let Some(token) = self.access_token() {
                request = request.bearer_auth(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;

            if response.status() == StatusCode::UNAUTHORIZED {
                if retried {
                    warn!("request rejected again after refresh, failing terminally");
                    return Err(SyncError::AuthExpired);
                }
                retried = true;
                self.refresh_access(observed).await?;
                continue;
            }
            return Ok(response);
        }
    }

    /// Refresh the access token, single-flight.
    ///
    /// `observed_epoch` is the epoch the caller saw when it sent the failing
    /// request. Inside the lock, an advanced epoch means another request
    /// already refreshed while we queued — nothing to do but replay.
    async fn refresh_access(&self, observed_epoch: u64) -> Result<(), SyncError> {
        let _flight = self.refresh_flight.lock().await;

        if self.logged_out.load(Ordering::Acquire) {
            return Err(SyncError::AuthExpired);
        }
        if self.epoch.load(Ordering::Acquire) != observed_epoch {
            debug!("credential already refreshed by a concurrent request");
            return Ok(());
        }

        let refresh_token = match self.creds.read().unwrap().as_ref() {
            Some(creds) => creds.refresh.clone(),
            None => return Err(SyncError::AuthExpired),
        };

        info!("access credential expired, refreshing");
        match self.identity.refresh(&refresh_token).await {
            Ok(access) => {
                if let Some(creds) = self.creds.write().unwrap().as_mut() {
                    creds.access = access;
                }
                self.epoch.fetch_add(1, Ordering::Release);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "credential refresh failed, ending session");
                *self.creds.write().unwrap() = None;
                self.logged_out.store(true, Ordering::Release);
                self.session.session_expired();
                Err(SyncError::AuthExpired)
            }
        }
    }
}
