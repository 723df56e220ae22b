//! Session store - the single source of truth for auth state.
//!
//! All reads and writes of the session go through this store. State is
//! published as [`AuthSnapshot`]s over a watch channel; the TUI and CLI
//! subscribe instead of poking at tokens directly.
//!
//! ## Write discipline
//!
//! Every publish goes through `send_modify` and bumps `revision`. Slow
//! writers (startup restore, background refresh) capture the revision they
//! based their work on and only install their result if nothing newer
//! landed in between, so a sign-out always wins over an in-flight refresh.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::auth::cache;
use crate::auth::resolver::{self, Resolution};
use crate::auth::session::{AuthSnapshot, Session, now_secs};
use crate::config::paths;
use crate::identity::{IdentityClient, SessionRevoked};

/// Refresh this long before the access token expires.
const REFRESH_LEEWAY_SECS: u64 = 120;

/// Retry delay after a transient background refresh failure.
const REFRESH_RETRY: Duration = Duration::from_secs(30);

/// Shared handle to the auth state. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    identity: IdentityClient,
    cache_path: PathBuf,
    tx: watch::Sender<AuthSnapshot>,
    init: tokio::sync::Mutex<bool>,
    cancel: CancellationToken,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        // Stops the background refresh task with the last handle.
        self.cancel.cancel();
    }
}

impl SessionStore {
    /// Creates a store backed by the default credentials path.
    pub fn new(identity: IdentityClient) -> Self {
        Self::with_cache_path(identity, paths::credentials_path())
    }

    /// Creates a store with an explicit credentials path.
    pub fn with_cache_path(identity: IdentityClient, cache_path: PathBuf) -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::initial());
        Self {
            inner: Arc::new(StoreInner {
                identity,
                cache_path,
                tx,
                init: tokio::sync::Mutex::new(false),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Returns a receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Stops the background refresh task.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Runs startup resolution exactly once.
    ///
    /// Order is fixed: resolve the launch URL first (if any), fall back to
    /// the cached session otherwise, and flip `loading` off in the same
    /// publish that installs the result. Callers after the first get
    /// `NotApplicable` and no state change.
    pub async fn initialize(&self, redirect: Option<&Url>) -> Resolution {
        let mut initialized = self.inner.init.lock().await;
        if *initialized {
            return Resolution::NotApplicable;
        }

        let base_revision = self.inner.tx.borrow().revision;

        let resolution = match redirect {
            Some(url) => resolver::resolve_if_present(&self.inner.identity, url).await,
            None => Resolution::NotApplicable,
        };

        let restored = if let Resolution::Resolved { session, .. } = &resolution {
            if let Err(e) = cache::save_to(&self.inner.cache_path, session) {
                warn!("Failed to cache session: {e:#}");
            }
            Some(session.clone())
        } else {
            self.restore_silently().await
        };

        self.inner.tx.send_modify(|snapshot| {
            // A write that landed while we were resolving wins.
            if snapshot.revision == base_revision {
                snapshot.session = restored;
            }
            snapshot.loading = false;
            snapshot.revision += 1;
        });

        *initialized = true;
        drop(initialized);

        self.spawn_refresh_task();

        resolution
    }

    /// Resolves a redirect URL that arrived after startup (pasted into the
    /// login view, or delivered by the login listener).
    pub async fn resolve_redirect(&self, url: &Url) -> Resolution {
        let resolution = resolver::resolve_if_present(&self.inner.identity, url).await;

        if let Resolution::Resolved { session, .. } = &resolution {
            if let Err(e) = cache::save_to(&self.inner.cache_path, session) {
                warn!("Failed to cache session: {e:#}");
            }
            let session = session.clone();
            self.inner.tx.send_modify(|snapshot| {
                snapshot.session = Some(session);
                snapshot.revision += 1;
            });
        }

        resolution
    }

    /// Signs out.
    ///
    /// Local state is always cleared and subscribers always see the
    /// signed-out snapshot, even when remote revocation fails. The return
    /// value reports whether the remote side accepted the sign-out.
    pub async fn sign_out(&self) -> bool {
        let access_token = self
            .inner
            .tx
            .borrow()
            .session
            .as_ref()
            .map(|s| s.access_token.clone());

        let mut remote_ok = true;
        if let Some(token) = access_token
            && let Err(e) = self.inner.identity.logout(&token).await
        {
            warn!("Remote sign-out failed (continuing locally): {e:#}");
            remote_ok = false;
        }

        self.inner.tx.send_modify(|snapshot| {
            snapshot.session = None;
            snapshot.revision += 1;
        });

        if let Err(e) = cache::clear_at(&self.inner.cache_path) {
            warn!("Failed to clear session cache: {e:#}");
        }

        remote_ok
    }

    /// Restores the cached session, re-validating it against the identity
    /// service. Transient failures keep the cache for the next launch;
    /// revoked sessions drop it.
    async fn restore_silently(&self) -> Option<Session> {
        let cached = match cache::load_from(&self.inner.cache_path) {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to load cached session: {e:#}");
                return None;
            }
        };

        if cached.is_expired() {
            return self.refresh_restored(cached).await;
        }

        match self.inner.identity.get_user(&cached.access_token).await {
            Ok(user) => Some(Session {
                identity: user,
                ..cached
            }),
            Err(e) if e.downcast_ref::<SessionRevoked>().is_some() => {
                self.refresh_restored(cached).await
            }
            Err(e) => {
                warn!("Could not validate cached session: {e:#}");
                None
            }
        }
    }

    /// Refreshes a stale cached session. A revoked refresh token clears the
    /// cache so the next launch starts clean.
    async fn refresh_restored(&self, cached: Session) -> Option<Session> {
        let Some(refresh_token) = cached.refresh_token.as_deref() else {
            if let Err(e) = cache::clear_at(&self.inner.cache_path) {
                warn!("Failed to clear session cache: {e:#}");
            }
            return None;
        };

        match self.inner.identity.refresh(refresh_token).await {
            Ok(fresh) => {
                if let Err(e) = cache::save_to(&self.inner.cache_path, &fresh) {
                    warn!("Failed to cache refreshed session: {e:#}");
                }
                Some(fresh)
            }
            Err(e) if e.downcast_ref::<SessionRevoked>().is_some() => {
                info!("Cached session no longer valid; starting signed out");
                if let Err(e) = cache::clear_at(&self.inner.cache_path) {
                    warn!("Failed to clear session cache: {e:#}");
                }
                None
            }
            Err(e) => {
                warn!("Could not refresh cached session: {e:#}");
                None
            }
        }
    }

    /// Keeps the session fresh in the background.
    ///
    /// The task watches the published snapshot, sleeps until shortly before
    /// the access token expires, refreshes it, and publishes the outcome
    /// like any other session change. It holds channel handles rather than
    /// the store itself so the store can be dropped.
    fn spawn_refresh_task(&self) {
        let identity = self.inner.identity.clone();
        let cache_path = self.inner.cache_path.clone();
        let tx = self.inner.tx.clone();
        let mut rx = self.inner.tx.subscribe();
        let cancel = self.inner.cancel.clone();

        tokio::spawn(async move {
            loop {
                let (refresh_token, expires_at, revision) = {
                    let snapshot = rx.borrow_and_update();
                    match &snapshot.session {
                        Some(session) => (
                            session.refresh_token.clone(),
                            session.expires_at,
                            snapshot.revision,
                        ),
                        None => (None, 0, snapshot.revision),
                    }
                };

                // Without a refresh token there is nothing to do until the
                // session changes.
                let Some(refresh_token) = refresh_token else {
                    tokio::select! {
                        () = cancel.cancelled() => return,
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                    }
                    continue;
                };

                let due_in = expires_at
                    .saturating_sub(REFRESH_LEEWAY_SECS)
                    .saturating_sub(now_secs());

                tokio::select! {
                    () = cancel.cancelled() => return,
                    changed = rx.changed() => {
                        // The session changed under us; recompute.
                        if changed.is_err() {
                            return;
                        }
                        continue;
                    }
                    () = tokio::time::sleep(Duration::from_secs(due_in)) => {}
                }

                match identity.refresh(&refresh_token).await {
                    Ok(fresh) => {
                        let mut published = false;
                        tx.send_modify(|snapshot| {
                            if snapshot.revision == revision {
                                snapshot.session = Some(fresh.clone());
                                snapshot.revision += 1;
                                published = true;
                            }
                        });
                        // Persist only what was published; a concurrent
                        // sign-out must not be resurrected from disk.
                        if published && let Err(e) = cache::save_to(&cache_path, &fresh) {
                            warn!("Failed to cache refreshed session: {e:#}");
                        }
                    }
                    Err(e) if e.downcast_ref::<SessionRevoked>().is_some() => {
                        info!("Session revoked; signing out locally");
                        let mut published = false;
                        tx.send_modify(|snapshot| {
                            if snapshot.revision == revision {
                                snapshot.session = None;
                                snapshot.revision += 1;
                                published = true;
                            }
                        });
                        if published && let Err(e) = cache::clear_at(&cache_path) {
                            warn!("Failed to clear session cache: {e:#}");
                        }
                    }
                    Err(e) => {
                        warn!("Background refresh failed; will retry: {e:#}");
                        tokio::select! {
                            () = cancel.cancelled() => return,
                            changed = rx.changed() => {
                                if changed.is_err() {
                                    return;
                                }
                            }
                            () = tokio::time::sleep(REFRESH_RETRY) => {}
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::guard::{self, GuardDecision, RouteIntent};
    use crate::auth::session::Identity;

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn store_for(server: &MockServer, dir: &TempDir) -> SessionStore {
        let identity = IdentityClient::new(&server.uri(), "anon-key");
        SessionStore::with_cache_path(identity, dir.path().join("credentials.json"))
    }

    fn cached_session(expires_at: u64) -> Session {
        Session {
            access_token: "cached-access-token-123456".to_string(),
            refresh_token: Some("cached-refresh-token".to_string()),
            expires_at,
            identity: Identity {
                user_id: "user-1".to_string(),
                email: Some("old@example.com".to_string()),
                metadata: serde_json::Value::Null,
            },
        }
    }

    fn user_response() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "user-1",
            "email": "dev@example.com",
        }))
    }

    fn redirect_url() -> Url {
        Url::parse(
            "http://127.0.0.1:8400/callback#access_token=fresh-token&refresh_token=r1&expires_in=3600",
        )
        .unwrap()
    }

    /// Startup with nothing to restore: loading flips off, no session.
    #[tokio::test]
    async fn test_initialize_empty_finishes_loading() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        assert!(store.snapshot().loading);

        let resolution = store.initialize(None).await;

        assert!(matches!(resolution, Resolution::NotApplicable));
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.session_present());
        assert_eq!(snapshot.revision, 1);
    }

    /// Startup runs once: a second call is a no-op even with a redirect.
    #[tokio::test]
    async fn test_initialize_runs_once() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response())
            .expect(0)
            .mount(&server)
            .await;

        store.initialize(None).await;
        let url = redirect_url();
        let second = store.initialize(Some(&url)).await;

        assert!(matches!(second, Resolution::NotApplicable));
        assert_eq!(store.snapshot().revision, 1);
        assert!(!store.snapshot().session_present());
    }

    /// A launch redirect resolves into a session and a stripped URL.
    #[tokio::test]
    async fn test_initialize_resolves_redirect() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response())
            .expect(1)
            .mount(&server)
            .await;

        let url = redirect_url();
        let resolution = store.initialize(Some(&url)).await;

        match resolution {
            Resolution::Resolved {
                stripped_url,
                target,
                ..
            } => {
                assert_eq!(stripped_url.fragment(), None);
                assert_eq!(target, RouteIntent::ApiKey);
            }
            other => panic!("expected Resolved, got {other:?}"),
        }

        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.session_present());
        assert_eq!(snapshot.identity().unwrap().user_id, "user-1");

        // Session survives to the next launch.
        assert!(dir.path().join("credentials.json").exists());
    }

    /// A failed redirect reports why and leaves the user signed out, with
    /// loading finished either way.
    #[tokio::test]
    async fn test_initialize_failed_redirect() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let url = redirect_url();
        let resolution = store.initialize(Some(&url)).await;

        assert!(matches!(resolution, Resolution::Failed { .. }));
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.session_present());
    }

    /// A cached session is restored with a re-validated identity.
    #[tokio::test]
    async fn test_initialize_restores_cached_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let cache_path = dir.path().join("credentials.json");
        cache::save_to(&cache_path, &cached_session(now_secs() + 3600)).unwrap();

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response())
            .expect(1)
            .mount(&server)
            .await;

        store.initialize(None).await;

        let snapshot = store.snapshot();
        assert!(snapshot.session_present());
        // Identity comes from the service, not the stale cache.
        assert_eq!(
            snapshot.identity().unwrap().email.as_deref(),
            Some("dev@example.com")
        );
    }

    /// An expired cached session is refreshed instead of validated.
    #[tokio::test]
    async fn test_initialize_refreshes_expired_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let cache_path = dir.path().join("credentials.json");
        cache::save_to(&cache_path, &cached_session(now_secs() - 60)).unwrap();

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "refreshed-access-token-456",
                "refresh_token": "refreshed-refresh-token",
                "expires_in": 3600,
                "user": { "id": "user-1", "email": "dev@example.com" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        store.initialize(None).await;

        let snapshot = store.snapshot();
        assert!(snapshot.session_present());
        assert_eq!(
            snapshot.session.as_ref().unwrap().access_token,
            "refreshed-access-token-456"
        );

        // The refreshed session replaced the cached one.
        let on_disk = cache::load_from(&cache_path).unwrap().unwrap();
        assert_eq!(on_disk.access_token, "refreshed-access-token-456");
    }

    /// A revoked refresh token clears the cache and starts signed out.
    #[tokio::test]
    async fn test_initialize_clears_revoked_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let cache_path = dir.path().join("credentials.json");
        cache::save_to(&cache_path, &cached_session(now_secs() - 60)).unwrap();

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        store.initialize(None).await;

        assert!(!store.snapshot().session_present());
        assert!(!cache_path.exists());
    }

    /// Sign-out always clears local state, even when the server refuses.
    #[tokio::test]
    async fn test_sign_out_clears_locally_on_remote_failure() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let cache_path = dir.path().join("credentials.json");
        cache::save_to(&cache_path, &cached_session(now_secs() + 3600)).unwrap();

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        store.initialize(None).await;
        assert!(store.snapshot().session_present());

        let remote_ok = store.sign_out().await;

        assert!(!remote_ok);
        assert!(!store.snapshot().session_present());
        assert!(!cache_path.exists());
    }

    /// Sign-out with no session is a quiet success.
    #[tokio::test]
    async fn test_sign_out_without_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        store.initialize(None).await;
        assert!(store.sign_out().await);
        assert!(!store.snapshot().session_present());
    }

    /// A protected view holds while loading, then denies once startup
    /// finishes without a session.
    #[tokio::test]
    async fn test_guard_pending_then_deny_across_startup() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        assert_eq!(
            guard::decide(RouteIntent::Repos, &store.snapshot()),
            GuardDecision::Pending
        );

        store.initialize(None).await;

        assert_eq!(
            guard::decide(RouteIntent::Repos, &store.snapshot()),
            GuardDecision::Deny
        );
    }

    /// A redirect pasted after startup signs the user in and notifies
    /// subscribers.
    #[tokio::test]
    async fn test_resolve_redirect_after_startup() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response())
            .mount(&server)
            .await;

        store.initialize(None).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let url = redirect_url();
        let resolution = store.resolve_redirect(&url).await;

        assert!(matches!(resolution, Resolution::Resolved { .. }));
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert!(seen.session_present());
        assert_eq!(seen.revision, 2);
    }

    /// A sign-out that lands while startup restore is still in flight wins;
    /// the slow restore must not install the session it read.
    #[tokio::test]
    async fn test_sign_out_wins_over_in_flight_initialize() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let cache_path = dir.path().join("credentials.json");
        cache::save_to(&cache_path, &cached_session(now_secs() + 3600)).unwrap();

        // Hold the restore validation in flight long enough to race it.
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response().set_delay(Duration::from_millis(800)))
            .mount(&server)
            .await;

        let init = tokio::spawn({
            let store = store.clone();
            async move { store.initialize(None).await }
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Nothing has been published yet, so this is a purely local
        // sign-out that bumps the revision under the restore.
        assert!(store.sign_out().await);
        let revision_after_sign_out = store.snapshot().revision;

        init.await.unwrap();

        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.session_present());
        assert!(snapshot.revision > revision_after_sign_out);
        assert!(!cache_path.exists());
    }

    /// A sign-out racing the background refresh wins: the late refresh
    /// result is discarded and the cleared cache is not rewritten.
    #[tokio::test]
    async fn test_sign_out_wins_over_background_refresh() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let cache_path = dir.path().join("credentials.json");
        // Inside the refresh leeway, so the background task refreshes at
        // once after startup.
        cache::save_to(&cache_path, &cached_session(now_secs() + 60)).unwrap();

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(user_response())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        // The refresh is slow; the sign-out lands while it is in flight.
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "access_token": "late-refresh-token-123456",
                        "refresh_token": "late-refresh",
                        "expires_in": 3600,
                        "user": { "id": "user-1", "email": "dev@example.com" },
                    }))
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;

        store.initialize(None).await;
        assert!(store.snapshot().session_present());

        // Give the refresh task time to pick up the session and start the
        // slow refresh request.
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.sign_out().await);
        let revision_after_sign_out = store.snapshot().revision;

        // Let the late refresh response arrive and be discarded.
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let snapshot = store.snapshot();
        assert!(!snapshot.session_present());
        assert_eq!(snapshot.revision, revision_after_sign_out);
        assert!(!cache_path.exists());
    }
}
