//! The refresh coordinator: one refresh exchange, however many requests
//! are rejected at once.
//!
//! Every outbound request goes through [`RefreshCoordinator::send`]. It is
//! stamped with the current access token and sent. When the server answers
//! 401, the coordinator decides what to do with it:
//!
//! ```text
//!                   401 on request R
//!                          │
//!       ┌──────────────────┼───────────────────┐
//!       ▼                  ▼                   ▼
//!  no session          Refreshing             Idle
//!       │                  │          ┌────────┴─────────┐
//!       ▼                  ▼          ▼                  ▼
//! SessionExpired        queue R   token used by R    token used by R
//!                                 is not current     is current
//!                                       │                  │
//!                                       ▼                  ▼
//!                                 replay R once      flip to Refreshing,
//!                                 with current       queue R, spawn
//!                                                    the exchange
//! ```
//!
//! While an exchange is in flight the current access token is the one
//! already rejected, so every 401 joins the queue whatever token it used.
//!
//! When the exchange resolves, the queue is drained in arrival order:
//! replayed with the new access token on success, or failed with
//! [`SessionError::SessionExpired`] on failure (and the session cleared).
//! A login that lands mid-exchange takes the queue over and replays it
//! with the token it obtained.
//!
//! # Concurrency note
//!
//! All mutable state (phase, queue, cached session, epoch) sits behind one
//! `std::sync::Mutex` that is never held across an `.await`. Observing
//! `Idle` and flipping to `Refreshing` happen under the same lock, which
//! is what makes the exchange single-flight. The exchange runs in its own
//! tokio task, so dropping the request that started it does not strand the
//! others.
//!
//! Session store writes also happen under that lock, so the persisted
//! record always matches the cached session. They are synchronous and
//! never span an `.await`.

use std::collections::VecDeque;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use questline_protocol::{
    ApiRequest, ApiResponse, Identity, JsonCodec, LoginRequest, Method, RefreshRequest,
    TokenPair, LOGIN_PATH, REFRESH_PATH,
};
use tokio::sync::oneshot;

use crate::{Session, SessionError, SessionStore, Transport};

/// Tuning for a [`RefreshCoordinator`].
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    /// Upper bound on one refresh exchange. Once it elapses the exchange
    /// counts as failed. `None` (the default) waits as long as the
    /// transport does.
    pub refresh_timeout: Option<Duration>,
}

/// Whether a refresh exchange is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Refreshing,
}

/// A rejected request parked until the in-flight exchange resolves.
struct RefreshWaiter {
    request: ApiRequest,
    reply: oneshot::Sender<Result<ApiResponse, SessionError>>,
}

enum RefreshState {
    Idle,
    Refreshing { waiters: VecDeque<RefreshWaiter> },
}

struct State {
    refresh: RefreshState,
    session: Option<Session>,
    /// Bumped whenever the session is replaced or ended by anything other
    /// than a refresh. An exchange started under an older epoch has its
    /// result thrown away.
    epoch: u64,
}

impl State {
    fn access_token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.access_token.clone())
    }

    fn take_waiters(&mut self) -> VecDeque<RefreshWaiter> {
        match mem::replace(&mut self.refresh, RefreshState::Idle) {
            RefreshState::Idle => VecDeque::new(),
            RefreshState::Refreshing { waiters } => waiters,
        }
    }

    /// Drops the session and detaches it from any in-flight exchange.
    fn end_session(&mut self) -> VecDeque<RefreshWaiter> {
        self.session = None;
        self.epoch += 1;
        self.take_waiters()
    }
}

/// What to do with a 401, decided under the lock.
enum Rejection {
    NoSession,
    Replay(ApiRequest, String),
    Wait { start: Option<(u64, String)> },
}

struct Shared<T> {
    transport: T,
    store: Arc<dyn SessionStore>,
    codec: JsonCodec,
    config: CoordinatorConfig,
    state: Mutex<State>,
}

/// Client-side gatekeeper for authenticated requests.
///
/// Cheap to clone; clones share the same session and the same queue.
pub struct RefreshCoordinator<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for RefreshCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Transport> RefreshCoordinator<T> {
    /// Creates a coordinator, picking up whatever session `store` holds.
    pub fn new(transport: T, store: Arc<dyn SessionStore>) -> Self {
        Self::with_config(transport, store, CoordinatorConfig::default())
    }

    pub fn with_config(
        transport: T,
        store: Arc<dyn SessionStore>,
        config: CoordinatorConfig,
    ) -> Self {
        let session = store.get().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored session unreadable, starting logged out");
            None
        });
        if let Some(session) = &session {
            tracing::info!(user_id = %session.identity.id, "session restored");
        }

        Self {
            shared: Arc::new(Shared {
                transport,
                store,
                codec: JsonCodec,
                config,
                state: Mutex::new(State {
                    refresh: RefreshState::Idle,
                    session,
                    epoch: 0,
                }),
            }),
        }
    }

    // -----------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------

    /// Sends `request` on behalf of the current session.
    ///
    /// Login and refresh calls pass straight through without a bearer
    /// header, and their responses (401 included) are returned as is.
    ///
    /// # Errors
    /// - [`SessionError::SessionExpired`]: the request was rejected and no
    ///   valid session could be recovered
    /// - [`SessionError::Transport`]: no response arrived
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        if request.is_auth_endpoint() {
            return Ok(self.shared.transport.send(request.with_bearer(None)).await?);
        }

        let token = self.shared.lock().access_token();
        let response = self
            .shared
            .transport
            .send(request.clone().with_bearer(token.as_deref()))
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        self.handle_rejection(request, token).await
    }

    async fn handle_rejection(
        &self,
        request: ApiRequest,
        used: Option<String>,
    ) -> Result<ApiResponse, SessionError> {
        let (reply, receiver) = oneshot::channel();

        let rejection = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            match &state.session {
                None => Rejection::NoSession,
                Some(current) => {
                    if let RefreshState::Refreshing { waiters } = &mut state.refresh {
                        waiters.push_back(RefreshWaiter { request, reply });
                        Rejection::Wait { start: None }
                    } else if used.as_deref() != Some(current.access_token.as_str()) {
                        Rejection::Replay(request, current.access_token.clone())
                    } else {
                        state.refresh = RefreshState::Refreshing {
                            waiters: VecDeque::from([RefreshWaiter { request, reply }]),
                        };
                        Rejection::Wait {
                            start: Some((state.epoch, current.refresh_token.clone())),
                        }
                    }
                }
            }
        };

        match rejection {
            Rejection::NoSession => {
                tracing::debug!("request rejected with no session");
                Err(SessionError::SessionExpired)
            }
            Rejection::Replay(request, token) => {
                tracing::debug!(path = %request.path, "rejected with a superseded token");
                Arc::clone(&self.shared).replay(request, token).await
            }
            Rejection::Wait { start } => {
                if let Some((epoch, refresh_token)) = start {
                    tokio::spawn(Arc::clone(&self.shared).run_refresh(epoch, refresh_token));
                }
                receiver.await.unwrap_or(Err(SessionError::SessionExpired))
            }
        }
    }

    // -----------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------

    /// Logs in and stores the new session.
    ///
    /// A login that lands during a refresh exchange wins: requests queued
    /// on that exchange are replayed with the new access token and the
    /// exchange's result is discarded.
    ///
    /// # Errors
    /// - [`SessionError::InvalidCredentials`]: the server refused them
    /// - [`SessionError::Store`]: the new session could not be persisted
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let request = ApiRequest::encoded(
            Method::Post,
            LOGIN_PATH,
            &self.shared.codec,
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )?;

        let response = self.shared.transport.send(request).await?;
        if response.is_unauthorized() {
            return Err(SessionError::InvalidCredentials);
        }
        if !response.is_success() {
            return Err(SessionError::UnexpectedStatus(response.status));
        }
        let pair: TokenPair = response.decode_body(&self.shared.codec)?;
        let session = Session::from(pair);
        let identity = session.identity.clone();

        let token = session.access_token.clone();
        let superseded = {
            let mut state = self.shared.lock();
            self.shared.store.set(&session)?;
            let superseded = state.end_session();
            state.session = Some(session);
            superseded
        };
        if !superseded.is_empty() {
            tracing::info!(waiters = superseded.len(), "login superseded an in-flight refresh");
            tokio::spawn(Arc::clone(&self.shared).replay_all(superseded, token));
        }

        tracing::info!(user_id = %identity.id, "logged in");
        Ok(identity)
    }

    /// Ends the session. Requests queued on an in-flight exchange fail
    /// with [`SessionError::SessionExpired`]; the exchange's later result
    /// is discarded.
    ///
    /// # Errors
    /// [`SessionError::Store`] if the persisted record could not be
    /// removed. The in-memory session is gone either way.
    pub fn logout(&self) -> Result<(), SessionError> {
        let (waiters, cleared) = {
            let mut state = self.shared.lock();
            (state.end_session(), self.shared.store.clear())
        };
        fail_all(waiters);
        tracing::info!("logged out");
        cleared.map_err(SessionError::from)
    }

    // -----------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        match self.shared.lock().refresh {
            RefreshState::Idle => Phase::Idle,
            RefreshState::Refreshing { .. } => Phase::Refreshing,
        }
    }

    /// Number of requests parked on the in-flight exchange.
    pub fn waiting(&self) -> usize {
        match &self.shared.lock().refresh {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.shared.lock().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.lock().session.is_some()
    }
}

impl<T: Transport> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one exchange and settles every waiter queued on it.
    async fn run_refresh(self: Arc<Self>, epoch: u64, refresh_token: String) {
        tracing::info!("refresh exchange started");
        let outcome = self.exchange(refresh_token).await;

        let (waiters, settled) = {
            let mut state = self.lock();
            if state.epoch != epoch {
                tracing::info!("session changed during refresh, result discarded");
                return;
            }
            match outcome {
                Ok(pair) => {
                    let session = Session::from(pair);
                    if let Err(e) = self.store.set(&session) {
                        tracing::warn!(error = %e, "failed to persist refreshed session");
                    }
                    let token = session.access_token.clone();
                    state.session = Some(session);
                    (state.take_waiters(), Ok(token))
                }
                Err(e) => {
                    if let Err(clear_err) = self.store.clear() {
                        tracing::warn!(error = %clear_err, "failed to clear stored session");
                    }
                    (state.end_session(), Err(e))
                }
            }
        };

        match settled {
            Ok(token) => {
                tracing::info!(waiters = waiters.len(), "refresh exchange succeeded");
                self.replay_all(waiters, token).await;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    waiters = waiters.len(),
                    "refresh exchange failed, session ended"
                );
                fail_all(waiters);
            }
        }
    }

    /// Replays `waiters` with `token`, starting them in arrival order, and
    /// hands each its outcome.
    async fn replay_all(self: Arc<Self>, waiters: VecDeque<RefreshWaiter>, token: String) {
        let replays = waiters.into_iter().map(|waiter| {
            let shared = Arc::clone(&self);
            let token = token.clone();
            async move {
                let result = shared.replay(waiter.request, token).await;
                let _ = waiter.reply.send(result);
            }
        });
        join_all(replays).await;
    }

    async fn exchange(&self, refresh_token: String) -> Result<TokenPair, SessionError> {
        let request = ApiRequest::encoded(
            Method::Post,
            REFRESH_PATH,
            &self.codec,
            &RefreshRequest { refresh_token },
        )?;

        let call = async {
            let response = self.transport.send(request).await?;
            if response.is_unauthorized() {
                return Err(SessionError::SessionExpired);
            }
            if !response.is_success() {
                return Err(SessionError::UnexpectedStatus(response.status));
            }
            Ok::<TokenPair, SessionError>(response.decode_body(&self.codec)?)
        };

        match self.config.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| SessionError::RefreshTimedOut)?,
            None => call.await,
        }
    }

    /// Sends `request` once more with `token`. It never starts another
    /// exchange. A second rejection:
    ///
    /// - joins the queue if an exchange is in flight by then
    /// - ends the session if `token` is still the current one
    /// - otherwise fails only this request
    async fn replay(
        self: Arc<Self>,
        request: ApiRequest,
        token: String,
    ) -> Result<ApiResponse, SessionError> {
        let response = self
            .transport
            .send(request.clone().with_bearer(Some(&token)))
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        let (reply, receiver) = oneshot::channel();
        let waiters = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if let RefreshState::Refreshing { waiters } = &mut state.refresh {
                tracing::debug!(path = %request.path, "replay rejected mid-exchange, queued");
                waiters.push_back(RefreshWaiter { request, reply });
                None
            } else if state.access_token().as_deref() == Some(token.as_str()) {
                tracing::warn!("replayed request rejected, ending session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "failed to clear stored session");
                }
                Some(state.end_session())
            } else {
                return Err(SessionError::SessionExpired);
            }
        };

        match waiters {
            None => receiver.await.unwrap_or(Err(SessionError::SessionExpired)),
            Some(waiters) => {
                fail_all(waiters);
                Err(SessionError::SessionExpired)
            }
        }
    }
}

fn fail_all(waiters: VecDeque<RefreshWaiter>) {
    for waiter in waiters {
        let _ = waiter.reply.send(Err(SessionError::SessionExpired));
    }
}
