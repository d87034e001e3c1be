//! Single-flight coordination of token refreshes.
//!
//! Callers that see an expired token while a refresh is running join that
//! refresh instead of starting their own, and all of them resume with its
//! outcome.

use crate::error::RequestError;
use futures::future::{BoxFuture, FutureExt, Shared};
use shop_core::user::SessionStore;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

pub type RefreshFuture = BoxFuture<'static, Result<String, RefreshFailure>>;

type SharedRefresh = Shared<RefreshFuture>;

enum GateState {
    Idle,
    Refreshing { epoch: u64, refresh: SharedRefresh },
}

/// A failed refresh call and what it did to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshFailure {
    pub error: RequestError,
    /// Whether the refresh ended the session.
    pub logged_out: bool,
}

/// Why the gate did not produce a new token.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshError {
    /// The session has no token any more; nothing to refresh.
    SessionClosed,
    /// The refresh call failed.
    Failed {
        error: RequestError,
        logged_out: bool,
    },
}

impl From<RefreshFailure> for RefreshError {
    fn from(failure: RefreshFailure) -> Self {
        RefreshError::Failed {
            error: failure.error,
            logged_out: failure.logged_out,
        }
    }
}

pub struct RefreshGate {
    state: Mutex<GateState>,
    started: AtomicU64,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            started: AtomicU64::new(0),
        }
    }

    /// Number of refresh cycles started so far.
    pub fn refreshes_started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    /// Obtains a token newer than `stale_token`.
    ///
    /// - joins the running refresh if there is one
    /// - returns the session token directly if it already differs from
    ///   `stale_token` (a refresh finished in the meantime)
    /// - otherwise calls `start` with the current token and shares the
    ///   resulting future with later callers
    pub async fn acquire<F>(
        &self,
        session: &SessionStore,
        stale_token: &str,
        start: F,
    ) -> Result<String, RefreshError>
    where
        F: FnOnce(String) -> RefreshFuture,
    {
        let (epoch, refresh) = {
            let mut state = self.state.lock().await;
            let running = match &*state {
                GateState::Refreshing { epoch, refresh } if refresh.peek().is_none() => {
                    Some((*epoch, refresh.clone()))
                }
                _ => None,
            };

            match running {
                Some((epoch, refresh)) => {
                    tracing::debug!("[RefreshGate] Joining refresh #{}", epoch);
                    (epoch, refresh)
                }
                None => {
                    *state = GateState::Idle;
                    let current = session.token().await;
                    if current.is_empty() {
                        return Err(RefreshError::SessionClosed);
                    }
                    if current != stale_token {
                        tracing::debug!("[RefreshGate] Token already refreshed, reusing it");
                        return Ok(current);
                    }

                    let epoch = self.started.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::debug!("[RefreshGate] Starting refresh #{}", epoch);
                    let refresh = start(current).shared();
                    *state = GateState::Refreshing {
                        epoch,
                        refresh: refresh.clone(),
                    };
                    (epoch, refresh)
                }
            }
        };

        let outcome = refresh.await;

        let mut state = self.state.lock().await;
        if matches!(&*state, GateState::Refreshing { epoch: current, .. } if *current == epoch) {
            *state = GateState::Idle;
        }

        outcome.map_err(RefreshError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::user::MemoryTokenStore;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    async fn session_with(token: &str) -> SessionStore {
        let session = SessionStore::new(Arc::new(MemoryTokenStore::new()));
        session.set_token(token).await;
        session
    }

    fn slow_refresh(
        session: SessionStore,
        calls: Arc<AtomicUsize>,
        result: Result<&'static str, RefreshFailure>,
    ) -> impl FnOnce(String) -> RefreshFuture {
        move |_token| {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                match result {
                    Ok(new_token) => {
                        session.set_token(new_token).await;
                        Ok(new_token.to_string())
                    }
                    Err(e) => Err(e),
                }
            }
            .boxed()
        }
    }

    fn network_failure() -> RefreshFailure {
        RefreshFailure {
            error: RequestError::network("down"),
            logged_out: false,
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let gate = Arc::new(RefreshGate::new());
        let session = session_with("old").await;
        let calls = Arc::new(AtomicUsize::new(0));

        let a = gate.acquire(
            &session,
            "old",
            slow_refresh(session.clone(), calls.clone(), Ok("new")),
        );
        let b = gate.acquire(
            &session,
            "old",
            slow_refresh(session.clone(), calls.clone(), Ok("other")),
        );
        let (a, b) = tokio::join!(a, b);

        assert_eq!(a.unwrap(), "new");
        assert_eq!(b.unwrap(), "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.refreshes_started(), 1);
    }

    #[tokio::test]
    async fn test_late_caller_reuses_refreshed_token() {
        let gate = RefreshGate::new();
        let session = session_with("old").await;
        let calls = Arc::new(AtomicUsize::new(0));

        let first = gate
            .acquire(&session, "old", slow_refresh(session.clone(), calls.clone(), Ok("new")))
            .await;
        assert_eq!(first.unwrap(), "new");

        let late = gate
            .acquire(&session, "old", slow_refresh(session.clone(), calls.clone(), Ok("newer")))
            .await;
        assert_eq!(late.unwrap(), "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_gate_resets() {
        let gate = RefreshGate::new();
        let session = session_with("old").await;
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            gate.acquire(
                &session,
                "old",
                slow_refresh(session.clone(), calls.clone(), Err(network_failure()))
            ),
            gate.acquire(
                &session,
                "old",
                slow_refresh(session.clone(), calls.clone(), Ok("unused"))
            ),
        );
        let expected = RefreshError::Failed {
            error: RequestError::network("down"),
            logged_out: false,
        };
        assert_eq!(a, Err(expected.clone()));
        assert_eq!(b, Err(expected));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // next expiry starts a fresh cycle
        let retry = gate
            .acquire(&session, "old", slow_refresh(session.clone(), calls.clone(), Ok("new")))
            .await;
        assert_eq!(retry.unwrap(), "new");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_logged_out_session_is_not_refreshed() {
        let gate = RefreshGate::new();
        let session = SessionStore::new(Arc::new(MemoryTokenStore::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let outcome = gate
            .acquire(&session, "old", slow_refresh(session.clone(), calls.clone(), Ok("new")))
            .await;
        assert_eq!(outcome, Err(RefreshError::SessionClosed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_reports_logout_from_refresh_outcome() {
        let gate = RefreshGate::new();
        let session = session_with("old").await;
        let calls = Arc::new(AtomicUsize::new(0));

        // the session is still signed in; the flag comes from the refresh itself
        let outcome = gate
            .acquire(
                &session,
                "old",
                slow_refresh(
                    session.clone(),
                    calls.clone(),
                    Err(RefreshFailure {
                        error: RequestError::network("down"),
                        logged_out: true,
                    }),
                ),
            )
            .await;
        assert_eq!(
            outcome,
            Err(RefreshError::Failed {
                error: RequestError::network("down"),
                logged_out: true,
            })
        );
        assert!(session.is_logged_in().await);
    }
}
