//! Process-wide connection cache
//!
//! The execution environment may hand the same warm process many requests
//! without ever tearing it down, and every data route needs the store. This
//! cache guarantees at most one connection establishment per process: the
//! first caller starts it, concurrent callers attach to the same in-flight
//! attempt, and later callers get the established handle back without
//! suspending. A failed attempt clears the slot so the next caller retries
//! from scratch.
//!
//! The slot is a tagged state — empty, pending (a shared in-flight future),
//! or ready — behind a `std::sync::Mutex` that is never held across an
//! `.await`. The only suspension point is waiting on the shared attempt.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use super::migrations;

/// Maximum connections held by the production pool.
/// Kept low so a fleet of warm instances does not exhaust the store's slots.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Errors surfaced by [`ConnectionCache::acquire`]
#[derive(Error, Debug)]
pub enum DbError {
    /// `DATABASE_URL` was absent from configuration. A deployment problem,
    /// reported before any connect is attempted, and not cleared by retrying.
    #[error("DATABASE_URL is not configured")]
    UrlMissing,

    /// The store driver failed to establish a connection. A fresh call to
    /// `acquire` starts a new attempt.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] Arc<sqlx::Error>),
}

/// Seam to the store driver, so tests can count and script establishments.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Clone + Send + Sync + 'static;

    async fn connect(&self, url: &str) -> Result<Self::Conn, sqlx::Error>;
}

/// Production connector: a postgres pool with the schema ensured.
///
/// Running migrations inside establishment means "ready" implies a usable
/// schema, and a failed migration gets the same clean-retry semantics as a
/// failed handshake.
pub struct PgConnector {
    max_connections: u32,
}

impl PgConnector {
    pub fn new(max_connections: u32) -> Self {
        Self { max_connections }
    }
}

impl Default for PgConnector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONNECTIONS)
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Conn = PgPool;

    async fn connect(&self, url: &str) -> Result<PgPool, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(url)
            .await?;
        migrations::ensure_schema(&pool).await?;
        Ok(pool)
    }
}

/// An in-flight establishment every concurrent caller can await.
/// The error is `Arc`-wrapped because `sqlx::Error` is not `Clone`.
type InflightConnect<C> = Shared<BoxFuture<'static, Result<C, Arc<sqlx::Error>>>>;

enum Slot<C> {
    Empty,
    Pending(InflightConnect<C>),
    Ready(C),
}

/// Caches the process's single store connection, or the attempt to make one.
pub struct ConnectionCache<C: Connector> {
    connector: Arc<C>,
    database_url: Option<String>,
    slot: Mutex<Slot<C::Conn>>,
}

impl ConnectionCache<PgConnector> {
    /// Cache over a real postgres pool, url taken from loaded configuration.
    pub fn from_config(config: &reelstack_core::AppConfig) -> Self {
        Self::new(PgConnector::default(), config.database_url.clone())
    }
}

impl<C: Connector> ConnectionCache<C> {
    /// Create an empty cache. Nothing connects until the first `acquire`.
    pub fn new(connector: C, database_url: Option<String>) -> Self {
        Self {
            connector: Arc::new(connector),
            database_url,
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Return the shared connection, establishing it on first use.
    ///
    /// Concurrent callers during establishment all attach to the same
    /// attempt and observe the same outcome. After a failure the slot is
    /// reset, so the next call starts a fresh attempt.
    pub async fn acquire(&self) -> Result<C::Conn, DbError> {
        let url = self.database_url.as_ref().ok_or(DbError::UrlMissing)?;

        let pending = {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Ready(conn) => return Ok(conn.clone()),
                Slot::Pending(inflight) => inflight.clone(),
                Slot::Empty => {
                    tracing::info!("establishing database connection");
                    let connector = Arc::clone(&self.connector);
                    let url = url.clone();
                    let inflight = async move { connector.connect(&url).await.map_err(Arc::new) }
                        .boxed()
                        .shared();
                    *slot = Slot::Pending(inflight.clone());
                    inflight
                }
            }
        };

        match pending.clone().await {
            Ok(conn) => {
                let mut slot = self.lock_slot();
                if !matches!(&*slot, Slot::Ready(_)) {
                    *slot = Slot::Ready(conn.clone());
                }
                Ok(conn)
            }
            Err(err) => {
                tracing::warn!(error = %err, "database connection failed");
                let mut slot = self.lock_slot();
                // Every attached caller lands here, but only the attempt that
                // still occupies the slot may clear it; a later caller could
                // already have started a fresh one.
                if let Slot::Pending(inflight) = &*slot {
                    if inflight.ptr_eq(&pending) {
                        *slot = Slot::Empty;
                    }
                }
                Err(DbError::Connect(err))
            }
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot<C::Conn>> {
        // A panic while holding the lock leaves the slot in whatever state it
        // was; the state machine tolerates any of the three, so recover the
        // guard instead of propagating the poison.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    use futures::task::noop_waker_ref;
    use tokio::sync::oneshot;

    #[derive(Clone, Debug, PartialEq)]
    struct FakeConn(u32);

    /// Connector whose outcomes the test scripts through oneshot channels.
    /// Each `connect` call consumes the next receiver in order.
    struct ScriptedConnector {
        calls: AtomicUsize,
        outcomes: Mutex<VecDeque<oneshot::Receiver<Result<FakeConn, ()>>>>,
    }

    impl ScriptedConnector {
        fn new(outcomes: Vec<oneshot::Receiver<Result<FakeConn, ()>>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcomes: Mutex::new(outcomes.into()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Conn = FakeConn;

        async fn connect(&self, _url: &str) -> Result<FakeConn, sqlx::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rx = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("connect called more times than scripted");
            match rx.await {
                Ok(Ok(conn)) => Ok(conn),
                _ => Err(sqlx::Error::PoolClosed),
            }
        }
    }

    /// Connector that resolves immediately, always succeeding.
    struct InstantConnector {
        calls: AtomicUsize,
    }

    impl InstantConnector {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Connector for InstantConnector {
        type Conn = FakeConn;

        async fn connect(&self, _url: &str) -> Result<FakeConn, sqlx::Error> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(FakeConn(n as u32))
        }
    }

    fn cache_with(
        outcomes: Vec<oneshot::Receiver<Result<FakeConn, ()>>>,
    ) -> Arc<ConnectionCache<ScriptedConnector>> {
        Arc::new(ConnectionCache::new(
            ScriptedConnector::new(outcomes),
            Some("postgres://test".into()),
        ))
    }

    async fn settle() {
        // Let spawned acquirers run to their suspension point
        // (current-thread runtime makes this deterministic).
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn concurrent_acquires_share_one_establishment() {
        let (tx, rx) = oneshot::channel();
        let cache = cache_with(vec![rx]);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.acquire().await })
            })
            .collect();
        settle().await;

        // All four are waiting on a single in-flight attempt
        assert_eq!(cache.connector.calls(), 1);

        tx.send(Ok(FakeConn(7))).unwrap();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), FakeConn(7));
        }
        assert_eq!(cache.connector.calls(), 1);
    }

    #[tokio::test]
    async fn hit_after_success_skips_connect() {
        let cache = ConnectionCache::new(InstantConnector::new(), Some("postgres://test".into()));

        let first = cache.acquire().await.unwrap();
        let second = cache.acquire().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.connector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_sequential_acquires_connect_once() {
        let cache = ConnectionCache::new(InstantConnector::new(), Some("postgres://test".into()));

        for _ in 0..100 {
            assert_eq!(cache.acquire().await.unwrap(), FakeConn(1));
        }
        assert_eq!(cache.connector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_resets_slot_for_clean_retry() {
        let (fail_tx, fail_rx) = oneshot::channel();
        let (ok_tx, ok_rx) = oneshot::channel();
        let cache = cache_with(vec![fail_rx, ok_rx]);

        fail_tx.send(Err(())).unwrap();
        let err = cache.acquire().await.unwrap_err();
        assert!(matches!(err, DbError::Connect(_)));

        // The slot is not poisoned: the next call starts a new attempt
        ok_tx.send(Ok(FakeConn(2))).unwrap();
        assert_eq!(cache.acquire().await.unwrap(), FakeConn(2));
        assert_eq!(cache.connector.calls(), 2);
    }

    #[tokio::test]
    async fn failure_fans_out_to_all_waiters() {
        let (tx, rx) = oneshot::channel();
        let cache = cache_with(vec![rx]);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.acquire().await })
            })
            .collect();
        settle().await;
        assert_eq!(cache.connector.calls(), 1);

        tx.send(Err(())).unwrap();
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(DbError::Connect(_))));
        }
    }

    #[tokio::test]
    async fn missing_url_fails_without_connecting() {
        let cache: ConnectionCache<InstantConnector> =
            ConnectionCache::new(InstantConnector::new(), None);

        let err = cache.acquire().await.unwrap_err();
        assert!(matches!(err, DbError::UrlMissing));
        assert_eq!(cache.connector.calls.load(Ordering::SeqCst), 0);

        // Still no connect on repeat: the configuration error is not
        // a transient condition to retry through
        let err = cache.acquire().await.unwrap_err();
        assert!(matches!(err, DbError::UrlMissing));
        assert_eq!(cache.connector.calls.load(Ordering::SeqCst), 0);
    }

    fn poll_once<F: Future>(fut: &mut std::pin::Pin<&mut F>) -> Poll<F::Output> {
        let mut cx = Context::from_waker(noop_waker_ref());
        fut.as_mut().poll(&mut cx)
    }

    /// Two callers attach to a failing attempt; the first to observe the
    /// failure resets the slot and a third caller starts a fresh attempt.
    /// The second (stale) failure observation must not clear the fresh
    /// attempt out from under that third caller.
    #[tokio::test]
    async fn stale_failure_does_not_clobber_fresh_attempt() {
        let (fail_tx, fail_rx) = oneshot::channel();
        let (ok_tx, ok_rx) = oneshot::channel();
        let cache = cache_with(vec![fail_rx, ok_rx]);

        let mut a = pin!(cache.acquire());
        let mut b = pin!(cache.acquire());
        assert!(poll_once(&mut a).is_pending()); // starts attempt #1
        assert!(poll_once(&mut b).is_pending()); // attaches to attempt #1
        assert_eq!(cache.connector.calls(), 1);

        fail_tx.send(Err(())).unwrap();

        // Caller A observes the failure and resets the slot
        let Poll::Ready(res_a) = poll_once(&mut a) else {
            panic!("caller A should observe the failure");
        };
        assert!(matches!(res_a, Err(DbError::Connect(_))));

        // Caller C starts attempt #2 before B has seen the stale failure
        let mut c = pin!(cache.acquire());
        assert!(poll_once(&mut c).is_pending());
        assert_eq!(cache.connector.calls(), 2);

        // Caller B now observes the stale failure of attempt #1
        let Poll::Ready(res_b) = poll_once(&mut b) else {
            panic!("caller B should observe the failure");
        };
        assert!(matches!(res_b, Err(DbError::Connect(_))));

        // Attempt #2 was not clobbered: C resolves against it
        ok_tx.send(Ok(FakeConn(9))).unwrap();
        let Poll::Ready(res_c) = poll_once(&mut c) else {
            panic!("caller C should resolve against attempt #2");
        };
        assert_eq!(res_c.unwrap(), FakeConn(9));
        assert_eq!(cache.connector.calls(), 2);
    }
}
