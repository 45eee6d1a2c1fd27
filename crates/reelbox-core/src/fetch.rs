//! Generic asynchronous fetch lifecycle.
//!
//! A [`FetchController`] owns a zero-argument producer and tracks the
//! `{data, loading, error}` triple of its most recent run. Every run is
//! tagged with a generation number; a result only commits if no newer run
//! or [`FetchController::reset`] has happened since it was issued, so
//! overlapping refetches settle on the most recently *issued* request
//! regardless of resolution order.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Boxed zero-argument producer.
type Producer<T, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Observable state of a [`FetchController`].
pub struct FetchState<T, E> {
    /// Value from the last successful run, if any.
    pub data: Option<T>,
    /// Whether a run is in flight.
    pub loading: bool,
    /// Error from the last failed run, if any.
    pub error: Option<Arc<E>>,
}

/// Coarse lifecycle phase derived from a [`FetchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// Nothing fetched and nothing in flight.
    Idle,
    /// A run is in flight.
    Loading,
    /// The last run produced a value.
    Succeeded,
    /// The last run failed.
    Failed,
}

impl<T, E> FetchState<T, E> {
    /// The idle state: no data, not loading, no error.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> FetchPhase {
        if self.loading {
            FetchPhase::Loading
        } else if self.error.is_some() {
            FetchPhase::Failed
        } else if self.data.is_some() {
            FetchPhase::Succeeded
        } else {
            FetchPhase::Idle
        }
    }
}

impl<T, E: fmt::Display> FetchState<T, E> {
    /// Generic user-facing message for the captured error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("Something went wrong: {e}"))
    }
}

impl<T, E> Default for FetchState<T, E> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T: Clone, E> Clone for FetchState<T, E> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for FetchState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchState")
            .field("data", &self.data)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish()
    }
}

struct Inner<T, E> {
    producer: Producer<T, E>,
    state: watch::Sender<FetchState<T, E>>,
    generation: AtomicU64,
}

impl<T, E> Inner<T, E> {
    /// Enters `Loading` and returns the generation of the new run.
    ///
    /// The generation counter is only touched under the state lock, which
    /// orders it against `commit` and `reset`.
    fn begin(&self) -> u64 {
        let mut issued = 0;
        self.state.send_modify(|state| {
            issued = self.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
            state.loading = true;
            state.error = None;
        });
        issued
    }

    /// Applies `result` if `generation` is still the latest. Returns whether it committed.
    fn commit(&self, generation: u64, result: Result<T, E>) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "Discarding stale fetch result");
                return false;
            }
            state.loading = false;
            match result {
                Ok(value) => {
                    state.data = Some(value);
                    state.error = None;
                }
                Err(e) => {
                    state.error = Some(Arc::new(e));
                }
            }
            true
        })
    }

    fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = FetchState::idle();
        });
    }
}

/// Runs a producer and tracks its `{data, loading, error}` state.
///
/// Cloning yields another handle to the same controller.
pub struct FetchController<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for FetchController<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for FetchController<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchController")
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .field("loading", &self.inner.state.borrow().loading)
            .finish_non_exhaustive()
    }
}

impl<T, E> FetchController<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a controller around `producer`.
    ///
    /// With `auto_fetch` the controller starts in `Loading` and the first
    /// run is spawned onto the current Tokio runtime; otherwise it starts
    /// `Idle`.
    ///
    /// # Panics
    ///
    /// Panics if `auto_fetch` is set and no Tokio runtime is running.
    pub fn new<F, Fut>(producer: F, auto_fetch: bool) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (state, _) = watch::channel(FetchState::idle());
        let controller = Self {
            inner: Arc::new(Inner {
                producer: Arc::new(move || producer().boxed()),
                state,
                generation: AtomicU64::new(0),
            }),
        };
        if auto_fetch {
            drop(controller.spawn_refetch());
        }
        controller
    }

    /// Starts a new run.
    ///
    /// The controller enters `Loading` and the producer is invoked before
    /// this returns; the returned future awaits the producer and commits
    /// the outcome unless it has been superseded. A failure keeps any
    /// previously fetched data. No retries.
    pub fn refetch(&self) -> impl Future<Output = ()> + Send + 'static {
        let generation = self.inner.begin();
        let pending = (self.inner.producer)();
        let inner = Arc::clone(&self.inner);
        async move {
            let result = pending.await;
            inner.commit(generation, result);
        }
    }

    /// Starts a new run on a spawned task.
    ///
    /// # Panics
    ///
    /// Panics if no Tokio runtime is running.
    pub fn spawn_refetch(&self) -> JoinHandle<()> {
        tokio::spawn(self.refetch())
    }

    /// Returns to `Idle`, discarding the eventual result of any in-flight run.
    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Whether a run is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T, E>> {
        self.inner.state.subscribe()
    }
}

impl<T, E> FetchController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> FetchState<T, E> {
        self.inner.state.borrow().clone()
    }

    /// Waits until no run is in flight and returns the settled state.
    pub async fn wait_settled(&self) -> FetchState<T, E> {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let settled = rx.wait_for(|state| !state.loading).await.ok().map(|s| s.clone());
        settled.unwrap_or_else(|| self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::oneshot;

    use super::*;

    /// Controller whose runs resolve when the matching sender fires, in call order.
    fn gated(
        count: usize,
    ) -> (
        FetchController<u32, String>,
        Vec<oneshot::Sender<Result<u32, String>>>,
    ) {
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let queue = Arc::new(Mutex::new(receivers));
        let controller = FetchController::new(
            move || {
                let rx = queue.lock().unwrap().pop_front();
                async move {
                    match rx {
                        Some(rx) => rx.await.unwrap_or_else(|_| Err(String::from("dropped"))),
                        None => Err(String::from("no more runs")),
                    }
                }
            },
            false,
        );
        (controller, senders)
    }

    #[tokio::test]
    async fn test_without_auto_fetch_starts_idle() {
        // Arrange
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        // Act
        let controller: FetchController<u32, String> = FetchController::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(1) }
            },
            false,
        );

        // Assert
        assert_eq!(controller.snapshot().phase(), FetchPhase::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_fetch_starts_loading_then_succeeds() {
        // Arrange & Act
        let controller: FetchController<u32, String> =
            FetchController::new(|| async { Ok(42) }, true);
        let initial = controller.snapshot();
        let settled = controller.wait_settled().await;

        // Assert
        assert_eq!(initial.phase(), FetchPhase::Loading);
        assert_eq!(settled.phase(), FetchPhase::Succeeded);
        assert_eq!(settled.data, Some(42));
        assert!(settled.error.is_none());
    }

    #[tokio::test]
    async fn test_refetch_failure_keeps_previous_data() {
        // Arrange
        let (controller, mut senders) = gated(2);
        let second = senders.pop().unwrap();
        let first = senders.pop().unwrap();
        first.send(Ok(7)).unwrap();
        controller.refetch().await;

        // Act
        let run = controller.refetch();
        let loading = controller.is_loading();
        second.send(Err(String::from("HTTP 500"))).unwrap();
        run.await;
        let state = controller.snapshot();

        // Assert
        assert!(loading);
        assert!(!state.loading);
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error.as_deref().map(String::as_str), Some("HTTP 500"));
        assert_eq!(state.phase(), FetchPhase::Failed);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle_from_any_state() {
        // Arrange
        let controller: FetchController<u32, String> =
            FetchController::new(|| async { Err(String::from("boom")) }, false);
        controller.refetch().await;
        assert_eq!(controller.snapshot().phase(), FetchPhase::Failed);

        // Act
        controller.reset();
        let state = controller.snapshot();

        // Assert
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_result() {
        // Arrange
        let (controller, mut senders) = gated(1);
        let tx = senders.pop().unwrap();
        let run = controller.refetch();

        // Act
        controller.reset();
        tx.send(Ok(99)).unwrap();
        run.await;

        // Assert
        let state = controller.snapshot();
        assert_eq!(state.phase(), FetchPhase::Idle);
        assert!(state.data.is_none());
    }

    #[tokio::test]
    async fn test_stale_result_resolving_last_is_discarded() {
        // Arrange
        let (controller, mut senders) = gated(2);
        let newer_tx = senders.pop().unwrap();
        let older_tx = senders.pop().unwrap();
        let older = controller.refetch();
        let newer = controller.refetch();

        // Act
        newer_tx.send(Ok(2)).unwrap();
        newer.await;
        older_tx.send(Ok(1)).unwrap();
        older.await;

        // Assert
        let state = controller.snapshot();
        assert_eq!(state.data, Some(2));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_stale_result_resolving_first_keeps_loading() {
        // Arrange
        let (controller, mut senders) = gated(2);
        let newer_tx = senders.pop().unwrap();
        let older_tx = senders.pop().unwrap();
        let older = controller.refetch();
        let newer = controller.refetch();

        // Act
        older_tx.send(Ok(1)).unwrap();
        older.await;
        let mid = controller.snapshot();
        newer_tx.send(Ok(2)).unwrap();
        newer.await;

        // Assert
        assert!(mid.loading);
        assert!(mid.data.is_none());
        assert_eq!(controller.snapshot().data, Some(2));
    }

    #[tokio::test]
    async fn test_subscribers_observe_commit() {
        // Arrange
        let controller: FetchController<u32, String> =
            FetchController::new(|| async { Ok(5) }, false);
        let mut rx = controller.subscribe();

        // Act
        controller.spawn_refetch().await.unwrap();

        // Assert
        let state = rx.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(state.data, Some(5));
    }

    #[test]
    fn test_error_message_is_generic() {
        // Arrange
        let state: FetchState<u32, String> = FetchState {
            data: None,
            loading: false,
            error: Some(Arc::new(String::from("HTTP 404 Not Found"))),
        };

        // Act
        let message = state.error_message();

        // Assert
        assert_eq!(
            message.as_deref(),
            Some("Something went wrong: HTTP 404 Not Found")
        );
    }
}
