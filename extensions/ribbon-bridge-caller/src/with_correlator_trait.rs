use ribbon_bridge::correlator::RpcCorrelator;

/// A trait that provides a generic, asynchronous interface for accessing a shared
/// `RpcCorrelator` that may be protected by different kinds of mutexes.
///
/// ## The Problem This Solves
///
/// A client driven entirely from one cooperative scheduler can keep its
/// correlator behind a `std::sync::Mutex` that is only ever held for a few
/// instructions. A client whose transport runs on another thread or runtime
/// wants a `tokio::sync::Mutex` so that contended callers yield instead of
/// blocking a worker. Their guards are incompatible (`tokio`'s is `Send`,
/// `std`'s is not), which rules out returning a generic guard.
///
/// ## The Closure-Passing Pattern
///
/// The caller hands over the work as a closure (`f`) and the implementation:
///
/// 1. Acquires the lock using its specific strategy (blocking or async).
/// 2. Executes the closure with a mutable reference to the correlator.
/// 3. Releases the lock.
///
/// The lock is therefore never held across an `.await` or while broadcast
/// handlers run, so handlers and woken callers may re-enter the client.
#[async_trait::async_trait]
pub trait WithCorrelator: Send + Sync {
    /// Executes a closure against the locked `RpcCorrelator`.
    ///
    /// # Type Parameters
    ///
    /// - `F`: A closure that takes `&mut RpcCorrelator` and is only called once.
    ///   It must be `Send` as the work may be moved to another thread.
    /// - `R`: The return type of the closure. It must be `Send` so the result can
    ///   be safely returned across `.await` points.
    async fn with_correlator<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RpcCorrelator) -> R + Send,
        R: Send;
}

#[cfg(feature = "tokio_support")]
#[async_trait::async_trait]
impl WithCorrelator for tokio::sync::Mutex<RpcCorrelator> {
    async fn with_correlator<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RpcCorrelator) -> R + Send,
        R: Send,
    {
        // Asynchronously acquires the lock without blocking the thread.
        let mut guard = self.lock().await;

        f(&mut guard)
    }
}

// Always available; does not depend on tokio.
#[async_trait::async_trait]
impl WithCorrelator for std::sync::Mutex<RpcCorrelator> {
    async fn with_correlator<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RpcCorrelator) -> R + Send,
        R: Send,
    {
        // A panic inside a previous closure cannot leave the correlator
        // half-updated in a way later callers could observe, so a poisoned
        // lock is recovered rather than propagated.
        let mut guard = self
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        f(&mut guard)
    }
}
