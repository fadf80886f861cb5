//! A pool of reusable engine handles.
//!
//! Handles are created lazily when the pool runs dry and handed back after
//! every request. An idle handle is stored *armed*: if it is ever dropped
//! without being checked out again, whether because the pool evicted it to
//! stay under capacity or because the pool itself went away, its finalizer
//! runs exactly once. Checking a handle out disarms it under the same lock
//! that removes it from storage, so cleanup can never race a handle back
//! into use.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use curl::easy::Easy;

use crate::engine::Handle;

/// Cleans up handles the pool lets go of.
///
/// Without a finalizer, discarded handles are released with
/// [`Handle::cleanup`].
pub trait Finalizer<H>: Send + Sync {
    /// Dispose of a handle that will never be handed out again.
    fn finalize(&self, handle: H);
}

impl<H, F> Finalizer<H> for F
where
    F: Fn(H) + Send + Sync,
{
    fn finalize(&self, handle: H) {
        self(handle)
    }
}

/// A thread-safe cache of idle engine handles.
pub struct Pool<H: Handle = Easy> {
    idle: Mutex<VecDeque<Idle<H>>>,
    max_idle: usize,
    finalizer: Option<Arc<dyn Finalizer<H>>>,
}

/// A builder to configure a [`Pool`].
pub struct Builder<H: Handle = Easy> {
    max_idle: usize,
    finalizer: Option<Arc<dyn Finalizer<H>>>,
}

/// An idle handle with its finalizer armed.
struct Idle<H: Handle> {
    handle: Option<H>,
    finalizer: Option<Arc<dyn Finalizer<H>>>,
}

/// A handle checked out of a [`Pool`].
///
/// Dropping the checkout resets the handle and releases it back to the
/// pool, on every exit path.
pub struct Checkout<'a, H: Handle = Easy> {
    pool: &'a Pool<H>,
    handle: Option<H>,
}

// ===== impl Pool =====

impl<H: Handle> Pool<H> {
    /// Create an unbounded pool that cleans up with [`Handle::cleanup`].
    pub fn new() -> Pool<H> {
        Builder::new().build()
    }

    /// Create a builder to configure a new pool.
    pub fn builder() -> Builder<H> {
        Builder::new()
    }

    /// Take an idle handle, or create one if none is available.
    ///
    /// Never fails. The returned handle is owned by the caller alone until
    /// it is given back with [`Pool::release`].
    pub fn acquire(&self) -> H {
        let reused = self.lock().pop_back().and_then(Idle::disarm);
        match reused {
            Some(handle) => {
                trace!("reusing idle handle");
                handle
            }
            None => {
                debug!("no idle handle, creating a new one");
                H::create()
            }
        }
    }

    /// Give a handle back to the pool.
    ///
    /// The handle is stored armed. If storing it exceeds the pool's
    /// capacity, the oldest idle handle is evicted and finalized.
    pub fn release(&self, handle: H) {
        let evicted = {
            let mut idle = self.lock();
            idle.push_back(Idle::arm(handle, self.finalizer.clone()));
            if idle.len() > self.max_idle {
                idle.pop_front()
            } else {
                None
            }
        };

        if evicted.is_some() {
            debug!("idle pool at capacity ({}), evicting oldest handle", self.max_idle);
        }
        // An evicted entry finalizes here, outside the lock.
        drop(evicted);
    }

    /// Acquire a handle that is reset and released when the guard drops.
    pub fn checkout(&self) -> Checkout<'_, H> {
        Checkout {
            pool: self,
            handle: Some(self.acquire()),
        }
    }

    /// The number of idle handles waiting to be reused.
    pub fn idle_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Idle<H>>> {
        // Pool operations never leave the storage half-updated, so a
        // poisoned lock still guards a consistent deque.
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H: Handle> Default for Pool<H> {
    fn default() -> Pool<H> {
        Pool::new()
    }
}

impl<H: Handle> fmt::Debug for Pool<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle_count())
            .field("max_idle", &self.max_idle)
            .field("finalizer", &self.finalizer.is_some())
            .finish()
    }
}

// ===== impl Builder =====

impl<H: Handle> Builder<H> {
    /// Create a builder with default settings: unbounded capacity and no
    /// custom finalizer.
    pub fn new() -> Builder<H> {
        Builder {
            max_idle: usize::MAX,
            finalizer: None,
        }
    }

    /// Sets the maximum number of idle handles kept for reuse.
    ///
    /// Releasing a handle into a full pool evicts the oldest idle handle,
    /// which is then finalized.
    ///
    /// Default is unbounded.
    pub fn max_idle(&mut self, max: usize) -> &mut Builder<H> {
        self.max_idle = max;
        self
    }

    /// Sets the finalizer run on handles the pool discards.
    pub fn finalizer<F>(&mut self, finalizer: F) -> &mut Builder<H>
    where
        F: Finalizer<H> + 'static,
    {
        self.finalizer = Some(Arc::new(finalizer));
        self
    }

    /// Build a pool with this configuration.
    pub fn build(&self) -> Pool<H> {
        Pool {
            idle: Mutex::new(VecDeque::new()),
            max_idle: self.max_idle,
            finalizer: self.finalizer.clone(),
        }
    }
}

impl<H: Handle> Default for Builder<H> {
    fn default() -> Builder<H> {
        Builder::new()
    }
}

impl<H: Handle> fmt::Debug for Builder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("max_idle", &self.max_idle)
            .field("finalizer", &self.finalizer.is_some())
            .finish()
    }
}

// ===== impl Idle =====

impl<H: Handle> Idle<H> {
    fn arm(handle: H, finalizer: Option<Arc<dyn Finalizer<H>>>) -> Idle<H> {
        Idle {
            handle: Some(handle),
            finalizer,
        }
    }

    /// Take the handle back out; nothing is owed to the finalizer anymore.
    fn disarm(mut self) -> Option<H> {
        self.handle.take()
    }
}

impl<H: Handle> Drop for Idle<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!("finalizing idle handle");
            match self.finalizer {
                Some(ref finalizer) => finalizer.finalize(handle),
                None => handle.cleanup(),
            }
        }
    }
}

// ===== impl Checkout =====

impl<H: Handle> Checkout<'_, H> {
    fn handle(&self) -> &H {
        self.handle
            .as_ref()
            .unwrap_or_else(|| unreachable!("checkout used after release"))
    }

    fn handle_mut(&mut self) -> &mut H {
        self.handle
            .as_mut()
            .unwrap_or_else(|| unreachable!("checkout used after release"))
    }
}

impl<H: Handle> Deref for Checkout<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.handle()
    }
}

impl<H: Handle> DerefMut for Checkout<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.handle_mut()
    }
}

impl<H: Handle> Drop for Checkout<'_, H> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.reset();
            self.pool.release(handle);
        }
    }
}

impl<H: Handle> fmt::Debug for Checkout<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("pool", self.pool)
            .field("checked_out", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}
