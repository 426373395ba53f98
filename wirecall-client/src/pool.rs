//! Round-robin transport pool.
//!
//! [`TransportPool`] is a [`TransportProvider`] over a fixed set of
//! transports that are individually marked ready or not (connecting, backing
//! off, draining). Selection waits for a ready transport instead of failing,
//! so a call started while every connection is down proceeds as soon as one
//! comes back, or fails once the call context is done.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Notify;
use wirecall_core::Code;

use crate::ClientError;
use crate::context::CallContext;
use crate::transport::{RetryCursor, Transport, TransportProvider};

/// A shared, cloneable pool of transports.
///
/// Clones refer to the same pool.
pub struct TransportPool<T> {
    inner: Arc<PoolInner<T>>,
}

struct PoolInner<T> {
    slots: RwLock<Vec<Slot<T>>>,
    ready_changed: Notify,
    closed: AtomicBool,
    /// Start position for calls that have not picked a transport yet.
    rotation: AtomicUsize,
}

struct Slot<T> {
    transport: Arc<T>,
    ready: bool,
}

impl<T> Clone for TransportPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for TransportPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TransportPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportPool")
            .field("len", &self.len())
            .field("ready", &self.ready_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> TransportPool<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PoolInner {
                slots: RwLock::new(Vec::new()),
                ready_changed: Notify::new(),
                closed: AtomicBool::new(false),
                rotation: AtomicUsize::new(0),
            }),
        }
    }

    /// Add a transport and return its index in the pool.
    pub fn add(&self, transport: Arc<T>, ready: bool) -> usize {
        let index = {
            let mut slots = self.inner.slots.write().unwrap_or_else(|e| e.into_inner());
            slots.push(Slot { transport, ready });
            slots.len() - 1
        };
        if ready {
            self.inner.ready_changed.notify_waiters();
        }
        index
    }

    /// Mark the transport at `index` ready or not.
    ///
    /// Returns `false` if there is no such transport.
    pub fn set_ready(&self, index: usize, ready: bool) -> bool {
        {
            let mut slots = self.inner.slots.write().unwrap_or_else(|e| e.into_inner());
            match slots.get_mut(index) {
                Some(slot) => slot.ready = ready,
                None => return false,
            }
        }
        if ready {
            self.inner.ready_changed.notify_waiters();
        }
        true
    }

    /// Close the pool. Pending and future selections fail.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.ready_changed.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.slots.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ready_count(&self) -> usize {
        self.inner
            .slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|slot| slot.ready)
            .count()
    }

    /// First ready transport at or after the cursor's start position.
    ///
    /// A cursor returned by an earlier pick starts the scan just past that
    /// pick, and with `skip_last` the scan never wraps back onto it. A fresh
    /// cursor starts at the pool's rotation point.
    fn pick(&self, cursor: RetryCursor, skip_last: bool) -> Option<(Arc<T>, RetryCursor)> {
        let slots = self.inner.slots.read().unwrap_or_else(|e| e.into_inner());
        if slots.is_empty() {
            return None;
        }

        let start = if cursor.is_initial() {
            self.inner.rotation.fetch_add(1, Ordering::Relaxed)
        } else {
            cursor.value() as usize
        } % slots.len();
        let last = (skip_last && !cursor.is_initial())
            .then(|| (cursor.value() as usize - 1) % slots.len());

        (0..slots.len())
            .map(|offset| (start + offset) % slots.len())
            .find(|&index| slots[index].ready && Some(index) != last)
            .map(|index| {
                (
                    Arc::clone(&slots[index].transport),
                    RetryCursor::new(index as u64 + 1),
                )
            })
    }
}

impl<T: Transport> TransportProvider for TransportPool<T> {
    type Transport = T;

    async fn next(
        &self,
        ctx: &CallContext,
        cursor: RetryCursor,
    ) -> Result<(Arc<T>, RetryCursor), ClientError> {
        // The transport the previous attempt used is only offered again once
        // the pool has changed since that attempt.
        let mut skip_last = !cursor.is_initial();
        loop {
            // Register for wakeups before looking, so a transport turning
            // ready between the scan and the wait is not missed.
            let notified = self.inner.ready_changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_closed() {
                return Err(ClientError::new(
                    Code::FailedPrecondition,
                    "transport pool is closed",
                ));
            }
            if let Some(err) = ctx.err() {
                return Err(err);
            }
            if let Some(picked) = self.pick(cursor, skip_last) {
                return Ok(picked);
            }

            #[cfg(feature = "tracing")]
            tracing::trace!("no ready transport, waiting");

            ctx.run(async {
                notified.as_mut().await;
                Ok(())
            })
            .await?;
            skip_last = false;
        }
    }
}
