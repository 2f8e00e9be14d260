//! One-shot hydration gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reading the store before the UI framework's first client mount can
//! observe the empty default even though a restore is about to run. Guards
//! therefore wait on this gate, which the client opens from its post-mount
//! hook (never from a timer).

#[cfg(test)]
#[path = "hydration_test.rs"]
mod hydration_test;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;

#[derive(Default)]
struct GateInner {
    open: Cell<bool>,
    waiters: RefCell<Vec<oneshot::Sender<()>>>,
}

/// Monotonic `false -> true` flag with awaitable opening.
#[derive(Clone, Default)]
pub struct HydrationGate {
    inner: Rc<GateInner>,
}

impl HydrationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hydrated(&self) -> bool {
        self.inner.open.get()
    }

    /// Open the gate and wake every waiter. Returns `false` if it was
    /// already open.
    pub fn open(&self) -> bool {
        if self.inner.open.replace(true) {
            return false;
        }
        let waiters = std::mem::take(&mut *self.inner.waiters.borrow_mut());
        log::debug!("hydration gate open, waking {} waiter(s)", waiters.len());
        for tx in waiters {
            let _ = tx.send(());
        }
        true
    }

    /// Future that resolves once the gate is open.
    pub fn opened(&self) -> Opened {
        if self.is_hydrated() {
            return Opened { rx: None };
        }
        let (tx, rx) = oneshot::channel();
        self.inner.waiters.borrow_mut().push(tx);
        Opened { rx: Some(rx) }
    }
}

impl std::fmt::Debug for HydrationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydrationGate").field("hydrated", &self.is_hydrated()).finish()
    }
}

/// Future returned by [`HydrationGate::opened`].
///
/// Stays pending forever if the gate is dropped without opening.
pub struct Opened {
    rx: Option<oneshot::Receiver<()>>,
}

impl Future for Opened {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(());
        };
        match rx.poll_unpin(cx) {
            Poll::Ready(Ok(())) => {
                self.rx = None;
                Poll::Ready(())
            }
            Poll::Ready(Err(_)) | Poll::Pending => Poll::Pending,
        }
    }
}
