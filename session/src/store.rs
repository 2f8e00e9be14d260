//! Reactive credential store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Single source of truth for the current credential. Guards read it
//! synchronously; the UI and the persistence bridge subscribe to it.
//!
//! DESIGN
//! ======
//! Notifications are synchronous with the mutating call and are delivered
//! after the internal borrow is released, so listeners may read the store
//! re-entrantly. A listener may also write: the nested change is queued and
//! delivered once every listener has seen the current one, so all listeners
//! observe mutations in the order they were applied.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;

use crate::credential::{Credential, CredentialPatch};

type Listener = Rc<dyn Fn(&Credential)>;

#[derive(Default)]
struct StoreInner {
    state: RefCell<Credential>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    /// Changes written by listeners during a delivery round.
    queued: RefCell<VecDeque<Credential>>,
    delivering: Cell<bool>,
}

/// Cloneable handle to the credential store. Clones share state.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Rc<StoreInner>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current credential. No side effects.
    pub fn snapshot(&self) -> Credential {
        self.inner.state.borrow().clone()
    }

    /// Merge `patch` into the current credential and notify listeners.
    pub fn set_credential(&self, patch: CredentialPatch) {
        let next = {
            let mut state = self.inner.state.borrow_mut();
            patch.apply_to(&mut state);
            state.clone()
        };
        self.notify(next);
    }

    /// Reset every field to absent and notify listeners.
    pub fn clear(&self) {
        let next = {
            let mut state = self.inner.state.borrow_mut();
            *state = Credential::default();
            state.clone()
        };
        self.notify(next);
    }

    /// Register `listener` for every subsequent change. Dropping the returned
    /// handle unsubscribes.
    pub fn subscribe(&self, listener: impl Fn(&Credential) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription { store: Rc::downgrade(&self.inner), id }
    }

    /// Future resolving with the credential at the next change.
    ///
    /// The subscription is taken now, not on first poll, so a change that
    /// happens between this call and the first `await` is not lost.
    pub fn changed(&self) -> Changed {
        let (tx, rx) = oneshot::channel();
        let tx = Cell::new(Some(tx));
        let subscription = self.subscribe(move |credential| {
            if let Some(tx) = tx.take() {
                let _ = tx.send(credential.clone());
            }
        });
        Changed { rx, _subscription: subscription }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self, credential: Credential) {
        self.inner.queued.borrow_mut().push_back(credential);
        if self.inner.delivering.replace(true) {
            return;
        }
        loop {
            let next = self.inner.queued.borrow_mut().pop_front();
            let Some(credential) = next else {
                break;
            };
            let listeners: Vec<Listener> =
                self.inner.listeners.borrow().iter().map(|(_, listener)| Rc::clone(listener)).collect();
            for listener in listeners {
                listener(&credential);
            }
        }
        self.inner.delivering.set(false);
    }
}

/// Live store subscription; unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Future returned by [`CredentialStore::changed`].
///
/// Resolves to `None` if the store is dropped first.
pub struct Changed {
    rx: oneshot::Receiver<Credential>,
    _subscription: Subscription,
}

impl Future for Changed {
    type Output = Option<Credential>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(Result::ok)
    }
}
