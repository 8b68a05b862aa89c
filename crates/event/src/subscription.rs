use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    registry::{self, ListenerHandle, Registry},
    SubscriptionGuard,
};

/// Returned by [`Emitter::on`](crate::Emitter::on) and friends. Calling
/// [`unsubscribe`](Subscription::unsubscribe) removes exactly the subscription
/// it was created for.
///
/// Only a weak reference to the emitter is held: a subscription never keeps
/// its emitter alive, and dropping it does *not* unsubscribe. Use
/// [`guard`](Subscription::guard) for scope-bound subscriptions.
pub struct Subscription<T, G = ()> {
    registry: Weak<RefCell<Registry<T, G>>>,
    handle: ListenerHandle,
}

impl<T, G> Subscription<T, G> {
    pub(crate) fn new(registry: &Rc<RefCell<Registry<T, G>>>, handle: ListenerHandle) -> Self {
        Subscription {
            registry: Rc::downgrade(registry),
            handle,
        }
    }

    pub fn handle(&self) -> ListenerHandle {
        self.handle
    }

    /// Removes the subscription. Returns `false`, and does nothing else, if it
    /// was already removed, fired as a once-listener, or the emitter is gone.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry::unsubscribe(&registry, self.handle),
            None => false,
        }
    }

    /// Whether the subscription is still registered with a live emitter.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |registry| registry.borrow().contains(self.handle))
    }

    pub fn guard(self) -> SubscriptionGuard<T, G> {
        SubscriptionGuard::from(self)
    }
}

impl<T, G> Clone for Subscription<T, G> {
    fn clone(&self) -> Self {
        Subscription {
            registry: self.registry.clone(),
            handle: self.handle,
        }
    }
}

impl<T, G> fmt::Debug for Subscription<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .finish()
    }
}
