use crate::{ListenerHandle, Subscription};

/// Unsubscribes when dropped.
///
/// Ties a subscription to the lifetime of whatever owns the guard, e.g. a
/// component that should stop listening when it is torn down.
pub struct SubscriptionGuard<T, G = ()> {
    subscription: Subscription<T, G>,
    armed: bool,
}

impl<T, G> SubscriptionGuard<T, G> {
    pub fn handle(&self) -> ListenerHandle {
        self.subscription.handle()
    }

    /// Releases the guard without unsubscribing.
    pub fn disarm(mut self) -> Subscription<T, G> {
        self.armed = false;
        self.subscription.clone()
    }
}

impl<T, G> From<Subscription<T, G>> for SubscriptionGuard<T, G> {
    fn from(subscription: Subscription<T, G>) -> Self {
        SubscriptionGuard {
            subscription,
            armed: true,
        }
    }
}

impl<T, G> Drop for SubscriptionGuard<T, G> {
    fn drop(&mut self) {
        if self.armed {
            self.subscription.unsubscribe();
        }
    }
}
