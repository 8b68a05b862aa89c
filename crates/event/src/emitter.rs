use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use log::{debug, trace};

use crate::{
    registry::{self, Callback, ListenerHandle, Registry},
    Subscription,
};

/// Delivers values of type `T` to every registered listener.
///
/// `G` is the type of the optional group tag used for bulk removal with
/// [`remove_all`](Emitter::remove_all). Clones share the same listeners.
///
/// ### Dispatch rules
/// - Listeners run synchronously, in registration order, on the caller's stack.
/// - A listener removed during an `emit` is not called later in that pass.
/// - Listeners added during an `emit` are first called by the next `emit`.
/// - A once-listener is unregistered right before it is called.
/// - `emit` may be re-entered from a listener. The nested call dispatches to the
///   listeners registered at its own start.
/// - Panics are not caught: they abort the rest of the pass and unwind out of
///   `emit`. The emitter remains usable.
pub struct Emitter<T, G = ()> {
    registry: Rc<RefCell<Registry<T, G>>>,
}

impl<T, G> Emitter<T, G> {
    pub fn new() -> Self {
        Emitter {
            registry: Default::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Emitter {
            registry: Rc::new(RefCell::new(Registry::with_capacity(capacity))),
        }
    }

    /// Registers `cb` to be called on every `emit`.
    pub fn on(&self, cb: impl Fn(&T) + 'static) -> Subscription<T, G> {
        self.subscribe(None, Callback::durable(cb))
    }

    pub fn on_group(&self, group: G, cb: impl Fn(&T) + 'static) -> Subscription<T, G> {
        self.subscribe(Some(group), Callback::durable(cb))
    }

    /// Registers `cb` to be called on the next `emit` only.
    pub fn once(&self, cb: impl FnOnce(&T) + 'static) -> Subscription<T, G> {
        self.subscribe(None, Callback::once(cb))
    }

    pub fn once_group(&self, group: G, cb: impl FnOnce(&T) + 'static) -> Subscription<T, G> {
        self.subscribe(Some(group), Callback::once(cb))
    }

    fn subscribe(&self, group: Option<G>, callback: Callback<T>) -> Subscription<T, G> {
        let once = matches!(callback, Callback::Once(_));
        let handle = self.registry.borrow_mut().subscribe(group, callback);
        trace!("subscribed listener {:?} (once: {})", handle, once);
        Subscription::new(&self.registry, handle)
    }

    /// Removes the subscription identified by `handle`.
    ///
    /// Returns `false` if no such subscription is registered. Takes effect
    /// immediately, including for a dispatch that is in progress.
    pub fn off(&self, handle: ListenerHandle) -> bool {
        registry::unsubscribe(&self.registry, handle)
    }

    pub fn emit(&self, value: &T) {
        let working_set = self.registry.borrow().working_set();
        trace!("emitting to {} listeners", working_set.len());

        // The registry borrow ended above, listeners may subscribe, unsubscribe
        // or emit again
        working_set.notify(value, &self.registry);
    }

    pub fn contains(&self, handle: ListenerHandle) -> bool {
        self.registry.borrow().contains(handle)
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every subscription.
    pub fn clear(&self) -> usize {
        let removed = self.registry.borrow_mut().clear();
        debug!("cleared {} listeners", removed.len());
        removed.len()
    }

    /// A non-owning reference, for listeners that need to reach their own
    /// emitter without keeping it alive.
    pub fn downgrade(&self) -> WeakEmitter<T, G> {
        WeakEmitter(Rc::downgrade(&self.registry))
    }
}

impl<T, G: PartialEq> Emitter<T, G> {
    /// Removes every subscription tagged with `group`, once-listeners
    /// included. Returns how many were removed.
    pub fn remove_all(&self, group: &G) -> usize {
        let removed = self.registry.borrow_mut().remove_group(group);
        debug!("removed {} grouped listeners", removed.len());
        removed.len()
    }
}

impl<T, G> Default for Emitter<T, G> {
    fn default() -> Self {
        Emitter::new()
    }
}

impl<T, G> Clone for Emitter<T, G> {
    fn clone(&self) -> Self {
        Emitter {
            registry: self.registry.clone(),
        }
    }
}

impl<T, G> fmt::Debug for Emitter<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.len())
            .finish()
    }
}

pub struct WeakEmitter<T, G = ()>(Weak<RefCell<Registry<T, G>>>);

impl<T, G> WeakEmitter<T, G> {
    pub fn upgrade(&self) -> Option<Emitter<T, G>> {
        let registry = self.0.upgrade()?;
        Some(Emitter { registry })
    }
}

impl<T, G> Clone for WeakEmitter<T, G> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
