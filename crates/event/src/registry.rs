use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use log::trace;

use crate::dispatch::WorkingSet;

/// Opaque identity of one subscription.
///
/// Handles are allocated from a per-emitter monotonic counter, so two
/// registrations of the same closure still produce two distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(usize);

pub(crate) enum Callback<T> {
    Durable(Box<dyn Fn(&T)>),
    Once(RefCell<Option<Box<dyn FnOnce(&T)>>>),
}

impl<T> Callback<T> {
    pub(crate) fn durable(cb: impl Fn(&T) + 'static) -> Self {
        Callback::Durable(Box::new(cb))
    }
    pub(crate) fn once(cb: impl FnOnce(&T) + 'static) -> Self {
        let cb: Box<dyn FnOnce(&T)> = Box::new(cb);
        Callback::Once(RefCell::new(Some(cb)))
    }
}

pub(crate) struct Entry<T, G> {
    handle: ListenerHandle,
    group: Option<G>,
    live: Cell<bool>,
    callback: Callback<T>,
}

impl<T, G> Entry<T, G> {
    pub(crate) fn handle(&self) -> ListenerHandle {
        self.handle
    }
    pub(crate) fn is_once(&self) -> bool {
        matches!(self.callback, Callback::Once(_))
    }
    pub(crate) fn is_live(&self) -> bool {
        self.live.get()
    }
    fn kill(&self) {
        self.live.set(false);
    }

    /// Runs the callback. A once callback is consumed by its first call and
    /// does nothing afterwards.
    pub(crate) fn invoke(&self, value: &T) {
        match &self.callback {
            Callback::Durable(f) => f(value),
            Callback::Once(slot) => {
                let f = slot.borrow_mut().take();
                if let Some(f) = f {
                    f(value);
                }
            }
        }
    }
}

/// Flat, registration-ordered list of subscriptions.
///
/// Entries are kept sorted by handle (handles only ever grow and removal
/// never reorders), which lets lookups by handle use a binary search.
pub(crate) struct Registry<T, G> {
    next_id: usize,
    items: Vec<Rc<Entry<T, G>>>,
}

impl<T, G> Default for Registry<T, G> {
    fn default() -> Self {
        Registry {
            next_id: 0,
            items: Vec::new(),
        }
    }
}

impl<T, G> Registry<T, G> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Registry {
            next_id: 0,
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn subscribe(&mut self, group: Option<G>, callback: Callback<T>) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        self.items.push(Rc::new(Entry {
            handle,
            group,
            live: Cell::new(true),
            callback,
        }));
        handle
    }

    /// Detaches the entry for `handle`, returning it so the caller can drop it
    /// once the registry borrow is released.
    pub(crate) fn unsubscribe(&mut self, handle: ListenerHandle) -> Option<Rc<Entry<T, G>>> {
        let offset = self.position(handle)?;
        let entry = self.items.remove(offset);
        entry.kill();
        Some(entry)
    }

    pub(crate) fn contains(&self, handle: ListenerHandle) -> bool {
        self.position(handle).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn clear(&mut self) -> Vec<Rc<Entry<T, G>>> {
        let removed: Vec<_> = self.items.drain(..).collect();
        for entry in &removed {
            entry.kill();
        }
        removed
    }

    pub(crate) fn working_set(&self) -> WorkingSet<T, G> {
        WorkingSet::new(self.items.clone())
    }

    fn position(&self, handle: ListenerHandle) -> Option<usize> {
        self.items
            .binary_search_by(|probe| probe.handle.cmp(&handle))
            .ok()
    }
}

impl<T, G: PartialEq> Registry<T, G> {
    pub(crate) fn remove_group(&mut self, group: &G) -> Vec<Rc<Entry<T, G>>> {
        let mut removed = Vec::new();
        self.items.retain(|entry| {
            if entry.group.as_ref() == Some(group) {
                entry.kill();
                removed.push(entry.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

/// Removes one subscription from a shared registry.
///
/// The detached entry is dropped after the borrow ends: its callback may own
/// values whose `Drop` calls back into the same emitter.
pub(crate) fn unsubscribe<T, G>(registry: &RefCell<Registry<T, G>>, handle: ListenerHandle) -> bool {
    let removed = registry.borrow_mut().unsubscribe(handle);
    match removed {
        Some(_) => {
            trace!("unsubscribed listener {:?}", handle);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use super::{Callback, Registry};

    fn durable(hits: &Rc<Cell<u32>>) -> Callback<u32> {
        let hits = hits.clone();
        Callback::durable(move |v: &u32| hits.set(hits.get() + v))
    }

    #[test]
    fn handles_are_distinct_and_ordered() {
        let hits = Rc::new(Cell::new(0));
        let mut registry: Registry<u32, ()> = Registry::default();
        let a = registry.subscribe(None, durable(&hits));
        let b = registry.subscribe(None, durable(&hits));
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unsubscribe_kills_and_detaches() {
        let hits = Rc::new(Cell::new(0));
        let mut registry: Registry<u32, ()> = Registry::default();
        let a = registry.subscribe(None, durable(&hits));
        let b = registry.subscribe(None, durable(&hits));
        let c = registry.subscribe(None, durable(&hits));

        let removed = registry.unsubscribe(b).expect("b is registered");
        assert!(!removed.is_live());
        assert!(registry.unsubscribe(b).is_none());

        // Lookups still work for the entries on either side of the gap
        assert!(registry.contains(a));
        assert!(registry.contains(c));
        assert!(!registry.contains(b));
    }

    #[test]
    fn remove_group_preserves_order_of_the_rest() {
        let hits = Rc::new(Cell::new(0));
        let mut registry: Registry<u32, &'static str> = Registry::default();
        let a = registry.subscribe(Some("x"), durable(&hits));
        let b = registry.subscribe(Some("y"), durable(&hits));
        let c = registry.subscribe(None, durable(&hits));
        let d = registry.subscribe(Some("x"), durable(&hits));

        let removed = registry.remove_group(&"x");
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|e| !e.is_live()));

        let left: Vec<_> = registry.items.iter().map(|e| e.handle()).collect();
        assert_eq!(left, vec![b, c]);
        assert!(!registry.contains(a));
        assert!(!registry.contains(d));
        assert!(registry.remove_group(&"nobody").is_empty());
    }

    #[test]
    fn once_callback_runs_a_single_time() {
        let hits = Rc::new(Cell::new(0));
        let mut registry: Registry<u32, ()> = Registry::default();
        let h = hits.clone();
        registry.subscribe(None, Callback::once(move |v: &u32| h.set(h.get() + v)));

        let entry = registry.items[0].clone();
        assert!(entry.is_once());
        entry.invoke(&3);
        entry.invoke(&3);
        assert_eq!(hits.get(), 3);
    }
}
