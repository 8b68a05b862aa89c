use std::{cell::RefCell, rc::Rc};

use crate::registry::{self, Entry, Registry};

/// The entries one `emit` call will consider, captured at its start.
///
/// Holding the entries by `Rc` lets the registry be borrowed, mutated or
/// re-entered freely while callbacks run. Whether an entry still gets called
/// is decided by its liveness flag at the moment its turn comes up.
pub(crate) struct WorkingSet<T, G>(Vec<Rc<Entry<T, G>>>);

impl<T, G> WorkingSet<T, G> {
    pub(crate) fn new(items: Vec<Rc<Entry<T, G>>>) -> Self {
        WorkingSet(items)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn notify(self, value: &T, registry: &RefCell<Registry<T, G>>) {
        for entry in self.0 {
            // Removed by an earlier listener of this pass, or by a nested emit
            if !entry.is_live() {
                continue;
            }
            // Once entries leave the registry before they run, so neither a
            // nested emit nor a panic in the callback can fire them again
            if entry.is_once() {
                registry::unsubscribe(registry, entry.handle());
            }
            entry.invoke(value);
        }
    }
}
