//! Ordered listener list with unsubscribe handles.
//!
//! Single-threaded. A listener may drop its own subscription (or another's)
//! while an event is being delivered; removed listeners are skipped for the
//! rest of that delivery.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Registry<T> {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

pub struct Listeners<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Appends a listener. Dropping the returned handle keeps it registered.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(RefCell::new(listener));
        let id = {
            let mut registry = self.registry.borrow_mut();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.entries.push((id, callback));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Delivers `event` to every listener in registration order.
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        for (id, callback) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            // A listener that re-emits into its own list is not re-entered.
            if let Ok(mut listener) = callback.try_borrow_mut() {
                (&mut *listener)(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Listeners::subscribe`].
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_registration_order() {
        let listeners: Listeners<u32> = Listeners::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        let _a = listeners.subscribe(move |value| first.borrow_mut().push(("a", *value)));
        let second = Rc::clone(&seen);
        let _b = listeners.subscribe(move |value| second.borrow_mut().push(("b", *value)));

        listeners.emit(&7);

        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let listeners: Listeners<u32> = Listeners::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let subscription = listeners.subscribe(move |_| *counter.borrow_mut() += 1);
        listeners.emit(&1);
        subscription.unsubscribe();
        listeners.emit(&2);

        assert_eq!(*count.borrow(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn listener_can_remove_itself_during_delivery() {
        let listeners: Listeners<u32> = Listeners::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(RefCell::new(0));

        let own = Rc::clone(&slot);
        let counter = Rc::clone(&hits);
        let subscription = listeners.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            if let Some(handle) = own.borrow_mut().take() {
                handle.unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(subscription);

        listeners.emit(&1);
        listeners.emit(&2);

        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn handle_outliving_list_is_harmless() {
        let listeners: Listeners<u32> = Listeners::new();
        let subscription = listeners.subscribe(|_| {});
        drop(listeners);
        subscription.unsubscribe();
    }
}
