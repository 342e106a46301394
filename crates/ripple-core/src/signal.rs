use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::reactive::{self, SignalId};

pub type SubId = usize;

/// Observable single-value cell.
///
/// Reads inside an observer (a composition group, a derived cell, a snapshot
/// flow) register a dependency. Writes of a value equal to the current one are
/// dropped: no version bump, no subscriber call, no re-invocation.
pub struct Signal<T>(Rc<Inner<T>>);

struct Inner<T> {
    id: SignalId,
    value: RefCell<T>,
    version: Cell<u64>,
    next_sub: Cell<SubId>,
    subs: RefCell<Vec<(SubId, Rc<dyn Fn(&T)>)>>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        reactive::forget_signal(self.id);
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.0.id)
            .field("value", &*self.0.value.borrow())
            .field("version", &self.0.version.get())
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            id: reactive::new_signal_id(),
            value: RefCell::new(value),
            version: Cell::new(0),
            next_sub: Cell::new(0),
            subs: RefCell::new(Vec::new()),
        }))
    }

    pub fn id(&self) -> SignalId {
        self.0.id
    }

    /// Number of changes published so far.
    pub fn version(&self) -> u64 {
        self.0.version.get()
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_signal_read(self.0.id);
        self.0.value.borrow().clone()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Tracked read by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::register_signal_read(self.0.id);
        f(&*self.0.value.borrow())
    }

    pub fn set(&self, v: T)
    where
        T: PartialEq,
    {
        if *self.0.value.borrow() == v {
            return;
        }
        *self.0.value.borrow_mut() = v;
        self.publish();
    }

    /// Mutates in place; publishes only when the value actually changed.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F)
    where
        T: Clone + PartialEq,
    {
        let changed = {
            let mut value = self.0.value.borrow_mut();
            let before: T = (*value).clone();
            f(&mut *value);
            *value != before
        };
        if changed {
            self.publish();
        }
    }

    /// Plain change callback. Subscribers must not write back to this signal.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        let id = self.0.next_sub.get();
        self.0.next_sub.set(id + 1);
        self.0.subs.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubId) {
        self.0.subs.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    fn publish(&self) {
        self.0.version.set(self.0.version.get() + 1);
        let subs: Vec<Rc<dyn Fn(&T)>> = self.0.subs.borrow().iter().map(|(_, s)| s.clone()).collect();
        if !subs.is_empty() {
            let value: Ref<'_, T> = self.0.value.borrow();
            for s in &subs {
                s(&*value);
            }
        }
        reactive::signal_changed(self.0.id);
    }
}

pub fn signal<T: 'static>(t: T) -> Signal<T> {
    Signal::new(t)
}
