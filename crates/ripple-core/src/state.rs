use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::reactive::{self, ObserverId};
use crate::{Signal, remember, signal};

struct DerivedInner<T> {
    output: Signal<T>,
    observer: ObserverId,
    computations: Cell<u64>,
}

impl<T> Drop for DerivedInner<T> {
    fn drop(&mut self) {
        reactive::remove_observer(self.observer);
    }
}

/// A cell computed from other cells.
///
/// Recomputes eagerly whenever a signal it read changes, and republishes only
/// when the new value differs from the previous one, so readers of a
/// `Derived` are not re-invoked for upstream changes that leave it unchanged.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("output", &self.inner.output)
            .field("computations", &self.inner.computations.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Derived<T> {
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        let compute = Rc::new(compute);
        let inner = Rc::new_cyclic(|weak: &Weak<DerivedInner<T>>| {
            let observer = reactive::new_observer({
                let weak = weak.clone();
                let compute = compute.clone();
                move || {
                    let value = compute();
                    if let Some(inner) = weak.upgrade() {
                        inner.computations.set(inner.computations.get() + 1);
                        inner.output.set(value);
                    }
                }
            });
            let initial = reactive::track(observer, || compute());
            DerivedInner {
                output: signal(initial),
                observer,
                computations: Cell::new(1),
            }
        });
        Self { inner }
    }

    /// Tracked read.
    pub fn get(&self) -> T {
        self.inner.output.get()
    }

    pub fn get_untracked(&self) -> T {
        self.inner.output.get_untracked()
    }

    /// Number of changes published by this cell.
    pub fn version(&self) -> u64 {
        self.inner.output.version()
    }

    /// How many times the computation has run, including the first.
    pub fn computations(&self) -> u64 {
        self.inner.computations.get()
    }

    pub fn as_signal(&self) -> Signal<T> {
        self.inner.output.clone()
    }
}

/// Remembered [`Derived`]: created on the first render of the calling group,
/// reused afterwards (later `compute` closures are ignored).
pub fn derived_state_of<T: Clone + PartialEq + 'static>(
    compute: impl Fn() -> T + 'static,
) -> Derived<T> {
    let derived = remember(|| Derived::new(compute));
    (*derived).clone()
}
