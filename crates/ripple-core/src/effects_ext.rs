use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::{Stream, StreamExt};

use crate::reactive::{self, ObserverId};
use crate::runtime::{queue_effect, queue_side_effect};
use crate::task::{CoroutineScope, Job, launch};
use crate::{Dispose, Signal, current_scope, on_cancel, remember, signal};

struct LaunchedSlot<K> {
    keys: RefCell<Option<K>>,
    job: Rc<RefCell<Option<Job>>>,
}

/// Runs `body`'s future as a cancellable job tied to the calling group.
///
/// The job starts after the frame commits. While `keys` stays equal across
/// re-renders nothing happens; when it changes the running job is cancelled
/// and a fresh one launched. The job is cancelled when the group leaves the
/// composition.
pub fn launched_effect<K, F, Fut>(keys: K, body: F)
where
    K: PartialEq + Clone + 'static,
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let slot = remember(|| {
        let job: Rc<RefCell<Option<Job>>> = Rc::new(RefCell::new(None));
        if let Some(owner) = current_scope() {
            let job = job.clone();
            owner.add_disposer(move || {
                let running = job.borrow_mut().take();
                if let Some(running) = running {
                    running.cancel();
                }
            });
        }
        LaunchedSlot {
            keys: RefCell::new(None::<K>),
            job,
        }
    });

    if slot.keys.borrow().as_ref() == Some(&keys) {
        return;
    }
    *slot.keys.borrow_mut() = Some(keys);

    let job = slot.job.clone();
    queue_effect(move || {
        let previous = job.borrow_mut().take();
        if let Some(previous) = previous {
            previous.cancel();
        }
        let next = launch(body());
        *job.borrow_mut() = Some(next);
    });
}

struct DisposableSlot<K> {
    keys: RefCell<Option<K>>,
    cleanup: Rc<RefCell<Option<Dispose>>>,
}

/// cleanup on key change or unmount
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    keys: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let slot = remember(|| {
        let cleanup: Rc<RefCell<Option<Dispose>>> = Rc::new(RefCell::new(None));
        if let Some(owner) = current_scope() {
            let cleanup = cleanup.clone();
            owner.add_disposer(move || {
                let d = cleanup.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            });
        }
        DisposableSlot {
            keys: RefCell::new(None::<K>),
            cleanup,
        }
    });

    if slot.keys.borrow().as_ref() == Some(&keys) {
        return;
    }
    *slot.keys.borrow_mut() = Some(keys);

    let cleanup = slot.cleanup.clone();
    queue_effect(move || {
        let previous = cleanup.borrow_mut().take();
        if let Some(previous) = previous {
            previous.run();
        }
        let d = effect();
        *cleanup.borrow_mut() = Some(d);
    });
}

/// Runs after every successful frame of the calling group, once layout is
/// done.
pub fn side_effect(effect: impl FnOnce() + 'static) {
    queue_side_effect(effect);
}

/// Handle given to a [`produce_state`] producer.
pub struct ProduceStateScope<T> {
    state: Signal<T>,
}

impl<T: Clone + PartialEq + 'static> ProduceStateScope<T> {
    pub fn set_value(&self, value: T) {
        self.state.set(value);
    }

    pub fn value(&self) -> T {
        self.state.get_untracked()
    }

    /// Suspends until the producer is cancelled, then runs `on_dispose`.
    pub async fn await_dispose(self, on_dispose: impl FnOnce() + 'static) {
        let _guard = on_cancel(on_dispose);
        std::future::pending::<()>().await;
    }
}

/// A remembered signal fed by an async producer. The producer is launched
/// once, when the calling group first commits, and cancelled when the group
/// leaves the composition.
pub fn produce_state<T, F, Fut>(initial: T, producer: F) -> Signal<T>
where
    T: Clone + PartialEq + 'static,
    F: FnOnce(ProduceStateScope<T>) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let state = remember(|| signal(initial));
    let scope = ProduceStateScope {
        state: (*state).clone(),
    };
    launched_effect((), move || producer(scope));
    (*state).clone()
}

/// A remembered signal that is overwritten with `value` on every render.
pub fn remember_updated_state<T: Clone + PartialEq + 'static>(value: T) -> Signal<T> {
    let state = remember(|| signal(value.clone()));
    state.set(value);
    (*state).clone()
}

/// A [`CoroutineScope`] that survives re-renders and is cancelled when the
/// calling group leaves the composition.
pub fn remember_coroutine_scope() -> CoroutineScope {
    let scope = remember(|| {
        let scope = CoroutineScope::new();
        if let Some(owner) = current_scope() {
            let scope = scope.clone();
            owner.add_disposer(move || scope.cancel());
        }
        scope
    });
    (*scope).clone()
}

/// Stream of the distinct values of a tracked computation.
pub struct SnapshotFlow<T> {
    rx: mpsc::UnboundedReceiver<T>,
    observer: ObserverId,
}

impl<T> Stream for SnapshotFlow<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_next_unpin(cx)
    }
}

impl<T> Drop for SnapshotFlow<T> {
    fn drop(&mut self) {
        reactive::remove_observer(self.observer);
    }
}

/// Emits the current value of `f` right away, then every new value whenever a
/// signal read by `f` changes. Consecutive equal values are skipped.
pub fn snapshot_flow<T: Clone + PartialEq + 'static>(f: impl Fn() -> T + 'static) -> SnapshotFlow<T> {
    let (tx, rx) = mpsc::unbounded();
    let last_sent: RefCell<Option<T>> = RefCell::new(None);
    let observer = reactive::new_observer(move || {
        let value = f();
        let mut last = last_sent.borrow_mut();
        if last.as_ref() != Some(&value) {
            *last = Some(value.clone());
            // receiver gone: nothing left to notify
            let _ = tx.unbounded_send(value);
        }
    });
    reactive::run_observer_now(observer);
    SnapshotFlow { rx, observer }
}
