//! Dependency graph between signals and observers.
//!
//! An observer is a closure. While it runs, every signal it reads is recorded
//! as an edge `signal -> observer`. When a signal publishes a change, each
//! dependent observer has its edges cleared and is re-run under tracking, so
//! its dependency set always reflects the last run.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

pub type SignalId = usize;
pub type ObserverId = usize;

thread_local! {
    static CURRENT_OBSERVER: Cell<Option<ObserverId>> = const { Cell::new(None) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
    // Cleanups requested while GRAPH was borrowed.
    static DEFERRED: RefCell<Vec<Cleanup>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy, Debug)]
enum Cleanup {
    Signal(SignalId),
    Observer(ObserverId),
}

#[derive(Default)]
struct DepGraph {
    next_signal: SignalId,
    next_observer: ObserverId,
    // signal_id -> observers that depend on it (ordered by creation)
    edges: HashMap<SignalId, BTreeSet<ObserverId>>,
    // observer_id -> signals it depends on
    back: HashMap<ObserverId, HashSet<SignalId>>,
    observers: HashMap<ObserverId, Rc<dyn Fn()>>,
    running: HashSet<ObserverId>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(signals) = self.back.remove(&obs) {
            for s in signals {
                if let Some(set) = self.edges.get_mut(&s) {
                    set.remove(&obs);
                    if set.is_empty() {
                        self.edges.remove(&s);
                    }
                }
            }
        }
    }

    /// Hands the closure back so the caller drops it after releasing the
    /// graph: it may own the last handle of another signal or observer.
    fn remove_observer(&mut self, obs: ObserverId) -> Option<Rc<dyn Fn()>> {
        self.remove_all_edges_for(obs);
        self.running.remove(&obs);
        self.observers.remove(&obs)
    }

    fn forget_signal(&mut self, sig: SignalId) {
        if let Some(observers) = self.edges.remove(&sig) {
            for obs in observers {
                if let Some(set) = self.back.get_mut(&obs) {
                    set.remove(&sig);
                }
            }
        }
    }

    fn apply(&mut self, cleanup: Cleanup) -> Option<Rc<dyn Fn()>> {
        match cleanup {
            Cleanup::Signal(sig) => {
                self.forget_signal(sig);
                None
            }
            Cleanup::Observer(obs) => self.remove_observer(obs),
        }
    }
}

/// Applies `cleanup` now, or queues it if the graph is busy. Closures it
/// releases are dropped outside the borrow, then queued cleanups are retried.
fn release(cleanup: Cleanup) {
    // The graph may already be gone during thread teardown.
    let released = GRAPH.try_with(|g| match g.try_borrow_mut() {
        Ok(mut g) => g.apply(cleanup),
        Err(_) => {
            let _ = DEFERRED.try_with(|d| d.borrow_mut().push(cleanup));
            None
        }
    });
    drop(released);
    flush_deferred();
}

fn flush_deferred() {
    loop {
        let Ok(Some(next)) = DEFERRED.try_with(|d| d.borrow_mut().pop()) else {
            return;
        };
        let released = GRAPH.try_with(|g| match g.try_borrow_mut() {
            Ok(mut g) => Ok(g.apply(next)),
            Err(_) => Err(()),
        });
        match released {
            Ok(Ok(closure)) => drop(closure),
            Ok(Err(())) => {
                let _ = DEFERRED.try_with(|d| d.borrow_mut().push(next));
                return;
            }
            Err(_) => return,
        }
    }
}

pub(crate) fn new_signal_id() -> SignalId {
    GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        let id = g.next_signal;
        g.next_signal += 1;
        id
    })
}

/// Drops every edge that points from `sig`. Called when the last handle of a
/// signal goes away.
pub(crate) fn forget_signal(sig: SignalId) {
    release(Cleanup::Signal(sig));
}

pub fn register_signal_read(sig: SignalId) {
    if let Some(obs) = CURRENT_OBSERVER.with(Cell::get) {
        GRAPH.with(|g| {
            let mut g = g.borrow_mut();
            g.edges.entry(sig).or_default().insert(obs);
            g.back.entry(obs).or_default().insert(sig);
        });
    }
}

/// Re-runs every observer that read `sig` during its last run.
pub fn signal_changed(sig: SignalId) {
    let dependents: Vec<ObserverId> = GRAPH.with(|g| {
        g.borrow()
            .edges
            .get(&sig)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    });
    for obs in dependents {
        run_observer(obs);
    }
}

fn run_observer(obs: ObserverId) {
    let f = GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        if g.running.contains(&obs) {
            return None;
        }
        let f = g.observers.get(&obs).cloned()?;
        g.running.insert(obs);
        // clear previous deps before recompute
        g.remove_all_edges_for(obs);
        Some(f)
    });
    let Some(f) = f else {
        return;
    };
    with_current(Some(obs), || f());
    GRAPH.with(|g| {
        g.borrow_mut().running.remove(&obs);
    });
    flush_deferred();
}

fn with_current<R>(obs: Option<ObserverId>, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<ObserverId>);
    impl Drop for Restore {
        fn drop(&mut self) {
            CURRENT_OBSERVER.with(|co| co.set(self.0));
        }
    }
    let _restore = Restore(CURRENT_OBSERVER.with(|co| co.replace(obs)));
    f()
}

pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        let id = g.next_observer;
        g.next_observer += 1;
        g.observers.insert(id, Rc::new(f));
        id
    })
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    release(Cleanup::Observer(id));
}

/// Runs the observer's own closure immediately, establishing its edges.
pub fn run_observer_now(id: ObserverId) {
    run_observer(id);
}

/// Runs `f` with `id` as the current observer. Edges recorded by earlier runs
/// of `id` are dropped first.
pub fn track<R>(id: ObserverId, f: impl FnOnce() -> R) -> R {
    GRAPH.with(|g| g.borrow_mut().remove_all_edges_for(id));
    with_current(Some(id), f)
}

/// Runs `f` without recording any reads.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    with_current(None, f)
}

pub fn current_observer() -> Option<ObserverId> {
    CURRENT_OBSERVER.with(Cell::get)
}

#[cfg(test)]
pub(crate) fn dependents_of(sig: SignalId) -> usize {
    GRAPH.with(|g| g.borrow().edges.get(&sig).map_or(0, BTreeSet::len))
}

/// Signals with at least one dependent, and live observers.
#[cfg(test)]
pub(crate) fn graph_size() -> (usize, usize) {
    GRAPH.with(|g| {
        let g = g.borrow();
        (g.edges.len(), g.observers.len())
    })
}
