//! Lifecycle owner and lifecycle-aware collection.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tokio::sync::watch;

/// Ordered lifecycle states. `Destroyed` is terminal and compares below
/// every other state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Destroyed,
    Initialized,
    Created,
    Started,
    Resumed,
}

impl LifecycleState {
    pub fn is_at_least(self, other: LifecycleState) -> bool {
        self >= other
    }
}

#[derive(Clone)]
pub struct Lifecycle {
    tx: Rc<watch::Sender<LifecycleState>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LifecycleState::Initialized);
        Self { tx: Rc::new(tx) }
    }

    pub fn state(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Moves to `state`. Once destroyed the owner stays destroyed.
    pub fn set_state(&self, state: LifecycleState) {
        let current = self.state();
        if current == LifecycleState::Destroyed {
            log::warn!("lifecycle already destroyed; ignoring move to {state:?}");
            return;
        }
        if current != state {
            log::debug!("lifecycle {current:?} -> {state:?}");
            self.tx.send_replace(state);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }
}

/// Runs `block` every time `lifecycle` reaches `min_state`, cancelling it when
/// the state falls below. Returns once the owner is destroyed.
pub async fn repeat_on_lifecycle<F, Fut>(lifecycle: Lifecycle, min_state: LifecycleState, mut block: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut rx = lifecycle.subscribe();
    drop(lifecycle);
    loop {
        let reached = match rx
            .wait_for(|s| *s >= min_state || *s == LifecycleState::Destroyed)
            .await
        {
            Ok(state) => *state,
            Err(_) => return,
        };
        if reached == LifecycleState::Destroyed {
            return;
        }

        log::trace!("lifecycle reached {reached:?}; starting block");
        let work = block();
        tokio::pin!(work);
        tokio::select! {
            _ = &mut work => {
                if rx.wait_for(|s| *s < min_state).await.is_err() {
                    return;
                }
            }
            below = async { rx.wait_for(|s| *s < min_state).await.map(|_| ()) } => {
                if below.is_err() {
                    return;
                }
                log::trace!("lifecycle fell below {min_state:?}; block cancelled");
            }
        }
    }
}

/// Collects `rx` into `collector` while `lifecycle` is at least `Started`.
/// Every re-activation replays the latest value first.
pub async fn collect_with_lifecycle<T, C>(lifecycle: Lifecycle, rx: watch::Receiver<T>, collector: C)
where
    T: Clone,
    C: FnMut(T),
{
    let collector = Rc::new(RefCell::new(collector));
    repeat_on_lifecycle(lifecycle, LifecycleState::Started, || {
        let mut rx = rx.clone();
        let collector = collector.clone();
        async move {
            loop {
                let value = rx.borrow_and_update().clone();
                (collector.borrow_mut())(value);
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    })
    .await;
}
