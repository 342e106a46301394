//! # State, Groups, and Effects
//!
//! Ripple is a small headless recomposition runtime. UI is a function of
//! state: content closures build a `View` tree, and the runtime re-runs only
//! the pieces whose inputs changed. There are four main pieces:
//!
//! - `Signal<T>`: observable, reactive value.
//! - groups (`group`, `key`): restart scopes that own `remember` slots.
//! - effect handlers (`launched_effect`, `disposable_effect`, `side_effect`):
//!   work that runs after a frame commits and is cleaned up with its group.
//! - `Job` / `CoroutineScope`: cancellable local async work.
//!
//! ## Signals
//!
//! `Signal<T>` is a cloneable handle to a piece of state:
//!
//! ```rust
//! use ripple_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! Writing a value equal to the current one is a no-op. Reads participate in
//! a dependency graph: a group or `Derived` that called `get()` is re-run when
//! the signal changes.
//!
//! ## Remembered state
//!
//! UI state is held in `remember*` slots of the current group:
//!
//! ```rust,ignore
//! fn Counter() -> View {
//!     let count = remember(|| signal(0));
//!     let c = (*count).clone();
//!     Column(Modifier::new()).child((
//!         Text(format!("Count = {}", count.get())),
//!         Button("N++", move || c.update(|n| *n += 1)),
//!     ))
//! }
//! ```
//!
//! - `remember` and `remember_state` are order-based: the Nth call in a group
//!   always refers to the Nth stored value.
//! - `remember_with_key` and `remember_state_with_key` are key-based and more
//!   stable across conditional branches. Wrapping a branch in `group` works
//!   too.
//!
//! ## Effects and cleanup
//!
//! Effects are queued while a group composes and applied when the frame
//! commits, after layout:
//!
//! ```rust,ignore
//! fn Ticker(key: u32) -> View {
//!     launched_effect(key, move || async move {
//!         loop {
//!             tokio::time::sleep(Duration::from_secs(1)).await;
//!             log::info!("tick for {key}");
//!         }
//!     });
//!     disposable_effect((), || {
//!         log::info!("entered");
//!         on_unmount(|| log::info!("left"))
//!     });
//!     Text("ticking")
//! }
//! ```
//!
//! - `launched_effect` restarts its job when the keys change and cancels it
//!   when the group leaves the composition.
//! - `disposable_effect` runs its cleanup before every restart and on removal.
//! - `side_effect` runs after every successful frame of its group.
//!
//! Jobs run on a `tokio::task::LocalSet`; frames are produced by
//! `Composition::frame`.

pub mod color;
pub mod effects;
pub mod effects_ext;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod modifier;
pub mod prelude;
pub mod reactive;
pub mod runtime;
pub mod scope;
pub mod semantics;
pub mod signal;
pub mod state;
pub mod task;
pub mod tests;
pub mod ui_state;
pub mod view;

pub use color::*;
pub use effects::*;
pub use effects_ext::*;
pub use error::*;
pub use geometry::*;
pub use lifecycle::*;
pub use modifier::*;
pub use reactive::{current_observer, untracked};
pub use runtime::*;
pub use scope::*;
pub use semantics::*;
pub use signal::*;
pub use state::*;
pub use task::*;
pub use ui_state::*;
pub use view::*;
