pub use crate::color::Color;
pub use crate::effects::{CancelGuard, Dispose, on_cancel, on_unmount};
pub use crate::effects_ext::{
    ProduceStateScope, SnapshotFlow, disposable_effect, launched_effect, produce_state,
    remember_coroutine_scope, remember_updated_state, side_effect, snapshot_flow,
};
pub use crate::error::RuntimeError;
pub use crate::geometry::{Rect, Vec2};
pub use crate::lifecycle::{Lifecycle, LifecycleState, collect_with_lifecycle, repeat_on_lifecycle};
pub use crate::modifier::Modifier;
pub use crate::runtime::{
    Composition, Frame, HitRegion, SemNode, frame_requested, group, key, remember,
    remember_state, remember_with_key,
};
pub use crate::scope::{Scope, current_scope};
pub use crate::semantics::{Role, Semantics};
pub use crate::signal::{Signal, signal};
pub use crate::state::{Derived, derived_state_of};
pub use crate::task::{CoroutineScope, Job, JobState, launch};
pub use crate::ui_state::UiState;
pub use crate::view::{View, ViewId, ViewKind};
