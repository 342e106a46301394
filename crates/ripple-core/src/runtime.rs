//! Composition runtime.
//!
//! A composition is a tree of *groups*. Each group is a restart scope: it owns
//! a body closure, its `remember` slots, a [`Scope`] for cleanups, and an
//! observer in the dependency graph. Reading a signal while a group's body
//! runs makes that group depend on the signal; writing the signal later marks
//! the group invalid, and the next [`Composition::frame`] re-runs only the
//! invalid groups that have no invalid ancestor.
//!
//! Effects never run during composition. They are queued and applied once
//! the frame has been laid out (see [`Composition::frame`]).

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use tokio::sync::Notify;

use crate::error::RuntimeError;
use crate::reactive::{self, ObserverId};
use crate::scope::{Scope, current_scope};
use crate::semantics::Role;
use crate::{Rect, Vec2, View, ViewKind};

new_key_type! {
    pub struct GroupId;
}

thread_local! {
    static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
    static FRAME_REQUESTS: Rc<Notify> = Rc::new(Notify::new());
}

/// Upper bound on recomposition passes within one frame.
const MAX_PASSES: usize = 16;

type SiteKey = (&'static Location<'static>, Option<u64>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GroupKey {
    site: &'static Location<'static>,
    user: Option<u64>,
    occurrence: u32,
}

struct Group {
    key: GroupKey,
    parent: Option<GroupId>,
    root: Option<GroupId>,
    depth: usize,
    slots: Vec<Box<dyn Any>>,
    keyed_slots: HashMap<String, Box<dyn Any>>,
    cursor: usize,
    children: Vec<GroupId>,
    next_children: Vec<GroupId>,
    occurrences: HashMap<SiteKey, u32>,
    body: Rc<dyn Fn() -> View>,
    observer: ObserverId,
    scope: Scope,
    view: Option<View>,
    invalid: bool,
    detached: bool,
}

#[derive(Default)]
struct Pending {
    forgotten: Vec<GroupId>,
    effects: Vec<Box<dyn FnOnce()>>,
    side_effects: Vec<Box<dyn FnOnce()>>,
}

#[derive(Default)]
struct Composer {
    groups: SlotMap<GroupId, Group>,
    stack: Vec<GroupId>,
    pending: Pending,
    runs: u64,
}

impl Composer {
    fn create_group(
        &mut self,
        key: GroupKey,
        parent: Option<GroupId>,
        body: Rc<dyn Fn() -> View>,
    ) -> GroupId {
        let (root, depth) = match parent.and_then(|p| self.groups.get(p)) {
            Some(p) => (p.root, p.depth + 1),
            None => (None, 0),
        };
        let id = self.groups.insert_with_key(|id| Group {
            key,
            parent,
            root,
            depth,
            slots: Vec::new(),
            keyed_slots: HashMap::new(),
            cursor: 0,
            children: Vec::new(),
            next_children: Vec::new(),
            occurrences: HashMap::new(),
            body,
            observer: reactive::new_observer(move || invalidate(id)),
            scope: Scope::new(),
            view: None,
            invalid: true,
            detached: false,
        });
        if let Some(g) = self.groups.get_mut(id)
            && g.root.is_none()
        {
            g.root = Some(id);
        }
        id
    }

    fn belongs_to(&self, id: GroupId, root: GroupId) -> bool {
        self.groups.get(id).is_some_and(|g| g.root == Some(root))
    }

    fn has_invalid_ancestor(&self, id: GroupId) -> bool {
        let mut cur = self.groups.get(id).and_then(|g| g.parent);
        while let Some(p) = cur {
            match self.groups.get(p) {
                Some(g) if g.invalid => return true,
                Some(g) => cur = g.parent,
                None => return false,
            }
        }
        false
    }

    /// Invalid, attached groups of the composition rooted at `root` whose
    /// ancestors are all valid, shallowest first.
    fn restart_roots(&self, root: GroupId) -> Vec<GroupId> {
        let mut out: Vec<(usize, GroupId)> = self
            .groups
            .iter()
            .filter(|(id, g)| g.invalid && !g.detached && self.belongs_to(*id, root))
            .filter(|(id, _)| !self.has_invalid_ancestor(*id))
            .map(|(id, g)| (g.depth, id))
            .collect();
        out.sort_by_key(|(depth, _)| *depth);
        out.into_iter().map(|(_, id)| id).collect()
    }
}

fn invalidate(id: GroupId) {
    let marked = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        match c.groups.get_mut(id) {
            Some(g) if !g.detached => {
                g.invalid = true;
                true
            }
            _ => false,
        }
    });
    if marked {
        FRAME_REQUESTS.with(|n| n.notify_one());
    }
}

/// Resolves when any composition on this thread has an invalid group.
pub async fn frame_requested() {
    let notify = FRAME_REQUESTS.with(Rc::clone);
    notify.notified().await;
}

fn current_group() -> Option<GroupId> {
    COMPOSER.with(|c| c.borrow().stack.last().copied())
}

struct StackGuard;

impl StackGuard {
    fn push(id: GroupId) -> Self {
        COMPOSER.with(|c| c.borrow_mut().stack.push(id));
        StackGuard
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        COMPOSER.with(|c| {
            c.borrow_mut().stack.pop();
        });
    }
}

fn run_group(id: GroupId) {
    let prepared = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        c.runs += 1;
        let g = c.groups.get_mut(id)?;
        g.invalid = false;
        g.cursor = 0;
        g.next_children.clear();
        g.occurrences.clear();
        Some((g.body.clone(), g.observer, g.scope.clone()))
    });
    let Some((body, observer, scope)) = prepared else {
        return;
    };

    let view = {
        let _guard = StackGuard::push(id);
        scope.run(|| reactive::track(observer, || body()))
    };

    let removed = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let Some(g) = c.groups.get_mut(id) else {
            return Vec::new();
        };
        g.view = Some(view);
        let next = std::mem::take(&mut g.next_children);
        let old = std::mem::replace(&mut g.children, next);
        old.into_iter()
            .filter(|o| !g.children.contains(o))
            .collect::<Vec<_>>()
    });
    for r in removed {
        forget(r);
    }
}

/// Detaches a group subtree from the graph; its scope is disposed when the
/// current frame commits.
fn forget(id: GroupId) {
    let subtree = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let mut ids = vec![id];
        let mut i = 0;
        while i < ids.len() {
            if let Some(g) = c.groups.get(ids[i]) {
                ids.extend(g.children.iter().copied());
            }
            i += 1;
        }
        let mut observers = Vec::with_capacity(ids.len());
        for gid in &ids {
            if let Some(g) = c.groups.get_mut(*gid) {
                g.detached = true;
                g.invalid = false;
                observers.push(g.observer);
            }
        }
        c.pending.forgotten.push(id);
        observers
    });
    for obs in subtree {
        reactive::remove_observer(obs);
    }
}

fn dispose_tree(id: GroupId) {
    let entry = COMPOSER.with(|c| {
        c.borrow()
            .groups
            .get(id)
            .map(|g| (g.children.clone(), g.scope.clone(), g.observer))
    });
    let Some((children, scope, observer)) = entry else {
        return;
    };
    for child in children.iter().rev() {
        dispose_tree(*child);
    }
    scope.dispose();
    reactive::remove_observer(observer);
    // Slots are dropped outside the composer borrow.
    let group = COMPOSER.with(|c| c.borrow_mut().groups.remove(id));
    drop(group);
}

fn compose_group(site: &'static Location<'static>, user: Option<u64>, body: Rc<dyn Fn() -> View>) -> View {
    let Some(parent) = current_group() else {
        log::warn!("{} at {site}; running inline", RuntimeError::OutsideComposition("group"));
        return body();
    };
    let child = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let occurrence = {
            let Some(p) = c.groups.get_mut(parent) else {
                return None;
            };
            let n = p.occurrences.entry((site, user)).or_insert(0);
            let occurrence = *n;
            *n += 1;
            occurrence
        };
        let key = GroupKey {
            site,
            user,
            occurrence,
        };
        let existing = c.groups.get(parent).and_then(|p| {
            p.children
                .iter()
                .copied()
                .find(|id| !p.next_children.contains(id) && c.groups.get(*id).is_some_and(|g| g.key == key))
        });
        let id = match existing {
            Some(id) => {
                if let Some(g) = c.groups.get_mut(id) {
                    g.body = body.clone();
                }
                id
            }
            None => c.create_group(key, Some(parent), body.clone()),
        };
        if let Some(p) = c.groups.get_mut(parent) {
            p.next_children.push(id);
        }
        Some(id)
    });
    match child {
        Some(id) => {
            run_group(id);
            View::new(0, ViewKind::Group(id))
        }
        None => body(),
    }
}

/// Composes `content` as its own restart scope, identified by call site.
///
/// When only signals read inside `content` change, only this group re-runs.
/// When the caller re-runs, `content` is replaced with the new closure and
/// re-run as well.
#[track_caller]
pub fn group(content: impl Fn() -> View + 'static) -> View {
    compose_group(Location::caller(), None, Rc::new(content))
}

/// Like [`group`], but also identified by `key`. A different key value means
/// a different group: the previous one leaves the composition (its effects
/// are cancelled, its state forgotten) and a fresh one is composed.
#[track_caller]
pub fn key<K: Hash>(key: K, content: impl Fn() -> View + 'static) -> View {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    compose_group(Location::caller(), Some(hasher.finish()), Rc::new(content))
}

/// Queues `f` to run when the current frame commits, before side effects.
/// Skipped if the owning group has left the composition by then.
pub(crate) fn queue_effect(f: impl FnOnce() + 'static) {
    let owner = current_scope();
    let action: Box<dyn FnOnce()> = Box::new(move || {
        if owner.as_ref().is_some_and(Scope::is_disposed) {
            return;
        }
        f()
    });
    let rejected = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        if c.stack.is_empty() {
            Some(action)
        } else {
            c.pending.effects.push(action);
            None
        }
    });
    if let Some(action) = rejected {
        log::warn!("{}; running now", RuntimeError::OutsideComposition("launched_effect"));
        action();
    }
}

/// Queues `f` to run after this frame's effects. Skipped if the owning group
/// has left the composition by then.
pub(crate) fn queue_side_effect(f: impl FnOnce() + 'static) {
    let owner = current_scope();
    let action: Box<dyn FnOnce()> = Box::new(move || {
        if owner.as_ref().is_some_and(Scope::is_disposed) {
            return;
        }
        f()
    });
    let rejected = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        if c.stack.is_empty() {
            Some(action)
        } else {
            c.pending.side_effects.push(action);
            None
        }
    });
    if let Some(action) = rejected {
        action();
    }
}

fn apply_pending() {
    let pending = COMPOSER.with(|c| std::mem::take(&mut c.borrow_mut().pending));
    log::trace!(
        "commit: {} forgotten, {} effect(s), {} side effect(s)",
        pending.forgotten.len(),
        pending.effects.len(),
        pending.side_effects.len()
    );
    for id in pending.forgotten {
        dispose_tree(id);
    }
    for effect in pending.effects {
        effect();
    }
    for side_effect in pending.side_effects {
        side_effect();
    }
}

fn resolve(id: GroupId) -> View {
    let view = COMPOSER.with(|c| c.borrow().groups.get(id).and_then(|g| g.view.clone()));
    match view {
        Some(v) => expand(v),
        None => View::new(0, ViewKind::Box),
    }
}

fn expand(mut v: View) -> View {
    if let ViewKind::Group(id) = v.kind {
        return resolve(id);
    }
    v.children = v.children.into_iter().map(expand).collect();
    v
}

enum Lookup<T> {
    Hit(Rc<T>),
    Miss(Option<GroupId>),
}

/// Slot-based remember: the Nth call in a group always refers to the Nth
/// stored value.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let (lookup, cursor) = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let Some(gid) = c.stack.last().copied() else {
            return (Lookup::Miss(None), 0);
        };
        let Some(g) = c.groups.get_mut(gid) else {
            return (Lookup::Miss(None), 0);
        };
        let cursor = g.cursor;
        g.cursor += 1;

        if cursor >= g.slots.len() {
            // reserve the position so remembers nested in `init` line up
            g.slots.push(Box::new(()));
            return (Lookup::Miss(Some(gid)), cursor);
        }
        if let Some(rc) = g.slots[cursor].downcast_ref::<Rc<T>>() {
            (Lookup::Hit(rc.clone()), cursor)
        } else {
            log::warn!(
                "remember: slot {cursor} type changed; replacing. \
                 If this is due to conditional composition, wrap the branch in `group`."
            );
            (Lookup::Miss(Some(gid)), cursor)
        }
    });

    match lookup {
        Lookup::Hit(rc) => rc,
        Lookup::Miss(None) => {
            log::warn!("{}; value is not retained", RuntimeError::OutsideComposition("remember"));
            Rc::new(init())
        }
        Lookup::Miss(Some(gid)) => {
            let rc: Rc<T> = Rc::new(init());
            let previous = COMPOSER.with(|c| {
                let mut c = c.borrow_mut();
                let g = c.groups.get_mut(gid)?;
                let slot = g.slots.get_mut(cursor)?;
                Some(std::mem::replace(slot, Box::new(rc.clone())))
            });
            drop(previous);
            rc
        }
    }
}

/// Key-based remember, stable across conditional branches of one group.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let lookup = COMPOSER.with(|c| {
        let c = c.borrow();
        let Some(gid) = c.stack.last().copied() else {
            return Lookup::Miss(None);
        };
        match c.groups.get(gid).and_then(|g| g.keyed_slots.get(&key)) {
            Some(existing) => match existing.downcast_ref::<Rc<T>>() {
                Some(rc) => Lookup::Hit(rc.clone()),
                None => {
                    log::warn!("remember_with_key: key '{key}' reused with a different type; replacing.");
                    Lookup::Miss(Some(gid))
                }
            },
            None => Lookup::Miss(Some(gid)),
        }
    });

    match lookup {
        Lookup::Hit(rc) => rc,
        Lookup::Miss(None) => {
            log::warn!("{} (key '{key}')", RuntimeError::OutsideComposition("remember_with_key"));
            Rc::new(init())
        }
        Lookup::Miss(Some(gid)) => {
            let rc: Rc<T> = Rc::new(init());
            let previous = COMPOSER.with(|c| {
                let mut c = c.borrow_mut();
                let g = c.groups.get_mut(gid)?;
                g.keyed_slots.insert(key, Box::new(rc.clone()))
            });
            drop(previous);
            rc
        }
    }
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

/// Frame — output of one composition pass: the resolved view tree plus the
/// layout pass's hit regions and semantics nodes.
pub struct Frame {
    pub number: u64,
    pub root: View,
    pub hit_regions: Vec<HitRegion>,
    pub semantics_nodes: Vec<SemNode>,
    /// Groups whose bodies ran to produce this frame.
    pub recomposed: u64,
}

#[derive(Clone)]
pub struct HitRegion {
    pub id: u64,
    pub rect: Rect,
    pub on_click: Option<Rc<dyn Fn()>>,
    pub enabled: bool,
}

impl std::fmt::Debug for HitRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRegion")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Flattened semantics node produced by the layout pass.
#[derive(Clone, Debug)]
pub struct SemNode {
    /// Stable within a frame, shared with the associated `HitRegion`.
    pub id: u64,
    pub role: Role,
    pub label: Option<String>,
    pub rect: Rect,
    pub enabled: bool,
}

impl Frame {
    pub fn texts(&self) -> Vec<String> {
        self.root.texts()
    }

    pub fn find(&self, label: &str) -> Option<&SemNode> {
        self.semantics_nodes
            .iter()
            .find(|n| n.label.as_deref() == Some(label))
    }

    pub fn is_enabled(&self, label: &str) -> bool {
        self.find(label).is_some_and(|n| n.enabled)
    }

    /// Top-most enabled hit region under `pos`.
    pub fn hit_at(&self, pos: Vec2) -> Option<&HitRegion> {
        self.hit_regions
            .iter()
            .rev()
            .find(|h| h.enabled && h.rect.contains(pos))
    }

    /// Clicks the enabled button labelled `label`. Returns `false` when there
    /// is no such button.
    pub fn click(&self, label: &str) -> bool {
        let Some(node) = self
            .semantics_nodes
            .iter()
            .find(|n| n.role == Role::Button && n.enabled && n.label.as_deref() == Some(label))
        else {
            return false;
        };
        match self
            .hit_regions
            .iter()
            .find(|h| h.id == node.id)
            .and_then(|h| h.on_click.clone())
        {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }
}

/// A tree of groups rooted at one content closure.
pub struct Composition {
    root: Option<GroupId>,
    frames: u64,
    size: (u32, u32),
}

impl Composition {
    #[track_caller]
    pub fn new(content: impl Fn() -> View + 'static) -> Self {
        let site = Location::caller();
        let root = COMPOSER.with(|c| {
            c.borrow_mut().create_group(
                GroupKey {
                    site,
                    user: None,
                    occurrence: 0,
                },
                None,
                Rc::new(content),
            )
        });
        Self {
            root: Some(root),
            frames: 0,
            size: (1280, 800),
        }
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_none()
    }

    /// True when some group of this composition needs to re-run.
    pub fn has_pending(&self) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        COMPOSER.with(|c| !c.borrow().restart_roots(root).is_empty())
    }

    pub fn group_count(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        COMPOSER.with(|c| {
            let c = c.borrow();
            c.groups
                .iter()
                .filter(|(id, g)| !g.detached && c.belongs_to(*id, root))
                .count()
        })
    }

    /// Produces one frame:
    /// 1. re-runs invalid groups (all of them on the first frame),
    /// 2. resolves group placeholders into one view tree,
    /// 3. runs `layout_paint`,
    /// 4. commits: disposes groups that left the composition, applies keyed
    ///    effect changes in declaration order, then runs side effects in
    ///    declaration order.
    pub fn frame(
        &mut self,
        layout_paint: impl FnOnce(&View, (u32, u32)) -> (Vec<HitRegion>, Vec<SemNode>),
    ) -> Result<Frame, RuntimeError> {
        let root = self.root.ok_or(RuntimeError::Disposed)?;
        let runs_before = COMPOSER.with(|c| c.borrow().runs);
        self.recompose(root);
        let recomposed = COMPOSER.with(|c| c.borrow().runs) - runs_before;

        let view = resolve(root);
        let (hit_regions, semantics_nodes) = layout_paint(&view, self.size);
        apply_pending();

        self.frames += 1;
        log::trace!("frame {}: {} group(s) recomposed", self.frames, recomposed);
        Ok(Frame {
            number: self.frames,
            root: view,
            hit_regions,
            semantics_nodes,
            recomposed,
        })
    }

    fn recompose(&self, root: GroupId) {
        for _ in 0..MAX_PASSES {
            let dirty = COMPOSER.with(|c| c.borrow().restart_roots(root));
            if dirty.is_empty() {
                return;
            }
            for id in dirty {
                let still_invalid =
                    COMPOSER.with(|c| c.borrow().groups.get(id).is_some_and(|g| g.invalid && !g.detached));
                if still_invalid {
                    run_group(id);
                }
            }
        }
        log::warn!(
            "recomposition did not settle after {MAX_PASSES} passes; remaining groups wait for the next frame"
        );
    }

    /// The whole tree leaves the composition: every effect is cancelled and
    /// every disposer runs.
    pub fn dispose(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let observers = COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            let ids: Vec<GroupId> = c
                .groups
                .iter()
                .filter(|(id, _)| c.belongs_to(*id, root))
                .map(|(id, _)| id)
                .collect();
            ids.into_iter()
                .filter_map(|id| {
                    c.groups.get_mut(id).map(|g| {
                        g.detached = true;
                        g.observer
                    })
                })
                .collect::<Vec<_>>()
        });
        for obs in observers {
            reactive::remove_observer(obs);
        }
        dispose_tree(root);
        log::debug!("composition disposed after {} frame(s)", self.frames);
    }
}

impl Drop for Composition {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
pub(crate) fn live_groups() -> usize {
    COMPOSER.with(|c| c.borrow().groups.len())
}
