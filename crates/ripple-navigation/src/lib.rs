#![allow(non_snake_case)]
//! Back stack navigation. Every entry owns a [`Scope`] that is disposed when
//! the entry leaves the stack.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use ripple_core::*;
use ripple_ui::Box as VBox;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub trait NavKey: Clone + Debug + 'static + Serialize + for<'de> Deserialize<'de> {}
impl<T> NavKey for T where T: Clone + Debug + 'static + Serialize + for<'de> Deserialize<'de> {}

#[derive(Debug, Error)]
pub enum NavError {
    #[error("malformed back stack: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("saved back stack is empty")]
    Empty,
}

struct Entry<K: NavKey> {
    id: u64,
    key: K,
    /// Disposed when the entry is popped.
    scope: Scope,
}

struct BackState<K: NavKey> {
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K: NavKey> BackState<K> {
    fn entry(&mut self, key: K) -> Entry<K> {
        let id = self.next_id;
        self.next_id += 1;
        Entry {
            id,
            key,
            scope: Scope::new(),
        }
    }
}

#[derive(Clone)]
pub struct NavBackStack<K: NavKey> {
    inner: Rc<RefCell<BackState<K>>>,
    version: Signal<u64>,
}

impl<K: NavKey> NavBackStack<K> {
    pub fn new(start: K) -> Self {
        let mut state = BackState {
            entries: Vec::new(),
            next_id: 1,
        };
        let first = state.entry(start);
        state.entries.push(first);
        Self {
            inner: Rc::new(RefCell::new(state)),
            version: signal(0),
        }
    }

    pub fn top(&self) -> Option<(u64, K, Scope)> {
        let s = self.inner.borrow();
        s.entries
            .last()
            .map(|e| (e.id, e.key.clone(), e.scope.clone()))
    }

    pub fn size(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.key.clone())
            .collect()
    }

    /// Tracked read of the stack's change counter.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    fn bump(&self) {
        self.version.update(|v| *v = v.wrapping_add(1));
    }

    fn push_inner(&self, key: K) {
        let mut s = self.inner.borrow_mut();
        let e = s.entry(key);
        s.entries.push(e);
    }

    /// Pop the top entry (if any) and dispose its scope.
    fn pop_inner(&self) -> bool {
        let entry = self.inner.borrow_mut().entries.pop();

        if let Some(e) = entry {
            log::debug!("nav: popped {:?}", e.key);
            e.scope.dispose();
            true
        } else {
            false
        }
    }

    fn replace_inner(&self, key: K) {
        let old = {
            let mut s = self.inner.borrow_mut();
            let e = s.entry(key);
            let old = s.entries.pop();
            s.entries.push(e);
            old
        };
        if let Some(old) = old {
            old.scope.dispose();
        }
    }

    pub fn to_json(&self) -> Result<String, NavError> {
        let s = self.inner.borrow();
        let keys: Vec<&K> = s.entries.iter().map(|e| &e.key).collect();
        Ok(serde_json::to_string(&keys)?)
    }

    /// Replaces the whole stack with the saved one. Existing entries are
    /// disposed; on error the stack is left untouched.
    pub fn from_json(&self, json: &str) -> Result<(), NavError> {
        let keys = serde_json::from_str::<Vec<K>>(json)?;
        if keys.is_empty() {
            return Err(NavError::Empty);
        }

        let old_entries = std::mem::take(&mut self.inner.borrow_mut().entries);
        for e in old_entries.into_iter().rev() {
            e.scope.dispose();
        }

        {
            let mut s = self.inner.borrow_mut();
            for k in keys {
                let e = s.entry(k);
                s.entries.push(e);
            }
        }
        self.bump();
        Ok(())
    }
}

#[derive(Clone)]
pub struct Navigator<K: NavKey> {
    pub stack: NavBackStack<K>,
}

impl<K: NavKey> Navigator<K> {
    pub fn new(start: K) -> Self {
        Self {
            stack: NavBackStack::new(start),
        }
    }

    pub fn current(&self) -> Option<K> {
        self.stack.top().map(|(_, k, _)| k)
    }

    pub fn push(&self, k: K) {
        log::debug!("nav: push {k:?}");
        self.stack.push_inner(k);
        self.stack.bump();
    }

    pub fn replace(&self, k: K) {
        self.stack.replace_inner(k);
        self.stack.bump();
    }

    pub fn pop(&self) -> bool {
        // Don't pop if only one entry is present
        if self.stack.size() <= 1 {
            return false;
        }
        let ok = self.stack.pop_inner();
        if ok {
            self.stack.bump();
        }
        ok
    }

    pub fn clear_and_push(&self, k: K) {
        while self.stack.pop_inner() {}
        self.stack.push_inner(k);
        self.stack.bump();
    }

    pub fn pop_to<F: Fn(&K) -> bool>(&self, pred: F, inclusive: bool) {
        let count = {
            let s = self.stack.inner.borrow();
            if let Some(idx) = s.entries.iter().rposition(|e| pred(&e.key)) {
                s.entries.len() - idx - (if inclusive { 0 } else { 1 })
            } else {
                0
            }
        };
        for _ in 0..count {
            let _ = self.stack.pop_inner();
        }
        if count > 0 {
            self.stack.bump();
        }
    }
}

/// What a destination's renderer gets to see of its entry.
pub struct EntryScope<K: NavKey> {
    id: u64,
    key: K,
    nav: Navigator<K>,
}

impl<K: NavKey> EntryScope<K> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn navigator(&self) -> Navigator<K> {
        self.nav.clone()
    }
}

pub type EntryRenderer<K> = Rc<dyn Fn(&EntryScope<K>) -> View>;

pub fn renderer<K: NavKey>(f: impl Fn(&EntryScope<K>) -> View + 'static) -> EntryRenderer<K> {
    Rc::new(f)
}

/// Renders the top entry in its own keyed group, so a screen that stops
/// being on top leaves the composition and its effects are cancelled.
pub fn NavDisplay<K: NavKey>(stack: &NavBackStack<K>, make_view: EntryRenderer<K>) -> View {
    let _v = stack.version(); // join reactive graph
    let Some((id, key_value, _)) = stack.top() else {
        return VBox(Modifier::new());
    };
    let nav = Navigator {
        stack: stack.clone(),
    };
    key(id, move || {
        let entry = EntryScope {
            id,
            key: key_value.clone(),
            nav: nav.clone(),
        };
        (make_view)(&entry)
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ripple_ui::{Text, layout};

    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    enum Screen {
        Home,
        Detail(u32),
    }

    #[test]
    fn pop_disposes_entry_scope() {
        let nav = Navigator::new(Screen::Home);
        nav.push(Screen::Detail(1));
        let (_, _, scope) = nav.stack.top().unwrap();
        let disposed = Rc::new(Cell::new(false));
        let d = disposed.clone();
        scope.add_disposer(move || d.set(true));

        assert!(nav.pop());
        assert!(disposed.get());
        assert!(!nav.pop());
        assert_eq!(nav.current(), Some(Screen::Home));
    }

    #[test]
    fn pop_to_and_clear() {
        let nav = Navigator::new(Screen::Home);
        for i in 1..=3 {
            nav.push(Screen::Detail(i));
        }
        nav.pop_to(|k| *k == Screen::Detail(1), false);
        assert_eq!(nav.stack.keys(), [Screen::Home, Screen::Detail(1)]);

        nav.pop_to(|k| *k == Screen::Detail(1), true);
        assert_eq!(nav.stack.keys(), [Screen::Home]);

        nav.push(Screen::Detail(9));
        nav.clear_and_push(Screen::Detail(5));
        assert_eq!(nav.stack.keys(), [Screen::Detail(5)]);

        nav.replace(Screen::Home);
        assert_eq!(nav.stack.keys(), [Screen::Home]);
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let nav = Navigator::new(Screen::Home);
        nav.push(Screen::Detail(2));
        nav.push(Screen::Detail(7));
        let saved = nav.stack.to_json().unwrap();

        let restored = Navigator::new(Screen::Detail(0));
        restored.stack.from_json(&saved).unwrap();
        assert_eq!(
            restored.stack.keys(),
            [Screen::Home, Screen::Detail(2), Screen::Detail(7)]
        );

        assert!(matches!(
            restored.stack.from_json("{not json"),
            Err(NavError::Malformed(_))
        ));
        assert!(matches!(restored.stack.from_json("[]"), Err(NavError::Empty)));
        assert_eq!(restored.stack.size(), 3);
    }

    #[test]
    fn display_swaps_screens_and_disposes_the_old_one() {
        let nav = Navigator::new(Screen::Home);
        let left = Rc::new(Cell::new(0));

        let mut comp = Composition::new({
            let stack = nav.stack.clone();
            let left = left.clone();
            move || {
                let left = left.clone();
                NavDisplay(
                    &stack,
                    renderer(move |entry: &EntryScope<Screen>| {
                        let l = left.clone();
                        disposable_effect((), move || on_unmount(move || l.set(l.get() + 1)));
                        Text(format!("{:?}", entry.key()))
                    }),
                )
            }
        });

        assert_eq!(comp.frame(layout).unwrap().texts(), ["Home"]);
        nav.push(Screen::Detail(3));
        assert!(comp.has_pending());
        assert_eq!(comp.frame(layout).unwrap().texts(), ["Detail(3)"]);
        assert_eq!(left.get(), 1);

        nav.pop();
        assert_eq!(comp.frame(layout).unwrap().texts(), ["Home"]);
        assert_eq!(left.get(), 2);
    }
}
