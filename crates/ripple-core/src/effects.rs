use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Cleanup handle returned by disposable effects.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// A dispose that does nothing.
    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl fmt::Debug for Dispose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispose")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Helper to register cleanup inside a disposable effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// Runs its callback when dropped, unless [`CancelGuard::complete`] was
/// called first.
///
/// Hold one inside an effect body: cancelling the body drops its future at
/// the current suspension point, which drops the guard.
#[must_use = "the callback runs when the guard is dropped"]
pub struct CancelGuard {
    on_cancel: Option<Box<dyn FnOnce()>>,
}

impl CancelGuard {
    /// Disarms the guard; the callback will not run.
    pub fn complete(mut self) {
        self.on_cancel = None;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(f) = self.on_cancel.take() {
            f();
        }
    }
}

pub fn on_cancel(f: impl FnOnce() + 'static) -> CancelGuard {
    CancelGuard {
        on_cancel: Some(Box::new(f)),
    }
}
