//! Cancellable local jobs and detached work scopes.
//!
//! A [`Job`] owns its future. The tokio task that drives it holds only a weak
//! reference back, so cancelling (or dropping every handle of) a job drops the
//! future right away, at whatever suspension point it was parked on. Guards
//! held by the future (see [`crate::on_cancel`]) therefore run synchronously
//! inside [`Job::cancel`].
//!
//! Jobs are spawned with [`tokio::task::spawn_local`], so they must be
//! launched from inside a [`tokio::task::LocalSet`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use smallvec::SmallVec;
use tokio::task::JoinHandle;

use crate::error::RuntimeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Active,
    Completed,
    Cancelled,
}

struct JobInner {
    future: RefCell<Option<LocalBoxFuture<'static, ()>>>,
    state: Cell<JobState>,
    handle: RefCell<Option<JoinHandle<()>>>,
}

impl Drop for JobInner {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

/// Handle to a unit of cancellable background work. Dropping every handle
/// cancels the job.
#[derive(Clone)]
pub struct Job {
    inner: Rc<JobInner>,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("state", &self.state()).finish()
    }
}

impl Job {
    fn cancelled() -> Self {
        Self {
            inner: Rc::new(JobInner {
                future: RefCell::new(None),
                state: Cell::new(JobState::Cancelled),
                handle: RefCell::new(None),
            }),
        }
    }

    pub fn state(&self) -> JobState {
        self.inner.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.state() == JobState::Active
    }

    pub fn is_completed(&self) -> bool {
        self.state() == JobState::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == JobState::Cancelled
    }

    /// Cancels the job. The future is dropped before this returns, unless the
    /// job is cancelling itself from inside its own poll, in which case the
    /// driver drops it as soon as that poll returns.
    pub fn cancel(&self) {
        if self.state() != JobState::Active {
            return;
        }
        self.inner.state.set(JobState::Cancelled);
        let future = self.inner.future.borrow_mut().take();
        drop(future);
        if let Some(handle) = self.inner.handle.borrow_mut().take() {
            handle.abort();
        }
        log::trace!("job cancelled");
    }
}

struct Driver {
    job: Weak<JobInner>,
}

impl Future for Driver {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(job) = self.job.upgrade() else {
            return Poll::Ready(());
        };
        if job.state.get() != JobState::Active {
            return Poll::Ready(());
        }
        let taken = job.future.borrow_mut().take();
        let Some(mut future) = taken else {
            return Poll::Ready(());
        };
        match future.as_mut().poll(cx) {
            Poll::Ready(()) => {
                if job.state.get() == JobState::Active {
                    job.state.set(JobState::Completed);
                }
                job.handle.borrow_mut().take();
                Poll::Ready(())
            }
            Poll::Pending => {
                if job.state.get() == JobState::Active {
                    *job.future.borrow_mut() = Some(future);
                    Poll::Pending
                } else {
                    // cancelled from inside its own poll
                    drop(future);
                    Poll::Ready(())
                }
            }
        }
    }
}

/// Spawns `future` on the current `LocalSet` and returns its handle. The
/// first poll happens asynchronously, never inside this call.
pub fn launch(future: impl Future<Output = ()> + 'static) -> Job {
    let future: LocalBoxFuture<'static, ()> = Box::pin(future);
    let inner = Rc::new(JobInner {
        future: RefCell::new(Some(future)),
        state: Cell::new(JobState::Active),
        handle: RefCell::new(None),
    });
    let handle = tokio::task::spawn_local(Driver {
        job: Rc::downgrade(&inner),
    });
    *inner.handle.borrow_mut() = Some(handle);
    Job { inner }
}

struct ScopeInner {
    jobs: RefCell<SmallVec<[Job; 4]>>,
    cancelled: Cell<bool>,
}

/// Detached work scope.
///
/// Every [`CoroutineScope::launch`] starts an independent job that runs
/// concurrently with earlier ones; serializing them is up to the caller.
/// Cancelling the scope cancels all live jobs and refuses further launches.
#[derive(Clone)]
pub struct CoroutineScope {
    inner: Rc<ScopeInner>,
}

impl Default for CoroutineScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CoroutineScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoroutineScope")
            .field("active_jobs", &self.active_jobs())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CoroutineScope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                jobs: RefCell::new(SmallVec::new()),
                cancelled: Cell::new(false),
            }),
        }
    }

    pub fn try_launch(
        &self,
        future: impl Future<Output = ()> + 'static,
    ) -> Result<Job, RuntimeError> {
        if self.is_cancelled() {
            return Err(RuntimeError::ScopeCancelled);
        }
        let job = launch(future);
        let mut jobs = self.inner.jobs.borrow_mut();
        jobs.retain(|j| j.is_active());
        jobs.push(job.clone());
        Ok(job)
    }

    /// Launches on this scope. On a cancelled scope nothing runs: a warning is
    /// logged and an already cancelled job is returned.
    pub fn launch(&self, future: impl Future<Output = ()> + 'static) -> Job {
        match self.try_launch(future) {
            Ok(job) => job,
            Err(e) => {
                log::warn!("launch refused: {e}");
                Job::cancelled()
            }
        }
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.replace(true) {
            return;
        }
        let jobs = std::mem::take(&mut *self.inner.jobs.borrow_mut());
        log::debug!("cancelling coroutine scope with {} job(s)", jobs.len());
        for job in jobs {
            job.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    pub fn active_jobs(&self) -> usize {
        self.inner.jobs.borrow().iter().filter(|j| j.is_active()).count()
    }
}
