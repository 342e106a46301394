use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("`{0}` called outside of a composition")]
    OutsideComposition(&'static str),
    #[error("composition has been disposed")]
    Disposed,
    #[error("coroutine scope is cancelled")]
    ScopeCancelled,
}
