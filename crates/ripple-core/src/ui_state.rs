/// Result wrapper published by view models.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UiState<T, E> {
    #[default]
    Loading,
    Success(T),
    Error(E),
}

impl<T, E> UiState<T, E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UiState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, UiState::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            UiState::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            UiState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UiState<U, E> {
        match self {
            UiState::Loading => UiState::Loading,
            UiState::Success(v) => UiState::Success(f(v)),
            UiState::Error(e) => UiState::Error(e),
        }
    }
}
