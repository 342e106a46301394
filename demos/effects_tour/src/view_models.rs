//! View models publish their state on `watch` channels; the host and the
//! screens collect them with `collect_with_lifecycle`.

use ripple_core::UiState;
use tokio::sync::watch;

use crate::destination::Destination;

pub type MainUiState = UiState<(), String>;

/// State behind the host shell.
#[derive(Debug)]
pub struct MainViewModel {
    ui_state: watch::Sender<MainUiState>,
    navigate: watch::Sender<Option<Destination>>,
}

impl Default for MainViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MainViewModel {
    /// Starts in `Loading`, then publishes `Success` and `Error` right away.
    /// Collectors that join later only see the last one.
    pub fn new() -> Self {
        let (ui_state, _) = watch::channel(MainUiState::Loading);
        let (navigate, _) = watch::channel(None);
        ui_state.send_replace(UiState::Success(()));
        ui_state.send_replace(UiState::Error(String::new()));
        Self { ui_state, navigate }
    }

    pub fn ui_state(&self) -> watch::Receiver<MainUiState> {
        self.ui_state.subscribe()
    }

    pub fn navigate(&self) -> watch::Receiver<Option<Destination>> {
        self.navigate.subscribe()
    }

    pub fn navigate_to(&self, destination: Destination) {
        log::debug!("navigate request: {destination:?}");
        self.navigate.send_replace(Some(destination));
    }
}

pub type SideEffectsUiState = Option<UiState<(), ()>>;

/// State behind the home screen.
#[derive(Debug)]
pub struct SideEffectsViewModel {
    ui_state: watch::Sender<SideEffectsUiState>,
}

impl Default for SideEffectsViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SideEffectsViewModel {
    pub fn new() -> Self {
        let (ui_state, _) = watch::channel(None);
        ui_state.send_replace(Some(UiState::Success(())));
        Self { ui_state }
    }

    pub fn ui_state(&self) -> watch::Receiver<SideEffectsUiState> {
        self.ui_state.subscribe()
    }
}
