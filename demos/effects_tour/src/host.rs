//! Host shell: owns the lifecycle, the back stack and the composition, and
//! drives frames.
//!
//! Everything here must run inside a `tokio::task::LocalSet`.

use std::rc::Rc;
use std::time::Duration;

use ripple_core::prelude::*;
use ripple_navigation::{EntryScope, NavDisplay, Navigator, renderer};
use ripple_ui::{Surface, layout};
use tokio::time::Instant;

use crate::config::TourConfig;
use crate::destination::Destination;
use crate::screens::{self, ScreenContext, Services};
use crate::sink::Sink;
use crate::view_models::MainViewModel;

const SCREEN: &str = "Main Activity";

pub struct Host {
    services: Rc<Services>,
    navigator: Navigator<Destination>,
    view_model: MainViewModel,
    composition: Composition,
    last_frame: Option<Frame>,
}

impl Host {
    pub fn new(config: TourConfig, sink: Rc<dyn Sink>) -> Self {
        let [width, height] = config.viewport;
        let services = Rc::new(Services {
            sink,
            config: Rc::new(config),
            lifecycle: Lifecycle::new(),
            lifecycle_scope: CoroutineScope::new(),
        });
        let navigator = Navigator::new(Destination::Home);

        let composition = Composition::new({
            let stack = navigator.stack.clone();
            let services = services.clone();
            move || {
                let services = services.clone();
                Surface(
                    Modifier::new().fill_max_size(),
                    NavDisplay(
                        &stack,
                        renderer(move |entry: &EntryScope<Destination>| {
                            screens::render(&ScreenContext::for_entry(entry, services.clone()))
                        }),
                    ),
                )
            }
        })
        .with_viewport(width, height);

        Self {
            services,
            navigator,
            view_model: MainViewModel::new(),
            composition,
            last_frame: None,
        }
    }

    pub fn navigator(&self) -> &Navigator<Destination> {
        &self.navigator
    }

    pub fn view_model(&self) -> &MainViewModel {
        &self.view_model
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.services.lifecycle.clone()
    }

    /// Moves the lifecycle to `Resumed` and starts collecting the view model.
    /// Navigation requests are applied once per distinct destination.
    pub fn start(&mut self) {
        let lifecycle = self.lifecycle();
        lifecycle.set_state(LifecycleState::Created);
        self.services.sink.log(SCREEN, SCREEN);

        let target: Signal<Option<Destination>> = signal(None);
        let navigator = self.navigator.clone();
        target.subscribe(move |destination| {
            if let Some(destination) = destination {
                navigator.push(*destination);
            }
        });

        let scope = &self.services.lifecycle_scope;
        scope.launch(collect_with_lifecycle(
            lifecycle.clone(),
            self.view_model.navigate(),
            move |destination| target.set(destination),
        ));
        scope.launch(collect_with_lifecycle(
            lifecycle.clone(),
            self.view_model.ui_state(),
            |state| match state {
                UiState::Loading => log::debug!("main ui state: loading"),
                UiState::Success(()) => log::debug!("main ui state: success"),
                UiState::Error(e) => log::debug!("main ui state: error {e:?}"),
            },
        ));

        lifecycle.set_state(LifecycleState::Started);
        lifecycle.set_state(LifecycleState::Resumed);
    }

    /// Back to `Created`: lifecycle-aware collection stops.
    pub fn pause(&self) {
        self.services.lifecycle.set_state(LifecycleState::Created);
    }

    pub fn resume(&self) {
        let lifecycle = &self.services.lifecycle;
        lifecycle.set_state(LifecycleState::Started);
        lifecycle.set_state(LifecycleState::Resumed);
    }

    /// Tears everything down: the composition leaves (cancelling every
    /// effect), then the lifecycle scope is cancelled.
    pub fn stop(&mut self) {
        self.composition.dispose();
        if self.services.lifecycle.state() != LifecycleState::Destroyed {
            self.services.lifecycle.set_state(LifecycleState::Destroyed);
        }
        self.services.lifecycle_scope.cancel();
        self.last_frame = None;
    }

    pub fn render(&mut self) -> Result<&Frame, RuntimeError> {
        let frame = self.composition.frame(layout)?;
        Ok(self.last_frame.insert(frame))
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Text of the last frame, rendering one first if needed.
    pub fn texts(&mut self) -> Result<Vec<String>, RuntimeError> {
        if self.last_frame.is_none() || self.composition.has_pending() {
            self.render()?;
        }
        Ok(self.last_frame.as_ref().map(Frame::texts).unwrap_or_default())
    }

    /// Clicks the enabled button labelled `label` on an up-to-date frame.
    /// Returns `false` when there is no such button.
    pub fn click(&mut self, label: &str) -> Result<bool, RuntimeError> {
        if self.last_frame.is_none() || self.composition.has_pending() {
            self.render()?;
        }
        let clicked = self.last_frame.as_ref().is_some_and(|f| f.click(label));
        if clicked {
            log::debug!("clicked {label:?}");
        } else {
            log::warn!("no enabled button labelled {label:?}");
        }
        Ok(clicked)
    }

    pub fn back(&self) -> bool {
        self.navigator.pop()
    }

    /// Renders a frame whenever some group is invalidated, until `duration`
    /// has passed. Jobs on the local set keep running in between.
    pub async fn run_for(&mut self, duration: Duration) -> Result<(), RuntimeError> {
        let deadline = Instant::now() + duration;
        if self.last_frame.is_none() || self.composition.has_pending() {
            self.render()?;
        }
        loop {
            tokio::select! {
                _ = frame_requested() => {
                    if self.composition.has_pending() {
                        self.render()?;
                    }
                }
                _ = tokio::time::sleep_until(deadline) => return Ok(()),
            }
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.stop();
    }
}
