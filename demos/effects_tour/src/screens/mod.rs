//! One screen per effect handler. Every screen gets a [`ScreenContext`]
//! carrying its name, the sink and the host's shared services.

use std::rc::Rc;
use std::time::Duration;

use ripple_core::prelude::*;
use ripple_navigation::{EntryScope, Navigator};
use ripple_ui::*;

use crate::config::TourConfig;
use crate::destination::Destination;
use crate::sink::Sink;

pub mod coroutine_scope;
pub mod derived_state;
pub mod disposable_effect;
pub mod home;
pub mod launched_effect;
pub mod practicals;
pub mod produce_state;
pub mod side_effect;
pub mod snapshot_flow;
pub mod updated_state;

/// Host services shared by every screen.
pub struct Services {
    pub sink: Rc<dyn Sink>,
    pub config: Rc<TourConfig>,
    pub lifecycle: Lifecycle,
    /// Lives until the host stops; toasts are scheduled here.
    pub lifecycle_scope: CoroutineScope,
}

#[derive(Clone)]
pub struct ScreenContext {
    destination: Destination,
    navigator: Navigator<Destination>,
    services: Rc<Services>,
}

impl ScreenContext {
    pub fn new(destination: Destination, navigator: Navigator<Destination>, services: Rc<Services>) -> Self {
        Self {
            destination,
            navigator,
            services,
        }
    }

    pub fn for_entry(entry: &EntryScope<Destination>, services: Rc<Services>) -> Self {
        Self::new(*entry.key(), entry.navigator(), services)
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn name(&self) -> &'static str {
        self.destination.title()
    }

    pub fn config(&self) -> &TourConfig {
        &self.services.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.services.lifecycle.clone()
    }

    pub fn log(&self, message: impl AsRef<str>) {
        self.services.sink.log(self.name(), message.as_ref());
    }

    /// Logs the screen name the first time the screen composes.
    pub fn log_created(&self) {
        remember(|| self.log(self.name()));
    }

    /// Shows `text` after `delay`, on the host's lifecycle scope.
    pub fn toast(&self, text: impl Into<String>, color: Color, delay: Duration) {
        let text = text.into();
        let sink = self.services.sink.clone();
        self.services.lifecycle_scope.launch(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            sink.toast(&text, color);
        });
    }

    pub fn navigate_to(&self, destination: Destination) {
        self.navigator.push(destination);
    }

    /// Click handler navigating to `destination`.
    pub fn go(&self, destination: Destination) -> impl Fn() + 'static {
        let navigator = self.navigator.clone();
        move || navigator.push(destination)
    }
}

pub fn render(ctx: &ScreenContext) -> View {
    match ctx.destination() {
        Destination::Home => home::screen(ctx),
        Destination::Practicals => practicals::screen(ctx),
        Destination::SideEffect => side_effect::screen(ctx),
        Destination::LaunchedEffect => launched_effect::screen(ctx),
        Destination::DisposableEffect => disposable_effect::screen(ctx),
        Destination::ProduceState => produce_state::screen(ctx),
        Destination::DerivedStateOf => derived_state::screen(ctx),
        Destination::SnapshotFlow => snapshot_flow::screen(ctx),
        Destination::RememberCoroutineScope => coroutine_scope::screen(ctx),
        Destination::RememberUpdatedState => updated_state::screen(ctx),
    }
}

pub(crate) fn toggle(flag: &Signal<bool>) -> impl Fn() + 'static {
    let flag = flag.clone();
    move || flag.update(|v| *v = !*v)
}

/// Body of a practical screen below its controls.
pub(crate) type Counter = fn(&ScreenContext, bool, i32) -> View;

/// The controls shared by the practical screens:
/// - an optional button flipping the effect key,
/// - "Recompose", which bumps the state passed to the counter by 123,
/// - "Compose Again", which flips the key of the counter's group so it is
///   composed from scratch,
/// - "Remove Compose" / "Add Compose", which takes the counter in and out of
///   the composition.
pub(crate) fn practice_screen(ctx: &ScreenContext, key_button: Option<&str>, counter: Counter) -> View {
    ctx.log_created();

    let effect_key = remember(|| signal(true));
    let recompose = remember(|| signal(1001));
    let compose_again = remember(|| signal(false));
    let show_compose = remember(|| signal(true));

    let mut controls = vec![Text(ctx.name())];
    if let Some(label) = key_button {
        controls.push(Button(label, toggle(&effect_key)));
    }
    controls.push(Button("Recompose", {
        let recompose = (*recompose).clone();
        move || recompose.update(|v| *v += 123)
    }));
    controls.push(Button("Compose Again", toggle(&compose_again)));
    controls.push(Button(
        format!("{} Compose", if show_compose.get() { "Remove" } else { "Add" }),
        toggle(&show_compose),
    ));

    let content = show_compose.get().then(|| {
        let ctx = ctx.clone();
        let effect_key = effect_key.get();
        let state = recompose.get();
        key(compose_again.get(), move || counter(&ctx, effect_key, state))
    });

    Column(Modifier::new().fill_max_size().center_children()).child((controls, content))
}
