//! A headless tour of Ripple's effect handlers and side-effect states.
//!
//! One screen per primitive, each reporting what happens through a [`Sink`]:
//! log lines prefixed with the screen name, and toasts. The [`Host`] plays
//! the part of the platform shell: lifecycle, back stack and frame loop.

pub mod config;
pub mod destination;
pub mod host;
pub mod screens;
pub mod sink;
pub mod view_models;

pub use config::{ConfigError, TourConfig};
pub use destination::Destination;
pub use host::Host;
pub use screens::ScreenContext;
pub use sink::{Event, LogSink, RecordingSink, Sink, toast_markup};
pub use view_models::{MainViewModel, SideEffectsViewModel};
