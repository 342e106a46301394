//! Where the screens report to: log lines and toasts.

use std::cell::RefCell;
use std::rc::Rc;

use ripple_core::Color;

/// `<font color='#RRGGBB'>text</font>`
pub fn toast_markup(text: &str, color: Color) -> String {
    format!("<font color='#{}'>{text}</font>", color.to_hex_rgb())
}

/// Fire-and-forget reporting surface.
pub trait Sink {
    fn log(&self, screen: &str, message: &str);
    fn toast(&self, text: &str, color: Color);
}

/// Writes everything through `log` with target `effects_tour`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl Sink for LogSink {
    fn log(&self, screen: &str, message: &str) {
        log::info!(target: "effects_tour", "[{screen}] {message}");
    }

    fn toast(&self, text: &str, color: Color) {
        log::info!(target: "effects_tour", "toast {}", toast_markup(text, color));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Log { screen: String, message: String },
    Toast(String),
}

/// Keeps every event in order. Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Messages logged by `screen`, in order.
    pub fn logs(&self, screen: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Log { screen: s, message } if s == screen => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Toast markup, in order.
    pub fn toasts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Toast(markup) => Some(markup.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Sink for RecordingSink {
    fn log(&self, screen: &str, message: &str) {
        self.events.borrow_mut().push(Event::Log {
            screen: screen.to_string(),
            message: message.to_string(),
        });
    }

    fn toast(&self, text: &str, color: Color) {
        self.events
            .borrow_mut()
            .push(Event::Toast(toast_markup(text, color)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_uses_six_digit_hex() {
        assert_eq!(
            toast_markup("Counter finished!!", Color::GREEN),
            "<font color='#00FF00'>Counter finished!!</font>"
        );
        assert_eq!(
            toast_markup("x", Color::from_hex("#12ab34cc")),
            "<font color='#12AB34'>x</font>"
        );
    }

    #[test]
    fn recording_sink_filters_by_screen() {
        let sink = RecordingSink::new();
        let shared = sink.clone();
        shared.log("A", "one");
        shared.log("B", "two");
        shared.toast("hi", Color::RED);
        sink.log("A", "three");

        assert_eq!(sink.logs("A"), ["one", "three"]);
        assert_eq!(sink.toasts(), ["<font color='#FF0000'>hi</font>"]);
        assert_eq!(sink.events().len(), 4);
        sink.clear();
        assert!(shared.events().is_empty());
    }
}
