//! Capturing what a scenario logs.
//!
//! Scenarios log through a [`Console`], which emits `tracing` events on the
//! [`SCENARIO_TARGET`] target. While an adapter is being exercised the runner
//! calls [`redirect`], which makes a capturing subscriber the default for the
//! current thread:
//!
//! ```text
//!   Console::log ──▶ tracing event ──▶ CaptureLayer ──▶ OutputCapture buffer
//!                                  └──▶ fmt layer (stderr, when echoing)
//! ```
//!
//! Dropping the returned [`CaptureGuard`] puts the previous subscriber back.
//! Because it is a guard, restoration happens on every exit path, including
//! unwinding out of a panicking scenario.
//!
//! # Formatting
//!
//! Error events are prefixed with `ERROR: ` and warnings with `WARN: `.
//! Arguments are rendered by [`render_arg`]: strings verbatim, anything else
//! as JSON.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{fmt as fmt_layer, Layer};

/// Target of every event a scenario emits through [`Console`].
pub const SCENARIO_TARGET: &str = "scenario";

/// Ordered buffer of captured lines.
#[derive(Clone, Default)]
pub struct OutputCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// All lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines.lock().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer { sink: self.clone() }
    }
}

impl fmt::Debug for OutputCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputCapture")
            .field("lines", &self.len())
            .finish()
    }
}

/// `tracing` layer that appends scenario events to an [`OutputCapture`].
pub struct CaptureLayer {
    sink: OutputCapture,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != SCENARIO_TARGET {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let level = *metadata.level();
        let line = if level == Level::ERROR {
            format!("ERROR: {}", visitor.message)
        } else if level == Level::WARN {
            format!("WARN: {}", visitor.message)
        } else {
            visitor.message
        };
        self.sink.push(line);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// Restores the previous default subscriber when dropped.
#[must_use = "output is only captured while the guard is alive"]
pub struct CaptureGuard {
    _default: DefaultGuard,
}

/// Route scenario output into `capture` until the guard is dropped.
///
/// With `echo` set, scenario lines are also written to stderr as they
/// happen. Other events are dropped while the guard is alive.
pub fn redirect(capture: &OutputCapture, echo: bool) -> CaptureGuard {
    let echo_layer = echo.then(|| {
        fmt_layer::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(filter_fn(|metadata| metadata.target() == SCENARIO_TARGET))
    });

    let subscriber = tracing_subscriber::registry()
        .with(capture.layer())
        .with(echo_layer);

    CaptureGuard {
        _default: tracing::subscriber::set_default(subscriber),
    }
}

// ----------------------------------------------------------------------------
// Console
// ----------------------------------------------------------------------------

/// The logging function handed to scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

impl Console {
    pub fn log(&self, message: impl fmt::Display) {
        tracing::info!(target: SCENARIO_TARGET, "{message}");
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(target: SCENARIO_TARGET, "{message}");
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(target: SCENARIO_TARGET, "{message}");
    }
}

/// Render one logged argument: strings as-is, other values as JSON.
pub fn render_arg<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(other) => other.to_string(),
        Err(err) => format!("<unserializable: {err}>"),
    }
}

/// Log several values separated by spaces.
///
/// ```rust,ignore
/// console_log!(cx.console(), "Count:", count.get());
/// ```
#[macro_export]
macro_rules! console_log {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $console.log([$($crate::harness::render_arg(&$arg)),+].join(" "))
    };
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
