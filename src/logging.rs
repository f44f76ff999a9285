//! Subscriber setup for container diagnostics
//!
//! Mapping writes, propagation and resolution emit `debug!`/`trace!` events
//! tagged with the `armature_inject` target and structured fields (the
//! service type, qualifier name, container depth). This module installs a
//! `tracing-subscriber` that renders those events. Rendering needs the
//! `logging-pretty` or `logging-json` feature; without either, every helper
//! degrades to a no-op so callers need no feature gates of their own.
//!
//! ```rust,ignore
//! armature_inject::logging::init();
//!
//! // narrow to container events only, at full verbosity
//! armature_inject::logging::TraceSetup::new()
//!     .verbose()
//!     .container_events_only()
//!     .install();
//! ```

use tracing::Level;

/// Target string the container tags every event with.
pub const EVENT_TARGET: &str = "armature_inject";

/// Rendering style for installed subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// Multi-line colored output for development
    Pretty,
    /// One JSON record per event, for log aggregation
    Json,
}

/// Subscriber configuration for container diagnostics.
///
/// The default style follows the compiled features: JSON when `logging-json`
/// is enabled, pretty otherwise. Propagation internals log at TRACE, so
/// [`verbose`](Self::verbose) is the switch for debugging inheritance issues.
#[derive(Debug, Clone)]
pub struct TraceSetup {
    level: Level,
    style: LogStyle,
    container_events_only: bool,
    source_locations: bool,
}

impl Default for TraceSetup {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            #[cfg(feature = "logging-json")]
            style: LogStyle::Json,
            #[cfg(not(feature = "logging-json"))]
            style: LogStyle::Pretty,
            container_events_only: false,
            source_locations: false,
        }
    }
}

impl TraceSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the level to TRACE, exposing per-child propagation events.
    pub fn verbose(mut self) -> Self {
        self.level = Level::TRACE;
        self
    }

    /// Set an explicit minimum level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.style = LogStyle::Pretty;
        self
    }

    pub fn json(mut self) -> Self {
        self.style = LogStyle::Json;
        self
    }

    /// Drop events from other crates, keeping only the container's own.
    pub fn container_events_only(mut self) -> Self {
        self.container_events_only = true;
        self
    }

    /// Annotate events with the emitting file and line.
    pub fn source_locations(mut self) -> Self {
        self.source_locations = true;
        self
    }

    /// The env-filter directive this setup installs.
    #[cfg(any(test, feature = "logging-json", feature = "logging-pretty"))]
    fn filter_directive(&self) -> String {
        if self.container_events_only {
            format!("{}={}", EVENT_TARGET, self.level)
        } else {
            self.level.to_string()
        }
    }

    /// Install a global subscriber rendering container events.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn install(self) {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::new(self.filter_directive());
        match self.style {
            LogStyle::Json => {
                #[cfg(feature = "logging-json")]
                {
                    let layer = fmt::layer()
                        .json()
                        .with_target(true)
                        .with_file(self.source_locations)
                        .with_line_number(self.source_locations);
                    tracing_subscriber::registry().with(filter).with(layer).init();
                }
                #[cfg(not(feature = "logging-json"))]
                {
                    // JSON rendering not compiled in; plain output instead
                    let layer = fmt::layer()
                        .with_target(true)
                        .with_file(self.source_locations)
                        .with_line_number(self.source_locations);
                    tracing_subscriber::registry().with(filter).with(layer).init();
                }
            }
            LogStyle::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(self.source_locations)
                    .with_line_number(self.source_locations);
                tracing_subscriber::registry().with(filter).with(layer).init();
            }
        }
    }

    /// No-op without a subscriber feature.
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn install(self) {}
}

/// Install a subscriber with the default setup.
pub fn init() {
    TraceSetup::new().install();
}

/// Install a pretty-rendering subscriber at DEBUG level.
pub fn init_pretty() {
    TraceSetup::new().pretty().install();
}

/// Install a JSON-rendering subscriber at DEBUG level.
pub fn init_json() {
    TraceSetup::new().json().install();
}
