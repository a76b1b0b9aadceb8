//! Observability: structured logging and lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use inspectdb::observability::{log_event, Event, Logger, ObservationScope};
//!
//! log_event(Event::StoreOpened, &[("data_dir", "/var/lib/inspectdb")]);
//!
//! let scope = ObservationScope::new("AVERAGE_RATING_BY_FOOD_TYPE");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a typed event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
        log_event(Event::GroupRowSkipped, &[("key", "null")]);
    }
}
