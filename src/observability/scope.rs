//! ObservationScope for begin/complete logging around an operation
//!
//! - `{name}_BEGIN` on creation (INFO)
//! - `{name}_COMPLETE` on `complete*()` (INFO), with `elapsed_ms`
//! - `{name}_FAILED` on `fail()` (ERROR) or `fail_fatal()` (FATAL)
//! - `{name}_INCOMPLETE` on drop without either (WARN)

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// Logs the lifecycle of one named operation.
///
/// ```ignore
/// let scope = ObservationScope::with_fields("FIND_BY_FOOD_TYPE", &[("food_type", "Chinese")]);
/// let docs = store.find(...)?;
/// scope.complete_with_fields(&[("rows", docs.len().to_string().as_str())]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    /// Logs `{name}_BEGIN` immediately.
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Like `new`; `fields` are repeated on every line the scope logs.
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed_ms();

        let mut all_fields = self.field_refs();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("elapsed_ms", elapsed.as_str()));

        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Logs `{name}_FAILED` at ERROR level.
    pub fn fail(self, reason: &str) {
        self.completed.set(true);
        let mut all_fields = self.field_refs();
        all_fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &all_fields);
    }

    /// Logs `{name}_FAILED` at FATAL level.
    pub fn fail_fatal(self, reason: &str) {
        self.completed.set(true);
        let mut all_fields = self.field_refs();
        all_fields.push(("reason", reason));
        Logger::fatal(&format!("{}_FAILED", self.name), &all_fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer for `elapsed_ms` fields
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_starts_incomplete() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.is_completed());
        scope.complete();
    }

    #[test]
    fn test_scope_with_fields_and_extra() {
        let scope = ObservationScope::with_fields("TEST", &[("collection", "restaurants")]);
        scope.complete_with_fields(&[("rows", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("TEST");
        scope.fail("store unavailable");
    }

    #[test]
    fn test_scope_fail_fatal() {
        let scope = ObservationScope::new("TEST");
        scope.fail_fatal("checksum mismatch");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 10);
    }
}
