//! JSON I/O handling for CLI
//!
//! - Input: JSON documents on stdin, UTF-8
//! - Output: one JSON response object per line on stdout
//!
//! Responses are `{"status":"ok","data":...}` or
//! `{"status":"error","code":...,"message":...}`; rejections additionally
//! carry a `violations` array.

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::schema::{ValidationError, ValidationErrors};

use super::errors::{CliError, CliResult};

/// Reads all of `input` as a single JSON document.
pub fn read_document<R: BufRead>(mut input: R) -> CliResult<Value> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    serde_json::from_str(&content).map_err(|e| CliError::invalid_json(e.to_string()))
}

/// Non-blank lines of `input`, each expected to hold one document.
pub fn document_lines<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| line.map_err(CliError::from))
}

pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_json(
        out,
        &json!({
            "status": "ok",
            "data": data
        }),
    )
}

pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_json(
        out,
        &json!({
            "status": "error",
            "code": code,
            "message": message
        }),
    )
}

/// Error response listing every violation of a rejected document.
pub fn write_rejection<W: Write>(
    out: &mut W,
    code: &str,
    message: &str,
    violations: &ValidationErrors,
) -> CliResult<()> {
    let violations: Vec<Value> = violations.iter().map(violation_to_json).collect();
    write_json(
        out,
        &json!({
            "status": "error",
            "code": code,
            "message": message,
            "violations": violations
        }),
    )
}

fn violation_to_json(violation: &ValidationError) -> Value {
    match violation {
        ValidationError::MissingField { field } => json!({
            "field": field,
            "constraint": "required"
        }),
        ValidationError::TypeOrRangeViolation {
            field,
            constraint,
            expected,
            actual,
        } => json!({
            "field": field,
            "constraint": constraint.keyword(),
            "expected": expected,
            "actual": actual
        }),
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
