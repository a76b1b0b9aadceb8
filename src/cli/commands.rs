//! CLI command implementations
//!
//! Every command loads the config file first. `validate`, `insert` and `query`
//! then open the data directory in a fixed order:
//!
//! 1. Load schema declarations from the schema directory
//! 2. Open the record file, verifying every checksum
//!
//! Any failure before step 2 completes is fatal and nothing is written to
//! stdout.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::{Catalog, IngestError};
use crate::observability::{log_event, Event, Logger, ObservationScope};
use crate::schema::{builtin, SchemaRegistry};
use crate::store::FileStore;

use super::args::{Cli, Command, QueryShape};
use super::config::Config;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{document_lines, read_document, write_error, write_rejection, write_response};

/// Entry point for the `inspectdb` binary.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_command(cli.command, stdin.lock(), &mut stdout.lock())
}

pub fn run_command<R: BufRead, W: Write>(command: Command, input: R, out: &mut W) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config, out),
        Command::Validate { config, collection } => validate(&config, &collection, input, out),
        Command::Insert { config, collection } => insert(&config, &collection, input, out),
        Command::Query { config, shape } => query(&config, &shape, out),
    }
}

/// Creates the data and schema directories and writes the built-in schemas.
pub fn init<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = load_config(config_path)?;
    let schema_dir = config.schema_path();

    if config.data_path().join("data").exists() || schema_dir.exists() {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(config.data_path())?;

    let mut collections = Vec::new();
    for schema in builtin::all() {
        SchemaRegistry::save(&schema, &schema_dir)
            .map_err(|e| CliError::io_error(e.to_string()))?;
        collections.push(schema.collection);
    }

    let count = collections.len().to_string();
    let schema_dir_str = schema_dir.display().to_string();
    log_event(
        Event::SchemasWritten,
        &[("count", count.as_str()), ("schema_dir", schema_dir_str.as_str())],
    );

    let store = FileStore::open(config.data_path())?;
    let store_path = store.path().display().to_string();
    log_event(Event::StoreOpened, &[("path", store_path.as_str())]);

    write_response(
        out,
        json!({
            "initialized": true,
            "data_dir": config.data_dir,
            "schema_dir": schema_dir_str,
            "collections": collections
        }),
    )
}

/// Validates the single document on `input` without storing it.
///
/// A rejected document is an error response, not a CLI failure.
pub fn validate<R: BufRead, W: Write>(
    config_path: &Path,
    collection: &str,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let catalog = open_catalog(&config)?;
    let document = read_document(input)?;

    match catalog.validate(collection, &document) {
        Ok(()) => write_response(out, json!({"valid": true})),
        Err(e) => write_ingest_error(out, &e),
    }
}

/// Inserts one document per input line, answering each line in order.
///
/// Rejections and malformed lines are reported and skipped; a fatal store
/// error stops the batch.
pub fn insert<R: BufRead, W: Write>(
    config_path: &Path,
    collection: &str,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let catalog = open_catalog(&config)?;

    let scope = ObservationScope::with_fields("INSERT_BATCH", &[("collection", collection)]);
    let mut inserted = 0usize;
    let mut rejected = 0usize;

    for (index, line) in document_lines(input).enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                scope.fail(e.message());
                return Err(e);
            }
        };

        let document: Value = match serde_json::from_str(&line) {
            Ok(document) => document,
            Err(e) => {
                rejected += 1;
                write_error(
                    out,
                    CliErrorCode::InvalidJson.code(),
                    &format!("document {}: {}", index + 1, e),
                )?;
                continue;
            }
        };

        match catalog.insert(collection, document) {
            Ok(id) => {
                inserted += 1;
                write_response(out, json!({"_id": id.as_str()}))?;
            }
            Err(e) if e.is_fatal() => {
                write_ingest_error(out, &e)?;
                scope.fail_fatal(&e.to_string());
                return Err(e.into());
            }
            Err(e) => {
                rejected += 1;
                write_ingest_error(out, &e)?;
            }
        }
    }

    let inserted = inserted.to_string();
    let rejected = rejected.to_string();
    scope.complete_with_fields(&[
        ("inserted", inserted.as_str()),
        ("rejected", rejected.as_str()),
    ]);
    Ok(())
}

/// Runs one query and prints its rows as the response `data`.
pub fn query<W: Write>(config_path: &Path, shape: &QueryShape, out: &mut W) -> CliResult<()> {
    let config = load_config(config_path)?;
    let catalog = open_catalog(&config)?;
    let runner = catalog.runner();

    let rows = match shape {
        QueryShape::ByFoodType { food_type } => runner.find_by_food_type(food_type).map(to_json),
        QueryShape::Violations => runner.find_violations_sorted_by_date_desc().map(to_json),
        QueryShape::HighRated { min } => runner
            .find_high_rated(min.unwrap_or(config.high_rating_threshold))
            .map(to_json),
        QueryShape::AverageRating => runner.average_rating_by_food_type().map(to_json),
        QueryShape::ResultDistribution => runner.inspection_result_distribution().map(to_json),
        QueryShape::History => runner.restaurants_with_inspection_history().map(to_json),
    };

    match rows {
        Ok(data) => write_response(out, data?),
        Err(e) => {
            write_error(out, e.code(), &e.to_string())?;
            Err(e.into())
        }
    }
}

/// True when both the record directory and the schema directory exist.
pub fn is_initialized(config: &Config) -> bool {
    config.data_path().join("data").exists() && config.schema_path().exists()
}

fn load_config(path: &Path) -> CliResult<Config> {
    let config = Config::load(path)?;
    Logger::set_min_severity(config.min_severity()?);

    let path = path.display().to_string();
    log_event(
        Event::ConfigLoaded,
        &[("data_dir", config.data_dir.as_str()), ("path", path.as_str())],
    );
    Ok(config)
}

fn open_catalog(config: &Config) -> CliResult<Catalog<FileStore>> {
    if !is_initialized(config) {
        return Err(CliError::not_initialized());
    }

    let schema_dir = config.schema_path();
    let mut registry = SchemaRegistry::new();
    let count = registry.load_dir(&schema_dir)?.to_string();
    let schema_dir = schema_dir.display().to_string();
    log_event(
        Event::SchemasLoaded,
        &[("count", count.as_str()), ("schema_dir", schema_dir.as_str())],
    );

    let store = match FileStore::open(config.data_path()) {
        Ok(store) => store,
        Err(e) => {
            if e.is_fatal() {
                log_event(
                    Event::DataCorruption,
                    &[("code", e.code().code()), ("reason", e.message())],
                );
            }
            return Err(e.into());
        }
    };
    let store_path = store.path().display().to_string();
    log_event(Event::StoreOpened, &[("path", store_path.as_str())]);

    Ok(Catalog::new(registry, store))
}

fn to_json<T: Serialize>(rows: T) -> serde_json::Result<Value> {
    serde_json::to_value(rows)
}

fn write_ingest_error<W: Write>(out: &mut W, error: &IngestError) -> CliResult<()> {
    match error.violations() {
        Some(violations) => write_rejection(out, error.code(), &error.to_string(), violations),
        None => write_error(out, error.code(), &error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("inspectdb.json");
        let data_dir = temp_dir.path().join("data");

        let config = json!({
            "data_dir": data_dir.to_string_lossy(),
            "log_level": "error"
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn responses(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn initialized() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        init(&config_path, &mut Vec::new()).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    fn test_init_creates_directories_and_schemas() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let data_dir = temp_dir.path().join("data");

        let mut out = Vec::new();
        init(&config_path, &mut out).unwrap();

        assert!(data_dir.join("data").exists());
        assert!(data_dir.join("schemas").join("restaurants.json").exists());
        assert!(data_dir.join("schemas").join("inspections.json").exists());

        let response = &responses(out)[0];
        assert_eq!(response["status"], "ok");
        assert_eq!(response["data"]["initialized"], true);
    }

    #[test]
    fn test_init_refuses_reinit() {
        let (_temp_dir, config_path) = initialized();

        let result = init(&config_path, &mut Vec::new());
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_query_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let mut out = Vec::new();
        let result = query(&config_path, &QueryShape::History, &mut out);
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::NotInitialized);
        assert!(out.is_empty());
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let (_temp_dir, config_path) = initialized();

        let mut out = Vec::new();
        validate(
            &config_path,
            "restaurants",
            Cursor::new(r#"{"name": "No Address", "rating": 9}"#),
            &mut out,
        )
        .unwrap();

        let response = &responses(out)[0];
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "INSPECTDB_SCHEMA_VALIDATION_FAILED");
        let fields: Vec<&str> = response["violations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"address"));
        assert!(fields.contains(&"type_of_food"));
        assert!(fields.contains(&"rating"));
    }

    #[test]
    fn test_validate_accepts_valid_document() {
        let (_temp_dir, config_path) = initialized();

        let mut out = Vec::new();
        validate(
            &config_path,
            "inspections",
            Cursor::new(
                r#"{"restaurant_id": {"$oid": "65a4f0c2e4b0a1b2c3d4e5f6"}, "date": {"$date": "2024-01-15T10:00:00Z"}, "result": "Pass"}"#,
            ),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            responses(out),
            vec![json!({"status": "ok", "data": {"valid": true}})]
        );
    }

    #[test]
    fn test_insert_answers_every_line() {
        let (_temp_dir, config_path) = initialized();

        let input = concat!(
            r#"{"name": "Golden Dragon", "address": {"street": "1 High St", "city": "York", "postcode": "YO1 7HH"}, "rating": 5, "type_of_food": "Chinese"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"name": "Bad Rating", "address": {"street": "2 High St", "city": "York", "postcode": "YO1 7HJ"}, "rating": 0, "type_of_food": "Thai"}"#,
            "\n",
        );

        let mut out = Vec::new();
        insert(&config_path, "restaurants", Cursor::new(input), &mut out).unwrap();

        let responses = responses(out);
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["status"], "ok");
        assert_eq!(responses[0]["data"]["_id"].as_str().unwrap().len(), 24);
        assert_eq!(responses[1]["code"], "INSPECTDB_CLI_INVALID_JSON");
        assert_eq!(responses[2]["code"], "INSPECTDB_SCHEMA_VALIDATION_FAILED");
    }

    #[test]
    fn test_insert_then_query_round_trip() {
        let (_temp_dir, config_path) = initialized();

        let input = concat!(
            r#"{"name": "A", "address": {"street": "s", "city": "c", "postcode": "p"}, "rating": 5, "type_of_food": "Chinese"}"#,
            "\n",
            r#"{"name": "B", "address": {"street": "s", "city": "c", "postcode": "p"}, "rating": 4, "type_of_food": "Chinese"}"#,
            "\n",
            r#"{"name": "C", "address": {"street": "s", "city": "c", "postcode": "p"}, "rating": 3, "type_of_food": "chinese"}"#,
            "\n",
        );
        insert(&config_path, "restaurants", Cursor::new(input), &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        query(
            &config_path,
            &QueryShape::ByFoodType {
                food_type: "Chinese".to_string(),
            },
            &mut out,
        )
        .unwrap();
        let names: Vec<String> = responses(out)[0]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["A", "B"]);

        // Default threshold from config is 4, so only the 5 qualifies
        let mut out = Vec::new();
        query(&config_path, &QueryShape::HighRated { min: None }, &mut out).unwrap();
        assert_eq!(responses(out)[0]["data"].as_array().unwrap().len(), 1);

        let mut out = Vec::new();
        query(&config_path, &QueryShape::HighRated { min: Some(2) }, &mut out).unwrap();
        assert_eq!(responses(out)[0]["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_query_on_empty_store_is_empty_array() {
        let (_temp_dir, config_path) = initialized();

        let mut out = Vec::new();
        query(&config_path, &QueryShape::ResultDistribution, &mut out).unwrap();
        assert_eq!(
            responses(out),
            vec![json!({"status": "ok", "data": []})]
        );
    }

    #[test]
    fn test_is_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let config = Config::load(&config_path).unwrap();

        assert!(!is_initialized(&config));
        init(&config_path, &mut Vec::new()).unwrap();
        assert!(is_initialized(&config));
    }
}
