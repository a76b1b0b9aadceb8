//! Schema registry with file loading
//!
//! - Schemas are stored at `<schema_dir>/<collection>.json`
//! - One `$jsonSchema` declaration per file, the file stem names the collection
//! - A collection's schema cannot be replaced once registered
//! - Malformed schema files are FATAL at load time

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::builtin;
use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// In-memory registry of collection schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Creates a registry holding the `restaurants` and `inspections` schemas.
    pub fn with_builtins() -> Self {
        let mut schemas = HashMap::new();
        for schema in builtin::all() {
            schemas.insert(schema.collection.clone(), schema);
        }
        Self { schemas }
    }

    /// Loads every `*.json` schema file in `dir`.
    ///
    /// Returns the number of schemas loaded.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_schema(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }

        // Directory order is platform dependent.
        paths.sort();

        for path in &paths {
            let schema = Self::load_file(path)?;
            self.register(schema)?;
        }

        Ok(paths.len())
    }

    /// Loads a single schema file.
    pub fn load_file(path: &Path) -> SchemaResult<Schema> {
        let source = path.display().to_string();

        let collection = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SchemaError::malformed_schema(&source, "file name is not valid UTF-8"))?;

        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed_schema(&source, format!("Failed to read file: {}", e)))?;

        let declaration: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed_schema(&source, format!("Invalid JSON: {}", e)))?;

        Schema::from_json_schema(collection, &declaration)
    }

    /// Registers a schema.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        if self.schemas.contains_key(&schema.collection) {
            return Err(SchemaError::schema_immutable(&schema.collection));
        }
        self.schemas.insert(schema.collection.clone(), schema);
        Ok(())
    }

    /// Gets the schema guarding `collection`.
    pub fn get(&self, collection: &str) -> SchemaResult<&Schema> {
        self.schemas
            .get(collection)
            .ok_or_else(|| SchemaError::unknown_schema(collection))
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.schemas.contains_key(collection)
    }

    /// Returns registered collection names, sorted.
    pub fn collections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Writes a schema file into `dir`, refusing to overwrite.
    pub fn save(schema: &Schema, dir: &Path) -> SchemaResult<PathBuf> {
        let path = dir.join(format!("{}.json", schema.collection));

        if path.exists() {
            return Err(SchemaError::schema_immutable(&schema.collection));
        }

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                SchemaError::malformed_schema(
                    dir.display().to_string(),
                    format!("Failed to create schema directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&schema.to_json_schema()).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}
