//! inspectdb - restaurant and inspection records with schema-checked ingestion
//!
//! Documents are validated against declarative `$jsonSchema` schemas before
//! they are stored, and read back through a fixed set of typed queries.

pub mod catalog;
pub mod cli;
pub mod model;
pub mod observability;
pub mod query;
pub mod runner;
pub mod schema;
pub mod store;
