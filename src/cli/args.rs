//! CLI argument definitions using clap
//!
//! Commands:
//! - inspectdb init --config <path>
//! - inspectdb validate --config <path> --collection <name>
//! - inspectdb insert --config <path> --collection <name>
//! - inspectdb query --config <path> <shape>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// inspectdb - restaurant inspection records with schema-checked ingestion
#[derive(Parser, Debug)]
#[command(name = "inspectdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and write the built-in schemas
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./inspectdb.json")]
        config: PathBuf,
    },

    /// Validate one JSON document read from stdin
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./inspectdb.json")]
        config: PathBuf,

        /// Target collection
        #[arg(long)]
        collection: String,
    },

    /// Validate and store JSON documents, one per stdin line
    Insert {
        /// Path to configuration file
        #[arg(long, default_value = "./inspectdb.json")]
        config: PathBuf,

        /// Target collection
        #[arg(long)]
        collection: String,
    },

    /// Run one of the predefined queries
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./inspectdb.json")]
        config: PathBuf,

        #[command(subcommand)]
        shape: QueryShape,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum QueryShape {
    /// Restaurants serving exactly this type of food
    ByFoodType {
        #[arg(long)]
        food_type: String,
    },

    /// "Violation Issued" inspections, newest first
    Violations,

    /// Restaurants rated strictly above a threshold
    HighRated {
        /// Defaults to `high_rating_threshold` from the config file
        #[arg(long)]
        min: Option<i32>,
    },

    /// Average rating per type of food, highest first
    AverageRating,

    /// Count and percentage of each inspection result
    ResultDistribution,

    /// Every restaurant with its inspections
    History,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_shape_parsing() {
        let cli = Cli::try_parse_from([
            "inspectdb",
            "query",
            "--config",
            "/tmp/c.json",
            "by-food-type",
            "--food-type",
            "Chinese",
        ])
        .unwrap();

        match cli.command {
            Command::Query { config, shape } => {
                assert_eq!(config, PathBuf::from("/tmp/c.json"));
                assert_eq!(
                    shape,
                    QueryShape::ByFoodType {
                        food_type: "Chinese".to_string()
                    }
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_high_rated_min_is_optional() {
        let cli = Cli::try_parse_from(["inspectdb", "query", "high-rated"]).unwrap();
        match cli.command {
            Command::Query { config, shape } => {
                assert_eq!(config, PathBuf::from("./inspectdb.json"));
                assert_eq!(shape, QueryShape::HighRated { min: None });
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_insert_requires_collection() {
        assert!(Cli::try_parse_from(["inspectdb", "insert"]).is_err());
    }
}
