//! Built-in schemas for the `restaurants` and `inspections` collections
//!
//! Field names, types and the inspection result values are an interchange
//! contract with existing data and must not drift.

use serde_json::json;

use super::types::{FieldDef, ObjectShape, Schema};

pub const RESTAURANTS: &str = "restaurants";
pub const INSPECTIONS: &str = "inspections";

/// Allowed values of `inspections.result`
pub const INSPECTION_RESULTS: [&str; 3] = ["Pass", "Violation Issued", "Fail"];

/// Schema for `restaurants` documents.
pub fn restaurants() -> Schema {
    let address = ObjectShape::new()
        .required(
            "street",
            FieldDef::non_empty_string().with_description("Street must be a non-empty string"),
        )
        .required(
            "city",
            FieldDef::non_empty_string().with_description("City must be a non-empty string"),
        )
        .required(
            "postcode",
            FieldDef::non_empty_string().with_description("Postcode must be a non-empty string"),
        );

    let root = ObjectShape::new()
        .required(
            "name",
            FieldDef::non_empty_string()
                .with_description("Restaurant name must be a non-empty string"),
        )
        .required(
            "address",
            FieldDef::object(address).with_description("Restaurant address"),
        )
        .required(
            "rating",
            FieldDef::int()
                .with_range(1.0, 5.0)
                .with_description("Rating must be an integer between 1 and 5"),
        )
        .required(
            "type_of_food",
            FieldDef::non_empty_string().with_description("Type of food must be a non-empty string"),
        )
        .optional(
            "_id",
            FieldDef::object_id().with_description("Unique restaurant id"),
        )
        .optional(
            "url",
            FieldDef::string().with_description("Restaurant URL"),
        );

    Schema::new(RESTAURANTS, root)
}

/// Schema for `inspections` documents.
pub fn inspections() -> Schema {
    let results = INSPECTION_RESULTS.iter().map(|r| json!(r)).collect();

    let root = ObjectShape::new()
        .required(
            "restaurant_id",
            FieldDef::object_id().with_description("Reference to the inspected restaurant"),
        )
        .required(
            "date",
            FieldDef::date().with_description("Inspection date"),
        )
        .required(
            "result",
            FieldDef::string()
                .with_enum(results)
                .with_description("One of 'Pass', 'Violation Issued' or 'Fail'"),
        )
        .optional(
            "_id",
            FieldDef::object_id().with_description("Unique inspection id"),
        )
        .optional(
            "notes",
            FieldDef::string().with_description("Additional inspection notes"),
        );

    Schema::new(INSPECTIONS, root)
}

/// Both built-in schemas.
pub fn all() -> Vec<Schema> {
    vec![restaurants(), inspections()]
}
