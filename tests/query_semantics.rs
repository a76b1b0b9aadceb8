//! Query Semantics Tests
//!
//! - Food-type matching is exact and case-sensitive
//! - Violations come back newest first
//! - The rating threshold is exclusive
//! - Averages and result shares follow the documented arithmetic
//! - The history join is a left outer join
//! - Extended JSON stored as-is joins and sorts like canonical documents
//! - Empty collections give empty results
//! - A runner can be shared across threads

use chrono::{TimeZone, Utc};
use inspectdb::catalog::Catalog;
use inspectdb::model::{Address, Inspection, InspectionResult, ObjectId, Restaurant};
use inspectdb::runner::{FoodTypeRating, QueryRunner, ResultShare};
use inspectdb::schema::SchemaRegistry;
use inspectdb::store::{DocumentStore, MemoryStore};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn catalog() -> Catalog<MemoryStore> {
    Catalog::new(SchemaRegistry::with_builtins(), MemoryStore::new())
}

fn restaurant(name: &str, rating: i32, type_of_food: &str) -> Restaurant {
    Restaurant::new(
        name,
        Address::new("1 Market Sq", "Leeds", "LS1 6AB"),
        rating,
        type_of_food,
    )
}

fn inspect(
    catalog: &Catalog<MemoryStore>,
    restaurant_id: &ObjectId,
    day: u32,
    result: InspectionResult,
) -> ObjectId {
    let inspection = Inspection::new(
        restaurant_id.clone(),
        Utc.with_ymd_and_hms(2024, 2, day, 12, 0, 0).unwrap(),
        result,
    );
    catalog.insert_inspection(&inspection).unwrap()
}

// =============================================================================
// Find Queries
// =============================================================================

#[test]
fn test_find_by_food_type_is_exact() {
    let catalog = catalog();
    for (name, food) in [
        ("A", "Chinese"),
        ("B", "chinese"),
        ("C", "Chinese "),
        ("D", "Chinese"),
        ("E", "Thai"),
    ] {
        catalog.insert_restaurant(&restaurant(name, 3, food)).unwrap();
    }

    let names: Vec<String> = catalog
        .runner()
        .find_by_food_type("Chinese")
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["A", "D"]);
}

#[test]
fn test_found_restaurants_carry_ids() {
    let catalog = catalog();
    let id = catalog
        .insert_restaurant(&restaurant("A", 3, "Thai").with_url("http://a.example"))
        .unwrap();

    let found = catalog.runner().find_by_food_type("Thai").unwrap();
    assert_eq!(found[0].id, Some(id));
    assert_eq!(found[0].url.as_deref(), Some("http://a.example"));
}

#[test]
fn test_violations_sorted_newest_first() {
    let catalog = catalog();
    let id = catalog.insert_restaurant(&restaurant("A", 3, "Thai")).unwrap();

    inspect(&catalog, &id, 3, InspectionResult::ViolationIssued);
    inspect(&catalog, &id, 20, InspectionResult::ViolationIssued);
    inspect(&catalog, &id, 25, InspectionResult::Pass);
    inspect(&catalog, &id, 11, InspectionResult::ViolationIssued);
    inspect(&catalog, &id, 15, InspectionResult::Fail);

    let violations = catalog.runner().find_violations_sorted_by_date_desc().unwrap();
    let days: Vec<String> = violations
        .iter()
        .map(|i| i.date.format("%d").to_string())
        .collect();
    assert_eq!(days, vec!["20", "11", "03"]);
    assert!(violations
        .iter()
        .all(|i| i.result == InspectionResult::ViolationIssued));
}

#[test]
fn test_high_rated_threshold_is_exclusive() {
    let catalog = catalog();
    for rating in 1..=5 {
        catalog
            .insert_restaurant(&restaurant(&format!("R{}", rating), rating, "Thai"))
            .unwrap();
    }

    let runner = catalog.runner();
    let ratings = |min: i32| -> Vec<i32> {
        runner
            .find_high_rated(min)
            .unwrap()
            .into_iter()
            .map(|r| r.rating)
            .collect()
    };

    assert_eq!(ratings(4), vec![5]);
    assert_eq!(ratings(3), vec![4, 5]);
    assert!(ratings(5).is_empty());
}

// =============================================================================
// Aggregations
// =============================================================================

#[test]
fn test_average_rating_by_food_type() {
    let catalog = catalog();
    catalog.insert_restaurant(&restaurant("A", 3, "Chinese")).unwrap();
    catalog.insert_restaurant(&restaurant("B", 5, "Chinese")).unwrap();
    catalog.insert_restaurant(&restaurant("C", 4, "Italian")).unwrap();

    let mut rows = catalog.runner().average_rating_by_food_type().unwrap();
    rows.sort_by(|a, b| a.type_of_food.cmp(&b.type_of_food));

    assert_eq!(
        rows,
        vec![
            FoodTypeRating {
                type_of_food: "Chinese".to_string(),
                avg_rating: 4.0
            },
            FoodTypeRating {
                type_of_food: "Italian".to_string(),
                avg_rating: 4.0
            },
        ]
    );
}

#[test]
fn test_average_rating_ordered_descending() {
    let catalog = catalog();
    catalog.insert_restaurant(&restaurant("A", 2, "Pizza")).unwrap();
    catalog.insert_restaurant(&restaurant("B", 5, "Sushi")).unwrap();
    catalog.insert_restaurant(&restaurant("C", 3, "Curry")).unwrap();
    catalog.insert_restaurant(&restaurant("D", 4, "Curry")).unwrap();

    let rows = catalog.runner().average_rating_by_food_type().unwrap();
    let order: Vec<(&str, f64)> = rows
        .iter()
        .map(|r| (r.type_of_food.as_str(), r.avg_rating))
        .collect();
    assert_eq!(order, vec![("Sushi", 5.0), ("Curry", 3.5), ("Pizza", 2.0)]);
}

#[test]
fn test_inspection_result_distribution() {
    let catalog = catalog();
    let id = catalog.insert_restaurant(&restaurant("A", 3, "Thai")).unwrap();
    inspect(&catalog, &id, 1, InspectionResult::Pass);
    inspect(&catalog, &id, 2, InspectionResult::Pass);
    inspect(&catalog, &id, 3, InspectionResult::Fail);

    let rows = catalog.runner().inspection_result_distribution().unwrap();
    assert_eq!(
        rows,
        vec![
            ResultShare {
                result: "Pass".to_string(),
                count: 2,
                percentage: 66.67
            },
            ResultShare {
                result: "Fail".to_string(),
                count: 1,
                percentage: 33.33
            },
        ]
    );
}

#[test]
fn test_distribution_uses_exact_result_names() {
    let catalog = catalog();
    let id = catalog.insert_restaurant(&restaurant("A", 3, "Thai")).unwrap();
    for day in 1..=8 {
        let result = if day == 1 {
            InspectionResult::ViolationIssued
        } else {
            InspectionResult::Pass
        };
        inspect(&catalog, &id, day, result);
    }

    let rows = catalog.runner().inspection_result_distribution().unwrap();
    assert_eq!(rows[0].result, "Pass");
    assert_eq!(rows[0].percentage, 87.5);
    assert_eq!(rows[1].result, "Violation Issued");
    assert_eq!(rows[1].percentage, 12.5);
}

// =============================================================================
// History Join
// =============================================================================

#[test]
fn test_history_is_left_outer_join() {
    let catalog = catalog();
    let visited = catalog.insert_restaurant(&restaurant("Visited", 4, "Thai")).unwrap();
    catalog.insert_restaurant(&restaurant("Never", 2, "Pizza")).unwrap();

    inspect(&catalog, &visited, 1, InspectionResult::Pass);
    inspect(&catalog, &visited, 9, InspectionResult::Fail);
    // Dangling reference: stored, but joins to nothing
    inspect(&catalog, &ObjectId::generate(), 5, InspectionResult::Pass);

    let history = catalog.runner().restaurants_with_inspection_history().unwrap();
    assert_eq!(history.len(), 2);

    let visited_row = history
        .iter()
        .find(|h| h.restaurant.name == "Visited")
        .unwrap();
    assert_eq!(visited_row.inspection_history.len(), 2);
    assert!(visited_row
        .inspection_history
        .iter()
        .all(|i| i.restaurant_id == visited));

    let never_row = history
        .iter()
        .find(|h| h.restaurant.name == "Never")
        .unwrap();
    assert!(never_row.inspection_history.is_empty());
}

// =============================================================================
// Extended JSON Written Straight To The Store
// =============================================================================

const RESTAURANT_HEX: &str = "65a4f0c2e4b0a1b2c3d4e5f6";

fn extended_json_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert(
            "restaurants",
            json!({
                "_id": {"$oid": RESTAURANT_HEX},
                "name": "Golden Dragon",
                "address": {"street": "1 High St", "city": "York", "postcode": "YO1 7HH"},
                "rating": 4,
                "type_of_food": "Chinese"
            }),
        )
        .unwrap();
    store
        .insert(
            "inspections",
            json!({
                "restaurant_id": {"$oid": RESTAURANT_HEX},
                "date": {"$date": "2020-03-01T09:00:00Z"},
                "result": "Violation Issued"
            }),
        )
        .unwrap();
    store
        .insert(
            "inspections",
            json!({
                "restaurant_id": {"$oid": RESTAURANT_HEX.to_uppercase()},
                "date": {"$date": 1_705_312_800_000i64},
                "result": "Violation Issued"
            }),
        )
        .unwrap();
    store
}

#[test]
fn test_history_joins_extended_json_references() {
    let store = extended_json_store();
    let history = QueryRunner::new(&store)
        .restaurants_with_inspection_history()
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].inspection_history.len(), 2);
    let expected = ObjectId::parse(RESTAURANT_HEX).unwrap();
    assert!(history[0]
        .inspection_history
        .iter()
        .all(|i| i.restaurant_id == expected));
}

#[test]
fn test_violations_sort_extended_json_dates_newest_first() {
    let store = extended_json_store();
    let violations = QueryRunner::new(&store)
        .find_violations_sorted_by_date_desc()
        .unwrap();

    let years: Vec<String> = violations
        .iter()
        .map(|i| i.date.format("%Y").to_string())
        .collect();
    assert_eq!(years, vec!["2024", "2020"]);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_empty_collections_give_empty_results() {
    let catalog = catalog();
    let runner = catalog.runner();

    assert!(runner.find_by_food_type("Thai").unwrap().is_empty());
    assert!(runner.find_violations_sorted_by_date_desc().unwrap().is_empty());
    assert!(runner.find_high_rated(0).unwrap().is_empty());
    assert!(runner.average_rating_by_food_type().unwrap().is_empty());
    assert!(runner.inspection_result_distribution().unwrap().is_empty());
    assert!(runner.restaurants_with_inspection_history().unwrap().is_empty());
}

#[test]
fn test_queries_run_concurrently() {
    let catalog = catalog();
    for (i, food) in ["Thai", "Pizza", "Thai", "Curry"].iter().enumerate() {
        let id = catalog
            .insert_restaurant(&restaurant(&format!("R{}", i), (i as i32 % 5) + 1, food))
            .unwrap();
        inspect(&catalog, &id, i as u32 + 1, InspectionResult::Pass);
    }

    let runner = catalog.runner();
    let expected = runner.average_rating_by_food_type().unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    assert_eq!(runner.average_rating_by_food_type().unwrap(), expected);
                    assert_eq!(runner.find_by_food_type("Thai").unwrap().len(), 2);
                    assert_eq!(runner.restaurants_with_inspection_history().unwrap().len(), 4);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}
