//! The six read-only queries over `restaurants` and `inspections`

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::errors::{QueryError, QueryResult};
use super::results::{percentage, FoodTypeRating, RestaurantHistory, ResultShare};
use crate::model::{Inspection, InspectionResult, Restaurant};
use crate::observability::{log_event, Event, ObservationScope};
use crate::query::{Accumulator, GroupSpec, LookupSpec, Pipeline, Predicate, SortSpec};
use crate::schema::builtin::{INSPECTIONS, RESTAURANTS};
use crate::store::DocumentStore;

const HISTORY_FIELD: &str = "inspection_history";

/// Runs queries against a borrowed store.
///
/// Holds only a shared reference, so one runner (or many) can be used from
/// several threads at once.
pub struct QueryRunner<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> Clone for QueryRunner<'a, S> {
    fn clone(&self) -> Self {
        Self { store: self.store }
    }
}

impl<'a, S: DocumentStore + ?Sized> Copy for QueryRunner<'a, S> {}

impl<'a, S: DocumentStore + ?Sized> QueryRunner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Restaurants whose `type_of_food` equals `food_type` exactly.
    pub fn find_by_food_type(&self, food_type: &str) -> QueryResult<Vec<Restaurant>> {
        let scope = ObservationScope::with_fields("FIND_BY_FOOD_TYPE", &[("food_type", food_type)]);
        observe(scope, || {
            let docs = self.store.find(
                RESTAURANTS,
                &[Predicate::eq("type_of_food", json!(food_type))],
                None,
            )?;
            decode_all(RESTAURANTS, docs)
        })
    }

    /// Inspections with result "Violation Issued", newest first.
    ///
    /// Equal dates keep store order.
    pub fn find_violations_sorted_by_date_desc(&self) -> QueryResult<Vec<Inspection>> {
        let scope = ObservationScope::new("FIND_VIOLATIONS");
        observe(scope, || {
            let docs = self.store.find(
                INSPECTIONS,
                &[Predicate::eq(
                    "result",
                    json!(InspectionResult::ViolationIssued.as_str()),
                )],
                Some(&SortSpec::desc("date")),
            )?;
            decode_all(INSPECTIONS, docs)
        })
    }

    /// Restaurants with `rating > min_exclusive`.
    pub fn find_high_rated(&self, min_exclusive: i32) -> QueryResult<Vec<Restaurant>> {
        let min = min_exclusive.to_string();
        let scope = ObservationScope::with_fields("FIND_HIGH_RATED", &[("min_exclusive", min.as_str())]);
        observe(scope, || {
            let docs = self.store.find(
                RESTAURANTS,
                &[Predicate::gt("rating", json!(min_exclusive))],
                None,
            )?;
            decode_all(RESTAURANTS, docs)
        })
    }

    /// Mean rating per food type, highest first.
    ///
    /// Groups whose key is not text or that have no numeric rating are
    /// logged and left out.
    pub fn average_rating_by_food_type(&self) -> QueryResult<Vec<FoodTypeRating>> {
        let scope = ObservationScope::new("AVERAGE_RATING_BY_FOOD_TYPE");
        observe(scope, || {
            let pipeline = Pipeline::new()
                .with_group(
                    GroupSpec::by("type_of_food")
                        .accumulate("avg_rating", Accumulator::Avg("rating".into())),
                )
                .with_sort(SortSpec::desc("avg_rating"));

            let rows = self.store.aggregate(RESTAURANTS, &pipeline)?;
            Ok(rows
                .iter()
                .filter_map(|row| match (row["_id"].as_str(), row["avg_rating"].as_f64()) {
                    (Some(food_type), Some(avg)) => Some(FoodTypeRating {
                        type_of_food: food_type.to_string(),
                        avg_rating: avg,
                    }),
                    _ => skip_row(RESTAURANTS, row),
                })
                .collect())
        })
    }

    /// Count and percentage of inspections per result, most frequent first.
    ///
    /// Percentages are of all inspections, rounded half-to-even at two
    /// decimals. No inspections yields an empty list.
    pub fn inspection_result_distribution(&self) -> QueryResult<Vec<ResultShare>> {
        let scope = ObservationScope::new("INSPECTION_RESULT_DISTRIBUTION");
        observe(scope, || {
            let pipeline = Pipeline::new()
                .with_group(GroupSpec::by("result").accumulate("count", Accumulator::Count))
                .with_sort(SortSpec::desc("count"));

            let rows = self.store.aggregate(INSPECTIONS, &pipeline)?;
            let total: u64 = rows.iter().filter_map(|row| row["count"].as_u64()).sum();
            if total == 0 {
                return Ok(Vec::new());
            }

            Ok(rows
                .iter()
                .filter_map(|row| match (row["_id"].as_str(), row["count"].as_u64()) {
                    (Some(result), Some(count)) => Some(ResultShare {
                        result: result.to_string(),
                        count,
                        percentage: percentage(count, total),
                    }),
                    _ => skip_row(INSPECTIONS, row),
                })
                .collect())
        })
    }

    /// Every restaurant with the inspections whose `restaurant_id` matches
    /// its `_id`. Restaurants without inspections get an empty history.
    pub fn restaurants_with_inspection_history(&self) -> QueryResult<Vec<RestaurantHistory>> {
        let scope = ObservationScope::new("RESTAURANTS_WITH_INSPECTION_HISTORY");
        observe(scope, || {
            let pipeline = Pipeline::new().with_lookup(LookupSpec::new(
                INSPECTIONS,
                "_id",
                "restaurant_id",
                HISTORY_FIELD,
            ));

            self.store
                .aggregate(RESTAURANTS, &pipeline)?
                .into_iter()
                .map(|mut row| {
                    let history = row
                        .as_object_mut()
                        .and_then(|obj| obj.remove(HISTORY_FIELD))
                        .unwrap_or_else(|| Value::Array(Vec::new()));
                    Ok(RestaurantHistory {
                        restaurant: decode(RESTAURANTS, row)?,
                        inspection_history: decode(INSPECTIONS, history)?,
                    })
                })
                .collect()
        })
    }
}

/// Runs `query` inside `scope`, logging completion with the row count or
/// the failure.
fn observe<T>(
    scope: ObservationScope<'_>,
    query: impl FnOnce() -> QueryResult<Vec<T>>,
) -> QueryResult<Vec<T>> {
    match query() {
        Ok(rows) => {
            scope.complete_with_fields(&[("rows", rows.len().to_string().as_str())]);
            Ok(rows)
        }
        Err(e) => {
            if e.is_fatal() {
                scope.fail_fatal(&e.to_string());
            } else {
                scope.fail(&e.to_string());
            }
            Err(e)
        }
    }
}

fn decode<T: DeserializeOwned>(collection: &str, value: Value) -> QueryResult<T> {
    serde_json::from_value(value).map_err(|e| QueryError::Decode {
        collection: collection.to_string(),
        reason: e.to_string(),
    })
}

fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Value>) -> QueryResult<Vec<T>> {
    docs.into_iter().map(|doc| decode(collection, doc)).collect()
}

fn skip_row<T>(collection: &str, row: &Value) -> Option<T> {
    log_event(
        Event::GroupRowSkipped,
        &[("collection", collection), ("row", row.to_string().as_str())],
    );
    None
}
