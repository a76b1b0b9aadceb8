//! Aggregation pipeline evaluation
//!
//! Stages run in order over an in-memory document list. Lookups pull the
//! foreign collection through a caller-supplied loader, so the same evaluator
//! serves every store that can scan its collections.

use std::collections::HashMap;

use serde_json::{json, Map, Number, Value};

use crate::schema::extjson;

use super::ast::{Accumulator, GroupSpec, LookupSpec, Pipeline, Stage};
use super::filters::{field_at, PredicateFilter};
use super::sorter::ResultSorter;

/// Evaluates pipelines
pub struct Aggregator;

impl Aggregator {
    /// Runs `pipeline` over `documents`.
    ///
    /// `load` is called once per lookup stage with the foreign collection
    /// name; its error is returned unchanged.
    pub fn run<E, F>(documents: Vec<Value>, pipeline: &Pipeline, mut load: F) -> Result<Vec<Value>, E>
    where
        F: FnMut(&str) -> Result<Vec<Value>, E>,
    {
        let mut docs = documents;

        for stage in &pipeline.stages {
            docs = match stage {
                Stage::Match(predicates) => docs
                    .into_iter()
                    .filter(|doc| PredicateFilter::matches(doc, predicates))
                    .collect(),
                Stage::Sort(spec) => {
                    ResultSorter::sort(&mut docs, spec);
                    docs
                }
                Stage::Group(spec) => Self::group(&docs, spec),
                Stage::Lookup(spec) => {
                    let foreign = load(&spec.from)?;
                    Self::lookup(docs, &foreign, spec)
                }
            };
        }

        Ok(docs)
    }

    /// Groups documents; rows come out in order of first appearance of each key.
    fn group(documents: &[Value], spec: &GroupSpec) -> Vec<Value> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(Value, Vec<AccState>)> = Vec::new();

        for doc in documents {
            let key = field_at(doc, &spec.key).cloned().unwrap_or(Value::Null);
            let slot = *index.entry(key.to_string()).or_insert_with(|| {
                let states = spec.accumulators.iter().map(|(_, acc)| AccState::new(acc)).collect();
                groups.push((key.clone(), states));
                groups.len() - 1
            });

            for (state, (_, acc)) in groups[slot].1.iter_mut().zip(&spec.accumulators) {
                state.add(doc, acc);
            }
        }

        groups
            .into_iter()
            .map(|(key, states)| {
                let mut row = Map::new();
                row.insert("_id".into(), key);
                for (state, (name, _)) in states.into_iter().zip(&spec.accumulators) {
                    row.insert(name.clone(), state.finish());
                }
                Value::Object(row)
            })
            .collect()
    }

    /// Left outer join: every document is kept, with a possibly empty array.
    fn lookup(documents: Vec<Value>, foreign: &[Value], spec: &LookupSpec) -> Vec<Value> {
        let mut by_key: HashMap<String, Vec<Value>> = HashMap::new();
        for doc in foreign {
            if let Some(key) = field_at(doc, &spec.foreign_field).filter(|v| !v.is_null()) {
                by_key.entry(join_key(key)).or_default().push(doc.clone());
            }
        }

        documents
            .into_iter()
            .map(|mut doc| {
                let matches = field_at(&doc, &spec.local_field)
                    .filter(|v| !v.is_null())
                    .and_then(|key| by_key.get(&join_key(key)))
                    .cloned()
                    .unwrap_or_default();

                if let Value::Object(obj) = &mut doc {
                    obj.insert(spec.as_field.clone(), Value::Array(matches));
                }
                doc
            })
            .collect()
    }
}

/// ObjectIds join on their lowercase hex digits in either encoding.
fn join_key(value: &Value) -> String {
    match extjson::object_id_hex(value) {
        Some(hex) => hex.to_ascii_lowercase(),
        None => value.to_string(),
    }
}

/// Running state of one accumulator within one group
enum AccState {
    Count(u64),
    Sum { int: i64, float: f64, all_int: bool },
    Avg { total: f64, n: u64 },
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Count => AccState::Count(0),
            Accumulator::Sum(_) => AccState::Sum {
                int: 0,
                float: 0.0,
                all_int: true,
            },
            Accumulator::Avg(_) => AccState::Avg { total: 0.0, n: 0 },
        }
    }

    fn add(&mut self, doc: &Value, acc: &Accumulator) {
        match (self, acc) {
            (AccState::Count(n), Accumulator::Count) => *n += 1,
            (AccState::Sum { int, float, all_int }, Accumulator::Sum(field)) => {
                if let Some(Value::Number(num)) = field_at(doc, field) {
                    match num.as_i64().and_then(|i| int.checked_add(i)) {
                        Some(sum) if *all_int => *int = sum,
                        _ => *all_int = false,
                    }
                    *float += num.as_f64().unwrap_or(0.0);
                }
            }
            (AccState::Avg { total, n }, Accumulator::Avg(field)) => {
                if let Some(Value::Number(num)) = field_at(doc, field) {
                    if let Some(f) = num.as_f64() {
                        *total += f;
                        *n += 1;
                    }
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Value {
        match self {
            AccState::Count(n) => json!(n),
            AccState::Sum { int, float, all_int } => {
                if all_int {
                    json!(int)
                } else {
                    float_value(float)
                }
            }
            AccState::Avg { total, n } => {
                if n == 0 {
                    Value::Null
                } else {
                    float_value(total / n as f64)
                }
            }
        }
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Predicate, SortSpec};

    fn no_foreign(_: &str) -> Result<Vec<Value>, String> {
        Err("unexpected lookup".into())
    }

    #[test]
    fn test_group_average_and_count() {
        let docs = vec![
            json!({"type_of_food": "Chinese", "rating": 3}),
            json!({"type_of_food": "Italian", "rating": 4}),
            json!({"type_of_food": "Chinese", "rating": 5}),
        ];
        let pipeline = Pipeline::new().with_group(
            GroupSpec::by("type_of_food")
                .accumulate("avgRating", Accumulator::Avg("rating".into()))
                .accumulate("count", Accumulator::Count),
        );

        let rows = Aggregator::run(docs, &pipeline, no_foreign).unwrap();
        assert_eq!(
            rows,
            vec![
                json!({"_id": "Chinese", "avgRating": 4.0, "count": 2}),
                json!({"_id": "Italian", "avgRating": 4.0, "count": 1}),
            ]
        );
    }

    #[test]
    fn test_average_ignores_non_numeric() {
        let docs = vec![
            json!({"k": "a", "v": "five"}),
            json!({"k": "a", "v": 2}),
            json!({"k": "b"}),
        ];
        let pipeline =
            Pipeline::new().with_group(GroupSpec::by("k").accumulate("avg", Accumulator::Avg("v".into())));

        let rows = Aggregator::run(docs, &pipeline, no_foreign).unwrap();
        assert_eq!(rows[0]["avg"], json!(2.0));
        assert_eq!(rows[1]["avg"], Value::Null);
    }

    #[test]
    fn test_sum_stays_integral() {
        let docs = vec![json!({"k": 1, "v": 2}), json!({"k": 1, "v": 3})];
        let pipeline =
            Pipeline::new().with_group(GroupSpec::by("k").accumulate("total", Accumulator::Sum("v".into())));

        let rows = Aggregator::run(docs, &pipeline, no_foreign).unwrap();
        assert_eq!(rows, vec![json!({"_id": 1, "total": 5})]);
    }

    #[test]
    fn test_missing_group_key_is_null() {
        let docs = vec![json!({"x": 1}), json!({"x": 2})];
        let pipeline = Pipeline::new().with_group(GroupSpec::by("k").accumulate("n", Accumulator::Count));

        let rows = Aggregator::run(docs, &pipeline, no_foreign).unwrap();
        assert_eq!(rows, vec![json!({"_id": null, "n": 2})]);
    }

    #[test]
    fn test_group_over_empty_input() {
        let pipeline = Pipeline::new().with_group(GroupSpec::by("k").accumulate("n", Accumulator::Count));
        assert!(Aggregator::run(Vec::new(), &pipeline, no_foreign).unwrap().is_empty());
    }

    #[test]
    fn test_match_then_sort() {
        let docs = vec![
            json!({"_id": 1, "result": "Fail", "date": "2024-01-01T00:00:00.000Z"}),
            json!({"_id": 2, "result": "Pass", "date": "2024-03-01T00:00:00.000Z"}),
            json!({"_id": 3, "result": "Fail", "date": "2024-02-01T00:00:00.000Z"}),
        ];
        let pipeline = Pipeline::new()
            .with_match(vec![Predicate::eq("result", json!("Fail"))])
            .with_sort(SortSpec::desc("date"));

        let rows = Aggregator::run(docs, &pipeline, no_foreign).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r["_id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_lookup_is_left_outer() {
        let restaurants = vec![json!({"_id": "r1"}), json!({"_id": "r2"}), json!({"name": "no id"})];
        let inspections = vec![
            json!({"_id": "i1", "restaurant_id": "r1"}),
            json!({"_id": "i2", "restaurant_id": "r1"}),
            json!({"_id": "i3", "restaurant_id": "ghost"}),
        ];
        let pipeline = Pipeline::new().with_lookup(LookupSpec::new(
            "inspections",
            "_id",
            "restaurant_id",
            "history",
        ));

        let mut loads = 0;
        let rows = Aggregator::run(restaurants, &pipeline, |name| {
            loads += 1;
            assert_eq!(name, "inspections");
            Ok::<_, String>(inspections.clone())
        })
        .unwrap();

        assert_eq!(loads, 1);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["history"].as_array().unwrap().len(), 2);
        assert_eq!(rows[1]["history"], json!([]));
        assert_eq!(rows[2]["history"], json!([]));
    }

    #[test]
    fn test_lookup_joins_object_ids_in_either_encoding() {
        let restaurants = vec![
            json!({"_id": {"$oid": "65A4F0C2E4B0A1B2C3D4E5F6"}}),
            json!({"_id": "65a4f0c2e4b0a1b2c3d4e5f7"}),
        ];
        let inspections = vec![
            json!({"_id": "i1", "restaurant_id": "65a4f0c2e4b0a1b2c3d4e5f6"}),
            json!({"_id": "i2", "restaurant_id": {"$oid": "65a4f0c2e4b0a1b2c3d4e5f6"}}),
            json!({"_id": "i3", "restaurant_id": {"$oid": "65a4f0c2e4b0a1b2c3d4e5f7"}}),
        ];
        let pipeline = Pipeline::new().with_lookup(LookupSpec::new(
            "inspections",
            "_id",
            "restaurant_id",
            "history",
        ));

        let rows = Aggregator::run(restaurants, &pipeline, |_| {
            Ok::<_, String>(inspections.clone())
        })
        .unwrap();

        assert_eq!(rows[0]["history"].as_array().unwrap().len(), 2);
        assert_eq!(rows[1]["history"][0]["_id"], "i3");
    }

    #[test]
    fn test_lookup_keeps_string_and_number_keys_apart() {
        let pipeline = Pipeline::new().with_lookup(LookupSpec::new("x", "k", "k", "hits"));
        let rows = Aggregator::run(vec![json!({"k": "1"})], &pipeline, |_| {
            Ok::<_, String>(vec![json!({"k": 1})])
        })
        .unwrap();
        assert_eq!(rows[0]["hits"], json!([]));
    }

    #[test]
    fn test_loader_error_propagates() {
        let pipeline = Pipeline::new().with_lookup(LookupSpec::new("x", "a", "b", "c"));
        let err = Aggregator::run(vec![json!({"a": 1})], &pipeline, |_| Err::<Vec<Value>, _>("down"))
            .unwrap_err();
        assert_eq!(err, "down");
    }
}
