//! Typed query results

use serde::Serialize;

use crate::model::{Inspection, Restaurant};

/// One row of the average-rating report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodTypeRating {
    pub type_of_food: String,
    pub avg_rating: f64,
}

/// Share of inspections with one result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultShare {
    pub result: String,
    pub count: u64,
    /// Percent of all inspections, two decimals
    pub percentage: f64,
}

/// A restaurant with every inspection that references it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantHistory {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub inspection_history: Vec<Inspection>,
}

/// `count / total * 100` rounded to two decimals, ties to even.
///
/// Callers must not pass a zero total.
pub(crate) fn percentage(count: u64, total: u64) -> f64 {
    round_half_even(count as f64 / total as f64 * 100.0, 2)
}

pub(crate) fn round_half_even(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    let floor = scaled.floor();
    let diff = scaled - floor;

    let rounded = if (diff - 0.5).abs() < 1e-9 {
        if floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };

    rounded / factor
}
