//! Read-only queries returning typed results
//!
//! Each operation builds a find or a pipeline, runs it through a
//! [`DocumentStore`](crate::store::DocumentStore) and decodes the rows into
//! models. Queries are stateless and independent; store failures come back
//! unchanged as [`QueryError::Store`], with no retries.
//!
//! Every query is logged as `<NAME>_BEGIN` / `<NAME>_COMPLETE` (with the row
//! count) or `<NAME>_FAILED`.

mod errors;
mod queries;
mod results;

pub use errors::{QueryError, QueryResult};
pub use queries::QueryRunner;
pub use results::{FoodTypeRating, RestaurantHistory, ResultShare};
