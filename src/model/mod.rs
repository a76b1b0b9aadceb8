//! Typed documents of the `restaurants` and `inspections` collections

mod inspection;
mod object_id;
mod restaurant;

pub use inspection::{Inspection, InspectionResult};
pub use object_id::ObjectId;
pub use restaurant::{Address, Restaurant};
