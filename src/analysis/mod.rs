//! Aggregation pipeline.
//!
//! Pure, synchronous transformations from validated answer records to the
//! chart models. Nothing in here performs I/O.

pub mod answers;
pub mod crosstab;
pub mod location;
pub mod percent;
pub mod validate;

pub use answers::build_answer_rows;
pub use crosstab::{age_gender_chart, cross_tabulate_age_gender};
pub use location::tally_locations;
