//! Survey Insights
//!
//! Turns raw survey answers into chart-ready models:
//!
//! - [`analysis::cross_tabulate_age_gender`]: age bucket by gender counts
//! - [`analysis::tally_locations`]: location frequencies and shares
//! - [`analysis::build_answer_rows`]: multi-choice rows plus free-text answers
//!
//! Raw payloads are validated at the boundary by [`analysis::validate`];
//! fetching lives in [`api`] and rendering in [`report`], so the pipeline
//! itself stays pure.

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod report;
