//! Survey API access.

pub mod client;

pub use client::{SurveyClient, SurveySource};
