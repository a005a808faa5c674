//! Report rendering.
//!
//! The only consumer of the chart models; nothing here feeds back into
//! the pipeline.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, write_report, RenderOptions};
