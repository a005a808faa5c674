//! Dashboard report generation.
//!
//! This module renders a [`DashboardReport`] as Markdown (tables plus
//! optional text bars standing in for the charts) or as JSON.

use crate::analysis::percent::{self, format_percent};
use crate::config::ReportConfig;
use crate::models::{
    AgeGenderChart, AgeGenderCrossTab, AnswerTally, ChartState, DashboardReport, GenderTotals,
    LocationRow, LocationTally, ReportMetadata,
};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// Series colours of the age & gender chart.
pub const MALE_COLOR: &str = "#E3F4EE";
pub const FEMALE_COLOR: &str = "#44F1B6";

/// Bar colours, cycled by row. Purely cosmetic.
const PALETTE: [&str; 10] = [
    "#44F1B6", "#007F73", "#4CCD99", "#FFCE56", "#4BC0C0", "#9966FF", "#FF8C00", "#8A2BE2",
    "#7FFF00", "#00CED1",
];

/// Colour of the bar at `index`.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Rendering knobs taken from `[report]`.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub include_bars: bool,
    pub bar_width: usize,
}

impl From<&ReportConfig> for RenderOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            include_bars: config.include_bars,
            bar_width: config.bar_width,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Survey Insights\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_age_gender_section(&report.age_gender, options));
    output.push_str(&generate_location_section(&report.locations, options));
    output.push_str(&generate_answers_section(&report.answers, options));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.api_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_unavailable(reason: &str) -> String {
    format!("> Unavailable: {}\n\n", escape_cell(reason))
}

fn generate_age_gender_section(state: &ChartState<AgeGenderChart>, options: &RenderOptions) -> String {
    let mut section = String::from("## Age & Gender\n\n");

    let chart = match state {
        ChartState::Ready(chart) => chart,
        ChartState::Unavailable { reason } => {
            section.push_str(&generate_unavailable(reason));
            return section;
        }
    };
    let table = &chart.crosstab;

    section.push_str(&format!("*Respondents: {}*\n\n", chart.genders.respondents));
    section.push_str(&format!(
        "Legend: Male `{}` ({} Male) | Female `{}` ({} Female)\n\n",
        MALE_COLOR, chart.genders.male, FEMALE_COLOR, chart.genders.female
    ));

    section.push_str("| Age Range | Male | Female | Total | Male % | Female % |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");

    let male_pct = table.male_percentages();
    let female_pct = table.female_percentages();
    for (i, range) in table.age_ranges.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            range,
            table.male_counts[i],
            table.female_counts[i],
            table.total_per_bucket[i],
            format_percent(male_pct[i]),
            format_percent(female_pct[i]),
        ));
    }
    section.push('\n');

    if options.include_bars {
        let max_total = table.total_per_bucket.iter().copied().max().unwrap_or(0);
        section.push_str("```text\n");
        for (i, range) in table.age_ranges.iter().enumerate() {
            section.push_str(&format!(
                "{:<6} {}\n",
                range,
                stacked_bar(
                    table.male_counts[i],
                    table.female_counts[i],
                    table.total_per_bucket[i],
                    max_total,
                    options.bar_width,
                )
            ));
        }
        section.push_str("```\n\n");
        section.push_str("`█` Male, `▓` Female, `░` other or unmatched\n\n");
    }

    section
}

fn generate_location_section(state: &ChartState<LocationTally>, options: &RenderOptions) -> String {
    let mut section = String::from("## Locations\n\n");

    let tally = match state {
        ChartState::Ready(tally) => tally,
        ChartState::Unavailable { reason } => {
            section.push_str(&generate_unavailable(reason));
            return section;
        }
    };

    section.push_str(&format!("*Respondents: {}*\n\n", tally.total_count));

    if tally.is_empty() {
        section.push_str("No location answers yet.\n\n");
        return section;
    }

    let rows = tally.rows();
    if options.include_bars {
        section.push_str("| Location | Count | Share | Bar | Colour |\n");
        section.push_str("|:---|:---:|:---:|:---|:---:|\n");
    } else {
        section.push_str("| Location | Count | Share |\n");
        section.push_str("|:---|:---:|:---:|\n");
    }

    for (i, row) in rows.iter().enumerate() {
        let mut line = format!(
            "| {} | {} | {} |",
            escape_cell(&row.label),
            row.count,
            row.percentage_display()
        );
        if options.include_bars {
            line.push_str(&format!(
                " `{}` | `{}` |",
                text_bar(row.percentage, options.bar_width),
                palette_color(i)
            ));
        }
        section.push_str(&line);
        section.push('\n');
    }
    section.push('\n');

    section
}

fn generate_answers_section(state: &ChartState<AnswerTally>, options: &RenderOptions) -> String {
    let tally = match state {
        ChartState::Ready(tally) => tally,
        ChartState::Unavailable { reason } => {
            return format!("## Answers\n\n{}", generate_unavailable(reason));
        }
    };

    let title = tally.question.as_deref().unwrap_or("Answers");
    let mut section = format!("## {}\n\n", escape_cell(title));

    if options.include_bars && !tally.rows.is_empty() {
        section.push_str("### Chart\n\n");
        section.push_str("| Label | Percentage | Bar | Colour |\n");
        section.push_str("|:---|:---:|:---|:---:|\n");
        for (i, row) in tally.rows.iter().enumerate() {
            section.push_str(&format!(
                "| {} | {} | `{}` | `{}` |\n",
                escape_cell(&row.axis_label),
                row.percentage_display(),
                text_bar(Some(row.percentage), options.bar_width),
                palette_color(i)
            ));
        }
        section.push('\n');
    }

    section.push_str("### Responses\n\n");
    if tally.rows.is_empty() {
        section.push_str("No answers yet.\n\n");
    } else {
        section.push_str("| Answers | Response |\n");
        section.push_str("|:---|:---|\n");
        for row in &tally.rows {
            section.push_str(&format!(
                "| {} | {} ({}) |\n",
                escape_cell(&row.answer),
                row.count,
                row.percentage_display()
            ));
        }
        section.push('\n');
    }

    section.push_str("### Other\n\n");
    if tally.other_options.is_empty() {
        section.push_str("None.\n\n");
    } else {
        for option in &tally.other_options {
            section.push_str(&format!("- {}\n", option.replace('\n', " ")));
        }
        section.push('\n');
    }

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by survey-insights*\n".to_string()
}

/// Horizontal bar proportional to `percentage`; empty for "no data".
pub fn text_bar(percentage: Option<f64>, width: usize) -> String {
    let filled = match percentage {
        Some(p) if p.is_finite() => ((p.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize,
        _ => 0,
    };
    format!("{}{}", "█".repeat(filled), " ".repeat(width - filled))
}

/// Stacked bar of one age bucket, scaled against the largest bucket.
fn stacked_bar(male: u64, female: u64, total: u64, max_total: u64, width: usize) -> String {
    let cells = |count: u64| {
        percent::share(count, max_total)
            .map(|p| (p / 100.0 * width as f64).round() as usize)
            .unwrap_or(0)
    };

    let male_cells = cells(male);
    let female_cells = cells(female);
    let other_cells = cells(total).saturating_sub(male_cells + female_cells);

    format!(
        "{}{}{} {}",
        "█".repeat(male_cells),
        "▓".repeat(female_cells),
        "░".repeat(other_cells),
        total
    )
}

/// Keep arbitrary answers from breaking a Markdown table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// JSON shape of the report: the models plus their raw percentages.
#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ReportMetadata,
    age_gender: ChartState<JsonAgeGender<'a>>,
    locations: ChartState<JsonLocations<'a>>,
    answers: ChartState<&'a AnswerTally>,
}

#[derive(Serialize)]
struct JsonAgeGender<'a> {
    crosstab: &'a AgeGenderCrossTab,
    genders: &'a GenderTotals,
    male_percentages: Vec<Option<f64>>,
    female_percentages: Vec<Option<f64>>,
}

#[derive(Serialize)]
struct JsonLocations<'a> {
    entries: &'a IndexMap<String, u64>,
    total_count: u64,
    rows: Vec<LocationRow>,
}

/// Generate a JSON report.
///
/// Percentages are unrounded; `null` marks a share with no data.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    let json = JsonReport {
        metadata: &report.metadata,
        age_gender: report.age_gender.map(|chart| JsonAgeGender {
            crosstab: &chart.crosstab,
            genders: &chart.genders,
            male_percentages: chart.crosstab.male_percentages(),
            female_percentages: chart.crosstab.female_percentages(),
        }),
        locations: report.locations.map(|tally| JsonLocations {
            entries: &tally.entries,
            total_count: tally.total_count,
            rows: tally.rows(),
        }),
        answers: report.answers.map(|tally| tally),
    };

    serde_json::to_string_pretty(&json).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
