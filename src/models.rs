//! Data models for the survey dashboard.
//!
//! This module contains the typed answer records accepted at the pipeline
//! boundary and the derived view models the charts and tables are built
//! from. Derived models are built fresh on every run and never mutated
//! afterwards.

use crate::analysis::percent;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed age buckets, in chart order.
pub const AGE_RANGES: [&str; 8] = [
    "21-25", "26-30", "31-35", "36-40", "41-45", "46-50", "51-55", "56-60",
];

/// Opaque respondent identifier.
///
/// Upstream sends either a JSON number or a JSON string. The two kinds never
/// compare equal, so `1` and `"1"` are different respondents. Numbers compare
/// by value: build them with [`SubmissionId::from_number`] so that `1` and
/// `1.0` are the same respondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionId::Number(n) => write!(f, "{}", n),
            SubmissionId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl SubmissionId {
    /// Numeric id with integral floats folded into their integer form.
    pub fn from_number(n: &serde_json::Number) -> Self {
        const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
        const MIN_I64: f64 = -9_223_372_036_854_775_808.0;

        let folded = match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 => {
                if (0.0..TWO_POW_64).contains(&f) {
                    Some(serde_json::Number::from(f as u64))
                } else if (MIN_I64..0.0).contains(&f) {
                    Some(serde_json::Number::from(f as i64))
                } else {
                    None
                }
            }
            _ => None,
        };

        SubmissionId::Number(folded.unwrap_or_else(|| n.clone()))
    }
}

impl From<u64> for SubmissionId {
    fn from(n: u64) -> Self {
        SubmissionId::Number(n.into())
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        SubmissionId::Text(s.to_string())
    }
}

/// One respondent's answer to one survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// Respondent the answer belongs to. Only required for the age set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<SubmissionId>,
    /// Raw answer value.
    pub answer: String,
}

impl AnswerRecord {
    /// Creates a record for a respondent with a numeric id.
    pub fn new(submission_id: u64, answer: &str) -> Self {
        Self {
            submission_id: Some(submission_id.into()),
            answer: answer.to_string(),
        }
    }

    /// Creates a record without respondent correlation.
    pub fn anonymous(answer: &str) -> Self {
        Self {
            submission_id: None,
            answer: answer.to_string(),
        }
    }
}

/// Age bucket by gender cross-tabulation.
///
/// All vectors are parallel to `age_ranges`, and for every bucket
/// `male_counts[i] + female_counts[i] <= total_per_bucket[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGenderCrossTab {
    pub age_ranges: Vec<String>,
    pub male_counts: Vec<u64>,
    pub female_counts: Vec<u64>,
    pub total_per_bucket: Vec<u64>,
}

impl AgeGenderCrossTab {
    /// An all-zero table over the fixed buckets.
    pub fn empty() -> Self {
        Self {
            age_ranges: AGE_RANGES.iter().map(|s| s.to_string()).collect(),
            male_counts: vec![0; AGE_RANGES.len()],
            female_counts: vec![0; AGE_RANGES.len()],
            total_per_bucket: vec![0; AGE_RANGES.len()],
        }
    }

    /// Male share of each bucket; `None` where the bucket is empty.
    pub fn male_percentages(&self) -> Vec<Option<f64>> {
        self.shares(&self.male_counts)
    }

    /// Female share of each bucket; `None` where the bucket is empty.
    pub fn female_percentages(&self) -> Vec<Option<f64>> {
        self.shares(&self.female_counts)
    }

    fn shares(&self, counts: &[u64]) -> Vec<Option<f64>> {
        counts
            .iter()
            .zip(&self.total_per_bucket)
            .map(|(&count, &total)| percent::share(count, total))
            .collect()
    }

    /// Number of age answers that landed in a known bucket.
    pub fn bucketed_total(&self) -> u64 {
        self.total_per_bucket.iter().sum()
    }
}

/// Respondent totals taken from the gender record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderTotals {
    /// Every gender record, whatever its answer.
    pub respondents: u64,
    pub male: u64,
    pub female: u64,
}

/// Everything the age & gender chart shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGenderChart {
    pub crosstab: AgeGenderCrossTab,
    pub genders: GenderTotals,
}

/// Location frequency table, keyed by the raw answer in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTally {
    pub entries: IndexMap<String, u64>,
    pub total_count: u64,
}

impl LocationTally {
    /// Share of `label` in percent, `None` for unknown labels or an empty tally.
    pub fn percentage(&self, label: &str) -> Option<f64> {
        let count = *self.entries.get(label)?;
        percent::share(count, self.total_count)
    }

    /// Rows in first-seen order with their raw percentages.
    pub fn rows(&self) -> Vec<LocationRow> {
        self.entries
            .iter()
            .map(|(label, &count)| LocationRow {
                label: label.clone(),
                count,
                percentage: percent::share(count, self.total_count),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One location bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub label: String,
    pub count: u64,
    pub percentage: Option<f64>,
}

impl LocationRow {
    /// Two-decimal percentage, e.g. `66.67%`.
    pub fn percentage_display(&self) -> String {
        percent::format_percent(self.percentage)
    }
}

/// Pre-aggregated `{answer, count, percentage}` tuple from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerTuple {
    pub answer: String,
    pub count: u64,
    pub percentage: f64,
}

/// Companion metadata for the multi-choice question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMeta {
    #[serde(default)]
    pub question: Option<String>,
    /// Free-text answers outside the enumerated choices.
    #[serde(default)]
    pub other_options: Vec<String>,
}

/// One multi-choice answer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPercentageRow {
    /// Full answer, as shown in the table.
    pub answer: String,
    /// Answer cut to the axis label limit.
    pub axis_label: String,
    pub count: u64,
    /// Upstream percentage, never recomputed.
    pub percentage: f64,
}

impl AnswerPercentageRow {
    pub fn percentage_display(&self) -> String {
        percent::format_percent(Some(self.percentage))
    }
}

/// The multi-choice chart and table, plus the overflow bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerTally {
    pub question: Option<String>,
    pub rows: Vec<AnswerPercentageRow>,
    pub other_options: Vec<String>,
}

/// Outcome of loading one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChartState<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> ChartState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ChartState::Ready(_))
    }

    /// Transform the ready model, keeping the failure reason as is.
    pub fn map<'a, U>(&'a self, f: impl FnOnce(&'a T) -> U) -> ChartState<U> {
        match self {
            ChartState::Ready(chart) => ChartState::Ready(f(chart)),
            ChartState::Unavailable { reason } => ChartState::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartState::Ready(chart) => Some(chart),
            ChartState::Unavailable { .. } => None,
        }
    }
}

/// Metadata about a dashboard run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Base URL of the survey API.
    pub api_url: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Time spent fetching and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub age_gender: ChartState<AgeGenderChart>,
    pub locations: ChartState<LocationTally>,
    pub answers: ChartState<AnswerTally>,
}

impl DashboardReport {
    /// Number of charts that could not be built.
    pub fn unavailable_count(&self) -> usize {
        [
            self.age_gender.is_ready(),
            self.locations.is_ready(),
            self.answers.is_ready(),
        ]
        .iter()
        .filter(|ready| !**ready)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_id_strict_equality() {
        assert_eq!(SubmissionId::from(1u64), SubmissionId::from(1u64));
        assert_ne!(SubmissionId::from(1u64), SubmissionId::from("1"));
        assert_eq!(SubmissionId::from(7u64).to_string(), "7");
        assert_eq!(SubmissionId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_chart_state_map_keeps_reason() {
        let ready: ChartState<u64> = ChartState::Ready(2);
        assert_eq!(ready.map(|n| n * 10), ChartState::Ready(20));

        let failed: ChartState<u64> = ChartState::Unavailable {
            reason: "timed out".to_string(),
        };
        assert_eq!(
            failed.map(|n| n * 10),
            ChartState::Unavailable {
                reason: "timed out".to_string()
            }
        );
    }

    #[test]
    fn test_submission_id_numbers_compare_by_value() {
        let float = serde_json::Number::from_f64(1.0).unwrap();
        assert_eq!(SubmissionId::from_number(&float), SubmissionId::from(1u64));

        let negative = serde_json::Number::from_f64(-3.0).unwrap();
        assert_eq!(
            SubmissionId::from_number(&negative),
            SubmissionId::Number((-3i64).into())
        );

        let fractional = serde_json::Number::from_f64(1.5).unwrap();
        assert_ne!(SubmissionId::from_number(&fractional), SubmissionId::from(1u64));
        assert_eq!(SubmissionId::from_number(&fractional).to_string(), "1.5");
    }

    #[test]
    fn test_answer_record_serde() {
        let record: AnswerRecord =
            serde_json::from_value(json!({"submissionId": 5, "answer": "Male"})).unwrap();
        assert_eq!(record, AnswerRecord::new(5, "Male"));

        let json = serde_json::to_value(AnswerRecord::anonymous("NY")).unwrap();
        assert_eq!(json, json!({"answer": "NY"}));
    }

    #[test]
    fn test_empty_crosstab_has_no_data() {
        let table = AgeGenderCrossTab::empty();
        assert_eq!(table.age_ranges.len(), 8);
        assert_eq!(table.age_ranges[0], "21-25");
        assert_eq!(table.age_ranges[7], "56-60");
        assert!(table.male_percentages().iter().all(Option::is_none));
        assert_eq!(table.bucketed_total(), 0);
    }

    #[test]
    fn test_location_percentage_lookup() {
        let mut entries = IndexMap::new();
        entries.insert("NY".to_string(), 1);
        entries.insert("LA".to_string(), 3);
        let tally = LocationTally {
            entries,
            total_count: 4,
        };

        assert_eq!(tally.percentage("LA"), Some(75.0));
        assert_eq!(tally.percentage("SF"), None);

        let rows = tally.rows();
        assert_eq!(rows[0].label, "NY");
        assert_eq!(rows[0].percentage_display(), "25.00%");
    }

    #[test]
    fn test_chart_state_serialization() {
        let ready: ChartState<GenderTotals> = ChartState::Ready(GenderTotals {
            respondents: 2,
            male: 1,
            female: 1,
        });
        let json = serde_json::to_value(&ready).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["respondents"], 2);

        let down: ChartState<GenderTotals> = ChartState::Unavailable {
            reason: "timeout".to_string(),
        };
        let json = serde_json::to_value(&down).unwrap();
        assert_eq!(json, json!({"status": "unavailable", "reason": "timeout"}));
        assert!(down.ready().is_none());
    }
}
