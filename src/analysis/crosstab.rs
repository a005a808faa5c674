//! Age by gender cross-tabulation.

use crate::models::{AgeGenderChart, AgeGenderCrossTab, AnswerRecord, GenderTotals, AGE_RANGES};
use tracing::debug;

const MALE: &str = "Male";
const FEMALE: &str = "Female";

/// Position of an exact age bucket label.
pub fn bucket_index(answer: &str) -> Option<usize> {
    AGE_RANGES.iter().position(|range| *range == answer)
}

/// Join age and gender answers on `submission_id` and count per bucket.
///
/// Age answers outside the fixed buckets are dropped entirely. For every
/// bucketed age answer the first gender record with the same id decides
/// the column; genders other than exactly `Male`/`Female`, or no match at
/// all, count only towards the bucket total.
pub fn cross_tabulate_age_gender(age: &[AnswerRecord], gender: &[AnswerRecord]) -> AgeGenderCrossTab {
    let mut table = AgeGenderCrossTab::empty();
    let mut dropped = 0usize;
    let mut unmatched = 0usize;

    for record in age {
        let Some(index) = bucket_index(&record.answer) else {
            dropped += 1;
            continue;
        };
        table.total_per_bucket[index] += 1;

        let matched = record.submission_id.as_ref().and_then(|id| {
            gender
                .iter()
                .find(|g| g.submission_id.as_ref() == Some(id))
        });

        match matched.map(|g| g.answer.as_str()) {
            Some(MALE) => table.male_counts[index] += 1,
            Some(FEMALE) => table.female_counts[index] += 1,
            Some(_) => {}
            None => unmatched += 1,
        }
    }

    if dropped > 0 || unmatched > 0 {
        debug!(
            "Cross-tab: {} age answers outside known buckets, {} without a gender match",
            dropped, unmatched
        );
    }

    table
}

/// Respondent and per-gender totals over the whole gender set.
pub fn gender_totals(gender: &[AnswerRecord]) -> GenderTotals {
    gender.iter().fold(
        GenderTotals {
            respondents: gender.len() as u64,
            ..GenderTotals::default()
        },
        |mut totals, record| {
            match record.answer.as_str() {
                MALE => totals.male += 1,
                FEMALE => totals.female += 1,
                _ => {}
            }
            totals
        },
    )
}

/// Build the full age & gender chart model.
pub fn age_gender_chart(age: &[AnswerRecord], gender: &[AnswerRecord]) -> AgeGenderChart {
    AgeGenderChart {
        crosstab: cross_tabulate_age_gender(age, gender),
        genders: gender_totals(gender),
    }
}
