//! Multi-choice answer rows and the free-text overflow bucket.

use crate::models::{AnswerPercentageRow, AnswerTally, AnswerTuple, QuestionMeta};

/// Default axis label limit, in characters.
pub const DEFAULT_LABEL_MAX: usize = 25;

/// Cut `answer` to at most `max` characters.
pub fn truncate_label(answer: &str, max: usize) -> String {
    answer.chars().take(max).collect()
}

/// Map upstream tuples 1:1 into rows, in upstream order.
///
/// Percentages are taken as given. Missing metadata means no question title
/// and an empty overflow list.
pub fn build_answer_rows(
    tuples: Vec<AnswerTuple>,
    metadata: Option<QuestionMeta>,
    label_max: usize,
) -> AnswerTally {
    let rows = tuples
        .into_iter()
        .map(|tuple| AnswerPercentageRow {
            axis_label: truncate_label(&tuple.answer, label_max),
            answer: tuple.answer,
            count: tuple.count,
            percentage: tuple.percentage,
        })
        .collect();

    let metadata = metadata.unwrap_or_default();

    AnswerTally {
        question: metadata.question,
        rows,
        other_options: metadata.other_options,
    }
}
