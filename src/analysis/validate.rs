//! Boundary validation of upstream payloads.
//!
//! The API hands back loosely typed JSON. These functions turn it into the
//! typed records the pipeline works on. A payload with the wrong overall
//! shape is rejected with a [`ValidationError`]; individual records whose
//! values are unusable (an answer that is not a string, a count that is not
//! a whole number) are skipped and logged at debug level.

use crate::error::{json_kind, ValidationError};
use crate::models::{AnswerRecord, AnswerTuple, QuestionMeta, SubmissionId};
use serde_json::{Map, Value};
use tracing::debug;

pub const AGE_SET: &str = "age records";
pub const GENDER_SET: &str = "gender records";
pub const LOCATION_SET: &str = "location records";
pub const ANSWER_SET: &str = "answer tally";

type Object = Map<String, Value>;

/// Age records: every element needs `answer` and `submissionId`.
pub fn age_records(value: &Value) -> Result<Vec<AnswerRecord>, ValidationError> {
    let objects = objects(AGE_SET, value)?;
    let mut records = Vec::with_capacity(objects.len());

    for (index, obj) in objects.into_iter().enumerate() {
        let answer = require(AGE_SET, index, obj, "answer")?;
        let id = require(AGE_SET, index, obj, "submissionId")?;

        let (Some(answer), Some(id)) = (answer.as_str(), submission_id(id)) else {
            debug!("Skipping malformed {} entry #{}", AGE_SET, index);
            continue;
        };

        records.push(AnswerRecord {
            submission_id: Some(id),
            answer: answer.to_string(),
        });
    }

    Ok(records)
}

/// Gender records: `answer` is required, `submissionId` is optional.
///
/// A record without a usable id is kept: it still counts as a respondent
/// but can never be matched to an age answer.
pub fn gender_records(value: &Value) -> Result<Vec<AnswerRecord>, ValidationError> {
    answer_records(GENDER_SET, value)
}

/// Location records: only `answer` is used.
pub fn location_records(value: &Value) -> Result<Vec<AnswerRecord>, ValidationError> {
    answer_records(LOCATION_SET, value)
}

fn answer_records(set: &'static str, value: &Value) -> Result<Vec<AnswerRecord>, ValidationError> {
    let objects = objects(set, value)?;
    let mut records = Vec::with_capacity(objects.len());

    for (index, obj) in objects.into_iter().enumerate() {
        let Some(answer) = require(set, index, obj, "answer")?.as_str() else {
            debug!("Skipping {} entry #{}: answer is not a string", set, index);
            continue;
        };

        records.push(AnswerRecord {
            submission_id: obj.get("submissionId").and_then(submission_id),
            answer: answer.to_string(),
        });
    }

    Ok(records)
}

/// Pre-aggregated `{answer, count, percentage}` tuples.
pub fn answer_tuples(value: &Value) -> Result<Vec<AnswerTuple>, ValidationError> {
    let objects = objects(ANSWER_SET, value)?;
    let mut tuples = Vec::with_capacity(objects.len());

    for (index, obj) in objects.into_iter().enumerate() {
        let answer = require(ANSWER_SET, index, obj, "answer")?;
        let count = require(ANSWER_SET, index, obj, "count")?;
        let percentage = require(ANSWER_SET, index, obj, "percentage")?;

        let (Some(answer), Some(count), Some(percentage)) = (
            answer.as_str(),
            whole_number(count),
            percentage.as_f64().filter(|p| p.is_finite()),
        ) else {
            debug!("Skipping {} entry #{}: non-numeric value", ANSWER_SET, index);
            continue;
        };

        tuples.push(AnswerTuple {
            answer: answer.to_string(),
            count,
            percentage,
        });
    }

    Ok(tuples)
}

/// Picks the companion metadata at `index` out of the `/questions` list.
///
/// Metadata is optional for the answer chart, so anything unusable yields
/// `None` rather than an error.
pub fn question_meta(value: &Value, index: usize) -> Option<QuestionMeta> {
    let Some(obj) = value.as_array().and_then(|q| q.get(index)).and_then(Value::as_object) else {
        debug!("No question metadata at index {}", index);
        return None;
    };

    let question = obj
        .get("question")
        .and_then(Value::as_str)
        .map(str::to_string);

    let other_options = obj
        .get("otherOptions")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(QuestionMeta {
        question,
        other_options,
    })
}

fn objects<'a>(set: &'static str, value: &'a Value) -> Result<Vec<&'a Object>, ValidationError> {
    let items = value.as_array().ok_or(ValidationError::NotASequence {
        set,
        found: json_kind(value),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or(ValidationError::NotAnObject {
                set,
                index,
                found: json_kind(item),
            })
        })
        .collect()
}

/// A present, non-null field.
fn require<'a>(
    set: &'static str,
    index: usize,
    obj: &'a Object,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    match obj.get(field) {
        Some(Value::Null) | None => Err(ValidationError::MissingField { set, index, field }),
        Some(value) => Ok(value),
    }
}

fn submission_id(value: &Value) -> Option<SubmissionId> {
    match value {
        Value::Number(n) => Some(SubmissionId::from_number(n)),
        Value::String(s) => Some(SubmissionId::Text(s.clone())),
        _ => None,
    }
}

fn whole_number(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_age_records_valid() {
        let records = age_records(&json!([
            {"submissionId": 1, "answer": "21-25"},
            {"submissionId": "abc", "answer": "26-30", "extra": true}
        ]))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], AnswerRecord::new(1, "21-25"));
        assert_eq!(records[1].submission_id, Some(SubmissionId::from("abc")));
    }

    #[test]
    fn test_integral_float_ids_match_integer_ids() {
        let age = age_records(&json!([{"submissionId": 1.0, "answer": "21-25"}])).unwrap();
        let gender = gender_records(&json!([{"submissionId": 1, "answer": "Male"}])).unwrap();

        assert_eq!(age[0].submission_id, gender[0].submission_id);

        let table = crate::analysis::cross_tabulate_age_gender(&age, &gender);
        assert_eq!(table.male_counts[0], 1);
        assert_eq!(table.total_per_bucket[0], 1);
    }

    #[test]
    fn test_age_records_require_submission_id() {
        let err = age_records(&json!([
            {"submissionId": 1, "answer": "21-25"},
            {"answer": "26-30"}
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingField {
                set: AGE_SET,
                index: 1,
                field: "submissionId"
            }
        );
    }

    #[test]
    fn test_not_a_sequence() {
        let err = location_records(&json!({"answer": "NY"})).unwrap_err();
        assert!(matches!(err, ValidationError::NotASequence { found: "an object", .. }));

        let err = gender_records(&Value::Null).unwrap_err();
        assert!(matches!(err, ValidationError::NotASequence { found: "null", .. }));
    }

    #[test]
    fn test_element_not_an_object() {
        let err = location_records(&json!([{"answer": "NY"}, "LA"])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAnObject {
                set: LOCATION_SET,
                index: 1,
                found: "a string"
            }
        );
    }

    #[test]
    fn test_missing_answer() {
        let err = gender_records(&json!([{"submissionId": 1}])).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field: "answer", .. }));
    }

    #[test]
    fn test_non_string_answers_are_skipped() {
        let records = location_records(&json!([
            {"answer": "NY"},
            {"answer": 42},
            {"answer": ["LA"]}
        ]))
        .unwrap();

        assert_eq!(records, vec![AnswerRecord::anonymous("NY")]);
    }

    #[test]
    fn test_gender_without_id_is_kept() {
        let records = gender_records(&json!([
            {"answer": "Male"},
            {"submissionId": true, "answer": "Female"}
        ]))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.submission_id.is_none()));
    }

    #[test]
    fn test_empty_set_is_valid() {
        assert!(location_records(&json!([])).unwrap().is_empty());
        assert!(answer_tuples(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_answer_tuples() {
        let tuples = answer_tuples(&json!([
            {"answer": "Yes", "count": 3, "percentage": 60.0},
            {"answer": "No", "count": 2.0, "percentage": 40},
            {"answer": "Maybe", "count": "many", "percentage": 0.0},
            {"answer": "Later", "count": 1.5, "percentage": 0.0}
        ]))
        .unwrap();

        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].count, 3);
        assert_eq!(tuples[1].count, 2);
        assert_eq!(tuples[1].percentage, 40.0);
    }

    #[test]
    fn test_answer_tuples_require_shape() {
        let err = answer_tuples(&json!([{"answer": "Yes", "count": 1}])).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field: "percentage", .. }));
    }

    #[test]
    fn test_question_meta() {
        let questions = json!([
            {"question": "Age"},
            {"question": "Gender"},
            {"question": "Location"},
            {"question": "Favourite tool?", "otherOptions": ["Vim", 3, "Emacs"]}
        ]);

        let meta = question_meta(&questions, 3).unwrap();
        assert_eq!(meta.question.as_deref(), Some("Favourite tool?"));
        assert_eq!(meta.other_options, vec!["Vim", "Emacs"]);

        let meta = question_meta(&questions, 0).unwrap();
        assert!(meta.other_options.is_empty());

        assert!(question_meta(&questions, 9).is_none());
        assert!(question_meta(&Value::Null, 0).is_none());
    }
}
