//! Location frequency tally.

use crate::models::{AnswerRecord, LocationTally};

/// Count each distinct answer, keeping first-seen order.
///
/// Answers are used verbatim: `"NY"`, `"ny"` and `"NY "` are three
/// different locations.
pub fn tally_locations(records: &[AnswerRecord]) -> LocationTally {
    let mut tally = LocationTally::default();

    for record in records {
        *tally.entries.entry(record.answer.clone()).or_insert(0) += 1;
    }
    tally.total_count = records.len() as u64;

    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(answers: &[&str]) -> Vec<AnswerRecord> {
        answers.iter().map(|a| AnswerRecord::anonymous(a)).collect()
    }

    #[test]
    fn test_tally_locations() {
        let tally = tally_locations(&records(&["NY", "NY", "LA"]));

        assert_eq!(tally.total_count, 3);
        assert_eq!(tally.entries.get("NY"), Some(&2));
        assert_eq!(tally.entries.get("LA"), Some(&1));

        let rows = tally.rows();
        assert_eq!(rows[0].label, "NY");
        assert_eq!(rows[0].percentage_display(), "66.67%");
        assert_eq!(rows[1].label, "LA");
        assert_eq!(rows[1].percentage_display(), "33.33%");
    }

    #[test]
    fn test_empty_tally() {
        let tally = tally_locations(&[]);

        assert_eq!(tally.total_count, 0);
        assert!(tally.is_empty());
        assert!(tally.rows().is_empty());
        assert_eq!(tally.percentage("NY"), None);
    }

    #[test]
    fn test_first_seen_order() {
        let tally = tally_locations(&records(&["Berlin", "Austin", "Berlin", "Cairo", "Austin"]));
        let labels: Vec<_> = tally.entries.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["Berlin", "Austin", "Cairo"]);
    }

    #[test]
    fn test_no_normalization() {
        let tally = tally_locations(&records(&["NY", "ny", "NY "]));
        assert_eq!(tally.entries.len(), 3);
        assert!(tally.entries.values().all(|&count| count == 1));
    }

    #[test]
    fn test_counts_sum_to_input_length() {
        let input = records(&["A", "B", "A", "C", "A", "B", "D"]);
        let tally = tally_locations(&input);

        assert_eq!(tally.entries.values().sum::<u64>(), input.len() as u64);
        assert_eq!(tally.total_count, input.len() as u64);
        for row in tally.rows() {
            let pct = row.percentage.unwrap();
            assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn test_idempotent() {
        let input = records(&["NY", "LA", "NY"]);
        assert_eq!(tally_locations(&input), tally_locations(&input));
    }
}
