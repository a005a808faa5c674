//! Shared percentage helpers.

/// `count / total * 100`, or `None` when `total` is zero.
pub fn share(count: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(count as f64 / total as f64 * 100.0)
    }
}

/// Formats a percentage with two decimals and a `%` sign.
///
/// "No data" renders as `-` so empty buckets show blank instead of `NaN%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share() {
        assert_eq!(share(1, 4), Some(25.0));
        assert_eq!(share(0, 4), Some(0.0));
        assert_eq!(share(3, 3), Some(100.0));
        assert_eq!(share(0, 0), None);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(share(2, 3)), "66.67%");
        assert_eq!(format_percent(share(1, 3)), "33.33%");
        assert_eq!(format_percent(Some(12.5)), "12.50%");
        assert_eq!(format_percent(None), "-");
        assert_eq!(format_percent(Some(f64::NAN)), "-");
    }
}
