//! Error types.
//!
//! Validation of upstream payloads and fetching them are kept apart:
//! the `api` module is the only producer of [`FetchError`], and the
//! boundary validators in `analysis::validate` are the only producers
//! of [`ValidationError`].

use serde_json::Value;
use thiserror::Error;

/// An input record set does not have the shape the pipeline expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{set}: expected an array of records, found {found}")]
    NotASequence { set: &'static str, found: &'static str },

    #[error("{set}[{index}]: expected an object, found {found}")]
    NotAnObject {
        set: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error("{set}[{index}]: missing required field `{field}`")]
    MissingField {
        set: &'static str,
        index: usize,
        field: &'static str,
    },
}

/// Failure reaching the survey API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("cannot connect to {url}")]
    Connect { url: String },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Classify a reqwest send error the way users need to read it.
    pub fn from_send(url: &str, seconds: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds,
            }
        } else if err.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Why a single chart could not be built.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Human readable JSON type name, used in validation messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::NotASequence {
            set: "age records",
            found: json_kind(&Value::Null),
        };
        assert_eq!(
            err.to_string(),
            "age records: expected an array of records, found null"
        );

        let err = ValidationError::MissingField {
            set: "age records",
            index: 3,
            field: "submissionId",
        };
        assert_eq!(
            err.to_string(),
            "age records[3]: missing required field `submissionId`"
        );
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!([])), "an array");
        assert_eq!(json_kind(&json!({})), "an object");
        assert_eq!(json_kind(&json!("x")), "a string");
        assert_eq!(json_kind(&json!(1)), "a number");
        assert_eq!(json_kind(&json!(true)), "a boolean");
    }

    #[test]
    fn test_chart_error_is_transparent() {
        let err: ChartError = ValidationError::NotAnObject {
            set: "location records",
            index: 0,
            found: "a string",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "location records[0]: expected an object, found a string"
        );
    }

    #[tokio::test]
    async fn test_builder_error_is_transport() {
        // An unparsable URL fails before any connection is attempted.
        let err = reqwest::Client::new()
            .get("http://[invalid")
            .send()
            .await
            .unwrap_err();

        let fetch = FetchError::from_send("http://[invalid", 30, err);
        assert!(matches!(fetch, FetchError::Transport { .. }));
        assert!(fetch.to_string().starts_with("request to http://[invalid failed"));
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "http://survey.test/answers/0".to_string(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "http://survey.test/answers/0 returned HTTP 503 Service Unavailable: down"
        );
    }
}
