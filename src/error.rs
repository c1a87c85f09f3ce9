use std::io;
use thiserror::Error;

/// Error raised when a single input line cannot be turned into an [`IndexRequest`].
///
/// [`IndexRequest`]: crate::IndexRequest
#[derive(Debug, Error)]
pub enum TransformError {
    /// The line is not valid JSON, or not valid UTF-8.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The line is valid JSON but not an object.
    #[error("expected a JSON object")]
    NotAnObject,
    /// The reserved type key is absent.
    #[error("missing field `{0}`")]
    MissingField(String),
}

/// Any failure of an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Invalid setup: a zero total, a zero chunk size, an unusable URL.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A line of the input could not be transformed.
    #[error("line {line}: {source}")]
    Transform {
        /// 1-based line number within the input file.
        line: usize,
        /// What went wrong.
        #[source]
        source: TransformError,
    },
    /// Reading the input or writing the progress bar failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The bulk-index collaborator failed.
    #[error("bulk request failed: {0}")]
    Collaborator(String),
}

impl IngestError {
    /// Constructs a configuration error with a message.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Constructs a collaborator error with a message.
    pub fn collaborator<S: Into<String>>(msg: S) -> Self {
        Self::Collaborator(msg.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let err = IngestError::Transform {
            line: 7,
            source: TransformError::MissingField(String::from("_type")),
        };
        assert_eq!(err.to_string(), "line 7: missing field `_type`");
        assert_eq!(
            IngestError::configuration("total must be positive").to_string(),
            "configuration error: total must be positive"
        );
    }
}
