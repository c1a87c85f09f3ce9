use crate::TransformError;
use serde_json::{Map, Value};
use std::fmt;

/// Key naming the document type in the default input layout.
pub const DEFAULT_TYPE_KEY: &str = "_type";

/// Bulk operation requested for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// Add or overwrite the document.
    Index,
}

impl OpType {
    /// Name of the operation as used in bulk action lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single document to be sent to the bulk endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    /// Always [`OpType::Index`].
    pub op_type: OpType,
    /// Target index, the same for the whole run.
    pub index: String,
    /// Document type extracted from the input record, passed on as found.
    pub doc_type: Value,
    /// Remaining fields of the input record.
    pub source: Map<String, Value>,
}

/// Turns raw JSON lines into [`IndexRequest`]s.
///
/// Stateless: every call to [`RecordTransformer::transform`] depends only on its argument.
///
/// # Examples
///
/// ```
/// # use elastic_push::RecordTransformer;
/// # use serde_json::json;
/// let transformer = RecordTransformer::new("idx");
/// let request = transformer.transform(r#"{"_type":"a","x":1}"#).unwrap();
/// assert_eq!(request.index, "idx");
/// assert_eq!(request.doc_type, "a");
/// assert_eq!(serde_json::Value::Object(request.source), json!({"x": 1}));
/// ```
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    index: String,
    type_key: String,
}

impl RecordTransformer {
    /// Transformer targeting `index`, reading the type from [`DEFAULT_TYPE_KEY`].
    pub fn new<S: Into<String>>(index: S) -> Self {
        Self {
            index: index.into(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
        }
    }

    /// Changes the reserved key holding the document type.
    pub fn type_key<S: Into<String>>(mut self, type_key: S) -> Self {
        self.type_key = type_key.into();
        self
    }

    /// Parses `line` and splits off the type key.
    ///
    /// # Errors
    ///
    /// Returns an error when:
    /// - the line is not valid JSON,
    /// - it is not a JSON object,
    /// - the type key is missing.
    pub fn transform(&self, line: &str) -> Result<IndexRequest, TransformError> {
        self.transform_bytes(line.as_bytes())
    }

    /// Same as [`RecordTransformer::transform`] for a line not yet known to be UTF-8.
    ///
    /// # Errors
    ///
    /// See [`RecordTransformer::transform`]; invalid UTF-8 is a parse error.
    pub fn transform_bytes(&self, line: &[u8]) -> Result<IndexRequest, TransformError> {
        let mut source = match serde_json::from_slice::<Value>(line)? {
            Value::Object(object) => object,
            _ => return Err(TransformError::NotAnObject),
        };
        let doc_type = source
            .remove(&self.type_key)
            .ok_or_else(|| TransformError::MissingField(self.type_key.clone()))?;
        Ok(IndexRequest {
            op_type: OpType::Index,
            index: self.index.clone(),
            doc_type,
            source,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;
    use serde_json::json;

    #[test]
    fn test_strips_type_key() {
        let transformer = RecordTransformer::new("idx");
        let request = transformer
            .transform(r#"{"_type":"b","y":2,"nested":{"_type":"kept"}}"#)
            .unwrap();
        assert_eq!(request.op_type, OpType::Index);
        assert_eq!(request.index, "idx");
        assert_eq!(request.doc_type, "b");
        assert_eq!(
            Value::Object(request.source),
            json!({"y": 2, "nested": {"_type": "kept"}})
        );
    }

    #[test]
    fn test_custom_type_key() {
        let transformer = RecordTransformer::new("idx").type_key("kind");
        let request = transformer
            .transform(r#"{"kind":"card","_type":"x"}"#)
            .unwrap();
        assert_eq!(request.doc_type, "card");
        assert_eq!(Value::Object(request.source), json!({"_type": "x"}));
    }

    #[test]
    fn test_invalid_lines() {
        let transformer = RecordTransformer::new("idx");
        assert!(matches!(
            transformer.transform("{not json"),
            Err(TransformError::Parse(_))
        ));
        assert!(matches!(
            transformer.transform(""),
            Err(TransformError::Parse(_))
        ));
        assert!(matches!(
            transformer.transform("[1, 2]"),
            Err(TransformError::NotAnObject)
        ));
        assert!(matches!(
            transformer.transform(r#"{"x":1}"#),
            Err(TransformError::MissingField(key)) if key == "_type"
        ));
        assert!(matches!(
            transformer.transform_bytes(b"{\"_type\":\"a\",\"x\":\"\xff\"}"),
            Err(TransformError::Parse(_))
        ));
    }

    #[test]
    fn test_non_string_type_is_passed_on() {
        let request = RecordTransformer::new("idx")
            .transform(r#"{"_type":1,"x":1}"#)
            .unwrap();
        assert_eq!(request.doc_type, json!(1));
        assert_eq!(Value::Object(request.source), json!({"x": 1}));
    }

    #[quickcheck]
    fn source_is_record_without_type_key(doc_type: String, fields: Vec<(String, i64)>) -> bool {
        let mut record: Map<String, Value> = fields
            .into_iter()
            .filter(|(key, _)| key != DEFAULT_TYPE_KEY)
            .map(|(key, value)| (key, Value::from(value)))
            .collect();
        let expected = record.clone();
        record.insert(DEFAULT_TYPE_KEY.to_string(), Value::from(doc_type.clone()));
        let line = Value::Object(record).to_string();
        match RecordTransformer::new("idx").transform(&line) {
            Ok(request) => request.doc_type == Value::from(doc_type) && request.source == expected,
            Err(_) => false,
        }
    }
}
