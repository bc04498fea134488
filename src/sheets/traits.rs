use async_trait::async_trait;
use serde_json::Value;

use super::Sheet;
use crate::deserializers::is_truthy;
use crate::error::Result;

/// Decoded reply from the spreadsheet proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// An array or object body without an error marker.
    Records(Value),
    /// The proxy answered 200 but reported a failure in its `error` field.
    Error(String),
    /// A scalar or null body.
    UnexpectedShape(Value),
}

impl UpstreamReply {
    pub fn classify(body: Value) -> Self {
        if let Some(err) = body.get("error").filter(|e| is_truthy(e)) {
            let message = err
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return UpstreamReply::Error(message);
        }
        match body {
            Value::Array(_) | Value::Object(_) => UpstreamReply::Records(body),
            other => UpstreamReply::UnexpectedShape(other),
        }
    }
}

/// Transport to the spreadsheet proxy. `Err` is reserved for failures to
/// obtain a reply at all (network, non-OK status, undecodable body).
#[async_trait]
pub trait SheetBackend: Send + Sync {
    async fn fetch(&self, sheet: Sheet) -> Result<UpstreamReply>;

    async fn submit(&self, sheet: Sheet, envelope: Value) -> Result<UpstreamReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_wins() {
        let reply = UpstreamReply::classify(json!({ "error": "Sheet missing", "data": [] }));
        assert_eq!(reply, UpstreamReply::Error("Sheet missing".into()));
    }

    #[test]
    fn falsy_error_field_is_ignored() {
        let body = json!({ "error": null, "data": [1] });
        assert_eq!(
            UpstreamReply::classify(body.clone()),
            UpstreamReply::Records(body)
        );
        let body = json!({ "error": "", "success": true });
        assert_eq!(
            UpstreamReply::classify(body.clone()),
            UpstreamReply::Records(body)
        );
    }

    #[test]
    fn non_string_error_is_stringified() {
        let reply = UpstreamReply::classify(json!({ "error": { "code": 7 } }));
        assert_eq!(reply, UpstreamReply::Error(r#"{"code":7}"#.into()));
    }

    #[test]
    fn scalars_are_unexpected() {
        assert_eq!(
            UpstreamReply::classify(json!(null)),
            UpstreamReply::UnexpectedShape(json!(null))
        );
        assert_eq!(
            UpstreamReply::classify(json!("ok")),
            UpstreamReply::UnexpectedShape(json!("ok"))
        );
    }
}
