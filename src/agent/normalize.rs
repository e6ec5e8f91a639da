use log::debug;
use serde_json::{Value, json};

use super::dispatch::WebhookResponse;
use super::error::DispatchError;
use super::model::ReturnType;

/// Reported for every 2xx reply of a `return_type = none` agent.
pub const TRIGGERED_MESSAGE: &str = "Agent triggered successfully";

/// Fields probed, in order, when pulling display text out of a result object.
pub const PROBE_FIELDS: [&str; 5] = ["message", "text", "response", "data", "output"];

/// Classified result of one completed dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Success with displayable text.
    Output(String),
    /// Success, but nothing displayable came back.
    Silent,
    Failure(DispatchError),
}

impl Outcome {
    pub fn from_result(result: Result<Option<String>, DispatchError>) -> Self {
        match result {
            Ok(Some(text)) => Outcome::Output(text),
            Ok(None) => Outcome::Silent,
            Err(err) => Outcome::Failure(err),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failure(_))
    }
}

/// Turns a 2xx webhook reply into the text shown on the card.
///
/// The state machine only sees this trait, so the heuristic below can be
/// swapped for a negotiated response schema without touching it.
pub trait ResponseNormalizer: Send + Sync {
    fn normalize(
        &self,
        return_type: ReturnType,
        response: &WebhookResponse,
    ) -> Result<Option<String>, DispatchError>;
}

/// Default normalizer: decode by content type, then probe well-known fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldProbeNormalizer;

impl ResponseNormalizer for FieldProbeNormalizer {
    fn normalize(
        &self,
        return_type: ReturnType,
        response: &WebhookResponse,
    ) -> Result<Option<String>, DispatchError> {
        let result = result_object(return_type, response)?;
        Ok(extract_text(&result))
    }
}

/// Builds the result object of a 2xx reply.
pub fn result_object(
    return_type: ReturnType,
    response: &WebhookResponse,
) -> Result<Value, DispatchError> {
    if return_type == ReturnType::None {
        return Ok(json!({ "success": true, "message": TRIGGERED_MESSAGE }));
    }

    let is_json = response
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.contains("application/json"));

    if is_json {
        serde_json::from_slice(&response.body).map_err(|err| {
            debug!("Declared JSON body failed to parse: {}", err);
            DispatchError::Decode(err.to_string())
        })
    } else {
        let text = String::from_utf8_lossy(&response.body).into_owned();
        Ok(json!({ "message": text, "text": text, "response": text }))
    }
}

/// Extracts display text from a result.
///
/// Strings are used as-is. Objects and arrays are probed through
/// [`PROBE_FIELDS`]; the first truthy value wins, otherwise the whole value is
/// pretty-printed. Any other top-level value yields `None`.
pub fn extract_text(result: &Value) -> Option<String> {
    match result {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => PROBE_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .find(|value| is_truthy(value))
            .map(render_value)
            .or_else(|| Some(pretty(result))),
        Value::Array(_) => Some(pretty(result)),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => pretty(value),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(content_type: Option<&str>, body: &str) -> WebhookResponse {
        WebhookResponse {
            status: 200,
            content_type: content_type.map(str::to_string),
            body: body.as_bytes().to_vec(),
        }
    }

    fn normalize(ret: ReturnType, response: &WebhookResponse) -> Result<Option<String>, DispatchError> {
        FieldProbeNormalizer.normalize(ret, response)
    }

    #[test]
    fn message_wins_over_text() {
        let response = reply(Some("application/json"), r#"{"message":"a","text":"b"}"#);
        assert_eq!(normalize(ReturnType::Text, &response).unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn unknown_object_is_pretty_printed() {
        let response = reply(Some("application/json; charset=utf-8"), r#"{"other":1}"#);
        assert_eq!(
            normalize(ReturnType::Text, &response).unwrap().as_deref(),
            Some("{\n  \"other\": 1\n}")
        );
    }

    #[test]
    fn falsy_fields_are_skipped() {
        let response = reply(
            Some("application/json"),
            r#"{"message":"","text":null,"response":0,"data":{"rows":2}}"#,
        );
        assert_eq!(
            normalize(ReturnType::Chat, &response).unwrap().as_deref(),
            Some("{\n  \"rows\": 2\n}")
        );
    }

    #[test]
    fn plain_text_is_used_directly() {
        let response = reply(Some("text/plain"), "done");
        assert_eq!(normalize(ReturnType::Text, &response).unwrap().as_deref(), Some("done"));
        let untyped = reply(None, "hi");
        assert_eq!(normalize(ReturnType::Chat, &untyped).unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn json_string_and_scalars() {
        let string = reply(Some("application/json"), r#""plain""#);
        assert_eq!(normalize(ReturnType::Text, &string).unwrap().as_deref(), Some("plain"));
        let number = reply(Some("application/json"), "42");
        assert_eq!(normalize(ReturnType::Text, &number).unwrap(), None);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let response = reply(Some("application/json"), "{not json");
        assert!(matches!(
            normalize(ReturnType::Text, &response),
            Err(DispatchError::Decode(_))
        ));
    }

    #[test]
    fn none_return_type_ignores_the_body() {
        for body in ["{not json", "", r#"{"message":"ignored"}"#] {
            let response = reply(Some("application/json"), body);
            assert_eq!(
                normalize(ReturnType::None, &response).unwrap().as_deref(),
                Some(TRIGGERED_MESSAGE)
            );
        }
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(Outcome::from_result(Ok(None)), Outcome::Silent);
        assert!(Outcome::from_result(Ok(Some(String::from("x")))).is_success());
        assert!(!Outcome::from_result(Err(DispatchError::Network(String::from("down")))).is_success());
    }
}
