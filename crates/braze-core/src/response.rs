//! Transport-facing response aggregation.
//!
//! Invoke-style interactions require exactly one structured body and a
//! numeric status; fire-and-forget activities (message, event, …) require
//! only an acknowledgement. [`to_response`] adapts a dispatch result into
//! that shape so the transport layer only ever serializes one thing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::ActivityType;
use crate::dispatcher::DispatchOutcome;
use crate::error::DispatchError;

/// The response returned to the transport layer for one inbound activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// Structured reply body, when the interaction carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl InvokeResponse {
    /// A successful empty acknowledgement.
    pub fn ack() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    /// A successful response carrying a body.
    pub fn with_body(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    /// An error response carrying a serializable error payload.
    pub fn error(status: u16, body: ErrorBody) -> Self {
        Self {
            status,
            body: Some(serde_json::to_value(body).unwrap_or(Value::Null)),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Serializable error payload for failed dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error class ("HandlerError", "Cancelled",
    /// "DecodeError", "UnknownVariant").
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorBody {
    /// Creates an error payload.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Adapts a dispatch result into the transport-facing response.
///
/// - a matched-and-handled invoke with a body → 200 + body;
/// - everything else that succeeded — invoke without a body, fire-and-forget
///   activities (any body a handler returned is dropped), and the zero-match
///   case — → 200 empty acknowledgement;
/// - a dispatch error → 500 with an [`ErrorBody`] whose `code` separates
///   handler failure from cancellation.
pub fn to_response(
    activity_type: &ActivityType,
    result: &Result<DispatchOutcome, DispatchError>,
) -> InvokeResponse {
    match result {
        Ok(outcome) => match (activity_type, &outcome.body) {
            (ActivityType::Invoke, Some(body)) => InvokeResponse::with_body(body.clone()),
            _ => InvokeResponse::ack(),
        },
        Err(err) => {
            let code = match err {
                DispatchError::Handler { .. } => "HandlerError",
                DispatchError::Cancelled => "Cancelled",
            };
            InvokeResponse::error(500, ErrorBody::new(code, err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(body: Option<Value>, invoked: usize) -> DispatchOutcome {
        DispatchOutcome {
            body,
            invoked,
            matched: invoked,
        }
    }

    #[test]
    fn invoke_with_body_returns_the_body() {
        let response = to_response(
            &ActivityType::Invoke,
            &Ok(outcome(Some(json!({ "task": "continue" })), 1)),
        );
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Some(json!({ "task": "continue" })));
    }

    #[test]
    fn invoke_without_body_acks() {
        let response = to_response(&ActivityType::Invoke, &Ok(outcome(None, 1)));
        assert_eq!(response, InvokeResponse::ack());
    }

    #[test]
    fn fire_and_forget_drops_handler_bodies() {
        let response = to_response(&ActivityType::Message, &Ok(outcome(Some(json!(1)), 1)));
        assert_eq!(response, InvokeResponse::ack());
    }

    #[test]
    fn no_match_is_a_successful_ack() {
        let response = to_response(&ActivityType::Message, &Ok(outcome(None, 0)));
        assert!(response.is_success());
        assert_eq!(response.body, None);
    }

    #[test]
    fn handler_error_maps_to_500_with_payload() {
        let err = DispatchError::Handler {
            route: "broken".into(),
            activity_id: "a-1".into(),
            message: "boom".into(),
        };
        let response = to_response(&ActivityType::Invoke, &Err(err));
        assert_eq!(response.status, 500);
        let body = response.body.unwrap();
        assert_eq!(body["code"], "HandlerError");
        assert!(body["message"].as_str().unwrap().contains("broken"));
    }

    #[test]
    fn cancellation_is_distinguishable_from_failure() {
        let response = to_response(&ActivityType::Message, &Err(DispatchError::Cancelled));
        assert_eq!(response.status, 500);
        assert_eq!(response.body.unwrap()["code"], "Cancelled");
    }

    #[test]
    fn response_serializes_without_null_body() {
        let wire = serde_json::to_value(InvokeResponse::ack()).unwrap();
        assert_eq!(wire, json!({ "status": 200 }));
    }
}
