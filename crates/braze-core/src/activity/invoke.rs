//! Invoke activities and their typed payloads.
//!
//! Invoke activities carry a secondary discriminator (`name`) that selects a
//! further subtype. Decoding is strict about the discriminator itself — a
//! missing, malformed, or unrecognized `name` fails fast instead of silently
//! degrading to a generic invoke — while the payload structs deserialize
//! leniently, since platforms routinely omit optional fields.
//!
//! The raw `value` JSON is preserved on the activity, so the generic invoke
//! view exposes exactly what arrived on the wire even after the payload has
//! been decoded into its typed form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::Envelope;
use crate::activity::types::InvokeName;
use crate::error::{DecodeError, DecodeResult};

// ============================================================================
// InvokeActivity
// ============================================================================

/// A request/response-style activity requiring a structured reply body.
///
/// `Deref` → [`Envelope`], so `invoke.conversation` and friends work
/// directly. The typed payload is reachable through
/// [`payload`](Self::payload); the raw wire value through
/// [`value`](Self::value).
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeActivity {
    /// Common envelope fields (id, from, recipient, …).
    pub envelope: Envelope,
    payload: InvokePayload,
    value: Value,
}

impl InvokeActivity {
    /// Builds an invoke activity from already-decoded parts.
    pub fn new(envelope: Envelope, payload: InvokePayload, value: Value) -> Self {
        Self {
            envelope,
            payload,
            value,
        }
    }

    /// The secondary discriminator that selected this invoke's subtype.
    pub fn name(&self) -> InvokeName {
        self.payload.name()
    }

    /// The typed payload decoded for this invoke's `name`.
    pub fn payload(&self) -> &InvokePayload {
        &self.payload
    }

    /// The raw `value` property exactly as received.
    ///
    /// This is the less-specific base view: it is non-null whenever the wire
    /// payload carried a value, regardless of which subtype was decoded.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Deserializes the raw `value` property into a caller-chosen type.
    pub fn value_as<T: serde::de::DeserializeOwned>(&self) -> DecodeResult<T> {
        serde_json::from_value(self.value.clone()).map_err(|err| DecodeError::Invalid {
            kind: format!("invoke '{}'", self.name()),
            reason: err.to_string(),
        })
    }

    /// Serializes this activity back into its wire object (sans `type` tag).
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut wire = serde_json::to_value(&self.envelope)?;
        if let Value::Object(map) = &mut wire {
            map.insert("name".into(), Value::String(self.name().as_str().into()));
            if !self.value.is_null() {
                map.insert("value".into(), self.value.clone());
            }
        }
        Ok(wire)
    }
}

impl std::ops::Deref for InvokeActivity {
    type Target = Envelope;

    fn deref(&self) -> &Envelope {
        &self.envelope
    }
}

// ============================================================================
// InvokePayload
// ============================================================================

/// The typed payload behind each known invoke name.
///
/// One variant per [`InvokeName`], so handlers can match exhaustively and
/// the compiler flags any name added without a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokePayload {
    /// `task/fetch`
    TaskFetch(TaskModuleRequest),
    /// `task/submit`
    TaskSubmit(TaskModuleRequest),
    /// `message/submitAction`
    MessageSubmitAction(MessageSubmitAction),
    /// `signin/verifyState`
    SigninVerifyState(SigninStateVerification),
    /// `signin/tokenExchange`
    SigninTokenExchange(TokenExchangeRequest),
    /// `adaptiveCard/action`
    AdaptiveCardAction(AdaptiveCardInvokeValue),
    /// `config/fetch` — configuration payloads are passed through untyped.
    ConfigFetch(Value),
    /// `config/submit`
    ConfigSubmit(Value),
    /// `application/search`
    ApplicationSearch(SearchQuery),
}

impl InvokePayload {
    /// Decodes the typed payload for a recognized invoke name.
    pub(crate) fn decode(name: InvokeName, value: &Value) -> DecodeResult<Self> {
        Ok(match name {
            InvokeName::TaskFetch => Self::TaskFetch(lenient(name, value)?),
            InvokeName::TaskSubmit => Self::TaskSubmit(lenient(name, value)?),
            InvokeName::MessageSubmitAction => Self::MessageSubmitAction(lenient(name, value)?),
            InvokeName::SigninVerifyState => Self::SigninVerifyState(lenient(name, value)?),
            InvokeName::SigninTokenExchange => Self::SigninTokenExchange(lenient(name, value)?),
            InvokeName::AdaptiveCardAction => Self::AdaptiveCardAction(lenient(name, value)?),
            InvokeName::ConfigFetch => Self::ConfigFetch(value.clone()),
            InvokeName::ConfigSubmit => Self::ConfigSubmit(value.clone()),
            InvokeName::ApplicationSearch => Self::ApplicationSearch(lenient(name, value)?),
        })
    }

    /// The invoke name this payload was decoded for.
    pub fn name(&self) -> InvokeName {
        match self {
            Self::TaskFetch(_) => InvokeName::TaskFetch,
            Self::TaskSubmit(_) => InvokeName::TaskSubmit,
            Self::MessageSubmitAction(_) => InvokeName::MessageSubmitAction,
            Self::SigninVerifyState(_) => InvokeName::SigninVerifyState,
            Self::SigninTokenExchange(_) => InvokeName::SigninTokenExchange,
            Self::AdaptiveCardAction(_) => InvokeName::AdaptiveCardAction,
            Self::ConfigFetch(_) => InvokeName::ConfigFetch,
            Self::ConfigSubmit(_) => InvokeName::ConfigSubmit,
            Self::ApplicationSearch(_) => InvokeName::ApplicationSearch,
        }
    }
}

/// Deserializes a payload struct, treating a missing/null value as defaults.
fn lenient<T>(name: InvokeName, value: &Value) -> DecodeResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value.clone()).map_err(|err| DecodeError::Invalid {
        kind: format!("invoke '{name}'"),
        reason: err.to_string(),
    })
}

// ============================================================================
// Decode entry point
// ============================================================================

/// Decodes the invoke branch of the activity model.
///
/// Discriminator rules, in order:
/// 1. missing `name` → [`DecodeError::MissingInvokeName`]
/// 2. `name` present but not a string → [`DecodeError::MalformedInvokeName`]
/// 3. `name` outside the known set → [`DecodeError::UnknownInvokeName`]
/// 4. otherwise decode the typed payload for that name.
pub(crate) fn decode_invoke(value: &Value) -> DecodeResult<InvokeActivity> {
    let name_field = value.get("name").ok_or(DecodeError::MissingInvokeName)?;
    let name_str = name_field
        .as_str()
        .ok_or(DecodeError::MalformedInvokeName)?;
    let name = InvokeName::from_name(name_str).ok_or_else(|| DecodeError::UnknownInvokeName {
        name: name_str.to_string(),
    })?;

    let envelope: Envelope =
        serde_json::from_value(value.clone()).map_err(|err| DecodeError::Invalid {
            kind: "invoke".to_string(),
            reason: err.to_string(),
        })?;
    let raw_value = value.get("value").cloned().unwrap_or(Value::Null);
    let payload = InvokePayload::decode(name, &raw_value)?;

    Ok(InvokeActivity::new(envelope, payload, raw_value))
}

// ============================================================================
// Typed payloads
// ============================================================================

/// Payload of `task/fetch` and `task/submit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskModuleRequest {
    /// Caller-supplied data attached to the task module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Client context (theme etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<TaskModuleContext>,
}

/// Client context accompanying a task module request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskModuleContext {
    /// The client's current theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Payload of `message/submitAction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSubmitAction {
    /// The action taken on the message (e.g. "feedback").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    /// Action-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_value: Option<Value>,
}

/// Payload of `signin/verifyState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninStateVerification {
    /// The state string round-tripped through the sign-in flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Payload of `signin/tokenExchange`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    /// Correlation id supplied by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The OAuth connection being exchanged against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    /// The token to exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Payload of `adaptiveCard/action`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveCardInvokeValue {
    /// The card action that was executed.
    #[serde(default)]
    pub action: AdaptiveCardInvokeAction,
}

/// The action portion of an `adaptiveCard/action` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveCardInvokeAction {
    /// Action type (usually "Action.Execute").
    #[serde(rename = "type", default)]
    pub action_type: String,
    /// Card-declared verb identifying the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    /// Data attached to the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Payload of `application/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// The text being searched for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    /// Paging options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_options: Option<SearchQueryOptions>,
    /// The kind of search ("search", "typeahead").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Paging options for an `application/search` query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryOptions {
    /// Number of results to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    /// Maximum number of results to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
}
