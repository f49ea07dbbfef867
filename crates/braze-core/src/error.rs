//! Unified error types for the Braze core.
//!
//! This module provides standardized error types used across core components.
//! Framework-level errors (like ExtractError) are defined in braze-framework.

use thiserror::Error;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors that can occur while decoding a raw payload into an [`Activity`].
///
/// Decode errors are surfaced to the caller before dispatch begins; a payload
/// that fails to decode is never routed.
///
/// [`Activity`]: crate::activity::Activity
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The raw payload is not valid JSON.
    #[error("activity payload is not valid JSON: {0}")]
    Json(String),

    /// The payload lacks a required field.
    #[error("activity is missing required field '{field}'")]
    MissingField {
        /// The missing field name.
        field: &'static str,
    },

    /// A recognized variant failed to deserialize.
    #[error("failed to deserialize {kind} activity: {reason}")]
    Invalid {
        /// The activity type tag being decoded.
        kind: String,
        /// Reason for failure.
        reason: String,
    },

    /// An invoke activity arrived without a `name` property.
    #[error("invoke activity must have a 'name'")]
    MissingInvokeName,

    /// An invoke activity carried a `name` that is not a string.
    #[error("failed to deserialize invoke activity 'name' property")]
    MalformedInvokeName,

    /// An invoke activity carried a `name` outside the known set.
    ///
    /// This is deliberately distinct from [`MalformedInvokeName`]: callers
    /// can tell "malformed" apart from "not yet supported".
    ///
    /// [`MalformedInvokeName`]: DecodeError::MalformedInvokeName
    #[error("invoke activity name '{name}' doesn't match any known types")]
    UnknownInvokeName {
        /// The unrecognized invoke name.
        name: String,
    },
}

impl DecodeError {
    /// Returns `true` if the discriminator was present and well-formed but
    /// not recognized (as opposed to structurally invalid input).
    pub fn is_unknown_variant(&self) -> bool {
        matches!(self, Self::UnknownInvokeName { .. })
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors that can occur while delivering an outbound activity.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// Delivery to the transport failed.
    #[error("failed to deliver activity: {0}")]
    Delivery(String),

    /// The sink is no longer accepting activities.
    #[error("activity sink is closed")]
    Closed,
}

// =============================================================================
// Handler Errors
// =============================================================================

/// Error raised by a route handler during dispatch.
///
/// A handler error aborts the remaining chain for that dispatch only; it is
/// mapped to an error response at the boundary and never retried by the
/// router itself.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// A handler-specific failure.
    #[error("{0}")]
    Message(String),

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Delivering an outbound activity failed.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A downstream route invoked via `next()` failed.
    ///
    /// Propagating this variant with `?` preserves the failing route's
    /// attribution instead of re-blaming the current route.
    #[error(transparent)]
    Dispatch(Box<DispatchError>),
}

impl HandlerError {
    /// Creates a handler error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<DispatchError> for HandlerError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(Box::new(err))
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors that abort one dispatch.
///
/// A dispatch error never corrupts the router's route list and never affects
/// other in-flight dispatches.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A route handler failed.
    #[error("route '{route}' failed while handling activity '{activity_id}': {message}")]
    Handler {
        /// Name of the failing route ("unnamed" when the route has none).
        route: String,
        /// Id of the activity being dispatched (empty when the envelope has none).
        activity_id: String,
        /// Reason for failure.
        message: String,
    },

    /// The dispatch's cancellation signal fired.
    #[error("dispatch was cancelled")]
    Cancelled,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// The value a route handler resolves to.
///
/// `Some(value)` records a structured reply body (meaningful for
/// invoke-style activities); `None` falls through to whatever the
/// downstream chain produced.
pub type HandlerResult = Result<Option<serde_json::Value>, HandlerError>;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
