//! Extractor system for the Braze framework.
//!
//! This module provides the [`FromContext`] trait, which defines how types
//! can be extracted from a [`TurnContext`] for use as handler parameters.

use std::sync::Arc;

use braze_core::activity::{Activity, ActivityContext, FromActivity};
use braze_core::context::TurnContext;
use braze_core::sink::BoxedSink;

use crate::error::ExtractError;

/// A trait for types that can be extracted from a [`TurnContext`].
///
/// Types implementing this trait can be used directly as handler function
/// parameters; extraction happens once per handler invocation.
///
/// # Error Handling
///
/// Extraction can fail if the required data is not available — most
/// commonly when a handler requests a typed activity view on a route whose
/// selector admits other variants. The failure surfaces as a handler error
/// for that dispatch.
///
/// # Example
///
/// ```rust,ignore
/// use braze_framework::{ExtractError, FromContext};
/// use braze_core::TurnContext;
///
/// struct Locale(String);
///
/// impl FromContext for Locale {
///     fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError> {
///         ctx.activity()
///             .envelope()
///             .locale
///             .clone()
///             .map(Locale)
///             .ok_or_else(|| ExtractError::custom("activity has no locale"))
///     }
/// }
/// ```
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError>;
}

/// Extracts the context itself.
///
/// This is how handlers reach `next()`, the extra bag, and `reply`.
impl FromContext for TurnContext {
    fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError> {
        Ok(ctx.clone())
    }
}

/// Extracts a shared handle to the dispatched activity.
impl FromContext for Arc<Activity> {
    fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError> {
        Ok(ctx.activity_arc())
    }
}

/// Extracts the outbound sink for this dispatch.
impl FromContext for BoxedSink {
    fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError> {
        Ok(ctx.sink_arc())
    }
}

/// Extracts a typed activity view.
///
/// ```rust,ignore
/// use braze_core::activity::{ActivityContext, InvokeActivity, MessageActivity};
///
/// // Only succeeds on message activities:
/// async fn echo(message: ActivityContext<MessageActivity>) { /* … */ }
///
/// // Succeeds on any invoke, whatever its name:
/// async fn audit(invoke: ActivityContext<InvokeActivity>) { /* … */ }
/// ```
impl<T: FromActivity> FromContext for ActivityContext<T> {
    fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError> {
        T::from_activity(ctx.activity())
            .map(ActivityContext::new)
            .ok_or_else(|| ExtractError::ActivityMismatch {
                expected: std::any::type_name::<T>(),
                got: ctx.activity().type_tag().to_string(),
            })
    }
}

/// Implementation for `Option<T>` where `T: FromContext`.
///
/// This allows handlers to take parameters that may or may not be
/// extractable from the context.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &TurnContext) -> Result<Self, ExtractError> {
        Ok(T::from_context(ctx).ok())
    }
}
