//! # Braze Core
//!
//! The core activity-routing engine of the Braze bot SDK.
//!
//! This crate provides the fundamental building blocks for receiving
//! conversational activities from a chat platform, matching them against
//! registered routes, and producing transport-facing responses.
//!
//! ## Architecture
//!
//! All activities flow through the central [`Dispatcher`]:
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌───────────────────────────────┐
//! │ Transport │───▶│  decode()  │───▶│ Dispatcher ──▶ Route ──next()──▶ Route │
//! │ (HTTP/WS) │    │ (Activity) │    │            └──▶ to_response() │
//! └───────────┘    └────────────┘    └───────────────────────────────┘
//! ```
//!
//! - **Activity model**: a closed tagged union keyed by the `type`
//!   discriminator, with invoke activities keyed further by `name`
//!   ([`Activity`], [`activity::decode`]).
//! - **Routes**: `(selector, handler)` pairs registered in order
//!   ([`Route`], [`Router`]).
//! - **Dispatch**: the matched chain runs through an explicit
//!   [`TurnContext::next`] continuation; handlers short-circuit by not
//!   calling it.
//! - **Responses**: [`response::to_response`] adapts the outcome into a
//!   status + body for the transport.
//!
//! ## Example
//!
//! ```rust,ignore
//! use braze_core::{Dispatcher, Route, TurnContext, activity, sink::NullSink};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = Dispatcher::new()
//!         // Catch-all logger, registered first so it runs first.
//!         .with(Route::new(|ctx: TurnContext| async move {
//!             tracing::info!(activity = ctx.activity().type_tag(), "inbound");
//!             ctx.next().await
//!         }).name("activity"))
//!         // Echo handler for messages.
//!         .with(Route::new(|ctx: TurnContext| async move {
//!             ctx.reply("hello!").await?;
//!             Ok(None)
//!         }).name("message").on("message"));
//!
//!     let activity = activity::decode_str(r#"{"type":"message","text":"hi"}"#)?;
//!     let outcome = dispatcher.dispatch(activity, Arc::new(NullSink)).await?;
//!     assert_eq!(outcome.invoked, 2);
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod response;
pub mod route;
pub mod router;
pub mod sink;

pub use activity::{
    Account, Activity, ActivityContext, ActivityType, Conversation, Envelope, FromActivity,
    InvokeActivity, InvokeName, InvokePayload, decode, decode_str,
};
pub use context::{TurnContext, TurnState};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{
    DecodeError, DecodeResult, DispatchError, DispatchResult, HandlerError, HandlerResult,
    SinkError, SinkResult,
};
pub use response::{ErrorBody, InvokeResponse, to_response};
pub use route::{Route, RouteFuture, SelectorFn, WILDCARD_ROUTE};
pub use router::Router;
pub use sink::{ActivitySink, BoxedSink, MemorySink, NullSink};

/// Prelude for common imports.
pub mod prelude {
    pub use super::activity::{
        Activity, ActivityContext, ActivityType, FromActivity, InvokeActivity, InvokeName,
        decode, decode_str,
    };
    pub use super::context::TurnContext;
    pub use super::dispatcher::{DispatchOutcome, Dispatcher};
    pub use super::error::{DispatchError, HandlerError, HandlerResult};
    pub use super::response::{InvokeResponse, to_response};
    pub use super::route::{Route, WILDCARD_ROUTE};
    pub use super::router::Router;
    pub use super::sink::{ActivitySink, BoxedSink, MemorySink, NullSink};
}
