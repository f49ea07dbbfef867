//! # Braze
//!
//! An SDK for building chat-platform bots around an explicit
//! activity-routing core.
//!
//! ## Overview
//!
//! Braze receives conversational "activities" — polymorphic message
//! envelopes from a chat platform — decodes them into a closed tagged
//! union, matches them against registered routes in registration order,
//! and runs the matched handlers through an explicit `next()` continuation.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    ┌──────────────┐    ┌─────────────────────────────────────┐
//! │ Transport │───▶│ App / decode │───▶│ Route "activity" (logger, next())   │
//! │ (HTTP/WS) │◀───│ to_response  │    │ Route "message"  (echo)             │
//! └───────────┘    └──────────────┘    │ Route "task/fetch" (invoke body)    │
//!        ▲                             └─────────────────────────────────────┘
//!        └────────── ActivitySink ◀────────── ctx.reply() / ctx.send()
//! ```
//!
//! - **braze-core**: activity model, routes, dispatch pipeline, responses
//! - **braze-framework**: Axum-style handlers, route builders, the [`App`]
//!   facade, tower integration
//! - **braze-runtime**: configuration, logging, and the queue-fed runtime
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use braze::prelude::*;
//!
//! async fn log_all(ctx: TurnContext) -> HandlerResult {
//!     tracing::info!(activity = ctx.activity().type_tag(), "inbound");
//!     ctx.next().await
//! }
//!
//! async fn echo(ctx: TurnContext, msg: ActivityContext<MessageActivity>) {
//!     ctx.reply(msg.text.clone()).await.ok();
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::new()
//!         .route(on_any().handler(log_all))
//!         .route(on_message().handler(echo));
//!
//!     let runtime = BrazeRuntime::new(app);
//!     let handle = runtime.handle();     // give this to your transport
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `json-log`: newline-delimited JSON log output
//!
//! [`App`]: braze_framework::App

pub use braze_core as core;
pub use braze_framework as framework;
pub use braze_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use braze::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use braze_runtime::{BrazeConfig, BrazeRuntime, LoggingBuilder, RuntimeHandle};

    // App facade and route builders
    pub use braze_framework::{
        App, Handler, IntoRouteResult, RouteBuilder, on_activity, on_any,
        on_conversation_update, on_event, on_invoke, on_message, on_message_reaction,
    };

    // Extractors - for handler parameters
    pub use braze_framework::{ExtractError, FromContext};

    // Activity model
    pub use braze_core::activity::{
        Account, Activity, ActivityContext, ActivityType, Conversation, Envelope, FromActivity,
        InvokeActivity, InvokeName, InvokePayload, MessageActivity, decode, decode_str,
    };

    // Dispatch types
    pub use braze_core::{
        DispatchError, DispatchOutcome, Dispatcher, HandlerError, HandlerResult, InvokeResponse,
        Route, Router, TurnContext, WILDCARD_ROUTE,
    };

    // Sinks - for wiring transports and tests
    pub use braze_core::sink::{ActivitySink, BoxedSink, MemorySink, NullSink};
}
