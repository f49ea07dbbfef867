//! # Braze Framework
//!
//! High-level framework components for building bot applications on the
//! Braze routing core.
//!
//! This layer provides:
//! - [`Handler`] trait for Axum-style handlers with parameter extraction
//! - [`FromContext`] extractors for handler parameters
//! - Route builders for common activity shapes (`on_message`,
//!   `on_invoke`, …)
//! - The [`App`] facade tying decode → dispatch → response together
//! - Tower `Service` integration for middleware support
//!
//! The framework layer is built on top of core types but adds ergonomics
//! that aren't strictly necessary for routing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use braze_framework::{App, on_any, on_invoke, on_message};
//! use braze_core::activity::{ActivityContext, InvokeName, MessageActivity};
//! use braze_core::TurnContext;
//!
//! async fn log_all(ctx: TurnContext) -> braze_core::HandlerResult {
//!     tracing::info!(activity = ctx.activity().type_tag(), "inbound");
//!     ctx.next().await
//! }
//!
//! async fn echo(ctx: TurnContext, msg: ActivityContext<MessageActivity>) {
//!     ctx.reply(msg.text.clone()).await.ok();
//! }
//!
//! async fn fetch_task() -> serde_json::Value {
//!     serde_json::json!({ "task": { "type": "continue" } })
//! }
//!
//! let app = App::new()
//!     .route(on_any().handler(log_all))
//!     .route(on_message().handler(echo))
//!     .route(on_invoke(InvokeName::TaskFetch).handler(fetch_task));
//! ```

pub mod app;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod routes;

pub use app::{App, AppService, decode_response};
pub use error::{ExtractError, ExtractResult};
pub use extractor::FromContext;
pub use handler::{
    BoxedHandler, ErasedHandler, Handler, HandlerFn, IntoRouteResult, into_handler,
};
pub use routes::{
    RouteBuilder, on_activity, on_any, on_conversation_update, on_event, on_invoke, on_message,
    on_message_reaction,
};
