//! The application facade.
//!
//! [`App`] bundles a [`Dispatcher`] with a default outbound sink and exposes
//! the boundary operations a transport needs: decode raw payloads, dispatch
//! them, and get back a serializable [`InvokeResponse`]. For hosts that want
//! middleware (timeouts, rate limits), [`AppService`] exposes the same entry
//! point as a `tower::Service`.
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_framework::{App, on_any, on_invoke, on_message};
//! use braze_core::InvokeName;
//!
//! let app = App::new()
//!     .with_sink(sink)
//!     .route(on_any().handler(log_all))
//!     .route(on_message().handler(echo))
//!     .route(on_invoke(InvokeName::TaskFetch).handler(fetch_task));
//!
//! let response = app.process_str(raw_json).await;
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::warn;

use braze_core::activity::{Activity, decode, decode_str};
use braze_core::dispatcher::{DispatchOutcome, Dispatcher};
use braze_core::error::{DecodeError, DispatchResult};
use braze_core::response::{ErrorBody, InvokeResponse, to_response};
use braze_core::route::Route;
use braze_core::sink::{BoxedSink, NullSink};

use crate::handler::Handler;
use crate::routes::on_activity;

/// An assembled bot application: routes plus a default outbound sink.
#[derive(Clone)]
pub struct App {
    dispatcher: Dispatcher,
    sink: BoxedSink,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an empty app whose outbound activities are dropped.
    ///
    /// Call [`with_sink`](Self::with_sink) to wire up a real transport.
    pub fn new() -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            sink: Arc::new(NullSink),
        }
    }

    /// Sets the outbound sink used by every dispatch.
    pub fn with_sink(mut self, sink: BoxedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Appends a route.
    pub fn route(mut self, route: Route) -> Self {
        self.dispatcher.register(route);
        self
    }

    /// Convenience registration keyed by discriminator value.
    ///
    /// Honors the reserved wildcard name
    /// [`WILDCARD_ROUTE`](braze_core::route::WILDCARD_ROUTE).
    pub fn on<H, T>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        let route = on_activity(name).handler(handler);
        self.route(route)
    }

    /// Returns the underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the default outbound sink.
    pub fn sink(&self) -> &BoxedSink {
        &self.sink
    }

    /// Dispatches a decoded activity, returning the raw outcome.
    ///
    /// Most transports want [`process`](Self::process) instead; this is the
    /// diagnostics-friendly entry point exposing the invoked-route count.
    pub async fn dispatch(&self, activity: Activity) -> DispatchResult<DispatchOutcome> {
        self.dispatcher
            .dispatch(activity, Arc::clone(&self.sink))
            .await
    }

    /// Processes a decoded activity into a transport-facing response.
    pub async fn process(&self, activity: Activity) -> InvokeResponse {
        self.process_with_cancel(activity, CancellationToken::new())
            .await
    }

    /// Processes a decoded activity under the given cancellation token.
    pub async fn process_with_cancel(
        &self,
        activity: Activity,
        cancel: CancellationToken,
    ) -> InvokeResponse {
        let activity_type = activity.activity_type();
        let activity_id = activity.id().unwrap_or_default().to_string();
        let result = self
            .dispatcher
            .dispatch_with_cancel(activity, Arc::clone(&self.sink), cancel)
            .await;
        if let Err(err) = &result {
            warn!(activity_id = %activity_id, error = %err, "dispatch failed");
        }
        to_response(&activity_type, &result)
    }

    /// Decodes and processes a parsed JSON payload.
    ///
    /// Decode failures are rejected before dispatch with a 400 response.
    pub async fn process_value(&self, value: &Value) -> InvokeResponse {
        match decode(value) {
            Ok(activity) => self.process(activity).await,
            Err(err) => decode_response(&err),
        }
    }

    /// Decodes and processes a raw JSON string.
    pub async fn process_str(&self, raw: &str) -> InvokeResponse {
        match decode_str(raw) {
            Ok(activity) => self.process(activity).await,
            Err(err) => decode_response(&err),
        }
    }

    /// Wraps this app in a `tower::Service`.
    pub fn into_service(self) -> AppService {
        AppService {
            app: Arc::new(self),
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("route_count", &self.dispatcher.route_count())
            .finish_non_exhaustive()
    }
}

/// Maps a decode failure to the transport-facing rejection.
///
/// The `code` field separates structurally invalid payloads
/// (`"DecodeError"`) from well-formed-but-unsupported discriminators
/// (`"UnknownVariant"`).
pub fn decode_response(err: &DecodeError) -> InvokeResponse {
    let code = if err.is_unknown_variant() {
        "UnknownVariant"
    } else {
        "DecodeError"
    };
    InvokeResponse::error(400, ErrorBody::new(code, err.to_string()))
}

// ============================================================================
// Tower Service integration
// ============================================================================

/// `tower::Service` adapter over an [`App`].
///
/// This allows applying tower middleware (timeout, rate limiting, etc.)
/// in front of the routing core:
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
/// use tower::timeout::TimeoutLayer;
///
/// let service = ServiceBuilder::new()
///     .layer(TimeoutLayer::new(Duration::from_secs(15)))
///     .service(app.into_service());
/// ```
#[derive(Clone)]
pub struct AppService {
    app: Arc<App>,
}

impl Service<Activity> for AppService {
    type Response = InvokeResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, activity: Activity) -> Self::Future {
        let app = Arc::clone(&self.app);
        Box::pin(async move { Ok(app.process(activity).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{on_any, on_invoke, on_message};
    use braze_core::activity::{ActivityContext, InvokeName, MessageActivity};
    use braze_core::context::TurnContext;
    use braze_core::sink::MemorySink;
    use serde_json::json;
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    fn echo_app(sink: Arc<MemorySink>) -> App {
        App::new()
            .with_sink(sink)
            .route(on_any().handler(|ctx: TurnContext| async move { ctx.next().await }))
            .route(on_message().handler(
                |ctx: TurnContext, msg: ActivityContext<MessageActivity>| async move {
                    ctx.reply(format!("echo: {}", msg.text)).await
                },
            ))
            .route(on_invoke(InvokeName::TaskFetch).handler(|| async move {
                json!({ "task": { "type": "continue" } })
            }))
    }

    #[tokio::test]
    async fn message_flow_replies_through_the_sink() {
        let sink = Arc::new(MemorySink::new());
        let app = echo_app(Arc::clone(&sink));

        let response = app
            .process_str(r#"{ "type": "message", "id": "m-1", "text": "hi" }"#)
            .await;
        assert_eq!(response, InvokeResponse::ack());

        let sent = sink.drain();
        assert_eq!(sent.len(), 1);
        let Activity::Message(reply) = &sent[0] else {
            panic!("expected message reply");
        };
        assert_eq!(reply.text, "echo: hi");
    }

    #[tokio::test]
    async fn invoke_flow_returns_the_handler_body() {
        let app = echo_app(Arc::new(MemorySink::new()));
        let response = app
            .process_value(&json!({ "type": "invoke", "name": "task/fetch" }))
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Some(json!({ "task": { "type": "continue" } })));
    }

    #[tokio::test]
    async fn unmatched_activity_acks_without_error() {
        let app = echo_app(Arc::new(MemorySink::new()));
        // Only the catch-all matches typing; it falls through to nothing.
        let response = app.process_value(&json!({ "type": "typing" })).await;
        assert_eq!(response, InvokeResponse::ack());

        let outcome = assert_ok!(
            app.dispatch(braze_core::activity::decode(&json!({ "type": "typing" })).unwrap())
                .await
        );
        assert_eq!(outcome.invoked, 1);
        assert_eq!(outcome.matched, 1);
    }

    #[tokio::test]
    async fn malformed_payloads_are_rejected_before_dispatch() {
        let app = echo_app(Arc::new(MemorySink::new()));

        let response = app.process_str("{oops").await;
        assert_eq!(response.status, 400);
        assert_eq!(response.body.as_ref().unwrap()["code"], "DecodeError");

        let response = app
            .process_value(&json!({ "type": "invoke", "name": "compose/query" }))
            .await;
        assert_eq!(response.status, 400);
        assert_eq!(response.body.as_ref().unwrap()["code"], "UnknownVariant");
    }

    #[tokio::test]
    async fn extraction_mismatch_surfaces_as_handler_failure() {
        // A route whose selector admits everything but whose handler
        // demands a message view.
        let app = App::new().route(on_any().handler(
            |_msg: ActivityContext<MessageActivity>| async move {},
        ));

        let response = app.process_value(&json!({ "type": "typing" })).await;
        assert_eq!(response.status, 500);
        assert_eq!(response.body.unwrap()["code"], "HandlerError");
    }

    #[tokio::test]
    async fn app_on_uses_discriminator_and_wildcard() {
        let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let hits = Arc::clone(&seen);
        let app = App::new()
            .on("activity", |ctx: TurnContext| async move { ctx.next().await })
            .on("message", move |_ctx: TurnContext| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            });

        app.process_value(&json!({ "type": "message" })).await;
        app.process_value(&json!({ "type": "typing" })).await;
        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tower_service_processes_activities() {
        let app = echo_app(Arc::new(MemorySink::new()));
        let service = app.into_service();

        let activity =
            braze_core::activity::decode(&json!({ "type": "invoke", "name": "task/fetch" }))
                .unwrap();
        let response = service.oneshot(activity).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
