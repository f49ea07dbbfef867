//! Activity dispatcher.
//!
//! This module provides the [`Dispatcher`], which is responsible for
//! receiving decoded activities and running them through the matched routes.
//!
//! # Continuation-based Dispatch
//!
//! For each activity the dispatcher selects the matching routes (in
//! registration order) and invokes only the **first** one. Everything after
//! that is handler-driven:
//!
//! 1. A handler that calls [`TurnContext::next`] hands control to the route
//!    at the following position.
//! 2. A handler that does not call `next()` short-circuits: the remaining
//!    matched routes are skipped for this dispatch.
//! 3. Past the end of the matched list, `next()` resolves to `Ok(None)`
//!    without invoking anything.
//!
//! Result aggregation follows last-non-null semantics: a handler returning
//! a value records it; a handler returning `None` yields whatever the chain
//! below it recorded.
//!
//! ```rust,ignore
//! use braze_core::{Dispatcher, Route};
//!
//! let mut dispatcher = Dispatcher::new();
//!
//! // Catch-all logger, registered first so it runs first.
//! dispatcher.register(Route::new(|ctx| async move {
//!     tracing::info!(activity = ctx.activity().type_tag(), "inbound");
//!     ctx.next().await
//! }).name("activity"));
//!
//! // Specific handler; not calling next() stops the chain here.
//! dispatcher.register(Route::new(|ctx| async move {
//!     ctx.reply("hello").await?;
//!     Ok(None)
//! }).name("message").on("message"));
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, span};

use crate::activity::Activity;
use crate::context::{TurnContext, TurnState};
use crate::error::{DispatchError, DispatchResult};
use crate::route::Route;
use crate::router::Router;
use crate::sink::BoxedSink;

/// What one dispatch produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// The aggregated reply body, if any handler produced one.
    pub body: Option<serde_json::Value>,
    /// Number of handlers actually executed.
    ///
    /// Distinguishes "a route matched but didn't call `next()`" from "all
    /// matched routes ran".
    pub invoked: usize,
    /// Number of routes whose selector matched.
    pub matched: usize,
}

impl DispatchOutcome {
    /// Returns `true` if at least one handler ran.
    pub fn handled(&self) -> bool {
        self.invoked > 0
    }
}

/// The central activity dispatcher.
///
/// The `Dispatcher` owns a [`Router`] and is responsible for:
/// - Selecting matched routes for each inbound activity
/// - Creating the per-dispatch turn state
/// - Invoking the first matched route and letting `next()` drive the rest
///
/// # Thread Safety
///
/// `Dispatcher` is `Send + Sync`; the route list is read-only after
/// registration, so any number of dispatches may run concurrently.
#[derive(Default, Clone)]
pub struct Dispatcher {
    router: Router,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty router.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Creates a dispatcher around an already-populated router.
    pub fn with_router(router: Router) -> Self {
        Self { router }
    }

    /// Appends a route to the underlying router.
    pub fn register(&mut self, route: Route) {
        self.router.register(route);
    }

    /// Appends a route (builder pattern).
    pub fn with(mut self, route: Route) -> Self {
        self.router.register(route);
        self
    }

    /// Returns the underlying router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the number of registered routes.
    pub fn route_count(&self) -> usize {
        self.router.route_count()
    }

    /// Dispatches an activity with a fresh (never-cancelled) token.
    pub async fn dispatch(
        &self,
        activity: Activity,
        sink: BoxedSink,
    ) -> DispatchResult<DispatchOutcome> {
        self.dispatch_with_cancel(activity, sink, CancellationToken::new())
            .await
    }

    /// Dispatches an activity under the given cancellation token.
    ///
    /// The token is observed before every handler invocation and is exposed
    /// to handlers through [`TurnContext::cancellation`]; cancelling it
    /// aborts this dispatch only.
    pub async fn dispatch_with_cancel(
        &self,
        activity: Activity,
        sink: BoxedSink,
        cancel: CancellationToken,
    ) -> DispatchResult<DispatchOutcome> {
        let activity_type = activity.type_tag().to_string();
        let span = span!(Level::DEBUG, "dispatch", activity_type = %activity_type);

        let routes = self.router.select(&activity);
        let matched = routes.len();
        if matched == 0 {
            debug!(activity_type = %activity_type, "no routes matched");
            return Ok(DispatchOutcome::default());
        }
        debug!(
            activity_type = %activity_type,
            matched,
            "routes matched, starting chain"
        );

        let state = Arc::new(TurnState::new(Arc::new(activity), sink, cancel));
        let routes: Arc<[Arc<Route>]> = routes.into();
        let ctx = TurnContext::new(Arc::clone(&state), routes);

        let body = ctx.run().instrument(span).await?;
        Ok(DispatchOutcome {
            body,
            invoked: state.invoked(),
            matched,
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("route_count", &self.router.route_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::decode;
    use crate::error::HandlerError;
    use crate::sink::{MemorySink, NullSink};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn null_sink() -> BoxedSink {
        Arc::new(NullSink)
    }

    fn message(text: &str) -> Activity {
        decode(&json!({ "type": "message", "id": "m-1", "text": text })).unwrap()
    }

    fn typing() -> Activity {
        decode(&json!({ "type": "typing" })).unwrap()
    }

    #[tokio::test]
    async fn dispatch_with_no_routes_acks_successfully() {
        let dispatcher = Dispatcher::new();
        let outcome = dispatcher.dispatch(message("hi"), null_sink()).await.unwrap();
        assert_eq!(outcome.invoked, 0);
        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.body, None);
        assert!(!outcome.handled());
    }

    #[tokio::test]
    async fn catch_all_then_specific_short_circuits_third() {
        // R1: catch-all logger calling next(); R2: specific, no next();
        // R3: also matches but must never run.
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let o1 = Arc::clone(&order);
        let o2 = Arc::clone(&order);
        let o3 = Arc::clone(&order);

        let dispatcher = Dispatcher::new()
            .with(
                Route::new(move |ctx: TurnContext| {
                    let order = Arc::clone(&o1);
                    async move {
                        order.lock().push("logger");
                        ctx.next().await
                    }
                })
                .name("activity"),
            )
            .with(
                Route::new(move |_ctx| {
                    let order = Arc::clone(&o2);
                    async move {
                        order.lock().push("echo");
                        Ok(None)
                    }
                })
                .name("message")
                .on("message"),
            )
            .with(
                Route::new(move |_ctx| {
                    let order = Arc::clone(&o3);
                    async move {
                        order.lock().push("shadowed");
                        Ok(None)
                    }
                })
                .name("shadowed")
                .on("message"),
            );

        let outcome = dispatcher.dispatch(message("hi"), null_sink()).await.unwrap();
        assert_eq!(outcome.invoked, 2);
        assert_eq!(outcome.matched, 3);
        assert_eq!(*order.lock(), ["logger", "echo"]);
    }

    #[tokio::test]
    async fn non_matching_type_runs_only_the_catch_all() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let catch_all_hits = Arc::clone(&invoked);
        let message_hits = Arc::new(AtomicUsize::new(0));
        let m1 = Arc::clone(&message_hits);
        let m2 = Arc::clone(&message_hits);

        let dispatcher = Dispatcher::new()
            .with(Route::new(move |ctx: TurnContext| {
                let hits = Arc::clone(&catch_all_hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    ctx.next().await
                }
            }))
            .with(
                Route::new(move |_ctx| {
                    let hits = Arc::clone(&m1);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Ok(None)
                    }
                })
                .on("message"),
            )
            .with(
                Route::new(move |_ctx| {
                    let hits = Arc::clone(&m2);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Ok(None)
                    }
                })
                .on("message"),
            );

        let outcome = dispatcher.dispatch(typing(), null_sink()).await.unwrap();
        assert_eq!(outcome.invoked, 1);
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
        assert_eq!(message_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn downstream_value_propagates_through_silent_intermediates() {
        let dispatcher = Dispatcher::new()
            .with(Route::new(|ctx: TurnContext| async move {
                // Delegates and returns nothing of its own.
                ctx.next().await?;
                Ok(None)
            }))
            .with(Route::new(|ctx: TurnContext| async move {
                ctx.next().await?;
                Ok(None)
            }))
            .with(Route::new(|_ctx| async move { Ok(Some(json!({ "answer": 42 }))) }));

        let outcome = dispatcher.dispatch(message("q"), null_sink()).await.unwrap();
        assert_eq!(outcome.invoked, 3);
        assert_eq!(outcome.body, Some(json!({ "answer": 42 })));
    }

    #[tokio::test]
    async fn intermediate_return_overrides_downstream_value() {
        let dispatcher = Dispatcher::new()
            .with(Route::new(|ctx: TurnContext| async move {
                let downstream = ctx.next().await?;
                assert_eq!(downstream, Some(json!("deep")));
                Ok(Some(json!("override")))
            }))
            .with(Route::new(|_ctx| async move { Ok(Some(json!("deep"))) }));

        let outcome = dispatcher.dispatch(message("q"), null_sink()).await.unwrap();
        assert_eq!(outcome.body, Some(json!("override")));
    }

    #[tokio::test]
    async fn next_past_the_end_resolves_to_none() {
        let dispatcher = Dispatcher::new().with(Route::new(|ctx: TurnContext| async move {
            let tail = ctx.next().await?;
            assert_eq!(tail, None);
            Ok(None)
        }));

        let outcome = dispatcher.dispatch(message("hi"), null_sink()).await.unwrap();
        assert_eq!(outcome.invoked, 1);
        assert_eq!(outcome.body, None);
    }

    #[tokio::test]
    async fn handler_error_aborts_the_chain_and_is_attributed() {
        let tail_ran = Arc::new(AtomicUsize::new(0));
        let tail = Arc::clone(&tail_ran);

        let dispatcher = Dispatcher::new()
            .with(Route::new(|ctx: TurnContext| async move { ctx.next().await }).name("outer"))
            .with(
                Route::new(|_ctx| async move {
                    Err(HandlerError::msg("model endpoint unreachable"))
                })
                .name("broken"),
            )
            .with(Route::new(move |_ctx| {
                let tail = Arc::clone(&tail);
                async move {
                    tail.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            }));

        let err = dispatcher
            .dispatch(message("hi"), null_sink())
            .await
            .unwrap_err();
        let DispatchError::Handler {
            route,
            activity_id,
            message,
        } = err
        else {
            panic!("expected handler error");
        };
        assert_eq!(route, "broken");
        assert_eq!(activity_id, "m-1");
        assert!(message.contains("model endpoint unreachable"));
        assert_eq!(tail_ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn error_propagated_through_next_keeps_original_attribution() {
        let dispatcher = Dispatcher::new()
            .with(
                Route::new(|ctx: TurnContext| async move {
                    // `?` forwards the downstream failure untouched.
                    let value = ctx.next().await?;
                    Ok(value)
                })
                .name("outer"),
            )
            .with(Route::new(|_ctx| async move { Err(HandlerError::msg("boom")) }).name("inner"));

        let err = dispatcher
            .dispatch(message("hi"), null_sink())
            .await
            .unwrap_err();
        let DispatchError::Handler { route, .. } = err else {
            panic!("expected handler error");
        };
        assert_eq!(route, "inner");
    }

    #[tokio::test]
    async fn sibling_dispatch_survives_a_failing_one() {
        let dispatcher = Arc::new(
            Dispatcher::new()
                .with(
                    Route::new(|_ctx| async move { Err(HandlerError::msg("boom")) }).on("message"),
                )
                .with(Route::new(|_ctx| async move { Ok(Some(json!("ok"))) }).on("typing")),
        );

        let failing = {
            let d = Arc::clone(&dispatcher);
            tokio::spawn(async move { d.dispatch(message("hi"), null_sink()).await })
        };
        let healthy = {
            let d = Arc::clone(&dispatcher);
            tokio::spawn(async move { d.dispatch(typing(), null_sink()).await })
        };

        assert!(failing.await.unwrap().is_err());
        let outcome = healthy.await.unwrap().unwrap();
        assert_eq!(outcome.body, Some(json!("ok")));
        assert_eq!(outcome.invoked, 1);
    }

    #[tokio::test]
    async fn concurrent_dispatches_do_not_share_extra_bags() {
        // Two routes per dispatch: the first stashes a per-dispatch marker in
        // the extra bag, the second echoes it back as the reply body. With
        // 200 dispatches in flight, every response must equal its own input.
        let dispatcher = Arc::new(
            Dispatcher::new()
                .with(Route::new(|ctx: TurnContext| async move {
                    let Activity::Message(inbound) = ctx.activity() else {
                        return Err(HandlerError::msg("expected message"));
                    };
                    ctx.set_extra("marker", Value::String(inbound.text.clone()));
                    ctx.next().await
                }))
                .with(Route::new(|ctx: TurnContext| async move {
                    tokio::task::yield_now().await;
                    Ok(ctx.get_extra("marker"))
                })),
        );

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let d = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    let text = format!("dispatch-{i}");
                    let outcome = d.dispatch(message(&text), null_sink()).await.unwrap();
                    (text, outcome)
                })
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            let (text, outcome) = handle.unwrap();
            assert_eq!(outcome.body, Some(Value::String(text)));
            assert_eq!(outcome.invoked, 2);
        }
    }

    #[tokio::test]
    async fn cancellation_stops_the_chain_before_the_next_handler() {
        let second_ran = Arc::new(AtomicUsize::new(0));
        let second = Arc::clone(&second_ran);

        let dispatcher = Dispatcher::new()
            .with(Route::new(|ctx: TurnContext| async move {
                ctx.cancellation().cancel();
                ctx.next().await
            }))
            .with(Route::new(move |_ctx| {
                let second = Arc::clone(&second);
                async move {
                    second.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            }));

        let cancel = CancellationToken::new();
        let err = dispatcher
            .dispatch_with_cancel(message("hi"), null_sink(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Cancelled));
        assert_eq!(second_ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn already_cancelled_dispatch_runs_nothing() {
        let ran = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&ran);
        let dispatcher = Dispatcher::new().with(Route::new(move |_ctx| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = dispatcher
            .dispatch_with_cancel(message("hi"), null_sink(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Cancelled));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn replies_flow_through_the_sink() {
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new().with(
            Route::new(|ctx: TurnContext| async move {
                ctx.reply("echo!").await?;
                Ok(None)
            })
            .on("message"),
        );

        let outcome = dispatcher
            .dispatch(message("hello"), Arc::clone(&sink) as BoxedSink)
            .await
            .unwrap();
        assert_eq!(outcome.invoked, 1);

        let sent = sink.drain();
        assert_eq!(sent.len(), 1);
        let Activity::Message(reply) = &sent[0] else {
            panic!("expected message reply");
        };
        assert_eq!(reply.text, "echo!");
        assert_eq!(reply.reply_to_id.as_deref(), Some("m-1"));
    }
}
