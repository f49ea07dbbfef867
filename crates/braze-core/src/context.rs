//! Per-dispatch context and the `next()` continuation.
//!
//! This module provides two types that together model one dispatch:
//!
//! - [`TurnState`] — the **shared** state for one dispatch cycle. A single
//!   `Arc<TurnState>` is created per inbound activity and holds the
//!   activity, the outbound sink, the `extra` bag, the aggregated result
//!   slot, the invoked-route counter, and the cancellation token.
//!
//! - [`TurnContext`] — the cursor-carrying view handed to each handler. It
//!   is bound to one position in the matched-route list; calling
//!   [`next()`](TurnContext::next) derives a fresh context at the following
//!   position and runs that route's handler. A handler that does not call
//!   `next()` short-circuits the remainder of the chain.
//!
//! Turn state is exclusively owned by its dispatch: concurrent dispatches
//! never share an `extra` bag, a result slot, or a counter.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::activity::Activity;
use crate::error::{DispatchError, HandlerError, HandlerResult};
use crate::route::Route;
use crate::sink::BoxedSink;

// =============================================================================
// TurnState — shared state, one per dispatch cycle
// =============================================================================

/// Shared state for a single dispatch cycle.
pub struct TurnState {
    activity: Arc<Activity>,
    sink: BoxedSink,
    /// Ambient data bag, exclusively owned by this dispatch.
    extra: Mutex<HashMap<String, Value>>,
    /// The most recent non-null handler result.
    result: Mutex<Option<Value>>,
    /// Handlers actually executed during this dispatch.
    invoked: AtomicUsize,
    cancel: CancellationToken,
}

impl TurnState {
    pub(crate) fn new(activity: Arc<Activity>, sink: BoxedSink, cancel: CancellationToken) -> Self {
        Self {
            activity,
            sink,
            extra: Mutex::new(HashMap::new()),
            result: Mutex::new(None),
            invoked: AtomicUsize::new(0),
            cancel,
        }
    }

    pub(crate) fn invoked(&self) -> usize {
        self.invoked.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnState")
            .field("activity_type", &self.activity.type_tag())
            .field("invoked", &self.invoked())
            .field("is_cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TurnContext — cursor-carrying view, handed to handlers
// =============================================================================

/// The context object passed to route handlers during dispatch.
///
/// Cloning a `TurnContext` is cheap (two `Arc`s and a cursor) and every
/// clone observes the same shared turn state.
///
/// # Example
///
/// ```rust,ignore
/// async fn log_and_continue(ctx: TurnContext) -> HandlerResult {
///     tracing::info!(activity = ctx.activity().type_tag(), "inbound");
///     ctx.set_extra("seen", serde_json::json!(true));
///     ctx.next().await // fall through to the next matched route
/// }
/// ```
#[derive(Clone)]
pub struct TurnContext {
    state: Arc<TurnState>,
    routes: Arc<[Arc<Route>]>,
    cursor: usize,
}

impl TurnContext {
    pub(crate) fn new(state: Arc<TurnState>, routes: Arc<[Arc<Route>]>) -> Self {
        Self {
            state,
            routes,
            cursor: 0,
        }
    }

    /// The activity being dispatched.
    pub fn activity(&self) -> &Activity {
        &self.state.activity
    }

    /// A shared handle to the activity being dispatched.
    pub fn activity_arc(&self) -> Arc<Activity> {
        Arc::clone(&self.state.activity)
    }

    /// The outbound sink for this dispatch.
    pub fn sink(&self) -> &BoxedSink {
        &self.state.sink
    }

    /// A clone of the outbound sink handle.
    pub fn sink_arc(&self) -> BoxedSink {
        Arc::clone(&self.state.sink)
    }

    /// The cancellation token associated with this dispatch.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.state.cancel
    }

    /// Returns `true` once this dispatch has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    /// Number of matched routes not yet reached from this position.
    pub fn remaining(&self) -> usize {
        self.routes.len().saturating_sub(self.cursor + 1)
    }

    // ─── Extra bag ───────────────────────────────────────────────────────────

    /// Stores a value in this dispatch's ambient data bag.
    ///
    /// Overwrites any previous value under the same key. The bag is never
    /// shared across dispatches.
    pub fn set_extra(&self, key: impl Into<String>, value: Value) {
        self.state.extra.lock().insert(key.into(), value);
    }

    /// Retrieves a cloned value from the ambient data bag.
    pub fn get_extra(&self, key: &str) -> Option<Value> {
        self.state.extra.lock().get(key).cloned()
    }

    /// Removes and returns a value from the ambient data bag.
    pub fn take_extra(&self, key: &str) -> Option<Value> {
        self.state.extra.lock().remove(key)
    }

    /// Returns `true` if the ambient data bag contains `key`.
    pub fn has_extra(&self, key: &str) -> bool {
        self.state.extra.lock().contains_key(key)
    }

    // ─── Outbound ────────────────────────────────────────────────────────────

    /// Delivers an outbound activity through this dispatch's sink.
    pub async fn send(&self, activity: Activity) -> Result<(), HandlerError> {
        self.state.sink.deliver(activity).await.map_err(Into::into)
    }

    /// Sends a plain-text message addressed back at this activity's sender.
    pub async fn reply(&self, text: impl Into<String>) -> Result<(), HandlerError> {
        let reply = self.state.activity.create_reply(text);
        self.send(reply).await
    }

    // ─── Continuation ────────────────────────────────────────────────────────

    /// Runs the next matched route, if any.
    ///
    /// Resolves to that route's effective result: its own returned value, or
    /// whatever the chain below it recorded when it returned `None`. Past
    /// the end of the matched list this is a no-op resolving to `Ok(None)`.
    pub async fn next(&self) -> HandlerResult {
        let next_cursor = self.cursor + 1;
        if next_cursor >= self.routes.len() {
            trace!("route chain exhausted, next() is a no-op");
            return Ok(None);
        }
        let next_ctx = Self {
            state: Arc::clone(&self.state),
            routes: Arc::clone(&self.routes),
            cursor: next_cursor,
        };
        next_ctx.run().await.map_err(HandlerError::from)
    }

    /// Runs the route at this context's cursor.
    ///
    /// This is the single chain step: the dispatcher calls it for cursor 0
    /// and `next()` calls it for every position after that.
    pub(crate) async fn run(&self) -> Result<Option<Value>, DispatchError> {
        if self.state.cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        let route = &self.routes[self.cursor];
        self.state.invoked.fetch_add(1, Ordering::SeqCst);
        trace!(
            route = route.get_name().unwrap_or("unnamed"),
            cursor = self.cursor,
            "invoking route handler"
        );

        match route.call(self.clone()).await {
            Ok(Some(value)) => {
                // Explicit return overrides anything the chain recorded.
                *self.state.result.lock() = Some(value.clone());
                Ok(Some(value))
            }
            // Fall through to whatever downstream routes recorded.
            Ok(None) => Ok(self.state.result.lock().clone()),
            // A deeper route already claimed this failure; keep its blame.
            Err(HandlerError::Dispatch(inner)) => Err(*inner),
            Err(err) => Err(DispatchError::Handler {
                route: route.get_name().unwrap_or("unnamed").to_string(),
                activity_id: self.state.activity.id().unwrap_or_default().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("activity_type", &self.state.activity.type_tag())
            .field("cursor", &self.cursor)
            .field("routes", &self.routes.len())
            .finish()
    }
}
