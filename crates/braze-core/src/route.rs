//! Routes — one `(selector, handler)` pair each.
//!
//! A [`Route`] pairs a selector predicate over the decoded [`Activity`]
//! with an async handler. Selectors are plain `Fn(&Activity) -> bool`
//! closures: matching by discriminator, by nested field, or by any
//! combination is ordinary closure composition, and the router never
//! special-cases any of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_core::Route;
//!
//! // Match by discriminator value.
//! let echo = Route::new(echo_handler).name("message").on("message");
//!
//! // Match by discriminator plus a nested field.
//! let feedback = Route::new(feedback_handler).select(|activity| {
//!     activity.as_invoke().is_some_and(|invoke| {
//!         invoke.name() == InvokeName::MessageSubmitAction
//!             && invoke.value()["actionName"] == "feedback"
//!     })
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::activity::Activity;
use crate::context::TurnContext;
use crate::error::HandlerResult;

/// The reserved route name that matches every activity.
///
/// Registering under this name (or registering with no selector at all)
/// produces a catch-all route.
pub const WILDCARD_ROUTE: &str = "activity";

/// A type-erased selector predicate.
pub type SelectorFn = Arc<dyn Fn(&Activity) -> bool + Send + Sync>;

/// The boxed future a route handler resolves.
pub type RouteFuture = BoxFuture<'static, HandlerResult>;

type HandlerObj = Arc<dyn Fn(TurnContext) -> RouteFuture + Send + Sync>;

/// A single registered `(selector, handler)` pair.
///
/// Routes are immutable once registered with a [`Router`](crate::Router):
/// the builder methods consume `self` and there is no mid-dispatch
/// mutation.
#[derive(Clone)]
pub struct Route {
    name: Option<String>,
    selector: Option<SelectorFn>,
    handler: HandlerObj,
}

impl Route {
    /// Creates a route around an async handler.
    ///
    /// With no selector the route matches every activity; add one with
    /// [`select`](Self::select) or [`on`](Self::on).
    pub fn new<H, Fut>(handler: H) -> Self
    where
        H: Fn(TurnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            name: None,
            selector: None,
            handler: Arc::new(move |ctx| Box::pin(handler(ctx))),
        }
    }

    /// Sets a name for this route (diagnostics and error attribution).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the selector predicate.
    pub fn select<F>(mut self, selector: F) -> Self
    where
        F: Fn(&Activity) -> bool + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(selector));
        self
    }

    /// Sets the selector to exact discriminator equality with `tag`.
    ///
    /// The reserved tag [`WILDCARD_ROUTE`] clears the selector instead,
    /// making the route match every activity regardless of any other
    /// criterion.
    pub fn on(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag == WILDCARD_ROUTE {
            self.selector = None;
            self
        } else {
            self.select(move |activity| activity.type_tag() == tag)
        }
    }

    /// Returns whether this route's selector accepts the activity.
    pub fn matches(&self, activity: &Activity) -> bool {
        match &self.selector {
            Some(selector) => selector(activity),
            None => true, // No selector means match all
        }
    }

    /// Returns the name of this route, if set.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn call(&self, ctx: TurnContext) -> RouteFuture {
        (self.handler)(ctx)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("has_selector", &self.selector.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::decode;
    use serde_json::json;

    fn message() -> Activity {
        decode(&json!({ "type": "message", "text": "hi" })).unwrap()
    }

    fn typing() -> Activity {
        decode(&json!({ "type": "typing" })).unwrap()
    }

    #[test]
    fn route_without_selector_matches_everything() {
        let route = Route::new(|_ctx| async { Ok(None) });
        assert!(route.matches(&message()));
        assert!(route.matches(&typing()));
    }

    #[test]
    fn on_matches_by_exact_tag() {
        let route = Route::new(|_ctx| async { Ok(None) }).on("message");
        assert!(route.matches(&message()));
        assert!(!route.matches(&typing()));
    }

    #[test]
    fn wildcard_tag_clears_the_selector() {
        let route = Route::new(|_ctx| async { Ok(None) })
            .on("message")
            .on(WILDCARD_ROUTE);
        assert!(route.matches(&typing()));
    }

    #[test]
    fn selectors_compose_over_nested_fields() {
        let route = Route::new(|_ctx| async { Ok(None) }).select(|activity| {
            activity
                .as_invoke()
                .is_some_and(|invoke| invoke.value()["actionName"] == "feedback")
        });

        let feedback = decode(&json!({
            "type": "invoke",
            "name": "message/submitAction",
            "value": { "actionName": "feedback" }
        }))
        .unwrap();
        let other = decode(&json!({
            "type": "invoke",
            "name": "message/submitAction",
            "value": { "actionName": "flag" }
        }))
        .unwrap();

        assert!(route.matches(&feedback));
        assert!(!route.matches(&other));
        assert!(!route.matches(&message()));
    }
}
