//! The route registry.
//!
//! A [`Router`] owns the ordered sequence of registered [`Route`]s.
//! Insertion order is dispatch order — this is load-bearing: an
//! earlier-registered catch-all (say, an activity logger) runs before
//! later, more specific routes, and each must explicitly call `next()` for
//! the chain to continue.
//!
//! Routes are registered at application-configuration time and read-only
//! afterwards; [`select`](Router::select) is a pure filter and safe to call
//! concurrently for different activities.

use std::future::Future;
use std::sync::Arc;

use crate::activity::Activity;
use crate::context::TurnContext;
use crate::error::HandlerResult;
use crate::route::Route;

/// The ordered collection of routes for an application.
#[derive(Default, Clone)]
pub struct Router {
    routes: Vec<Arc<Route>>,
}

impl Router {
    /// Creates a new, empty router.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a route.
    ///
    /// No dedup, no reordering: registration order is execution order.
    pub fn register(&mut self, route: Route) {
        self.routes.push(Arc::new(route));
    }

    /// Appends a route (builder pattern).
    pub fn with(mut self, route: Route) -> Self {
        self.register(route);
        self
    }

    /// Convenience registration keyed by discriminator value.
    ///
    /// `name` doubles as the route's diagnostic name and its selector: the
    /// route matches activities whose `type` tag equals `name` exactly,
    /// except for the reserved name
    /// [`WILDCARD_ROUTE`](crate::route::WILDCARD_ROUTE), which matches
    /// every activity.
    pub fn on<H, Fut>(&mut self, name: impl Into<String>, handler: H)
    where
        H: Fn(TurnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let name = name.into();
        let route = Route::new(handler).name(name.clone()).on(name);
        self.register(route);
    }

    /// Returns the number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the matching routes for an activity, in registration order.
    ///
    /// This is a pure filter over the route list; it never mutates state.
    pub fn select(&self, activity: &Activity) -> Vec<Arc<Route>> {
        self.routes
            .iter()
            .filter(|route| route.matches(activity))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("route_count", &self.routes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::decode;
    use serde_json::json;

    fn noop() -> Route {
        Route::new(|_ctx| async { Ok(None) })
    }

    #[test]
    fn select_preserves_registration_order() {
        let router = Router::new()
            .with(noop().name("first"))
            .with(noop().name("second").on("message"))
            .with(noop().name("third").on("message"));

        let activity = decode(&json!({ "type": "message" })).unwrap();
        let selected = router.select(&activity);
        let names: Vec<_> = selected
            .iter()
            .map(|r| r.get_name().unwrap_or("unnamed"))
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn select_filters_by_selector() {
        let router = Router::new()
            .with(noop().name("messages").on("message"))
            .with(noop().name("typing").on("typing"));

        let typing = decode(&json!({ "type": "typing" })).unwrap();
        let selected = router.select(&typing);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].get_name(), Some("typing"));
    }

    #[test]
    fn on_with_reserved_name_matches_everything() {
        let mut router = Router::new();
        router.on("activity", |_ctx| async { Ok(None) });
        router.on("message", |_ctx| async { Ok(None) });

        let typing = decode(&json!({ "type": "typing" })).unwrap();
        assert_eq!(router.select(&typing).len(), 1);

        let message = decode(&json!({ "type": "message" })).unwrap();
        assert_eq!(router.select(&message).len(), 2);
    }

    #[test]
    fn select_on_empty_router_is_empty() {
        let router = Router::new();
        let activity = decode(&json!({ "type": "message" })).unwrap();
        assert!(router.select(&activity).is_empty());
        assert!(router.is_empty());
    }
}
