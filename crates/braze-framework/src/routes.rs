//! Route builder functions for common activity shapes.
//!
//! Each builder returns a [`RouteBuilder`] with the relevant selector
//! pre-set; call [`handler`](RouteBuilder::handler) to attach an async
//! handler and obtain the final [`Route`].
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_framework::{on_invoke, on_message};
//! use braze_core::InvokeName;
//!
//! let app = App::new()
//!     .route(on_message().handler(echo))
//!     .route(on_invoke(InvokeName::TaskFetch).handler(fetch_task))
//!     .route(
//!         on_invoke(InvokeName::MessageSubmitAction)
//!             .select(|a| a.as_invoke()
//!                 .is_some_and(|i| i.value()["actionName"] == "feedback"))
//!             .handler(record_feedback),
//!     );
//! ```

use std::sync::Arc;

use braze_core::activity::{Activity, InvokeName};
use braze_core::route::{Route, SelectorFn, WILDCARD_ROUTE};

use crate::handler::{Handler, into_handler};

/// An in-progress route: a name and a selector waiting for a handler.
#[derive(Default, Clone)]
pub struct RouteBuilder {
    name: Option<String>,
    selector: Option<SelectorFn>,
}

impl RouteBuilder {
    /// Creates a builder with no selector (matches every activity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the route's diagnostic name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Refines the selector with an additional predicate.
    ///
    /// Predicates compose by conjunction: the route matches only when the
    /// existing selector and `f` both accept the activity.
    pub fn select<F>(mut self, f: F) -> Self
    where
        F: Fn(&Activity) -> bool + Send + Sync + 'static,
    {
        let f: SelectorFn = Arc::new(f);
        self.selector = Some(match self.selector.take() {
            Some(prev) => Arc::new(move |activity| prev(activity) && f(activity)),
            None => f,
        });
        self
    }

    /// Attaches a handler and produces the final [`Route`].
    pub fn handler<H, T>(self, handler: H) -> Route
    where
        H: Handler<T>,
        T: 'static,
    {
        let erased = into_handler(handler);
        let mut route = Route::new(move |ctx| erased.call(ctx));
        if let Some(name) = self.name {
            route = route.name(name);
        }
        if let Some(selector) = self.selector {
            route = route.select(move |activity| selector(activity));
        }
        route
    }
}

/// Creates a builder that matches every activity.
///
/// Register one of these first (calling `next()`) for cross-cutting
/// concerns like logging.
pub fn on_any() -> RouteBuilder {
    RouteBuilder::new().name(WILDCARD_ROUTE)
}

/// Creates a builder keyed by discriminator value.
///
/// The reserved tag [`WILDCARD_ROUTE`] produces a catch-all, mirroring
/// [`Router::on`](braze_core::Router::on).
pub fn on_activity(tag: impl Into<String>) -> RouteBuilder {
    let tag = tag.into();
    if tag == WILDCARD_ROUTE {
        return on_any();
    }
    RouteBuilder::new()
        .name(tag.clone())
        .select(move |activity| activity.type_tag() == tag)
}

/// Creates a builder that only matches message activities.
pub fn on_message() -> RouteBuilder {
    RouteBuilder::new()
        .name("message")
        .select(|activity| matches!(activity, Activity::Message(_)))
}

/// Creates a builder that only matches conversation updates.
pub fn on_conversation_update() -> RouteBuilder {
    RouteBuilder::new()
        .name("conversationUpdate")
        .select(|activity| matches!(activity, Activity::ConversationUpdate(_)))
}

/// Creates a builder that only matches message reactions.
pub fn on_message_reaction() -> RouteBuilder {
    RouteBuilder::new()
        .name("messageReaction")
        .select(|activity| matches!(activity, Activity::MessageReaction(_)))
}

/// Creates a builder that only matches event activities.
pub fn on_event() -> RouteBuilder {
    RouteBuilder::new()
        .name("event")
        .select(|activity| matches!(activity, Activity::Event(_)))
}

/// Creates a builder that matches invokes with the given name.
pub fn on_invoke(name: InvokeName) -> RouteBuilder {
    RouteBuilder::new()
        .name(name.as_str())
        .select(move |activity| activity.as_invoke().is_some_and(|invoke| invoke.name() == name))
}
