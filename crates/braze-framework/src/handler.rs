//! Handler system for the Braze framework.
//!
//! This module defines the [`Handler`] trait that lets ordinary async
//! functions act as route handlers. Handlers are implemented via blanket
//! implementations for functions of different arities, similar to Axum's
//! handler system: each parameter is extracted from the [`TurnContext`]
//! with [`FromContext`], and the return value is converted into the routing
//! result with [`IntoRouteResult`].
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_core::activity::{ActivityContext, MessageActivity};
//! use braze_core::TurnContext;
//!
//! // Fall-through logger.
//! async fn log_all(ctx: TurnContext) -> braze_core::HandlerResult {
//!     tracing::info!(activity = ctx.activity().type_tag(), "inbound");
//!     ctx.next().await
//! }
//!
//! // Typed echo handler; returning () means no reply body.
//! async fn echo(ctx: TurnContext, msg: ActivityContext<MessageActivity>) {
//!     ctx.reply(msg.text.clone()).await.ok();
//! }
//!
//! // Invoke handler producing a structured body.
//! async fn fetch_task() -> serde_json::Value {
//!     serde_json::json!({ "task": { "type": "continue" } })
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use braze_core::context::TurnContext;
use braze_core::error::{HandlerError, HandlerResult};

use crate::extractor::FromContext;

// ============================================================================
// IntoRouteResult - Convert handler return values
// ============================================================================

/// Conversion from a handler's return value into the routing result.
///
/// - `()` — no reply body; falls through to whatever the chain recorded.
/// - `Value` — a structured reply body (meaningful for invoke activities).
/// - `Option<Value>` — the routing result verbatim.
/// - `Result<T, E>` — errors abort the chain for this dispatch.
pub trait IntoRouteResult {
    /// Performs the conversion.
    fn into_route_result(self) -> HandlerResult;
}

impl IntoRouteResult for () {
    fn into_route_result(self) -> HandlerResult {
        Ok(None)
    }
}

impl IntoRouteResult for Value {
    fn into_route_result(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl IntoRouteResult for Option<Value> {
    fn into_route_result(self) -> HandlerResult {
        Ok(self)
    }
}

impl<T, E> IntoRouteResult for Result<T, E>
where
    T: IntoRouteResult,
    E: Into<HandlerError>,
{
    fn into_route_result(self) -> HandlerResult {
        match self {
            Ok(value) => value.into_route_result(),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for framework-level route handlers.
///
/// # Blanket Implementation
///
/// This trait is automatically implemented for async functions that:
/// - Take 0-8 parameters that implement [`FromContext`]
/// - Return a type implementing [`IntoRouteResult`]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// The type of future calling this handler returns.
    type Future: Future<Output = HandlerResult> + Send + 'static;

    /// Call the handler with the given context.
    fn call(self, ctx: TurnContext) -> Self::Future;
}

// ============================================================================
// Type-erased handlers
// ============================================================================

/// A wrapper that converts a function into a boxed handler.
pub struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> HandlerFn<F, T> {
    /// Creates a new handler function wrapper.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, T> Clone for HandlerFn<F, T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// A type-erased handler that can be stored in collections.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync>;

/// Type-erased handler trait for dynamic dispatch.
pub trait ErasedHandler: Send + Sync {
    /// Execute the handler with the given context.
    fn call(&self, ctx: TurnContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T> + Send + Sync,
    T: 'static,
{
    fn call(&self, ctx: TurnContext) -> BoxFuture<'static, HandlerResult> {
        let f = self.f.clone();
        Box::pin(async move { f.call(ctx).await })
    }
}

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T> + Send + Sync + 'static,
    T: 'static,
{
    Arc::new(HandlerFn::new(f))
}

// ============================================================================
// Handler implementations for functions (Axum-style)
// ============================================================================

// Implementation for functions with no parameters
impl<F, Fut, R> Handler<()> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoRouteResult,
{
    type Future = BoxFuture<'static, HandlerResult>;

    fn call(self, _ctx: TurnContext) -> Self::Future {
        Box::pin(async move { (self)().await.into_route_result() })
    }
}

/// Macro to generate Handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, Fut, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoRouteResult,
            $( $ty: FromContext + Send + 'static, )*
        {
            type Future = BoxFuture<'static, HandlerResult>;

            fn call(self, ctx: TurnContext) -> Self::Future {
                Box::pin(async move {
                    $(
                        let $ty = $ty::from_context(&ctx)?;
                    )*

                    (self)($($ty,)*).await.into_route_result()
                })
            }
        }
    };
}

// Generate implementations for 1-8 parameters
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
