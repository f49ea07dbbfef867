//! Runtime orchestration.
//!
//! [`BrazeRuntime`] pumps a queue of inbound activities through an
//! [`App`], one spawned task per dispatch. Transports talk to the runtime
//! through a [`RuntimeHandle`]:
//!
//! - [`submit`](RuntimeHandle::submit) — enqueue an activity and await its
//!   [`InvokeResponse`] (the HTTP-shaped path);
//! - [`notify`](RuntimeHandle::notify) — enqueue fire-and-forget.
//!
//! Every dispatch runs under a child of the runtime's shutdown token, so
//! cancelling the runtime propagates into in-flight handlers after the
//! configured grace period. Cancelling one dispatch never affects another.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use braze_core::activity::Activity;
use braze_core::response::InvokeResponse;
use braze_framework::App;

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// One queued inbound activity.
struct Inbound {
    activity: Activity,
    respond: Option<oneshot::Sender<InvokeResponse>>,
}

/// Cloneable handle for feeding activities into a running runtime.
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<Inbound>,
}

impl RuntimeHandle {
    /// Enqueues an activity and awaits its transport-facing response.
    pub async fn submit(&self, activity: Activity) -> RuntimeResult<InvokeResponse> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(Inbound {
                activity,
                respond: Some(respond),
            })
            .await
            .map_err(|_| RuntimeError::QueueClosed)?;
        rx.await.map_err(|_| RuntimeError::ResponseDropped)
    }

    /// Enqueues an activity without waiting for its response.
    pub async fn notify(&self, activity: Activity) -> RuntimeResult<()> {
        self.tx
            .send(Inbound {
                activity,
                respond: None,
            })
            .await
            .map_err(|_| RuntimeError::QueueClosed)
    }
}

/// The runtime: an [`App`] plus the inbound queue and shutdown machinery.
pub struct BrazeRuntime {
    app: Arc<App>,
    config: RuntimeConfig,
    tx: mpsc::Sender<Inbound>,
    rx: mpsc::Receiver<Inbound>,
    shutdown: CancellationToken,
}

impl BrazeRuntime {
    /// Creates a runtime with default tuning.
    pub fn new(app: App) -> Self {
        Self::with_config(app, RuntimeConfig::default())
    }

    /// Creates a runtime with explicit tuning.
    pub fn with_config(app: App, config: RuntimeConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            app: Arc::new(app),
            config,
            tx,
            rx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns a handle for submitting activities.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            tx: self.tx.clone(),
        }
    }

    /// Returns the shutdown token; cancelling it stops [`run`](Self::run).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until ctrl-c or shutdown, dispatching each queued activity on
    /// its own task.
    pub async fn run(mut self) -> RuntimeResult<()> {
        info!(
            routes = self.app.dispatcher().route_count(),
            queue_capacity = self.config.queue_capacity,
            "runtime started"
        );
        // Drop the runtime's own sender so `rx.recv()` can observe closure
        // once every external handle is gone.
        drop(self.tx);

        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    if let Err(err) = signal {
                        warn!(error = %err, "ctrl-c handler failed, shutting down");
                    } else {
                        info!("shutdown signal received");
                    }
                    break;
                }
                _ = self.shutdown.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                inbound = self.rx.recv() => {
                    let Some(inbound) = inbound else {
                        debug!("all handles dropped, draining");
                        break;
                    };
                    let app = Arc::clone(&self.app);
                    let cancel = self.shutdown.child_token();
                    tasks.spawn(async move {
                        let Inbound { activity, respond } = inbound;
                        let response = app.process_with_cancel(activity, cancel).await;
                        if let Some(respond) = respond {
                            // The submitter may have gone away; that's fine.
                            let _ = respond.send(response);
                        }
                    });
                }
            }
        }

        self.rx.close();
        let grace = Duration::from_millis(self.config.shutdown_grace_ms);
        let drained = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                grace_ms = self.config.shutdown_grace_ms,
                "grace period elapsed, cancelling in-flight dispatches"
            );
            self.shutdown.cancel();
            while tasks.join_next().await.is_some() {}
        }

        info!("runtime stopped");
        Ok(())
    }
}

impl std::fmt::Debug for BrazeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrazeRuntime")
            .field("routes", &self.app.dispatcher().route_count())
            .field("queue_capacity", &self.config.queue_capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braze_core::activity::decode;
    use braze_core::context::TurnContext;
    use serde_json::json;

    fn message(text: &str) -> Activity {
        decode(&json!({ "type": "message", "text": text })).unwrap()
    }

    #[tokio::test]
    async fn submit_round_trips_through_the_queue() {
        let app = App::new().on("message", |_ctx: TurnContext| async move {});
        let runtime = BrazeRuntime::new(app);
        let handle = runtime.handle();
        let shutdown = runtime.shutdown_token();
        let worker = tokio::spawn(runtime.run());

        let response = handle.submit(message("hi")).await.unwrap();
        assert!(response.is_success());

        shutdown.cancel();
        worker.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn notify_does_not_wait_for_a_response() {
        let app = App::new();
        let runtime = BrazeRuntime::new(app);
        let handle = runtime.handle();
        let shutdown = runtime.shutdown_token();
        let worker = tokio::spawn(runtime.run());

        handle.notify(message("fire and forget")).await.unwrap();

        shutdown.cancel();
        worker.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn shutdown_cancellation_reaches_in_flight_handlers() {
        // The handler parks until its dispatch token fires, which only
        // happens when the runtime cancels in-flight work on shutdown.
        let config = RuntimeConfig {
            queue_capacity: 4,
            shutdown_grace_ms: 20,
        };
        let app = App::new().on("message", |ctx: TurnContext| async move {
            ctx.cancellation().cancelled().await;
        });
        let runtime = BrazeRuntime::with_config(app, config);
        let handle = runtime.handle();
        let shutdown = runtime.shutdown_token();
        let worker = tokio::spawn(runtime.run());

        let pending = tokio::spawn(async move { handle.submit(message("stuck")).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();

        let response = pending.await.unwrap().unwrap();
        assert!(response.is_success());
        worker.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn dropping_all_handles_stops_the_runtime() {
        let runtime = BrazeRuntime::new(App::new());
        let handle = runtime.handle();
        let worker = tokio::spawn(runtime.run());

        handle.notify(message("last one")).await.unwrap();
        drop(handle);

        worker.await.unwrap().unwrap();
    }
}
