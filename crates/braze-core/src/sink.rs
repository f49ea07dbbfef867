//! Outbound activity sinks.
//!
//! A sink is the core's only view of the transport layer on the way out:
//! handlers produce activities, the sink delivers them (HTTP connector,
//! socket frame, test buffer — the core doesn't care).

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::activity::Activity;
use crate::error::SinkResult;

/// Destination for outbound activities produced during a dispatch.
///
/// Implementations must be `Send + Sync`; one sink may serve many
/// concurrent dispatches.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    /// Delivers one outbound activity.
    async fn deliver(&self, activity: Activity) -> SinkResult<()>;
}

/// A type-erased, shareable sink.
pub type BoxedSink = Arc<dyn ActivitySink>;

/// A sink that silently drops everything.
///
/// Useful as the default before a transport is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl ActivitySink for NullSink {
    async fn deliver(&self, _activity: Activity) -> SinkResult<()> {
        Ok(())
    }
}

/// A sink that buffers delivered activities in memory.
///
/// This is the test and demo sink: dispatch, then inspect what the bot sent.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Activity>>,
}

impl MemorySink {
    /// Creates an empty buffering sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything delivered so far.
    pub fn sent(&self) -> Vec<Activity> {
        self.sent.lock().clone()
    }

    /// Removes and returns everything delivered so far.
    pub fn drain(&self) -> Vec<Activity> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Number of activities delivered so far.
    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    /// Returns `true` if nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

#[async_trait]
impl ActivitySink for MemorySink {
    async fn deliver(&self, activity: Activity) -> SinkResult<()> {
        self.sent.lock().push(activity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;

    #[tokio::test]
    async fn memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        sink.deliver(Activity::message("one")).await.unwrap();
        sink.deliver(Activity::message("two")).await.unwrap();

        let sent = sink.drain();
        assert_eq!(sent.len(), 2);
        let Activity::Message(first) = &sent[0] else {
            panic!("expected message");
        };
        assert_eq!(first.text, "one");
        assert!(sink.is_empty());
    }
}
