//! Generic polling service
//!
//! A [`Feed`] knows how to fetch and normalize one upstream. [`start_feed`]
//! wraps it into a [`RepeatingTask`] that broadcasts every successful poll and
//! swallows (logs) every failure, so a feed loop never dies.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use worldscope_common::Channel;

use super::scheduled::{RepeatingTask, ServiceHandle};
use crate::broadcast::BroadcastSink;
use crate::error::Result;

/// Why a poll produced nothing to broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Upstream answered 429; try again at the normal interval
    RateLimited,
    /// Nothing to publish yet (e.g. empty satellite catalog)
    NothingToPublish,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Publish(Vec<T>),
    Skip(SkipReason),
}

/// What a single tick did, mainly for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Published(usize),
    Skipped(SkipReason),
    Failed(&'static str),
}

#[async_trait]
pub trait Feed: Send + Sync + 'static {
    type Record: Serialize + Send;

    /// Short name used as log prefix
    fn name(&self) -> &'static str;

    fn channel(&self) -> Channel;

    fn interval(&self) -> Duration;

    /// High-frequency feeds log their publishes at debug level only
    fn log_publishes(&self) -> bool {
        true
    }

    async fn poll(&self) -> Result<PollOutcome<Self::Record>>;
}

/// Run one poll and broadcast its result
pub async fn run_tick<F: Feed + ?Sized>(feed: &F, sink: &dyn BroadcastSink) -> TickOutcome {
    let name = feed.name();

    match feed.poll().await {
        Ok(PollOutcome::Publish(records)) => {
            let count = records.len();
            match serde_json::to_value(&records) {
                Ok(payload) => {
                    sink.broadcast(feed.channel(), payload);
                    if feed.log_publishes() {
                        tracing::info!("[{}] emitted {}", name, count);
                    } else {
                        tracing::debug!("[{}] emitted {}", name, count);
                    }
                    TickOutcome::Published(count)
                }
                Err(e) => {
                    tracing::error!("[{}] failed to serialize records: {}", name, e);
                    TickOutcome::Failed("parse")
                }
            }
        }
        Ok(PollOutcome::Skip(reason)) => {
            match reason {
                SkipReason::RateLimited => {
                    tracing::warn!("[{}] rate limited by upstream, keeping last data", name)
                }
                SkipReason::NothingToPublish => tracing::debug!("[{}] nothing to publish", name),
            }
            TickOutcome::Skipped(reason)
        }
        Err(e) => {
            tracing::error!("[{}] {} failed: {}", name, e.kind(), e);
            TickOutcome::Failed(e.kind())
        }
    }
}

/// Start polling `feed` at its fixed interval, first poll immediately
pub fn start_feed<F: Feed>(feed: Arc<F>, sink: Arc<dyn BroadcastSink>) -> ServiceHandle {
    let name = feed.name();
    let task = RepeatingTask::new(format!("{} feed", name), feed.interval()).spawn(move || {
        let feed = feed.clone();
        let sink = sink.clone();
        async move {
            run_tick(feed.as_ref(), sink.as_ref()).await;
        }
    });

    ServiceHandle::new(name, vec![task])
}
