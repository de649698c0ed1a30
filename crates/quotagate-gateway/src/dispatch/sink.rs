//! Channel-backed sink, for tests and in-process embedding.

use async_trait::async_trait;
use tokio::sync::mpsc;

use quotagate_core::{QuotaGateError, Result};

use crate::dispatch::{ItemSink, UserRequest};

/// `ItemSink` over a bounded mpsc channel. The receiving half is the
/// "downstream transport"; a dropped receiver surfaces as a sink error.
pub struct ChannelSink {
    tx: mpsc::Sender<UserRequest>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<UserRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ItemSink for ChannelSink {
    async fn deliver(&self, item: UserRequest) -> Result<()> {
        self.tx
            .send(item)
            .await
            .map_err(|_| QuotaGateError::Sink("channel receiver dropped".into()))
    }
}
