//! Live update channel consumer.
//!
//! Each staff board holds one [`LiveFeed`] scoped to its role. The feed
//! owns a background task that keeps an SSE subscription open against the
//! collaborator and forwards one unit `()` per refresh-worthy message.
//! The channel transports *signals*, never order data, so the board always
//! refetches the authoritative queue.
//!
//! Reconnects are bounded: on a dropped stream the task backs off
//! exponentially (`base_delay * 2^attempt`, capped) up to
//! `max_attempts`, and the counter resets once a connection delivers its
//! handshake. When attempts are exhausted the signal channel closes, which
//! the owner surfaces as "live updates lost". Dropping the feed aborts the
//! task, so no subscription outlives its board.

pub mod decode;

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use blc_client::ApiClient;
use blc_config::LiveRetryConfig;

pub use decode::{classify, LiveSignal, SseFrameDecoder};

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// The two role-scoped subscriptions the collaborator offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Cashier,
    Dispatcher,
}

impl Channel {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Cashier => "/orders/sse/cashier",
            Self::Dispatcher => "/orders/sse/dispatcher",
        }
    }
}

// ---------------------------------------------------------------------------
// LiveFeed
// ---------------------------------------------------------------------------

pub struct LiveFeed {
    rx: mpsc::Receiver<()>,
    task: JoinHandle<()>,
}

impl LiveFeed {
    /// Subscribe to a role channel. The returned feed is live immediately;
    /// the connection (and any reconnects) happen on a background task.
    pub fn subscribe(client: ApiClient, channel: Channel, retry: LiveRetryConfig) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(run_feed(client, channel, retry, tx));
        Self { rx, task }
    }

    /// Wait for the next refresh signal. `None` means the feed gave up
    /// (retries exhausted): surface "live updates lost" and let the
    /// operator reload.
    pub async fn refreshed(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Backoff before reconnect `attempt` (0-based): doubles from the base,
/// capped at the configured ceiling.
pub fn backoff_delay(retry: &LiveRetryConfig, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(20);
    let ms = retry.base_delay_ms.saturating_mul(factor);
    Duration::from_millis(ms.min(retry.max_delay_ms))
}

// ---------------------------------------------------------------------------
// Feed task
// ---------------------------------------------------------------------------

async fn run_feed(
    client: ApiClient,
    channel: Channel,
    retry: LiveRetryConfig,
    tx: mpsc::Sender<()>,
) {
    let path = channel.path();
    let mut attempt: u32 = 0;

    loop {
        match client.open_stream(path).await {
            Ok(resp) => {
                debug!(path, "live channel connected");
                let mut decoder = SseFrameDecoder::default();
                let mut body = resp.bytes_stream();

                while let Some(chunk) = body.next().await {
                    let bytes = match chunk {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            warn!(path, error = %e, "live stream broke");
                            break;
                        }
                    };
                    for payload in decoder.push_chunk(&bytes) {
                        match classify(&payload) {
                            LiveSignal::Handshake => {
                                // Healthy connection: reset the retry budget.
                                attempt = 0;
                                debug!(path, "live handshake");
                            }
                            LiveSignal::Refresh => {
                                if tx.send(()).await.is_err() {
                                    // Owner went away; nothing left to signal.
                                    return;
                                }
                            }
                            LiveSignal::Ignored => {
                                debug!(path, "ignoring malformed live payload");
                            }
                        }
                    }
                }
                // Stream ended without an error chunk: treat as a drop.
            }
            Err(e) => {
                warn!(path, error = %e, "live connect failed");
            }
        }

        if attempt >= retry.max_attempts {
            warn!(path, attempts = attempt, "live updates lost; retries exhausted");
            return; // drops tx, closing the signal channel
        }
        let delay = backoff_delay(&retry, attempt);
        attempt += 1;
        info!(
            path,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "reconnecting live channel"
        );
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
