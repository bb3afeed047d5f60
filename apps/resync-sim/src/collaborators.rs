//! In-memory stand-ins for the store, host and clock.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use resync_coordinator::{Action, Clock, DispatchFuture, Host, Store};
use serde_json::{Value, json};
use tracing::info;

/// Store that logs each dispatch and answers after a short delay.
pub struct LoggingStore {
    latency: Duration,
    generation: AtomicU64,
}

impl LoggingStore {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            generation: AtomicU64::new(0),
        }
    }
}

impl Store for LoggingStore {
    fn dispatch(&self, action: Action) -> DispatchFuture<'_> {
        Box::pin(async move {
            tokio::time::sleep(self.latency).await;
            info!(action = action.name(), payload = ?action.payload(), "dispatch");
            match action {
                Action::GetCacheKeys => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    Ok(json!({
                        "label": format!("label-{generation}"),
                        "inbox": format!("inbox-{generation}"),
                        "team": format!("team-{generation}"),
                    }))
                }
                _ => Ok(Value::Null),
            }
        })
    }

    fn chat_list_loading(&self) -> bool {
        false
    }
}

/// Host whose reload only logs.
pub struct LoggingHost;

impl Host for LoggingHost {
    fn reload(&self) {
        info!("full reload requested");
    }
}

/// Wall clock that can be pushed forward to fake long outages.
#[derive(Default)]
pub struct SkewedClock {
    offset_secs: AtomicI64,
}

impl SkewedClock {
    pub fn skip(&self, secs: i64) {
        self.offset_secs.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for SkewedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + TimeDelta::seconds(self.offset_secs.load(Ordering::Relaxed))
    }
}
