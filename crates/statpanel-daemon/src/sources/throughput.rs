//! Per-interface throughput computed from cumulative byte counters.

use crate::clock::Clock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Samples closer together than this reuse the previous rate.
const MIN_INTERVAL: Duration = Duration::from_millis(500);
/// Samples older than this are discarded and the interface re-baselined.
const EXPIRY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
struct Sample {
    rx: u64,
    tx: u64,
    at: Instant,
    rx_rate: f64,
    tx_rate: f64,
}

/// Time-stamped counter cache keyed by interface name.
pub struct ThroughputCache<C: Clock> {
    clock: C,
    samples: HashMap<String, Sample>,
}

impl<C: Clock> ThroughputCache<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            samples: HashMap::new(),
        }
    }

    /// Records counters for `interface` and returns (rx, tx) in bytes per second.
    ///
    /// A first or expired sample reports zero rates. Counter resets are
    /// treated as zero traffic.
    pub fn update(&mut self, interface: &str, (rx, tx): (u64, u64)) -> (f64, f64) {
        let now = self.clock.now();

        let next = match self.samples.get(interface) {
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev.at);
                if elapsed < MIN_INTERVAL {
                    return (prev.rx_rate, prev.tx_rate);
                }
                if elapsed > EXPIRY {
                    Sample {
                        rx,
                        tx,
                        at: now,
                        rx_rate: 0.0,
                        tx_rate: 0.0,
                    }
                } else {
                    let secs = elapsed.as_secs_f64();
                    Sample {
                        rx,
                        tx,
                        at: now,
                        rx_rate: rx.saturating_sub(prev.rx) as f64 / secs,
                        tx_rate: tx.saturating_sub(prev.tx) as f64 / secs,
                    }
                }
            }
            None => Sample {
                rx,
                tx,
                at: now,
                rx_rate: 0.0,
                tx_rate: 0.0,
            },
        };

        self.samples.insert(interface.to_string(), next);
        (next.rx_rate, next.tx_rate)
    }
}
