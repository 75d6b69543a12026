//! CPU usage from /proc/stat.

use std::fs;

/// Tracks /proc/stat counters between samples.
pub struct CpuSensor {
    last_idle: u64,
    last_total: u64,
    last_sample: Option<f64>,
}

impl CpuSensor {
    pub fn new() -> Self {
        Self {
            last_idle: 0,
            last_total: 0,
            last_sample: None,
        }
    }

    /// Returns busy percentage since the previous call.
    ///
    /// The first call only records a baseline and reports `None`.
    pub fn sample(&mut self) -> Option<f64> {
        let content = fs::read_to_string("/proc/stat").ok()?;
        let (idle, total) = parse_proc_stat(&content)?;
        self.update(idle, total)
    }

    fn update(&mut self, idle: u64, total: u64) -> Option<f64> {
        if self.last_total > 0 {
            let idle_delta = idle.saturating_sub(self.last_idle);
            let total_delta = total.saturating_sub(self.last_total);
            if total_delta > 0 {
                self.last_sample = Some(100.0 * (1.0 - (idle_delta as f64 / total_delta as f64)));
            }
        }
        self.last_idle = idle;
        self.last_total = total;
        self.last_sample
    }
}

impl Default for CpuSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts (idle, total) jiffies from the aggregate `cpu` line.
fn parse_proc_stat(content: &str) -> Option<(u64, u64)> {
    let line = content.lines().next()?;
    let parts: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|s| s.parse().ok())
        .collect();

    if parts.len() >= 4 {
        Some((parts[3], parts.iter().sum()))
    } else {
        None
    }
}
