//! Hostname, uptime, clock and SoC temperature.

use std::fs;

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

pub fn hostname() -> String {
    fs::read_to_string("/etc/hostname")
        .map(|s| s.trim().to_string())
        .or_else(|_| fs::read_to_string("/proc/sys/kernel/hostname").map(|s| s.trim().to_string()))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Local wall-clock time as "HH:MM:SS".
pub fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Uptime formatted as "Xd Yh Zm".
pub fn uptime() -> String {
    let secs = fs::read_to_string("/proc/uptime")
        .ok()
        .and_then(|content| {
            content
                .split_whitespace()
                .next()
                .and_then(|s| s.parse::<f64>().ok())
        })
        .map(|f| f as u64)
        .unwrap_or(0);
    format_uptime(secs)
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// SoC temperature from the first thermal zone, e.g. "48.3°C".
pub fn cpu_temperature() -> String {
    fs::read_to_string(THERMAL_ZONE)
        .ok()
        .and_then(|s| parse_millidegrees(&s))
        .map(|c| format!("{:.1}\u{b0}C", c))
        .unwrap_or_else(|| super::NOT_AVAILABLE.to_string())
}

fn parse_millidegrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<i64>().ok().map(|m| m as f64 / 1000.0)
}
