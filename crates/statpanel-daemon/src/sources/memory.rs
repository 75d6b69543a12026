//! Memory usage from /proc/meminfo.

use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemInfo {
    pub fn used_kb(&self) -> u64 {
        self.total_kb.saturating_sub(self.available_kb)
    }

    pub fn percent_label(&self) -> String {
        if self.total_kb == 0 {
            return "0.0%".to_string();
        }
        format!(
            "{:.1}%",
            100.0 * self.used_kb() as f64 / self.total_kb as f64
        )
    }

    /// Used and total in MiB, e.g. "1843/3794MB".
    pub fn usage_label(&self) -> String {
        format!("{}/{}MB", self.used_kb() / 1024, self.total_kb / 1024)
    }
}

pub fn read_meminfo() -> Option<MemInfo> {
    let content = fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo(&content)
}

fn parse_meminfo(content: &str) -> Option<MemInfo> {
    let field = |key: &str| {
        content
            .lines()
            .find(|line| line.starts_with(key))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|v| v.parse::<u64>().ok())
    };
    Some(MemInfo {
        total_kb: field("MemTotal:")?,
        available_kb: field("MemAvailable:")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let content = "MemTotal:        4096000 kB\nMemFree:          100000 kB\nMemAvailable:    1024000 kB\n";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.total_kb, 4_096_000);
        assert_eq!(info.available_kb, 1_024_000);
        assert_eq!(info.percent_label(), "75.0%");
        assert_eq!(info.usage_label(), "3000/4000MB");
    }

    #[test]
    fn test_parse_meminfo_missing_field() {
        assert_eq!(parse_meminfo("MemTotal: 10 kB\n"), None);
    }
}
