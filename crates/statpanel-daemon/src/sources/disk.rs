//! Filesystem usage via statvfs.

use std::ffi::CString;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl DiskUsage {
    /// Percentage of space used out of what non-root users can reach, matching `df`.
    pub fn percent_label(&self) -> String {
        let denom = self.used + self.available;
        if denom == 0 {
            return "0.0%".to_string();
        }
        format!("{:.1}%", 100.0 * self.used as f64 / denom as f64)
    }

    /// Used and total in GiB, e.g. "12.3G/29.1G".
    pub fn usage_label(&self) -> String {
        format!(
            "{:.1}G/{:.1}G",
            self.used as f64 / GIB,
            self.total as f64 / GIB
        )
    }
}

/// Returns usage for the filesystem containing `path`.
pub fn usage(path: &str) -> Option<DiskUsage> {
    let c_path = CString::new(path).ok()?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };

    // SAFETY: c_path is NUL-terminated and stat is a valid out pointer
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return None;
    }

    let frsize = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * frsize;
    let free = stat.f_bfree as u64 * frsize;
    let available = stat.f_bavail as u64 * frsize;
    Some(DiskUsage {
        total,
        used: total.saturating_sub(free),
        available,
    })
}
