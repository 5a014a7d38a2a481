//! Small datasets with known results.

use serde::{Deserialize, Serialize};

/// Pre-grouped `key\tcount` lines for a one-column [`GroupedSum`](crate::aggregators::GroupedSum).
#[must_use]
pub fn grouped_sum_input() -> Vec<String> {
    super::lines([
        "100\t3", "100\t5", "101\t2", "102\t1", "102\t1", "102\t1", "102\t1", "103\t9",
    ])
}

/// What [`grouped_sum_input`] reduces to.
#[must_use]
pub fn grouped_sum_expected() -> Vec<String> {
    super::lines(["100\t8", "101\t2", "102\t4", "103\t9"])
}

/// Pre-grouped `unique\tindex` lines for [`IndexedCount`](crate::aggregators::IndexedCount).
#[must_use]
pub fn indexed_count_input() -> Vec<String> {
    super::lines([
        "100\t1000",
        "100\t1000",
        "100\t1000",
        "100\t1001",
        "200\t1000",
        "200\t1000",
        "200\t1001",
    ])
}

/// What [`indexed_count_input`] reduces to.
#[must_use]
pub fn indexed_count_expected() -> Vec<String> {
    super::lines(["100\t1000\t3", "100\t1001\t1", "200\t1000\t2", "200\t1001\t1"])
}

/// One web server access, as a map stage would see it after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleLogEntry {
    pub timestamp: u64,
    pub ip: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub bytes: u64,
}

impl SampleLogEntry {
    /// Field names in [`to_line`](Self::to_line) order.
    pub const FIELDS: [&'static str; 6] = ["timestamp", "ip", "method", "path", "status", "bytes"];

    /// Tab-separated form, columns in [`FIELDS`](Self::FIELDS) order.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.timestamp, self.ip, self.method, self.path, self.status, self.bytes
        )
    }
}

fn entry(timestamp: u64, ip: &str, method: &str, path: &str, status: u16, bytes: u64) -> SampleLogEntry {
    SampleLogEntry {
        timestamp,
        ip: ip.to_string(),
        method: method.to_string(),
        path: path.to_string(),
        status,
        bytes,
    }
}

/// A handful of access-log entries: three clients, two paths, mixed statuses.
///
/// ```
/// use tabreduce::testing::sample_log_entries;
///
/// let logs = sample_log_entries();
/// assert_eq!(logs.iter().filter(|e| e.ip == "192.168.1.100").count(), 3);
/// ```
#[must_use]
pub fn sample_log_entries() -> Vec<SampleLogEntry> {
    vec![
        entry(1_000_000, "192.168.1.100", "GET", "/api/users", 200, 1024),
        entry(1_000_100, "192.168.1.101", "POST", "/api/users", 201, 512),
        entry(1_000_200, "192.168.1.102", "GET", "/api/posts", 200, 2048),
        entry(1_000_300, "192.168.1.100", "GET", "/api/users", 404, 256),
        entry(1_000_400, "192.168.1.101", "DELETE", "/api/posts", 500, 128),
        entry(1_000_500, "192.168.1.100", "GET", "/api/posts", 200, 4096),
    ]
}

/// [`sample_log_entries`] as tab-separated lines.
#[must_use]
pub fn sample_log_lines() -> Vec<String> {
    sample_log_entries().iter().map(SampleLogEntry::to_line).collect()
}
