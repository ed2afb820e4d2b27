//! Telemetry Module
//!
//! In-process counters for estimates and orders:
//! - estimate successes and failures by error code
//! - average estimate latency
//! - orders created and rejected
//!
//! No addresses are recorded.

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::models::ErrorCode;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct TelemetryStats {
    /// Estimates that produced a result
    pub estimates_ok: u64,
    /// Estimates that failed, any reason
    pub estimates_failed: u64,
    /// Failures keyed by error code string
    pub failures_by_code: BTreeMap<String, u64>,
    /// Average latency of successful estimates (ms)
    pub avg_estimate_latency_ms: f64,
    /// Orders persisted with an estimate attached
    pub orders_created: u64,
    /// Orders refused because the estimate failed
    pub orders_rejected: u64,
    /// Collector start (unix seconds)
    pub period_start: i64,
    /// Snapshot time (unix seconds)
    pub period_end: i64,
}

/// Main telemetry collector
pub struct TelemetryCollector {
    estimates_ok: AtomicU64,
    estimates_failed: AtomicU64,
    total_latency_ms: AtomicU64,
    orders_created: AtomicU64,
    orders_rejected: AtomicU64,
    failures: DashMap<ErrorCode, u64>,
    session_start: i64,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            estimates_ok: AtomicU64::new(0),
            estimates_failed: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            orders_created: AtomicU64::new(0),
            orders_rejected: AtomicU64::new(0),
            failures: DashMap::new(),
            session_start: Utc::now().timestamp(),
        }
    }

    pub fn record_estimate(&self, latency_ms: u64) {
        self.estimates_ok.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_failure(&self, code: ErrorCode) {
        self.estimates_failed.fetch_add(1, Ordering::Relaxed);
        *self.failures.entry(code).or_insert(0) += 1;
    }

    pub fn record_order_created(&self) {
        self.orders_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_order_rejected(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let ok = self.estimates_ok.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);
        let avg = if ok > 0 {
            total_latency as f64 / ok as f64
        } else {
            0.0
        };

        let failures_by_code = self
            .failures
            .iter()
            .map(|entry| (entry.key().as_str().to_string(), *entry.value()))
            .collect();

        TelemetryStats {
            estimates_ok: ok,
            estimates_failed: self.estimates_failed.load(Ordering::Relaxed),
            failures_by_code,
            avg_estimate_latency_ms: avg,
            orders_created: self.orders_created.load(Ordering::Relaxed),
            orders_rejected: self.orders_rejected.load(Ordering::Relaxed),
            period_start: self.session_start,
            period_end: Utc::now().timestamp(),
        }
    }

    /// Write the current stats as JSON into `dir`, returning the file path
    pub fn export_stats_json(&self, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stats = self.get_stats();
        let path = dir.join(format!("stats_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));
        let body = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, body)?;
        info!(path = %path.display(), "Telemetry exported");
        Ok(path)
    }
}
