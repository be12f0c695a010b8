//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tbase::TimeSeries;

pub const OHLC: [&str; 4] = ["Open", "High", "Low", "Close"];

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Midnight UTC of trading day `n`, counting from 1.
pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 1, 4, 0, 0, 0).unwrap() + Duration::days(i64::from(n) - 1)
}

/// Deterministic OHLC rows for `n` days, added newest first so the store
/// has to do the ordering.
pub fn ebay(days: u32) -> TimeSeries {
    let mut series = TimeSeries::new("EBAY", OHLC);
    for n in (1..=days).rev() {
        series.add_observation(day(n), row(n)).unwrap();
    }
    series
}

pub fn row(n: u32) -> Vec<f64> {
    let base = 26.0 + f64::from(n) * 0.37;
    vec![base, base + 0.81, base - 0.43, base + 0.1 / 3.0]
}
