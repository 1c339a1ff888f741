//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Uploads (accepted, rejected by reason)
//! - Conversions (by media kind and outcome, duration)
//! - Retention sweeps (cycles, deletions, errors) and tracked originals

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Uploads
// =============================================================================

/// Uploads by result.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertino_uploads_total", "Total upload attempts"),
        &["result"], // "accepted", "unsupported_type", "too_large", "error"
    )
    .unwrap()
});

// =============================================================================
// Conversions
// =============================================================================

/// Conversions by media kind and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertino_conversions_total", "Total conversion attempts"),
        &["kind", "result"], // result: "success", "failed"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "convertino_conversion_duration_seconds",
            "Duration of a single conversion",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0]),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Retention
// =============================================================================

/// Completed sweep cycles.
pub static SWEEP_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("convertino_sweep_cycles_total", "Completed sweep cycles").unwrap()
});

/// Files deleted by the sweeper, by retention class.
pub static SWEEP_FILES_DELETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertino_sweep_files_deleted_total",
            "Files reclaimed by the retention sweeper",
        ),
        &["class"], // "original", "derived"
    )
    .unwrap()
});

/// Listing and deletion errors seen by the sweeper.
pub static SWEEP_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "convertino_sweep_errors_total",
        "Errors encountered while sweeping",
    )
    .unwrap()
});

/// Files currently registered as originals.
pub static ORIGINAL_FILES_TRACKED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "convertino_original_files_tracked",
        "Number of uploads registered as originals",
    )
    .unwrap()
});

/// All core metrics, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Uploads
        Box::new(UPLOADS_TOTAL.clone()),
        // Conversions
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        // Retention
        Box::new(SWEEP_CYCLES.clone()),
        Box::new(SWEEP_FILES_DELETED.clone()),
        Box::new(SWEEP_ERRORS.clone()),
        Box::new(ORIGINAL_FILES_TRACKED.clone()),
    ]
}
