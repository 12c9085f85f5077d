//! Lightweight performance timing utilities.
//!
//! Timing is off unless enabled programmatically or through the `BF_TIMING`
//! environment variable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("BF_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and add the elapsed time to `acc` if enabled.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }

    /// Stop the timer and log the result if enabled.
    pub fn stop_and_log(self) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            tracing::info!("[TIMING] {}: {:.3}s", label, elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    /// Create a new accumulating timer.
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    /// Get number of calls.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    /// Reset the timer.
    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Heat source deposition timers.
pub mod deposition_timing {
    use super::AccumulatingTimer;

    /// Time spent moving beams along their paths
    pub static BEAM_MOVE: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent tracking transient source depth
    pub static DEPTH_UPDATE: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent integrating shape weights over cells
    pub static CELL_INTEGRATION: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent in the global power correction
    pub static POWER_CORRECTION: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent marking cells for refinement
    pub static REFINEMENT: AccumulatingTimer = AccumulatingTimer::new();

    /// Reset all deposition timers.
    pub fn reset_all() {
        BEAM_MOVE.reset();
        DEPTH_UPDATE.reset();
        CELL_INTEGRATION.reset();
        POWER_CORRECTION.reset();
        REFINEMENT.reset();
    }

    /// Log deposition timing summary.
    pub fn log_summary() {
        use super::is_enabled;
        if !is_enabled() {
            return;
        }

        let rows: [(&str, &AccumulatingTimer); 5] = [
            ("beam move", &BEAM_MOVE),
            ("depth update", &DEPTH_UPDATE),
            ("cell integration", &CELL_INTEGRATION),
            ("power correction", &POWER_CORRECTION),
            ("refinement", &REFINEMENT),
        ];

        tracing::info!("=== Deposition timing breakdown ===");
        for (label, timer) in rows {
            let count = timer.count();
            if count > 0 {
                tracing::info!(
                    "{:<18} {} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    count,
                    timer.total_seconds(),
                    timer.average_seconds() * 1000.0
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let t = AccumulatingTimer::new();
        assert_eq!(t.average_seconds(), 0.0);
        t.record(0.5);
        t.record(1.5);
        assert_eq!(t.count(), 2);
        assert!((t.total_seconds() - 2.0).abs() < 1e-6);
        assert!((t.average_seconds() - 1.0).abs() < 1e-6);
        t.reset();
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn stop_into_records_only_when_enabled() {
        let acc = AccumulatingTimer::new();
        enable_timing();
        Timer::start("enabled").stop_into(&acc);
        assert_eq!(acc.count(), 1);
        disable_timing();
    }
}
