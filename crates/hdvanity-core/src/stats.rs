//! Live search statistics

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Thread-safe search counters shared by all workers
#[derive(Debug)]
pub struct SearchStats {
    /// Indices a worker has started on
    scanned: AtomicU64,
    /// Indices fully derived and tested
    processed: AtomicU64,
    /// Matches currently held
    found: AtomicU32,
    /// Indices skipped because the child key was invalid
    skipped: AtomicU64,
    start_time: Instant,
    running: AtomicBool,
}

impl SearchStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn begin_index(&self) {
        self.scanned.fetch_add(1, Ordering::AcqRel);
    }

    pub fn finish_index(&self) {
        self.processed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Held matches only grow, so concurrent updates keep the largest
    pub fn set_found(&self, found: u32) {
        self.found.fetch_max(found, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Consistent sample: `processed` is read first so it never exceeds `scanned`
    pub fn snapshot(&self) -> Progress {
        let processed = self.processed.load(Ordering::Acquire);
        let scanned = self.scanned.load(Ordering::Acquire);
        Progress {
            processed,
            scanned,
            found: self.found.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            scanned: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            found: AtomicU32::new(0),
            skipped: AtomicU64::new(0),
            start_time: Instant::now(),
            running: AtomicBool::new(true),
        }
    }
}

/// One progress sample handed to the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub processed: u64,
    pub scanned: u64,
    pub found: u32,
    pub skipped: u64,
    pub elapsed: Duration,
}

impl Progress {
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get formatted stats string
    pub fn format(&self, difficulty: Option<f64>) -> String {
        let keys = self.processed;
        let kps = self.keys_per_second();

        let mut line = format!(
            "[{} key/s][Processed {}][Found {}]",
            format_keys(kps as u64),
            format_keys(keys),
            self.found
        );

        if let Some(difficulty) = difficulty.filter(|d| *d > 0.0) {
            let prob = 1.0 - (-(keys as f64) / difficulty).exp();

            // ETA for 50%
            let remaining_for_50 = if prob < 0.5 && kps > 0.0 {
                let keys_needed = difficulty * std::f64::consts::LN_2 - keys as f64;
                keys_needed / kps
            } else {
                0.0
            };

            line.push_str(&format!(
                "[Prob {:.1}%][50% in {}]",
                prob * 100.0,
                format_duration(remaining_for_50)
            ));
        }

        if self.skipped > 0 {
            line.push_str(&format!("[Skipped {}]", self.skipped));
        }
        line
    }
}

fn format_keys(keys: u64) -> String {
    if keys >= 1_000_000_000_000 {
        format!("{:.2}T", keys as f64 / 1e12)
    } else if keys >= 1_000_000_000 {
        format!("{:.2}G", keys as f64 / 1e9)
    } else if keys >= 1_000_000 {
        format!("{:.2}M", keys as f64 / 1e6)
    } else if keys >= 1000 {
        format!("{:.2}K", keys as f64 / 1e3)
    } else {
        format!("{}", keys)
    }
}

fn format_duration(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "now".to_string();
    }
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.0}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.0}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds < 86400.0 * 365.0 {
        format!("{:.1}d", seconds / 86400.0)
    } else {
        format!("{:.1}y", seconds / (86400.0 * 365.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = SearchStats::new();
        stats.begin_index();
        stats.begin_index();
        stats.finish_index();
        stats.record_skip();
        stats.set_found(1);

        let progress = stats.snapshot();
        assert_eq!(progress.scanned, 2);
        assert_eq!(progress.processed, 1);
        assert_eq!(progress.skipped, 1);
        assert_eq!(progress.found, 1);
    }

    #[test]
    fn test_stop() {
        let stats = SearchStats::new();
        assert!(stats.is_running());
        stats.stop();
        assert!(!stats.is_running());
    }

    #[test]
    fn test_format() {
        let progress = Progress {
            processed: 1500,
            scanned: 1502,
            found: 2,
            skipped: 0,
            elapsed: Duration::from_secs(1),
        };
        let line = progress.format(None);
        assert_eq!(line, "[1.50K key/s][Processed 1.50K][Found 2]");
        assert!(progress.format(Some(58.0)).contains("[Prob "));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_keys(999), "999");
        assert_eq!(format_keys(2_500_000), "2.50M");
        assert_eq!(format_duration(0.0), "now");
        assert_eq!(format_duration(90.0), "2m");
        assert_eq!(format_duration(7200.0), "2.0h");
    }
}
