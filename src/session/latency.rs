//! Round-trip latency accumulator.

use std::time::Duration;

/// Latest sample and running mean after a [`LatencyTracker::record`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    /// Most recent round trip, in milliseconds.
    pub latest_ms: f64,
    /// Arithmetic mean over every recorded sample, in milliseconds.
    pub mean_ms: f64,
}

impl LatencySummary {
    /// Human-readable status line, values rounded to whole milliseconds.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "Response time: {:.0} ms (avg: {:.0} ms)",
            self.latest_ms.round(),
            self.mean_ms.round()
        )
    }
}

/// Ordered sequence of round-trip samples.
///
/// The mean is always derived from the samples, never cached, so it cannot
/// drift from `sum / count`.
#[derive(Debug, Clone, Default)]
pub struct LatencyTracker {
    samples: Vec<Duration>,
}

impl LatencyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample and return the updated summary.
    pub fn record(&mut self, elapsed: Duration) -> LatencySummary {
        self.samples.push(elapsed);
        LatencySummary {
            latest_ms: as_millis(elapsed),
            mean_ms: self.mean_ms().unwrap_or_default(),
        }
    }

    /// Most recent sample in milliseconds.
    #[must_use]
    pub fn latest_ms(&self) -> Option<f64> {
        self.samples.last().copied().map(as_millis)
    }

    /// Mean of all samples in milliseconds, `None` before the first record.
    #[must_use]
    pub fn mean_ms(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.samples.len() as f64;
        Some(as_millis(total) / count)
    }

    /// Summary of the current state, `None` before the first record.
    #[must_use]
    pub fn summary(&self) -> Option<LatencySummary> {
        Some(LatencySummary {
            latest_ms: self.latest_ms()?,
            mean_ms: self.mean_ms()?,
        })
    }

    #[must_use]
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
