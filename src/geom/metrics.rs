//! Opt-in timing hooks for the analysis pipeline.
//!
//! Timing is only collected when the `analysis_metrics` feature is enabled.
//! When disabled, all timing calls compile to plain function calls and
//! [`AnalysisMetrics::end`] returns `None`.
//!
//! # Usage
//!
//! ```ignore
//! use crown_engine::geom::{AnalysisMetrics, TimingBucket};
//!
//! let mut metrics = AnalysisMetrics::default();
//! metrics.begin();
//!
//! let graph = metrics.time(TimingBucket::Adjacency, || AdjacencyGraph::from_mesh(&mesh));
//!
//! if let Some(report) = metrics.end() {
//!     println!("Adjacency: {} ns", report.adjacency_ns);
//! }
//! ```

use serde::Serialize;

/// Pipeline phases that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Reading and parsing the mesh description.
    Load,
    /// Building the adjacency graph and vertex → face map.
    Adjacency,
    /// Local-maximum search over the height field.
    CuspDetection,
    /// Principal cusp, angle, clustering and cascade check.
    CuspAnalysis,
    /// Face/vertex normals and orientation vote.
    Normals,
}

/// Cumulative nanoseconds per pipeline phase.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TimingReport {
    pub load_ns: u64,
    pub adjacency_ns: u64,
    pub cusp_detection_ns: u64,
    pub cusp_analysis_ns: u64,
    pub normals_ns: u64,
}

impl TimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.load_ns
            .saturating_add(self.adjacency_ns)
            .saturating_add(self.cusp_detection_ns)
            .saturating_add(self.cusp_analysis_ns)
            .saturating_add(self.normals_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Load => &mut self.load_ns,
            TimingBucket::Adjacency => &mut self.adjacency_ns,
            TimingBucket::CuspDetection => &mut self.cusp_detection_ns,
            TimingBucket::CuspAnalysis => &mut self.cusp_analysis_ns,
            TimingBucket::Normals => &mut self.normals_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating on overflow.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.bucket_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator for timing pipeline phases.
#[derive(Debug, Default)]
pub struct AnalysisMetrics {
    #[cfg(feature = "analysis_metrics")]
    report: TimingReport,
}

impl AnalysisMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(feature = "analysis_metrics")]
        {
            self.report = TimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<TimingReport> {
        #[cfg(feature = "analysis_metrics")]
        {
            Some(self.report.clone())
        }
        #[cfg(not(feature = "analysis_metrics"))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(feature = "analysis_metrics")]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(feature = "analysis_metrics"))]
        {
            let _ = bucket;
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_add_saturates() {
        let mut report = TimingReport::default();
        report.add(TimingBucket::Load, u64::MAX);
        report.add(TimingBucket::Load, 10);
        report.add(TimingBucket::Normals, 5);
        assert_eq!(report.load_ns, u64::MAX);
        assert_eq!(report.normals_ns, 5);
        assert_eq!(report.total_ns(), u64::MAX);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut metrics = AnalysisMetrics::default();
        metrics.begin();
        let value = metrics.time(TimingBucket::CuspAnalysis, || 41 + 1);
        assert_eq!(value, 42);

        #[cfg(not(feature = "analysis_metrics"))]
        assert!(metrics.end().is_none());
        #[cfg(feature = "analysis_metrics")]
        assert!(metrics.end().is_some());
    }
}
