//! Cusp analysis: principal cusp, apex angle, real-cusp clusters and the
//! inhibitory-cascade height check.
//!
//! All functions take plain positions so they serve both detected cusps and
//! points read from a local-maxima table. Results that cannot be computed for
//! a given cusp set are returned as explicit `None` / `Err` values.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geom::{Point3, Tolerance, round_to};

/// Parameters of the cusp analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Maximum x gap between consecutive cusps of one cluster.
    pub cluster_threshold: f64,
    /// How far below the principal cusp (in z) another cusp may sit before
    /// the cascade check fails.
    pub cascade_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            cluster_threshold: 0.1,
            cascade_tolerance: 0.1,
        }
    }
}

/// Why the apex angle could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum UndefinedAngle {
    #[error("no cusps to measure")]
    NoCusps,
    #[error("no cusp lies left of the principal cusp")]
    NoLeftNeighbor,
    #[error("no cusp lies right of the principal cusp")]
    NoRightNeighbor,
    #[error("apex vectors have zero length")]
    DegenerateVector,
}

/// Angle at the principal cusp between its nearest left and right cusps,
/// measured in the x–z plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CuspAngle {
    /// Angle in radians, rounded to three decimals.
    pub radians: f64,
    /// Angle in degrees, rounded to three decimals.
    pub degrees: f64,
    pub left: Point3,
    pub apex: Point3,
    pub right: Point3,
}

/// Index of the cusp nearest the origin; ties keep the first occurrence.
#[must_use]
pub fn principal_cusp(points: &[Point3]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, point) in points.iter().enumerate() {
        let distance = point.distance_to_origin();
        log::debug!("cusp {idx} at {point:?}, distance to origin {distance}");
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((idx, distance));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Apex angle at `points[principal]`.
///
/// The left arm ends at the cusp with the largest x below the apex, the right
/// arm at the cusp with the smallest x above it.
pub fn apex_angle(points: &[Point3], principal: usize) -> Result<CuspAngle, UndefinedAngle> {
    let apex = *points.get(principal).ok_or(UndefinedAngle::NoCusps)?;

    let mut left: Option<Point3> = None;
    let mut right: Option<Point3> = None;
    for &p in points {
        if p.x < apex.x && left.is_none_or(|l| p.x > l.x) {
            left = Some(p);
        }
        if p.x > apex.x && right.is_none_or(|r| p.x < r.x) {
            right = Some(p);
        }
    }
    let left = left.ok_or(UndefinedAngle::NoLeftNeighbor)?;
    let right = right.ok_or(UndefinedAngle::NoRightNeighbor)?;

    let v1 = (left.x - apex.x, left.z - apex.z);
    let v2 = (right.x - apex.x, right.z - apex.z);
    let n1 = v1.0.hypot(v1.1);
    let n2 = v2.0.hypot(v2.1);
    if Tolerance::ZERO_LENGTH.is_zero_length(n1) || Tolerance::ZERO_LENGTH.is_zero_length(n2) {
        return Err(UndefinedAngle::DegenerateVector);
    }

    let dot = (v1.0 / n1) * (v2.0 / n2) + (v1.1 / n1) * (v2.1 / n2);
    let angle = dot.clamp(-1.0, 1.0).acos();
    log::debug!("apex angle {angle} rad: left {left:?}, apex {apex:?}, right {right:?}");

    Ok(CuspAngle {
        radians: round_to(angle, 3),
        degrees: round_to(degrees_from_radians(angle), 3),
        left,
        apex,
        right,
    })
}

/// Converts as `angle / 2π * 360`. This can differ from `f64::to_degrees`
/// in the last bit, which matters for values that round at a half-way point.
fn degrees_from_radians(angle: f64) -> f64 {
    angle / TAU * 360.0
}

/// Apex angle at the principal cusp of `points`.
pub fn cusp_angle(points: &[Point3]) -> Result<CuspAngle, UndefinedAngle> {
    let principal = principal_cusp(points).ok_or(UndefinedAngle::NoCusps)?;
    apex_angle(points, principal)
}

/// A run of x-sorted cusps with small gaps between neighbours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuspCluster {
    pub members: Vec<Point3>,
}

impl CuspCluster {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Distance in x between the first and last member.
    #[must_use]
    pub fn x_span(&self) -> f64 {
        match (self.members.first(), self.members.last()) {
            (Some(first), Some(last)) => last.x - first.x,
            _ => 0.0,
        }
    }
}

/// Groups cusps by x proximity.
///
/// Cusps are sorted by x; a new cluster starts whenever the gap to the most
/// recent member of the current cluster exceeds `threshold`.
#[must_use]
pub fn cluster_cusps(points: &[Point3], threshold: f64) -> Vec<CuspCluster> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut clusters: Vec<CuspCluster> = Vec::new();
    let mut current: Vec<Point3> = Vec::new();
    for p in sorted {
        if let Some(last) = current.last() {
            if (p.x - last.x).abs() > threshold {
                clusters.push(CuspCluster {
                    members: std::mem::take(&mut current),
                });
            }
        }
        current.push(p);
    }
    if !current.is_empty() {
        clusters.push(CuspCluster { members: current });
    }
    clusters
}

/// Number of clusters formed by [`cluster_cusps`]; zero when there are no cusps.
#[must_use]
pub fn real_cusp_count(points: &[Point3], threshold: f64) -> usize {
    cluster_cusps(points, threshold).len()
}

/// Outcome of the inhibitory-cascade height check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CascadeCheck {
    Pass,
    /// `cusp` sits lower in z than the principal cusp by more than the tolerance.
    Fail { cusp: usize, z: f64 },
}

impl CascadeCheck {
    #[must_use]
    pub fn passes(self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Checks that no other cusp is lower in z than the principal cusp by more
/// than `tolerance`. Runs on the un-clustered cusp list.
#[must_use]
pub fn inhibitory_cascade(points: &[Point3], principal: Option<usize>, tolerance: f64) -> CascadeCheck {
    let Some(principal) = principal else {
        return CascadeCheck::Pass;
    };
    let Some(reference) = points.get(principal) else {
        return CascadeCheck::Pass;
    };
    if points.len() < 2 {
        return CascadeCheck::Pass;
    }

    let limit = reference.z - tolerance;
    for (idx, p) in points.iter().enumerate() {
        if idx != principal && p.z < limit {
            log::debug!(
                "fails inhibitory cascade: cusp {idx} with z {} is lower than principal cusp z {}",
                p.z,
                reference.z
            );
            return CascadeCheck::Fail { cusp: idx, z: p.z };
        }
    }
    CascadeCheck::Pass
}

/// Everything derived from one cusp list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuspReport {
    pub cusp_count: usize,
    pub principal: Option<usize>,
    pub principal_position: Option<Point3>,
    pub angle: Result<CuspAngle, UndefinedAngle>,
    pub real_cusp_count: usize,
    pub cascade: CascadeCheck,
}

impl CuspReport {
    #[must_use]
    pub fn angle(&self) -> Option<&CuspAngle> {
        self.angle.as_ref().ok()
    }
}

/// Runs the full cusp analysis on `points`.
#[must_use]
pub fn analyze_cusps(points: &[Point3], options: &AnalysisOptions) -> CuspReport {
    let principal = principal_cusp(points);
    let angle = match principal {
        Some(idx) => apex_angle(points, idx),
        None => Err(UndefinedAngle::NoCusps),
    };
    if let Err(reason) = &angle {
        log::debug!("no angle calculated: {reason}");
    }

    CuspReport {
        cusp_count: points.len(),
        principal,
        principal_position: principal.and_then(|idx| points.get(idx).copied()),
        angle,
        real_cusp_count: real_cusp_count(points, options.cluster_threshold),
        cascade: inhibitory_cascade(points, principal, options.cascade_tolerance),
    }
}
