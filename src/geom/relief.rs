//! Crown relief: the vertical (z) extent of a mesh.
//!
//! Simulated crowns that barely rise above their base carry no usable cusp
//! information, so batches are screened by relief before cusp analysis.

use serde::{Deserialize, Serialize};

use super::mesh::CrownMesh;

/// Options for relief classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliefOptions {
    /// Minimum z extent for a crown to count as tall enough.
    pub min_relief: f64,
}

impl Default for ReliefOptions {
    fn default() -> Self {
        Self { min_relief: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliefClass {
    TallEnough,
    TooFlat,
}

/// Relief of a mesh together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReliefReport {
    pub relief: f64,
    pub class: ReliefClass,
}

/// `max z - min z`, or `None` for an empty mesh.
#[must_use]
pub fn crown_relief(mesh: &CrownMesh) -> Option<f64> {
    mesh.z_extent().map(|(lo, hi)| hi - lo)
}

#[must_use]
pub fn classify_relief(relief: f64, options: &ReliefOptions) -> ReliefClass {
    if relief < options.min_relief {
        ReliefClass::TooFlat
    } else {
        ReliefClass::TallEnough
    }
}

#[must_use]
pub fn relief_report(mesh: &CrownMesh, options: &ReliefOptions) -> Option<ReliefReport> {
    let relief = crown_relief(mesh)?;
    Some(ReliefReport {
        relief,
        class: classify_relief(relief, options),
    })
}
