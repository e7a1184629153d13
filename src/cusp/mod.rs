mod analyze;
mod detect;

pub use analyze::{
    AnalysisOptions, CascadeCheck, CuspAngle, CuspCluster, CuspReport, UndefinedAngle,
    analyze_cusps, apex_angle, cluster_cusps, cusp_angle, inhibitory_cascade, principal_cusp,
    real_cusp_count,
};
pub use detect::{
    Cusp, CuspOptions, DetectionDiagnostics, cusp_positions, detect_cusps,
    detect_cusps_with_diagnostics,
};
