//! Backlog hygiene built on top of readiness scoring: stale-issue culling and
//! refinement meeting preparation.

mod cull;
mod refinement;
pub mod router;
mod staleness;

pub use cull::{BacklogCull, CullAnalysis, CullReport, CullSummary};
pub use refinement::{
    DeterministicField, RefinementItem, RefinementPrep, RefinementReport, RefinementSettings,
    RefinementSummary,
};
pub use router::backlog_router;
pub use staleness::{
    compute_staleness, CullOverrides, CullThresholds, StalenessError, StalenessFactors,
    StalenessLabel, StalenessResult, StalenessWeights,
};
