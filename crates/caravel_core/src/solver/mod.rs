pub mod cvrp;
pub mod eval;
mod insertion;
pub mod solution;
#[cfg(feature = "check")]
pub mod validate;
pub mod vrptw;

use crate::error::Result;
use crate::solver::solution::Solution;

/// Knobs for the constructive search.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicParams {
    /// With a positive coefficient, job selection switches from static
    /// priority order to regret-based: the next job inserted is the one
    /// losing the most when pushed to its second-best vehicle.
    pub regret_coeff: f64,
}

/// The handoff between problem preparation and optimization: a prepared,
/// read-only instance goes in, a solution comes back.
pub trait VrpProblem {
    fn solve(
        &self,
        exploration_level: u32,
        nb_thread: usize,
        params: &HeuristicParams,
    ) -> Result<Solution>;
}
