use tracing::debug;

use crate::{
    error::Result,
    problem::instance::Instance,
    solver::{insertion, solution::Solution, HeuristicParams, VrpProblem},
};

/// Capacitated VRP, selected when no entity carries a time window.
pub struct Cvrp<'a> {
    instance: &'a Instance,
}

impl<'a> Cvrp<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Cvrp { instance }
    }
}

impl VrpProblem for Cvrp<'_> {
    fn solve(
        &self,
        exploration_level: u32,
        nb_thread: usize,
        params: &HeuristicParams,
    ) -> Result<Solution> {
        debug!(
            "Solving CVRP with {} jobs and {} vehicles.",
            self.instance.jobs().len(),
            self.instance.vehicles().len()
        );

        insertion::construct(self.instance, false, exploration_level, nb_thread, params)
    }
}
