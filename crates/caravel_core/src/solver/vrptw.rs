use tracing::debug;

use crate::{
    error::Result,
    problem::instance::Instance,
    solver::{insertion, solution::Solution, HeuristicParams, VrpProblem},
};

/// Capacitated VRP with time windows, selected when any job or vehicle
/// carries one.
pub struct Vrptw<'a> {
    instance: &'a Instance,
}

impl<'a> Vrptw<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Vrptw { instance }
    }
}

impl VrpProblem for Vrptw<'_> {
    fn solve(
        &self,
        exploration_level: u32,
        nb_thread: usize,
        params: &HeuristicParams,
    ) -> Result<Solution> {
        debug!(
            "Solving VRPTW with {} jobs and {} vehicles.",
            self.instance.jobs().len(),
            self.instance.vehicles().len()
        );

        insertion::construct(self.instance, true, exploration_level, nb_thread, params)
    }
}
