use fxhash::FxHashSet;
use tracing::debug;

use crate::{
    error::{Error, Result},
    problem::{amount::Amount, instance::Instance, job::JobKind},
    solver::{
        eval,
        insertion::{accumulate_route, build_route, unassigned_entry},
        solution::{Solution, Violation},
    },
};

/// Validates the pre-planned route of every vehicle: assigns ETAs with
/// the same walk the solver uses, then records load, skill, window and
/// precedence violations instead of refusing the plan.
pub(crate) fn check_routes(instance: &Instance, planned: &[Vec<usize>]) -> Result<Solution> {
    let jobs = instance.jobs();
    let vehicles = instance.vehicles();
    let mut solution = Solution::default();
    let mut planned_ranks: FxHashSet<usize> = FxHashSet::default();

    for (v, ranks) in planned.iter().enumerate() {
        planned_ranks.extend(ranks.iter().copied());

        if ranks.is_empty() {
            continue;
        }

        let vehicle = &vehicles[v];
        let matrix = instance.matrix(vehicle.profile()).ok_or_else(|| {
            Error::Internal(format!("No matrix for profile {}.", vehicle.profile()))
        })?;

        debug!(
            "Checking {} planned steps for vehicle {}.",
            ranks.len(),
            vehicle.id()
        );

        let mut timeline = eval::walk_route(vehicle, jobs, ranks, matrix);
        let offset = usize::from(vehicle.start().is_some());

        if instance.has_skills() {
            for (position, &rank) in ranks.iter().enumerate() {
                if !jobs[rank].skills().is_subset(vehicle.skills()) {
                    timeline.steps[offset + position]
                        .violations
                        .push(Violation::Skills);
                }
            }
        }

        for (position, &rank) in ranks.iter().enumerate() {
            let paired = match jobs[rank].kind() {
                JobKind::Pickup => ranks[position + 1..].contains(&(rank + 1)),
                JobKind::Delivery => ranks[..position].contains(&(rank - 1)),
                JobKind::Single => true,
            };

            if !paired {
                timeline.steps[offset + position]
                    .violations
                    .push(Violation::Precedence);
            }
        }

        // Initial load: single-job deliveries, plus deliveries whose
        // pickup was planned on another vehicle or not at all.
        let mut load = Amount::zeros(vehicle.capacity().len());
        for &rank in ranks.iter() {
            let job = &jobs[rank];
            match job.kind() {
                JobKind::Single => load += job.delivery(),
                JobKind::Delivery if !ranks.contains(&(rank - 1)) => load += job.delivery(),
                _ => {}
            }
        }

        if !load.fits_in(vehicle.capacity()) {
            timeline.violations.push(Violation::Load);
        }

        for (position, &rank) in ranks.iter().enumerate() {
            let job = &jobs[rank];

            match job.kind() {
                JobKind::Single => {
                    load -= job.delivery();
                    load += job.pickup();
                }
                JobKind::Pickup => load += job.pickup(),
                JobKind::Delivery => load -= job.delivery(),
            }

            if !load.fits_in(vehicle.capacity()) {
                timeline.steps[offset + position]
                    .violations
                    .push(Violation::Load);
            }
        }

        for step in &timeline.steps {
            for violation in &step.violations {
                if !timeline.violations.contains(violation) {
                    timeline.violations.push(*violation);
                }
            }
        }

        let route = build_route(instance, vehicle, ranks, matrix, &timeline);
        accumulate_route(&mut solution.summary, &route);
        solution.routes.push(route);
    }

    for (rank, job) in jobs.iter().enumerate() {
        if !planned_ranks.contains(&rank) {
            solution.unassigned.push(unassigned_entry(job));
        }
    }

    solution.summary.unassigned = solution.unassigned.len();

    Ok(solution)
}
