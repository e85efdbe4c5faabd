use std::cmp::Reverse;

use caravel_routing::{Cost, Matrix};
use tracing::debug;

use crate::{
    error::{Error, Result},
    problem::{
        amount::Amount,
        instance::Instance,
        job::{Job, JobKind, Priority},
        time_window::Duration,
        vehicle::Vehicle,
    },
    solver::{
        eval,
        solution::{Route, Solution, Step, StepKind, UnassignedJob},
        HeuristicParams,
    },
};

/// One insertable entity: a single job, or a pickup whose delivery sits
/// at the next rank and moves with it.
#[derive(Debug, Clone, Copy)]
enum Unit {
    Single(usize),
    Shipment(usize),
}

impl Unit {
    fn primary_rank(&self) -> usize {
        match self {
            Unit::Single(rank) | Unit::Shipment(rank) => *rank,
        }
    }
}

struct Insertion {
    vehicle: usize,
    route: Vec<usize>,
    delta: u64,
}

/// Deterministic cheapest-insertion construction, optionally followed by
/// a bounded relocate improvement phase. Used by both problem variants;
/// `with_tw` turns on time-window feasibility checks.
pub(crate) fn construct(
    instance: &Instance,
    with_tw: bool,
    exploration_level: u32,
    _nb_thread: usize,
    params: &HeuristicParams,
) -> Result<Solution> {
    let jobs = instance.jobs();
    let vehicles = instance.vehicles();
    let matrices = vehicle_matrices(instance)?;

    let mut units = Vec::new();
    let mut rank = 0;
    while rank < jobs.len() {
        match jobs[rank].kind() {
            JobKind::Pickup => {
                units.push(Unit::Shipment(rank));
                rank += 2;
            }
            _ => {
                units.push(Unit::Single(rank));
                rank += 1;
            }
        }
    }

    units.sort_by_key(|unit| {
        let job = &jobs[unit.primary_rank()];
        (Reverse(job.priority()), job.id())
    });

    let mut routes: Vec<Vec<usize>> = vec![Vec::new(); vehicles.len()];
    let mut unassigned: Vec<Unit> = Vec::new();

    if params.regret_coeff > 0.0 {
        let mut remaining = units;

        while !remaining.is_empty() {
            let mut chosen: Option<(usize, Insertion, f64)> = None;

            for (i, unit) in remaining.iter().enumerate() {
                let (best, second) = best_two_insertions(
                    instance, jobs, vehicles, &matrices, &routes, *unit, with_tw,
                );

                let best = match best {
                    Some(best) => best,
                    None => continue,
                };

                // Trade regret (what inserting later would cost) against
                // greed (what inserting now costs).
                let score = match second {
                    Some(second) => {
                        params.regret_coeff * (second - best.delta) as f64 - best.delta as f64
                    }
                    None => f64::INFINITY,
                };

                let better = match &chosen {
                    None => true,
                    Some((_, _, current)) => score > *current,
                };

                if better {
                    chosen = Some((i, best, score));
                }
            }

            match chosen {
                Some((i, insertion, _)) => {
                    routes[insertion.vehicle] = insertion.route;
                    remaining.remove(i);
                }
                None => {
                    unassigned.append(&mut remaining);
                }
            }
        }
    } else {
        for unit in units {
            let (best, _) =
                best_two_insertions(instance, jobs, vehicles, &matrices, &routes, unit, with_tw);

            match best {
                Some(insertion) => routes[insertion.vehicle] = insertion.route,
                None => unassigned.push(unit),
            }
        }
    }

    if exploration_level > 0 {
        let max_moves = exploration_level as usize * jobs.len().max(1);
        let mut moves = 0;

        while moves < max_moves
            && relocate_once(instance, jobs, vehicles, &matrices, &mut routes, with_tw)
        {
            moves += 1;
        }

        debug!("Applied {} relocate moves.", moves);
    }

    build_solution(instance, &matrices, &routes, &unassigned)
}

fn vehicle_matrices(instance: &Instance) -> Result<Vec<&Matrix<Cost>>> {
    instance
        .vehicles()
        .iter()
        .map(|vehicle| {
            instance.matrix(vehicle.profile()).ok_or_else(|| {
                Error::Internal(format!("No matrix for profile {}.", vehicle.profile()))
            })
        })
        .collect()
}

fn candidate_delta(
    vehicle: &Vehicle,
    jobs: &[Job],
    candidate: &[usize],
    matrix: &Matrix<Cost>,
    base: u64,
    with_tw: bool,
) -> Option<u64> {
    if !eval::route_capacity_ok(vehicle, jobs, candidate) {
        return None;
    }

    if with_tw && !eval::route_tw_ok(vehicle, jobs, candidate, matrix) {
        return None;
    }

    Some(eval::route_cost(vehicle, jobs, candidate, matrix).saturating_sub(base))
}

fn offer(
    best: &mut Option<Insertion>,
    second: &mut Option<u64>,
    vehicle: usize,
    candidate: Vec<usize>,
    delta: u64,
) {
    match best {
        Some(current) if delta >= current.delta => {
            *second = Some(second.map_or(delta, |s| s.min(delta)));
        }
        _ => {
            if let Some(previous) = best.take() {
                *second = Some(second.map_or(previous.delta, |s| s.min(previous.delta)));
            }

            *best = Some(Insertion {
                vehicle,
                route: candidate,
                delta,
            });
        }
    }
}

/// Cheapest and second-cheapest feasible insertions of `unit` across all
/// compatible vehicles and positions. Vehicle and position iteration
/// order break ties, keeping the search deterministic.
fn best_two_insertions(
    instance: &Instance,
    jobs: &[Job],
    vehicles: &[Vehicle],
    matrices: &[&Matrix<Cost>],
    routes: &[Vec<usize>],
    unit: Unit,
    with_tw: bool,
) -> (Option<Insertion>, Option<u64>) {
    let mut best: Option<Insertion> = None;
    let mut second: Option<u64> = None;

    for (v, vehicle) in vehicles.iter().enumerate() {
        if !instance.vehicle_ok_with_job(v.into(), unit.primary_rank().into()) {
            continue;
        }

        let ranks = &routes[v];
        let base = eval::route_cost(vehicle, jobs, ranks, matrices[v]);

        match unit {
            Unit::Single(rank) => {
                for position in 0..=ranks.len() {
                    let mut candidate = ranks.clone();
                    candidate.insert(position, rank);

                    if let Some(delta) =
                        candidate_delta(vehicle, jobs, &candidate, matrices[v], base, with_tw)
                    {
                        offer(&mut best, &mut second, v, candidate, delta);
                    }
                }
            }
            Unit::Shipment(rank) => {
                for pickup_position in 0..=ranks.len() {
                    for delivery_position in (pickup_position + 1)..=(ranks.len() + 1) {
                        let mut candidate = ranks.clone();
                        candidate.insert(pickup_position, rank);
                        candidate.insert(delivery_position, rank + 1);

                        if let Some(delta) =
                            candidate_delta(vehicle, jobs, &candidate, matrices[v], base, with_tw)
                        {
                            offer(&mut best, &mut second, v, candidate, delta);
                        }
                    }
                }
            }
        }
    }

    (best, second)
}

/// Applies the first strictly improving relocation of a single job,
/// pruning target vehicles through the vehicle-to-vehicle table.
fn relocate_once(
    instance: &Instance,
    jobs: &[Job],
    vehicles: &[Vehicle],
    matrices: &[&Matrix<Cost>],
    routes: &mut [Vec<usize>],
    with_tw: bool,
) -> bool {
    for from in 0..routes.len() {
        for position in 0..routes[from].len() {
            let rank = routes[from][position];

            if jobs[rank].kind() != JobKind::Single {
                continue;
            }

            let mut source = routes[from].clone();
            source.remove(position);

            let source_old = eval::route_cost(&vehicles[from], jobs, &routes[from], matrices[from]);
            let source_new = eval::route_cost(&vehicles[from], jobs, &source, matrices[from]);
            let gain = source_old as i64 - source_new as i64;

            for to in 0..routes.len() {
                if !instance.vehicle_ok_with_vehicle(from.into(), to.into()) {
                    continue;
                }

                if !instance.vehicle_ok_with_job(to.into(), rank.into()) {
                    continue;
                }

                let target_ranks = if to == from { &source } else { &routes[to] };
                let target_old =
                    eval::route_cost(&vehicles[to], jobs, target_ranks, matrices[to]);

                for insert_position in 0..=target_ranks.len() {
                    if to == from && insert_position == position {
                        continue;
                    }

                    let mut candidate = target_ranks.clone();
                    candidate.insert(insert_position, rank);

                    let delta = match candidate_delta(
                        &vehicles[to],
                        jobs,
                        &candidate,
                        matrices[to],
                        target_old,
                        with_tw,
                    ) {
                        Some(delta) => delta as i64,
                        None => continue,
                    };

                    if delta < gain {
                        routes[from] = source;
                        routes[to] = candidate;
                        return true;
                    }
                }
            }
        }
    }

    false
}

fn step_location(vehicle: &Vehicle, jobs: &[Job], step: &eval::TimelineStep) -> Option<[f64; 2]> {
    let point = match step.kind {
        StepKind::Start => vehicle.start().and_then(|location| location.point()),
        StepKind::End => vehicle.end().and_then(|location| location.point()),
        _ => step.rank.and_then(|rank| jobs[rank].location().point()),
    };

    point.map(|point| [point.x(), point.y()])
}

/// Assembles the output route for a served sequence, with timings taken
/// from an already computed timeline.
pub(super) fn build_route(
    instance: &Instance,
    vehicle: &Vehicle,
    ranks: &[usize],
    matrix: &Matrix<Cost>,
    timeline: &eval::Timeline,
) -> Route {
    let jobs = instance.jobs();
    let cost = eval::route_cost(vehicle, jobs, ranks, matrix) as Cost;

    let mut pickup = Amount::zeros(instance.amount_size());
    let mut delivery = Amount::zeros(instance.amount_size());
    let mut priority: Priority = 0;

    for &rank in ranks.iter() {
        pickup += jobs[rank].pickup();
        delivery += jobs[rank].delivery();
        priority += jobs[rank].priority();
    }

    let steps = timeline
        .steps
        .iter()
        .map(|step| Step {
            step_type: step.kind,
            id: step.rank.map(|rank| jobs[rank].id()),
            location: step_location(vehicle, jobs, step),
            arrival: step.arrival as Duration,
            duration: step.travel as Duration,
            service: step.service as Duration,
            waiting_time: step.waiting as Duration,
            violations: step.violations.clone(),
        })
        .collect();

    Route {
        vehicle: vehicle.id(),
        steps,
        cost,
        service: timeline.service as Duration,
        duration: timeline.duration as Duration,
        waiting_time: timeline.waiting as Duration,
        priority,
        delivery,
        pickup,
        profile: vehicle.profile().to_string(),
        description: String::new(),
        violations: timeline.violations.clone(),
        distance: 0,
        geometry: None,
    }
}

pub(super) fn accumulate_route(summary: &mut crate::solver::solution::Summary, route: &Route) {
    summary.cost += route.cost;
    summary.service += route.service;
    summary.duration += route.duration;
    summary.waiting_time += route.waiting_time;
    summary.priority += route.priority;

    for violation in &route.violations {
        if !summary.violations.contains(violation) {
            summary.violations.push(*violation);
        }
    }
}

pub(super) fn unassigned_entry(job: &Job) -> UnassignedJob {
    UnassignedJob {
        id: job.id(),
        kind: job.kind(),
        location: job.location().point().map(|point| [point.x(), point.y()]),
    }
}

fn build_solution(
    instance: &Instance,
    matrices: &[&Matrix<Cost>],
    routes: &[Vec<usize>],
    unassigned_units: &[Unit],
) -> Result<Solution> {
    let jobs = instance.jobs();
    let vehicles = instance.vehicles();
    let mut solution = Solution::default();

    for (v, ranks) in routes.iter().enumerate() {
        if ranks.is_empty() {
            continue;
        }

        let vehicle = &vehicles[v];
        let timeline = eval::walk_route(vehicle, jobs, ranks, matrices[v]);
        let route = build_route(instance, vehicle, ranks, matrices[v], &timeline);

        accumulate_route(&mut solution.summary, &route);
        solution.routes.push(route);
    }

    for unit in unassigned_units {
        let ranks = match unit {
            Unit::Single(rank) => vec![*rank],
            Unit::Shipment(rank) => vec![*rank, rank + 1],
        };

        for rank in ranks {
            solution.unassigned.push(unassigned_entry(&jobs[rank]));
        }
    }

    solution.summary.unassigned = solution.unassigned.len();

    Ok(solution)
}
