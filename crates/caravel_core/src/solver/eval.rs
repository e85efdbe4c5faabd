use caravel_routing::{Cost, Matrix};

use crate::problem::{
    amount::Amount,
    job::{Job, JobKind},
    location::Location,
    time_window::TimeWindows,
    vehicle::Vehicle,
};
use crate::solver::solution::{StepKind, Violation};

#[inline]
fn travel(matrix: &Matrix<Cost>, from: usize, to: usize) -> u64 {
    matrix.get(from, to) as u64
}

#[inline]
fn endpoint_index(location: &Location) -> usize {
    location.index().expect("ingested endpoints carry an index")
}

pub(crate) fn single_capacity_ok(vehicle: &Vehicle, job: &Job) -> bool {
    job.pickup().fits_in(vehicle.capacity()) && job.delivery().fits_in(vehicle.capacity())
}

pub(crate) fn pair_capacity_ok(vehicle: &Vehicle, pickup: &Job) -> bool {
    pickup.pickup().fits_in(vehicle.capacity())
}

/// Earliest moment service may begin given an arrival time, or `None`
/// when every window has already closed. An empty sequence leaves the
/// job unconstrained.
pub(crate) fn earliest_service_start(windows: &TimeWindows, arrival: u64) -> Option<u64> {
    if windows.is_empty() {
        return Some(arrival);
    }

    windows
        .iter()
        .filter(|tw| arrival < tw.end() as u64)
        .map(|tw| arrival.max(tw.start() as u64))
        .min()
}

/// Window feasibility of serving exactly `ranks` with `vehicle`, checked
/// with the same walk the solver uses during search. The empty-route
/// probes of the compatibility engine call this with one rank, or with a
/// pickup-delivery pair.
pub(crate) fn route_tw_ok(
    vehicle: &Vehicle,
    jobs: &[Job],
    ranks: &[usize],
    matrix: &Matrix<Cost>,
) -> bool {
    walk_route(vehicle, jobs, ranks, matrix).violations.is_empty()
}

/// Load feasibility along a fixed sequence. Deliveries of single jobs are
/// on board from the start; shipment goods enter at their pickup.
pub(crate) fn route_capacity_ok(vehicle: &Vehicle, jobs: &[Job], ranks: &[usize]) -> bool {
    let mut load = Amount::zeros(vehicle.capacity().len());

    for &rank in ranks {
        if jobs[rank].kind() == JobKind::Single {
            load += jobs[rank].delivery();
        }
    }

    if !load.fits_in(vehicle.capacity()) {
        return false;
    }

    for &rank in ranks {
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
            return false;
        }
    }

    true
}

/// Travel cost of serving `ranks` in order, endpoints included.
pub(crate) fn route_cost(
    vehicle: &Vehicle,
    jobs: &[Job],
    ranks: &[usize],
    matrix: &Matrix<Cost>,
) -> u64 {
    let mut cost = 0;
    let mut previous = vehicle.start().map(endpoint_index);

    for &rank in ranks {
        let current = jobs[rank].index();

        if let Some(previous) = previous {
            cost += travel(matrix, previous, current);
        }

        previous = Some(current);
    }

    if let (Some(end), Some(previous)) = (vehicle.end(), previous) {
        cost += travel(matrix, previous, endpoint_index(end));
    }

    cost
}

pub(crate) struct TimelineStep {
    pub kind: StepKind,
    pub rank: Option<usize>,
    pub arrival: u64,
    pub waiting: u64,
    pub service: u64,
    /// Cumulated travel time when reaching this step.
    pub travel: u64,
    pub violations: Vec<Violation>,
}

pub(crate) struct Timeline {
    pub steps: Vec<TimelineStep>,
    /// Total travel time.
    pub duration: u64,
    pub service: u64,
    pub waiting: u64,
    pub violations: Vec<Violation>,
}

/// Walks a fixed sequence, assigning the earliest feasible service start
/// at each stop. A stop whose windows have all closed is served on
/// arrival and flagged with a `Delay` violation, as is a return to the
/// vehicle end past the vehicle window.
pub(crate) fn walk_route(
    vehicle: &Vehicle,
    jobs: &[Job],
    ranks: &[usize],
    matrix: &Matrix<Cost>,
) -> Timeline {
    let mut t = vehicle.time_window().start() as u64;
    let mut travel_total = 0;
    let mut service_total = 0;
    let mut waiting_total = 0;
    let mut steps = Vec::with_capacity(ranks.len() + 2);

    let mut previous = match vehicle.start() {
        Some(start) => {
            steps.push(TimelineStep {
                kind: StepKind::Start,
                rank: None,
                arrival: t,
                waiting: 0,
                service: 0,
                travel: 0,
                violations: Vec::new(),
            });
            Some(endpoint_index(start))
        }
        None => None,
    };

    for &rank in ranks {
        let job = &jobs[rank];

        if let Some(previous) = previous {
            let leg = travel(matrix, previous, job.index());
            travel_total += leg;
            t += leg;
        }

        let arrival = t;
        let mut violations = Vec::new();

        let begin = match earliest_service_start(job.time_windows(), arrival) {
            Some(begin) => begin,
            None => {
                violations.push(Violation::Delay);
                arrival
            }
        };

        let waiting = begin - arrival;
        waiting_total += waiting;
        service_total += job.service() as u64;
        t = begin + job.service() as u64;

        steps.push(TimelineStep {
            kind: job.kind().into(),
            rank: Some(rank),
            arrival,
            waiting,
            service: job.service() as u64,
            travel: travel_total,
            violations,
        });

        previous = Some(job.index());
    }

    if let Some(end) = vehicle.end() {
        if let Some(previous) = previous {
            let leg = travel(matrix, previous, endpoint_index(end));
            travel_total += leg;
            t += leg;
        }

        steps.push(TimelineStep {
            kind: StepKind::End,
            rank: None,
            arrival: t,
            waiting: 0,
            service: 0,
            travel: travel_total,
            violations: Vec::new(),
        });
    }

    let mut violations = Vec::new();

    if t > vehicle.time_window().end() as u64 {
        violations.push(Violation::Delay);
    }

    for step in &steps {
        for violation in &step.violations {
            if !violations.contains(violation) {
                violations.push(*violation);
            }
        }
    }

    Timeline {
        steps,
        duration: travel_total,
        service: service_total,
        waiting: waiting_total,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::time_window::TimeWindow;

    #[test]
    fn test_earliest_service_start() {
        let windows = TimeWindows::from_vec(vec![TimeWindow::new(100, 200)]);

        assert_eq!(earliest_service_start(&windows, 50), Some(100));
        assert_eq!(earliest_service_start(&windows, 150), Some(150));
        assert_eq!(earliest_service_start(&windows, 200), None);
        assert_eq!(earliest_service_start(&TimeWindows::new(), 50), Some(50));
    }

    #[test]
    fn test_earliest_service_start_picks_first_open_window() {
        let windows = TimeWindows::from_vec(vec![
            TimeWindow::new(100, 200),
            TimeWindow::new(300, 400),
        ]);

        assert_eq!(earliest_service_start(&windows, 250), Some(300));
        assert_eq!(earliest_service_start(&windows, 150), Some(150));
        assert_eq!(earliest_service_start(&windows, 400), None);
    }
}
