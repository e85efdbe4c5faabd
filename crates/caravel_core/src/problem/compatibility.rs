use crate::{
    error::{Error, Result},
    problem::{
        instance::{Instance, JobRank, VehicleRank},
        job::JobKind,
    },
    solver::eval,
};

/// Read-only compatibility tables, derived once after ingestion.
///
/// `vehicle_to_job` combines skill containment, capacity feasibility and,
/// when the instance has time windows, window feasibility on an empty
/// route, using the same primitives the solver applies during search.
/// `vehicle_to_vehicle` marks vehicle pairs sharing at least one
/// compatible job, letting the solver prune inter-route moves.
pub struct Compatibility {
    vehicle_to_job: Vec<bool>,
    vehicle_to_vehicle: Vec<bool>,
    nb_jobs: usize,
    nb_vehicles: usize,
}

impl Compatibility {
    pub(crate) fn build(instance: &Instance) -> Result<Self> {
        let jobs = instance.jobs();
        let vehicles = instance.vehicles();

        let mut vehicle_to_job = vec![true; vehicles.len() * jobs.len()];

        if instance.has_skills() {
            for (v, vehicle) in vehicles.iter().enumerate() {
                for (j, job) in jobs.iter().enumerate() {
                    vehicle_to_job[v * jobs.len() + j] =
                        job.skills().is_subset(vehicle.skills());
                }
            }
        }

        for (v, vehicle) in vehicles.iter().enumerate() {
            let matrix = instance.matrix(vehicle.profile()).ok_or_else(|| {
                Error::Internal(format!("No matrix for profile {}.", vehicle.profile()))
            })?;

            let mut j = 0;
            while j < jobs.len() {
                let job = &jobs[j];

                if job.kind() == JobKind::Pickup {
                    // The delivery sits at the next rank; both positions
                    // receive the same bit and its iteration is skipped.
                    let mut ok = vehicle_to_job[v * jobs.len() + j]
                        && vehicle_to_job[v * jobs.len() + j + 1]
                        && eval::pair_capacity_ok(vehicle, job);

                    if ok && instance.has_tw() {
                        ok = eval::route_tw_ok(vehicle, jobs, &[j, j + 1], matrix);
                    }

                    vehicle_to_job[v * jobs.len() + j] = ok;
                    vehicle_to_job[v * jobs.len() + j + 1] = ok;
                    j += 2;
                } else {
                    let mut ok = vehicle_to_job[v * jobs.len() + j]
                        && eval::single_capacity_ok(vehicle, job);

                    if ok && instance.has_tw() {
                        ok = eval::route_tw_ok(vehicle, jobs, &[j], matrix);
                    }

                    vehicle_to_job[v * jobs.len() + j] = ok;
                    j += 1;
                }
            }
        }

        let nb_vehicles = vehicles.len();
        let mut vehicle_to_vehicle = vec![false; nb_vehicles * nb_vehicles];

        for v1 in 0..nb_vehicles {
            vehicle_to_vehicle[v1 * nb_vehicles + v1] = true;

            for v2 in (v1 + 1)..nb_vehicles {
                let shared_job = (0..jobs.len()).any(|j| {
                    vehicle_to_job[v1 * jobs.len() + j] && vehicle_to_job[v2 * jobs.len() + j]
                });

                vehicle_to_vehicle[v1 * nb_vehicles + v2] = shared_job;
                vehicle_to_vehicle[v2 * nb_vehicles + v1] = shared_job;
            }
        }

        Ok(Compatibility {
            vehicle_to_job,
            vehicle_to_vehicle,
            nb_jobs: jobs.len(),
            nb_vehicles,
        })
    }

    #[inline]
    pub fn vehicle_ok_with_job(&self, vehicle: VehicleRank, job: JobRank) -> bool {
        self.vehicle_to_job[vehicle.get() * self.nb_jobs + job.get()]
    }

    #[inline]
    pub fn vehicle_ok_with_vehicle(&self, first: VehicleRank, second: VehicleRank) -> bool {
        self.vehicle_to_vehicle[first.get() * self.nb_vehicles + second.get()]
    }
}
