use geo_types::Point;
use parking_lot::Mutex;
use tracing::{debug, info};

use caravel_routing::{
    ors::OrsClient, osrm::OsrmClient, valhalla::ValhallaClient, Cost, Matrix, Router,
    RoutingBackend,
};

use crate::{
    error::{Error, Result},
    problem::instance::Instance,
};

struct MatrixSlot {
    profile: String,
    user_supplied: bool,
    matrix: Mutex<Matrix<Cost>>,
    adapter: Mutex<Option<Box<dyn RoutingBackend>>>,
}

impl Instance {
    /// Materializes one cost matrix per profile: user-supplied ones are
    /// validated in place, missing ones are fetched from the routing
    /// backend. Profiles are partitioned round-robin over
    /// `min(nb_thread, |profiles|)` workers; the first failure is
    /// captured under a mutex and resurfaced after every worker joined.
    pub(crate) fn set_matrices(&mut self, nb_thread: usize) -> Result<()> {
        let profiles = self.profiles();

        if profiles.is_empty() {
            return Ok(());
        }

        if !self.has_custom_location_index() && self.has_user_matrices() {
            return Err(Error::input(
                "Custom matrix provided along with implicit location indices.",
            ));
        }

        let mut slots = Vec::with_capacity(profiles.len());
        let mut any_fetch = false;

        for profile in profiles {
            let user_matrix = self.take_matrix(&profile);
            any_fetch |= user_matrix.is_none();

            slots.push(MatrixSlot {
                profile,
                user_supplied: user_matrix.is_some(),
                matrix: Mutex::new(user_matrix.unwrap_or_default()),
                adapter: Mutex::new(None),
            });
        }

        if any_fetch && !self.all_locations_have_coords() {
            return Err(Error::input("Missing mandatory coordinates."));
        }

        let points: Vec<Point> = if any_fetch {
            self.locations().points().unwrap_or_default()
        } else {
            Vec::new()
        };

        info!("[Loading] Start matrix computing.");

        let first_error: Mutex<Option<Error>> = Mutex::new(None);
        let nb_buckets = nb_thread.min(slots.len()).max(1);

        {
            let this: &Instance = self;
            let slots = &slots;
            let points = &points;
            let first_error = &first_error;

            std::thread::scope(|scope| {
                for bucket in 0..nb_buckets {
                    scope.spawn(move || {
                        for slot in slots.iter().skip(bucket).step_by(nb_buckets) {
                            if first_error.lock().is_some() {
                                break;
                            }

                            if let Err(error) = this.prepare_profile_matrix(slot, points) {
                                let mut guard = first_error.lock();
                                if guard.is_none() {
                                    *guard = Some(error);
                                }
                            }
                        }
                    });
                }
            });
        }

        if let Some(error) = first_error.into_inner() {
            return Err(error);
        }

        // Adapters built by the workers become instance-owned, one per
        // profile, and live as long as the instance does.
        for slot in slots {
            if let Some(backend) = slot.adapter.into_inner() {
                self.store_adapter(slot.profile.clone(), backend);
            }

            self.store_matrix(slot.profile, slot.matrix.into_inner());
        }

        Ok(())
    }

    fn prepare_profile_matrix(&self, slot: &MatrixSlot, points: &[Point]) -> Result<()> {
        if !slot.user_supplied {
            let backend = self.make_backend(&slot.profile)?;

            debug!("Computing matrix for profile {}.", slot.profile);
            let dense = backend.matrix(points)?;

            let matrix = if self.has_custom_location_index() {
                self.remap_to_user_indices(dense)
            } else {
                dense
            };

            *slot.matrix.lock() = matrix;
            *slot.adapter.lock() = Some(backend);
        } else if self.config().geometry && self.adapter(&slot.profile).is_none() {
            // Geometry enrichment needs an adapter even when the matrix
            // was user-supplied.
            *slot.adapter.lock() = Some(self.make_backend(&slot.profile)?);
        }

        let matrix = slot.matrix.lock();

        if matrix.dimension() <= self.max_matrices_used_index() {
            return Err(Error::Input(format!(
                "Invalid matrix size for profile {}: {}.",
                slot.profile,
                matrix.dimension()
            )));
        }

        self.check_cost_bound(&slot.profile, &matrix)
    }

    pub(crate) fn make_backend(&self, profile: &str) -> Result<Box<dyn RoutingBackend>> {
        if self.router() == Router::Libosrm {
            return Err(Error::input(
                "In-process OSRM support is not available in this build.",
            ));
        }

        let server = self.server(profile).ok_or_else(|| {
            Error::Input(format!("No server specified for profile {}.", profile))
        })?;

        Ok(match self.router() {
            Router::Osrm => Box::new(OsrmClient::new(profile, server)),
            Router::Ors => Box::new(OrsClient::new(profile, server)),
            Router::Valhalla => Box::new(ValhallaClient::new(profile, server)),
            Router::Libosrm => unreachable!(),
        })
    }

    /// The backend returns a matrix dense over known locations, in
    /// registration order. With explicit indices the instance is indexed
    /// by user-supplied indices instead, so spread the dense entries into
    /// a table of dimension `max_matrices_used_index + 1`. Entries not
    /// backed by a recorded location are unreachable by construction and
    /// stay zero.
    fn remap_to_user_indices(&self, dense: Matrix<Cost>) -> Matrix<Cost> {
        let mut matrix = Matrix::new(self.max_matrices_used_index() + 1);
        let locations = self.locations().locations();

        for (i, from) in locations.iter().enumerate() {
            let from_index = from.index().expect("registered locations carry an index");

            for (j, to) in locations.iter().enumerate() {
                let to_index = to.index().expect("registered locations carry an index");
                matrix.set(from_index, to_index, dense.get(i, j));
            }
        }

        matrix
    }

    /// Upper-bounds the worst-case solution cost and fails on arithmetic
    /// overflow, so the solver can rely on plain additions afterwards.
    fn check_cost_bound(&self, profile: &str, matrix: &Matrix<Cost>) -> Result<()> {
        let used = self.matrices_used_index();

        let mut max_cost_per_line = vec![0 as Cost; matrix.dimension()];
        let mut max_cost_per_column = vec![0 as Cost; matrix.dimension()];

        for &i in used {
            for &j in used {
                max_cost_per_line[i] = max_cost_per_line[i].max(matrix.get(i, j));
                max_cost_per_column[j] = max_cost_per_column[j].max(matrix.get(i, j));
            }
        }

        let mut jobs_departure_bound: Cost = 0;
        let mut jobs_arrival_bound: Cost = 0;

        for job in self.jobs() {
            jobs_departure_bound =
                add_without_overflow(jobs_departure_bound, max_cost_per_line[job.index()])?;
            jobs_arrival_bound =
                add_without_overflow(jobs_arrival_bound, max_cost_per_column[job.index()])?;
        }

        let jobs_bound = jobs_departure_bound.max(jobs_arrival_bound);

        let mut start_bound: Cost = 0;
        let mut end_bound: Cost = 0;

        for vehicle in self.vehicles() {
            if let Some(start) = vehicle.start() {
                let index = start.index().expect("ingested endpoints carry an index");
                start_bound = add_without_overflow(start_bound, max_cost_per_line[index])?;
            }

            if let Some(end) = vehicle.end() {
                let index = end.index().expect("ingested endpoints carry an index");
                end_bound = add_without_overflow(end_bound, max_cost_per_column[index])?;
            }
        }

        let bound = add_without_overflow(start_bound, jobs_bound)?;
        let bound = add_without_overflow(bound, end_bound)?;

        info!(
            "[Loading] Solution cost upper bound for profile {}: {}.",
            profile, bound
        );

        Ok(())
    }
}

fn add_without_overflow(a: Cost, b: Cost) -> Result<Cost> {
    a.checked_add(b)
        .ok_or_else(|| Error::internal("Too high cost values, stopping to avoid overflow."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_without_overflow() {
        assert_eq!(add_without_overflow(1, 2).unwrap(), 3);
        assert_eq!(add_without_overflow(Cost::MAX - 1, 1).unwrap(), Cost::MAX);
        assert!(matches!(
            add_without_overflow(Cost::MAX, 1),
            Err(Error::Internal(_))
        ));
    }
}
