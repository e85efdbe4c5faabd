use std::collections::BTreeSet;
use std::time::Instant;

use fxhash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use tracing::info;

use caravel_routing::{Cost, Matrix, Router, RoutingBackend, ServerSpec};

use crate::{
    error::{Error, Result},
    problem::{
        compatibility::Compatibility,
        job::{Job, JobId, JobKind},
        location::{Location, LocationRegistry},
        skill::Skills,
        vehicle::Vehicle,
    },
    solver::{
        cvrp::Cvrp,
        solution::Solution,
        vrptw::Vrptw,
        HeuristicParams, VrpProblem,
    },
};

/// Typed position into one of the instance's entity sequences. Ranks are
/// assigned by ingestion order and never reused, so a rank taken from one
/// instance has no meaning in another.
macro_rules! define_rank {
    ($name:ident indexes $t:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(rank: usize) -> Self {
                $name(rank)
            }
        }

        impl std::ops::Index<$name> for [$t] {
            type Output = $t;

            fn index(&self, rank: $name) -> &$t {
                &self[rank.0]
            }
        }

        impl std::ops::Index<$name> for Vec<$t> {
            type Output = $t;

            fn index(&self, rank: $name) -> &$t {
                &self[rank.0]
            }
        }
    };
}

define_rank!(JobRank indexes Job);
define_rank!(VehicleRank indexes Vehicle);

/// Options recognized by the instance constructor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Dimensionality of amount/capacity vectors. Captured from the first
    /// ingestion when unset.
    pub amount_size: Option<usize>,
    pub router: Router,
    /// Routing server per profile, required for every profile not covered
    /// by a user-supplied matrix.
    pub servers: FxHashMap<String, ServerSpec>,
    /// When set, output routes include polyline and distance.
    pub geometry: bool,
}

/// A full problem description under assembly, then a read-only prepared
/// instance once `prepare` has run.
///
/// Entities are append-only during ingestion. A shipment's pickup and
/// delivery jobs sit at consecutive ranks in the job sequence, pickup
/// first; downstream consumers locate the partner through that adjacency
/// rather than a side table.
pub struct Instance {
    config: Config,
    jobs: Vec<Job>,
    vehicles: Vec<Vehicle>,
    locations: LocationRegistry,
    matrices: FxHashMap<String, Matrix<Cost>>,
    adapters: FxHashMap<String, Box<dyn RoutingBackend>>,
    compatibility: Option<Compatibility>,

    amount_size: Option<usize>,
    has_ingested: bool,
    has_skills: bool,
    has_custom_location_index: bool,
    has_tw: bool,
    has_jobs: bool,
    has_shipments: bool,
    homogeneous_locations: bool,
    homogeneous_profiles: bool,

    single_ids: FxHashSet<JobId>,
    pickup_ids: FxHashSet<JobId>,
    delivery_ids: FxHashSet<JobId>,

    matrices_used_index: BTreeSet<usize>,
    max_matrices_used_index: usize,
    all_locations_have_coords: bool,

    start_loading: Instant,
}

impl Instance {
    pub fn new(config: Config) -> Self {
        Instance {
            amount_size: config.amount_size,
            config,
            jobs: Vec::new(),
            vehicles: Vec::new(),
            locations: LocationRegistry::new(),
            matrices: FxHashMap::default(),
            adapters: FxHashMap::default(),
            compatibility: None,
            has_ingested: false,
            has_skills: false,
            has_custom_location_index: false,
            has_tw: false,
            has_jobs: false,
            has_shipments: false,
            homogeneous_locations: true,
            homogeneous_profiles: true,
            single_ids: FxHashSet::default(),
            pickup_ids: FxHashSet::default(),
            delivery_ids: FxHashSet::default(),
            matrices_used_index: BTreeSet::new(),
            max_matrices_used_index: 0,
            all_locations_have_coords: true,
            start_loading: Instant::now(),
        }
    }

    pub fn add_job(&mut self, mut job: Job) -> Result<()> {
        if job.kind() != JobKind::Single {
            return Err(Error::Input(format!("Invalid kind for job {}.", job.id())));
        }

        if self.single_ids.contains(&job.id()) {
            return Err(Error::Input(format!("Duplicate job id: {}.", job.id())));
        }

        self.check_job(&job)?;
        self.intern_location(job.location_mut())?;

        self.single_ids.insert(job.id());
        self.has_jobs = true;
        self.has_tw |= job.has_time_windows();
        self.jobs.push(job);

        Ok(())
    }

    /// Ingests a pickup-then-delivery pair served by a single vehicle.
    /// The two jobs land at consecutive ranks, pickup first.
    pub fn add_shipment(&mut self, mut pickup: Job, mut delivery: Job) -> Result<()> {
        if pickup.kind() != JobKind::Pickup {
            return Err(Error::Input(format!(
                "Invalid kind for pickup {}.",
                pickup.id()
            )));
        }

        if delivery.kind() != JobKind::Delivery {
            return Err(Error::Input(format!(
                "Invalid kind for delivery {}.",
                delivery.id()
            )));
        }

        if pickup.priority() != delivery.priority() {
            return Err(Error::Input(format!(
                "Inconsistent priority for shipment ({}, {}).",
                pickup.id(),
                delivery.id()
            )));
        }

        if pickup.pickup() != delivery.delivery() {
            return Err(Error::Input(format!(
                "Inconsistent amounts for shipment ({}, {}).",
                pickup.id(),
                delivery.id()
            )));
        }

        if pickup.skills() != delivery.skills() {
            return Err(Error::Input(format!(
                "Inconsistent skills for shipment ({}, {}).",
                pickup.id(),
                delivery.id()
            )));
        }

        if self.pickup_ids.contains(&pickup.id()) {
            return Err(Error::Input(format!("Duplicate pickup id: {}.", pickup.id())));
        }

        if self.delivery_ids.contains(&delivery.id()) {
            return Err(Error::Input(format!(
                "Duplicate delivery id: {}.",
                delivery.id()
            )));
        }

        self.check_job(&pickup)?;
        self.check_job(&delivery)?;

        self.intern_location(pickup.location_mut())?;
        self.intern_location(delivery.location_mut())?;

        self.pickup_ids.insert(pickup.id());
        self.delivery_ids.insert(delivery.id());
        self.has_shipments = true;
        self.has_tw |= pickup.has_time_windows() || delivery.has_time_windows();
        self.jobs.push(pickup);
        self.jobs.push(delivery);

        Ok(())
    }

    pub fn add_vehicle(&mut self, mut vehicle: Vehicle) -> Result<()> {
        if vehicle.start().is_none() && vehicle.end().is_none() {
            return Err(Error::Input(format!(
                "No start or end specified for vehicle {}.",
                vehicle.id()
            )));
        }

        if let (Some(start), Some(end)) = (vehicle.start(), vehicle.end()) {
            if start.has_user_index() != end.has_user_index() {
                return Err(Error::input("Missing location index."));
            }
        }

        self.check_amount_size(vehicle.capacity().len())?;
        self.check_skills(vehicle.skills())?;

        if let Some(start) = vehicle.start() {
            self.check_index_convention(start)?;
        }
        if let Some(end) = vehicle.end() {
            self.check_index_convention(end)?;
        }
        self.has_ingested = true;

        if let Some(start) = vehicle.start_mut() {
            self.intern_location(start)?;
        }
        if let Some(end) = vehicle.end_mut() {
            self.intern_location(end)?;
        }

        if let Some(first) = self.vehicles.first() {
            self.homogeneous_locations &=
                first.start() == vehicle.start() && first.end() == vehicle.end();
            self.homogeneous_profiles &= first.profile() == vehicle.profile();
        }

        self.has_tw |= !vehicle.time_window().is_default();
        self.vehicles.push(vehicle);

        Ok(())
    }

    /// Registers a user-supplied cost matrix for `profile`, replacing any
    /// previous one.
    pub fn set_matrix(&mut self, profile: impl Into<String>, matrix: Matrix<Cost>) {
        self.matrices.insert(profile.into(), matrix);
    }

    fn check_job(&mut self, job: &Job) -> Result<()> {
        self.check_amount_size(job.pickup().len())?;
        self.check_amount_size(job.delivery().len())?;
        self.check_skills(job.skills())?;
        self.check_index_convention(job.location())?;
        self.has_ingested = true;
        Ok(())
    }

    fn check_amount_size(&mut self, size: usize) -> Result<()> {
        match self.amount_size {
            Some(expected) if size != expected => Err(Error::Input(format!(
                "Inconsistent amount/capacity lengths: {} and {}.",
                size, expected
            ))),
            Some(_) => Ok(()),
            None => {
                self.amount_size = Some(size);
                Ok(())
            }
        }
    }

    fn check_skills(&mut self, skills: &Skills) -> Result<()> {
        if !self.has_ingested {
            self.has_skills = !skills.is_empty();
        } else if self.has_skills != !skills.is_empty() {
            return Err(Error::input("Missing skills."));
        }

        Ok(())
    }

    fn check_index_convention(&mut self, location: &Location) -> Result<()> {
        if !self.has_ingested {
            self.has_custom_location_index = location.has_user_index();
        } else if self.has_custom_location_index != location.has_user_index() {
            return Err(Error::input("Missing location index."));
        }

        Ok(())
    }

    fn intern_location(&mut self, location: &mut Location) -> Result<()> {
        if !location.has_user_index() && !location.has_coordinates() {
            return Err(Error::input("Missing mandatory coordinates."));
        }

        let index = self.locations.intern(location);
        self.matrices_used_index.insert(index);
        self.max_matrices_used_index = self.max_matrices_used_index.max(index);
        self.all_locations_have_coords &= location.has_coordinates();

        Ok(())
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, rank: JobRank) -> &Job {
        &self.jobs[rank]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, rank: VehicleRank) -> &Vehicle {
        &self.vehicles[rank]
    }

    pub fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    pub fn amount_size(&self) -> usize {
        self.amount_size.unwrap_or(0)
    }

    pub fn has_tw(&self) -> bool {
        self.has_tw
    }

    pub fn has_jobs(&self) -> bool {
        self.has_jobs
    }

    pub fn has_shipments(&self) -> bool {
        self.has_shipments
    }

    pub fn has_skills(&self) -> bool {
        self.has_skills
    }

    pub fn has_custom_location_index(&self) -> bool {
        self.has_custom_location_index
    }

    pub fn has_homogeneous_locations(&self) -> bool {
        self.homogeneous_locations
    }

    pub fn has_homogeneous_profiles(&self) -> bool {
        self.homogeneous_profiles
    }

    pub fn max_matrices_used_index(&self) -> usize {
        self.max_matrices_used_index
    }

    pub(crate) fn matrices_used_index(&self) -> &BTreeSet<usize> {
        &self.matrices_used_index
    }

    pub(crate) fn all_locations_have_coords(&self) -> bool {
        self.all_locations_have_coords
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn router(&self) -> Router {
        self.config.router
    }

    pub(crate) fn server(&self, profile: &str) -> Option<&ServerSpec> {
        self.config.servers.get(profile)
    }

    pub fn matrix(&self, profile: &str) -> Option<&Matrix<Cost>> {
        self.matrices.get(profile)
    }

    pub(crate) fn has_user_matrices(&self) -> bool {
        !self.matrices.is_empty()
    }

    pub(crate) fn take_matrix(&mut self, profile: &str) -> Option<Matrix<Cost>> {
        self.matrices.remove(profile)
    }

    pub(crate) fn store_matrix(&mut self, profile: String, matrix: Matrix<Cost>) {
        self.matrices.insert(profile, matrix);
    }

    pub(crate) fn adapter(&self, profile: &str) -> Option<&dyn RoutingBackend> {
        self.adapters.get(profile).map(|backend| backend.as_ref())
    }

    pub(crate) fn store_adapter(&mut self, profile: String, backend: Box<dyn RoutingBackend>) {
        self.adapters.insert(profile, backend);
    }

    /// Distinct vehicle profiles, in deterministic order.
    pub fn profiles(&self) -> Vec<String> {
        self.vehicles
            .iter()
            .map(|vehicle| vehicle.profile().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn vehicle_ok_with_job(&self, vehicle: VehicleRank, job: JobRank) -> bool {
        self.compatibility().vehicle_ok_with_job(vehicle, job)
    }

    pub fn vehicle_ok_with_vehicle(&self, first: VehicleRank, second: VehicleRank) -> bool {
        self.compatibility().vehicle_ok_with_vehicle(first, second)
    }

    fn compatibility(&self) -> &Compatibility {
        self.compatibility
            .as_ref()
            .expect("compatibility tables are built during preparation")
    }

    /// Runs every preparation stage: geometry precheck, per-profile matrix
    /// build, per-vehicle cost-table wiring and compatibility derivation.
    /// Idempotent in effect; ingestion must be over before calling.
    pub fn prepare(&mut self, nb_thread: usize) -> Result<()> {
        if self.compatibility.is_some() {
            return Ok(());
        }

        if self.config.geometry && !self.all_locations_have_coords {
            return Err(Error::input(
                "Route geometry request with missing coordinates.",
            ));
        }

        self.set_matrices(nb_thread)?;

        for vehicle in &self.vehicles {
            if self.matrices.get(vehicle.profile()).is_none() {
                return Err(Error::Internal(format!(
                    "No matrix for profile {}.",
                    vehicle.profile()
                )));
            }
        }

        let compatibility = Compatibility::build(self)?;
        self.compatibility = Some(compatibility);

        Ok(())
    }

    /// Prepares the instance, solves the relevant problem variant and
    /// enriches the solution with geometry when requested.
    pub fn solve(
        &mut self,
        exploration_level: u32,
        nb_thread: usize,
        params: &HeuristicParams,
    ) -> Result<Solution> {
        let nb_thread = nb_thread.max(1);

        self.prepare(nb_thread)?;

        let loading = self.start_loading.elapsed().as_millis() as u64;
        info!("[Loading] Done, took {} ms.", loading);

        let end_loading = Instant::now();

        let mut solution = {
            let this: &Instance = &*self;
            if this.has_tw {
                Vrptw::new(this).solve(exploration_level, nb_thread, params)?
            } else {
                Cvrp::new(this).solve(exploration_level, nb_thread, params)?
            }
        };

        solution.summary.computing_times.loading = loading;
        let solving = end_loading.elapsed().as_millis() as u64;
        solution.summary.computing_times.solving = solving;
        info!("[Solving] Done, took {} ms.", solving);

        if self.config.geometry {
            let end_solving = Instant::now();
            info!("[Route] Start computing detailed route.");

            self.add_route_geometry(&mut solution)?;

            let routing = end_solving.elapsed().as_millis() as u64;
            solution.summary.computing_times.routing = routing;
            info!("[Route] Done, took {} ms.", routing);
        }

        Ok(solution)
    }

    /// Prepares the instance, then validates the pre-planned step list of
    /// every vehicle instead of searching, computing ETAs and violations.
    #[cfg(feature = "check")]
    pub fn check(&mut self, nb_thread: usize) -> Result<Solution> {
        let nb_thread = nb_thread.max(1);

        self.prepare(nb_thread)?;

        let loading = self.start_loading.elapsed().as_millis() as u64;
        info!("[Loading] Done, took {} ms.", loading);

        let end_loading = Instant::now();

        let planned = self.resolve_planned_steps()?;
        let mut solution = crate::solver::validate::check_routes(self, &planned)?;

        solution.summary.computing_times.loading = loading;
        solution.summary.computing_times.solving = end_loading.elapsed().as_millis() as u64;

        if self.config.geometry {
            let end_solving = Instant::now();
            self.add_route_geometry(&mut solution)?;
            solution.summary.computing_times.routing = end_solving.elapsed().as_millis() as u64;
        }

        Ok(solution)
    }

    #[cfg(not(feature = "check"))]
    pub fn check(&mut self, _nb_thread: usize) -> Result<Solution> {
        Err(Error::input("Plan checking is not available in this build."))
    }

    /// Maps every planned step id back to a rank in the job sequence,
    /// refusing unknown and duplicate ids. Returns one rank list per
    /// vehicle, in vehicle order.
    #[cfg(feature = "check")]
    fn resolve_planned_steps(&self) -> Result<Vec<Vec<usize>>> {
        use crate::problem::vehicle::PlannedStepKind;

        let mut singles: FxHashMap<JobId, usize> = FxHashMap::default();
        let mut pickups: FxHashMap<JobId, usize> = FxHashMap::default();
        let mut deliveries: FxHashMap<JobId, usize> = FxHashMap::default();

        for (rank, job) in self.jobs.iter().enumerate() {
            match job.kind() {
                JobKind::Single => singles.insert(job.id(), rank),
                JobKind::Pickup => pickups.insert(job.id(), rank),
                JobKind::Delivery => deliveries.insert(job.id(), rank),
            };
        }

        let mut planned_ranks: FxHashSet<usize> = FxHashSet::default();
        let mut planned = Vec::with_capacity(self.vehicles.len());

        for vehicle in &self.vehicles {
            let mut ranks = Vec::new();

            for step in vehicle.steps() {
                let (namespace, label) = match step.kind {
                    PlannedStepKind::Start | PlannedStepKind::End => continue,
                    PlannedStepKind::Break => {
                        return Err(Error::Input(format!(
                            "Invalid break id in input steps for vehicle {}.",
                            vehicle.id()
                        )));
                    }
                    PlannedStepKind::Single => (&singles, "job"),
                    PlannedStepKind::Pickup => (&pickups, "pickup"),
                    PlannedStepKind::Delivery => (&deliveries, "delivery"),
                };

                let id = step.id.ok_or_else(|| {
                    Error::Input(format!(
                        "Missing {} id in input steps for vehicle {}.",
                        label,
                        vehicle.id()
                    ))
                })?;

                let rank = *namespace.get(&id).ok_or_else(|| {
                    Error::Input(format!(
                        "Invalid {} id {} in input steps for vehicle {}.",
                        label,
                        id,
                        vehicle.id()
                    ))
                })?;

                if !planned_ranks.insert(rank) {
                    return Err(Error::Input(format!(
                        "Duplicate {} id {} in input steps.",
                        label, id
                    )));
                }

                ranks.push(rank);
            }

            planned.push(ranks);
        }

        Ok(planned)
    }

    fn add_route_geometry(&self, solution: &mut Solution) -> Result<()> {
        use geo_types::Point;

        for route in &mut solution.routes {
            let points: Vec<Point> = route
                .steps
                .iter()
                .filter_map(|step| step.location.map(|[lon, lat]| Point::new(lon, lat)))
                .collect();

            if points.len() < 2 {
                continue;
            }

            let backend = self.adapter(&route.profile).ok_or_else(|| {
                Error::Internal(format!("No routing adapter for profile {}.", route.profile))
            })?;
            let leg = backend.route_info(&points)?;

            route.distance = leg.distance.round() as u32;
            route.geometry = Some(leg.geometry);
            solution.summary.distance += route.distance;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{
        amount::Amount,
        job::JobBuilder,
        location::Location,
        time_window::TimeWindow,
        vehicle::VehicleBuilder,
    };
    use crate::test_utils::{basic_instance, basic_job, basic_vehicle, job_at_index, shipment_leg};

    fn input_message(result: Result<()>) -> String {
        match result {
            Err(Error::Input(message)) => message,
            Err(other) => panic!("expected an input error, got: {other}"),
            Ok(()) => panic!("expected an input error, got success"),
        }
    }

    #[test]
    fn test_amount_size_captured_on_first_ingestion() {
        let mut instance = basic_instance();

        let mut job = JobBuilder::default();
        job.set_id(1);
        job.set_location(Location::from_coordinates(1.0, 1.0));
        job.set_delivery(Amount::from_vec(vec![1, 2]));
        instance.add_job(job.build()).unwrap();

        assert_eq!(instance.amount_size(), 2);

        let mut vehicle = VehicleBuilder::default();
        vehicle.set_id(1);
        vehicle.set_start(Location::from_coordinates(0.0, 0.0));
        vehicle.set_capacity(Amount::from_vec(vec![10]));

        assert_eq!(
            input_message(instance.add_vehicle(vehicle.build())),
            "Inconsistent amount/capacity lengths: 1 and 2."
        );
    }

    #[test]
    fn test_skills_are_all_or_nothing() {
        let mut instance = basic_instance();

        let mut first = JobBuilder::default();
        first.set_id(1);
        first.set_location(Location::from_coordinates(1.0, 1.0));
        first.set_skills(vec!["frozen".to_string()]);
        instance.add_job(first.build()).unwrap();

        assert!(instance.has_skills());
        assert_eq!(
            input_message(instance.add_job(basic_job(2, 2.0, 2.0))),
            "Missing skills."
        );
    }

    #[test]
    fn test_index_conventions_do_not_mix() {
        let mut instance = basic_instance();

        for (id, index) in [(1, 5), (2, 7), (3, 12)] {
            instance.add_job(job_at_index(id, index)).unwrap();
        }

        assert!(instance.has_custom_location_index());
        assert_eq!(instance.max_matrices_used_index(), 12);
        assert_eq!(
            input_message(instance.add_vehicle(basic_vehicle(1, 0.0, 0.0))),
            "Missing location index."
        );
    }

    #[test]
    fn test_vehicle_endpoints_must_agree_on_indices() {
        let mut instance = basic_instance();

        let mut vehicle = VehicleBuilder::default();
        vehicle.set_id(1);
        vehicle.set_start(Location::from_index(0));
        vehicle.set_end(Location::from_coordinates(1.0, 1.0));

        assert_eq!(
            input_message(instance.add_vehicle(vehicle.build())),
            "Missing location index."
        );
    }

    #[test]
    fn test_vehicle_requires_an_endpoint() {
        let mut instance = basic_instance();

        let mut vehicle = VehicleBuilder::default();
        vehicle.set_id(7);

        assert_eq!(
            input_message(instance.add_vehicle(vehicle.build())),
            "No start or end specified for vehicle 7."
        );
    }

    #[test]
    fn test_duplicate_ids_per_namespace() {
        let mut instance = basic_instance();

        instance.add_job(basic_job(1, 1.0, 1.0)).unwrap();
        assert_eq!(
            input_message(instance.add_job(basic_job(1, 2.0, 2.0))),
            "Duplicate job id: 1."
        );

        // The same id is fine in the pickup and delivery namespaces.
        let pickup = shipment_leg(1, JobKind::Pickup, 1.0, 1.0, vec![]);
        let delivery = shipment_leg(1, JobKind::Delivery, 2.0, 2.0, vec![]);
        instance.add_shipment(pickup, delivery).unwrap();

        let pickup = shipment_leg(1, JobKind::Pickup, 3.0, 3.0, vec![]);
        let delivery = shipment_leg(9, JobKind::Delivery, 4.0, 4.0, vec![]);
        assert_eq!(
            input_message(instance.add_shipment(pickup, delivery)),
            "Duplicate pickup id: 1."
        );
    }

    #[test]
    fn test_shipment_legs_sit_at_consecutive_ranks() {
        let mut instance = basic_instance();

        instance.add_job(basic_job(1, 1.0, 1.0)).unwrap();

        let pickup = shipment_leg(2, JobKind::Pickup, 2.0, 2.0, vec![]);
        let delivery = shipment_leg(3, JobKind::Delivery, 3.0, 3.0, vec![]);
        instance.add_shipment(pickup, delivery).unwrap();

        instance.add_job(basic_job(4, 4.0, 4.0)).unwrap();

        let kinds: Vec<JobKind> = instance.jobs().iter().map(|job| job.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                JobKind::Single,
                JobKind::Pickup,
                JobKind::Delivery,
                JobKind::Single
            ]
        );
        assert!(instance.has_jobs());
        assert!(instance.has_shipments());
    }

    #[test]
    fn test_shipment_pair_is_validated() {
        let mut instance = basic_instance();

        let mut pickup = JobBuilder::default();
        pickup.set_id(1);
        pickup.set_kind(JobKind::Pickup);
        pickup.set_location(Location::from_coordinates(1.0, 1.0));
        pickup.set_pickup(Amount::from_vec(vec![3]));

        let mut delivery = JobBuilder::default();
        delivery.set_id(2);
        delivery.set_kind(JobKind::Delivery);
        delivery.set_location(Location::from_coordinates(2.0, 2.0));
        delivery.set_delivery(Amount::from_vec(vec![4]));

        assert_eq!(
            input_message(instance.add_shipment(pickup.build(), delivery.build())),
            "Inconsistent amounts for shipment (1, 2)."
        );

        assert_eq!(
            input_message(
                instance.add_shipment(basic_job(1, 1.0, 1.0), basic_job(2, 2.0, 2.0))
            ),
            "Invalid kind for pickup 1."
        );
    }

    #[test]
    fn test_job_locations_are_deduplicated() {
        let mut instance = basic_instance();

        instance.add_job(basic_job(1, 1.0, 1.0)).unwrap();
        instance.add_job(basic_job(2, 1.0, 1.0)).unwrap();
        instance.add_job(basic_job(3, 2.0, 2.0)).unwrap();

        assert_eq!(instance.locations().len(), 2);
        assert_eq!(instance.jobs()[0].index(), 0);
        assert_eq!(instance.jobs()[1].index(), 0);
        assert_eq!(instance.jobs()[2].index(), 1);
        assert_eq!(instance.max_matrices_used_index(), 1);
    }

    #[test]
    fn test_aggregate_flags() {
        let mut instance = basic_instance();

        instance.add_job(basic_job(1, 1.0, 1.0)).unwrap();
        assert!(!instance.has_tw());

        let mut job = JobBuilder::default();
        job.set_id(2);
        job.set_location(Location::from_coordinates(2.0, 2.0));
        job.set_time_windows(vec![TimeWindow::new(0, 1000)]);
        instance.add_job(job.build()).unwrap();
        assert!(instance.has_tw());

        instance.add_vehicle(basic_vehicle(1, 0.0, 0.0)).unwrap();
        instance.add_vehicle(basic_vehicle(2, 0.0, 0.0)).unwrap();
        assert!(instance.has_homogeneous_locations());
        assert!(instance.has_homogeneous_profiles());

        let mut vehicle = VehicleBuilder::default();
        vehicle.set_id(3);
        vehicle.set_start(Location::from_coordinates(5.0, 5.0));
        vehicle.set_profile("bike");
        instance.add_vehicle(vehicle.build()).unwrap();

        assert!(!instance.has_homogeneous_locations());
        assert!(!instance.has_homogeneous_profiles());
        assert_eq!(instance.profiles(), vec!["bike", "car"]);
    }

    #[test]
    fn test_geometry_needs_coordinates() {
        let config = Config {
            geometry: true,
            ..Config::default()
        };

        let mut instance = Instance::new(config);
        instance.add_job(job_at_index(1, 0)).unwrap();

        let mut vehicle = VehicleBuilder::default();
        vehicle.set_id(1);
        vehicle.set_start(Location::from_index(1));
        instance.add_vehicle(vehicle.build()).unwrap();

        instance.set_matrix("car", crate::test_utils::uniform_matrix(2, 10));

        let result = instance.solve(0, 1, &HeuristicParams::default());
        match result {
            Err(Error::Input(message)) => {
                assert_eq!(message, "Route geometry request with missing coordinates.")
            }
            _ => panic!("expected an input error"),
        }
    }
}
