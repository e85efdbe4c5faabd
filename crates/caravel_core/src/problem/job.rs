use serde::Serialize;

use crate::problem::{
    amount::Amount,
    location::Location,
    skill::{Skill, Skills},
    time_window::{Duration, TimeWindow, TimeWindows},
};

pub type JobId = u64;
pub type Priority = u32;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Single,
    Pickup,
    Delivery,
}

#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    kind: JobKind,
    location: Location,
    pickup: Amount,
    delivery: Amount,
    skills: Skills,
    priority: Priority,
    time_windows: TimeWindows,
    service: Duration,
}

impl Job {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub(crate) fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    /// Matrix index of this job's location. Only meaningful once the job
    /// has been ingested.
    pub fn index(&self) -> usize {
        self.location
            .index()
            .expect("ingested jobs carry a matrix index")
    }

    pub fn pickup(&self) -> &Amount {
        &self.pickup
    }

    pub fn delivery(&self) -> &Amount {
        &self.delivery
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn time_windows(&self) -> &TimeWindows {
        &self.time_windows
    }

    pub fn has_time_windows(&self) -> bool {
        self.time_windows.is_constrained()
    }

    pub fn service(&self) -> Duration {
        self.service
    }
}

#[derive(Default)]
pub struct JobBuilder {
    id: Option<JobId>,
    kind: Option<JobKind>,
    location: Option<Location>,
    pickup: Option<Amount>,
    delivery: Option<Amount>,
    skills: Option<Vec<Skill>>,
    priority: Option<Priority>,
    time_windows: Option<Vec<TimeWindow>>,
    service: Option<Duration>,
}

impl JobBuilder {
    pub fn set_id(&mut self, id: JobId) -> &mut JobBuilder {
        self.id = Some(id);
        self
    }

    pub fn set_kind(&mut self, kind: JobKind) -> &mut JobBuilder {
        self.kind = Some(kind);
        self
    }

    pub fn set_location(&mut self, location: Location) -> &mut JobBuilder {
        self.location = Some(location);
        self
    }

    pub fn set_pickup(&mut self, pickup: Amount) -> &mut JobBuilder {
        self.pickup = Some(pickup);
        self
    }

    pub fn set_delivery(&mut self, delivery: Amount) -> &mut JobBuilder {
        self.delivery = Some(delivery);
        self
    }

    pub fn set_skills(&mut self, skills: Vec<String>) -> &mut JobBuilder {
        self.skills = Some(skills.into_iter().map(Skill::new).collect());
        self
    }

    pub fn set_priority(&mut self, priority: Priority) -> &mut JobBuilder {
        self.priority = Some(priority);
        self
    }

    pub fn set_time_windows(&mut self, time_windows: Vec<TimeWindow>) -> &mut JobBuilder {
        self.time_windows = Some(time_windows);
        self
    }

    pub fn set_service(&mut self, service: Duration) -> &mut JobBuilder {
        self.service = Some(service);
        self
    }

    pub fn build(self) -> Job {
        let mut pickup = self.pickup.unwrap_or_default();
        let mut delivery = self.delivery.unwrap_or_default();

        // Pickup and delivery vectors share the instance-wide length.
        let dimensions = pickup.len().max(delivery.len());
        pickup.pad_to(dimensions);
        delivery.pad_to(dimensions);

        Job {
            id: self.id.expect("Job id is required"),
            kind: self.kind.unwrap_or(JobKind::Single),
            location: self.location.expect("Job location is required"),
            pickup,
            delivery,
            skills: Skills::from_iter(self.skills.unwrap_or_default()),
            priority: self.priority.unwrap_or(0),
            time_windows: TimeWindows::from_vec(self.time_windows.unwrap_or_default()),
            service: self.service.unwrap_or(0),
        }
    }
}
