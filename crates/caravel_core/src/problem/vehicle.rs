use serde::{Deserialize, Serialize};

use crate::problem::{
    amount::Amount,
    job::JobId,
    location::Location,
    skill::{Skill, Skills},
    time_window::TimeWindow,
};

pub type VehicleId = u64;

pub const DEFAULT_PROFILE: &str = "car";

/// One entry of a pre-planned route, consulted only when validating a
/// fixed plan.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlannedStepKind {
    Start,
    End,
    Single,
    Pickup,
    Delivery,
    Break,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleStep {
    pub kind: PlannedStepKind,
    pub id: Option<JobId>,
}

impl VehicleStep {
    pub fn new(kind: PlannedStepKind, id: Option<JobId>) -> Self {
        VehicleStep { kind, id }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    start: Option<Location>,
    end: Option<Location>,
    capacity: Amount,
    skills: Skills,
    time_window: TimeWindow,
    profile: String,
    steps: Vec<VehicleStep>,
}

impl Vehicle {
    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn start(&self) -> Option<&Location> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&Location> {
        self.end.as_ref()
    }

    pub(crate) fn start_mut(&mut self) -> Option<&mut Location> {
        self.start.as_mut()
    }

    pub(crate) fn end_mut(&mut self) -> Option<&mut Location> {
        self.end.as_mut()
    }

    pub fn capacity(&self) -> &Amount {
        &self.capacity
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn steps(&self) -> &[VehicleStep] {
        &self.steps
    }
}

#[derive(Default)]
pub struct VehicleBuilder {
    id: Option<VehicleId>,
    start: Option<Location>,
    end: Option<Location>,
    capacity: Option<Amount>,
    skills: Option<Vec<Skill>>,
    time_window: Option<TimeWindow>,
    profile: Option<String>,
    steps: Option<Vec<VehicleStep>>,
}

impl VehicleBuilder {
    pub fn set_id(&mut self, id: VehicleId) -> &mut VehicleBuilder {
        self.id = Some(id);
        self
    }

    pub fn set_start(&mut self, start: Location) -> &mut VehicleBuilder {
        self.start = Some(start);
        self
    }

    pub fn set_end(&mut self, end: Location) -> &mut VehicleBuilder {
        self.end = Some(end);
        self
    }

    pub fn set_capacity(&mut self, capacity: Amount) -> &mut VehicleBuilder {
        self.capacity = Some(capacity);
        self
    }

    pub fn set_skills(&mut self, skills: Vec<String>) -> &mut VehicleBuilder {
        self.skills = Some(skills.into_iter().map(Skill::new).collect());
        self
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) -> &mut VehicleBuilder {
        self.time_window = Some(time_window);
        self
    }

    pub fn set_profile(&mut self, profile: impl Into<String>) -> &mut VehicleBuilder {
        self.profile = Some(profile.into());
        self
    }

    pub fn set_steps(&mut self, steps: Vec<VehicleStep>) -> &mut VehicleBuilder {
        self.steps = Some(steps);
        self
    }

    pub fn build(self) -> Vehicle {
        Vehicle {
            id: self.id.expect("Vehicle id is required"),
            start: self.start,
            end: self.end,
            capacity: self.capacity.unwrap_or_default(),
            skills: Skills::from_iter(self.skills.unwrap_or_default()),
            time_window: self.time_window.unwrap_or_default(),
            profile: self.profile.unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            steps: self.steps.unwrap_or_default(),
        }
    }
}
