use serde::Serialize;

use caravel_routing::Cost;

use crate::problem::{
    amount::Amount,
    job::{JobId, JobKind, Priority},
    time_window::Duration,
    vehicle::VehicleId,
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    LeadTime,
    Delay,
    Load,
    Skills,
    Precedence,
}

pub type Violations = Vec<Violation>;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Start,
    Job,
    Pickup,
    Delivery,
    End,
}

impl From<JobKind> for StepKind {
    fn from(kind: JobKind) -> Self {
        match kind {
            JobKind::Single => StepKind::Job,
            JobKind::Pickup => StepKind::Pickup,
            JobKind::Delivery => StepKind::Delivery,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct Step {
    pub step_type: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
    pub arrival: Duration,
    /// Cumulated travel time when reaching this step.
    pub duration: Duration,
    pub service: Duration,
    pub waiting_time: Duration,
    pub violations: Violations,
}

#[derive(Serialize, Debug, Clone)]
pub struct Route {
    pub vehicle: VehicleId,
    pub steps: Vec<Step>,
    pub cost: Cost,
    pub service: Duration,
    pub duration: Duration,
    pub waiting_time: Duration,
    pub priority: Priority,
    pub delivery: Amount,
    pub pickup: Amount,
    pub profile: String,
    pub description: String,
    pub violations: Violations,
    /// Meters, 0 until geometry enrichment runs.
    pub distance: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct UnassignedJob {
    pub id: JobId,
    #[serde(rename = "type")]
    pub kind: JobKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
}

/// Milliseconds spent in each phase.
#[derive(Serialize, Debug, Clone, Copy, Default)]
pub struct ComputingTimes {
    pub loading: u64,
    pub solving: u64,
    pub routing: u64,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct Summary {
    pub cost: Cost,
    pub unassigned: usize,
    pub service: Duration,
    pub duration: Duration,
    pub waiting_time: Duration,
    pub priority: Priority,
    pub violations: Violations,
    /// Meters, aggregated during geometry enrichment.
    pub distance: u32,
    pub computing_times: ComputingTimes,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct Solution {
    pub summary: Summary,
    pub routes: Vec<Route>,
    pub unassigned: Vec<UnassignedJob>,
}
