use caravel_routing::{Cost, Matrix};

use crate::problem::{
    amount::Amount,
    instance::{Config, Instance},
    job::{Job, JobBuilder, JobKind},
    location::Location,
    vehicle::{Vehicle, VehicleBuilder},
};

/// Square matrix with `cost` everywhere off the diagonal.
pub fn uniform_matrix(dimension: usize, cost: Cost) -> Matrix<Cost> {
    let mut matrix = Matrix::new(dimension);

    for from in 0..dimension {
        for to in 0..dimension {
            if from != to {
                matrix.set(from, to, cost);
            }
        }
    }

    matrix
}

pub fn basic_instance() -> Instance {
    Instance::new(Config::default())
}

pub fn basic_job(id: u64, lon: f64, lat: f64) -> Job {
    let mut builder = JobBuilder::default();
    builder.set_id(id);
    builder.set_location(Location::from_coordinates(lon, lat));
    builder.build()
}

pub fn job_at_index(id: u64, index: usize) -> Job {
    let mut builder = JobBuilder::default();
    builder.set_id(id);
    builder.set_location(Location::from_index(index));
    builder.build()
}

pub fn shipment_leg(id: u64, kind: JobKind, lon: f64, lat: f64, amount: Vec<i64>) -> Job {
    let mut builder = JobBuilder::default();
    builder.set_id(id);
    builder.set_kind(kind);
    builder.set_location(Location::from_coordinates(lon, lat));

    match kind {
        JobKind::Pickup => builder.set_pickup(Amount::from_vec(amount)),
        _ => builder.set_delivery(Amount::from_vec(amount)),
    };

    builder.build()
}

pub fn basic_vehicle(id: u64, lon: f64, lat: f64) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_id(id);
    builder.set_start(Location::from_coordinates(lon, lat));
    builder.set_end(Location::from_coordinates(lon, lat));
    builder.build()
}
