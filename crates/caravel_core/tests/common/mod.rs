#![allow(dead_code)]

use caravel_core::problem::{
    amount::Amount,
    instance::{Config, Instance},
    job::{Job, JobBuilder, JobKind},
    location::Location,
    vehicle::{Vehicle, VehicleBuilder},
    Cost, Matrix,
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

pub fn job_at_index(id: u64, index: usize) -> Job {
    let mut builder = JobBuilder::default();
    builder.set_id(id);
    builder.set_location(Location::from_index(index));
    builder.build()
}

pub fn job_at(id: u64, lon: f64, lat: f64) -> Job {
    let mut builder = JobBuilder::default();
    builder.set_id(id);
    builder.set_location(Location::from_coordinates(lon, lat));
    builder.build()
}

pub fn vehicle_at_index(id: u64, index: usize) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_id(id);
    builder.set_start(Location::from_index(index));
    builder.set_end(Location::from_index(index));
    builder.build()
}

pub fn vehicle_at(id: u64, lon: f64, lat: f64) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_id(id);
    builder.set_start(Location::from_coordinates(lon, lat));
    builder.set_end(Location::from_coordinates(lon, lat));
    builder.build()
}

pub fn shipment_pair(
    pickup_id: u64,
    delivery_id: u64,
    amount: Vec<i64>,
    pickup_index: usize,
    delivery_index: usize,
) -> (Job, Job) {
    let mut pickup = JobBuilder::default();
    pickup.set_id(pickup_id);
    pickup.set_kind(JobKind::Pickup);
    pickup.set_location(Location::from_index(pickup_index));
    pickup.set_pickup(Amount::from_vec(amount.clone()));

    let mut delivery = JobBuilder::default();
    delivery.set_id(delivery_id);
    delivery.set_kind(JobKind::Delivery);
    delivery.set_location(Location::from_index(delivery_index));
    delivery.set_delivery(Amount::from_vec(amount));

    (pickup.build(), delivery.build())
}
