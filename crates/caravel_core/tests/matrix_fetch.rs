mod common;

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use caravel_core::problem::{
    instance::{Config, Instance},
    job::JobBuilder,
    location::Location,
    time_window::TimeWindow,
    vehicle::VehicleBuilder,
    Matrix,
};
use caravel_core::Error;
use caravel_routing::ServerSpec;

use common::{job_at, vehicle_at};

fn handle_request(mut stream: TcpStream, body: &str) {
    stream.set_nonblocking(false).unwrap();

    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    );

    stream.write_all(response.as_bytes()).unwrap();
    let _ = stream.flush();
}

/// Serves up to `max_requests` canned responses, then reports how many
/// requests actually came in.
fn spawn_routing_server(body: String, max_requests: usize) -> (u16, thread::JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut served = 0;

        while served < max_requests && Instant::now() < deadline {
            match listener.accept() {
                Ok((stream, _)) => {
                    handle_request(stream, &body);
                    served += 1;
                }
                Err(error) if error.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }

        served
    });

    (port, handle)
}

fn config_with_servers(servers: Vec<(&str, u16)>) -> Config {
    let mut config = Config::default();

    for (profile, port) in servers {
        config
            .servers
            .insert(profile.to_string(), ServerSpec::new("127.0.0.1", port));
    }

    config
}

#[test]
fn missing_matrices_are_fetched_once_per_profile_in_parallel() {
    let car_body =
        r#"{"code":"Ok","durations":[[0,100,200],[100,0,100],[200,100,0]]}"#.to_string();
    let bike_body = r#"{"code":"Ok","durations":[[0,1,2],[1,0,1],[2,1,0]]}"#.to_string();

    let (car_port, car_server) = spawn_routing_server(car_body, 1);
    let (bike_port, bike_server) = spawn_routing_server(bike_body, 1);

    let config = config_with_servers(vec![("car", car_port), ("bike", bike_port)]);
    let mut instance = Instance::new(config);

    instance.add_job(job_at(1, 1.0, 1.0)).unwrap();
    instance.add_job(job_at(2, 2.0, 2.0)).unwrap();
    instance.add_vehicle(vehicle_at(1, 0.0, 0.0)).unwrap();

    let mut bike = VehicleBuilder::default();
    bike.set_id(2);
    bike.set_start(Location::from_coordinates(0.0, 0.0));
    bike.set_end(Location::from_coordinates(0.0, 0.0));
    bike.set_profile("bike");
    instance.add_vehicle(bike.build()).unwrap();

    instance.prepare(2).unwrap();

    assert_eq!(car_server.join().unwrap(), 1);
    assert_eq!(bike_server.join().unwrap(), 1);

    let car_matrix = instance.matrix("car").unwrap();
    assert_eq!(car_matrix.dimension(), 3);
    assert_eq!(car_matrix.get(0, 1), 100);

    let bike_matrix = instance.matrix("bike").unwrap();
    assert_eq!(bike_matrix.get(0, 1), 1);
}

#[test]
fn first_backend_error_is_rethrown_exactly_once() {
    let car_body = r#"{"code":"NoTable","message":"no table found"}"#.to_string();
    let bike_body = r#"{"code":"Ok","durations":[[0,1,2],[1,0,1],[2,1,0]]}"#.to_string();

    let (car_port, car_server) = spawn_routing_server(car_body, 1);
    let (bike_port, _bike_server) = spawn_routing_server(bike_body, 1);

    let config = config_with_servers(vec![("car", car_port), ("bike", bike_port)]);
    let mut instance = Instance::new(config);

    instance.add_job(job_at(1, 1.0, 1.0)).unwrap();
    instance.add_job(job_at(2, 2.0, 2.0)).unwrap();
    instance.add_vehicle(vehicle_at(1, 0.0, 0.0)).unwrap();

    let mut bike = VehicleBuilder::default();
    bike.set_id(2);
    bike.set_start(Location::from_coordinates(0.0, 0.0));
    bike.set_end(Location::from_coordinates(0.0, 0.0));
    bike.set_profile("bike");
    instance.add_vehicle(bike.build()).unwrap();

    match instance.prepare(2) {
        Err(Error::Routing(_)) => {}
        other => panic!("expected a routing error, got: {:?}", other),
    }

    assert_eq!(car_server.join().unwrap(), 1);
}

#[test]
fn missing_server_for_a_fetched_profile_is_an_input_error() {
    let mut instance = Instance::new(Config::default());

    instance.add_job(job_at(1, 1.0, 1.0)).unwrap();
    instance.add_vehicle(vehicle_at(1, 0.0, 0.0)).unwrap();

    match instance.prepare(1) {
        Err(Error::Input(message)) => {
            assert_eq!(message, "No server specified for profile car.")
        }
        _ => panic!("expected an input error"),
    }
}

// Implicit and explicit index conventions produce the same compatibility
// tables when the explicit indices match the implicit ordering.
#[test]
fn index_conventions_are_interchangeable() {
    let durations = [[0, 10, 20], [10, 0, 10], [20, 10, 0]];
    let body = r#"{"code":"Ok","durations":[[0,10,20],[10,0,10],[20,10,0]]}"#.to_string();
    let (port, _server) = spawn_routing_server(body, 1);

    let tight_window = TimeWindow::new(0, 15);

    let mut implicit = Instance::new(config_with_servers(vec![("car", port)]));

    let mut reachable = JobBuilder::default();
    reachable.set_id(1);
    reachable.set_location(Location::from_coordinates(1.0, 1.0));
    reachable.set_time_windows(vec![tight_window]);
    implicit.add_job(reachable.build()).unwrap();

    implicit.add_job(job_at(2, 2.0, 2.0)).unwrap();
    implicit.add_vehicle(vehicle_at(1, 0.0, 0.0)).unwrap();
    implicit.prepare(1).unwrap();

    let mut explicit = Instance::new(Config::default());

    let mut reachable = JobBuilder::default();
    reachable.set_id(1);
    reachable.set_location(Location::from_index(0));
    reachable.set_time_windows(vec![tight_window]);
    explicit.add_job(reachable.build()).unwrap();

    explicit.add_job(common::job_at_index(2, 1)).unwrap();
    explicit.add_vehicle(common::vehicle_at_index(1, 2)).unwrap();

    let rows = durations
        .iter()
        .map(|row| row.to_vec())
        .collect::<Vec<_>>();
    explicit.set_matrix("car", Matrix::from_rows(rows).unwrap());
    explicit.prepare(1).unwrap();

    for job in 0..2usize {
        assert_eq!(
            implicit.vehicle_ok_with_job(0.into(), job.into()),
            explicit.vehicle_ok_with_job(0.into(), job.into())
        );
    }
}
