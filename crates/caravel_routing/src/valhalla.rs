use geo_types::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    backend::{LegSummary, RoutingBackend, ServerSpec},
    error::RoutingError,
    matrix::{Cost, Matrix},
};

const BACKEND: &str = "Valhalla";

pub const VALHALLA_MATRIX_PATH: &str = "/sources_to_targets";
pub const VALHALLA_ROUTE_PATH: &str = "/route";

#[derive(Serialize, Clone, Copy)]
struct ValhallaLocation {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
struct MatrixRequestBody {
    sources: Vec<ValhallaLocation>,
    targets: Vec<ValhallaLocation>,
    costing: String,
}

#[derive(Serialize)]
struct RouteRequestBody {
    locations: Vec<ValhallaLocation>,
    costing: String,
}

#[derive(Deserialize)]
struct MatrixResponse {
    sources_to_targets: Option<Vec<Vec<SourceToTarget>>>,
}

#[derive(Deserialize)]
struct SourceToTarget {
    /// Travel time in seconds. `None` marks an unreachable pair.
    time: Option<f64>,
}

#[derive(Deserialize)]
struct RouteResponse {
    trip: Option<Trip>,
}

#[derive(Deserialize)]
struct Trip {
    summary: TripSummary,
    legs: Vec<TripLeg>,
}

#[derive(Deserialize)]
struct TripSummary {
    /// Kilometers.
    length: f64,
    /// Seconds.
    time: f64,
}

#[derive(Deserialize)]
struct TripLeg {
    /// Encoded polyline.
    shape: String,
}

pub struct ValhallaClient {
    profile: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ValhallaClient {
    pub fn new(profile: impl Into<String>, server: &ServerSpec) -> Self {
        ValhallaClient {
            profile: profile.into(),
            base_url: server.base_url(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn locations(points: &[Point]) -> Vec<ValhallaLocation> {
        points
            .iter()
            .map(|p| ValhallaLocation {
                lat: p.y(),
                lon: p.x(),
            })
            .collect()
    }
}

impl RoutingBackend for ValhallaClient {
    fn profile(&self) -> &str {
        &self.profile
    }

    fn matrix(&self, points: &[Point]) -> Result<Matrix<Cost>, RoutingError> {
        let url = format!("{}{}", self.base_url, VALHALLA_MATRIX_PATH);

        let locations = Self::locations(points);
        let body = MatrixRequestBody {
            sources: locations.clone(),
            targets: locations,
            costing: self.profile.clone(),
        };

        debug!(
            "Valhalla: requesting {}x{} sources_to_targets",
            points.len(),
            points.len()
        );

        let response = self.client.post(url).json(&body).send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().unwrap_or_default();
            return Err(RoutingError::Api {
                backend: BACKEND,
                status,
                message,
            });
        }

        let body = response.text()?;
        let matrix_response: MatrixResponse = serde_json::from_str(&body)?;

        let rows = matrix_response
            .sources_to_targets
            .ok_or(RoutingError::IncompleteResponse { backend: BACKEND })?;

        let expected = points.len();
        if rows.len() != expected || rows.iter().any(|row| row.len() != expected) {
            return Err(RoutingError::IncompleteResponse { backend: BACKEND });
        }

        let mut matrix = Matrix::new(expected);
        for (from, row) in rows.iter().enumerate() {
            for (to, entry) in row.iter().enumerate() {
                match entry.time {
                    Some(seconds) => matrix.set(from, to, seconds.round() as Cost),
                    None => {
                        return Err(RoutingError::UnreachablePair {
                            backend: BACKEND,
                            from,
                            to,
                        })
                    }
                }
            }
        }

        Ok(matrix)
    }

    fn route_info(&self, points: &[Point]) -> Result<LegSummary, RoutingError> {
        let url = format!("{}{}", self.base_url, VALHALLA_ROUTE_PATH);

        let body = RouteRequestBody {
            locations: Self::locations(points),
            costing: self.profile.clone(),
        };

        let response = self.client.post(url).json(&body).send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().unwrap_or_default();
            return Err(RoutingError::Api {
                backend: BACKEND,
                status,
                message,
            });
        }

        let body = response.text()?;
        let route: RouteResponse = serde_json::from_str(&body)?;

        let trip = route
            .trip
            .ok_or(RoutingError::IncompleteResponse { backend: BACKEND })?;

        let geometry = trip
            .legs
            .into_iter()
            .map(|leg| leg.shape)
            .collect::<String>();

        Ok(LegSummary {
            distance: trip.summary.length * 1000.0,
            duration: trip.summary.time.round() as Cost,
            geometry,
        })
    }
}
