use geo_types::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    backend::{LegSummary, RoutingBackend, ServerSpec},
    error::RoutingError,
    matrix::{Cost, Matrix},
};

const BACKEND: &str = "ORS";

pub const ORS_MATRIX_PATH: &str = "/ors/v2/matrix/";
pub const ORS_DIRECTIONS_PATH: &str = "/ors/v2/directions/";

#[derive(Serialize)]
struct MatrixRequestBody {
    locations: Vec<[f64; 2]>,
    metrics: Vec<&'static str>,
}

#[derive(Serialize)]
struct DirectionsRequestBody {
    coordinates: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<bool>,
}

#[derive(Deserialize)]
struct MatrixResponse {
    /// Travel times in seconds. `None` entries mark unreachable pairs.
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    routes: Option<Vec<OrsRoute>>,
}

#[derive(Deserialize)]
struct OrsRoute {
    summary: OrsSummary,
    /// Encoded polyline.
    geometry: String,
}

#[derive(Deserialize)]
struct OrsSummary {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}

pub struct OrsClient {
    profile: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(profile: impl Into<String>, server: &ServerSpec) -> Self {
        OrsClient {
            profile: profile.into(),
            base_url: server.base_url(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn lon_lat_pairs(points: &[Point]) -> Vec<[f64; 2]> {
        points.iter().map(|p| [p.x(), p.y()]).collect()
    }
}

impl RoutingBackend for OrsClient {
    fn profile(&self) -> &str {
        &self.profile
    }

    fn matrix(&self, points: &[Point]) -> Result<Matrix<Cost>, RoutingError> {
        let url = format!("{}{}{}", self.base_url, ORS_MATRIX_PATH, self.profile);

        let body = MatrixRequestBody {
            locations: Self::lon_lat_pairs(points),
            metrics: vec!["duration"],
        };

        debug!("ORS: requesting {}x{} matrix", points.len(), points.len());

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

        let durations = matrix_response
            .durations
            .ok_or(RoutingError::IncompleteResponse { backend: BACKEND })?;

        let expected = points.len();
        if durations.len() != expected || durations.iter().any(|row| row.len() != expected) {
            return Err(RoutingError::IncompleteResponse { backend: BACKEND });
        }

        let mut matrix = Matrix::new(expected);
        for (from, row) in durations.iter().enumerate() {
            for (to, duration) in row.iter().enumerate() {
                match duration {
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
        let url = format!("{}{}{}", self.base_url, ORS_DIRECTIONS_PATH, self.profile);

        let body = DirectionsRequestBody {
            coordinates: Self::lon_lat_pairs(points),
            geometry: Some(true),
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
        let directions: DirectionsResponse = serde_json::from_str(&body)?;

        let route = directions
            .routes
            .and_then(|mut routes| {
                if routes.is_empty() {
                    None
                } else {
                    Some(routes.swap_remove(0))
                }
            })
            .ok_or(RoutingError::IncompleteResponse { backend: BACKEND })?;

        Ok(LegSummary {
            distance: route.summary.distance,
            duration: route.summary.duration.round() as Cost,
            geometry: route.geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_pairs() {
        let points = vec![Point::new(2.35, 48.85), Point::new(2.29, 48.86)];

        assert_eq!(
            OrsClient::lon_lat_pairs(&points),
            vec![[2.35, 48.85], [2.29, 48.86]]
        );
    }
}
