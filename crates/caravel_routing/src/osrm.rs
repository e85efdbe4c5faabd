use geo_types::Point;
use serde::Deserialize;
use tracing::debug;

use crate::{
    backend::{LegSummary, RoutingBackend, ServerSpec},
    error::RoutingError,
    matrix::{Cost, Matrix},
};

const BACKEND: &str = "OSRM";

pub const OSRM_TABLE_PATH: &str = "/table/v1/";
pub const OSRM_ROUTE_PATH: &str = "/route/v1/";

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    message: Option<String>,
    /// Travel times in seconds. `None` entries mark unreachable pairs.
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    /// Encoded polyline.
    geometry: String,
}

pub struct OsrmClient {
    profile: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(profile: impl Into<String>, server: &ServerSpec) -> Self {
        OsrmClient {
            profile: profile.into(),
            base_url: server.base_url(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn coordinates_path(points: &[Point]) -> String {
        let mut path = String::new();

        for (i, point) in points.iter().enumerate() {
            path.push_str(&format!("{},{}", point.x(), point.y()));

            if i < points.len() - 1 {
                path.push(';');
            }
        }

        path
    }
}

impl RoutingBackend for OsrmClient {
    fn profile(&self) -> &str {
        &self.profile
    }

    fn matrix(&self, points: &[Point]) -> Result<Matrix<Cost>, RoutingError> {
        let url = format!(
            "{}{}{}/{}",
            self.base_url,
            OSRM_TABLE_PATH,
            self.profile,
            Self::coordinates_path(points)
        );

        debug!("OSRM: requesting {}x{} table", points.len(), points.len());

        let response = self
            .client
            .get(url)
            .query(&[("annotations", "duration")])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        let table: TableResponse = serde_json::from_str(&body)?;

        if table.code != "Ok" {
            return Err(RoutingError::Api {
                backend: BACKEND,
                status: status.as_u16(),
                message: table.message.unwrap_or(table.code),
            });
        }

        let durations = table.durations.ok_or(RoutingError::IncompleteResponse {
            backend: BACKEND,
        })?;

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
        let url = format!(
            "{}{}{}/{}",
            self.base_url,
            OSRM_ROUTE_PATH,
            self.profile,
            Self::coordinates_path(points)
        );

        let response = self
            .client
            .get(url)
            .query(&[
                ("alternatives", "false"),
                ("steps", "false"),
                ("overview", "full"),
                ("continue_straight", "false"),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        let parsed: RouteResponse = serde_json::from_str(&body)?;

        if parsed.code != "Ok" {
            return Err(RoutingError::Api {
                backend: BACKEND,
                status: status.as_u16(),
                message: parsed.message.unwrap_or(parsed.code),
            });
        }

        let route = parsed
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
            distance: route.distance,
            duration: route.duration.round() as Cost,
            geometry: route.geometry,
        })
    }
}
