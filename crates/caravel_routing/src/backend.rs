use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::{
    error::RoutingError,
    matrix::{Cost, Matrix},
};

/// Routing engine selection.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Router {
    Osrm,
    Libosrm,
    Ors,
    Valhalla,
}

impl Default for Router {
    fn default() -> Self {
        Router::Osrm
    }
}

/// Host and port of a routing server, one per profile.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerSpec {
    pub host: String,
    pub port: u16,
}

impl ServerSpec {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ServerSpec {
            host: host.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ServerSpec {
    fn default() -> Self {
        ServerSpec::new("0.0.0.0", 5000)
    }
}

/// Distance, travel time and geometry for one finished route.
#[derive(Debug, Clone, Serialize)]
pub struct LegSummary {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: Cost,
    /// Encoded polyline.
    pub geometry: String,
}

/// Capability set shared by every routing engine adapter. One adapter is
/// constructed per profile; `matrix` must be safe to call concurrently
/// across distinct adapters.
pub trait RoutingBackend: Send + Sync {
    fn profile(&self) -> &str;

    /// Square cost matrix over `points`, in input order.
    fn matrix(&self, points: &[Point]) -> Result<Matrix<Cost>, RoutingError>;

    /// Distance, duration and geometry along `points`, visited in order.
    fn route_info(&self, points: &[Point]) -> Result<LegSummary, RoutingError>;
}
