use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Seconds since a caller-chosen epoch.
pub type Duration = u32;

/// Half-open interval `[start, end)` constraining when service may begin.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: Duration,
    end: Duration,
}

impl TimeWindow {
    pub const DEFAULT: TimeWindow = TimeWindow {
        start: 0,
        end: Duration::MAX,
    };

    pub fn new(start: Duration, end: Duration) -> Self {
        debug_assert!(start < end);
        TimeWindow { start, end }
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn end(&self) -> Duration {
        self.end
    }

    pub fn is_default(&self) -> bool {
        *self == TimeWindow::DEFAULT
    }

    pub fn contains(&self, t: Duration) -> bool {
        self.start <= t && t < self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::DEFAULT
    }
}

/// Ordered sequence of windows. An empty sequence leaves service
/// unconstrained.
#[derive(Serialize, Debug, Clone, Default)]
pub struct TimeWindows(SmallVec<[TimeWindow; 1]>);

impl TimeWindows {
    pub fn new() -> Self {
        TimeWindows(SmallVec::new())
    }

    pub fn from_vec(time_windows: Vec<TimeWindow>) -> Self {
        TimeWindows(SmallVec::from_vec(time_windows))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True unless every window is the unconstrained default.
    pub fn is_constrained(&self) -> bool {
        self.0.iter().any(|tw| !tw.is_default())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeWindow> {
        self.0.iter()
    }
}
