use fxhash::FxHashMap;
use geo_types::Point;

/// An opaque place: optional coordinates plus an optional cost-matrix
/// index. Coordinates are never interpreted here; all distance and
/// duration derivation is delegated to the routing backend.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    coordinates: Option<Point>,
    index: Option<usize>,
    user_index: bool,
}

impl Location {
    /// Location identified by coordinates only; the registry assigns its
    /// matrix index on interning.
    pub fn from_coordinates(lon: f64, lat: f64) -> Self {
        Location {
            coordinates: Some(Point::new(lon, lat)),
            index: None,
            user_index: false,
        }
    }

    /// Location identified by a caller-chosen matrix index.
    pub fn from_index(index: usize) -> Self {
        Location {
            coordinates: None,
            index: Some(index),
            user_index: true,
        }
    }

    /// Caller-chosen matrix index with coordinates attached, so a matrix
    /// can still be computed when none is supplied.
    pub fn new(index: usize, lon: f64, lat: f64) -> Self {
        Location {
            coordinates: Some(Point::new(lon, lat)),
            index: Some(index),
            user_index: true,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn has_user_index(&self) -> bool {
        self.user_index
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn point(&self) -> Option<Point> {
        self.coordinates
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = Some(index);
    }
}

/// Two locations are the same place when they carry the same
/// user-supplied index, or when their coordinates are bit-identical.
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        if self.user_index && other.user_index && self.index == other.index {
            return true;
        }

        match (self.coordinates, other.coordinates) {
            (Some(a), Some(b)) => {
                a.x().to_bits() == b.x().to_bits() && a.y().to_bits() == b.y().to_bits()
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LocationKey {
    Index(usize),
    Coordinates(u64, u64),
}

/// Deduplicates locations and assigns or reconciles matrix indices.
///
/// Two regimes coexist, selected by the first ingested entity. With
/// implicit indices, interning stamps each distinct location with its
/// position in ingestion order, so assigned indices form a dense prefix.
/// With explicit indices the caller's index is never overwritten; the
/// registry only records each distinct index once so that a matrix can be
/// computed when the user supplies none.
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
    known: FxHashMap<LocationKey, usize>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        LocationRegistry::default()
    }

    /// Registers `location` and returns its matrix index, stamping the
    /// index onto `location` in the implicit regime.
    pub fn intern(&mut self, location: &mut Location) -> usize {
        if location.has_user_index() {
            let index = location
                .index()
                .expect("user-indexed locations carry an index");

            if !self.known.contains_key(&LocationKey::Index(index)) {
                self.known
                    .insert(LocationKey::Index(index), self.locations.len());
                self.locations.push(*location);
            }

            return index;
        }

        let point = location
            .point()
            .expect("locations without a user index carry coordinates");
        let key = LocationKey::Coordinates(point.x().to_bits(), point.y().to_bits());

        match self.known.get(&key) {
            Some(&position) => {
                let index = self.locations[position]
                    .index()
                    .expect("interned locations carry an index");
                location.set_index(index);
                index
            }
            None => {
                let index = self.locations.len();
                location.set_index(index);
                self.known.insert(key, index);
                self.locations.push(*location);
                index
            }
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn all_have_coordinates(&self) -> bool {
        self.locations.iter().all(Location::has_coordinates)
    }

    /// Coordinates of every known location, in registration order.
    /// `None` when any location lacks them.
    pub fn points(&self) -> Option<Vec<Point>> {
        self.locations.iter().map(Location::point).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_intern_assigns_dense_prefix() {
        let mut registry = LocationRegistry::new();

        let mut a = Location::from_coordinates(1.0, 1.0);
        let mut b = Location::from_coordinates(2.0, 2.0);
        let mut c = Location::from_coordinates(3.0, 3.0);

        assert_eq!(registry.intern(&mut a), 0);
        assert_eq!(registry.intern(&mut b), 1);
        assert_eq!(registry.intern(&mut c), 2);
        assert_eq!(registry.len(), 3);
        assert_eq!(a.index(), Some(0));
    }

    #[test]
    fn test_implicit_intern_deduplicates_on_coordinates() {
        let mut registry = LocationRegistry::new();

        let mut a = Location::from_coordinates(1.0, 1.0);
        let mut b = Location::from_coordinates(1.0, 1.0);

        assert_eq!(registry.intern(&mut a), 0);
        assert_eq!(registry.intern(&mut b), 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(b.index(), Some(0));
    }

    #[test]
    fn test_explicit_intern_keeps_user_index() {
        let mut registry = LocationRegistry::new();

        let mut a = Location::new(5, 1.0, 1.0);
        let mut b = Location::new(12, 2.0, 2.0);

        assert_eq!(registry.intern(&mut a), 5);
        assert_eq!(registry.intern(&mut b), 12);
        assert_eq!(registry.len(), 2);
        assert_eq!(a.index(), Some(5));
    }

    #[test]
    fn test_explicit_intern_records_each_index_once() {
        let mut registry = LocationRegistry::new();

        let mut a = Location::from_index(7);
        let mut b = Location::from_index(7);

        assert_eq!(registry.intern(&mut a), 7);
        assert_eq!(registry.intern(&mut b), 7);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_location_equality() {
        assert_eq!(Location::from_index(3), Location::from_index(3));
        assert_ne!(Location::from_index(3), Location::from_index(4));
        assert_eq!(
            Location::from_coordinates(1.0, 2.0),
            Location::from_coordinates(1.0, 2.0)
        );
        assert_ne!(
            Location::from_coordinates(1.0, 2.0),
            Location::from_coordinates(2.0, 1.0)
        );
        // Same coordinates win over differing non-user indices.
        assert_eq!(
            Location::new(3, 1.0, 2.0),
            Location::from_coordinates(1.0, 2.0)
        );
    }

    #[test]
    fn test_points() {
        let mut registry = LocationRegistry::new();
        registry.intern(&mut Location::from_coordinates(1.0, 2.0));

        let points = registry.points().unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x(), 1.0);

        registry.intern(&mut Location::from_index(4));
        assert!(registry.points().is_none());
        assert!(!registry.all_have_coordinates());
    }
}
