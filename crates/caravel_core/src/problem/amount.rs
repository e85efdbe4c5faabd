use std::ops::{Add, AddAssign, Index, Sub, SubAssign};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type Quantity = i64;

type Vector = SmallVec<[Quantity; 2]>;

/// Fixed-length vector of quantities modeling multi-dimensional goods.
/// Every amount and capacity in one instance shares the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Amount(Vector);

/// Missing components count as zero, so `[3]` equals `[3, 0]`.
impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        let dimensions = self.len().max(other.len());

        (0..dimensions).all(|i| self.component(i) == other.component(i))
    }
}

impl Eq for Amount {}

impl Amount {
    pub const fn empty() -> Self {
        Amount(Vector::new_const())
    }

    pub fn zeros(dimensions: usize) -> Self {
        let mut vec = SmallVec::with_capacity(dimensions);
        vec.resize(dimensions, 0);
        Amount(vec)
    }

    pub fn from_vec(vec: Vec<Quantity>) -> Self {
        Amount(SmallVec::from_vec(vec))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.0.iter().copied()
    }

    /// Component-wise `<=` against `capacity`. Missing components on
    /// either side count as zero.
    pub fn fits_in(&self, capacity: &Amount) -> bool {
        let dimensions = self.len().max(capacity.len());

        (0..dimensions).all(|i| self.component(i) <= capacity.component(i))
    }

    fn component(&self, index: usize) -> Quantity {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Grows to `dimensions` components, filling with zeros. Never
    /// shrinks.
    pub(crate) fn pad_to(&mut self, dimensions: usize) {
        if self.0.len() < dimensions {
            self.0.resize(dimensions, 0);
        }
    }

    pub fn update_max(&mut self, other: &Amount) {
        let dimensions = self.len().max(other.len());
        self.0.resize(dimensions, 0);

        for i in 0..dimensions {
            self.0[i] = self.0[i].max(other.component(i));
        }
    }
}

impl Index<usize> for Amount {
    type Output = Quantity;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        if self.0.len() < rhs.len() {
            self.0.resize(rhs.len(), 0);
        }

        for (a, b) in self.0.iter_mut().zip(rhs.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&Amount> for Amount {
    fn sub_assign(&mut self, rhs: &Amount) {
        if self.0.len() < rhs.len() {
            self.0.resize(rhs.len(), 0);
        }

        for (a, b) in self.0.iter_mut().zip(rhs.iter()) {
            *a -= b;
        }
    }
}

impl Add<&Amount> for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub<&Amount> for &Amount {
    type Output = Amount;

    fn sub(self, rhs: &Amount) -> Amount {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}
