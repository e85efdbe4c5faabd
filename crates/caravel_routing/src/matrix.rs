use serde::{Deserialize, Serialize};

/// Costs are opaque unsigned integers, seconds or meters depending on the
/// backend that produced them.
pub type Cost = u32;

/// Square cost table with a flat row-major layout.
/// To find the entry for a pair of indices, use the formula:
/// `index = from * dimension + to`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    dimension: usize,
}

impl<T: Copy + Default> Matrix<T> {
    pub fn new(dimension: usize) -> Self {
        Matrix {
            data: vec![T::default(); dimension * dimension],
            dimension,
        }
    }

    /// Builds a matrix from nested rows. Returns `None` unless every row
    /// has exactly as many entries as there are rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let dimension = rows.len();

        if rows.iter().any(|row| row.len() != dimension) {
            return None;
        }

        Some(Matrix {
            data: rows.into_iter().flatten().collect(),
            dimension,
        })
    }

    #[inline(always)]
    fn get_index(&self, from: usize, to: usize) -> usize {
        from * self.dimension + to
    }

    #[inline(always)]
    pub fn get(&self, from: usize, to: usize) -> T {
        self.data[self.get_index(from, to)]
    }

    #[inline(always)]
    pub fn set(&mut self, from: usize, to: usize, value: T) {
        let index = self.get_index(from, to);
        self.data[index] = value;
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.dimension == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let matrix = Matrix::from_rows(vec![vec![0, 1], vec![2, 0]]).unwrap();

        assert_eq!(matrix.dimension(), 2);
        assert_eq!(matrix.get(0, 0), 0);
        assert_eq!(matrix.get(0, 1), 1);
        assert_eq!(matrix.get(1, 0), 2);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(vec![vec![0, 1], vec![2]]).is_none());
        assert!(Matrix::from_rows(vec![vec![0], vec![1], vec![2]]).is_none());
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut matrix: Matrix<Cost> = Matrix::new(3);
        matrix.set(2, 1, 42);

        assert_eq!(matrix.get(2, 1), 42);
        assert_eq!(matrix.get(1, 2), 0);
    }
}
