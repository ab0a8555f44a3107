use std::ops::{Index, IndexMut};

use crate::engines::generation::gene::Locus;

/// Dense row-major matrix addressed by `(row, column)` pairs or by `Locus`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix<T> {
    data: Vec<T>,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            data: vec![fill; rows * cols],
            cols,
        }
    }
}

impl<T> Matrix<T> {
    /// Builds a matrix from row-major `data`. `data.len()` must be a multiple
    /// of `cols`.
    pub fn from_vec(data: Vec<T>, cols: usize) -> Option<Self> {
        if cols == 0 || data.len() % cols != 0 {
            return None;
        }
        Some(Self { data, cols })
    }

    pub fn rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.data.len() / self.cols
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    /// Row-major iteration.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

impl<T> Index<Locus> for Matrix<T> {
    type Output = T;

    fn index(&self, l: Locus) -> &T {
        &self[(l.index, l.category as usize)]
    }
}

impl<T> IndexMut<Locus> for Matrix<T> {
    fn index_mut(&mut self, l: Locus) -> &mut T {
        &mut self[(l.index, l.category as usize)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_indexing() {
        let mut m = Matrix::new(3, 2, 0u32);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);

        m[(2, 1)] = 7;
        assert_eq!(m[Locus::new(2, 1)], 7);
        assert_eq!(m.get(2, 1), Some(&7));
        assert_eq!(m.get(3, 0), None);
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn test_from_vec_rejects_ragged_data() {
        assert!(Matrix::from_vec(vec![1, 2, 3], 2).is_none());
        assert!(Matrix::<u8>::from_vec(vec![], 0).is_none());
        let m = Matrix::from_vec(vec![1, 2, 3, 4], 2).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m[(1, 0)], 3);
    }
}
