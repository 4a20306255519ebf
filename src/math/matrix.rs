use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub};

use crate::error::{NnError, Result};

/// Dense row-major matrix. Layer weights are stored `out_dim x in_dim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// `cols` is the fan-in. Keeps sigmoid/tanh units away from saturation
    /// at the start of training.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (1.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for value in row.iter_mut() {
                *value = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// True when `data` really holds `rows` rows of `cols` values each.
    pub fn is_rectangular(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }

    /// Builds the outer product `a ⊗ b` (shape `a.len() x b.len()`).
    pub fn outer(a: &[f64], b: &[f64]) -> Matrix {
        Matrix::from_data(
            a.iter()
                .map(|&x| b.iter().map(|&y| x * y).collect())
                .collect()
        )
    }

    /// `self · v`
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.cols {
            return Err(NnError::DimensionMismatch {
                context: "matrix-vector product",
                expected: self.cols,
                actual: v.len(),
            });
        }
        Ok(self.data.iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect())
    }

    /// `selfᵗ · v`, without materialising the transpose.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.rows {
            return Err(NnError::DimensionMismatch {
                context: "transposed matrix-vector product",
                expected: self.rows,
                actual: v.len(),
            });
        }
        let mut res = vec![0.0; self.cols];
        for (row, &scale) in self.data.iter().zip(v) {
            for (acc, w) in res.iter_mut().zip(row) {
                *acc += w * scale;
            }
        }
        Ok(res)
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if !self.same_shape(&rhs) {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;
        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data) {
            for (x, y) in row.iter_mut().zip(rhs_row) {
                *x += y;
            }
        }
        res
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if !self.same_shape(&rhs) {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;
        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data) {
            for (x, y) in row.iter_mut().zip(rhs_row) {
                *x -= y;
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn ragged_data_is_not_rectangular() {
        assert!(Matrix::zeros(2, 3).is_rectangular());
        let ragged = Matrix { rows: 1, cols: 2, data: vec![vec![2.0]] };
        assert!(!ragged.is_rectangular());
        let short = Matrix { rows: 2, cols: 1, data: vec![vec![2.0]] };
        assert!(!short.is_rectangular());
    }

    #[test]
    fn products_follow_row_major_layout() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(m.mul_vec(&[1.0, 0.0, -1.0]).unwrap(), vec![-2.0, -2.0]);
        assert_eq!(m.transpose_mul_vec(&[1.0, 1.0]).unwrap(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn mismatched_vector_is_rejected() {
        let m = Matrix::zeros(2, 3);
        assert!(matches!(
            m.mul_vec(&[1.0, 2.0]),
            Err(NnError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
        assert!(m.transpose_mul_vec(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn outer_and_arithmetic() {
        let o = Matrix::outer(&[1.0, 2.0], &[3.0, 4.0, 5.0]);
        assert_eq!((o.rows, o.cols), (2, 3));
        assert_eq!(o.data[1], vec![6.0, 8.0, 10.0]);
        let diff = o.clone() - o.map(|x| x * 0.5);
        assert_eq!(diff.data[0], vec![1.5, 2.0, 2.5]);
        let sum = diff.clone() + diff;
        assert_eq!(sum.data[1], vec![6.0, 8.0, 10.0]);
    }

    #[test]
    fn xavier_is_reproducible_with_a_seed() {
        let a = Matrix::xavier(3, 4, &mut StdRng::seed_from_u64(7));
        let b = Matrix::xavier(3, 4, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.data.iter().flatten().all(|w| w.abs() < 5.0));
    }
}
