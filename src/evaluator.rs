//! Compiled batched evaluation of a solid harmonic table
//!
//! [`Evaluator::compile`] flattens a [`SolidHarmonics`] table into a dense
//! `(lmax+1)² × C(lmax+3,3)` coefficient matrix: rows are harmonics in
//! `harmonic_index` order, columns are exponent triples in
//! `lexicographic_position` order.
//!
//! Evaluation over a point batch runs in two passes: first all monomial
//! powers `x^a y^b z^c` are materialized for every point (so no power is
//! recomputed per harmonic), then the result is a single matrix
//! contraction `powers · cacheᵀ`. The power pass is sharded over points
//! with rayon for large batches.

use ndarray::{Array2, ArrayViewMut1, Axis};
use rayon::prelude::*;

use crate::harmonics::SolidHarmonics;
use crate::indexing::{degree_triples, harmonic_index, lexicographic_position, triple_count};

/// Below this batch size the power pass runs sequentially; thread fan-out
/// costs more than it saves on a handful of points.
const PARALLEL_THRESHOLD: usize = 64;

/// Dense coefficient cache compiled from a [`SolidHarmonics`] table
#[derive(Debug, Clone)]
pub struct Evaluator {
    lmax: usize,
    /// `cache[[harmonic_index(l, m), lexicographic_position(e, lmax)]]`
    /// holds the coefficient of monomial `e` in `S[l][m]`, 0 if absent.
    cache: Array2<f64>,
    /// Exponent triples in column order
    kappa: Vec<[u32; 3]>,
}

fn fill_powers(mut row: ArrayViewMut1<f64>, point: &[f64; 3], kappa: &[[u32; 3]]) {
    for (slot, exponent) in row.iter_mut().zip(kappa) {
        // Integer powers, with 0^0 = 1
        *slot = point[0].powi(exponent[0] as i32)
            * point[1].powi(exponent[1] as i32)
            * point[2].powi(exponent[2] as i32);
    }
}

impl Evaluator {
    /// Compile a table into its dense coefficient cache
    pub fn compile(table: &SolidHarmonics) -> Self {
        let lmax = table.lmax();
        let nrow = (lmax + 1) * (lmax + 1);
        let ncol = triple_count(lmax);

        let mut cache = Array2::zeros((nrow, ncol));
        for (l, m, poly) in table.iter() {
            let row = harmonic_index(l, m);
            for (exponent, coeff) in poly.terms() {
                cache[[row, lexicographic_position(exponent, lmax)]] = coeff;
            }
        }

        let kappa = degree_triples(lmax);
        assert_eq!(kappa.len(), ncol);

        Self { lmax, cache, kappa }
    }

    /// Maximum degree of the compiled table
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    /// Number of harmonics, `(lmax+1)²`; also the output column count
    pub fn num_harmonics(&self) -> usize {
        self.cache.nrows()
    }

    /// Evaluate every harmonic at every point
    ///
    /// Returns an array of shape `(points.len(), (lmax+1)²)`; output
    /// column `k` is harmonic `harmonic_index(l, m) = k` evaluated at the
    /// corresponding point.
    pub fn evaluate(&self, points: &[[f64; 3]]) -> Array2<f64> {
        let powers = self.monomial_powers(points);
        powers.dot(&self.cache.t())
    }

    /// The `(points.len(), ncol)` matrix of monomial values `x^a y^b z^c`
    fn monomial_powers(&self, points: &[[f64; 3]]) -> Array2<f64> {
        let mut powers = Array2::zeros((points.len(), self.kappa.len()));

        if points.len() < PARALLEL_THRESHOLD {
            for (row, point) in powers.axis_iter_mut(Axis(0)).zip(points) {
                fill_powers(row, point, &self.kappa);
            }
        } else {
            powers
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .zip(points.par_iter())
                .for_each(|(row, point)| fill_powers(row, point, &self.kappa));
        }

        powers
    }
}
