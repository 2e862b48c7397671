//! Recurrence generation of the regular solid harmonic table
//!
//! Builds the triangular table `S[l][m]` of regular solid harmonics for
//! `0 <= l <= lmax`, `|m| <= l`, each cell an exact sparse polynomial in
//! `x`, `y`, `z`. Rows are produced in increasing `l`: the vertical
//! recurrence yields the two extremal orders `m = ±(l+1)` of the next row
//! from row `l`, then the horizontal recurrence fills the interior orders
//! from rows `l` and `l-1`.
//!
//! The recurrence relations follow Helgaker, Jorgensen, Olsen,
//! "Molecular Electronic-Structure Theory", p. 215.

use crate::evaluator::Evaluator;
use crate::indexing::kronecker_delta;
use crate::polynomial::{Monomial, Polynomial};
use crate::{HarmonicsError, Result, MAX_EXPONENT};

/// The full table of regular solid harmonics up to degree `lmax`
///
/// Fully built at construction and immutable afterwards. Row `l` holds
/// `2l+1` polynomials addressed by order `m` in `[-l, l]`.
#[derive(Debug, Clone)]
pub struct SolidHarmonics {
    lmax: usize,
    rows: Vec<Vec<Polynomial>>,
}

/// Slot of order `m` within row `l`: rows store `[-l, ..., l]` in order
fn slot(l: usize, m: i64) -> usize {
    (m + l as i64) as usize
}

fn cell(rows: &[Vec<Polynomial>], l: usize, m: i64) -> &Polynomial {
    &rows[l][slot(l, m)]
}

/// Vertical recurrence prefactor `A(l) = sqrt(2^δ(l,0) (2l+1) / (2l+2))`
fn vertical_coeff(l: usize) -> f64 {
    let doubling = 2f64.powi(kronecker_delta(l, 0) as i32);
    (doubling * (2 * l + 1) as f64 / (2 * l + 2) as f64).sqrt()
}

/// `S[l+1][-(l+1)] = A(l) y S[l][l] + A(l) x S[l][-l]`
fn recurrence_min(rows: &[Vec<Polynomial>], l: usize) -> Result<Polynomial> {
    let c0 = vertical_coeff(l);
    let top = cell(rows, l, l as i64);
    let bottom = cell(rows, l, -(l as i64));

    Ok(top
        .times(&Monomial::new(Monomial::Y, c0)?)?
        .plus_poly(&bottom.times(&Monomial::new(Monomial::X, c0)?)?))
}

/// `S[l+1][l+1] = A(l) x S[l][l] - A(l) y S[l][-l]`
fn recurrence_max(rows: &[Vec<Polynomial>], l: usize) -> Result<Polynomial> {
    let c0 = vertical_coeff(l);
    let top = cell(rows, l, l as i64);
    let bottom = cell(rows, l, -(l as i64));

    Ok(top
        .times(&Monomial::new(Monomial::X, c0)?)?
        .plus_poly(&bottom.times(&Monomial::new(Monomial::Y, -c0)?)?))
}

/// `S[l+1][m] = c0 z S[l][m] + c1 (x² + y² + z²) S[l-1][m]`
///
/// The `r²` correction enters additively, decomposed into three monomial
/// products because the algebra multiplies by single monomials only. Its
/// prefactor `c1` vanishes at `m = ±l`, where no row-`(l-1)` term exists.
fn recurrence_mid(rows: &[Vec<Polynomial>], l: usize, m: i64) -> Result<Polynomial> {
    let (lf, mf) = (l as f64, m as f64);
    let c0 = (2.0 * lf + 1.0) / ((lf + mf + 1.0) * (lf - mf + 1.0)).sqrt();
    let mut result = cell(rows, l, m).times(&Monomial::new(Monomial::Z, c0)?)?;

    if m.unsigned_abs() < l as u64 {
        let c1 = -((lf + mf) * (lf - mf) / ((lf + mf + 1.0) * (lf - mf + 1.0))).sqrt();
        let lower = cell(rows, l - 1, m);

        for square in [[2, 0, 0], [0, 2, 0], [0, 0, 2]] {
            result = result.plus_poly(&lower.times(&Monomial::new(square, c1)?)?);
        }
    }

    Ok(result)
}

impl SolidHarmonics {
    /// Build the full table up to degree `lmax`
    ///
    /// Seeds `S[0][0] = 1`, `S[1][-1] = y`, `S[1][0] = z`, `S[1][1] = x`,
    /// then applies the vertical and horizontal recurrences row by row.
    /// `lmax` is capped by the packed-exponent width.
    pub fn build(lmax: usize) -> Result<Self> {
        if lmax >= MAX_EXPONENT as usize {
            return Err(HarmonicsError::DegreeTooLarge { lmax });
        }

        let mut rows: Vec<Vec<Polynomial>> = (0..=lmax)
            .map(|l| vec![Polynomial::new(); 2 * l + 1])
            .collect();

        rows[0][0] = Polynomial::from_terms(&[(Monomial::ONE, 1.0)])?;
        if lmax >= 1 {
            rows[1][slot(1, -1)] = Polynomial::from_terms(&[(Monomial::Y, 1.0)])?;
            rows[1][slot(1, 0)] = Polynomial::from_terms(&[(Monomial::Z, 1.0)])?;
            rows[1][slot(1, 1)] = Polynomial::from_terms(&[(Monomial::X, 1.0)])?;
        }

        for l in 1..lmax {
            let next = (l + 1) as i64;

            let min = recurrence_min(&rows, l)?;
            assert!(
                !min.is_empty(),
                "could not generate harmonic ({}, {})",
                l + 1,
                -next
            );
            rows[l + 1][slot(l + 1, -next)] = min;

            let max = recurrence_max(&rows, l)?;
            assert!(
                !max.is_empty(),
                "could not generate harmonic ({}, {})",
                l + 1,
                next
            );
            rows[l + 1][slot(l + 1, next)] = max;

            for m in -(l as i64)..=(l as i64) {
                let mid = recurrence_mid(&rows, l, m)?;
                assert!(!mid.is_empty(), "could not generate harmonic ({}, {})", l + 1, m);
                rows[l + 1][slot(l + 1, m)] = mid;
            }
        }

        Ok(Self { lmax, rows })
    }

    /// Maximum degree of the table
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    /// Total number of harmonics, `(lmax+1)²`
    pub fn len(&self) -> usize {
        (self.lmax + 1) * (self.lmax + 1)
    }

    /// Always false: every table holds at least `S[0][0]`. Exists to
    /// complete the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The harmonic `S[l][m]`
    ///
    /// `m` may be negative; it addresses slot `m + l` of row `l`.
    /// Out-of-range `l` or `m` is a validation error.
    pub fn get(&self, l: usize, m: i64) -> Result<&Polynomial> {
        if l > self.lmax {
            return Err(HarmonicsError::DegreeOutOfRange { l, lmax: self.lmax });
        }
        if m < -(l as i64) || m > l as i64 {
            return Err(HarmonicsError::OrderOutOfRange { l, m });
        }
        Ok(&self.rows[l][slot(l, m)])
    }

    /// Iterate over `(l, m, polynomial)` in order `l = 0..=lmax`,
    /// `m = -l..=l`
    pub fn iter(&self) -> impl Iterator<Item = (usize, i64, &Polynomial)> + '_ {
        self.rows.iter().enumerate().flat_map(|(l, row)| {
            row.iter()
                .enumerate()
                .map(move |(s, poly)| (l, s as i64 - l as i64, poly))
        })
    }

    /// Compile the table into a dense batched evaluator
    pub fn compile(&self) -> Evaluator {
        Evaluator::compile(self)
    }
}
