//! Sparse polynomial algebra over monomials in `x`, `y`, `z`
//!
//! A [`Monomial`] is a single term `coeff * x^a * y^b * z^c` with its three
//! exponents packed into one `u32` key (`c << 20 | b << 10 | a`). Key
//! equality is term identity: two monomials are the same term iff their
//! packed keys are equal, regardless of coefficient.
//!
//! A [`Polynomial`] maps packed keys to accumulated coefficients. Terms
//! whose magnitude falls below machine epsilon are dropped eagerly, so the
//! zero polynomial is always the empty map. All operations return a fresh
//! value; the receiver is never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use crate::{HarmonicsError, Result, MAX_EXPONENT};

const FIELD_BITS: u32 = 10;
const FIELD_MASK: u32 = MAX_EXPONENT - 1;

fn pack(exponent: [u32; 3]) -> Result<u32> {
    for &e in &exponent {
        if e >= MAX_EXPONENT {
            return Err(HarmonicsError::ExponentTooLarge { got: e });
        }
    }
    Ok(exponent[2] << (2 * FIELD_BITS) | exponent[1] << FIELD_BITS | exponent[0])
}

fn unpack(key: u32) -> [u32; 3] {
    [
        key & FIELD_MASK,
        (key >> FIELD_BITS) & FIELD_MASK,
        (key >> (2 * FIELD_BITS)) & FIELD_MASK,
    ]
}

/// A single term `coeff * x^a * y^b * z^c`, immutable once constructed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Monomial {
    key: u32,
    coeff: f64,
}

impl Monomial {
    /// Exponent triple of `x`
    pub const X: [u32; 3] = [1, 0, 0];
    /// Exponent triple of `y`
    pub const Y: [u32; 3] = [0, 1, 0];
    /// Exponent triple of `z`
    pub const Z: [u32; 3] = [0, 0, 1];
    /// Exponent triple of the constant term
    pub const ONE: [u32; 3] = [0, 0, 0];

    /// Create a monomial from an exponent triple and a coefficient
    ///
    /// Each exponent must fit in 10 bits (`< 1024`).
    pub fn new(exponent: [u32; 3], coeff: f64) -> Result<Self> {
        Ok(Self {
            key: pack(exponent)?,
            coeff,
        })
    }

    /// The constant monomial `coeff * x^0 * y^0 * z^0`
    pub fn constant(coeff: f64) -> Self {
        Self { key: 0, coeff }
    }

    /// The exponent triple `[a, b, c]`
    pub fn exponent(&self) -> [u32; 3] {
        unpack(self.key)
    }

    /// The coefficient
    pub fn coeff(&self) -> f64 {
        self.coeff
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exponent = self.exponent();
        let mut factors = Vec::new();

        for (symbol, e) in ["x", "y", "z"].iter().zip(exponent) {
            match e {
                0 => {}
                1 => factors.push(symbol.to_string()),
                _ => factors.push(format!("{}**{}", symbol, e)),
            }
        }

        if factors.is_empty() {
            write!(f, "{:.4}", self.coeff)
        } else {
            write!(f, "{:.4} * {}", self.coeff, factors.join(" * "))
        }
    }
}

/// A sparse polynomial in `x`, `y`, `z`
///
/// Stored as packed exponent key → coefficient. The `BTreeMap` keeps term
/// order deterministic (ascending packed key).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    terms: BTreeMap<u32, f64>,
}

impl Polynomial {
    /// The zero polynomial
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a polynomial from `(exponent, coefficient)` terms
    ///
    /// Zero-coefficient terms are ignored; duplicate exponents accumulate.
    pub fn from_terms(terms: &[([u32; 3], f64)]) -> Result<Self> {
        let mut poly = Self::new();
        for &(exponent, coeff) in terms {
            poly.insert(pack(exponent)?, coeff);
        }
        Ok(poly)
    }

    /// Accumulate `coeff` onto the term at `key`, dropping the term if the
    /// result falls below machine epsilon.
    fn insert(&mut self, key: u32, coeff: f64) {
        let total = self.terms.get(&key).copied().unwrap_or(0.0) + coeff;
        if total.abs() < f64::EPSILON {
            self.terms.remove(&key);
        } else {
            self.terms.insert(key, total);
        }
    }

    /// Sum of this polynomial and a single monomial
    pub fn plus(&self, term: &Monomial) -> Polynomial {
        let mut out = self.clone();
        out.insert(term.key, term.coeff);
        out
    }

    /// Sum of two polynomials, merging term by term
    pub fn plus_poly(&self, other: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        for (&key, &coeff) in &other.terms {
            out.insert(key, coeff);
        }
        out
    }

    /// Product with a single monomial
    ///
    /// Shifts every exponent by the factor's exponent and scales every
    /// coefficient by the factor's coefficient. Fails if a shifted
    /// exponent no longer fits in its 10-bit field.
    pub fn times(&self, factor: &Monomial) -> Result<Polynomial> {
        let [i, j, k] = factor.exponent();
        let mut out = Polynomial::new();

        for (&key, &coeff) in &self.terms {
            let [a, b, c] = unpack(key);
            let shifted = pack([a + i, b + j, c + k])?;
            out.insert(shifted, coeff * factor.coeff);
        }

        Ok(out)
    }

    /// Product with a scalar, the exponent-`(0,0,0)` case of [`times`]
    ///
    /// [`times`]: Polynomial::times
    pub fn scale(&self, factor: f64) -> Polynomial {
        let mut out = Polynomial::new();
        for (&key, &coeff) in &self.terms {
            out.insert(key, coeff * factor);
        }
        out
    }

    /// Stored terms as `(exponent, coefficient)` pairs, in ascending
    /// packed-key order
    pub fn terms(&self) -> impl Iterator<Item = ([u32; 3], f64)> + '_ {
        self.terms.iter().map(|(&key, &coeff)| (unpack(key), coeff))
    }

    /// Number of stored terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True for the zero polynomial
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Largest total degree `a + b + c` over the stored terms, or `None`
    /// for the zero polynomial
    pub fn degree(&self) -> Option<u32> {
        self.terms
            .keys()
            .map(|&key| unpack(key).iter().sum())
            .max()
    }

    /// Evaluate by direct substitution at a single point
    pub fn eval(&self, x: f64, y: f64, z: f64) -> f64 {
        self.terms
            .iter()
            .map(|(&key, &coeff)| {
                let [a, b, c] = unpack(key);
                coeff * x.powi(a as i32) * y.powi(b as i32) * z.powi(c as i32)
            })
            .sum()
    }
}

impl Add<&Monomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, term: &Monomial) -> Polynomial {
        self.plus(term)
    }
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, other: &Polynomial) -> Polynomial {
        self.plus_poly(other)
    }
}

impl From<Monomial> for Polynomial {
    fn from(term: Monomial) -> Self {
        Polynomial::new().plus(&term)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }

        let rendered: Vec<String> = self
            .terms
            .iter()
            .map(|(&key, &coeff)| Monomial { key, coeff }.to_string())
            .collect();
        write!(f, "{}", rendered.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_monomial_rejects_large_exponent() {
        assert!(Monomial::new([1024, 0, 0], 1.0).is_err());
        assert!(Monomial::new([0, 1024, 0], 1.0).is_err());
        assert!(Monomial::new([0, 0, 1024], 1.0).is_err());
        assert!(Monomial::new([1023, 1023, 1023], 1.0).is_ok());
    }

    #[test]
    fn test_monomial_exponent_round_trip() {
        let m = Monomial::new([3, 7, 11], 2.5).unwrap();
        assert_eq!(m.exponent(), [3, 7, 11]);
        assert!((m.coeff() - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_monomial_display() {
        let m = Monomial::new([2, 1, 0], 0.5).unwrap();
        assert_eq!(m.to_string(), "0.5000 * x**2 * y");

        let c = Monomial::constant(3.0);
        assert_eq!(c.to_string(), "3.0000");
    }

    #[test]
    fn test_construction_ignores_zero_terms() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 1.0), ([0, 1, 0], 0.0)]).unwrap();
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_plus_merges_on_collision() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 1.0)]).unwrap();
        let q = p.plus(&Monomial::new([1, 0, 0], 2.0).unwrap());

        assert_eq!(q.len(), 1);
        let (exponent, coeff) = q.terms().next().unwrap();
        assert_eq!(exponent, [1, 0, 0]);
        assert!((coeff - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_plus_cancellation_yields_zero() {
        let p = Polynomial::from_terms(&[([2, 0, 0], 1.5), ([0, 0, 1], -0.5)]).unwrap();
        let negated = p.scale(-1.0);

        let sum = p.plus_poly(&negated);
        assert!(sum.is_empty());
        assert_eq!(sum.to_string(), "0");
    }

    #[test]
    fn test_plus_commutative_and_associative() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 1.0), ([0, 2, 0], -2.0)]).unwrap();
        let q = Polynomial::from_terms(&[([0, 2, 0], 2.0), ([0, 0, 3], 4.0)]).unwrap();
        let r = Polynomial::from_terms(&[([0, 0, 3], -1.0)]).unwrap();

        assert_eq!(p.plus_poly(&q), q.plus_poly(&p));
        assert_eq!(
            p.plus_poly(&q).plus_poly(&r),
            p.plus_poly(&q.plus_poly(&r))
        );
    }

    #[test]
    fn test_plus_leaves_receiver_unchanged() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 1.0)]).unwrap();
        let before = p.clone();

        let _ = p.plus(&Monomial::new([1, 0, 0], -1.0).unwrap());
        assert_eq!(p, before);
    }

    #[test]
    fn test_times_identity_is_noop() {
        let p = Polynomial::from_terms(&[([1, 2, 3], 0.25), ([0, 0, 0], -1.0)]).unwrap();
        let identity = Monomial::new(Monomial::ONE, 1.0).unwrap();

        assert_eq!(p.times(&identity).unwrap(), p);
    }

    #[test]
    fn test_times_shifts_and_scales() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 2.0), ([0, 1, 0], 3.0)]).unwrap();
        let m = Monomial::new([0, 0, 2], -1.0).unwrap();

        let q = p.times(&m).unwrap();
        let terms: Vec<_> = q.terms().collect();
        // Ascending packed-key order: a is the least significant field
        assert_eq!(terms, vec![([1, 0, 2], -2.0), ([0, 1, 2], -3.0)]);
    }

    #[test]
    fn test_times_overflow_is_an_error() {
        let p = Polynomial::from_terms(&[([1023, 0, 0], 1.0)]).unwrap();
        let x = Monomial::new(Monomial::X, 1.0).unwrap();
        assert!(p.times(&x).is_err());
    }

    #[test]
    fn test_scale_matches_constant_times() {
        let p = Polynomial::from_terms(&[([2, 0, 0], 1.0), ([0, 0, 1], -4.0)]).unwrap();
        let by_monomial = p.times(&Monomial::constant(0.5)).unwrap();
        assert_eq!(p.scale(0.5), by_monomial);
    }

    #[test]
    fn test_add_operators_match_methods() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 1.0), ([0, 2, 0], -2.0)]).unwrap();
        let q = Polynomial::from_terms(&[([0, 2, 0], 2.0), ([0, 0, 3], 4.0)]).unwrap();
        let m = Monomial::new([0, 0, 3], -4.0).unwrap();

        assert_eq!(&p + &q, p.plus_poly(&q));
        assert_eq!(&p + &m, p.plus(&m));

        // Cancellation through the operators too
        let sum = &(&p + &q) + &m;
        assert_eq!(sum, Polynomial::from_terms(&[([1, 0, 0], 1.0)]).unwrap());
    }

    #[test]
    fn test_eval_substitution() {
        // 2x²y - z
        let p = Polynomial::from_terms(&[([2, 1, 0], 2.0), ([0, 0, 1], -1.0)]).unwrap();
        assert!((p.eval(2.0, 3.0, 5.0) - (2.0 * 4.0 * 3.0 - 5.0)).abs() < EPSILON);
        assert!((p.eval(0.0, 0.0, 0.0)).abs() < EPSILON);
    }

    #[test]
    fn test_degree() {
        let p = Polynomial::from_terms(&[([2, 1, 0], 1.0), ([0, 0, 2], 1.0)]).unwrap();
        assert_eq!(p.degree(), Some(3));
        assert_eq!(Polynomial::new().degree(), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let p = Polynomial::from_terms(&[([1, 0, 0], 1.0), ([0, 2, 0], -0.5)]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Polynomial = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
