//! Regular solid harmonics over 3D point batches
//!
//! This library builds the triangular table of regular solid harmonics
//! R_l^m(x, y, z) up to a maximum degree `lmax` as exact sparse polynomials,
//! then compiles the table into a dense coefficient cache for fast batched
//! numeric evaluation.
//!
//! # Features
//!
//! - **Sparse polynomial algebra**: monomials in `x, y, z` with packed
//!   exponent keys, term merging and cancellation
//! - **Recurrence generation**: the vertical/horizontal recurrences that
//!   fill the `(lmax+1) × (2l+1)` harmonic table
//! - **Compiled evaluation**: a dense `(lmax+1)² × C(lmax+3,3)` coefficient
//!   matrix contracted against precomputed monomial powers, one pass per
//!   point batch
//!
//! # Example
//!
//! ```rust
//! use math_solid_harmonics::SolidHarmonics;
//!
//! let table = SolidHarmonics::build(2).unwrap();
//! let evaluator = table.compile();
//!
//! let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
//! let values = evaluator.evaluate(&points);
//! assert_eq!(values.dim(), (3, 9));
//! ```
//!
//! The recurrence relations follow Helgaker, Jorgensen, Olsen,
//! "Molecular Electronic-Structure Theory", p. 215.

pub mod evaluator;
pub mod harmonics;
pub mod indexing;
pub mod polynomial;

pub use evaluator::Evaluator;
pub use harmonics::SolidHarmonics;
pub use polynomial::{Monomial, Polynomial};

/// Exponents are packed into 10-bit fields, which caps both the monomial
/// exponents and the table degree.
pub const MAX_EXPONENT: u32 = 1 << 10;

/// Error types for solid harmonic construction and polynomial algebra
#[derive(Debug, thiserror::Error)]
pub enum HarmonicsError {
    /// A monomial exponent does not fit in its 10-bit field.
    #[error("maximum exponent is {}, got {got}", MAX_EXPONENT - 1)]
    ExponentTooLarge {
        /// The offending exponent value
        got: u32,
    },

    /// The requested table degree exceeds what packed exponents can hold.
    #[error("maximum degree is {}, got {lmax}", MAX_EXPONENT - 1)]
    DegreeTooLarge {
        /// The requested maximum degree
        lmax: usize,
    },

    /// A harmonic order `m` outside `[-l, l]` was requested.
    #[error("order m = {m} out of range for degree l = {l}")]
    OrderOutOfRange {
        /// The harmonic degree
        l: usize,
        /// The invalid harmonic order
        m: i64,
    },

    /// A harmonic degree `l` beyond the table's `lmax` was requested.
    #[error("degree l = {l} out of range for table with lmax = {lmax}")]
    DegreeOutOfRange {
        /// The requested degree
        l: usize,
        /// The table's maximum degree
        lmax: usize,
    },
}

/// A specialized `Result` type for solid harmonic operations.
pub type Result<T> = std::result::Result<T, HarmonicsError>;
