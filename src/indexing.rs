//! Combinatorial index utilities for the harmonic table and evaluator cache
//!
//! Two bijections tie the symbolic table to the dense coefficient cache:
//!
//! - `harmonic_index(l, m) = l(l+1) + m` maps the `(lmax+1)²` harmonics
//!   onto cache rows
//! - `lexicographic_position` maps each exponent triple `(a, b, c)` with
//!   `a + b + c <= lmax` onto cache columns, in the order produced by
//!   [`degree_triples`]

/// Kronecker delta: 1 if `i == j`, else 0
pub fn kronecker_delta(i: usize, j: usize) -> u32 {
    u32::from(i == j)
}

/// Canonical row index of harmonic `(l, m)`: `l(l+1) + m`
///
/// Bijective from `{(l, m) : 0 <= l, |m| <= l}` onto `0..(lmax+1)²`.
pub fn harmonic_index(l: usize, m: i64) -> usize {
    ((l * (l + 1)) as i64 + m) as usize
}

/// Number of exponent triples `(a, b, c)` with `a + b + c <= lmax`
///
/// Equals the binomial coefficient `C(lmax+3, 3)`.
pub fn triple_count(lmax: usize) -> usize {
    (lmax + 1) * (lmax + 2) * (lmax + 3) / 6
}

/// Enumerate all exponent triples `(a, b, c)` with each component in
/// `[0, lmax]` and `a + b + c <= lmax`
///
/// The order is lexicographic with `a` outermost and `c` innermost; it is
/// the order [`lexicographic_position`] assumes.
pub fn degree_triples(lmax: usize) -> Vec<[u32; 3]> {
    let bound = lmax as u32;
    let mut triples = Vec::with_capacity(triple_count(lmax));

    for a in 0..=bound {
        for b in 0..=bound {
            for c in 0..=bound {
                if a + b + c <= bound {
                    triples.push([a, b, c]);
                }
            }
        }
    }

    triples
}

/// Closed-form position of `(a, b, c)` in the [`degree_triples`] order
///
/// Evaluates the cubic position polynomial
///
/// ```text
/// pos = [6 + 11a - 6a² + a³ + 9b - 6ab - 3b² + 6c
///        + 12a·lmax - 3a²·lmax + 6b·lmax + 3a·lmax²] / 6 - 1
/// ```
///
/// which inverts the filtered enumeration without iterating. Intermediate
/// terms go negative, so the arithmetic runs in `i64`. Triples with
/// `a + b + c > lmax` are outside the enumeration; a debug assertion
/// catches them before they turn into a bogus column index.
pub fn lexicographic_position(exponent: [u32; 3], lmax: usize) -> usize {
    let (a, b, c) = (
        exponent[0] as i64,
        exponent[1] as i64,
        exponent[2] as i64,
    );
    let n = lmax as i64;

    debug_assert!(
        a + b + c <= n,
        "exponent {:?} exceeds total degree {}",
        exponent,
        lmax
    );

    let mut pos = 6 + 11 * a - 6 * a * a + a * a * a + 9 * b - 6 * a * b - 3 * b * b + 6 * c;
    pos += 12 * a * n - 3 * a * a * n + 6 * b * n + 3 * a * n * n;

    (pos / 6 - 1) as usize
}
