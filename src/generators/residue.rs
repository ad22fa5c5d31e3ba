//! Residue-based scalar generators.
//!
//! Both moduli are written as products of two large primes. The products
//! overflow a 64-bit word and wrap; the wrapped values are the moduli the
//! deployed system has always used, so they are kept verbatim rather than
//! widened.

use super::mix::scalar_from_bytes;
use super::BitSource;

/// Quadratic residue generator (`s = s² mod M`, Blum-Blum-Shub style).
pub struct QuadraticResidue {
    state: i64,
}

// 252097271807 is the 9,999,979,999th prime.
const RESIDUE_MODULUS: i64 = 252_097_271_807i64.wrapping_mul(518_649_336_203);

impl QuadraticResidue {
    pub fn new() -> Self {
        Self { state: -1 }
    }
}

impl Default for QuadraticResidue {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSource for QuadraticResidue {
    fn next_bits(&mut self, bits: u32) -> u32 {
        self.state = self.state.wrapping_mul(self.state) % RESIDUE_MODULUS;
        // 48-bit extraction window, narrower than the sibling scalar
        // generators; kept for compatibility with existing sequences.
        ((self.state as u64) >> (48 - bits)) as u32
    }

    fn reseed_bytes(&mut self, bytes: &[u8]) {
        self.reseed_scalar(scalar_from_bytes(bytes));
    }

    fn reseed_scalar(&mut self, seed: i64) {
        self.state = self.state.wrapping_add(seed);
    }

    fn entropy_bits(&self) -> usize {
        64
    }
}

/// Cubic polynomial generator with a trigonometric term.
///
/// The recurrence mixes wrapping integer polynomials of the state with a
/// truncated `M·cos(s)` term evaluated in floating point. The float
/// excursion makes the map strongly non-linear at the cost of a
/// platform-pinned cosine; sequences are reproducible on one build.
pub struct CubicPolynomial {
    state: i64,
}

const POLY_MODULUS: i64 = 29_996_224_275_833i64.wrapping_mul(22_801_285_763);

impl CubicPolynomial {
    pub fn new() -> Self {
        Self { state: -1 }
    }
}

impl Default for CubicPolynomial {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSource for CubicPolynomial {
    fn next_bits(&mut self, bits: u32) -> u32 {
        let s = self.state;
        // saturating float-to-int conversion, NaN maps to zero
        let cosine = ((POLY_MODULUS as f64) * (s as f64).cos()) as i64;
        let cubic = (POLY_MODULUS / 2).wrapping_mul(s.wrapping_mul(s).wrapping_mul(s));
        let square = POLY_MODULUS.wrapping_mul(s.wrapping_mul(s).wrapping_add(1));
        let trig = POLY_MODULUS.wrapping_mul(s).wrapping_mul(cosine);
        self.state = cubic.wrapping_add(square).wrapping_add(trig);
        ((self.state as u64) >> (64 - bits)) as u32
    }

    fn reseed_bytes(&mut self, bytes: &[u8]) {
        self.reseed_scalar(scalar_from_bytes(bytes));
    }

    fn reseed_scalar(&mut self, seed: i64) {
        self.state = self.state.wrapping_add(seed);
    }

    fn entropy_bits(&self) -> usize {
        64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_reference_sequence() {
        let mut qr = QuadraticResidue::new();
        qr.reseed_scalar(12345);
        let expected = [2325, 2090304278, 3375718764, 4091657961, 12887580];
        for &want in &expected {
            assert_eq!(qr.next_bits(32), want);
        }
    }

    #[test]
    fn test_quadratic_modulus_is_wrapped_product() {
        // the product of the two primes does not fit in i64; the working
        // modulus is the wrapped value
        assert_eq!(RESIDUE_MODULUS, -439313165485525387);
    }

    #[test]
    fn test_cubic_deterministic() {
        let mut a = CubicPolynomial::new();
        let mut b = CubicPolynomial::new();
        a.reseed_bytes(b"poly");
        b.reseed_bytes(b"poly");
        for _ in 0..50 {
            assert_eq!(a.next_bits(32), b.next_bits(32));
        }
    }

    #[test]
    fn test_cubic_diverges_on_different_seed() {
        let mut a = CubicPolynomial::new();
        let mut b = CubicPolynomial::new();
        a.reseed_bytes(b"poly-1");
        b.reseed_bytes(b"poly-2");
        let va: Vec<u32> = (0..8).map(|_| a.next_bits(32)).collect();
        let vb: Vec<u32> = (0..8).map(|_| b.next_bits(32)).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn test_reseed_accumulates() {
        let mut once = QuadraticResidue::new();
        once.reseed_bytes(b"beta");

        let mut twice = QuadraticResidue::new();
        twice.reseed_bytes(b"alpha");
        twice.reseed_bytes(b"beta");

        assert_ne!(once.next_bits(32), twice.next_bits(32));
    }
}
