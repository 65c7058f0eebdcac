//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function Φ
//! - `norm_pdf`: Probability density function φ
//!
//! Both are generic over `T: Float` so the Greeks Engine can run in `f32`
//! for bulk screening and `f64` everywhere else.

use num_traits::Float;

/// 1 / sqrt(2π)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Chebyshev-fitted complementary error function.
///
/// Fractional error below 1.2e-7 over the whole real line, which is well
/// inside the precision of vendor-quoted implied volatilities.
///
/// erfc(x) = t·exp(−x² + P(t)),  t = 1 / (1 + |x|/2)
#[inline]
fn erfc<T: Float>(x: T) -> T {
    const COEFFS: [f64; 10] = [
        -1.265_512_23,
        1.000_023_68,
        0.374_091_96,
        0.096_784_18,
        -0.186_288_06,
        0.278_868_07,
        -1.135_203_98,
        1.488_515_87,
        -0.822_152_23,
        0.170_872_77,
    ];

    let c = |v: f64| T::from(v).unwrap_or_else(T::zero);
    let z = x.abs();
    let t = T::one() / (T::one() + c(0.5) * z);

    // Horner evaluation from the highest-order coefficient down.
    let poly = COEFFS
        .iter()
        .rev()
        .fold(T::zero(), |acc, &k| c(k) + t * acc);

    let tail = t * (-z * z + poly).exp();
    if x >= T::zero() {
        tail
    } else {
        c(2.0) - tail
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = ½·erfc(−x/√2)
///
/// # Examples
/// ```
/// use gex_core::math::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-6);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let half = T::from(0.5).unwrap_or_else(T::zero);
    let sqrt_2 = T::from(std::f64::consts::SQRT_2).unwrap_or_else(T::one);
    half * erfc(-x / sqrt_2)
}

/// Standard normal probability density function.
///
/// φ(x) = exp(−x²/2) / √(2π)
///
/// # Examples
/// ```
/// use gex_core::math::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let k = T::from(FRAC_1_SQRT_2PI).unwrap_or_else(T::zero);
    let half = T::from(0.5).unwrap_or_else(T::zero);
    k * (-half * x * x).exp()
}
