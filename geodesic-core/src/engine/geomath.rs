//! Angle arithmetic and series helpers shared by the direct and inverse
//! solvers.
//!
//! These follow the reference implementation of GeographicLib (Karney,
//! "Algorithms for geodesics", 2013); the coefficient tables are the
//! order-6 expansions published there.

#![allow(clippy::excessive_precision)]

use crate::defaults::GEODESIC_ORDER;

/// Number of mantissa digits of `f64`.
pub const DIGITS: u64 = 53;

/// Coefficient arrays indexed `1..=GEODESIC_ORDER`; slot `0` is unused.
pub const CARR_SIZE: usize = GEODESIC_ORDER + 1;

pub type SeriesCoefficients = [f64; CARR_SIZE];

/// Returns `x²`.
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Normalise the two-vector `(x, y)` so that `hypot(x, y) == 1`.
#[inline]
pub fn norm(x: &mut f64, y: &mut f64) {
    let r = x.hypot(*y);
    *x /= r;
    *y /= r;
}

/// Error-free sum: `s + t == u + v` exactly, with `s` the rounded sum.
pub fn sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;
    let up = up - u;
    let vpp = vpp - v;
    let t = -(up + vpp);
    (s, t)
}

/// Horner evaluation of the degree-`n` polynomial `p[0..=n]` at `x`.
pub fn polyval(n: usize, p: &[f64], x: f64) -> f64 {
    debug_assert!(
        p.len() > n,
        "polyval: slice too short (len={}, n={})",
        p.len(),
        n
    );
    p[1..=n].iter().fold(p[0], |y, coefficient| y * x + coefficient)
}

/// Round tiny angles (degrees) so they underflow to exactly 0.
///
/// The smallest gap kept is `1/2^57` degree, about 0.7 pm on the earth.
pub fn ang_round(x: f64) -> f64 {
    const Z: f64 = 1.0 / 16.0;
    let mut y = x.abs();
    // z - (z - y) must not be simplified to y
    if y < Z {
        y = Z - (Z - y);
    }
    if x == 0.0 {
        0.0
    } else if x < 0.0 {
        -y
    } else {
        y
    }
}

/// remainder of `x / y` in `[-y/2, y/2]`
fn remainder(x: f64, y: f64) -> f64 {
    let z = if x == 0.0 {
        x
    } else if x.is_finite() {
        x % y
    } else {
        f64::NAN
    };

    if z < -y / 2.0 {
        z + y
    } else if z < y / 2.0 {
        z
    } else {
        z - y
    }
}

/// Reduce an angle in degrees to `(-180, 180]`.
pub fn ang_normalize(x: f64) -> f64 {
    let y = remainder(x, 360.0);
    if y == -180.0 { 180.0 } else { y }
}

/// Latitudes outside `[-90, 90]` become `NaN`.
pub fn lat_fix(x: f64) -> f64 {
    if x.abs() > 90.0 { f64::NAN } else { x }
}

/// `y - x` in degrees reduced to `(-180, 180]`, as an error-free pair.
pub fn ang_diff(x: f64, y: f64) -> (f64, f64) {
    let (d, t) = sum(ang_normalize(-x), ang_normalize(y));
    let d = ang_normalize(d);
    if d == 180.0 && t > 0.0 {
        sum(-180.0, t)
    } else {
        sum(d, t)
    }
}

/// `(sin x, cos x)` for `x` in degrees, exact at multiples of 90°.
pub fn sincosd(x: f64) -> (f64, f64) {
    let mut q = (x / 90.0).round();
    let mut r = x - 90.0 * q;
    if r <= -45.0 {
        r += 90.0;
        q -= 1.0;
    } else if r > 45.0 {
        r -= 90.0;
        q += 1.0;
    }

    let (s, c) = r.to_radians().sin_cos();
    let (mut sinx, mut cosx) = match (q as i64).rem_euclid(4) {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    };

    // no negative zero for the cosine
    cosx += 0.0;
    // sin(-0) is -0
    if sinx == 0.0 {
        sinx = sinx.copysign(x);
    }
    (sinx, cosx)
}

/// `atan2(y, x)` in degrees, with the quadrant reduction done first so
/// that exact multiples of 90° come out exact.
pub fn atan2d(mut y: f64, mut x: f64) -> f64 {
    let mut q = if y.abs() > x.abs() {
        std::mem::swap(&mut x, &mut y);
        2
    } else {
        0
    };
    if x.is_sign_negative() {
        q += 1;
        x = -x;
    }
    let ang = y.atan2(x).to_degrees();
    match q {
        1 => 180.0f64.copysign(y) - ang,
        2 => 90.0 - ang,
        3 => -90.0 + ang,
        _ => ang,
    }
}

/// `e·atanh(e·x)` for signed eccentricity `es`; `atan` for prolate (`es < 0`).
pub fn eatanhe(x: f64, es: f64) -> f64 {
    if es > 0.0 {
        es * (es * x).atanh()
    } else {
        -es * (es * x).atan()
    }
}

/// Clenshaw summation of a trigonometric series.
///
/// With `sinp` the sum is `Σ c[l]·sin(2lx)` for `l` in `1..len`; otherwise
/// it is `Σ c[l]·cos((2l+1)x)` for `l` in `0..len`.
pub fn sin_cos_series<const N: usize>(sinp: bool, sinx: f64, cosx: f64, c: &[f64; N]) -> f64 {
    let mut k = N;
    let mut n = N - usize::from(sinp);
    let ar = 2.0 * (cosx - sinx) * (cosx + sinx);
    let mut y1 = 0.0;
    let mut y0 = if n & 1 != 0 {
        k -= 1;
        c[k]
    } else {
        0.0
    };
    n /= 2;
    while n > 0 {
        n -= 1;
        k -= 1;
        y1 = ar * y0 - y1 + c[k];
        k -= 1;
        y0 = ar * y1 - y0 + c[k];
    }
    if sinp {
        2.0 * sinx * cosx * y0
    } else {
        cosx * (y0 - y1)
    }
}

/// Positive root `k` of `k⁴ + 2k³ − (x² + y² − 1)k² − 2y²k − y² = 0`,
/// used to seed the inverse solution of nearly antipodal points.
pub fn astroid(x: f64, y: f64) -> f64 {
    let p = sq(x);
    let q = sq(y);
    let r = (p + q - 1.0) / 6.0;
    if q == 0.0 && r <= 0.0 {
        return 0.0;
    }

    let s = p * q / 4.0;
    let r2 = sq(r);
    let r3 = r * r2;
    let disc = s * (s + 2.0 * r3);
    let mut u = r;
    if disc >= 0.0 {
        let mut t3 = s + r3;
        t3 += if t3 < 0.0 { -disc.sqrt() } else { disc.sqrt() };
        let t = t3.cbrt();
        u += t + if t != 0.0 { r2 / t } else { 0.0 };
    } else {
        let ang = (-disc).sqrt().atan2(-(s + r3));
        u += 2.0 * r * (ang / 3.0).cos();
    }
    let v = (sq(u) + q).sqrt();
    let uv = if u < 0.0 { q / (v - u) } else { u + v };
    let w = (uv - q) / (2.0 * v);
    uv / ((uv + sq(w)).sqrt() + w)
}

const COEFF_A1: [f64; 5] = [1.0, 4.0, 64.0, 0.0, 256.0];

const COEFF_C1: [f64; 18] = [
    -1.0, 6.0, -16.0, 32.0, -9.0, 64.0, -128.0, 2048.0, 9.0, -16.0, 768.0, 3.0, -5.0, 512.0, -7.0,
    1280.0, -7.0, 2048.0,
];

const COEFF_C1P: [f64; 18] = [
    205.0, -432.0, 768.0, 1536.0, 4005.0, -4736.0, 3840.0, 12288.0, -225.0, 116.0, 384.0, -7173.0,
    2695.0, 7680.0, 3467.0, 7680.0, 38081.0, 61440.0,
];

const COEFF_A2: [f64; 5] = [-11.0, -28.0, -192.0, 0.0, 256.0];

const COEFF_C2: [f64; 18] = [
    1.0, 2.0, 16.0, 32.0, 35.0, 64.0, 384.0, 2048.0, 15.0, 80.0, 768.0, 7.0, 35.0, 512.0, 63.0,
    1280.0, 77.0, 2048.0,
];

/// even polynomial in `eps` shared by the `A1` and `A2` factors
fn even_factor(coeff: &[f64; 5], eps: f64) -> f64 {
    let m = GEODESIC_ORDER / 2;
    polyval(m, coeff, sq(eps)) / coeff[m + 1]
}

/// Fill `c[1..=GEODESIC_ORDER]` from a packed coefficient table where
/// `c[l]` is `eps^l` times a polynomial in `eps²`.
fn series_coefficients(coeff: &[f64; 18], eps: f64, c: &mut SeriesCoefficients) {
    let eps2 = sq(eps);
    let mut d = eps;
    let mut o = 0;
    for (l, slot) in c.iter_mut().enumerate().skip(1) {
        let m = (GEODESIC_ORDER - l) / 2;
        *slot = d * polyval(m, &coeff[o..], eps2) / coeff[o + m + 1];
        o += m + 2;
        d *= eps;
    }
}

/// `A1 − 1`, scale of the distance integral (series group `C1`).
pub fn a1m1f(eps: f64) -> f64 {
    let t = even_factor(&COEFF_A1, eps);
    (t + eps) / (1.0 - eps)
}

/// Coefficients of the distance series (group `C1`).
pub fn c1f(eps: f64, c: &mut SeriesCoefficients) {
    series_coefficients(&COEFF_C1, eps, c);
}

/// Coefficients of the reverted distance series (group `C1p`).
pub fn c1pf(eps: f64, c: &mut SeriesCoefficients) {
    series_coefficients(&COEFF_C1P, eps, c);
}

/// `A2 − 1`, scale of the reduced-length integral (series group `C2`).
pub fn a2m1f(eps: f64) -> f64 {
    let t = even_factor(&COEFF_A2, eps);
    (t - eps) / (1.0 + eps)
}

/// Coefficients of the reduced-length series (group `C2`).
pub fn c2f(eps: f64, c: &mut SeriesCoefficients) {
    series_coefficients(&COEFF_C2, eps, c);
}
