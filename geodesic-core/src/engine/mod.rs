//! Numeric engine: Karney's solution of the geodesic problems on an
//! ellipsoid of revolution (series order 6, as in GeographicLib).
//!
//! [`Engine`] holds the per-ellipsoid coefficient tables, computed once
//! from `(a, f)`. The solvers take an [`OutMask`] and only evaluate the
//! series groups it names. Quantities the mask did not ask for are left
//! as `NaN` in [`RawOutputs`].

#![allow(non_snake_case)]
#![allow(clippy::excessive_precision)]

mod direct;
pub(crate) mod geomath;

use self::geomath::{CARR_SIZE, SeriesCoefficients, sq};
use crate::{
    defaults::{GEODESIC_ORDER, INVERSE_BISECTION_ITERATIONS, INVERSE_NEWTON_ITERATIONS},
    error::GeodesicError,
    mask::OutMask,
};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// outputs that need the `C2` series
const LENGTHS: OutMask = OutMask::REDUCED_LENGTH.union(OutMask::GEODESIC_SCALE);
/// outputs that need the `C1` series
const ALL_LENGTHS: OutMask = OutMask::DISTANCE.union(LENGTHS);

const COEFF_A3: [f64; 18] = [
    -3.0, 128.0, -2.0, -3.0, 64.0, -1.0, -3.0, -1.0, 16.0, 3.0, -1.0, -2.0, 8.0, 1.0, -1.0, 2.0,
    1.0, 1.0,
];

const COEFF_C3: [f64; 45] = [
    3.0, 128.0, 2.0, 5.0, 128.0, -1.0, 3.0, 3.0, 64.0, -1.0, 0.0, 1.0, 8.0, -1.0, 1.0, 4.0, 5.0,
    256.0, 1.0, 3.0, 128.0, -3.0, -2.0, 3.0, 64.0, 1.0, -3.0, 2.0, 32.0, 7.0, 512.0, -10.0, 9.0,
    384.0, 5.0, -9.0, 5.0, 192.0, 7.0, 512.0, -14.0, 7.0, 512.0, 21.0, 2560.0,
];

const COEFF_C4: [f64; 77] = [
    97.0, 15015.0, 1088.0, 156.0, 45045.0, -224.0, -4784.0, 1573.0, 45045.0, -10656.0, 14144.0,
    -4576.0, -858.0, 45045.0, 64.0, 624.0, -4576.0, 6864.0, -3003.0, 15015.0, 100.0, 208.0, 572.0,
    3432.0, -12012.0, 30030.0, 45045.0, 1.0, 9009.0, -2944.0, 468.0, 135135.0, 5792.0, 1040.0,
    -1287.0, 135135.0, 5952.0, -11648.0, 9152.0, -2574.0, 135135.0, -64.0, -624.0, 4576.0, -6864.0,
    3003.0, 135135.0, 8.0, 10725.0, 1856.0, -936.0, 225225.0, -8448.0, 4992.0, -1144.0, 225225.0,
    -1440.0, 4160.0, -4576.0, 1716.0, 225225.0, -136.0, 63063.0, 1024.0, -208.0, 105105.0, 3584.0,
    -3328.0, 1144.0, 315315.0, -128.0, 135135.0, -2560.0, 832.0, 405405.0, 128.0, 99099.0,
];

const N_C3X: usize = 15;
const N_C4X: usize = 21;

/// `C3` coefficients, indexed `1..GEODESIC_ORDER`
type C3Coefficients = [f64; GEODESIC_ORDER];
/// `C4` coefficients, indexed `0..GEODESIC_ORDER`
type C4Coefficients = [f64; GEODESIC_ORDER];

/// Outputs of one direct or inverse solve.
///
/// Only the fields named by the solve's mask (plus `a12`, and the
/// intrinsic latitude/azimuths) carry a value, everything else is `NaN`.
#[derive(Debug, Clone, Copy)]
pub struct RawOutputs {
    pub lat2: f64,
    pub lon2: f64,
    pub azi1: f64,
    pub azi2: f64,
    pub s12: f64,
    pub a12: f64,
    pub m12: f64,
    pub M12: f64,
    pub M21: f64,
    pub S12: f64,
}

impl RawOutputs {
    const UNSET: Self = Self {
        lat2: f64::NAN,
        lon2: f64::NAN,
        azi1: f64::NAN,
        azi2: f64::NAN,
        s12: f64::NAN,
        a12: f64::NAN,
        m12: f64::NAN,
        M12: f64::NAN,
        M21: f64::NAN,
        S12: f64::NAN,
    };
}

/// Engine-side state of one ellipsoid.
#[derive(Debug, Clone)]
pub struct Engine {
    a: f64,
    f: f64,
    f1: f64,
    e2: f64,
    ep2: f64,
    n: f64,
    b: f64,
    c2: f64,
    etol2: f64,
    a3x: [f64; GEODESIC_ORDER],
    c3x: [f64; N_C3X],
    c4x: [f64; N_C4X],

    maxit1: u64,
    maxit2: u64,

    tiny: f64,
    tol0: f64,
    tol1: f64,
    tolb: f64,
    xthresh: f64,
}

/// sigma and `dn` at both ends of a geodesic segment
#[derive(Debug, Clone, Copy)]
struct Ends {
    ssig1: f64,
    csig1: f64,
    dn1: f64,
    ssig2: f64,
    csig2: f64,
    dn2: f64,
}

#[derive(Debug, Clone, Copy)]
struct Lengths {
    s12b: f64,
    m12b: f64,
    m0: f64,
    M12: f64,
    M21: f64,
}

/// first guess of the inverse solution
#[derive(Debug, Clone, Copy)]
struct InverseStart {
    sig12: f64,
    salp1: f64,
    calp1: f64,
    salp2: f64,
    calp2: f64,
    dnm: f64,
}

/// one evaluation of the longitude difference for a trial `alp1`
#[derive(Debug, Clone, Copy)]
struct Lambda12 {
    lam12: f64,
    salp2: f64,
    calp2: f64,
    sig12: f64,
    ends: Ends,
    eps: f64,
    domg12: f64,
    dlam12: f64,
}

impl Engine {
    /// Compute the coefficient tables for the ellipsoid `(a, f)`.
    ///
    /// `f > 1` is taken as the inverse flattening. Fails if the equatorial
    /// radius or the polar semi-axis is not finite and positive.
    pub fn new(a: f64, f: f64) -> Result<Self, GeodesicError> {
        let f = if f <= 1.0 { f } else { 1.0 / f };

        let f1 = 1.0 - f;
        let b = a * f1;
        if !(a.is_finite() && a > 0.0) {
            return Err(GeodesicError::InvalidMajorRadius { value: a });
        }
        if !(b.is_finite() && b > 0.0) {
            return Err(GeodesicError::InvalidPolarSemiAxis { value: b });
        }

        let maxit1 = INVERSE_NEWTON_ITERATIONS;
        let maxit2 = maxit1 + geomath::DIGITS + INVERSE_BISECTION_ITERATIONS;
        let tiny = f64::MIN_POSITIVE.sqrt();
        let tol0 = f64::EPSILON;
        let tol1 = 200.0 * tol0;
        let tol2 = tol0.sqrt();
        let tolb = tol0 * tol2;
        let xthresh = 1000.0 * tol2;

        let e2 = f * (2.0 - f);
        let ep2 = e2 / sq(f1);
        let n = f / (2.0 - f);
        let c2 = authalic_radius_squared(a, f);
        let etol2 = 0.1 * tol2 / (f.abs().max(0.001) * (1.0 - f / 2.0).min(1.0) / 2.0).sqrt();

        Ok(Self {
            a,
            f,
            f1,
            e2,
            ep2,
            n,
            b,
            c2,
            etol2,
            a3x: a3_coefficients(n),
            c3x: c3_coefficients(n),
            c4x: c4_coefficients(n),

            maxit1,
            maxit2,

            tiny,
            tol0,
            tol1,
            tolb,
            xthresh,
        })
    }

    pub fn major_radius(&self) -> f64 {
        self.a
    }

    pub fn flattening(&self) -> f64 {
        self.f
    }

    fn a3f(&self, eps: f64) -> f64 {
        geomath::polyval(GEODESIC_ORDER - 1, &self.a3x, eps)
    }

    fn c3f(&self, eps: f64, c: &mut C3Coefficients) {
        let mut mult = 1.0;
        let mut o = 0;
        for (l, slot) in c.iter_mut().enumerate().skip(1) {
            let m = GEODESIC_ORDER - l - 1;
            mult *= eps;
            *slot = mult * geomath::polyval(m, &self.c3x[o..], eps);
            o += m + 1;
        }
    }

    fn c4f(&self, eps: f64, c: &mut C4Coefficients) {
        let mut mult = 1.0;
        let mut o = 0;
        for (l, slot) in c.iter_mut().enumerate() {
            let m = GEODESIC_ORDER - l - 1;
            *slot = mult * geomath::polyval(m, &self.c4x[o..], eps);
            o += m + 1;
            mult *= eps;
        }
    }

    /// `eps` of a geodesic with `cos(alp0) = calp0`
    fn eps(&self, calp0: f64) -> (f64, f64) {
        let k2 = sq(calp0) * self.ep2;
        (k2, k2 / (2.0 * (1.0 + (1.0 + k2).sqrt()) + k2))
    }

    /// Distance, reduced length and geodesic scales between the two ends,
    /// on the unit-`b` ellipsoid. Only the lengths in `outmask` are
    /// evaluated; the others are `NaN`.
    #[allow(clippy::too_many_arguments)]
    fn lengths(
        &self,
        eps: f64,
        sig12: f64,
        ends: Ends,
        cbet1: f64,
        cbet2: f64,
        outmask: OutMask,
        c1a: &mut SeriesCoefficients,
        c2a: &mut SeriesCoefficients,
    ) -> Lengths {
        let outmask = outmask.outputs();
        let Ends {
            ssig1,
            csig1,
            dn1,
            ssig2,
            csig2,
            dn2,
        } = ends;
        let mut lengths = Lengths {
            s12b: f64::NAN,
            m12b: f64::NAN,
            m0: f64::NAN,
            M12: f64::NAN,
            M21: f64::NAN,
        };

        let mut A1 = 0.0;
        let mut A2 = 0.0;
        let mut m0x = 0.0;
        let mut J12 = 0.0;

        if outmask.intersects(ALL_LENGTHS) {
            A1 = geomath::a1m1f(eps);
            geomath::c1f(eps, c1a);
            if outmask.intersects(LENGTHS) {
                A2 = geomath::a2m1f(eps);
                geomath::c2f(eps, c2a);
                m0x = A1 - A2;
                A2 += 1.0;
            }
            A1 += 1.0;
        }
        if outmask.intersects(OutMask::DISTANCE) {
            let B1 = geomath::sin_cos_series(true, ssig2, csig2, c1a)
                - geomath::sin_cos_series(true, ssig1, csig1, c1a);
            lengths.s12b = A1 * (sig12 + B1);
            if outmask.intersects(LENGTHS) {
                let B2 = geomath::sin_cos_series(true, ssig2, csig2, c2a)
                    - geomath::sin_cos_series(true, ssig1, csig1, c2a);
                J12 = m0x * sig12 + (A1 * B1 - A2 * B2);
            }
        } else if outmask.intersects(LENGTHS) {
            for l in 1..CARR_SIZE {
                c2a[l] = A1 * c1a[l] - A2 * c2a[l];
            }
            J12 = m0x * sig12
                + (geomath::sin_cos_series(true, ssig2, csig2, c2a)
                    - geomath::sin_cos_series(true, ssig1, csig1, c2a));
        }
        if outmask.intersects(OutMask::REDUCED_LENGTH) {
            lengths.m0 = m0x;
            // the m12b form is accurate for short geodesics as well
            lengths.m12b = dn2 * (csig1 * ssig2) - dn1 * (ssig1 * csig2) - csig1 * csig2 * J12;
        }
        if outmask.intersects(OutMask::GEODESIC_SCALE) {
            let csig12 = csig1 * csig2 + ssig1 * ssig2;
            let t = self.ep2 * (cbet1 - cbet2) * (cbet1 + cbet2) / (dn1 + dn2);
            lengths.M12 = csig12 + (t * ssig2 - csig2 * J12) * ssig1 / dn1;
            lengths.M21 = csig12 - (t * ssig1 - csig1 * J12) * ssig2 / dn2;
        }
        lengths
    }

    #[allow(clippy::too_many_arguments)]
    fn inverse_start(
        &self,
        sbet1: f64,
        cbet1: f64,
        dn1: f64,
        sbet2: f64,
        cbet2: f64,
        dn2: f64,
        lam12: f64,
        slam12: f64,
        clam12: f64,
        c1a: &mut SeriesCoefficients,
        c2a: &mut SeriesCoefficients,
    ) -> InverseStart {
        let mut start = InverseStart {
            sig12: -1.0,
            salp1: f64::NAN,
            calp1: f64::NAN,
            salp2: f64::NAN,
            calp2: f64::NAN,
            dnm: f64::NAN,
        };

        let sbet12 = sbet2 * cbet1 - cbet2 * sbet1;
        let cbet12 = cbet2 * cbet1 + sbet2 * sbet1;
        let sbet12a = sbet2 * cbet1 + cbet2 * sbet1;

        let shortline = cbet12 >= 0.0 && sbet12 < 0.5 && cbet2 * lam12 < 0.5;
        let (mut somg12, mut comg12) = if shortline {
            let mut sbetm2 = sq(sbet1 + sbet2);
            sbetm2 /= sbetm2 + sq(cbet1 + cbet2);
            start.dnm = (1.0 + self.ep2 * sbetm2).sqrt();
            let omg12 = lam12 / (self.f1 * start.dnm);
            omg12.sin_cos()
        } else {
            (slam12, clam12)
        };

        let mut salp1 = cbet2 * somg12;
        let mut calp1 = if comg12 >= 0.0 {
            sbet12 + cbet2 * sbet1 * sq(somg12) / (1.0 + comg12)
        } else {
            sbet12a - cbet2 * sbet1 * sq(somg12) / (1.0 - comg12)
        };

        let ssig12 = salp1.hypot(calp1);
        let csig12 = sbet1 * sbet2 + cbet1 * cbet2 * comg12;

        if shortline && ssig12 < self.etol2 {
            // really short lines
            let mut salp2 = cbet1 * somg12;
            let mut calp2 = sbet12
                - cbet1
                    * sbet2
                    * (if comg12 >= 0.0 {
                        sq(somg12) / (1.0 + comg12)
                    } else {
                        1.0 - comg12
                    });
            geomath::norm(&mut salp2, &mut calp2);
            start.salp2 = salp2;
            start.calp2 = calp2;
            start.sig12 = ssig12.atan2(csig12);
        } else if self.n.abs() > 0.1
            || csig12 >= 0.0
            || ssig12 >= 6.0 * self.n.abs() * PI * sq(cbet1)
        {
            // nothing to do, zeroth order spherical approximation is fine
        } else {
            // nearly antipodal: scale to the astroid problem
            let x: f64;
            let y: f64;
            let betscale: f64;
            let lamscale: f64;
            let lam12x = (-slam12).atan2(-clam12);
            if self.f >= 0.0 {
                let (_, eps) = self.eps(sbet1);
                lamscale = self.f * cbet1 * self.a3f(eps) * PI;
                betscale = lamscale * cbet1;
                x = lam12x / lamscale;
                y = sbet12a / betscale;
            } else {
                let cbet12a = cbet2 * cbet1 - sbet2 * sbet1;
                let bet12a = sbet12a.atan2(cbet12a);
                let ends = Ends {
                    ssig1: sbet1,
                    csig1: -cbet1,
                    dn1,
                    ssig2: sbet2,
                    csig2: cbet2,
                    dn2,
                };
                let lengths = self.lengths(
                    self.n,
                    PI + bet12a,
                    ends,
                    cbet1,
                    cbet2,
                    OutMask::REDUCED_LENGTH,
                    c1a,
                    c2a,
                );
                x = -1.0 + lengths.m12b / (cbet1 * cbet2 * lengths.m0 * PI);
                betscale = if x < -0.01 {
                    sbet12a / x
                } else {
                    -self.f * sq(cbet1) * PI
                };
                lamscale = betscale / cbet1;
                y = lam12x / lamscale;
            }

            if y > -self.tol1 && x > -1.0 - self.xthresh {
                if self.f >= 0.0 {
                    salp1 = (-x).min(1.0);
                    calp1 = -(1.0 - sq(salp1)).sqrt();
                } else {
                    calp1 = x.max(if x > -self.tol1 { 0.0 } else { -1.0 });
                    salp1 = (1.0 - sq(calp1)).sqrt();
                }
            } else {
                let k = geomath::astroid(x, y);
                let omg12a = lamscale
                    * if self.f >= 0.0 {
                        -x * k / (1.0 + k)
                    } else {
                        -y * (1.0 + k) / k
                    };
                somg12 = omg12a.sin();
                comg12 = -omg12a.cos();
                salp1 = cbet2 * somg12;
                calp1 = sbet12a - cbet2 * sbet1 * sq(somg12) / (1.0 - comg12);
            }
        }

        if salp1 > 0.0 || salp1.is_nan() {
            geomath::norm(&mut salp1, &mut calp1);
        } else {
            salp1 = 1.0;
            calp1 = 0.0;
        }
        start.salp1 = salp1;
        start.calp1 = calp1;
        start
    }

    #[allow(clippy::too_many_arguments)]
    fn lambda12(
        &self,
        sbet1: f64,
        cbet1: f64,
        dn1: f64,
        sbet2: f64,
        cbet2: f64,
        dn2: f64,
        salp1: f64,
        mut calp1: f64,
        slam120: f64,
        clam120: f64,
        diffp: bool,
        c1a: &mut SeriesCoefficients,
        c2a: &mut SeriesCoefficients,
        c3a: &mut C3Coefficients,
    ) -> Lambda12 {
        if sbet1 == 0.0 && calp1 == 0.0 {
            // break degeneracy of equatorial line
            calp1 = -self.tiny;
        }
        let salp0 = salp1 * cbet1;
        let calp0 = calp1.hypot(salp1 * sbet1);

        let mut ssig1 = sbet1;
        let somg1 = salp0 * sbet1;
        let mut csig1 = calp1 * cbet1;
        let comg1 = calp1 * cbet1;
        geomath::norm(&mut ssig1, &mut csig1);

        let salp2 = if cbet2 != cbet1 { salp0 / cbet2 } else { salp1 };
        let calp2 = if cbet2 != cbet1 || sbet2.abs() != -sbet1 {
            (sq(calp1 * cbet1)
                + if cbet1 < -sbet1 {
                    (cbet2 - cbet1) * (cbet1 + cbet2)
                } else {
                    (sbet1 - sbet2) * (sbet1 + sbet2)
                })
            .sqrt()
                / cbet2
        } else {
            calp1.abs()
        };
        let mut ssig2 = sbet2;
        let somg2 = salp0 * sbet2;
        let mut csig2 = calp2 * cbet2;
        let comg2 = calp2 * cbet2;
        geomath::norm(&mut ssig2, &mut csig2);

        let sig12 = ((csig1 * ssig2 - ssig1 * csig2).max(0.0)).atan2(csig1 * csig2 + ssig1 * ssig2);
        let somg12 = (comg1 * somg2 - somg1 * comg2).max(0.0);
        let comg12 = comg1 * comg2 + somg1 * somg2;
        let eta = (somg12 * clam120 - comg12 * slam120).atan2(comg12 * clam120 + somg12 * slam120);

        let (_, eps) = self.eps(calp0);
        self.c3f(eps, c3a);
        let B312 = geomath::sin_cos_series(true, ssig2, csig2, c3a)
            - geomath::sin_cos_series(true, ssig1, csig1, c3a);
        let domg12 = -self.f * self.a3f(eps) * salp0 * (sig12 + B312);
        let lam12 = eta + domg12;

        let ends = Ends {
            ssig1,
            csig1,
            dn1,
            ssig2,
            csig2,
            dn2,
        };

        let dlam12 = if !diffp {
            f64::NAN
        } else if calp2 == 0.0 {
            -2.0 * self.f1 * dn1 / sbet1
        } else {
            let lengths = self.lengths(
                eps,
                sig12,
                ends,
                cbet1,
                cbet2,
                OutMask::REDUCED_LENGTH,
                c1a,
                c2a,
            );
            lengths.m12b * self.f1 / (calp2 * cbet2)
        };

        Lambda12 {
            lam12,
            salp2,
            calp2,
            sig12,
            ends,
            eps,
            domg12,
            dlam12,
        }
    }

    /// Solve the inverse problem between `(lat1, lon1)` and `(lat2, lon2)`.
    ///
    /// `a12`, `azi1` and `azi2` are always computed.
    pub fn gen_inverse(
        &self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
        outmask: OutMask,
    ) -> Result<RawOutputs, GeodesicError> {
        let outmask = outmask.outputs();
        let mut out = RawOutputs::UNSET;
        let mut lat1 = lat1;
        let mut lat2 = lat2;
        let mut M12 = f64::NAN;
        let mut M21 = f64::NAN;

        // make longitude difference positive
        let (mut lon12, mut lon12s) = geomath::ang_diff(lon1, lon2);
        let mut lonsign = if lon12 >= 0.0 { 1.0 } else { -1.0 };
        lon12 = lonsign * geomath::ang_round(lon12);
        lon12s = geomath::ang_round((180.0 - lon12) - lonsign * lon12s);
        let lam12 = lon12.to_radians();
        let (slam12, clam12) = if lon12 > 90.0 {
            let (s, c) = geomath::sincosd(lon12s);
            (s, -c)
        } else {
            geomath::sincosd(lon12)
        };

        lat1 = geomath::ang_round(geomath::lat_fix(lat1));
        lat2 = geomath::ang_round(geomath::lat_fix(lat2));

        // swap points so that |lat1| >= |lat2|, then make lat1 <= 0
        let swapp = if lat1.abs() < lat2.abs() { -1.0 } else { 1.0 };
        if swapp < 0.0 {
            lonsign *= -1.0;
            std::mem::swap(&mut lat2, &mut lat1);
        }
        let latsign = if lat1 < 0.0 { 1.0 } else { -1.0 };
        lat1 *= latsign;
        lat2 *= latsign;

        let (mut sbet1, mut cbet1) = geomath::sincosd(lat1);
        sbet1 *= self.f1;
        geomath::norm(&mut sbet1, &mut cbet1);
        cbet1 = cbet1.max(self.tiny);

        let (mut sbet2, mut cbet2) = geomath::sincosd(lat2);
        sbet2 *= self.f1;
        geomath::norm(&mut sbet2, &mut cbet2);
        cbet2 = cbet2.max(self.tiny);

        if cbet1 < -sbet1 {
            if cbet2 == cbet1 {
                sbet2 = if sbet2 < 0.0 { sbet1 } else { -sbet1 };
            }
        } else if sbet2.abs() == -sbet1 {
            cbet2 = cbet1;
        }

        let dn1 = (1.0 + self.ep2 * sq(sbet1)).sqrt();
        let dn2 = (1.0 + self.ep2 * sq(sbet2)).sqrt();

        let mut c1a: SeriesCoefficients = [0.0; CARR_SIZE];
        let mut c2a: SeriesCoefficients = [0.0; CARR_SIZE];
        let mut c3a: C3Coefficients = [0.0; GEODESIC_ORDER];

        let mut meridian = lat1 == -90.0 || slam12 == 0.0;
        let mut calp1 = 0.0;
        let mut salp1 = 0.0;
        let mut calp2 = 0.0;
        let mut salp2 = 0.0;
        let mut ssig1 = 0.0;
        let mut csig1 = 0.0;
        let mut ssig2 = 0.0;
        let mut csig2 = 0.0;
        let mut sig12: f64;
        let mut s12x = 0.0;
        let mut m12x = 0.0;
        let mut a12 = f64::NAN;

        if meridian {
            calp1 = clam12;
            salp1 = slam12;
            calp2 = 1.0;
            salp2 = 0.0;

            ssig1 = sbet1;
            csig1 = calp1 * cbet1;
            ssig2 = sbet2;
            csig2 = calp2 * cbet2;

            sig12 = ((csig1 * ssig2 - ssig1 * csig2).max(0.0)).atan2(csig1 * csig2 + ssig1 * ssig2);
            let ends = Ends {
                ssig1,
                csig1,
                dn1,
                ssig2,
                csig2,
                dn2,
            };
            let lengths = self.lengths(
                self.n,
                sig12,
                ends,
                cbet1,
                cbet2,
                outmask | OutMask::DISTANCE | OutMask::REDUCED_LENGTH,
                &mut c1a,
                &mut c2a,
            );
            s12x = lengths.s12b;
            m12x = lengths.m12b;
            M12 = lengths.M12;
            M21 = lengths.M21;

            if sig12 < 1.0 || m12x >= 0.0 {
                if sig12 < 3.0 * self.tiny {
                    sig12 = 0.0;
                    m12x = 0.0;
                    s12x = 0.0;
                }
                m12x *= self.b;
                s12x *= self.b;
                a12 = sig12.to_degrees();
            } else {
                // m12 < 0, prolate and too close to the anti-podal point
                meridian = false;
            }
        }

        let mut somg12 = 2.0;
        let mut comg12 = 0.0;
        let mut omg12 = 0.0;
        if !meridian && sbet1 == 0.0 && (self.f <= 0.0 || lon12s >= self.f * 180.0) {
            // geodesic runs along the equator
            calp1 = 0.0;
            calp2 = 0.0;
            salp1 = 1.0;
            salp2 = 1.0;

            s12x = self.a * lam12;
            sig12 = lam12 / self.f1;
            omg12 = lam12 / self.f1;
            m12x = self.b * sig12.sin();
            if outmask.intersects(OutMask::GEODESIC_SCALE) {
                M12 = sig12.cos();
                M21 = sig12.cos();
            }
            a12 = lon12 / self.f1;
        } else if !meridian {
            let start = self.inverse_start(
                sbet1, cbet1, dn1, sbet2, cbet2, dn2, lam12, slam12, clam12, &mut c1a, &mut c2a,
            );
            sig12 = start.sig12;
            salp1 = start.salp1;
            calp1 = start.calp1;
            salp2 = start.salp2;
            calp2 = start.calp2;

            if sig12 >= 0.0 {
                // short lines, start already has the answer
                let dnm = start.dnm;
                s12x = sig12 * self.b * dnm;
                m12x = sq(dnm) * self.b * (sig12 / dnm).sin();
                if outmask.intersects(OutMask::GEODESIC_SCALE) {
                    M12 = (sig12 / dnm).cos();
                    M21 = (sig12 / dnm).cos();
                }
                a12 = sig12.to_degrees();
                omg12 = lam12 / (self.f1 * dnm);
            } else {
                // Newton's method on alp1, falling back to bisection
                let mut tripn = false;
                let mut tripb = false;
                let mut settled = false;
                let mut salp1a = self.tiny;
                let mut calp1a = 1.0;
                let mut salp1b = self.tiny;
                let mut calp1b = -1.0;
                let mut domg12 = 0.0;
                let mut eps = 0.0;
                for numit in 0..self.maxit2 {
                    let lambda = self.lambda12(
                        sbet1,
                        cbet1,
                        dn1,
                        sbet2,
                        cbet2,
                        dn2,
                        salp1,
                        calp1,
                        slam12,
                        clam12,
                        numit < self.maxit1,
                        &mut c1a,
                        &mut c2a,
                        &mut c3a,
                    );
                    let v = lambda.lam12;
                    let dv = lambda.dlam12;
                    salp2 = lambda.salp2;
                    calp2 = lambda.calp2;
                    sig12 = lambda.sig12;
                    ssig1 = lambda.ends.ssig1;
                    csig1 = lambda.ends.csig1;
                    ssig2 = lambda.ends.ssig2;
                    csig2 = lambda.ends.csig2;
                    eps = lambda.eps;
                    domg12 = lambda.domg12;

                    if tripb
                        || v.abs() < if tripn { 8.0 } else { 1.0 } * self.tol0
                        || v.abs().is_nan()
                    {
                        settled = true;
                        break;
                    }
                    // update the bracket [alp1a, alp1b]
                    if v > 0.0 && (numit > self.maxit1 || calp1 / salp1 > calp1b / salp1b) {
                        salp1b = salp1;
                        calp1b = calp1;
                    } else if v < 0.0 && (numit > self.maxit1 || calp1 / salp1 < calp1a / salp1a) {
                        salp1a = salp1;
                        calp1a = calp1;
                    }
                    if numit < self.maxit1 && dv > 0.0 {
                        let dalp1 = -v / dv;
                        let (sdalp1, cdalp1) = dalp1.sin_cos();
                        let nsalp1 = salp1 * cdalp1 + calp1 * sdalp1;
                        if nsalp1 > 0.0 && dalp1.abs() < PI {
                            calp1 = calp1 * cdalp1 - salp1 * sdalp1;
                            salp1 = nsalp1;
                            geomath::norm(&mut salp1, &mut calp1);
                            tripn = v.abs() <= 16.0 * self.tol0;
                            continue;
                        }
                    }

                    salp1 = (salp1a + salp1b) / 2.0;
                    calp1 = (calp1a + calp1b) / 2.0;
                    geomath::norm(&mut salp1, &mut calp1);
                    tripn = false;
                    tripb = (salp1a - salp1).abs() + (calp1a - calp1) < self.tolb
                        || (salp1 - salp1b).abs() + (calp1 - calp1b) < self.tolb;
                }
                if !settled {
                    log::warn!(
                        "inverse solution did not settle after {} iterations (lon1={lon1}, lon2={lon2})",
                        self.maxit2
                    );
                    return Err(GeodesicError::NonConvergent {
                        iterations: self.maxit2,
                    });
                }

                let lengthmask = if outmask.intersects(LENGTHS) {
                    outmask | OutMask::DISTANCE
                } else {
                    outmask
                };
                let ends = Ends {
                    ssig1,
                    csig1,
                    dn1,
                    ssig2,
                    csig2,
                    dn2,
                };
                let lengths = self.lengths(
                    eps, sig12, ends, cbet1, cbet2, lengthmask, &mut c1a, &mut c2a,
                );
                s12x = lengths.s12b * self.b;
                m12x = lengths.m12b * self.b;
                M12 = lengths.M12;
                M21 = lengths.M21;
                a12 = sig12.to_degrees();

                if outmask.intersects(OutMask::AREA) {
                    let (sdomg12, cdomg12) = domg12.sin_cos();
                    somg12 = slam12 * cdomg12 - clam12 * sdomg12;
                    comg12 = clam12 * cdomg12 + slam12 * sdomg12;
                }
            }
        }

        if outmask.intersects(OutMask::DISTANCE) {
            out.s12 = 0.0 + s12x;
        }
        if outmask.intersects(OutMask::REDUCED_LENGTH) {
            out.m12 = 0.0 + m12x;
        }
        if outmask.intersects(OutMask::AREA) {
            out.S12 = self.inverse_area(
                AreaInputs {
                    sbet1,
                    cbet1,
                    sbet2,
                    cbet2,
                    salp1,
                    calp1,
                    salp2,
                    calp2,
                },
                meridian,
                somg12,
                comg12,
                omg12,
            ) * (swapp * lonsign * latsign)
                + 0.0;
        }

        if swapp < 0.0 {
            std::mem::swap(&mut salp2, &mut salp1);
            std::mem::swap(&mut calp2, &mut calp1);
            std::mem::swap(&mut M21, &mut M12);
        }
        salp1 *= swapp * lonsign;
        calp1 *= swapp * latsign;
        salp2 *= swapp * lonsign;
        calp2 *= swapp * latsign;

        if outmask.intersects(OutMask::GEODESIC_SCALE) {
            out.M12 = M12;
            out.M21 = M21;
        }
        out.a12 = a12;
        out.azi1 = geomath::atan2d(salp1, calp1);
        out.azi2 = geomath::atan2d(salp2, calp2);
        Ok(out)
    }

    /// Area between the inverse geodesic and the equator, before the sign
    /// of the canonical orientation is restored.
    fn inverse_area(
        &self,
        p: AreaInputs,
        meridian: bool,
        mut somg12: f64,
        mut comg12: f64,
        omg12: f64,
    ) -> f64 {
        let AreaInputs {
            sbet1,
            cbet1,
            sbet2,
            cbet2,
            salp1,
            calp1,
            salp2,
            calp2,
        } = p;

        let salp0 = salp1 * cbet1;
        let calp0 = calp1.hypot(salp1 * sbet1);
        let mut S12 = if calp0 != 0.0 && salp0 != 0.0 {
            let mut ssig1 = sbet1;
            let mut csig1 = calp1 * cbet1;
            let mut ssig2 = sbet2;
            let mut csig2 = calp2 * cbet2;
            let (_, eps) = self.eps(calp0);
            let A4 = sq(self.a) * calp0 * salp0 * self.e2;
            geomath::norm(&mut ssig1, &mut csig1);
            geomath::norm(&mut ssig2, &mut csig2);
            let mut c4a: C4Coefficients = [0.0; GEODESIC_ORDER];
            self.c4f(eps, &mut c4a);
            let B41 = geomath::sin_cos_series(false, ssig1, csig1, &c4a);
            let B42 = geomath::sin_cos_series(false, ssig2, csig2, &c4a);
            A4 * (B42 - B41)
        } else {
            // avoid problems with indeterminate sig1, sig2 on equator
            0.0
        };

        if !meridian && somg12 > 1.0 {
            (somg12, comg12) = omg12.sin_cos();
        }

        let alp12 = if !meridian && comg12 > -FRAC_1_SQRT_2 && sbet2 - sbet1 < 1.75 {
            // use tan(Gamma/2) = tan(omg12/2) * (tan(bet1/2)+tan(bet2/2))/(1+tan(bet1/2)*tan(bet2/2))
            let domg12 = 1.0 + comg12;
            let dbet1 = 1.0 + cbet1;
            let dbet2 = 1.0 + cbet2;
            2.0 * (somg12 * (sbet1 * dbet2 + sbet2 * dbet1))
                .atan2(domg12 * (sbet1 * sbet2 + dbet1 * dbet2))
        } else {
            // alp12 = alp2 - alp1, used in atan2 so no need to normalize
            let mut salp12 = salp2 * calp1 - calp2 * salp1;
            let mut calp12 = calp2 * calp1 + salp2 * salp1;
            if salp12 == 0.0 && calp12 < 0.0 {
                salp12 = self.tiny * calp1;
                calp12 = -1.0;
            }
            salp12.atan2(calp12)
        };
        S12 += self.c2 * alp12;
        S12
    }
}

/// reduced latitudes and azimuths at both ends, in canonical orientation
#[derive(Debug, Clone, Copy)]
struct AreaInputs {
    sbet1: f64,
    cbet1: f64,
    sbet2: f64,
    cbet2: f64,
    salp1: f64,
    calp1: f64,
    salp2: f64,
    calp2: f64,
}

/// `c²`, the squared radius of the sphere with the area of the ellipsoid
/// `(a, f)`
fn authalic_radius_squared(a: f64, f: f64) -> f64 {
    let b = a * (1.0 - f);
    let e2 = f * (2.0 - f);
    let ratio = if e2 == 0.0 {
        1.0
    } else {
        geomath::eatanhe(1.0, f.signum() * e2.abs().sqrt()) / e2
    };
    (sq(a) + sq(b) * ratio) / 2.0
}

/// Total area of the ellipsoid `(a, f)`, `4πc²`, in square meters.
pub fn ellipsoid_area(a: f64, f: f64) -> f64 {
    4.0 * PI * authalic_radius_squared(a, f)
}

fn a3_coefficients(n: f64) -> [f64; GEODESIC_ORDER] {
    let mut a3x = [0.0; GEODESIC_ORDER];
    let mut o = 0;
    for (k, j) in (0..GEODESIC_ORDER).rev().enumerate() {
        let m = j.min(GEODESIC_ORDER - j - 1);
        a3x[k] = geomath::polyval(m, &COEFF_A3[o..], n) / COEFF_A3[o + m + 1];
        o += m + 2;
    }
    a3x
}

fn c3_coefficients(n: f64) -> [f64; N_C3X] {
    let mut c3x = [0.0; N_C3X];
    let mut o = 0;
    let mut k = 0;
    for l in 1..GEODESIC_ORDER {
        for j in (l..GEODESIC_ORDER).rev() {
            let m = j.min(GEODESIC_ORDER - j - 1);
            c3x[k] = geomath::polyval(m, &COEFF_C3[o..], n) / COEFF_C3[o + m + 1];
            k += 1;
            o += m + 2;
        }
    }
    c3x
}

fn c4_coefficients(n: f64) -> [f64; N_C4X] {
    let mut c4x = [0.0; N_C4X];
    let mut o = 0;
    let mut k = 0;
    for l in 0..GEODESIC_ORDER {
        for j in (l..GEODESIC_ORDER).rev() {
            let m = GEODESIC_ORDER - j - 1;
            c4x[k] = geomath::polyval(m, &COEFF_C4[o..], n) / COEFF_C4[o + m + 1];
            k += 1;
            o += m + 2;
        }
    }
    c4x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{WGS84_FLATTENING, WGS84_MAJOR_RADIUS};

    fn wgs84() -> Engine {
        Engine::new(WGS84_MAJOR_RADIUS, WGS84_FLATTENING).unwrap()
    }

    #[test]
    fn rejects_degenerate_ellipsoids() {
        assert_eq!(
            Engine::new(0.0, 0.0).unwrap_err(),
            GeodesicError::InvalidMajorRadius { value: 0.0 }
        );
        assert!(matches!(
            Engine::new(f64::NAN, 0.0).unwrap_err(),
            GeodesicError::InvalidMajorRadius { .. }
        ));
        assert_eq!(
            Engine::new(1.0, 1.0).unwrap_err(),
            GeodesicError::InvalidPolarSemiAxis { value: 0.0 }
        );
    }

    #[test]
    fn inverse_flattening_is_accepted() {
        let engine = Engine::new(WGS84_MAJOR_RADIUS, 298.257223563).unwrap();
        assert_eq!(engine.flattening(), 1.0 / 298.257223563);
    }

    #[test]
    fn equatorial_distance() {
        let out = wgs84()
            .gen_inverse(0.0, 0.0, 0.0, 1.0, OutMask::DISTANCE)
            .unwrap();
        assert!((out.s12 - WGS84_MAJOR_RADIUS * PI / 180.0).abs() < 1e-8);
        assert_eq!(out.azi1, 90.0);
        assert_eq!(out.azi2, 90.0);
    }

    #[test]
    fn meridian_quadrant() {
        let out = wgs84()
            .gen_inverse(0.0, 0.0, 90.0, 0.0, OutMask::DISTANCE)
            .unwrap();
        assert!((out.s12 - 10_001_965.729).abs() < 1e-3);
        assert_eq!(out.azi1, 0.0);
    }

    #[test]
    fn karney_inverse_handles_antipodal_points() {
        let out = wgs84()
            .gen_inverse(0.0, 0.0, 0.0, 180.0, OutMask::DISTANCE)
            .unwrap();
        assert!((out.s12 - 20_003_931.0).abs() < 1.0);
    }

    #[test]
    fn unrequested_outputs_are_unset() {
        let out = wgs84()
            .gen_inverse(10.0, 20.0, 30.0, 40.0, OutMask::DISTANCE)
            .unwrap();
        assert!(out.s12.is_finite());
        assert!(out.a12.is_finite());
        assert!(out.m12.is_nan());
        assert!(out.M12.is_nan());
        assert!(out.S12.is_nan());
        assert!(out.lat2.is_nan());
    }

    #[test]
    fn coincident_points() {
        let out = wgs84()
            .gen_inverse(45.0, 7.0, 45.0, 7.0, OutMask::ALL)
            .unwrap();
        assert_eq!(out.s12, 0.0);
        assert_eq!(out.a12, 0.0);
        assert_eq!(out.m12, 0.0);
        assert!((out.M12 - 1.0).abs() < 1e-15);
        assert!(out.S12.is_finite());
    }

    #[test]
    fn sphere_area() {
        assert_eq!(ellipsoid_area(1.0, 0.0), 4.0 * PI);
    }

    #[test]
    fn wgs84_area() {
        let area = ellipsoid_area(WGS84_MAJOR_RADIUS, WGS84_FLATTENING);
        assert!((area / 5.100656217240886e14 - 1.0).abs() < 1e-9, "{area}");
    }

    #[test]
    fn prolate_area_is_finite() {
        let area = ellipsoid_area(1.0, -0.5);
        // a = 1, b = 1.5
        assert!(area > 4.0 * PI && area < 4.0 * PI * 1.5 * 1.5, "{area}");
    }
}
