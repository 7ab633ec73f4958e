//! Direct problem: from a start point, an azimuth and a distance (or arc
//! length), find the end point.
//!
//! The solve is split the way GeographicLib splits it: [`LineStart`] holds
//! the quantities of the geodesic through the start point, computed once,
//! and [`LineStart::position`] walks a given distance along it.

use super::{
    ALL_LENGTHS, C3Coefficients, C4Coefficients, Engine, LENGTHS, RawOutputs,
    geomath::{self, CARR_SIZE, SeriesCoefficients, sq},
};
use crate::{
    defaults::GEODESIC_ORDER,
    mask::{OutMask, SeriesGroup},
};

/// The geodesic through `(lat1, lon1)` with azimuth `azi1`, expressed on
/// the auxiliary sphere.
#[derive(Debug, Clone)]
struct LineStart {
    caps: OutMask,

    b: f64,
    c2: f64,
    f: f64,
    f1: f64,
    tiny: f64,

    lon1: f64,
    azi1: f64,
    salp1: f64,
    calp1: f64,
    salp0: f64,
    calp0: f64,
    ssig1: f64,
    csig1: f64,
    somg1: f64,
    comg1: f64,
    dn1: f64,
    k2: f64,

    A1m1: f64,
    A2m1: f64,
    A3c: f64,
    A4: f64,
    B11: f64,
    B21: f64,
    B31: f64,
    B41: f64,
    stau1: f64,
    ctau1: f64,

    c1a: SeriesCoefficients,
    c1pa: SeriesCoefficients,
    c2a: SeriesCoefficients,
    c3a: C3Coefficients,
    c4a: C4Coefficients,
}

impl LineStart {
    fn new(engine: &Engine, lat1: f64, lon1: f64, azi1: f64, caps: OutMask) -> Self {
        let azi1 = geomath::ang_normalize(azi1);
        let (salp1, calp1) = geomath::sincosd(geomath::ang_round(azi1));

        let (mut sbet1, mut cbet1) =
            geomath::sincosd(geomath::ang_round(geomath::lat_fix(lat1)));
        sbet1 *= engine.f1;
        geomath::norm(&mut sbet1, &mut cbet1);
        cbet1 = cbet1.max(engine.tiny);
        let dn1 = (1.0 + engine.ep2 * sq(sbet1)).sqrt();

        // alp0 is the azimuth at the equator crossing
        let salp0 = salp1 * cbet1;
        let calp0 = calp1.hypot(salp1 * sbet1);

        let mut ssig1 = sbet1;
        let somg1 = salp0 * sbet1;
        let mut csig1 = if sbet1 != 0.0 || calp1 != 0.0 {
            cbet1 * calp1
        } else {
            1.0
        };
        let comg1 = csig1;
        geomath::norm(&mut ssig1, &mut csig1);

        let (k2, eps) = engine.eps(calp0);

        let mut line = Self {
            caps,
            b: engine.b,
            c2: engine.c2,
            f: engine.f,
            f1: engine.f1,
            tiny: engine.tiny,
            lon1,
            azi1,
            salp1,
            calp1,
            salp0,
            calp0,
            ssig1,
            csig1,
            somg1,
            comg1,
            dn1,
            k2,
            A1m1: 0.0,
            A2m1: 0.0,
            A3c: 0.0,
            A4: 0.0,
            B11: 0.0,
            B21: 0.0,
            B31: 0.0,
            B41: 0.0,
            stau1: 0.0,
            ctau1: 0.0,
            c1a: [0.0; CARR_SIZE],
            c1pa: [0.0; CARR_SIZE],
            c2a: [0.0; CARR_SIZE],
            c3a: [0.0; GEODESIC_ORDER],
            c4a: [0.0; GEODESIC_ORDER],
        };

        if caps.needs(SeriesGroup::C1) {
            line.A1m1 = geomath::a1m1f(eps);
            geomath::c1f(eps, &mut line.c1a);
            line.B11 = geomath::sin_cos_series(true, ssig1, csig1, &line.c1a);
            let (s, c) = line.B11.sin_cos();
            // tau1 = sig1 + B11
            line.stau1 = ssig1 * c + csig1 * s;
            line.ctau1 = csig1 * c - ssig1 * s;
        }
        if caps.needs(SeriesGroup::C1p) {
            geomath::c1pf(eps, &mut line.c1pa);
        }
        if caps.needs(SeriesGroup::C2) {
            line.A2m1 = geomath::a2m1f(eps);
            geomath::c2f(eps, &mut line.c2a);
            line.B21 = geomath::sin_cos_series(true, ssig1, csig1, &line.c2a);
        }
        if caps.needs(SeriesGroup::C3) {
            engine.c3f(eps, &mut line.c3a);
            line.A3c = -engine.f * salp0 * engine.a3f(eps);
            line.B31 = geomath::sin_cos_series(true, ssig1, csig1, &line.c3a);
        }
        if caps.needs(SeriesGroup::C4) {
            engine.c4f(eps, &mut line.c4a);
            line.A4 = sq(engine.a) * calp0 * salp0 * engine.e2;
            line.B41 = geomath::sin_cos_series(false, ssig1, csig1, &line.c4a);
        }
        line
    }

    /// Walk `s12_a12` along the line: meters, or degrees of arc with
    /// `arcmode`.
    fn position(&self, arcmode: bool, s12_a12: f64) -> RawOutputs {
        let outmask = self.caps.outputs();
        let mut out = RawOutputs::UNSET;

        let mut B12 = 0.0;
        let mut AB1 = 0.0;
        let (sig12, ssig12, csig12) = if arcmode {
            let (ssig12, csig12) = geomath::sincosd(s12_a12);
            (s12_a12.to_radians(), ssig12, csig12)
        } else {
            let tau12 = s12_a12 / (self.b * (1.0 + self.A1m1));
            let (s, c) = tau12.sin_cos();
            B12 = -geomath::sin_cos_series(
                true,
                self.stau1 * c + self.ctau1 * s,
                self.ctau1 * c - self.stau1 * s,
                &self.c1pa,
            );
            let mut sig = tau12 - (B12 - self.B11);
            let (mut ssig, mut csig) = sig.sin_cos();
            if self.f.abs() > 0.01 {
                // the reverted series is inaccurate for large f, take one
                // Newton step on the distance
                let ssig2 = self.ssig1 * csig + self.csig1 * ssig;
                let csig2 = self.csig1 * csig - self.ssig1 * ssig;
                B12 = geomath::sin_cos_series(true, ssig2, csig2, &self.c1a);
                let serr = (1.0 + self.A1m1) * (sig + (B12 - self.B11)) - s12_a12 / self.b;
                sig -= serr / (1.0 + self.k2 * sq(ssig2)).sqrt();
                (ssig, csig) = sig.sin_cos();
            }
            (sig, ssig, csig)
        };

        // sig2 = sig1 + sig12
        let ssig2 = self.ssig1 * csig12 + self.csig1 * ssig12;
        let mut csig2 = self.csig1 * csig12 - self.ssig1 * ssig12;
        let dn2 = (1.0 + self.k2 * sq(ssig2)).sqrt();
        if outmask.intersects(ALL_LENGTHS) {
            if arcmode || self.f.abs() > 0.01 {
                B12 = geomath::sin_cos_series(true, ssig2, csig2, &self.c1a);
            }
            AB1 = (1.0 + self.A1m1) * (B12 - self.B11);
        }

        let sbet2 = self.calp0 * ssig2;
        let mut cbet2 = self.salp0.hypot(self.calp0 * csig2);
        if cbet2 == 0.0 {
            // the geodesic ends at a pole
            cbet2 = self.tiny;
            csig2 = self.tiny;
        }
        let salp2 = self.salp0;
        let calp2 = self.calp0 * csig2;

        if outmask.intersects(OutMask::DISTANCE) {
            out.s12 = if arcmode {
                self.b * ((1.0 + self.A1m1) * sig12 + AB1)
            } else {
                s12_a12
            };
        } else if !arcmode {
            out.s12 = s12_a12;
        }

        if outmask.intersects(OutMask::LONGITUDE) {
            let somg2 = self.salp0 * ssig2;
            let comg2 = csig2;
            let omg12 = (somg2 * self.comg1 - comg2 * self.somg1)
                .atan2(comg2 * self.comg1 + somg2 * self.somg1);
            let lam12 = omg12
                + self.A3c
                    * (sig12
                        + (geomath::sin_cos_series(true, ssig2, csig2, &self.c3a) - self.B31));
            let lon12 = lam12.to_degrees();
            out.lon2 = geomath::ang_normalize(
                geomath::ang_normalize(self.lon1) + geomath::ang_normalize(lon12),
            );
        }

        out.lat2 = geomath::atan2d(sbet2, self.f1 * cbet2);
        out.azi1 = self.azi1;
        out.azi2 = geomath::atan2d(salp2, calp2);

        if outmask.intersects(LENGTHS) {
            let B22 = geomath::sin_cos_series(true, ssig2, csig2, &self.c2a);
            let AB2 = (1.0 + self.A2m1) * (B22 - self.B21);
            let J12 = (self.A1m1 - self.A2m1) * sig12 + (AB1 - AB2);
            if outmask.intersects(OutMask::REDUCED_LENGTH) {
                out.m12 = self.b
                    * ((dn2 * (self.csig1 * ssig2) - self.dn1 * (self.ssig1 * csig2))
                        - self.csig1 * csig2 * J12);
            }
            if outmask.intersects(OutMask::GEODESIC_SCALE) {
                let t =
                    self.k2 * (ssig2 - self.ssig1) * (ssig2 + self.ssig1) / (self.dn1 + dn2);
                out.M12 = csig12 + (t * ssig2 - csig2 * J12) * self.ssig1 / self.dn1;
                out.M21 = csig12 - (t * self.ssig1 - self.csig1 * J12) * ssig2 / dn2;
            }
        }

        if outmask.intersects(OutMask::AREA) {
            let B42 = geomath::sin_cos_series(false, ssig2, csig2, &self.c4a);
            let (salp12, calp12) = if self.calp0 == 0.0 || self.salp0 == 0.0 {
                // alp12 = alp2 - alp1
                (
                    salp2 * self.calp1 - calp2 * self.salp1,
                    calp2 * self.calp1 + salp2 * self.salp1,
                )
            } else {
                // tan(alp12) written to avoid cancellation near the equator
                let salp12 = self.calp0
                    * self.salp0
                    * if csig12 <= 0.0 {
                        self.csig1 * (1.0 - csig12) + ssig12 * self.ssig1
                    } else {
                        ssig12 * (self.csig1 * ssig12 / (1.0 + csig12) + self.ssig1)
                    };
                let calp12 = sq(self.salp0) + sq(self.calp0) * self.csig1 * csig2;
                (salp12, calp12)
            };
            out.S12 = self.c2 * salp12.atan2(calp12) + self.A4 * (B42 - self.B41);
        }

        out.a12 = if arcmode {
            s12_a12
        } else {
            sig12.to_degrees()
        };
        out
    }
}

impl Engine {
    /// Solve the direct problem.
    ///
    /// `s12_a12` is a distance in meters, or an arc length in degrees when
    /// `arcmode` is set. The end latitude, both azimuths and `a12` are
    /// always computed, the other outputs only when `outmask` asks for
    /// them.
    pub fn gen_direct(
        &self,
        lat1: f64,
        lon1: f64,
        azi1: f64,
        arcmode: bool,
        s12_a12: f64,
        outmask: OutMask,
    ) -> RawOutputs {
        let mut caps = outmask.with_dependencies() | OutMask::LATITUDE | OutMask::AZIMUTH;
        if !arcmode {
            caps |= OutMask::DISTANCE_IN;
        }
        LineStart::new(self, lat1, lon1, azi1, caps).position(arcmode, s12_a12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{WGS84_FLATTENING, WGS84_MAJOR_RADIUS};

    fn wgs84() -> Engine {
        Engine::new(WGS84_MAJOR_RADIUS, WGS84_FLATTENING).unwrap()
    }

    #[test]
    fn along_the_equator() {
        let out = wgs84().gen_direct(
            0.0,
            0.0,
            90.0,
            false,
            111_319.490_793_273_57,
            OutMask::ALL,
        );
        assert!(out.lat2.abs() < 1e-12);
        assert!((out.lon2 - 1.0).abs() < 1e-12, "{}", out.lon2);
        assert!((out.azi2 - 90.0).abs() < 1e-12);
    }

    #[test]
    fn along_a_meridian() {
        let out = wgs84().gen_direct(0.0, 0.0, 0.0, false, 10_001_965.729_3, OutMask::ALL);
        assert!((out.lat2 - 90.0).abs() < 1e-6, "{}", out.lat2);
    }

    #[test]
    fn arc_mode_on_a_sphere() {
        let sphere = Engine::new(1.0, 0.0).unwrap();
        let out = sphere.gen_direct(0.0, 0.0, 90.0, true, 45.0, OutMask::ALL);
        assert_eq!(out.a12, 45.0);
        assert!((out.s12 - std::f64::consts::FRAC_PI_4).abs() < 1e-15);
        assert!((out.lon2 - 45.0).abs() < 1e-12);
        assert!((out.m12 - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-15);
        assert!((out.M12 - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-15);
    }

    #[test]
    fn inverse_then_direct() {
        let engine = wgs84();
        let inverse = engine
            .gen_inverse(-41.32, 174.81, 40.96, -5.50, OutMask::ALL)
            .unwrap();
        let direct = engine.gen_direct(
            -41.32,
            174.81,
            inverse.azi1,
            false,
            inverse.s12,
            OutMask::ALL,
        );
        assert!((direct.lat2 - 40.96).abs() < 1e-9, "{}", direct.lat2);
        assert!((direct.lon2 + 5.50).abs() < 1e-9, "{}", direct.lon2);
        assert!((direct.azi2 - inverse.azi2).abs() < 1e-9);
        assert!((direct.a12 - inverse.a12).abs() < 1e-9);
        assert!((direct.m12 - inverse.m12).abs() < 1e-3);
        assert!((direct.S12 / inverse.S12 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unrequested_outputs_are_unset() {
        let out = wgs84().gen_direct(10.0, 20.0, 30.0, false, 1e6, OutMask::NONE);
        assert!(out.lat2.is_finite());
        assert!(out.azi2.is_finite());
        assert!(out.a12.is_finite());
        assert_eq!(out.s12, 1e6);
        assert!(out.lon2.is_nan());
        assert!(out.m12.is_nan());
        assert!(out.S12.is_nan());
    }
}
