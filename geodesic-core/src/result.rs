//! Results of one direct or inverse solve.
//!
//! A result keeps the [`OutMask`] it was computed with, so every accessor
//! can tell "not requested" (`None`) apart from a computed value that
//! happens to be zero (`Some(0.0)`).
//!
//! ```
//! use geodesic_core::{Ellipsoid, OutMask};
//!
//! let wgs84 = Ellipsoid::wgs84();
//! let result = wgs84.gen_inverse(0.0, 0.0, 0.0, 0.0, OutMask::DISTANCE)?;
//!
//! assert_eq!(result.distance(), Some(0.0));
//! assert_eq!(result.area(), None);
//! assert_eq!(result.arc_length(), 0.0);
//! # Ok::<(), geodesic_core::GeodesicError>(())
//! ```

use crate::{
    engine::RawOutputs,
    error::GeodesicError,
    mask::{OutMask, OutputField},
};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Values of a direct solve.
///
/// `lat2` and `azi2` are always computed but only reported when
/// [`OutputField::Latitude`] and [`OutputField::Azimuth`] were requested.
/// [`DirectResult::arc_length`] is always present. [`DirectResult::distance`]
/// is the input distance echoed back, or the computed distance of an arc
/// mode solve when [`OutputField::Distance`] was requested.
#[derive(Debug, Clone, Copy)]
#[allow(non_snake_case)]
pub struct DirectResult {
    outmask: OutMask,
    lat2: f64,
    lon2: f64,
    azi2: f64,
    m12: f64,
    M12: f64,
    M21: f64,
    S12: f64,
    a12: f64,
    s12: f64,
}

/// Values of an inverse solve.
///
/// `azi1` and `azi2` are always computed but only reported when
/// [`OutputField::Azimuth`] was requested. [`InverseResult::arc_length`] is
/// always present.
#[derive(Debug, Clone, Copy)]
#[allow(non_snake_case)]
pub struct InverseResult {
    outmask: OutMask,
    s12: f64,
    azi1: f64,
    azi2: f64,
    m12: f64,
    M12: f64,
    M21: f64,
    S12: f64,
    a12: f64,
}

#[inline]
fn present(outmask: OutMask, field: OutputField, value: f64) -> Option<f64> {
    outmask.requires(field).then_some(value)
}

/// Fail on the first reported value that is not finite.
fn ensure_finite<const N: usize>(
    values: [(&'static str, Option<f64>); N],
) -> Result<(), GeodesicError> {
    for (field, value) in values {
        if value.is_some_and(|value| !value.is_finite()) {
            return Err(GeodesicError::NonFiniteComputation { field });
        }
    }
    Ok(())
}

impl DirectResult {
    pub(crate) fn from_raw(outmask: OutMask, raw: &RawOutputs) -> Result<Self, GeodesicError> {
        let result = Self {
            outmask,
            lat2: raw.lat2,
            lon2: raw.lon2,
            azi2: raw.azi2,
            m12: raw.m12,
            M12: raw.M12,
            M21: raw.M21,
            S12: raw.S12,
            a12: raw.a12,
            s12: raw.s12,
        };
        ensure_finite(result.reported())?;
        Ok(result)
    }

    fn reported(&self) -> [(&'static str, Option<f64>); 9] {
        [
            ("lat2", self.lat2()),
            ("lon2", self.lon2()),
            ("azi2", self.azi2()),
            ("s12", self.distance()),
            ("m12", self.reduced_length()),
            ("M12", self.geodesic_scale_12()),
            ("M21", self.geodesic_scale_21()),
            ("S12", self.area()),
            ("a12", Some(self.a12)),
        ]
    }

    /// the mask this result was computed with
    pub fn outmask(&self) -> OutMask {
        self.outmask
    }

    /// latitude of the end point, in degrees
    pub fn lat2(&self) -> Option<f64> {
        present(self.outmask, OutputField::Latitude, self.lat2)
    }

    /// longitude of the end point, in degrees
    pub fn lon2(&self) -> Option<f64> {
        present(self.outmask, OutputField::Longitude, self.lon2)
    }

    /// forward azimuth at the end point, in degrees
    pub fn azi2(&self) -> Option<f64> {
        present(self.outmask, OutputField::Azimuth, self.azi2)
    }

    /// distance between the two points, in meters
    pub fn distance(&self) -> Option<f64> {
        let reported = self.outmask.requires(OutputField::Distance)
            || self.outmask.requires(OutputField::DistanceIn);
        reported.then_some(self.s12)
    }

    /// reduced length `m12`, in meters
    pub fn reduced_length(&self) -> Option<f64> {
        present(self.outmask, OutputField::ReducedLength, self.m12)
    }

    /// geodesic scale `M12` of the end point relative to the start point
    pub fn geodesic_scale_12(&self) -> Option<f64> {
        present(self.outmask, OutputField::GeodesicScale, self.M12)
    }

    /// geodesic scale `M21` of the start point relative to the end point
    pub fn geodesic_scale_21(&self) -> Option<f64> {
        present(self.outmask, OutputField::GeodesicScale, self.M21)
    }

    /// area `S12` between the geodesic and the equator, in square meters
    pub fn area(&self) -> Option<f64> {
        present(self.outmask, OutputField::Area, self.S12)
    }

    /// arc length on the auxiliary sphere, in degrees
    pub fn arc_length(&self) -> f64 {
        self.a12
    }

    pub fn has_latitude(&self) -> bool {
        self.lat2().is_some()
    }

    pub fn has_longitude(&self) -> bool {
        self.lon2().is_some()
    }

    pub fn has_azimuth(&self) -> bool {
        self.azi2().is_some()
    }

    pub fn has_distance(&self) -> bool {
        self.distance().is_some()
    }

    pub fn has_reduced_length(&self) -> bool {
        self.reduced_length().is_some()
    }

    pub fn has_geodesic_scale(&self) -> bool {
        self.geodesic_scale_12().is_some()
    }

    pub fn has_area(&self) -> bool {
        self.area().is_some()
    }

    fn bit_patterns(&self) -> [u64; 10] {
        [
            self.outmask.bits(),
            self.lat2.to_bits(),
            self.lon2.to_bits(),
            self.azi2.to_bits(),
            self.m12.to_bits(),
            self.M12.to_bits(),
            self.M21.to_bits(),
            self.S12.to_bits(),
            self.a12.to_bits(),
            self.s12.to_bits(),
        ]
    }
}

impl InverseResult {
    pub(crate) fn from_raw(outmask: OutMask, raw: &RawOutputs) -> Result<Self, GeodesicError> {
        let result = Self {
            outmask,
            s12: raw.s12,
            azi1: raw.azi1,
            azi2: raw.azi2,
            m12: raw.m12,
            M12: raw.M12,
            M21: raw.M21,
            S12: raw.S12,
            a12: raw.a12,
        };
        ensure_finite(result.reported())?;
        Ok(result)
    }

    fn reported(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("s12", self.distance()),
            ("azi1", self.azi1()),
            ("azi2", self.azi2()),
            ("m12", self.reduced_length()),
            ("M12", self.geodesic_scale_12()),
            ("M21", self.geodesic_scale_21()),
            ("S12", self.area()),
            ("a12", Some(self.a12)),
        ]
    }

    /// the mask this result was computed with
    pub fn outmask(&self) -> OutMask {
        self.outmask
    }

    /// distance between the two points, in meters
    pub fn distance(&self) -> Option<f64> {
        present(self.outmask, OutputField::Distance, self.s12)
    }

    /// azimuth at the first point, in degrees
    pub fn azi1(&self) -> Option<f64> {
        present(self.outmask, OutputField::Azimuth, self.azi1)
    }

    /// forward azimuth at the second point, in degrees
    pub fn azi2(&self) -> Option<f64> {
        present(self.outmask, OutputField::Azimuth, self.azi2)
    }

    pub fn reduced_length(&self) -> Option<f64> {
        present(self.outmask, OutputField::ReducedLength, self.m12)
    }

    pub fn geodesic_scale_12(&self) -> Option<f64> {
        present(self.outmask, OutputField::GeodesicScale, self.M12)
    }

    pub fn geodesic_scale_21(&self) -> Option<f64> {
        present(self.outmask, OutputField::GeodesicScale, self.M21)
    }

    pub fn area(&self) -> Option<f64> {
        present(self.outmask, OutputField::Area, self.S12)
    }

    /// arc length on the auxiliary sphere, in degrees
    pub fn arc_length(&self) -> f64 {
        self.a12
    }

    pub fn has_distance(&self) -> bool {
        self.distance().is_some()
    }

    pub fn has_azimuth(&self) -> bool {
        self.azi1().is_some()
    }

    pub fn has_reduced_length(&self) -> bool {
        self.reduced_length().is_some()
    }

    pub fn has_geodesic_scale(&self) -> bool {
        self.geodesic_scale_12().is_some()
    }

    pub fn has_area(&self) -> bool {
        self.area().is_some()
    }

    fn bit_patterns(&self) -> [u64; 9] {
        [
            self.outmask.bits(),
            self.s12.to_bits(),
            self.azi1.to_bits(),
            self.azi2.to_bits(),
            self.m12.to_bits(),
            self.M12.to_bits(),
            self.M21.to_bits(),
            self.S12.to_bits(),
            self.a12.to_bits(),
        ]
    }
}

// Equality is on the bit patterns of the stored values: `NaN` equals
// itself and `0.0` differs from `-0.0`, which keeps `Hash` consistent.

impl PartialEq for DirectResult {
    fn eq(&self, other: &Self) -> bool {
        self.bit_patterns() == other.bit_patterns()
    }
}

impl Eq for DirectResult {}

impl Hash for DirectResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bit_patterns().hash(state)
    }
}

impl PartialEq for InverseResult {
    fn eq(&self, other: &Self) -> bool {
        self.bit_patterns() == other.bit_patterns()
    }
}

impl Eq for InverseResult {}

impl Hash for InverseResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bit_patterns().hash(state)
    }
}

impl fmt::Display for DirectResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "outmask={}, lat2={}, lon2={}, azi2={}, m12={}, M12={}, M21={}, S12={}, a12={}, s12={}",
            self.outmask,
            self.lat2,
            self.lon2,
            self.azi2,
            self.m12,
            self.M12,
            self.M21,
            self.S12,
            self.a12,
            self.s12,
        )
    }
}

impl fmt::Display for InverseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "outmask={}, s12={}, azi1={}, azi2={}, m12={}, M12={}, M21={}, S12={}, a12={}",
            self.outmask,
            self.s12,
            self.azi1,
            self.azi2,
            self.m12,
            self.M12,
            self.M21,
            self.S12,
            self.a12,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn raw() -> RawOutputs {
        RawOutputs {
            lat2: 1.0,
            lon2: 2.0,
            azi1: 3.0,
            azi2: 4.0,
            s12: 5.0,
            a12: 6.0,
            m12: 7.0,
            M12: 8.0,
            M21: 9.0,
            S12: 10.0,
        }
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn direct_reports_requested_fields_only() {
        let result = DirectResult::from_raw(OutMask::LONGITUDE, &raw()).unwrap();

        assert_eq!(result.lon2(), Some(2.0));
        assert_eq!(result.lat2(), None);
        assert_eq!(result.azi2(), None);
        assert_eq!(result.distance(), None);
        assert_eq!(result.reduced_length(), None);
        assert_eq!(result.geodesic_scale_12(), None);
        assert_eq!(result.area(), None);
        assert_eq!(result.arc_length(), 6.0);
        assert!(result.has_longitude());
        assert!(!result.has_latitude());
    }

    #[test]
    fn direct_distance_is_reported_as_input_or_output() {
        let echoed = DirectResult::from_raw(OutMask::DISTANCE_IN, &raw()).unwrap();
        assert_eq!(echoed.distance(), Some(5.0));

        let computed = DirectResult::from_raw(OutMask::DISTANCE, &raw()).unwrap();
        assert_eq!(computed.distance(), Some(5.0));
    }

    #[test]
    fn shared_series_bits_do_not_leak_presence() {
        // DISTANCE and REDUCED_LENGTH share C1, GEODESIC_SCALE shares C2
        let result = InverseResult::from_raw(OutMask::REDUCED_LENGTH, &raw()).unwrap();
        assert_eq!(result.reduced_length(), Some(7.0));
        assert!(!result.has_distance());
        assert!(!result.has_geodesic_scale());
    }

    #[test]
    fn zero_is_distinct_from_absent() {
        let mut zeros = raw();
        zeros.s12 = 0.0;
        let result = InverseResult::from_raw(OutMask::DISTANCE, &zeros).unwrap();
        assert_eq!(result.distance(), Some(0.0));
        assert_eq!(result.area(), None);
    }

    #[test]
    fn unreported_values_may_be_nan() {
        let mut partial = raw();
        partial.S12 = f64::NAN;
        assert!(InverseResult::from_raw(OutMask::DISTANCE, &partial).is_ok());
    }

    #[test]
    fn reported_non_finite_value_fails() {
        let mut broken = raw();
        broken.M21 = f64::INFINITY;
        assert_eq!(
            InverseResult::from_raw(OutMask::GEODESIC_SCALE, &broken).unwrap_err(),
            GeodesicError::NonFiniteComputation { field: "M21" }
        );

        let mut broken = raw();
        broken.a12 = f64::NAN;
        assert_eq!(
            DirectResult::from_raw(OutMask::NONE, &broken).unwrap_err(),
            GeodesicError::NonFiniteComputation { field: "a12" }
        );
    }

    #[test]
    fn equal_results_hash_equal() {
        let mut values = raw();
        values.S12 = f64::NAN;

        let a = InverseResult::from_raw(OutMask::DISTANCE, &values).unwrap();
        let b = InverseResult::from_raw(OutMask::DISTANCE, &values).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = InverseResult::from_raw(OutMask::DISTANCE | OutMask::AZIMUTH, &values).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn signed_zero_is_a_different_result() {
        let mut negative = raw();
        negative.lat2 = -0.0;
        let mut positive = raw();
        positive.lat2 = 0.0;

        let a = DirectResult::from_raw(OutMask::LATITUDE, &negative).unwrap();
        let b = DirectResult::from_raw(OutMask::LATITUDE, &positive).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn display_direct() {
        let result = DirectResult::from_raw(OutMask::LATITUDE | OutMask::AZIMUTH, &raw()).unwrap();
        assert_eq!(
            result.to_string(),
            "outmask=LATITUDE | AZIMUTH, lat2=1, lon2=2, azi2=4, m12=7, M12=8, M21=9, S12=10, a12=6, s12=5"
        );
    }

    #[test]
    fn display_inverse() {
        let mut values = raw();
        values.S12 = f64::NAN;
        let result = InverseResult::from_raw(OutMask::DISTANCE, &values).unwrap();
        assert_eq!(
            result.to_string(),
            "outmask=DISTANCE, s12=5, azi1=3, azi2=4, m12=7, M12=8, M21=9, S12=NaN, a12=6"
        );
    }
}
