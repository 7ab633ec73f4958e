//! The ellipsoid handle.
//!
//! An [`Ellipsoid`] owns the engine state computed once from its shape
//! `(a, f)` and issues every direct and inverse solve. The state can be
//! freed explicitly with [`Ellipsoid::release`] (any number of times, from
//! any number of threads) and is freed on drop otherwise. After a release
//! the shape accessors still answer but every solve fails with
//! [`GeodesicError::InvalidHandle`].
//!
//! ```
//! use geodesic_core::{Ellipsoid, GeodesicError};
//!
//! let sphere = Ellipsoid::new(6_371_000.0, 0.0)?;
//! let result = sphere.inverse(0.0, 0.0, 0.0, 90.0)?;
//! assert!((result.distance().unwrap() - 6_371_000.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-6);
//!
//! assert!(sphere.release());
//! assert!(!sphere.release());
//! assert_eq!(sphere.major_radius(), 6_371_000.0);
//! assert_eq!(
//!     sphere.inverse(0.0, 0.0, 0.0, 90.0).unwrap_err(),
//!     GeodesicError::InvalidHandle,
//! );
//! # Ok::<(), GeodesicError>(())
//! ```

use crate::{
    defaults::{DEFAULT_DIRECT_MASK, DEFAULT_INVERSE_MASK, WGS84_FLATTENING, WGS84_MAJOR_RADIUS},
    engine::{self, Engine},
    error::GeodesicError,
    mask::{OutMask, OutputField},
    result::{DirectResult, InverseResult},
};
use anyhow::{Context as _, anyhow, ensure};
use lazy_static::lazy_static;
use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::{PoisonError, RwLock},
};

lazy_static! {
    static ref WGS84: Ellipsoid = Ellipsoid::pinned(WGS84_MAJOR_RADIUS, WGS84_FLATTENING);
}

/// Shape of an ellipsoid of revolution.
///
/// This is the configuration value an [`Ellipsoid`] is built from. The
/// text form is `<a>, <f>`, where the flattening may also be written as
/// `1/<inverse flattening>`:
///
/// ```
/// use geodesic_core::EllipsoidParameters;
///
/// let grs80: EllipsoidParameters = "6378137, 1/298.257222101".parse().unwrap();
/// assert_eq!(grs80.major_radius, 6_378_137.0);
/// assert_eq!(grs80.flattening, 1.0 / 298.257222101);
///
/// let wgs84 = EllipsoidParameters::default();
/// assert_eq!(wgs84.to_string().parse::<EllipsoidParameters>().unwrap(), wgs84);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidParameters {
    /// equatorial radius `a`, in meters
    pub major_radius: f64,
    /// flattening `f`; `0` is a sphere, negative values are prolate
    pub flattening: f64,
}

impl EllipsoidParameters {
    pub const WGS84: Self = Self {
        major_radius: WGS84_MAJOR_RADIUS,
        flattening: WGS84_FLATTENING,
    };
}

impl Default for EllipsoidParameters {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for EllipsoidParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.major_radius, self.flattening)
    }
}

impl FromStr for EllipsoidParameters {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let Some(major_radius_raw) = parts.next() else {
            return Err(anyhow!(
                "Failed to parse EllipsoidParameters: expected format `<a>, <f>`"
            ));
        };
        let Some(flattening_raw) = parts.next() else {
            return Err(anyhow!(
                "Failed to parse EllipsoidParameters: expected format `<a>, <f>`"
            ));
        };
        ensure!(
            parts.next().is_none(),
            "Failed to parse EllipsoidParameters: expected a single comma separator"
        );

        let major_radius: f64 = major_radius_raw
            .trim()
            .parse()
            .context("Failed to parse EllipsoidParameters major radius")?;
        let flattening = parse_flattening(flattening_raw.trim())
            .context("Failed to parse EllipsoidParameters flattening")?;

        Ok(Self {
            major_radius,
            flattening,
        })
    }
}

/// `f` or `1/<inverse flattening>`
fn parse_flattening(s: &str) -> anyhow::Result<f64> {
    match s.split_once('/') {
        None => Ok(s.parse()?),
        Some((numerator, inverse)) => {
            ensure!(
                numerator.trim() == "1",
                "expected `1/<inverse flattening>`, got `{s}`"
            );
            let inverse: f64 = inverse.trim().parse()?;
            Ok(1.0 / inverse)
        }
    }
}

/// Handle on an ellipsoid of revolution.
///
/// Handles compare and hash on the exact bit patterns of `a` and `f`.
/// The handle is [`Sync`]: solves may run concurrently from several
/// threads, and a concurrent [`Ellipsoid::release`] waits for them.
#[derive(Debug)]
pub struct Ellipsoid {
    major_radius: f64,
    flattening: f64,
    /// the process-wide WGS84 handle is never released
    pinned: bool,
    state: RwLock<Option<Engine>>,
}

impl Ellipsoid {
    /// Create a handle on the ellipsoid with equatorial radius `a` (meters)
    /// and flattening `f`.
    ///
    /// A flattening greater than `1` is taken as the inverse flattening.
    /// Fails if `a` or the polar semi-axis `a(1 - f)` is not finite and
    /// positive.
    ///
    /// ```
    /// # use geodesic_core::Ellipsoid;
    /// let a = Ellipsoid::new(6_378_137.0, 1.0 / 298.257223563).unwrap();
    /// let b = Ellipsoid::new(6_378_137.0, 298.257223563).unwrap();
    /// assert_eq!(a, b);
    /// assert!(Ellipsoid::new(-1.0, 0.0).is_err());
    /// ```
    pub fn new(a: f64, f: f64) -> Result<Self, GeodesicError> {
        let engine = Engine::new(a, f)?;
        let ellipsoid = Self {
            major_radius: engine.major_radius(),
            flattening: engine.flattening(),
            pinned: false,
            state: RwLock::new(Some(engine)),
        };
        log::debug!("created ellipsoid {ellipsoid}");
        Ok(ellipsoid)
    }

    pub fn from_parameters(parameters: EllipsoidParameters) -> Result<Self, GeodesicError> {
        Self::new(parameters.major_radius, parameters.flattening)
    }

    /// The WGS84 reference ellipsoid.
    ///
    /// The handle is created on first use and lives for the whole
    /// process; [`Ellipsoid::release`] on it does nothing.
    ///
    /// ```
    /// # use geodesic_core::Ellipsoid;
    /// let wgs84 = Ellipsoid::wgs84();
    /// assert!(!wgs84.release());
    /// assert!(!wgs84.is_released());
    /// ```
    pub fn wgs84() -> &'static Self {
        &WGS84
    }

    fn pinned(a: f64, f: f64) -> Self {
        Self {
            major_radius: a,
            flattening: f,
            pinned: true,
            state: RwLock::new(Engine::new(a, f).ok()),
        }
    }

    pub fn parameters(&self) -> EllipsoidParameters {
        EllipsoidParameters {
            major_radius: self.major_radius,
            flattening: self.flattening,
        }
    }

    /// equatorial radius `a`, in meters
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// flattening `f`
    pub fn flattening(&self) -> f64 {
        self.flattening
    }

    /// polar semi-axis `b = a(1 - f)`, in meters
    pub fn minor_radius(&self) -> f64 {
        self.major_radius * (1.0 - self.flattening)
    }

    /// Total surface area of the ellipsoid, in square meters.
    ///
    /// ```
    /// # use geodesic_core::Ellipsoid;
    /// let sphere = Ellipsoid::new(1.0, 0.0).unwrap();
    /// assert_eq!(sphere.ellipsoid_area(), 4.0 * std::f64::consts::PI);
    /// ```
    pub fn ellipsoid_area(&self) -> f64 {
        engine::ellipsoid_area(self.major_radius, self.flattening)
    }

    /// Solve the direct problem for a distance `s12` in meters, computing
    /// every output.
    pub fn direct(
        &self,
        lat1: f64,
        lon1: f64,
        azi1: f64,
        s12: f64,
    ) -> Result<DirectResult, GeodesicError> {
        self.gen_direct(lat1, lon1, azi1, false, s12, DEFAULT_DIRECT_MASK)
    }

    /// Solve the direct problem for an arc length `a12` in degrees,
    /// computing every output.
    pub fn arc_direct(
        &self,
        lat1: f64,
        lon1: f64,
        azi1: f64,
        a12: f64,
    ) -> Result<DirectResult, GeodesicError> {
        self.gen_direct(lat1, lon1, azi1, true, a12, DEFAULT_DIRECT_MASK)
    }

    /// Solve the direct problem, computing only what `outmask` asks for.
    ///
    /// With `arcmode` the fourth input is the arc length `a12` in degrees,
    /// otherwise it is the distance `s12` in meters. The mask stored in
    /// the result is the effective one: it gains
    /// [`OutMask::DISTANCE_IN`] when the distance was the input and loses
    /// it otherwise.
    ///
    /// ```
    /// # use geodesic_core::{Ellipsoid, OutMask};
    /// let wgs84 = Ellipsoid::wgs84();
    /// let result = wgs84.gen_direct(40.6, -73.8, 45.0, false, 10e6, OutMask::LONGITUDE)?;
    /// assert!(result.lon2().is_some());
    /// assert_eq!(result.distance(), Some(10e6));
    /// assert_eq!(result.lat2(), None);
    /// assert_eq!(result.area(), None);
    /// # Ok::<(), geodesic_core::GeodesicError>(())
    /// ```
    pub fn gen_direct(
        &self,
        lat1: f64,
        lon1: f64,
        azi1: f64,
        arcmode: bool,
        s12_a12: f64,
        outmask: OutMask,
    ) -> Result<DirectResult, GeodesicError> {
        let effective = if arcmode {
            outmask.without_output(OutputField::DistanceIn)
        } else {
            outmask | OutMask::DISTANCE_IN
        };
        log::trace!(
            "direct ({lat1}, {lon1}) azi1={azi1} {}={s12_a12} outmask={effective}",
            if arcmode { "a12" } else { "s12" }
        );

        self.with_engine(|engine| {
            let raw = engine.gen_direct(lat1, lon1, azi1, arcmode, s12_a12, effective);
            DirectResult::from_raw(effective, &raw)
        })
    }

    /// Solve the inverse problem, computing every output.
    ///
    /// ```
    /// # use geodesic_core::Ellipsoid;
    /// let result = Ellipsoid::wgs84().inverse(-41.32, 174.81, 40.96, -5.50)?;
    /// assert!((result.distance().unwrap() - 19_959_679.267).abs() < 1e-3);
    /// # Ok::<(), geodesic_core::GeodesicError>(())
    /// ```
    pub fn inverse(
        &self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    ) -> Result<InverseResult, GeodesicError> {
        self.gen_inverse(lat1, lon1, lat2, lon2, DEFAULT_INVERSE_MASK)
    }

    /// Solve the inverse problem, computing only what `outmask` asks for.
    pub fn gen_inverse(
        &self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
        outmask: OutMask,
    ) -> Result<InverseResult, GeodesicError> {
        log::trace!("inverse ({lat1}, {lon1}) -> ({lat2}, {lon2}) outmask={outmask}");

        self.with_engine(|engine| {
            let raw = engine.gen_inverse(lat1, lon1, lat2, lon2, outmask)?;
            InverseResult::from_raw(outmask, &raw)
        })
    }

    fn with_engine<T, F>(&self, solve: F) -> Result<T, GeodesicError>
    where
        F: FnOnce(&Engine) -> Result<T, GeodesicError>,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let engine = state.as_ref().ok_or(GeodesicError::InvalidHandle)?;
        solve(engine)
    }

    /// Free the engine state.
    ///
    /// Returns `true` for the one call that actually freed it; every other
    /// call, before or after, concurrent or not, is a no-op returning
    /// `false`. The WGS84 handle is never released.
    pub fn release(&self) -> bool {
        if self.pinned {
            log::warn!("ignoring release of the process-wide WGS84 ellipsoid");
            return false;
        }

        let released = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if released {
            log::debug!("released ellipsoid {self}");
        }
        released
    }

    pub fn is_released(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn bit_patterns(&self) -> [u64; 2] {
        [self.major_radius.to_bits(), self.flattening.to_bits()]
    }
}

impl Drop for Ellipsoid {
    fn drop(&mut self) {
        self.release();
    }
}

impl PartialEq for Ellipsoid {
    fn eq(&self, other: &Self) -> bool {
        self.bit_patterns() == other.bit_patterns()
    }
}

impl Eq for Ellipsoid {}

impl Hash for Ellipsoid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bit_patterns().hash(state)
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "major_radius={}, flattening={}, ellipsoid_area={}",
            self.major_radius,
            self.flattening,
            self.ellipsoid_area()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn shape_round_trips() {
        let ellipsoid = Ellipsoid::new(6_378_137.0, 1.0 / 298.257223563).unwrap();
        assert_eq!(ellipsoid.major_radius(), 6_378_137.0);
        assert_eq!(ellipsoid.flattening(), 1.0 / 298.257223563);
        assert_eq!(ellipsoid.parameters(), EllipsoidParameters::WGS84);
    }

    #[test]
    fn minor_radius() {
        let ellipsoid = Ellipsoid::new(2.0, 0.25).unwrap();
        assert_eq!(ellipsoid.minor_radius(), 1.5);
    }

    #[test]
    fn equality_and_hash_follow_shape() {
        let a = Ellipsoid::new(6_378_137.0, WGS84_FLATTENING).unwrap();
        let b = Ellipsoid::new(6_378_137.0, WGS84_FLATTENING).unwrap();
        let c = Ellipsoid::new(6_378_137.0, 0.0).unwrap();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
        assert_eq!(&a, Ellipsoid::wgs84());
    }

    #[test]
    fn released_handle_keeps_shape_and_equality() {
        let a = Ellipsoid::new(1.0, 0.0).unwrap();
        let b = Ellipsoid::new(1.0, 0.0).unwrap();
        assert!(a.release());

        assert_eq!(a, b);
        assert_eq!(a.ellipsoid_area(), b.ellipsoid_area());
        assert!(a.is_released());
        assert!(!b.is_released());
    }

    #[test]
    fn release_is_idempotent() {
        let ellipsoid = Ellipsoid::new(1.0, 0.0).unwrap();
        assert!(ellipsoid.release());
        assert!(!ellipsoid.release());
        assert!(!ellipsoid.release());
    }

    #[test]
    fn released_handle_fails_every_solve() {
        let ellipsoid = Ellipsoid::new(1.0, 0.0).unwrap();
        ellipsoid.release();

        assert_eq!(
            ellipsoid.direct(0.0, 0.0, 0.0, 1.0).unwrap_err(),
            GeodesicError::InvalidHandle
        );
        assert_eq!(
            ellipsoid.arc_direct(0.0, 0.0, 0.0, 1.0).unwrap_err(),
            GeodesicError::InvalidHandle
        );
        assert_eq!(
            ellipsoid.inverse(0.0, 0.0, 1.0, 1.0).unwrap_err(),
            GeodesicError::InvalidHandle
        );
        assert_eq!(
            ellipsoid
                .gen_inverse(0.0, 0.0, 1.0, 1.0, OutMask::NONE)
                .unwrap_err(),
            GeodesicError::InvalidHandle
        );
    }

    #[test]
    fn wgs84_is_pinned() {
        let wgs84 = Ellipsoid::wgs84();
        assert!(!wgs84.release());
        assert!(!wgs84.is_released());
        assert!(wgs84.inverse(0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(std::ptr::eq(wgs84, Ellipsoid::wgs84()));
    }

    #[test]
    fn direct_stores_effective_mask() {
        let wgs84 = Ellipsoid::wgs84();

        let by_distance = wgs84
            .gen_direct(0.0, 0.0, 30.0, false, 1000.0, OutMask::LATITUDE)
            .unwrap();
        assert_eq!(by_distance.outmask(), OutMask::LATITUDE | OutMask::DISTANCE_IN);
        assert_eq!(by_distance.distance(), Some(1000.0));

        let by_arc = wgs84
            .gen_direct(0.0, 0.0, 30.0, true, 1.0, OutMask::LATITUDE | OutMask::DISTANCE_IN)
            .unwrap();
        assert!(!by_arc.outmask().requires(OutputField::DistanceIn));
        assert_eq!(by_arc.distance(), None);
        assert_eq!(by_arc.arc_length(), 1.0);
    }

    #[test]
    fn display() {
        let sphere = Ellipsoid::new(1.0, 0.0).unwrap();
        assert_eq!(
            sphere.to_string(),
            format!("major_radius=1, flattening=0, ellipsoid_area={}", 4.0 * std::f64::consts::PI)
        );
    }

    #[test]
    fn parameters_parse() {
        let parameters: EllipsoidParameters = " 6378137 , 0.0033528106647474805 ".parse().unwrap();
        assert_eq!(parameters.major_radius, 6_378_137.0);
        assert_eq!(parameters.flattening, 0.0033528106647474805);

        let sphere: EllipsoidParameters = "1, 0".parse().unwrap();
        assert_eq!(sphere.flattening, 0.0);

        let prolate: EllipsoidParameters = "1, -0.5".parse().unwrap();
        assert_eq!(prolate.flattening, -0.5);

        let inverse: EllipsoidParameters = "6378137, 1 / 298.257223563".parse().unwrap();
        assert_eq!(inverse, EllipsoidParameters::WGS84);
    }

    #[test]
    fn parameters_parse_rejects_invalid_values() {
        assert!("".parse::<EllipsoidParameters>().is_err());
        assert!("6378137".parse::<EllipsoidParameters>().is_err());
        assert!("6378137, 0, 1".parse::<EllipsoidParameters>().is_err());
        assert!("a, 0".parse::<EllipsoidParameters>().is_err());
        assert!("1, 2/3".parse::<EllipsoidParameters>().is_err());
        assert!("1, 1/x".parse::<EllipsoidParameters>().is_err());
    }

    #[test]
    fn parameters_display_round_trips() {
        let parameters = EllipsoidParameters {
            major_radius: 6_378_137.0,
            flattening: 1.0 / 298.257222101,
        };
        assert_eq!(
            parameters.to_string().parse::<EllipsoidParameters>().unwrap(),
            parameters
        );
    }

    #[test]
    fn from_parameters() {
        let ellipsoid = Ellipsoid::from_parameters(EllipsoidParameters::default()).unwrap();
        assert_eq!(&ellipsoid, Ellipsoid::wgs84());

        let invalid = EllipsoidParameters {
            major_radius: f64::INFINITY,
            flattening: 0.0,
        };
        assert!(matches!(
            Ellipsoid::from_parameters(invalid).unwrap_err(),
            GeodesicError::InvalidMajorRadius { .. }
        ));
    }
}
