use crate::mask::OutMask;

/// Equatorial radius of the WGS84 ellipsoid, in meters
///
/// ```
/// # use geodesic_core::{defaults::*, Ellipsoid};
/// assert_eq!(Ellipsoid::wgs84().major_radius(), WGS84_MAJOR_RADIUS);
/// ```
pub const WGS84_MAJOR_RADIUS: f64 = 6_378_137.0;

/// Flattening of the WGS84 ellipsoid
///
/// The defining value is the inverse flattening, `298.257223563`.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Outputs computed by [`Ellipsoid::direct`] and [`Ellipsoid::arc_direct`]
///
/// Every field is computed by the convenience entry points. Use
/// [`Ellipsoid::gen_direct`] to select fewer.
///
/// [`Ellipsoid::direct`]: crate::Ellipsoid::direct
/// [`Ellipsoid::arc_direct`]: crate::Ellipsoid::arc_direct
/// [`Ellipsoid::gen_direct`]: crate::Ellipsoid::gen_direct
pub const DEFAULT_DIRECT_MASK: OutMask = OutMask::ALL;

/// Outputs computed by [`Ellipsoid::inverse`]
///
/// [`Ellipsoid::inverse`]: crate::Ellipsoid::inverse
pub const DEFAULT_INVERSE_MASK: OutMask = OutMask::ALL;

/// Order of the series expansions in the third flattening
pub const GEODESIC_ORDER: usize = 6;

/// Newton iterations of the inverse solver before it falls back to bisection
pub const INVERSE_NEWTON_ITERATIONS: u64 = 20;

/// Extra bisection iterations of the inverse solver, on top of one per bit
/// of precision
pub const INVERSE_BISECTION_ITERATIONS: u64 = 10;
