//! Direct and inverse geodesic solutions on an ellipsoid of revolution,
//! computing only what the caller asks for.
//!
//! * the **direct problem**: from a start point, an azimuth and a distance
//!   (or an arc length), find the end point;
//! * the **inverse problem**: from two points, find the distance and the
//!   azimuths between them.
//!
//! Both can also report the reduced length `m12`, the geodesic scales
//! `M12`/`M21` and the area `S12` between the geodesic and the equator.
//! Each of these costs extra series evaluations, so callers select them
//! with an [`OutMask`]; the mask already carries the series groups every
//! field needs and the engine evaluates nothing else.
//!
//! ```
//! use geodesic_core::{Ellipsoid, OutMask};
//!
//! let wgs84 = Ellipsoid::wgs84();
//!
//! // everything
//! let full = wgs84.inverse(-41.32, 174.81, 40.96, -5.50)?;
//! assert!(full.area().is_some());
//!
//! // only the distance
//! let cheap = wgs84.gen_inverse(-41.32, 174.81, 40.96, -5.50, OutMask::DISTANCE)?;
//! assert_eq!(cheap.distance(), full.distance());
//! assert_eq!(cheap.area(), None);
//! # Ok::<(), geodesic_core::GeodesicError>(())
//! ```
//!
//! The numeric engine is Karney's algorithm (as in GeographicLib, series
//! order 6): accurate to round-off for any pair of points, including
//! nearly antipodal ones.

pub mod defaults;
mod ellipsoid;
mod engine;
mod error;
mod mask;
mod result;

pub use self::{
    ellipsoid::{Ellipsoid, EllipsoidParameters},
    error::GeodesicError,
    mask::{OutMask, OutputField, SeriesGroup},
    result::{DirectResult, InverseResult},
};
