use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeodesicError {
    /// The ellipsoid was released; its engine state is gone.
    #[error("ellipsoid handle was released")]
    InvalidHandle,
    #[error("equatorial radius must be finite and positive, got {value}")]
    InvalidMajorRadius { value: f64 },
    #[error("polar semi-axis must be finite and positive, got {value}")]
    InvalidPolarSemiAxis { value: f64 },
    #[error("inverse solution did not converge after {iterations} iterations")]
    NonConvergent { iterations: u64 },
    /// A reported quantity (`lat2`, `s12`, `M21`, ...) is `NaN` or infinite.
    #[error("geodesic computation produced a non-finite {field}")]
    NonFiniteComputation { field: &'static str },
}
