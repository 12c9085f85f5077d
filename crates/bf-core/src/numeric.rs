/// Floating point type used throughout system
pub type Real = f64;

/// Default tolerance for scan path interval comparisons.
pub const PATH_EPS: Real = 1e-10;

/// Values below this are treated as zero (power, volumes, weights).
pub const SMALL: Real = 1e-15;

