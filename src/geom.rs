//! Geometric Primitives
//!
//! Tolerance-based comparison helpers for the cached geometric
//! fingerprints carried by references, plus the table of canonical
//! standard datum identifiers shared across authoring systems.
//!
//! Fingerprints are round-tripped through text, so the last few
//! significant digits are not trustworthy; every comparison here uses an
//! absolute tolerance instead of exact equality.

use glam::DVec3;

/// Absolute tolerance for point coincidence tests.
pub const POINT_EPSILON: f64 = 1e-6;

/// Absolute tolerance for direction parallelism tests.
pub const DIRECTION_EPSILON: f64 = 1e-5;

/// Convert degrees to radians.
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Convert radians to degrees.
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Check whether two points coincide within [`POINT_EPSILON`] per axis.
pub fn points_coincident(a: DVec3, b: DVec3) -> bool {
    (a.x - b.x).abs() < POINT_EPSILON
        && (a.y - b.y).abs() < POINT_EPSILON
        && (a.z - b.z).abs() < POINT_EPSILON
}

/// Normalize a vector, returning `None` for a near-zero input.
///
/// A vector shorter than [`POINT_EPSILON`] has no usable direction;
/// callers must treat that as "no direction" rather than divide by it.
pub fn try_normalize(v: DVec3) -> Option<DVec3> {
    let len = v.length();
    if len < POINT_EPSILON {
        None
    } else {
        Some(v / len)
    }
}

/// Check whether two vectors are parallel or antiparallel.
///
/// Degenerate (near-zero) inputs are never parallel to anything.
pub fn directions_parallel(a: DVec3, b: DVec3) -> bool {
    match (try_normalize(a), try_normalize(b)) {
        (Some(na), Some(nb)) => (na.dot(nb).abs() - 1.0).abs() < DIRECTION_EPSILON,
        _ => false,
    }
}

/// Canonical identifiers for built-in datums.
///
/// Two authoring systems that both sketch on "the XY plane" use
/// kernel-specific names for it; mapping recognizable normals and axis
/// directions onto these IDs lets a receiving system agree on the datum
/// without sharing identity space with the sender.
pub mod standard {
    use glam::DVec3;

    use super::directions_parallel;

    /// Datum plane with normal (0,0,1).
    pub const PLANE_XY: &str = "STD_DATUM_XY";
    /// Datum plane with normal (1,0,0).
    pub const PLANE_YZ: &str = "STD_DATUM_YZ";
    /// Datum plane with normal (0,1,0).
    pub const PLANE_ZX: &str = "STD_DATUM_ZX";

    pub const AXIS_X: &str = "STD_AXIS_X";
    pub const AXIS_Y: &str = "STD_AXIS_Y";
    pub const AXIS_Z: &str = "STD_AXIS_Z";

    pub const ORIGIN: &str = "STD_POINT_ORIGIN";

    pub const PLANE_XY_NORMAL: DVec3 = DVec3::new(0.0, 0.0, 1.0);
    pub const PLANE_YZ_NORMAL: DVec3 = DVec3::new(1.0, 0.0, 0.0);
    pub const PLANE_ZX_NORMAL: DVec3 = DVec3::new(0.0, 1.0, 0.0);

    /// Map a plane normal onto a standard datum plane ID.
    ///
    /// Antiparallel normals match too: a plane is the same plane seen
    /// from the other side.
    pub fn match_plane(normal: DVec3) -> Option<&'static str> {
        if directions_parallel(normal, PLANE_XY_NORMAL) {
            Some(PLANE_XY)
        } else if directions_parallel(normal, PLANE_YZ_NORMAL) {
            Some(PLANE_YZ)
        } else if directions_parallel(normal, PLANE_ZX_NORMAL) {
            Some(PLANE_ZX)
        } else {
            None
        }
    }

    /// Map an axis direction onto a standard axis ID.
    pub fn match_axis(direction: DVec3) -> Option<&'static str> {
        if directions_parallel(direction, DVec3::X) {
            Some(AXIS_X)
        } else if directions_parallel(direction, DVec3::Y) {
            Some(AXIS_Y)
        } else if directions_parallel(direction, DVec3::Z) {
            Some(AXIS_Z)
        } else {
            None
        }
    }

    /// Check whether an identifier is one of the canonical datum IDs.
    pub fn is_standard_id(id: &str) -> bool {
        matches!(
            id,
            PLANE_XY | PLANE_YZ | PLANE_ZX | AXIS_X | AXIS_Y | AXIS_Z | ORIGIN
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_coincident_within_tolerance() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(1.0 + 1e-8, 2.0 - 1e-8, 3.0);
        assert!(points_coincident(a, b));
        assert!(!points_coincident(a, DVec3::new(1.0, 2.0, 3.1)));
    }

    #[test]
    fn test_try_normalize_rejects_near_zero() {
        assert!(try_normalize(DVec3::new(1e-9, 0.0, 0.0)).is_none());
        let n = try_normalize(DVec3::new(0.0, 0.0, 2.0)).unwrap();
        assert!(points_coincident(n, DVec3::Z));
    }

    #[test]
    fn test_directions_parallel_both_signs() {
        assert!(directions_parallel(DVec3::Z, DVec3::new(0.0, 0.0, -3.0)));
        assert!(!directions_parallel(DVec3::Z, DVec3::X));
        assert!(!directions_parallel(DVec3::ZERO, DVec3::Z));
    }

    #[test]
    fn test_match_plane_antiparallel() {
        assert_eq!(
            standard::match_plane(DVec3::new(0.0, 0.0, -1.0)),
            Some(standard::PLANE_XY)
        );
        assert_eq!(
            standard::match_plane(DVec3::new(1.0, 0.0, 0.0)),
            Some(standard::PLANE_YZ)
        );
        assert_eq!(standard::match_plane(DVec3::new(1.0, 1.0, 0.0)), None);
    }

    #[test]
    fn test_match_axis() {
        assert_eq!(standard::match_axis(DVec3::new(0.0, -2.0, 0.0)), Some(standard::AXIS_Y));
        assert_eq!(standard::match_axis(DVec3::new(1.0, 1.0, 1.0)), None);
    }
}
