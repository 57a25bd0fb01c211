//! Vector and matrix math utilities for attitude calculations
//!
//! This module provides helper functions for 3-vector and 3x3 matrix operations
//! used by the attitude kernel, including coordinate conversions, vector
//! normalization, cross products, angular separation and rotation/quaternion
//! conversions. Matrices are row-major `[[f64; 3]; 3]`.

use ndarray::arr2;

/// A 3x3 row-major matrix
pub type Matrix3 = [[f64; 3]; 3];

/// The 3x3 identity matrix
pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Convert RA/Dec coordinates to a unit vector
///
/// # Arguments
/// * `ra_deg` - Right ascension in degrees
/// * `dec_deg` - Declination in degrees
///
/// # Returns
/// Unit vector [x, y, z] in ICRS/J2000 frame
pub fn radec_to_unit_vector(ra_deg: f64, dec_deg: f64) -> [f64; 3] {
    radrec(1.0, ra_deg.to_radians(), dec_deg.to_radians())
}

/// Convert range, right ascension and declination (radians) to rectangular coordinates
pub fn radrec(range: f64, ra_rad: f64, dec_rad: f64) -> [f64; 3] {
    let cos_dec = dec_rad.cos();
    [
        range * cos_dec * ra_rad.cos(),
        range * cos_dec * ra_rad.sin(),
        range * dec_rad.sin(),
    ]
}

/// Normalize a 3D vector to unit length
///
/// # Arguments
/// * `v` - Input vector [x, y, z]
///
/// # Returns
/// Normalized unit vector, or [0, 0, 0] if input magnitude is zero
pub fn normalize_vector(v: &[f64; 3]) -> [f64; 3] {
    let mag = vector_magnitude(v);
    if mag > 0.0 {
        [v[0] / mag, v[1] / mag, v[2] / mag]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Calculate the dot product of two 3D vectors
pub fn dot_product(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Calculate the cross product a × b
pub fn cross_product(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Unit vector along a × b
///
/// The inputs are normalized first so the result does not depend on their
/// magnitudes. Returns [0, 0, 0] when the inputs are parallel or zero.
pub fn unit_cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    normalize_vector(&cross_product(&normalize_vector(a), &normalize_vector(b)))
}

/// Calculate the magnitude (length) of a 3D vector
pub fn vector_magnitude(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Angular separation between two vectors in radians
///
/// Uses the chord length instead of `acos` of the dot product so that the
/// result stays accurate for nearly parallel and nearly antiparallel vectors.
/// Returns 0 if either vector is zero.
pub fn angular_separation(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    if vector_magnitude(a) == 0.0 || vector_magnitude(b) == 0.0 {
        return 0.0;
    }
    let u1 = normalize_vector(a);
    let u2 = normalize_vector(b);
    let dot = dot_product(&u1, &u2);
    if dot > 0.0 {
        let chord = [u1[0] - u2[0], u1[1] - u2[1], u1[2] - u2[2]];
        2.0 * (0.5 * vector_magnitude(&chord)).asin()
    } else if dot < 0.0 {
        let chord = [u1[0] + u2[0], u1[1] + u2[1], u1[2] + u2[2]];
        std::f64::consts::PI - 2.0 * (0.5 * vector_magnitude(&chord)).asin()
    } else {
        std::f64::consts::FRAC_PI_2
    }
}

/// Matrix times vector
pub fn mat_vec(m: &Matrix3, v: &[f64; 3]) -> [f64; 3] {
    [dot_product(&m[0], v), dot_product(&m[1], v), dot_product(&m[2], v)]
}

/// Matrix product a · b
pub fn mat_mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Matrix transpose
pub fn mat_transpose(m: &Matrix3) -> Matrix3 {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

/// Frame rotation about one coordinate axis (1 = X, 2 = Y, 3 = Z)
///
/// The returned matrix transforms vector coordinates into a frame rotated by
/// `angle` radians about `axis`. Returns `None` for an axis outside 1..=3.
pub fn axis_rotation(angle: f64, axis: i32) -> Option<Matrix3> {
    let (s, c) = angle.sin_cos();
    match axis {
        1 => Some([[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]]),
        2 => Some([[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]]),
        3 => Some([[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]]),
        _ => None,
    }
}

/// Convert a rotation matrix to a scalar-first unit quaternion
///
/// Uses Shepperd's method (largest diagonal term) for numerical stability.
/// The sign is chosen so that the scalar part is non-negative, which puts the
/// rotation angle `2·acos(q[0])` in [0, π].
pub fn matrix_to_quaternion(m: &Matrix3) -> [f64; 4] {
    let trace = m[0][0] + m[1][1] + m[2][2];
    let cc = [
        1.0 + trace,
        1.0 + 2.0 * m[0][0] - trace,
        1.0 + 2.0 * m[1][1] - trace,
        1.0 + 2.0 * m[2][2] - trace,
    ];
    let largest = (0..4)
        .max_by(|&a, &b| cc[a].total_cmp(&cc[b]))
        .unwrap_or(0);
    let big = 0.5 * cc[largest].max(0.0).sqrt();
    let f = 0.25 / big;

    let mut q = match largest {
        0 => [
            big,
            (m[2][1] - m[1][2]) * f,
            (m[0][2] - m[2][0]) * f,
            (m[1][0] - m[0][1]) * f,
        ],
        1 => [
            (m[2][1] - m[1][2]) * f,
            big,
            (m[0][1] + m[1][0]) * f,
            (m[0][2] + m[2][0]) * f,
        ],
        2 => [
            (m[0][2] - m[2][0]) * f,
            (m[0][1] + m[1][0]) * f,
            big,
            (m[1][2] + m[2][1]) * f,
        ],
        _ => [
            (m[1][0] - m[0][1]) * f,
            (m[0][2] + m[2][0]) * f,
            (m[1][2] + m[2][1]) * f,
            big,
        ],
    };

    if q[0] < 0.0 {
        q.iter_mut().for_each(|c| *c = -*c);
    }
    q
}

/// Convert a scalar-first quaternion to a rotation matrix
///
/// The quaternion is normalized first; this is the inverse of
/// [`matrix_to_quaternion`] up to the sign of the quaternion.
pub fn quaternion_to_matrix(q: &[f64; 4]) -> Matrix3 {
    let n = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    let (w, x, y, z) = if n > 0.0 {
        (q[0] / n, q[1] / n, q[2] / n, q[3] / n)
    } else {
        (1.0, 0.0, 0.0, 0.0)
    };
    [
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - w * z),
            2.0 * (x * z + w * y),
        ],
        [
            2.0 * (x * y + w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - w * x),
        ],
        [
            2.0 * (x * z - w * y),
            2.0 * (y * z + w * x),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ]
}

/// Maximum absolute element-wise difference between two matrices
pub fn max_abs_difference(a: &Matrix3, b: &Matrix3) -> f64 {
    let diff = arr2(a) - arr2(b);
    diff.mapv(f64::abs).fold(0.0, |acc, &x| acc.max(x))
}

/// Check that a matrix is a proper rotation (orthonormal, determinant +1)
pub fn is_rotation(m: &Matrix3, tolerance: f64) -> bool {
    let product = mat_mul(m, &mat_transpose(m));
    let det = dot_product(&m[0], &cross_product(&m[1], &m[2]));
    max_abs_difference(&product, &IDENTITY) <= tolerance && (det - 1.0).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_radec_to_unit_vector_axes() {
        let v = radec_to_unit_vector(90.0, 0.0);
        assert_abs_diff_eq!(v[..], [0.0, 1.0, 0.0][..], epsilon = 1e-15);
        let v = radec_to_unit_vector(0.0, 90.0);
        assert_abs_diff_eq!(v[..], [0.0, 0.0, 1.0][..], epsilon = 1e-15);
    }

    #[test]
    fn test_radrec_scales_by_range() {
        let v = radrec(2.0, 0.0, 0.0);
        assert_eq!(v, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unit_cross_of_parallel_is_zero() {
        assert_eq!(unit_cross(&[1.0, 0.0, 0.0], &[3.0, 0.0, 0.0]), [0.0; 3]);
        let z = unit_cross(&[2.0, 0.0, 0.0], &[0.0, 5.0, 0.0]);
        assert_abs_diff_eq!(z[..], [0.0, 0.0, 1.0][..], epsilon = 1e-15);
    }

    #[test]
    fn test_angular_separation_extremes() {
        let x = [1.0, 0.0, 0.0];
        assert_eq!(angular_separation(&x, &x), 0.0);
        assert!((angular_separation(&x, &[0.0, 1.0, 0.0]) - FRAC_PI_2).abs() < 1e-15);
        assert!((angular_separation(&x, &[-1.0, 0.0, 0.0]) - PI).abs() < 1e-15);
        // Tiny angles survive where acos(dot) would round to zero
        let tiny = [1.0, 1e-10, 0.0];
        assert!((angular_separation(&x, &tiny) - 1e-10).abs() < 1e-20);
        assert_eq!(angular_separation(&x, &[0.0; 3]), 0.0);
    }

    #[test]
    fn test_axis_rotation_about_z() {
        let m = axis_rotation(FRAC_PI_2, 3).unwrap();
        let v = mat_vec(&m, &[1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(v[..], [0.0, -1.0, 0.0][..], epsilon = 1e-15);
        assert!(axis_rotation(0.1, 4).is_none());
    }

    #[test]
    fn test_quaternion_roundtrip_large_angle() {
        // 170 degrees about a skewed axis exercises the non-scalar Shepperd branches
        let m = mat_mul(
            &axis_rotation(170f64.to_radians(), 1).unwrap(),
            &axis_rotation(20f64.to_radians(), 2).unwrap(),
        );
        let q = matrix_to_quaternion(&m);
        assert!(q[0] >= 0.0);
        let back = quaternion_to_matrix(&q);
        assert!(max_abs_difference(&m, &back) < 1e-14);
    }

    #[test]
    fn test_quaternion_scalar_gives_rotation_angle() {
        let angle = 1.2345;
        let m = axis_rotation(angle, 3).unwrap();
        let q = matrix_to_quaternion(&m);
        assert!((2.0 * q[0].acos() - angle).abs() < 1e-14);
    }

    #[test]
    fn test_is_rotation_rejects_reflection() {
        assert!(is_rotation(&IDENTITY, 1e-12));
        let reflection = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]];
        assert!(!is_rotation(&reflection, 1e-12));
    }

    #[test]
    fn test_max_abs_difference() {
        let mut other = IDENTITY;
        other[1][2] = -0.25;
        assert_eq!(max_abs_difference(&IDENTITY, &other), 0.25);
    }
}
