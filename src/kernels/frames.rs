//! Reference frame registry
//!
//! Resolves rotations between the built-in inertial frames (J2000 and
//! ECLIPJ2000) and fixed-offset (TK, class 4) frames defined in frame kernels.
//! Frames of other classes (CK, PCK, dynamic) are opaque: they can terminate a
//! TK chain, so two frames hanging off the same spacecraft frame can be related
//! without orientation data, but no rotation through them is computed.

use crate::error::{EphemerisError, Result};
use crate::kernels::pool::KernelPool;
use crate::utils::config::J2000_OBLIQUITY_ARCSEC;
use crate::utils::vector_math::{
    axis_rotation, is_rotation, mat_mul, mat_transpose, quaternion_to_matrix, Matrix3, IDENTITY,
};

pub const J2000: &str = "J2000";
pub const ECLIPJ2000: &str = "ECLIPJ2000";

/// TK frame class code
const TK_FRAME_CLASS: i32 = 4;
const MAX_CHAIN_DEPTH: usize = 32;
const ROTATION_TOLERANCE: f64 = 1e-6;

/// One step up a frame chain
#[derive(Debug, Clone)]
struct Parent {
    name: String,
    /// Rotates vectors from the child frame into `name`
    to_parent: Matrix3,
}

/// Rotation mapping vectors in `from` to vectors in `to`
///
/// Only time-invariant frames are handled, so no epoch is needed.
pub fn frame_rotation(pool: &KernelPool, from: &str, to: &str) -> Result<Matrix3> {
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();
    for name in [&from, &to] {
        if !is_known_frame(pool, name) {
            return Err(EphemerisError::UnknownFrame(name.clone()));
        }
    }
    if from == to {
        return Ok(IDENTITY);
    }

    let from_chain = chain_to_root(pool, &from)?;

    let mut current = to.clone();
    let mut to_current = IDENTITY;
    for _ in 0..MAX_CHAIN_DEPTH {
        if let Some((_, from_to_current)) = from_chain.iter().find(|(name, _)| *name == current) {
            // from -> common -> to
            return Ok(mat_mul(&mat_transpose(&to_current), from_to_current));
        }
        match parent_of(pool, &current)? {
            Some(parent) => {
                to_current = mat_mul(&parent.to_parent, &to_current);
                current = parent.name;
            }
            None => {
                return Err(EphemerisError::NoFramePath { from, to });
            }
        }
    }

    Err(EphemerisError::InvalidFrame {
        frame: to,
        message: "frame chain is too deep or cyclic".to_string(),
    })
}

/// All frames reachable from `start` with the rotation start -> frame
fn chain_to_root(pool: &KernelPool, start: &str) -> Result<Vec<(String, Matrix3)>> {
    let mut chain = vec![(start.to_string(), IDENTITY)];
    while let Some(parent) = parent_of(pool, &chain[chain.len() - 1].0)? {
        if chain.len() > MAX_CHAIN_DEPTH {
            return Err(EphemerisError::InvalidFrame {
                frame: start.to_string(),
                message: "frame chain is too deep or cyclic".to_string(),
            });
        }
        let (_, start_to_child) = &chain[chain.len() - 1];
        let start_to_parent = mat_mul(&parent.to_parent, start_to_child);
        chain.push((parent.name, start_to_parent));
    }
    Ok(chain)
}

fn is_known_frame(pool: &KernelPool, name: &str) -> bool {
    name == J2000 || name == ECLIPJ2000 || frame_id(pool, name).is_some()
}

/// Frame ID code from `FRAME_<name>`
pub fn frame_id(pool: &KernelPool, name: &str) -> Option<i32> {
    match name {
        J2000 => Some(1),
        ECLIPJ2000 => Some(17),
        _ => pool.integer(&format!("FRAME_{name}")),
    }
}

/// Rotation from ECLIPJ2000 to J2000
pub fn ecliptic_to_j2000() -> Matrix3 {
    let obliquity = (J2000_OBLIQUITY_ARCSEC / 3600.0).to_radians();
    axis_rotation(obliquity, 1).map_or(IDENTITY, |m| mat_transpose(&m))
}

fn parent_of(pool: &KernelPool, name: &str) -> Result<Option<Parent>> {
    if name == J2000 {
        return Ok(None);
    }
    if name == ECLIPJ2000 {
        return Ok(Some(Parent {
            name: J2000.to_string(),
            to_parent: ecliptic_to_j2000(),
        }));
    }

    // Undefined frames reached as a RELATIVE are opaque roots
    let Some(id) = frame_id(pool, name) else {
        return Ok(None);
    };
    if pool.integer(&format!("FRAME_{id}_CLASS")) != Some(TK_FRAME_CLASS) {
        return Ok(None);
    }

    let tk = TkKeys::new(pool, id, name);
    let relative = tk
        .string("RELATIVE")
        .ok_or_else(|| invalid(name, "missing TKFRAME RELATIVE"))?
        .trim()
        .to_uppercase();
    let spec = tk
        .string("SPEC")
        .ok_or_else(|| invalid(name, "missing TKFRAME SPEC"))?
        .trim()
        .to_uppercase();

    let to_parent = match spec.as_str() {
        "MATRIX" => {
            let v = tk
                .fixed::<9>("MATRIX")
                .ok_or_else(|| invalid(name, "TKFRAME MATRIX needs 9 values"))?;
            // Stored in column order
            [
                [v[0], v[3], v[6]],
                [v[1], v[4], v[7]],
                [v[2], v[5], v[8]],
            ]
        }
        "ANGLES" => {
            let angles = tk
                .fixed::<3>("ANGLES")
                .ok_or_else(|| invalid(name, "TKFRAME ANGLES needs 3 values"))?;
            let axes = tk
                .fixed::<3>("AXES")
                .ok_or_else(|| invalid(name, "TKFRAME AXES needs 3 values"))?;
            let units = tk.string("UNITS").unwrap_or("RADIANS");
            let scale = angle_unit_scale(units)
                .ok_or_else(|| invalid(name, &format!("unknown angle units '{units}'")))?;

            // Relative -> frame is [a3]ax3 [a2]ax2 [a1]ax1
            let mut relative_to_frame = IDENTITY;
            for (angle, axis) in angles.iter().zip(axes.iter()) {
                let step = axis_rotation(angle * scale, axis.round() as i32)
                    .ok_or_else(|| invalid(name, &format!("invalid rotation axis {axis}")))?;
                relative_to_frame = mat_mul(&step, &relative_to_frame);
            }
            mat_transpose(&relative_to_frame)
        }
        "QUATERNION" => {
            let q = tk
                .fixed::<4>("Q")
                .ok_or_else(|| invalid(name, "TKFRAME Q needs 4 values"))?;
            quaternion_to_matrix(&q)
        }
        other => return Err(invalid(name, &format!("unsupported TKFRAME SPEC '{other}'"))),
    };

    if !is_rotation(&to_parent, ROTATION_TOLERANCE) {
        return Err(invalid(name, "TK rotation is not orthonormal"));
    }

    Ok(Some(Parent {
        name: relative,
        to_parent,
    }))
}

/// `TKFRAME_*` variables may be keyed by frame ID or by frame name
struct TkKeys<'a> {
    pool: &'a KernelPool,
    id: i32,
    name: &'a str,
}

impl<'a> TkKeys<'a> {
    fn new(pool: &'a KernelPool, id: i32, name: &'a str) -> Self {
        Self { pool, id, name }
    }

    fn key(&self, suffix: &str) -> String {
        let by_id = format!("TKFRAME_{}_{suffix}", self.id);
        if self.pool.contains(&by_id) {
            by_id
        } else {
            format!("TKFRAME_{}_{suffix}", self.name)
        }
    }

    fn string(&self, suffix: &str) -> Option<&'a str> {
        self.pool.string(&self.key(suffix))
    }

    fn fixed<const N: usize>(&self, suffix: &str) -> Option<[f64; N]> {
        self.pool.fixed_numbers::<N>(&self.key(suffix))
    }
}

/// Radians per unit for kernel angle unit names
pub fn angle_unit_scale(units: &str) -> Option<f64> {
    let degree = 1f64.to_radians();
    match units.trim().to_uppercase().as_str() {
        "RADIANS" => Some(1.0),
        "DEGREES" => Some(degree),
        "ARCMINUTES" => Some(degree / 60.0),
        "ARCSECONDS" => Some(degree / 3600.0),
        "HOURANGLE" => Some(15.0 * degree),
        "MINUTEANGLE" => Some(15.0 * degree / 60.0),
        "SECONDANGLE" => Some(15.0 * degree / 3600.0),
        _ => None,
    }
}

fn invalid(frame: &str, message: &str) -> EphemerisError {
    EphemerisError::InvalidFrame {
        frame: frame.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::vector_math::{mat_vec, max_abs_difference};
    use approx::assert_abs_diff_eq;

    const FK: &str = r#"
\begindata
FRAME_TEST_SC            = -99000
FRAME_-99000_NAME        = 'TEST_SC'
FRAME_-99000_CLASS       = 3

FRAME_TEST_INST          = -99100
FRAME_-99100_NAME        = 'TEST_INST'
FRAME_-99100_CLASS       = 4
TKFRAME_-99100_RELATIVE  = 'TEST_SC'
TKFRAME_-99100_SPEC      = 'ANGLES'
TKFRAME_-99100_ANGLES    = ( 0.0, 0.0, 90.0 )
TKFRAME_-99100_AXES      = ( 1, 2, 3 )
TKFRAME_-99100_UNITS     = 'DEGREES'

FRAME_TEST_MOUNT         = -99200
FRAME_-99200_NAME        = 'TEST_MOUNT'
FRAME_-99200_CLASS       = 4
TKFRAME_TEST_MOUNT_RELATIVE = 'TEST_SC'
TKFRAME_TEST_MOUNT_SPEC     = 'MATRIX'
TKFRAME_TEST_MOUNT_MATRIX   = ( 0 0 1
                                0 1 0
                               -1 0 0 )

FRAME_TEST_Q             = -99300
FRAME_-99300_CLASS       = 4
TKFRAME_-99300_RELATIVE  = 'J2000'
TKFRAME_-99300_SPEC      = 'QUATERNION'
TKFRAME_-99300_Q         = ( 0.7071067811865476, 0.0, 0.0, 0.7071067811865476 )
\begintext
"#;

    fn pool() -> KernelPool {
        let mut pool = KernelPool::new();
        pool.load_str("test.tf", FK).unwrap();
        pool
    }

    #[test]
    fn test_nep_in_j2000() {
        let pool = KernelPool::new();
        let m = frame_rotation(&pool, "ECLIPJ2000", "J2000").unwrap();
        let nep = mat_vec(&m, &[0.0, 0.0, 1.0]);
        let eps = (J2000_OBLIQUITY_ARCSEC / 3600.0).to_radians();
        assert_abs_diff_eq!(
            nep[..],
            [0.0, -eps.sin(), eps.cos()][..],
            epsilon = 1e-15
        );
        let back = frame_rotation(&pool, "j2000", "eclipj2000").unwrap();
        assert!(max_abs_difference(&back, &mat_transpose(&m)) < 1e-15);
    }

    #[test]
    fn test_angles_frame_relative_to_opaque_spacecraft() {
        // Relative -> instrument is a +90 degree frame rotation about Z, so the
        // instrument +X axis is the spacecraft +Y axis.
        let m = frame_rotation(&pool(), "TEST_INST", "TEST_SC").unwrap();
        let v = mat_vec(&m, &[1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(v[..], [0.0, 1.0, 0.0][..], epsilon = 1e-15);
    }

    #[test]
    fn test_matrix_frame_keyed_by_name() {
        let m = frame_rotation(&pool(), "TEST_MOUNT", "TEST_SC").unwrap();
        // Column order: first column (0, 0, 1) is the image of mount +X
        let v = mat_vec(&m, &[1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(v[..], [0.0, 0.0, 1.0][..], epsilon = 1e-15);
    }

    #[test]
    fn test_sibling_frames_through_common_parent() {
        let pool = pool();
        let inst_to_mount = frame_rotation(&pool, "TEST_INST", "TEST_MOUNT").unwrap();
        let inst_to_sc = frame_rotation(&pool, "TEST_INST", "TEST_SC").unwrap();
        let mount_to_sc = frame_rotation(&pool, "TEST_MOUNT", "TEST_SC").unwrap();
        let expected = mat_mul(&mat_transpose(&mount_to_sc), &inst_to_sc);
        assert!(max_abs_difference(&inst_to_mount, &expected) < 1e-15);
    }

    #[test]
    fn test_quaternion_frame_joins_inertial_tree() {
        let pool = pool();
        let m = frame_rotation(&pool, "TEST_Q", "ECLIPJ2000").unwrap();
        let q_to_j2000 = frame_rotation(&pool, "TEST_Q", "J2000").unwrap();
        let expected = mat_mul(&mat_transpose(&ecliptic_to_j2000()), &q_to_j2000);
        assert!(max_abs_difference(&m, &expected) < 1e-15);
    }

    #[test]
    fn test_no_path_and_unknown_frames() {
        let pool = pool();
        assert!(matches!(
            frame_rotation(&pool, "TEST_INST", "J2000"),
            Err(EphemerisError::NoFramePath { .. })
        ));
        assert!(matches!(
            frame_rotation(&pool, "NOPE", "J2000"),
            Err(EphemerisError::UnknownFrame(_))
        ));
        assert!(matches!(
            frame_rotation(&pool, "J2000", "NOPE"),
            Err(EphemerisError::UnknownFrame(_))
        ));
        assert!(matches!(
            frame_rotation(&pool, "NOPE", "nope"),
            Err(EphemerisError::UnknownFrame(name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_same_frame_is_identity() {
        let pool = pool();
        assert_eq!(frame_rotation(&pool, "J2000", "j2000").unwrap(), IDENTITY);
        assert_eq!(frame_rotation(&pool, "TEST_INST", "TEST_INST").unwrap(), IDENTITY);
    }

    #[test]
    fn test_frame_id() {
        let pool = pool();
        assert_eq!(frame_id(&pool, "TEST_INST"), Some(-99100));
        assert_eq!(frame_id(&pool, ECLIPJ2000), Some(17));
        assert_eq!(frame_id(&pool, "NOPE"), None);
    }

    #[test]
    fn test_non_orthonormal_matrix_rejected() {
        let mut pool = KernelPool::new();
        pool.load_str(
            "bad.tf",
            "\\begindata\nFRAME_BAD = -1\nFRAME_-1_CLASS = 4\nTKFRAME_-1_RELATIVE = 'J2000'\nTKFRAME_-1_SPEC = 'MATRIX'\nTKFRAME_-1_MATRIX = ( 2 0 0 0 1 0 0 0 1 )\n",
        )
        .unwrap();
        assert!(matches!(
            frame_rotation(&pool, "BAD", "J2000"),
            Err(EphemerisError::InvalidFrame { .. })
        ));
    }
}
