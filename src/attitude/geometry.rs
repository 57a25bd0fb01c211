//! Frame-tagged vectors and rotations, and the two-vector attitude construction
//!
//! Every vector carries its reference frame in its type, and a rotation is
//! typed by the frames it maps between, so applying a J2000 -> spacecraft
//! rotation to a spacecraft-frame vector does not compile.

use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

use crate::utils::config::DEGENERACY_TOLERANCE;
use crate::utils::vector_math::{
    angular_separation, cross_product, dot_product, is_rotation, mat_mul, mat_transpose, mat_vec,
    matrix_to_quaternion, max_abs_difference, normalize_vector, unit_cross, vector_magnitude,
    Matrix3,
};

/// Tolerance used when accepting an externally supplied matrix as a rotation
const ROTATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate geometry: {0} are parallel or zero")]
    Degenerate(&'static str),

    #[error("Matrix from {from} to {to} is not a rotation")]
    NotARotation {
        from: &'static str,
        to: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Marker for a named reference frame
pub trait FrameTag {
    const NAME: &'static str;
}

/// J2000 inertial frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inertial;

/// Spacecraft body frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spacecraft;

/// Instrument frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument;

impl FrameTag for Inertial {
    const NAME: &'static str = "J2000";
}

impl FrameTag for Spacecraft {
    const NAME: &'static str = "SPACECRAFT";
}

impl FrameTag for Instrument {
    const NAME: &'static str = "INSTRUMENT";
}

/// A 3-vector expressed in frame `F`
pub struct Vector<F> {
    xyz: [f64; 3],
    frame: PhantomData<F>,
}

// Manual impls: derives would put bounds on the marker type
impl<F> Clone for Vector<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for Vector<F> {}

impl<F> PartialEq for Vector<F> {
    fn eq(&self, other: &Self) -> bool {
        self.xyz == other.xyz
    }
}

impl<F: FrameTag> fmt::Debug for Vector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}>{:?}", F::NAME, self.xyz)
    }
}

impl<F: FrameTag> Vector<F> {
    pub const fn new(xyz: [f64; 3]) -> Self {
        Self {
            xyz,
            frame: PhantomData,
        }
    }

    pub fn xyz(&self) -> [f64; 3] {
        self.xyz
    }

    pub fn norm(&self) -> f64 {
        vector_magnitude(&self.xyz)
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn unit(&self) -> Self {
        Self::new(normalize_vector(&self.xyz))
    }

    pub fn dot(&self, other: &Self) -> f64 {
        dot_product(&self.xyz, &other.xyz)
    }

    /// Unit vector orthogonal to both `self` and `other`, along self × other
    pub fn unit_cross(&self, other: &Self, what: &'static str) -> Result<Self> {
        check_not_parallel(&self.xyz, &other.xyz, what)?;
        Ok(Self::new(unit_cross(&self.xyz, &other.xyz)))
    }

    /// Angle between two vectors in radians
    pub fn separation(&self, other: &Self) -> f64 {
        angular_separation(&self.xyz, &other.xyz)
    }
}

/// A rotation mapping vectors in frame `From` to vectors in frame `To`
pub struct Rotation<From, To> {
    matrix: Matrix3,
    frames: PhantomData<(From, To)>,
}

impl<From, To> Clone for Rotation<From, To> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<From, To> Copy for Rotation<From, To> {}

impl<From: FrameTag, To: FrameTag> fmt::Debug for Rotation<From, To> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotation<{} -> {}>{:?}", From::NAME, To::NAME, self.matrix)
    }
}

impl<From: FrameTag, To: FrameTag> Rotation<From, To> {
    /// Accept a matrix from outside the kernel after checking it is a rotation
    pub fn from_matrix(matrix: Matrix3) -> Result<Self> {
        if is_rotation(&matrix, ROTATION_TOLERANCE) {
            Ok(Self::new_unchecked(matrix))
        } else {
            Err(GeometryError::NotARotation {
                from: From::NAME,
                to: To::NAME,
            })
        }
    }

    const fn new_unchecked(matrix: Matrix3) -> Self {
        Self {
            matrix,
            frames: PhantomData,
        }
    }

    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    pub fn apply(&self, v: &Vector<From>) -> Vector<To> {
        Vector::new(mat_vec(&self.matrix, &v.xyz))
    }

    /// The inverse rotation
    pub fn transpose(&self) -> Rotation<To, From> {
        Rotation::new_unchecked(mat_transpose(&self.matrix))
    }

    /// `self ∘ first`: apply `first`, then `self`
    pub fn compose<Pre: FrameTag>(&self, first: &Rotation<Pre, From>) -> Rotation<Pre, To> {
        Rotation::new_unchecked(mat_mul(&self.matrix, &first.matrix))
    }

    /// Rotation angle in [0, π] from the scalar part of the equivalent quaternion
    pub fn angle(&self) -> f64 {
        let q = matrix_to_quaternion(&self.matrix);
        2.0 * q[0].clamp(-1.0, 1.0).acos()
    }

    /// Maximum absolute element-wise difference to another rotation
    pub fn max_abs_difference(&self, other: &Self) -> f64 {
        max_abs_difference(&self.matrix, &other.matrix)
    }
}

fn check_not_parallel(a: &[f64; 3], b: &[f64; 3], what: &'static str) -> Result<()> {
    let sine = vector_magnitude(&cross_product(&normalize_vector(a), &normalize_vector(b)));
    if sine < DEGENERACY_TOLERANCE {
        Err(GeometryError::Degenerate(what))
    } else {
        Ok(())
    }
}

/// Orthonormal basis (as matrix rows) whose first axis is `primary` and whose
/// third axis lies in the plane of `primary` and `secondary`, on the side of
/// `secondary`
fn basis(primary: &[f64; 3], secondary: &[f64; 3], what: &'static str) -> Result<Matrix3> {
    check_not_parallel(primary, secondary, what)?;
    let x = normalize_vector(primary);
    let y = unit_cross(secondary, &x);
    let z = cross_product(&x, &y);
    Ok([x, y, z])
}

/// Rotation that takes `aim_point` onto `virtual_boresight` and puts `roll`
/// and `roll_reference` in the same half-plane bounded by that axis
///
/// `aim_point`/`roll_reference` are in the source frame (typically J2000),
/// `virtual_boresight`/`roll` in the target frame (typically the spacecraft
/// body frame). Inputs need not be unit vectors. Fails if either pair is
/// parallel, antiparallel or contains a zero vector.
pub fn build_rotation<From: FrameTag, To: FrameTag>(
    virtual_boresight: &Vector<To>,
    aim_point: &Vector<From>,
    roll: &Vector<To>,
    roll_reference: &Vector<From>,
) -> Result<Rotation<From, To>> {
    let source = basis(
        &aim_point.xyz,
        &roll_reference.xyz,
        "aim point and roll reference",
    )?;
    let target = basis(
        &virtual_boresight.xyz,
        &roll.xyz,
        "virtual boresight and roll",
    )?;
    Ok(Rotation::new_unchecked(mat_mul(
        &mat_transpose(&target),
        &source,
    )))
}
