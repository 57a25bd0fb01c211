//! Instrument field-of-view definitions from instrument kernels (IK)

use serde::{Deserialize, Serialize};

use crate::error::{EphemerisError, Result};
use crate::kernels::frames::angle_unit_scale;
use crate::kernels::pool::KernelPool;
use crate::utils::vector_math::{cross_product, normalize_vector, vector_magnitude};

/// Field-of-view shape as named in `INS<id>_FOV_SHAPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FovShape {
    Circle,
    Ellipse,
    Rectangle,
    Polygon,
}

impl FovShape {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CIRCLE" => Some(FovShape::Circle),
            "ELLIPSE" => Some(FovShape::Ellipse),
            "RECTANGLE" => Some(FovShape::Rectangle),
            "POLYGON" => Some(FovShape::Polygon),
            _ => None,
        }
    }
}

/// Static field-of-view geometry of an instrument in its own frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub shape: FovShape,
    /// Frame the boresight and boundary vectors are expressed in
    pub frame: String,
    pub boresight: [f64; 3],
    pub boundary: Vec<[f64; 3]>,
}

impl FieldOfView {
    /// Read the FOV of instrument `id` from the pool
    pub fn from_pool(pool: &KernelPool, id: i32) -> Result<Self> {
        let key = |suffix: &str| format!("INS{id}_{suffix}");
        let fail = |message: String| EphemerisError::InvalidFieldOfView { id, message };

        let shape_name = pool
            .string(&key("FOV_SHAPE"))
            .ok_or_else(|| fail(format!("{} not found", key("FOV_SHAPE"))))?;
        let shape = FovShape::parse(shape_name)
            .ok_or_else(|| fail(format!("unknown FOV shape '{shape_name}'")))?;
        let frame = pool
            .string(&key("FOV_FRAME"))
            .ok_or_else(|| fail(format!("{} not found", key("FOV_FRAME"))))?
            .trim()
            .to_uppercase();
        let boresight = pool
            .fixed_numbers::<3>(&key("BORESIGHT"))
            .ok_or_else(|| fail(format!("{} must hold 3 values", key("BORESIGHT"))))?;
        if vector_magnitude(&boresight) == 0.0 {
            return Err(fail("boresight is the zero vector".to_string()));
        }

        let class_spec = pool
            .string(&key("FOV_CLASS_SPEC"))
            .unwrap_or("CORNERS")
            .trim()
            .to_uppercase();

        let boundary = match class_spec.as_str() {
            "CORNERS" => {
                let values = pool
                    .numbers(&key("FOV_BOUNDARY_CORNERS"))
                    .or_else(|| pool.numbers(&key("FOV_BOUNDARY")))
                    .ok_or_else(|| fail("FOV boundary corners not found".to_string()))?;
                if values.is_empty() || values.len() % 3 != 0 {
                    return Err(fail(format!(
                        "boundary needs a multiple of 3 values, found {}",
                        values.len()
                    )));
                }
                values
                    .chunks_exact(3)
                    .map(|c| [c[0], c[1], c[2]])
                    .collect()
            }
            "ANGLES" => angles_boundary(pool, id, shape, &boresight)?,
            other => return Err(fail(format!("unknown FOV class spec '{other}'"))),
        };

        Ok(Self {
            shape,
            frame,
            boresight,
            boundary,
        })
    }
}

/// Boundary vectors for an angle-specified FOV
///
/// The reference vector is made orthogonal to the boresight; CIRCLE yields one
/// vector, ELLIPSE two (reference then cross direction) and RECTANGLE four
/// corners in order (+ref,+cross), (-ref,+cross), (-ref,-cross), (+ref,-cross).
fn angles_boundary(
    pool: &KernelPool,
    id: i32,
    shape: FovShape,
    boresight: &[f64; 3],
) -> Result<Vec<[f64; 3]>> {
    let key = |suffix: &str| format!("INS{id}_{suffix}");
    let fail = |message: String| EphemerisError::InvalidFieldOfView { id, message };

    let reference = pool
        .fixed_numbers::<3>(&key("FOV_REF_VECTOR"))
        .ok_or_else(|| fail("FOV_REF_VECTOR must hold 3 values".to_string()))?;
    let units = pool
        .string(&key("FOV_ANGLE_UNITS"))
        .ok_or_else(|| fail("FOV_ANGLE_UNITS not found".to_string()))?;
    let scale =
        angle_unit_scale(units).ok_or_else(|| fail(format!("unknown angle units '{units}'")))?;
    let ref_angle = pool
        .number(&key("FOV_REF_ANGLE"))
        .ok_or_else(|| fail("FOV_REF_ANGLE not found".to_string()))?
        * scale;

    let b = normalize_vector(boresight);
    // Component of the reference vector perpendicular to the boresight
    let cross_dir = normalize_vector(&cross_product(&b, &reference));
    let r = normalize_vector(&cross_product(&cross_dir, &b));
    if vector_magnitude(&r) == 0.0 {
        return Err(fail("FOV_REF_VECTOR is parallel to the boresight".to_string()));
    }

    let tilt = |toward: &[f64; 3], angle: f64| -> [f64; 3] {
        let (s, c) = angle.sin_cos();
        [
            c * b[0] + s * toward[0],
            c * b[1] + s * toward[1],
            c * b[2] + s * toward[2],
        ]
    };

    match shape {
        FovShape::Circle => Ok(vec![tilt(&r, ref_angle)]),
        FovShape::Ellipse | FovShape::Rectangle => {
            let cross_angle = pool
                .number(&key("FOV_CROSS_ANGLE"))
                .ok_or_else(|| fail("FOV_CROSS_ANGLE not found".to_string()))?
                * scale;
            if shape == FovShape::Ellipse {
                return Ok(vec![tilt(&r, ref_angle), tilt(&cross_dir, cross_angle)]);
            }
            let (tr, tc) = (ref_angle.tan(), cross_angle.tan());
            let corner = |sr: f64, sc: f64| {
                normalize_vector(&[
                    b[0] + sr * tr * r[0] + sc * tc * cross_dir[0],
                    b[1] + sr * tr * r[1] + sc * tc * cross_dir[1],
                    b[2] + sr * tr * r[2] + sc * tc * cross_dir[2],
                ])
            };
            Ok(vec![
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
            ])
        }
        FovShape::Polygon => Err(fail(
            "POLYGON fields of view must be given as CORNERS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::vector_math::{angular_separation, dot_product};

    const IK: &str = r#"
\begindata
INS-99100_FOV_FRAME            = 'TEST_INST'
INS-99100_FOV_SHAPE            = 'RECTANGLE'
INS-99100_BORESIGHT            = ( 0.0 0.0 1.0 )
INS-99100_FOV_BOUNDARY_CORNERS = ( 0.1 0.1 1.0  -0.1 0.1 1.0
                                  -0.1 -0.1 1.0  0.1 -0.1 1.0 )

INS-99200_FOV_FRAME            = 'TEST_MOUNT'
INS-99200_FOV_SHAPE            = 'CIRCLE'
INS-99200_BORESIGHT            = ( 1.0 0.0 0.0 )
INS-99200_FOV_CLASS_SPEC       = 'ANGLES'
INS-99200_FOV_REF_VECTOR       = ( 0.5 1.0 0.0 )
INS-99200_FOV_REF_ANGLE        = 2.0
INS-99200_FOV_ANGLE_UNITS      = 'DEGREES'

INS-99300_FOV_FRAME            = 'TEST_MOUNT'
INS-99300_FOV_SHAPE            = 'RECTANGLE'
INS-99300_BORESIGHT            = ( 0.0 0.0 2.0 )
INS-99300_FOV_CLASS_SPEC       = 'ANGLES'
INS-99300_FOV_REF_VECTOR       = ( 1.0 0.0 0.0 )
INS-99300_FOV_REF_ANGLE        = 3.0
INS-99300_FOV_CROSS_ANGLE      = 1.0
INS-99300_FOV_ANGLE_UNITS      = 'DEGREES'
\begintext
"#;

    fn pool() -> KernelPool {
        let mut pool = KernelPool::new();
        pool.load_str("test.ti", IK).unwrap();
        pool
    }

    #[test]
    fn test_corners_fov() {
        let fov = FieldOfView::from_pool(&pool(), -99100).unwrap();
        assert_eq!(fov.shape, FovShape::Rectangle);
        assert_eq!(fov.frame, "TEST_INST");
        assert_eq!(fov.boresight, [0.0, 0.0, 1.0]);
        assert_eq!(fov.boundary.len(), 4);
        assert_eq!(fov.boundary[1], [-0.1, 0.1, 1.0]);
    }

    #[test]
    fn test_circle_from_angles() {
        let fov = FieldOfView::from_pool(&pool(), -99200).unwrap();
        assert_eq!(fov.boundary.len(), 1);
        let edge = fov.boundary[0];
        let sep = angular_separation(&fov.boresight, &edge);
        assert!((sep - 2f64.to_radians()).abs() < 1e-12);
        // Edge leans toward +Y, the perpendicular part of the reference vector
        assert!(edge[1] > 0.0 && edge[2].abs() < 1e-15);
    }

    #[test]
    fn test_rectangle_from_angles() {
        let fov = FieldOfView::from_pool(&pool(), -99300).unwrap();
        assert_eq!(fov.boundary.len(), 4);
        for corner in &fov.boundary {
            let along_ref = corner[0].atan2(corner[2]).abs();
            let along_cross = corner[1].atan2(corner[2]).abs();
            assert!((along_ref - 3f64.to_radians()).abs() < 1e-12);
            assert!((along_cross - 1f64.to_radians()).abs() < 1e-12);
        }
        assert!(dot_product(&fov.boundary[0], &[1.0, 0.0, 0.0]) > 0.0);
        assert!(dot_product(&fov.boundary[1], &[1.0, 0.0, 0.0]) < 0.0);
    }

    #[test]
    fn test_missing_instrument() {
        let err = FieldOfView::from_pool(&pool(), -1).unwrap_err();
        assert!(matches!(err, EphemerisError::InvalidFieldOfView { id: -1, .. }));
    }
}
