//! End-to-end slew/scan runs against a fixed-geometry provider
use hifitime::Epoch;
use serde_json::Value;
use std::path::{Path, PathBuf};

use rex_slew_scan::kernels::frames::ecliptic_to_j2000;
use rex_slew_scan::kernels::{FieldOfView, FovShape};
use rex_slew_scan::utils::vector_math::{
    angular_separation, dot_product, mat_mul, mat_transpose, max_abs_difference, radec_to_unit_vector,
    vector_magnitude, Matrix3, IDENTITY,
};
use rex_slew_scan::{
    compute_maneuver, run, EphemerisError, EphemerisProvider, GeometryError, Invocation,
    LightTimeCorrection, ManeuverConfig, ManeuverError, RunOptions,
};

/// REX +Z is spacecraft +Y
const REX_MOUNT: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]];

/// Provider with a constant Earth direction and a fixed REX mounting
struct FixedGeometry {
    earth: [f64; 3],
    boresight: [f64; 3],
    mount: Matrix3,
    loaded: Vec<PathBuf>,
}

impl FixedGeometry {
    fn new(earth: [f64; 3]) -> Self {
        Self {
            earth,
            boresight: [0.0, 0.0, 1.0],
            mount: REX_MOUNT,
            loaded: Vec::new(),
        }
    }
}

impl EphemerisProvider for FixedGeometry {
    fn load_definitions(&mut self, path: &Path) -> Result<(), EphemerisError> {
        if path.to_string_lossy().contains("missing") {
            return Err(EphemerisError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        self.loaded.push(path.to_path_buf());
        Ok(())
    }

    fn utc_to_epoch(&self, utc: &str) -> Result<Epoch, EphemerisError> {
        utc.parse::<Epoch>()
            .map_err(|e| EphemerisError::InvalidTime(format!("{utc}: {e}")))
    }

    fn body_direction(
        &self,
        target: &str,
        _epoch: Epoch,
        frame: &str,
        correction: LightTimeCorrection,
        observer: &str,
    ) -> Result<[f64; 3], EphemerisError> {
        assert_eq!((target, frame, observer), ("EARTH", "J2000", "NH"));
        assert_eq!(correction, LightTimeCorrection::LightTime);
        // About 32 AU
        let range = 4.8e9;
        Ok(self.earth.map(|c| c * range))
    }

    fn frame_rotation(&self, from: &str, to: &str, _epoch: Epoch) -> Result<Matrix3, EphemerisError> {
        match (from, to) {
            ("NH_REX", "NH_SPACECRAFT") => Ok(self.mount),
            ("ECLIPJ2000", "J2000") => Ok(ecliptic_to_j2000()),
            _ => Err(EphemerisError::NoFramePath {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    fn instrument_fov(&self, instrument_id: i32) -> Result<FieldOfView, EphemerisError> {
        assert_eq!(instrument_id, -98700);
        Ok(FieldOfView {
            shape: FovShape::Circle,
            frame: "NH_REX".to_string(),
            boresight: self.boresight,
            boundary: vec![[0.02, 0.0, 1.0]],
        })
    }

    fn name_to_id(&self, name: &str) -> Result<i32, EphemerisError> {
        match name {
            "NH_REX" => Ok(-98700),
            _ => Err(EphemerisError::ObjectNotFound(name.to_string())),
        }
    }
}

fn invocation(kernels: &[&str]) -> Invocation {
    Invocation {
        utc: "2015-07-14T12:00:00 UTC".to_string(),
        kernels: kernels.iter().map(PathBuf::from).collect(),
        options: RunOptions::default(),
    }
}

fn is_orthonormal(m: &Matrix3) -> bool {
    max_abs_difference(&mat_mul(m, &mat_transpose(m)), &IDENTITY) < 1e-12
}

#[test]
fn test_full_run_writes_consistent_report() {
    let earth = radec_to_unit_vector(285.0, -21.0);
    let mut provider = FixedGeometry::new(earth);
    let mut out = Vec::new();

    let report = run(
        &mut provider,
        &ManeuverConfig::default(),
        &invocation(&["a.tls", "b.bsp", "c.tf"]),
        &mut out,
    )
    .unwrap();

    assert_eq!(provider.loaded.len(), 3);

    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with('\n'));
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["ScanBegin"]["virtualBoresight"][1].as_f64().unwrap(), 1.0);

    let checks = &report.error_checks;
    for value in [
        checks.slew_err,
        checks.scan_err,
        checks.scan_begin_err,
        checks.scan_end_err,
        checks.preslew_err,
    ] {
        assert!(value.abs() < 1e-9, "{checks:?}");
    }

    // Scan axis is orthogonal to both targets and identical in both groups
    let axis = report.scan_begin.roll_reference;
    assert!(dot_product(&axis, &report.scan_begin.aim_point).abs() < 1e-12);
    assert!(dot_product(&axis, &report.scan_end.aim_point).abs() < 1e-12);
    assert!((vector_magnitude(&axis) - 1.0).abs() < 1e-12);
    assert_eq!(report.scan_begin.roll, report.scan_end.roll);

    // Minimum slew axis is orthogonal to Earth and the scan start
    let min_slew = report.misc.min_slew_axis_inertial;
    assert!(dot_product(&min_slew, &earth).abs() < 1e-12);
    assert!(dot_product(&min_slew, &report.scan_begin.aim_point).abs() < 1e-12);
}

#[test]
fn test_attitudes_point_the_rex_boresight() {
    let earth = radec_to_unit_vector(285.0, -21.0);
    let provider = FixedGeometry::new(earth);
    let (sequence, checks) =
        compute_maneuver(&provider, &ManeuverConfig::default(), "2015-07-14T12:00:00 UTC").unwrap();

    assert!(checks.within(1e-9));
    for attitude in [&sequence.pre_slew, &sequence.scan_begin, &sequence.scan_end] {
        let m = attitude.rotation.matrix();
        assert!(is_orthonormal(&m));
        let pointed = attitude.rotation.apply(&attitude.aim_point);
        assert!(angular_separation(&pointed.xyz(), &[0.0, 1.0, 0.0]) < 1e-12);
    }

    // Scan targets sit 60 degrees apart on the RA = 10 deg meridian
    let scan = sequence
        .scan_begin
        .aim_point
        .separation(&sequence.scan_end.aim_point);
    assert!((scan - 60f64.to_radians()).abs() < 1e-12);
    assert!(
        (sequence.boresight_at_end.separation(&sequence.scan_begin.virtual_boresight) - scan).abs()
            < 1e-12
    );
}

#[test]
fn test_boresight_along_x_with_earth_at_pole() {
    let provider = FixedGeometry {
        earth: [0.0, 0.0, 1.0],
        boresight: [1.0, 0.0, 0.0],
        mount: IDENTITY,
        loaded: Vec::new(),
    };
    let (sequence, checks) =
        compute_maneuver(&provider, &ManeuverConfig::default(), "2015-07-14T12:00:00 UTC").unwrap();

    assert!(checks.within(1e-9), "{checks:?}");
    for attitude in [&sequence.pre_slew, &sequence.scan_begin, &sequence.scan_end] {
        assert!(is_orthonormal(&attitude.rotation.matrix()));
    }
    let pointed = sequence.pre_slew.rotation.apply(&sequence.pre_slew.aim_point);
    assert!(angular_separation(&pointed.xyz(), &[1.0, 0.0, 0.0]) < 1e-12);

    for axis in [sequence.min_slew_axis.inertial, sequence.scan_axis.inertial] {
        assert!((axis.norm() - 1.0).abs() < 1e-12);
    }
    assert!(sequence.min_slew_axis.inertial.xyz()[2].abs() < 1e-12);
}

#[test]
fn test_earth_at_scan_start_is_degenerate() {
    let provider = FixedGeometry::new(radec_to_unit_vector(10.0, -20.0));
    let err = compute_maneuver(&provider, &ManeuverConfig::default(), "2015-07-14T12:00:00 UTC")
        .unwrap_err();
    assert!(matches!(
        err,
        ManeuverError::Geometry(GeometryError::Degenerate(_))
    ));
}

#[test]
fn test_failed_kernel_load_writes_nothing() {
    let mut provider = FixedGeometry::new(radec_to_unit_vector(285.0, -21.0));
    let mut out = Vec::new();
    let err = run(
        &mut provider,
        &ManeuverConfig::default(),
        &invocation(&["a.tls", "missing.bsp", "c.tf"]),
        &mut out,
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("missing.bsp"));
    assert!(out.is_empty());
    assert_eq!(provider.loaded.len(), 1);
}

#[test]
fn test_unknown_instrument_fails() {
    let provider = FixedGeometry::new(radec_to_unit_vector(285.0, -21.0));
    let config = ManeuverConfig {
        instrument: "NH_LORRI".to_string(),
        ..ManeuverConfig::default()
    };
    let err = compute_maneuver(&provider, &config, "2015-07-14T12:00:00 UTC").unwrap_err();
    assert!(matches!(
        err,
        ManeuverError::Ephemeris(EphemerisError::ObjectNotFound(_))
    ));
}
