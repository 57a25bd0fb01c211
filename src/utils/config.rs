//! Constants and per-run configuration for the slew/scan computation

use serde::{Deserialize, Serialize};

/// Mean obliquity of the ecliptic at J2000 (IAU 1976), arcseconds.
/// Defines the ECLIPJ2000 frame relative to J2000.
pub const J2000_OBLIQUITY_ARCSEC: f64 = 84381.448;

/// Sine of the smallest angle allowed between two vectors that define a basis
pub const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Residuals above this are reported at warn level
pub const REPORT_WARN_TOLERANCE: f64 = 1e-6;

/// Inertial frame all aim points are expressed in
pub const INERTIAL_FRAME: &str = "J2000";

/// Ecliptic frame whose +Z axis is the North Ecliptic Pole
pub const ECLIPTIC_FRAME: &str = "ECLIPJ2000";

pub const DEFAULT_INSTRUMENT: &str = "NH_REX";
pub const DEFAULT_SPACECRAFT_FRAME: &str = "NH_SPACECRAFT";
pub const DEFAULT_OBSERVER: &str = "NH";
pub const DEFAULT_REFERENCE_BODY: &str = "EARTH";
pub const DEFAULT_ABERRATION: &str = "LT";

/// Scan begin aim point (RA, DEC) in degrees
pub const SCAN_BEGIN_RADEC_DEG: (f64, f64) = (10.0, -20.0);
/// Scan end aim point (RA, DEC) in degrees
pub const SCAN_END_RADEC_DEG: (f64, f64) = (10.0, 40.0);

/// A fixed celestial target given by right ascension and declination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CelestialTarget {
    /// Right ascension in degrees
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

impl CelestialTarget {
    pub const fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }
}

/// Names and targets that define one slew/scan maneuver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverConfig {
    /// Instrument whose boresight is pointed
    pub instrument: String,
    /// Spacecraft body frame the virtual boresight is expressed in
    pub spacecraft_frame: String,
    /// Observing body (the spacecraft)
    pub observer: String,
    /// Body the boresight points at before the slew
    pub reference_body: String,
    /// Aberration correction applied to the reference body direction
    pub aberration: String,
    pub scan_begin: CelestialTarget,
    pub scan_end: CelestialTarget,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            instrument: DEFAULT_INSTRUMENT.to_string(),
            spacecraft_frame: DEFAULT_SPACECRAFT_FRAME.to_string(),
            observer: DEFAULT_OBSERVER.to_string(),
            reference_body: DEFAULT_REFERENCE_BODY.to_string(),
            aberration: DEFAULT_ABERRATION.to_string(),
            scan_begin: CelestialTarget::new(SCAN_BEGIN_RADEC_DEG.0, SCAN_BEGIN_RADEC_DEG.1),
            scan_end: CelestialTarget::new(SCAN_END_RADEC_DEG.0, SCAN_END_RADEC_DEG.1),
        }
    }
}
