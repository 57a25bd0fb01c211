//! Ephemeris/frame provider interface
//!
//! The attitude computation only talks to ephemeris data through this trait,
//! so it can run against SPICE kernels (`SpiceProvider`) or a fixed test
//! fixture.

use hifitime::Epoch;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EphemerisError, Result};
use crate::kernels::instrument::FieldOfView;
use crate::utils::vector_math::Matrix3;

/// Aberration correction applied to an observer-relative body position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightTimeCorrection {
    /// Geometric position
    None,
    /// One-way light time
    #[default]
    LightTime,
    /// Light time and stellar aberration
    LightTimeStellar,
    /// Converged Newtonian light time
    Converged,
    /// Converged light time and stellar aberration
    ConvergedStellar,
}

impl FromStr for LightTimeCorrection {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self> {
        let flag: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match flag.to_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "LT" => Ok(Self::LightTime),
            "LT+S" => Ok(Self::LightTimeStellar),
            "CN" => Ok(Self::Converged),
            "CN+S" => Ok(Self::ConvergedStellar),
            _ => Err(EphemerisError::InvalidAberration(s.to_string())),
        }
    }
}

impl fmt::Display for LightTimeCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = match self {
            Self::None => "NONE",
            Self::LightTime => "LT",
            Self::LightTimeStellar => "LT+S",
            Self::Converged => "CN",
            Self::ConvergedStellar => "CN+S",
        };
        f.write_str(flag)
    }
}

/// Source of time conversion, body positions, frame rotations and instrument
/// geometry
pub trait EphemerisProvider {
    /// Load one definition file (ephemeris, time, frame or instrument kernel)
    fn load_definitions(&mut self, path: &Path) -> Result<()>;

    /// Convert a UTC string to an epoch
    fn utc_to_epoch(&self, utc: &str) -> Result<Epoch>;

    /// Position of `target` relative to `observer` at `epoch`, expressed in
    /// `frame`, in km
    fn body_direction(
        &self,
        target: &str,
        epoch: Epoch,
        frame: &str,
        correction: LightTimeCorrection,
        observer: &str,
    ) -> Result<[f64; 3]>;

    /// Rotation matrix mapping vectors in `from` to vectors in `to` at `epoch`
    fn frame_rotation(&self, from: &str, to: &str, epoch: Epoch) -> Result<Matrix3>;

    /// Boresight and boundary of an instrument in its own frame
    fn instrument_fov(&self, instrument_id: i32) -> Result<FieldOfView>;

    /// NAIF ID code for a body or instrument name
    fn name_to_id(&self, name: &str) -> Result<i32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corrections() {
        assert_eq!("lt".parse::<LightTimeCorrection>().unwrap(), LightTimeCorrection::LightTime);
        assert_eq!(
            "CN + S".parse::<LightTimeCorrection>().unwrap(),
            LightTimeCorrection::ConvergedStellar
        );
        assert_eq!("none".parse::<LightTimeCorrection>().unwrap(), LightTimeCorrection::None);
        assert!("XLT".parse::<LightTimeCorrection>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for c in [
            LightTimeCorrection::None,
            LightTimeCorrection::LightTime,
            LightTimeCorrection::LightTimeStellar,
            LightTimeCorrection::Converged,
            LightTimeCorrection::ConvergedStellar,
        ] {
            assert_eq!(c.to_string().parse::<LightTimeCorrection>().unwrap(), c);
        }
    }
}
