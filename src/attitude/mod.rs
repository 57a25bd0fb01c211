//! Slew/scan attitude computation
//!
//! Builds the pre-slew, scan-begin and scan-end attitudes from the inputs an
//! [`EphemerisProvider`] supplies, then cross-checks them.

pub mod geometry;
pub mod sequence;
pub mod validator;

// Re-export main types
pub use geometry::{build_rotation, GeometryError, Inertial, Instrument, Rotation, Spacecraft, Vector};
pub use sequence::{Attitude, AttitudeSequence, Axis, ManeuverError, ManeuverInputs};
pub use validator::ConsistencyReport;

use log::info;

use crate::ephemeris::provider::EphemerisProvider;
use crate::utils::config::ManeuverConfig;

/// Gather inputs at `utc`, build the attitude sequence and validate it
pub fn compute_maneuver<P: EphemerisProvider + ?Sized>(
    provider: &P,
    config: &ManeuverConfig,
    utc: &str,
) -> Result<(AttitudeSequence, ConsistencyReport), ManeuverError> {
    info!("Computing slew/scan attitudes for {utc}");
    let inputs = ManeuverInputs::gather(provider, config, utc)?;
    let sequence = AttitudeSequence::build(&inputs)?;
    let report = ConsistencyReport::validate(&sequence)?;
    Ok((sequence, report))
}
