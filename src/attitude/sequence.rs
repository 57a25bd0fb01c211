//! Pre-slew, scan-begin and scan-end attitudes of a slew/scan maneuver

use hifitime::Epoch;
use log::{debug, info};
use thiserror::Error;

use crate::attitude::geometry::{
    build_rotation, GeometryError, Inertial, Instrument, Rotation, Spacecraft, Vector,
};
use crate::ephemeris::provider::{EphemerisProvider, LightTimeCorrection};
use crate::error::EphemerisError;
use crate::utils::config::{CelestialTarget, ManeuverConfig, ECLIPTIC_FRAME, INERTIAL_FRAME};
use crate::utils::vector_math::radrec;

#[derive(Debug, Error)]
pub enum ManeuverError {
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Everything the attitude sequence is computed from
#[derive(Debug, Clone, Copy)]
pub struct ManeuverInputs {
    /// Instrument boresight in the spacecraft frame
    pub virtual_boresight: Vector<Spacecraft>,
    /// Unit vector from the spacecraft to the reference body (Earth)
    pub earth_direction: Vector<Inertial>,
    /// North ecliptic pole in J2000
    pub ecliptic_pole: Vector<Inertial>,
    pub scan_begin: Vector<Inertial>,
    pub scan_end: Vector<Inertial>,
}

impl ManeuverInputs {
    /// Query the provider for the maneuver inputs at `utc`
    pub fn gather<P: EphemerisProvider + ?Sized>(
        provider: &P,
        config: &ManeuverConfig,
        utc: &str,
    ) -> Result<Self, ManeuverError> {
        // Instrument mounting is fixed, so any epoch works for it
        let static_epoch = Epoch::from_et_seconds(0.0);

        let instrument_id = provider.name_to_id(&config.instrument)?;
        let fov = provider.instrument_fov(instrument_id)?;
        let mount: Rotation<Instrument, Spacecraft> = Rotation::from_matrix(
            provider.frame_rotation(&fov.frame, &config.spacecraft_frame, static_epoch)?,
        )?;
        let virtual_boresight = mount.apply(&Vector::new(fov.boresight));
        debug!(
            "{} ({instrument_id}) boresight in {}: {:?}",
            config.instrument,
            config.spacecraft_frame,
            virtual_boresight.xyz()
        );

        let epoch = provider.utc_to_epoch(utc)?;
        debug!("{utc} -> ET {:.6}", epoch.to_et_seconds());

        let correction: LightTimeCorrection = config.aberration.parse()?;
        let earth_direction = Vector::<Inertial>::new(provider.body_direction(
            &config.reference_body,
            epoch,
            INERTIAL_FRAME,
            correction,
            &config.observer,
        )?)
        .unit();

        let ecliptic: Rotation<Inertial, Inertial> = Rotation::from_matrix(
            provider.frame_rotation(ECLIPTIC_FRAME, INERTIAL_FRAME, static_epoch)?,
        )?;
        let ecliptic_pole = ecliptic.apply(&Vector::new([0.0, 0.0, 1.0]));

        Ok(Self {
            virtual_boresight,
            earth_direction,
            ecliptic_pole,
            scan_begin: target_direction(&config.scan_begin),
            scan_end: target_direction(&config.scan_end),
        })
    }
}

fn target_direction(target: &CelestialTarget) -> Vector<Inertial> {
    Vector::new(radrec(
        1.0,
        target.ra_deg.to_radians(),
        target.dec_deg.to_radians(),
    ))
}

/// One attitude and the vectors that define it
#[derive(Debug, Clone, Copy)]
pub struct Attitude {
    pub virtual_boresight: Vector<Spacecraft>,
    pub aim_point: Vector<Inertial>,
    pub roll: Vector<Spacecraft>,
    pub roll_reference: Vector<Inertial>,
    /// J2000 to spacecraft rotation
    pub rotation: Rotation<Inertial, Spacecraft>,
}

impl Attitude {
    pub fn new(
        virtual_boresight: Vector<Spacecraft>,
        aim_point: Vector<Inertial>,
        roll: Vector<Spacecraft>,
        roll_reference: Vector<Inertial>,
    ) -> Result<Self, GeometryError> {
        let rotation = build_rotation(&virtual_boresight, &aim_point, &roll, &roll_reference)?;
        Ok(Self {
            virtual_boresight,
            aim_point,
            roll,
            roll_reference,
            rotation,
        })
    }
}

/// A rotation axis in both frames
#[derive(Debug, Clone, Copy)]
pub struct Axis {
    pub spacecraft: Vector<Spacecraft>,
    pub inertial: Vector<Inertial>,
}

#[derive(Debug, Clone, Copy)]
pub struct AttitudeSequence {
    /// Boresight on the reference body, spacecraft +Z toward the ecliptic pole
    pub pre_slew: Attitude,
    /// Axis of the shortest slew from the reference body to the scan start
    pub min_slew_axis: Axis,
    pub scan_begin: Attitude,
    /// Axis the scan rotates about
    pub scan_axis: Axis,
    pub scan_end: Attitude,
    /// Scan-end target seen through the scan-begin attitude
    pub boresight_at_end: Vector<Spacecraft>,
    /// Scan-begin target seen through the scan-end attitude
    pub boresight_at_begin: Vector<Spacecraft>,
}

impl AttitudeSequence {
    pub fn build(inputs: &ManeuverInputs) -> Result<Self, GeometryError> {
        let vb = inputs.virtual_boresight;
        let spacecraft_z = Vector::<Spacecraft>::new([0.0, 0.0, 1.0]);

        let pre_slew = Attitude::new(
            vb,
            inputs.earth_direction,
            spacecraft_z,
            inputs.ecliptic_pole,
        )?;

        let min_slew_inertial = inputs
            .earth_direction
            .unit_cross(&inputs.scan_begin, "reference body and scan begin")?;
        let min_slew_axis = Axis {
            spacecraft: pre_slew.rotation.apply(&min_slew_inertial),
            inertial: min_slew_inertial,
        };

        let scan_begin = Attitude::new(
            vb,
            inputs.scan_begin,
            min_slew_axis.spacecraft,
            min_slew_axis.inertial,
        )?;

        let scan_inertial = inputs
            .scan_begin
            .unit_cross(&inputs.scan_end, "scan begin and scan end")?;
        let scan_axis = Axis {
            spacecraft: scan_begin.rotation.apply(&scan_inertial),
            inertial: scan_inertial,
        };

        let scan_end = Attitude::new(
            vb,
            inputs.scan_end,
            scan_axis.spacecraft,
            scan_axis.inertial,
        )?;

        let boresight_at_end = scan_begin.rotation.apply(&inputs.scan_end);
        let boresight_at_begin = scan_end.rotation.apply(&inputs.scan_begin);

        info!(
            "Slew {:.4} deg, scan {:.4} deg",
            inputs
                .earth_direction
                .separation(&inputs.scan_begin)
                .to_degrees(),
            inputs.scan_begin.separation(&inputs.scan_end).to_degrees()
        );

        Ok(Self {
            pre_slew,
            min_slew_axis,
            scan_begin,
            scan_axis,
            scan_end,
            boresight_at_end,
            boresight_at_begin,
        })
    }
}
