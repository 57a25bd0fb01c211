//! Self-consistency checks on a computed attitude sequence
//!
//! Every metric is zero for an exact computation; non-zero values only
//! measure numerical error and never fail a run.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::attitude::geometry::{build_rotation, GeometryError, Inertial, Rotation, Spacecraft, Vector};
use crate::attitude::sequence::AttitudeSequence;
use crate::utils::config::REPORT_WARN_TOLERANCE;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Reference body to scan-begin separation minus the pre-slew to
    /// scan-begin rotation angle (radians)
    pub slew_err: f64,
    /// Scan separation minus the scan-begin to scan-end rotation angle (radians)
    pub scan_err: f64,
    /// Scan-begin rotation vs. one rebuilt from the recovered end boresight
    pub scan_begin_err: f64,
    /// Scan-end rotation vs. one rebuilt from the recovered begin boresight
    pub scan_end_err: f64,
    /// Pre-slew rotation vs. one rebuilt about the minimum slew axis
    pub preslew_err: f64,
}

/// Target separation minus the angle of the rotation between two attitudes
fn closure_residual(
    first_aim: &Vector<Inertial>,
    second_aim: &Vector<Inertial>,
    first: &Rotation<Inertial, Spacecraft>,
    second: &Rotation<Inertial, Spacecraft>,
) -> f64 {
    let between = first.transpose().compose(second);
    first_aim.separation(second_aim) - between.angle()
}

impl ConsistencyReport {
    pub fn validate(sequence: &AttitudeSequence) -> Result<Self, GeometryError> {
        let pre = &sequence.pre_slew;
        let begin = &sequence.scan_begin;
        let end = &sequence.scan_end;
        let scan_axis = &sequence.scan_axis;
        let min_slew = &sequence.min_slew_axis;

        let rebuilt_end = build_rotation(
            &sequence.boresight_at_begin,
            &begin.aim_point,
            &scan_axis.spacecraft,
            &scan_axis.inertial,
        )?;
        let rebuilt_begin = build_rotation(
            &sequence.boresight_at_end,
            &end.aim_point,
            &scan_axis.spacecraft,
            &scan_axis.inertial,
        )?;
        let rebuilt_pre = build_rotation(
            &pre.virtual_boresight,
            &pre.aim_point,
            &min_slew.spacecraft,
            &min_slew.inertial,
        )?;

        let report = Self {
            slew_err: closure_residual(
                &pre.aim_point,
                &begin.aim_point,
                &pre.rotation,
                &begin.rotation,
            ),
            scan_err: closure_residual(
                &begin.aim_point,
                &end.aim_point,
                &begin.rotation,
                &end.rotation,
            ),
            scan_begin_err: begin.rotation.max_abs_difference(&rebuilt_begin),
            scan_end_err: end.rotation.max_abs_difference(&rebuilt_end),
            preslew_err: pre.rotation.max_abs_difference(&rebuilt_pre),
        };
        report.log();
        Ok(report)
    }

    fn metrics(&self) -> [(&'static str, f64); 5] {
        [
            ("slewErr", self.slew_err),
            ("scanErr", self.scan_err),
            ("scanBegErr", self.scan_begin_err),
            ("scanEndErr", self.scan_end_err),
            ("preslewErr", self.preslew_err),
        ]
    }

    /// Largest absolute metric
    pub fn max_abs(&self) -> f64 {
        self.metrics()
            .iter()
            .map(|(_, value)| value.abs())
            .fold(0.0, f64::max)
    }

    /// True when every metric is within `tolerance` of zero
    pub fn within(&self, tolerance: f64) -> bool {
        self.metrics()
            .iter()
            .all(|(_, value)| value.is_finite() && value.abs() <= tolerance)
    }

    fn log(&self) {
        for (name, value) in self.metrics() {
            debug!("{name} = {value:e}");
        }
        if !self.within(REPORT_WARN_TOLERANCE) {
            warn!(
                "Consistency residual {:e} exceeds {REPORT_WARN_TOLERANCE:e}",
                self.max_abs()
            );
        }
    }
}
