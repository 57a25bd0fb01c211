//! JSON report of a computed slew/scan maneuver

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::attitude::{Attitude, AttitudeSequence, ConsistencyReport};

/// One scan attitude as reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanBeginGroup {
    pub virtual_boresight: [f64; 3],
    pub aim_point: [f64; 3],
    pub roll: [f64; 3],
    pub roll_reference: [f64; 3],
    /// Scan-end target in the spacecraft frame at the scan-begin attitude
    pub recovered_boresight_at_end: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEndGroup {
    pub virtual_boresight: [f64; 3],
    pub aim_point: [f64; 3],
    pub roll: [f64; 3],
    pub roll_reference: [f64; 3],
    /// Scan-begin target in the spacecraft frame at the scan-end attitude
    #[serde(rename = "recoveredBoresightAtBeg")]
    pub recovered_boresight_at_begin: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorChecks {
    #[serde(rename = "slewErr")]
    pub slew_err: f64,
    #[serde(rename = "scanErr")]
    pub scan_err: f64,
    #[serde(rename = "scanBegErr")]
    pub scan_begin_err: f64,
    #[serde(rename = "scanEndErr")]
    pub scan_end_err: f64,
    #[serde(rename = "preslewErr")]
    pub preslew_err: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Misc {
    pub min_slew_axis_spacecraft: [f64; 3],
    pub min_slew_axis_inertial: [f64; 3],
}

/// Output document: the two scan attitudes, residuals and the slew axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlewScanReport {
    pub scan_begin: ScanBeginGroup,
    pub scan_end: ScanEndGroup,
    pub error_checks: ErrorChecks,
    pub misc: Misc,
}

impl From<&ConsistencyReport> for ErrorChecks {
    fn from(report: &ConsistencyReport) -> Self {
        Self {
            slew_err: report.slew_err,
            scan_err: report.scan_err,
            scan_begin_err: report.scan_begin_err,
            scan_end_err: report.scan_end_err,
            preslew_err: report.preslew_err,
        }
    }
}

impl SlewScanReport {
    /// Both scan groups carry the scan axis as roll/roll reference, the axis
    /// that relates the two scan attitudes
    pub fn new(sequence: &AttitudeSequence, checks: &ConsistencyReport) -> Self {
        let scan_roll = sequence.scan_axis.spacecraft.xyz();
        let scan_roll_ref = sequence.scan_axis.inertial.xyz();
        let pointing = |a: &Attitude| (a.virtual_boresight.xyz(), a.aim_point.xyz());

        let (begin_vb, begin_ap) = pointing(&sequence.scan_begin);
        let (end_vb, end_ap) = pointing(&sequence.scan_end);

        Self {
            scan_begin: ScanBeginGroup {
                virtual_boresight: begin_vb,
                aim_point: begin_ap,
                roll: scan_roll,
                roll_reference: scan_roll_ref,
                recovered_boresight_at_end: sequence.boresight_at_end.xyz(),
            },
            scan_end: ScanEndGroup {
                virtual_boresight: end_vb,
                aim_point: end_ap,
                roll: scan_roll,
                roll_reference: scan_roll_ref,
                recovered_boresight_at_begin: sequence.boresight_at_begin.xyz(),
            },
            error_checks: checks.into(),
            misc: Misc {
                min_slew_axis_spacecraft: sequence.min_slew_axis.spacecraft.xyz(),
                min_slew_axis_inertial: sequence.min_slew_axis.inertial.xyz(),
            },
        }
    }

    /// Pretty-printed JSON followed by a newline
    pub fn write_json<W: Write>(&self, mut writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        writer.flush().map_err(serde_json::Error::io)
    }
}
