//! Slew/scan attitude sequence for the New Horizons REX instrument
//!
//! Given a UTC time and a set of SPICE kernels, computes the attitudes that
//! point the REX boresight at Earth, slew it to the scan start and scan it to
//! the scan end, and reports them with self-consistency residuals.

// Module declarations
pub mod attitude;
pub mod cli;
pub mod ephemeris;
pub mod error;
pub mod kernels;
pub mod output;
pub mod utils;

// Re-export public API
pub use attitude::{
    compute_maneuver, AttitudeSequence, ConsistencyReport, GeometryError, ManeuverError,
    ManeuverInputs,
};
pub use cli::{Args, Invocation, RunOptions};
pub use ephemeris::{EphemerisProvider, LightTimeCorrection, SpiceProvider};
pub use error::EphemerisError;
pub use output::SlewScanReport;
pub use utils::config::ManeuverConfig;

use anyhow::Context;
use log::info;
use std::io::Write;

/// Load the kernels of `invocation`, compute the maneuver and write the JSON
/// report to `out`
pub fn run<P: EphemerisProvider, W: Write>(
    provider: &mut P,
    config: &ManeuverConfig,
    invocation: &Invocation,
    out: W,
) -> anyhow::Result<SlewScanReport> {
    for kernel in &invocation.kernels {
        provider
            .load_definitions(kernel)
            .with_context(|| format!("Failed to load kernel {}", kernel.display()))?;
    }
    info!("Loaded {} kernel(s)", invocation.kernels.len());

    let (sequence, checks) = compute_maneuver(&*provider, config, &invocation.utc)
        .with_context(|| format!("Failed to compute slew/scan attitudes at {}", invocation.utc))?;

    let report = SlewScanReport::new(&sequence, &checks);
    report
        .write_json(out)
        .context("Failed to write the JSON report")?;
    Ok(report)
}
