//! Ephemeris, time and frame access

pub mod provider;
pub mod spice_provider;

pub use provider::{EphemerisProvider, LightTimeCorrection};
pub use spice_provider::SpiceProvider;
