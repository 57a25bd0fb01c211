//! SPICE text kernel support: variable pool, frames, instruments and body names

pub mod frames;
pub mod instrument;
pub mod naif_ids;
pub mod pool;

pub use instrument::{FieldOfView, FovShape};
pub use pool::{KernelPool, PoolValue};
