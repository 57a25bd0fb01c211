pub mod config;
pub mod leap_seconds;
pub mod time_utils;
pub mod vector_math;
