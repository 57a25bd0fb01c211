//! Leap second management driven by a loaded leapseconds kernel (LSK)
//!
//! This module provides TAI-UTC and TT-UTC offsets and the UTC to ephemeris
//! time (ET, TDB seconds past J2000) conversion using the `DELTET/*`
//! variables of a leapseconds kernel:
//!
//! TT-UTC = DELTA_T_A + TAI-UTC
//! ET - TT = K sin(E),  E = M + EB sin(M),  M = M0 + M1 * TT

use chrono::{NaiveDateTime, Timelike};
use hifitime::Epoch;

use crate::error::{EphemerisError, Result};
use crate::kernels::pool::KernelPool;
use crate::utils::time_utils::{parse_utc, utc_seconds_past_j2000};

const DELTA_T_A: &str = "DELTET/DELTA_T_A";
const K: &str = "DELTET/K";
const EB: &str = "DELTET/EB";
const M: &str = "DELTET/M";
const DELTA_AT: &str = "DELTET/DELTA_AT";

/// Time-correlation constants read from an LSK
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSeconds {
    delta_t_a: f64,
    k: f64,
    eb: f64,
    m: [f64; 2],
    /// (formal UTC seconds past J2000 at which the offset starts, TAI-UTC)
    delta_at: Vec<(f64, f64)>,
}

impl LeapSeconds {
    /// Read the leapseconds model from the pool
    ///
    /// Returns `Ok(None)` when no LSK has been loaded, and an error when the
    /// `DELTET/*` variables are present but incomplete or malformed.
    pub fn from_pool(pool: &KernelPool) -> Result<Option<Self>> {
        let Some(table) = pool.numbers(DELTA_AT) else {
            return Ok(None);
        };
        let missing = |name: &str| EphemerisError::InvalidTime(format!(
            "leapseconds kernel is missing {name}"
        ));

        if table.is_empty() || table.len() % 2 != 0 {
            return Err(EphemerisError::InvalidTime(format!(
                "{DELTA_AT} must hold (offset, epoch) pairs, found {} values",
                table.len()
            )));
        }
        let mut delta_at: Vec<(f64, f64)> = table
            .chunks_exact(2)
            .map(|pair| (pair[1], pair[0]))
            .collect();
        delta_at.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Some(Self {
            delta_t_a: pool.number(DELTA_T_A).ok_or_else(|| missing(DELTA_T_A))?,
            k: pool.number(K).ok_or_else(|| missing(K))?,
            eb: pool.number(EB).ok_or_else(|| missing(EB))?,
            m: pool.fixed_numbers::<2>(M).ok_or_else(|| missing(M))?,
            delta_at,
        }))
    }

    /// TAI-UTC in seconds at the given formal UTC seconds past J2000
    ///
    /// Times before the first table entry use the first offset.
    pub fn tai_utc_offset(&self, utc_seconds: f64) -> f64 {
        self.delta_at
            .iter()
            .take_while(|(start, _)| *start <= utc_seconds)
            .last()
            .or_else(|| self.delta_at.first())
            .map_or(0.0, |(_, offset)| *offset)
    }

    /// TT-UTC in seconds
    pub fn tt_utc_offset(&self, utc_seconds: f64) -> f64 {
        self.delta_t_a + self.tai_utc_offset(utc_seconds)
    }

    /// ET - TT in seconds, evaluated at TT seconds past J2000
    pub fn et_tt_offset(&self, tt_seconds: f64) -> f64 {
        let mean_anomaly = self.m[0] + self.m[1] * tt_seconds;
        let eccentric_anomaly = mean_anomaly + self.eb * mean_anomaly.sin();
        self.k * eccentric_anomaly.sin()
    }

    /// Convert a parsed UTC time to ET seconds past J2000
    ///
    /// A leap second (`23:59:60`) lands one second after `23:59:59` and one
    /// second before the following midnight.
    pub fn datetime_to_et(&self, dt: &NaiveDateTime) -> f64 {
        let utc_seconds = utc_seconds_past_j2000(dt);
        // chrono keeps second 60 as second 59 with nanoseconds >= 1e9
        let lookup = if dt.nanosecond() >= 1_000_000_000 {
            utc_seconds - 1.0
        } else {
            utc_seconds
        };
        let tt = utc_seconds + self.tt_utc_offset(lookup);
        tt + self.et_tt_offset(tt)
    }
}

/// Convert a UTC string to a hifitime `Epoch` using the LSK in `pool`
///
/// Fails fast with `MissingLeapSeconds` if no LSK has been loaded.
pub fn utc_to_epoch(pool: &KernelPool, utc: &str) -> Result<Epoch> {
    let model = LeapSeconds::from_pool(pool)?
        .ok_or_else(|| EphemerisError::MissingLeapSeconds(utc.to_string()))?;
    let et = model.datetime_to_et(&parse_utc(utc)?);
    Ok(Epoch::from_et_seconds(et))
}
