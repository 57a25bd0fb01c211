//! NAIF body name <-> ID code lookups
//!
//! Built-in codes cover the bodies this tool needs out of the box; text kernels
//! can add or override names through `NAIF_BODY_NAME` / `NAIF_BODY_CODE`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::kernels::pool::KernelPool;

static BUILTIN_BODIES: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    HashMap::from([
        ("SOLAR SYSTEM BARYCENTER", 0),
        ("SSB", 0),
        ("MERCURY BARYCENTER", 1),
        ("VENUS BARYCENTER", 2),
        ("EARTH BARYCENTER", 3),
        ("EMB", 3),
        ("EARTH MOON BARYCENTER", 3),
        ("MARS BARYCENTER", 4),
        ("JUPITER BARYCENTER", 5),
        ("SATURN BARYCENTER", 6),
        ("URANUS BARYCENTER", 7),
        ("NEPTUNE BARYCENTER", 8),
        ("PLUTO BARYCENTER", 9),
        ("SUN", 10),
        ("MERCURY", 199),
        ("VENUS", 299),
        ("EARTH", 399),
        ("MOON", 301),
        ("MARS", 499),
        ("JUPITER", 599),
        ("SATURN", 699),
        ("URANUS", 799),
        ("NEPTUNE", 899),
        ("PLUTO", 999),
        ("CHARON", 901),
        ("ARROKOTH", 2486958),
        ("NEW HORIZONS", -98),
        ("NEW_HORIZONS", -98),
        ("NH", -98),
    ])
});

/// Normalize a body name: upper case, trimmed, inner whitespace collapsed
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Resolve a body or instrument name to its NAIF ID code
///
/// Kernel pool definitions take precedence over the built-in table, and among
/// pool definitions the last one wins. Integer strings resolve to themselves.
pub fn name_to_id(pool: &KernelPool, name: &str) -> Option<i32> {
    let wanted = normalize_name(name);

    if let (Some(names), Some(codes)) = (
        pool.strings("NAIF_BODY_NAME"),
        pool.numbers("NAIF_BODY_CODE"),
    ) {
        let found = names
            .iter()
            .zip(codes.iter())
            .rev()
            .find(|(n, _)| normalize_name(n) == wanted)
            .map(|(_, code)| code.round() as i32);
        if found.is_some() {
            return found;
        }
    }

    BUILTIN_BODIES
        .get(wanted.as_str())
        .copied()
        .or_else(|| wanted.parse::<i32>().ok())
}

/// Resolve a NAIF ID code to a name (pool definitions first)
pub fn id_to_name(pool: &KernelPool, code: i32) -> Option<String> {
    if let (Some(names), Some(codes)) = (
        pool.strings("NAIF_BODY_NAME"),
        pool.numbers("NAIF_BODY_CODE"),
    ) {
        if let Some((name, _)) = names
            .iter()
            .zip(codes.iter())
            .rev()
            .find(|(_, c)| c.round() as i32 == code)
        {
            return Some(name.clone());
        }
    }

    BUILTIN_BODIES
        .iter()
        .filter(|(_, c)| **c == code)
        .map(|(name, _)| *name)
        .min_by_key(|name| name.len())
        .map(str::to_string)
}
