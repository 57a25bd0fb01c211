//! SPICE kernel backed ephemeris provider
//!
//! Binary kernels (SPK, PCK) are loaded into an ANISE almanac; text kernels
//! (LSK, SCLK, FK, IK, meta-kernels) are parsed into the kernel pool.

use anise::prelude::{Aberration, Almanac, Frame};
use hifitime::Epoch;
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::ephemeris::provider::{EphemerisProvider, LightTimeCorrection};
use crate::error::{EphemerisError, Result};
use crate::kernels::frames::{self, J2000};
use crate::kernels::instrument::FieldOfView;
use crate::kernels::naif_ids;
use crate::kernels::pool::KernelPool;
use crate::utils::leap_seconds;
use crate::utils::vector_math::{mat_vec, Matrix3};

/// NAIF orientation ID of the J2000 frame
const J2000_ORIENTATION_ID: i32 = 1;

const TEXT_KERNEL_EXTENSIONS: &[&str] = &["tls", "tsc", "tf", "ti", "tpc", "tm", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KernelKind {
    Text,
    Binary,
}

/// Ephemeris provider over loaded SPICE kernels
#[derive(Default)]
pub struct SpiceProvider {
    almanac: Almanac,
    pool: KernelPool,
    loaded: Vec<PathBuf>,
}

impl SpiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text kernel variables loaded so far
    pub fn pool(&self) -> &KernelPool {
        &self.pool
    }

    /// Paths of every kernel loaded so far, in load order
    pub fn loaded_kernels(&self) -> &[PathBuf] {
        &self.loaded
    }

    fn load_kernel(&mut self, path: &Path, allow_meta: bool) -> Result<()> {
        match kernel_kind(path)? {
            KernelKind::Text => {
                let text = std::fs::read_to_string(path).map_err(|source| EphemerisError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let source_name = path.display().to_string();

                let assigned = self.pool.load_str(&source_name, &text)?;
                debug!(
                    "Loaded text kernel {source_name} ({} variables)",
                    assigned.len()
                );
                self.loaded.push(path.to_path_buf());

                if assigned.iter().any(|name| name == "KERNELS_TO_LOAD") {
                    if !allow_meta {
                        return Err(EphemerisError::KernelParse {
                            source_name,
                            line: 0,
                            message: "meta-kernels cannot load other meta-kernels".to_string(),
                        });
                    }
                    for kernel in meta_kernel_paths(&self.pool, &source_name)? {
                        self.load_kernel(&kernel, false)?;
                    }
                }
            }
            KernelKind::Binary => {
                let path_str = path.to_str().ok_or_else(|| {
                    EphemerisError::Query(format!("non UTF-8 kernel path {}", path.display()))
                })?;
                // A failed load hands back nothing, so load into a copy
                self.almanac = self.almanac.clone().load(path_str).map_err(|e| {
                    EphemerisError::Query(format!("Failed to load kernel '{path_str}': {e}"))
                })?;
                debug!("Loaded binary kernel {path_str}");
                self.loaded.push(path.to_path_buf());
            }
        }
        Ok(())
    }

    fn body_id(&self, name: &str) -> Result<i32> {
        naif_ids::name_to_id(&self.pool, name)
            .ok_or_else(|| EphemerisError::ObjectNotFound(name.to_string()))
    }
}

impl EphemerisProvider for SpiceProvider {
    fn load_definitions(&mut self, path: &Path) -> Result<()> {
        self.load_kernel(path, true)
    }

    fn utc_to_epoch(&self, utc: &str) -> Result<Epoch> {
        leap_seconds::utc_to_epoch(&self.pool, utc)
    }

    fn body_direction(
        &self,
        target: &str,
        epoch: Epoch,
        frame: &str,
        correction: LightTimeCorrection,
        observer: &str,
    ) -> Result<[f64; 3]> {
        let target_id = self.body_id(target)?;
        let observer_id = self.body_id(observer)?;

        let state = self
            .almanac
            .translate(
                Frame::new(target_id, J2000_ORIENTATION_ID),
                Frame::new(observer_id, J2000_ORIENTATION_ID),
                epoch,
                aberration(correction),
            )
            .map_err(|e| {
                EphemerisError::Query(format!(
                    "{target} relative to {observer} at {epoch} ({correction}): {e}"
                ))
            })?;
        let r = state.radius_km;
        let position = [r[0], r[1], r[2]];

        if frame.trim().eq_ignore_ascii_case(J2000) {
            Ok(position)
        } else {
            let rotation = frames::frame_rotation(&self.pool, J2000, frame)?;
            Ok(mat_vec(&rotation, &position))
        }
    }

    fn frame_rotation(&self, from: &str, to: &str, _epoch: Epoch) -> Result<Matrix3> {
        frames::frame_rotation(&self.pool, from, to)
    }

    fn instrument_fov(&self, instrument_id: i32) -> Result<FieldOfView> {
        let fov = FieldOfView::from_pool(&self.pool, instrument_id)?;
        if let Some(name) = naif_ids::id_to_name(&self.pool, instrument_id) {
            info!(
                "Instrument {name} ({instrument_id}): {:?} FOV in {}",
                fov.shape, fov.frame
            );
        }
        Ok(fov)
    }

    fn name_to_id(&self, name: &str) -> Result<i32> {
        self.body_id(name)
    }
}

fn aberration(correction: LightTimeCorrection) -> Option<Aberration> {
    match correction {
        LightTimeCorrection::None => Aberration::NONE,
        LightTimeCorrection::LightTime => Aberration::LT,
        LightTimeCorrection::LightTimeStellar => Aberration::LT_S,
        LightTimeCorrection::Converged => Aberration::CN,
        LightTimeCorrection::ConvergedStellar => Aberration::CN_S,
    }
}

/// Decide how to load a kernel from its ID word, falling back to the extension
fn kernel_kind(path: &Path) -> Result<KernelKind> {
    let mut head = [0u8; 8];
    let mut file = File::open(path).map_err(|source| EphemerisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let n = file.read(&mut head).map_err(|source| EphemerisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let head = &head[..n];

    if head.starts_with(b"KPL/") || head.starts_with(b"\\begin") {
        return Ok(KernelKind::Text);
    }
    if head.starts_with(b"DAF/") || head.starts_with(b"DAS/") || head.starts_with(b"NAIF/") {
        return Ok(KernelKind::Binary);
    }

    let is_text_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_KERNEL_EXTENSIONS.contains(&e.to_lowercase().as_str()));
    Ok(if is_text_extension {
        KernelKind::Text
    } else {
        KernelKind::Binary
    })
}

/// Kernel paths listed by a meta-kernel, with `$SYMBOL` path substitution
fn meta_kernel_paths(meta: &KernelPool, source_name: &str) -> Result<Vec<PathBuf>> {
    let kernels = meta.strings("KERNELS_TO_LOAD").unwrap_or_default();
    let symbols = meta.strings("PATH_SYMBOLS").unwrap_or_default();
    let values = meta.strings("PATH_VALUES").unwrap_or_default();
    if symbols.len() != values.len() {
        return Err(EphemerisError::KernelParse {
            source_name: source_name.to_string(),
            line: 0,
            message: format!(
                "PATH_SYMBOLS has {} entries but PATH_VALUES has {}",
                symbols.len(),
                values.len()
            ),
        });
    }

    // Longest symbols first so $KERNELS_NH is not clobbered by $KERNELS
    let mut substitutions: Vec<(String, &str)> = symbols
        .iter()
        .map(|s| format!("${}", s.trim()))
        .zip(values.iter().map(|v| v.trim()))
        .collect();
    substitutions.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    Ok(kernels
        .iter()
        .map(|k| {
            let path = substitutions
                .iter()
                .fold(k.trim().to_string(), |acc, (symbol, value)| {
                    acc.replace(symbol.as_str(), value)
                });
            PathBuf::from(path)
        })
        .collect())
}
