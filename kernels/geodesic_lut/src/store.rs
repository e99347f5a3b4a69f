// Persistence for generated deflection tables

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::grid::DeflectionLut;
use crate::types::SamplerConfig;

// Errors while writing or reading a table file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no deflection table at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("table file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed table file: {0}")]
    Decode(#[from] serde_json::Error),
}

// Filename deterministically encoding every generation parameter, so tables
// produced with different settings never collide on disk. Field order is
// fixed; whole floats keep their trailing ".0".
pub fn filename(config: &SamplerConfig) -> String {
    let [p_start, p_end] = config.p_range;
    let [l_start, l_end] = config.l_range;
    format!(
        "{}adaptgrid{}_num{}_coord{}_m{:?}_step{:?}_Rend{:?}_p{:?}-{:?}_l{:?}-{:?}.json",
        config.filename_prefix,
        config.adapt_grid,
        config.num,
        config.coordinates.tag(),
        config.m,
        config.max_step,
        config.r_end,
        p_start,
        p_end,
        l_start,
        l_end,
    )
}

// Write the table as one record. One-shot: a crash mid-write leaves a file
// that load() rejects, and the table is regenerated.
pub fn save(lut: &DeflectionLut, path: &Path) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(lut)?;
    fs::write(path, bytes)?;
    Ok(())
}

// Read a table back wholesale. A missing file is reported as NotFound,
// anything unparseable as Decode. Interpolants are built separately via
// interpolate::build_interpolants.
pub fn load(path: &Path) -> Result<DeflectionLut, StoreError> {
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            path: path.to_path_buf(),
        },
        _ => StoreError::Io(err),
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}
