//! Binary I/O for round probability tables, one file per face count.
//!
//! Format: 16-byte header + f64[18] in dense `[3, 2, 3]` order
//! (see [`crate::constants::table_index`]). All fields little-endian.
//! Total file size: 160 bytes.
//!
//! | Offset | Field | Value |
//! |--------|-------|-------|
//! | 0 | magic | `"RSKP"` ([`TABLE_FILE_MAGIC`]) |
//! | 4 | version | [`TABLE_FILE_VERSION`] |
//! | 8 | face_count | die faces the table was built for |
//! | 12 | entries | [`TABLE_ENTRIES`] |

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::constants::*;
use crate::error::{Result, RiskError};
use crate::round_table::{build_round_probability_table, RoundProbabilityTable};

const HEADER_BYTES: usize = 16;

/// Exact size of a valid table file.
pub const TABLE_FILE_BYTES: usize = HEADER_BYTES + TABLE_ENTRIES * std::mem::size_of::<f64>();

/// `{dir}/round_probs_{faces}.bin`
pub fn table_file_path(dir: &Path, faces: u32) -> PathBuf {
    dir.join(format!("round_probs_{faces}.bin"))
}

fn encode(table: &RoundProbabilityTable) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(TABLE_FILE_BYTES);
    bytes.extend_from_slice(&TABLE_FILE_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&TABLE_FILE_VERSION.to_le_bytes());
    bytes.extend_from_slice(&table.face_count().to_le_bytes());
    bytes.extend_from_slice(&(TABLE_ENTRIES as u32).to_le_bytes());
    for p in table.to_dense_array() {
        bytes.extend_from_slice(&p.to_le_bytes());
    }
    bytes
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<RoundProbabilityTable> {
    let invalid = |reason: String| RiskError::InvalidTableFile {
        path: path.to_path_buf(),
        reason,
    };

    if bytes.len() != TABLE_FILE_BYTES {
        return Err(invalid(format!(
            "size mismatch: expected {TABLE_FILE_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    let magic = read_u32(bytes, 0);
    let version = read_u32(bytes, 4);
    if magic != TABLE_FILE_MAGIC || version != TABLE_FILE_VERSION {
        return Err(invalid(format!(
            "bad header (magic=0x{magic:08x} version={version})"
        )));
    }
    let faces = read_u32(bytes, 8);
    let entries = read_u32(bytes, 12) as usize;
    if entries != TABLE_ENTRIES {
        return Err(invalid(format!(
            "expected {TABLE_ENTRIES} entries, header says {entries}"
        )));
    }

    let mut probs = [0.0f64; TABLE_ENTRIES];
    for (i, chunk) in bytes[HEADER_BYTES..].chunks_exact(8).enumerate() {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        probs[i] = f64::from_le_bytes(word);
    }

    RoundProbabilityTable::from_dense_array(faces, probs).map_err(|e| invalid(e.to_string()))
}

/// Write a table to `path`, creating parent directories.
pub fn save_round_table(table: &RoundProbabilityTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encode(table))?;
    info!(faces = table.face_count(), path = %path.display(), "saved round table");
    Ok(())
}

/// Read and validate a table from `path`.
pub fn load_round_table(path: &Path) -> Result<RoundProbabilityTable> {
    let start = Instant::now();
    let bytes = fs::read(path)?;
    let table = decode(path, &bytes)?;
    info!(
        faces = table.face_count(),
        path = %path.display(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "loaded round table"
    );
    Ok(table)
}

/// Load the table for `faces` from `dir` if a valid file is there, otherwise
/// build it (and write it back when `save` is set).
///
/// A file for the wrong face count or with a bad header is treated as absent.
pub fn load_or_build_round_table(dir: &Path, faces: u32, save: bool) -> Result<RoundProbabilityTable> {
    let path = table_file_path(dir, faces);
    if path.exists() {
        match load_round_table(&path) {
            Ok(table) if table.face_count() == faces => return Ok(table),
            Ok(table) => warn!(
                path = %path.display(),
                expected = faces,
                found = table.face_count(),
                "round table file has the wrong face count, rebuilding"
            ),
            Err(e) => warn!(path = %path.display(), error = %e, "ignoring round table file"),
        }
    }

    let table = build_round_probability_table(faces)?;
    if save {
        save_round_table(&table, &path)?;
    }
    Ok(table)
}
