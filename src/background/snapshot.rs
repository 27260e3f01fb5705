//! On-disk snapshot of the price cache.
//!
//! The snapshot is one JSON object mapping symbol to entry. Every save
//! rewrites the whole file: it is written next to the target and renamed
//! over it, so a crash mid-write leaves the previous snapshot intact.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::price_cache::PriceCacheEntry;

/// Ordered by symbol so snapshots and responses serialise deterministically.
pub type PriceMap = BTreeMap<String, PriceCacheEntry>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SnapshotError {
    pub fn is_missing(&self) -> bool {
        matches!(self, SnapshotError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

pub async fn load(path: &Path) -> Result<PriceMap, SnapshotError> {
    let bytes = tokio::fs::read(path).await?;
    let entries = serde_json::from_slice::<PriceMap>(&bytes)?;
    Ok(entries)
}

pub async fn save(path: &Path, entries: &PriceMap) -> Result<(), SnapshotError> {
    let bytes = serde_json::to_vec_pretty(entries)?;
    let tmp = temp_path(path);

    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
