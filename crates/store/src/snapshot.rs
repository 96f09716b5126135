//! On-disk JSON snapshot of the catalog.
//!
//! The whole catalog is rewritten on every mutation. Writes go to a
//! temporary file in the target directory which is fsynced and then renamed
//! over the snapshot, so a reader sees either the old or the new file in
//! full.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use piniplm_core::catalog::Catalog;
use piniplm_core::part::PartView;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub parts: Vec<PartView>,
}

/// Load a catalog from `path`. A missing file yields `None`.
pub fn read_snapshot(path: &Path) -> Result<Option<Catalog>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(Some(Catalog::from_views(snapshot.parts)?))
}

/// Atomically replace the snapshot at `path` with `catalog`.
pub fn write_snapshot(path: &Path, catalog: &Catalog) -> Result<(), StoreError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        parts: catalog.to_views(),
    };
    write_atomic(path, &snapshot).map_err(|source| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, snapshot: &Snapshot) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
