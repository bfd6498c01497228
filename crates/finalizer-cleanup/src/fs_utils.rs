use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use finalizer_core::{Architecture, FeatureBand};
use tracing::info;

pub fn install_state_dir(root: &Path, architecture: Architecture, band: &FeatureBand) -> PathBuf {
    root.join(architecture.as_str()).join(band.to_string())
}

/// Removes the band's install-state directory and its architecture directory when left empty.
pub fn remove_install_state(
    root: &Path,
    architecture: Architecture,
    band: &FeatureBand,
) -> io::Result<bool> {
    let dir = install_state_dir(root, architecture, band);
    let removed = remove_dir_all_if_exists(&dir)?;
    if removed {
        info!("deleted install state {}", dir.display());
    }

    let arch_dir = root.join(architecture.as_str());
    if remove_dir_if_empty(&arch_dir)? {
        info!("deleted empty install state directory {}", arch_dir.display());
    }
    Ok(removed)
}

pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

pub fn remove_dir_if_empty(path: &Path) -> io::Result<bool> {
    let mut entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    let has_entries = entries.next().is_some();
    drop(entries);
    if has_entries {
        return Ok(false);
    }

    fs::remove_dir(path)?;
    Ok(true)
}
