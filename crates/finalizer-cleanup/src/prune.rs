use finalizer_core::{Architecture, FeatureBand};
use finalizer_store::{RecordStore, StoreError, StorePath};
use tracing::{debug, info};

use crate::StoreLayout;

/// Deletes the feature band's record subtree, then removes each ancestor it leaves empty.
///
/// The walk never deletes the layout's prune boundary or anything above it, and it stops at the
/// first ancestor that still holds values or child containers. Returns every deleted path,
/// deepest first.
pub fn prune_feature_band<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
    architecture: Architecture,
    band: &FeatureBand,
) -> Result<Vec<StorePath>, StoreError> {
    let record = layout.feature_band_records_path(architecture, band);
    let mut pruned = Vec::new();
    if delete_container(store, &record, true)? {
        info!("deleted feature band records {record}");
        pruned.push(record.clone());
    } else {
        info!("feature band records {record} do not exist");
    }

    pruned.extend(prune_empty_ancestors(store, &record, layout.prune_boundary())?);
    Ok(pruned)
}

pub fn prune_empty_ancestors<S: RecordStore>(
    store: &S,
    path: &StorePath,
    boundary: &StorePath,
) -> Result<Vec<StorePath>, StoreError> {
    let mut ancestors = Vec::new();
    let mut current = path.parent();
    while let Some(ancestor) = current {
        if ancestor.len() <= boundary.len() || !ancestor.starts_with(boundary) {
            break;
        }
        current = ancestor.parent();
        ancestors.push(ancestor);
    }

    let mut pruned = Vec::new();
    for ancestor in ancestors {
        let Some(handle) = store.try_open_container(&ancestor)? else {
            debug!("{ancestor} does not exist, checking its parent");
            continue;
        };

        let counts = store.counts(&handle)?;
        if !counts.is_empty() {
            info!(
                "{ancestor} still holds {} container(s) and {} value(s), pruning stops",
                counts.children, counts.values
            );
            break;
        }
        drop(handle);

        if delete_container(store, &ancestor, false)? {
            info!("deleted empty container {ancestor}");
            pruned.push(ancestor);
        }
    }

    Ok(pruned)
}

fn delete_container<S: RecordStore>(
    store: &S,
    path: &StorePath,
    recursive: bool,
) -> Result<bool, StoreError> {
    let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
        return Ok(false);
    };
    let Some(parent_handle) = store.try_open_container(&parent)? else {
        return Ok(false);
    };

    match store.delete_child(&parent_handle, name, recursive) {
        Ok(()) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}
