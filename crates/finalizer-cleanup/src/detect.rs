use finalizer_core::{normalize, Architecture, FeatureBand};
use finalizer_store::{RecordStore, StoreError};
use tracing::{debug, info, warn};

use crate::StoreLayout;

pub fn feature_band_still_installed<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
    architecture: Architecture,
    band: &FeatureBand,
) -> Result<bool, StoreError> {
    let versions_path = layout.installed_sdk_versions_path(architecture);
    let Some(handle) = store.try_open_container(&versions_path)? else {
        info!("no installed SDK versions recorded under {versions_path}");
        return Ok(false);
    };

    for (version, _) in store.values(&handle)? {
        let installed_band = match normalize(&version) {
            Ok(installed_band) => installed_band,
            Err(err) => {
                warn!("ignoring installed SDK version '{version}': {err}");
                continue;
            }
        };

        if installed_band.matches(band) {
            info!("SDK {version} still claims feature band {band}");
            return Ok(true);
        }
        debug!("SDK {version} belongs to feature band {installed_band}");
    }

    Ok(false)
}
