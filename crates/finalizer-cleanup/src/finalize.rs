use std::io;
use std::path::{Path, PathBuf};

use finalizer_core::{
    normalize, Architecture, ArchitectureError, DependentKey, FeatureBand, VersionError,
};
use finalizer_store::{RecordStore, StoreError, StorePath};
use thiserror::Error;
use tracing::{error, info};

use crate::fs_utils::{install_state_dir, remove_install_state};
use crate::{
    feature_band_still_installed, prune_feature_band, retract_all, uninstall_if_orphaned,
    CoordinatorError, ProductInstaller, ProviderRetraction, RestartState, RetractionOutcome,
    StoreLayout,
};

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Architecture(#[from] ArchitectureError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Uninstall(#[from] CoordinatorError),
    #[error("failed to remove install state {path}: {source}")]
    InstallState {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct FinalizeContext<'a, S, I> {
    pub store: &'a S,
    pub installer: &'a I,
    pub layout: &'a StoreLayout,
    pub install_state_root: Option<&'a Path>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub feature_band: Option<FeatureBand>,
    pub dependent: DependentKey,
    pub still_installed: bool,
    pub retractions: Vec<ProviderRetraction>,
    pub restart: RestartState,
    pub pruned: Vec<StorePath>,
}

impl FinalizeReport {
    fn new(feature_band: Option<FeatureBand>, dependent: DependentKey) -> Self {
        Self {
            feature_band,
            dependent,
            still_installed: false,
            retractions: Vec::new(),
            restart: RestartState::None,
            pruned: Vec::new(),
        }
    }

    pub fn orphaned_providers(&self) -> impl Iterator<Item = &str> {
        self.retractions
            .iter()
            .filter_map(|retraction| match &retraction.outcome {
                RetractionOutcome::RemovedOrphaned(provider_key) => Some(provider_key.as_str()),
                _ => None,
            })
    }
}

/// Retracts an SDK feature band's registration after the SDK itself was removed.
pub fn finalize_sdk<S, I>(
    ctx: &FinalizeContext<'_, S, I>,
    sdk_version: &str,
    architecture: Architecture,
    component_id: &str,
) -> Result<FinalizeReport, FinalizeError>
where
    S: RecordStore,
    I: ProductInstaller,
{
    let band = normalize(sdk_version)?;
    let dependent = DependentKey::compose(component_id, &band, architecture);
    info!("SDK {sdk_version} maps to feature band {band}, dependent '{dependent}'");

    let mut report = FinalizeReport::new(Some(band.clone()), dependent);
    if feature_band_still_installed(ctx.store, ctx.layout, architecture, &band)? {
        info!("feature band {band} is still installed, nothing to finalize");
        report.still_installed = true;
        return Ok(report);
    }

    if let Some(err) = retract_and_uninstall(ctx, &mut report)? {
        error!("leaving feature band {band} records in place after a failed product removal");
        return Err(err.into());
    }

    report.pruned = prune_feature_band(ctx.store, ctx.layout, architecture, &band)?;
    if let Some(root) = ctx.install_state_root {
        remove_install_state(root, architecture, &band).map_err(|source| {
            FinalizeError::InstallState {
                path: install_state_dir(root, architecture, &band),
                source,
            }
        })?;
    }

    Ok(report)
}

/// Retracts one raw dependent key and removes any products it leaves orphaned.
pub fn remove_dependent<S, I>(
    ctx: &FinalizeContext<'_, S, I>,
    dependent: DependentKey,
) -> Result<FinalizeReport, FinalizeError>
where
    S: RecordStore,
    I: ProductInstaller,
{
    info!("removing dependent '{dependent}'");
    let mut report = FinalizeReport::new(None, dependent);
    match retract_and_uninstall(ctx, &mut report)? {
        Some(err) => Err(err.into()),
        None => Ok(report),
    }
}

fn retract_and_uninstall<S, I>(
    ctx: &FinalizeContext<'_, S, I>,
    report: &mut FinalizeReport,
) -> Result<Option<CoordinatorError>, FinalizeError>
where
    S: RecordStore,
    I: ProductInstaller,
{
    report.retractions = retract_all(ctx.store, ctx.layout, &report.dependent)?;

    let mut first_failure = None;
    let orphaned = report
        .orphaned_providers()
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    for provider_key in orphaned {
        match uninstall_if_orphaned(ctx.store, ctx.layout, ctx.installer, &provider_key) {
            Ok(restart) => report.restart = report.restart.combine(restart),
            Err(CoordinatorError::Store(err)) => return Err(err.into()),
            Err(err) => {
                error!("{err}");
                first_failure.get_or_insert(err);
            }
        }
    }

    Ok(first_failure)
}
