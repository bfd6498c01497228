use std::collections::VecDeque;

use finalizer_core::DependentKey;
use finalizer_store::{RecordStore, StoreError};
use tracing::{debug, info, warn};

use crate::StoreLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetractionOutcome {
    NotFound,
    RemovedNotOrphaned,
    RemovedOrphaned(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRetraction {
    pub provider_key: String,
    pub outcome: RetractionOutcome,
}

/// Removes `dependent` from the first provider that carries it.
pub fn retract<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
    dependent: &DependentKey,
) -> Result<RetractionOutcome, StoreError> {
    let Some(provider_keys) = list_provider_keys(store, layout)? else {
        return Ok(RetractionOutcome::NotFound);
    };

    for provider_key in provider_keys {
        if let Some(outcome) = retract_from_provider(store, layout, &provider_key, dependent)? {
            return Ok(outcome);
        }
    }

    info!("dependent '{dependent}' is not registered with any provider");
    Ok(RetractionOutcome::NotFound)
}

/// Removes `dependent` from every provider that carries it, one entry per matching provider.
pub fn retract_all<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
    dependent: &DependentKey,
) -> Result<Vec<ProviderRetraction>, StoreError> {
    let Some(provider_keys) = list_provider_keys(store, layout)? else {
        return Ok(Vec::new());
    };

    let mut retractions = Vec::new();
    for provider_key in provider_keys {
        if let Some(outcome) = retract_from_provider(store, layout, &provider_key, dependent)? {
            retractions.push(ProviderRetraction {
                provider_key,
                outcome,
            });
        }
    }

    if retractions.is_empty() {
        info!("dependent '{dependent}' is not registered with any provider");
    }
    Ok(retractions)
}

fn list_provider_keys<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
) -> Result<Option<Vec<String>>, StoreError> {
    let root = layout.dependencies_root();
    let Some(handle) = store.try_open_container(root)? else {
        info!("dependency root {root} does not exist, nothing to retract");
        return Ok(None);
    };

    let provider_keys = store.child_names(&handle)?;
    info!("scanning {} provider(s) under {root}", provider_keys.len());
    Ok(Some(provider_keys))
}

fn retract_from_provider<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
    provider_key: &str,
    dependent: &DependentKey,
) -> Result<Option<RetractionOutcome>, StoreError> {
    let dependents_path = layout.dependents_path(provider_key);
    let Some(dependents) = store.try_open_container(&dependents_path)? else {
        debug!("provider '{provider_key}' has no dependents container, skipping");
        return Ok(None);
    };

    let mut pending: VecDeque<String> = store.child_names(&dependents)?.into();
    let mut removed = false;
    while let Some(entry) = pending.pop_front() {
        if !dependent.matches(&entry) {
            debug!("provider '{provider_key}' keeps dependent '{entry}'");
            continue;
        }

        info!("removing dependent '{entry}' from provider '{provider_key}'");
        match store.delete_child(&dependents, &entry, true) {
            Ok(()) => removed = true,
            Err(err) if err.is_not_found() => {
                warn!("dependent '{entry}' vanished from provider '{provider_key}' before removal");
                continue;
            }
            Err(err) => return Err(err),
        }

        let remaining = store.counts(&dependents)?.children;
        if remaining == 0 {
            info!("provider '{provider_key}' has no remaining dependents");
            return Ok(Some(RetractionOutcome::RemovedOrphaned(
                provider_key.to_string(),
            )));
        }
        debug!("provider '{provider_key}' still has {remaining} dependent(s)");
    }

    Ok(removed.then_some(RetractionOutcome::RemovedNotOrphaned))
}
