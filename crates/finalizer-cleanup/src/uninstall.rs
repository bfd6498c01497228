use std::io;

use finalizer_store::{RecordStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::{StoreLayout, PRODUCT_ID_VALUE};

pub const PRODUCT_NAME_PROPERTY: &str = "ProductName";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestartState {
    #[default]
    None,
    Required,
}

impl RestartState {
    pub fn combine(self, other: RestartState) -> RestartState {
        match (self, other) {
            (RestartState::None, RestartState::None) => RestartState::None,
            _ => RestartState::Required,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartSignal {
    None,
    Initiated,
    Required,
}

impl From<RestartSignal> for RestartState {
    fn from(signal: RestartSignal) -> Self {
        match signal {
            RestartSignal::Initiated | RestartSignal::Required => RestartState::Required,
            RestartSignal::None => RestartState::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UninstallFlags {
    pub fast_install: bool,
    pub ignore_dependencies: bool,
    pub suppress_reboot: bool,
}

impl UninstallFlags {
    /// Flags for a cascading removal that must not be blocked by the dependency check it resolves.
    pub const CASCADING: UninstallFlags = UninstallFlags {
        fast_install: true,
        ignore_dependencies: true,
        suppress_reboot: true,
    };

    pub fn to_properties(&self) -> Vec<String> {
        let mut properties = Vec::new();
        if self.fast_install {
            properties.push("MSIFASTINSTALL=7".to_string());
        }
        if self.ignore_dependencies {
            properties.push("IGNOREDEPENDENCIES=ALL".to_string());
        }
        if self.suppress_reboot {
            properties.push("REBOOT=ReallySuppress".to_string());
        }
        properties
    }
}

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("unknown product {0}")]
    UnknownProduct(String),
    #[error("unknown property '{property}' for product {product_id}")]
    UnknownProperty {
        product_id: String,
        property: String,
    },
    #[error("installer service failed for product {product_id} with code {code}")]
    ServiceFailure { product_id: String, code: i32 },
    #[error("failed to launch installer '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] StoreError),
}

pub trait ProductInstaller {
    fn query_product_property(
        &self,
        product_id: &str,
        property: &str,
    ) -> Result<String, InstallerError>;

    fn configure_product_absent(
        &self,
        product_id: &str,
        flags: UninstallFlags,
    ) -> Result<RestartSignal, InstallerError>;
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to query product {product_id}: {source}")]
    Query {
        product_id: String,
        #[source]
        source: InstallerError,
    },
    #[error("failed to uninstall product {product_id}: {source}")]
    Uninstall {
        product_id: String,
        #[source]
        source: InstallerError,
    },
}

pub fn uninstall_if_orphaned<S, I>(
    store: &S,
    layout: &StoreLayout,
    installer: &I,
    provider_key: &str,
) -> Result<RestartState, CoordinatorError>
where
    S: RecordStore,
    I: ProductInstaller,
{
    let Some(product_id) = read_product_id(store, layout, provider_key)? else {
        warn!("provider '{provider_key}' has no product id, assuming its product is already removed");
        return Ok(RestartState::None);
    };

    match installer.query_product_property(&product_id, PRODUCT_NAME_PROPERTY) {
        Ok(name) => info!("uninstalling '{name}' ({product_id}) owned by provider '{provider_key}'"),
        Err(InstallerError::UnknownProduct(_)) => {
            info!("product {product_id} is not installed, provider '{provider_key}' was left behind");
            return Ok(RestartState::None);
        }
        Err(InstallerError::UnknownProperty { .. }) => {
            info!("uninstalling {product_id} owned by provider '{provider_key}'");
        }
        Err(InstallerError::Catalog(err)) => return Err(CoordinatorError::Store(err)),
        Err(source) => {
            return Err(CoordinatorError::Query { product_id, source });
        }
    }

    match installer.configure_product_absent(&product_id, UninstallFlags::CASCADING) {
        Ok(signal) => {
            let restart = RestartState::from(signal);
            info!("removed product {product_id} (restart signal: {signal:?})");
            Ok(restart)
        }
        Err(InstallerError::UnknownProduct(_)) => {
            info!("product {product_id} disappeared before removal");
            Ok(RestartState::None)
        }
        Err(InstallerError::Catalog(err)) => Err(CoordinatorError::Store(err)),
        Err(source) => Err(CoordinatorError::Uninstall { product_id, source }),
    }
}

fn read_product_id<S: RecordStore>(
    store: &S,
    layout: &StoreLayout,
    provider_key: &str,
) -> Result<Option<String>, StoreError> {
    let Some(provider) = store.try_open_container(&layout.provider_path(provider_key))? else {
        return Ok(None);
    };

    let product_id = match store.read_string(&provider, PRODUCT_ID_VALUE) {
        Ok(product_id) => product_id,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };

    let trimmed = product_id.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
