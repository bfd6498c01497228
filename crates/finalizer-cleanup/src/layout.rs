use finalizer_core::{Architecture, FeatureBand};
use finalizer_store::StorePath;

pub const DEPENDENTS_CONTAINER: &str = "Dependents";
pub const PRODUCT_ID_VALUE: &str = "ProductId";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    dependencies_root: StorePath,
    installed_versions_root: StorePath,
    feature_band_records_root: StorePath,
    prune_boundary: StorePath,
    product_catalog_root: StorePath,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            dependencies_root: StorePath::parse("SOFTWARE/Classes/Installer/Dependencies"),
            installed_versions_root: StorePath::parse("SOFTWARE/dotnet/Setup/InstalledVersions"),
            feature_band_records_root: StorePath::parse(
                "SOFTWARE/Microsoft/dotnet/InstalledWorkloads/Standalone",
            ),
            prune_boundary: StorePath::parse("SOFTWARE/Microsoft/dotnet"),
            product_catalog_root: StorePath::parse(
                "SOFTWARE/Microsoft/Windows/CurrentVersion/Uninstall",
            ),
        }
    }
}

impl StoreLayout {
    pub fn with_dependencies_root(mut self, path: StorePath) -> Self {
        self.dependencies_root = path;
        self
    }

    pub fn with_installed_versions_root(mut self, path: StorePath) -> Self {
        self.installed_versions_root = path;
        self
    }

    pub fn with_feature_band_records_root(mut self, path: StorePath) -> Self {
        self.feature_band_records_root = path;
        self
    }

    pub fn with_prune_boundary(mut self, path: StorePath) -> Self {
        self.prune_boundary = path;
        self
    }

    pub fn with_product_catalog_root(mut self, path: StorePath) -> Self {
        self.product_catalog_root = path;
        self
    }

    pub fn dependencies_root(&self) -> &StorePath {
        &self.dependencies_root
    }

    pub fn provider_path(&self, provider_key: &str) -> StorePath {
        self.dependencies_root.join(provider_key)
    }

    pub fn dependents_path(&self, provider_key: &str) -> StorePath {
        self.provider_path(provider_key).join(DEPENDENTS_CONTAINER)
    }

    pub fn installed_sdk_versions_path(&self, architecture: Architecture) -> StorePath {
        self.installed_versions_root
            .join(architecture.as_str())
            .join("sdk")
    }

    pub fn feature_band_records_path(
        &self,
        architecture: Architecture,
        band: &FeatureBand,
    ) -> StorePath {
        self.feature_band_records_root
            .join(architecture.as_str())
            .join(band.to_string())
    }

    pub fn prune_boundary(&self) -> &StorePath {
        &self.prune_boundary
    }

    pub fn product_path(&self, product_id: &str) -> StorePath {
        self.product_catalog_root.join(product_id)
    }
}
