use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use finalizer_cleanup::{StoreLayout, DEFAULT_INSTALLER_PROGRAM};
use finalizer_core::DEFAULT_COMPONENT_ID;
use finalizer_store::StorePath;
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "FINALIZER_CONFIG";
pub const STORE_ROOT_ENV: &str = "FINALIZER_STORE_ROOT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinalizerConfig {
    pub store_root: Option<PathBuf>,
    pub install_state_root: Option<PathBuf>,
    pub installer_program: Option<String>,
    pub component_id: Option<String>,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub dependencies_root: Option<String>,
    pub installed_versions_root: Option<String>,
    pub feature_band_records_root: Option<String>,
    pub prune_boundary: Option<String>,
    pub product_catalog_root: Option<String>,
}

impl FinalizerConfig {
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid finalizer config")
    }

    pub fn store_root(&self) -> Result<PathBuf> {
        match &self.store_root {
            Some(root) => Ok(root.clone()),
            None => default_store_root(),
        }
    }

    pub fn installer_program(&self) -> &str {
        self.installer_program
            .as_deref()
            .unwrap_or(DEFAULT_INSTALLER_PROGRAM)
    }

    pub fn component_id(&self) -> &str {
        self.component_id.as_deref().unwrap_or(DEFAULT_COMPONENT_ID)
    }

    pub fn store_layout(&self) -> StoreLayout {
        let mut layout = StoreLayout::default();
        let overrides = &self.layout;
        if let Some(path) = &overrides.dependencies_root {
            layout = layout.with_dependencies_root(StorePath::parse(path));
        }
        if let Some(path) = &overrides.installed_versions_root {
            layout = layout.with_installed_versions_root(StorePath::parse(path));
        }
        if let Some(path) = &overrides.feature_band_records_root {
            layout = layout.with_feature_band_records_root(StorePath::parse(path));
        }
        if let Some(path) = &overrides.prune_boundary {
            layout = layout.with_prune_boundary(StorePath::parse(path));
        }
        if let Some(path) = &overrides.product_catalog_root {
            layout = layout.with_product_catalog_root(StorePath::parse(path));
        }
        layout
    }
}

pub fn default_store_root() -> Result<PathBuf> {
    if let Some(root) = env::var_os(STORE_ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }

    if cfg!(windows) {
        let program_data = env::var("ProgramData")
            .context("ProgramData is not set; cannot resolve Windows store root")?;
        return Ok(PathBuf::from(program_data).join("Finalizer").join("store"));
    }

    let home = env::var("HOME").context("HOME is not set; cannot resolve store root")?;
    Ok(PathBuf::from(home).join(".finalizer").join("store"))
}
