use std::fmt;

use crate::{eq_ignore_case, Architecture, FeatureBand};

pub const DEFAULT_COMPONENT_ID: &str = "Microsoft.NET.Sdk";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependentKey(String);

impl DependentKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn compose(component_id: &str, band: &FeatureBand, architecture: Architecture) -> Self {
        Self(format!("{component_id},{band},{architecture}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, candidate: &str) -> bool {
        eq_ignore_case(&self.0, candidate)
    }
}

impl fmt::Display for DependentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
