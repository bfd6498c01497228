mod arch;
mod dependent;
mod version;

pub use arch::{Architecture, ArchitectureError};
pub use dependent::{DependentKey, DEFAULT_COMPONENT_ID};
pub use version::{normalize, FeatureBand, SemanticVersion, VersionError};

/// Case-insensitive ordinal comparison used for store key matching.
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_uppercase)
        .eq(right.chars().flat_map(char::to_uppercase))
}

#[cfg(test)]
mod tests;
