use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::eq_ignore_case;

const FEATURE_BAND_WIDTH: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version format: '{0}'")]
    InvalidFormat(String),
    #[error("invalid feature band in version '{version}': patch {patch} is below 100")]
    InvalidFeatureBand { version: String, patch: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prerelease: Option<String>,
}

/// Coarse version bucket `major.minor.XX00`, optionally carrying a shortened prerelease label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureBand {
    pub major: u32,
    pub minor: u32,
    pub band: u32,
    pub prerelease: Option<String>,
}

impl SemanticVersion {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let invalid = || VersionError::InvalidFormat(input.to_string());

        let (core, prerelease) = match trimmed.split_once('-') {
            Some((core, label)) => (core, Some(label)),
            None => (trimmed, None),
        };

        let segments = core.split('.').collect::<Vec<_>>();
        if segments.len() < 3 {
            return Err(invalid());
        }
        let mut numbers = Vec::with_capacity(segments.len());
        for segment in &segments {
            numbers.push(parse_numeric_segment(segment).ok_or_else(invalid)?);
        }

        let prerelease = match prerelease {
            Some(label) if label.is_empty() || label.split('.').any(str::is_empty) => {
                return Err(invalid());
            }
            Some(label) => Some(label.to_string()),
            None => None,
        };

        let patch = numbers[2];
        if patch < FEATURE_BAND_WIDTH {
            return Err(VersionError::InvalidFeatureBand {
                version: input.to_string(),
                patch,
            });
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch,
            prerelease,
        })
    }

    pub fn feature_band(&self) -> FeatureBand {
        FeatureBand {
            major: self.major,
            minor: self.minor,
            band: self.patch - (self.patch % FEATURE_BAND_WIDTH),
            prerelease: self.prerelease.as_deref().and_then(feature_band_label),
        }
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(label) = &self.prerelease {
            write!(f, "-{label}")?;
        }
        Ok(())
    }
}

impl FeatureBand {
    pub fn matches(&self, other: &FeatureBand) -> bool {
        eq_ignore_case(&self.to_string(), &other.to_string())
    }
}

impl fmt::Display for FeatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.band)?;
        if let Some(label) = &self.prerelease {
            write!(f, "-{label}")?;
        }
        Ok(())
    }
}

pub fn normalize(version: &str) -> Result<FeatureBand, VersionError> {
    SemanticVersion::parse(version).map(|parsed| parsed.feature_band())
}

fn parse_numeric_segment(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

// CI and dev builds collapse onto the plain band.
fn feature_band_label(prerelease: &str) -> Option<String> {
    let mut segments = prerelease.split('.');
    let first = segments.next()?;
    if first.eq_ignore_ascii_case("dev") || first.eq_ignore_ascii_case("ci") {
        return None;
    }

    Some(match segments.next() {
        Some(second) => format!("{first}.{second}"),
        None => first.to_string(),
    })
}
