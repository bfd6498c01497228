use super::*;

#[test]
fn normalize_rounds_patch_down_to_feature_band() {
    let band = normalize("6.0.305").expect("version must normalize");
    assert_eq!(band.to_string(), "6.0.300");
    assert_eq!(band.band, 300);
    assert!(band.prerelease.is_none());
}

#[test]
fn normalize_drops_ci_and_dev_labels() {
    assert_eq!(
        normalize("6.0.108-ci").expect("ci build must normalize").to_string(),
        "6.0.100"
    );
    assert_eq!(
        normalize("8.0.412-dev.3.77")
            .expect("dev build must normalize")
            .to_string(),
        "8.0.400"
    );
    assert_eq!(
        normalize("7.0.100-CI.22.1")
            .expect("label match ignores case")
            .to_string(),
        "7.0.100"
    );
}

#[test]
fn normalize_keeps_first_two_prerelease_segments() {
    assert_eq!(
        normalize("6.0.207-preview.19")
            .expect("preview must normalize")
            .to_string(),
        "6.0.200-preview.19"
    );
    assert_eq!(
        normalize("6.0.100-rc.2.21505.57")
            .expect("rc must normalize")
            .to_string(),
        "6.0.100-rc.2"
    );
    assert_eq!(
        normalize("9.0.100-alpha")
            .expect("single label must normalize")
            .to_string(),
        "9.0.100-alpha"
    );
}

#[test]
fn normalize_rejects_patch_below_one_hundred() {
    let err = normalize("6.0.50").expect_err("patch below 100 must fail");
    assert_eq!(
        err,
        VersionError::InvalidFeatureBand {
            version: "6.0.50".to_string(),
            patch: 50,
        }
    );
}

#[test]
fn normalize_rejects_malformed_versions() {
    for raw in ["6.0", "", "6.x.100", "6..100", "6.0.100-", "6.0.100-rc..1", "-6.0.100"] {
        let err = normalize(raw).expect_err("malformed version must fail");
        assert_eq!(err, VersionError::InvalidFormat(raw.to_string()), "{raw}");
    }
}

#[test]
fn normalize_accepts_extra_numeric_segments() {
    let band = normalize("6.0.401.1").expect("four segments must normalize");
    assert_eq!(band.to_string(), "6.0.400");
}

#[test]
fn normalized_band_is_always_multiple_of_one_hundred() {
    for patch in [100_u32, 101, 199, 200, 999, 1234] {
        let version = format!("8.0.{patch}");
        let first = normalize(&version).expect("version must normalize");
        let second = normalize(&version).expect("version must normalize");
        assert_eq!(first, second);
        assert_eq!(first.band % 100, 0, "{version}");
        assert!(first.band <= patch);
    }
}

#[test]
fn semantic_version_keeps_full_prerelease_label() {
    let parsed = SemanticVersion::parse("6.0.207-preview.19.1").expect("must parse");
    assert_eq!(parsed.major, 6);
    assert_eq!(parsed.minor, 0);
    assert_eq!(parsed.patch, 207);
    assert_eq!(parsed.prerelease.as_deref(), Some("preview.19.1"));
    assert_eq!(parsed.to_string(), "6.0.207-preview.19.1");
}

#[test]
fn feature_band_matching_ignores_case() {
    let upper = normalize("6.0.200-Preview.1").expect("must normalize");
    let lower = normalize("6.0.299-preview.1.5").expect("must normalize");
    assert_ne!(upper, lower);
    assert!(upper.matches(&lower));
    assert!(!upper.matches(&normalize("6.0.200").expect("must normalize")));
}

#[test]
fn dependent_key_composition_and_matching() {
    let band = normalize("6.0.305").expect("must normalize");
    let key = DependentKey::compose(DEFAULT_COMPONENT_ID, &band, Architecture::X64);
    assert_eq!(key.as_str(), "Microsoft.NET.Sdk,6.0.300,x64");
    assert!(key.matches("microsoft.net.sdk,6.0.300,X64"));
    assert!(!key.matches("Microsoft.NET.Sdk,6.0.300,arm64"));
}

#[test]
fn architecture_parses_case_insensitively() {
    assert_eq!(Architecture::parse("X64").expect("x64"), Architecture::X64);
    assert_eq!(Architecture::parse("arm64").expect("arm64"), Architecture::Arm64);
    assert_eq!(Architecture::parse(" x86 ").expect("x86"), Architecture::X86);
    assert_eq!(
        Architecture::parse("ia64").expect_err("unsupported"),
        ArchitectureError("ia64".to_string())
    );
}

#[test]
fn eq_ignore_case_compares_ordinally() {
    assert!(eq_ignore_case("Dependents", "DEPENDENTS"));
    assert!(!eq_ignore_case("Dependents", "Dependent"));
    assert!(eq_ignore_case("", ""));
}
