use super::*;

use std::fs;

use finalizer_cleanup::{
    StoreLayout, EXIT_INVALID_PARAMETER, EXIT_RESTART_REQUIRED, PRODUCT_ID_VALUE,
};
use finalizer_store::{RecordStore, StorePath};

const SDK_300_X64: &str = "Microsoft.NET.Sdk,6.0.300,x64";

fn test_root(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "finalizer-cli-{name}-{}-{nanos}",
        std::process::id()
    ))
}

fn test_config(root: &std::path::Path) -> FinalizerConfig {
    FinalizerConfig {
        store_root: Some(root.join("store")),
        install_state_root: Some(root.join("state")),
        installer_program: Some("missing-installer".to_string()),
        ..FinalizerConfig::default()
    }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("finalizer").chain(args.iter().copied()))
        .expect("arguments must parse")
}

fn seed_store(store: &FsStore, layout: &StoreLayout) -> StorePath {
    store
        .create_container(&layout.dependents_path("pack.a").join(SDK_300_X64))
        .expect("must seed pack.a");
    store
        .create_container(
            &layout
                .dependents_path("pack.b")
                .join("Microsoft.NET.Sdk,7.0.100,x64"),
        )
        .expect("must seed pack.b");
    store
        .set_value(&layout.provider_path("pack.b"), PRODUCT_ID_VALUE, b"{B}")
        .expect("must seed product id");

    let record = StorePath::parse(
        "SOFTWARE/Microsoft/dotnet/InstalledWorkloads/Standalone/x64/6.0.300",
    );
    store
        .create_container(&record.join("microsoft-net-sdk-android"))
        .expect("must seed band records");
    record
}

#[test]
fn cli_accepts_version_and_dependent_forms() {
    let cli = parse(&["finalizer.log", "6.0.305", "X64"]);
    assert_eq!(cli.log_path, PathBuf::from("finalizer.log"));
    match cli.target().expect("architecture must parse") {
        Target::FeatureBand {
            sdk_version,
            architecture,
        } => {
            assert_eq!(sdk_version, "6.0.305");
            assert_eq!(architecture, Architecture::X64);
        }
        Target::Dependent(_) => panic!("three arguments must select the feature band form"),
    }

    let cli = parse(&["finalizer.log", SDK_300_X64]);
    match cli.target().expect("dependent form never fails") {
        Target::Dependent(dependent) => assert_eq!(dependent.as_str(), SDK_300_X64),
        Target::FeatureBand { .. } => panic!("two arguments must select the dependent form"),
    }
}

#[test]
fn cli_rejects_wrong_argument_count() {
    for args in [
        vec!["finalizer"],
        vec!["finalizer", "finalizer.log"],
        vec!["finalizer", "finalizer.log", "6.0.305", "x64", "extra"],
    ] {
        let err = Cli::try_parse_from(args).expect_err("argument count must be validated");
        assert_eq!(parse_error_exit_code(&err), EXIT_INVALID_COMMAND_LINE);
    }

    let help = Cli::try_parse_from(["finalizer", "--help"]).expect_err("help short-circuits");
    assert_eq!(help.kind(), ErrorKind::DisplayHelp);
    assert_eq!(parse_error_exit_code(&help), EXIT_SUCCESS);
}

#[test]
fn unknown_architecture_fails_before_store_access() {
    let root = test_root("bad-arch");
    let cli = parse(&["finalizer.log", "6.0.305", "sparc"]);

    let err = execute(&cli, &test_config(&root)).expect_err("architecture must be rejected");
    assert_eq!(error_exit_code(&err), EXIT_INVALID_PARAMETER);
    assert!(!root.exists());
}

#[test]
fn malformed_version_maps_to_invalid_parameter() {
    let root = test_root("bad-version");
    let cli = parse(&["finalizer.log", "6.0", "x64"]);

    let err = execute(&cli, &test_config(&root)).expect_err("version must be rejected");
    assert_eq!(error_exit_code(&err), EXIT_INVALID_PARAMETER);
}

#[test]
fn non_finalize_errors_map_to_generic_failure() {
    let err = anyhow::anyhow!("config is broken");
    assert_eq!(error_exit_code(&err), EXIT_FAILURE);
}

#[test]
fn execute_finalizes_feature_band_in_fs_store() {
    let root = test_root("finalize");
    let config = test_config(&root);
    let layout = config.store_layout();
    let store = FsStore::new(root.join("store"));
    let record = seed_store(&store, &layout);
    let state_dir = root.join("state").join("x64").join("6.0.300");
    fs::create_dir_all(&state_dir).expect("must create install state");

    let cli = parse(&["finalizer.log", "6.0.305", "x64"]);
    let report = execute(&cli, &config).expect("finalize must succeed");

    assert_eq!(report.orphaned_providers().collect::<Vec<_>>(), vec!["pack.a"]);
    assert_eq!(report.exit_code(), EXIT_SUCCESS);
    assert!(store
        .try_open_container(&record)
        .expect("lookup must succeed")
        .is_none());
    assert!(store
        .try_open_container(&StorePath::parse("SOFTWARE/Microsoft/dotnet"))
        .expect("lookup must succeed")
        .is_some());
    assert!(!state_dir.exists());

    let dependents = store
        .open_container(&layout.dependents_path("pack.b"))
        .expect("pack.b keeps its dependents");
    assert_eq!(
        store.child_names(&dependents).expect("must enumerate"),
        vec!["Microsoft.NET.Sdk,7.0.100,x64"]
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn execute_removes_raw_dependent_without_pruning() {
    let root = test_root("dependent");
    let config = test_config(&root);
    let layout = config.store_layout();
    let store = FsStore::new(root.join("store"));
    let record = seed_store(&store, &layout);

    let cli = parse(&["finalizer.log", "microsoft.net.sdk,6.0.300,X64"]);
    let report = execute(&cli, &config).expect("dependent removal must succeed");

    assert_eq!(report.orphaned_providers().collect::<Vec<_>>(), vec!["pack.a"]);
    assert!(report.pruned.is_empty());
    assert!(store
        .try_open_container(&record)
        .expect("lookup must succeed")
        .is_some());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn execute_surfaces_installer_launch_failure() {
    let root = test_root("launch");
    let config = test_config(&root);
    let layout = config.store_layout();
    let store = FsStore::new(root.join("store"));
    store
        .create_container(&layout.dependents_path("pack.b").join(SDK_300_X64))
        .expect("must seed pack.b");
    store
        .set_value(&layout.provider_path("pack.b"), PRODUCT_ID_VALUE, b"{B}")
        .expect("must seed product id");
    store
        .set_value(&layout.product_path("{B}"), "ProductName", b"Pack B")
        .expect("must seed product catalog");

    let cli = parse(&["finalizer.log", SDK_300_X64]);
    let err = execute(&cli, &config).expect_err("missing installer program must fail");
    assert_eq!(error_exit_code(&err), 1603);
    assert_ne!(error_exit_code(&err), EXIT_RESTART_REQUIRED);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn config_parses_overrides() {
    let config = FinalizerConfig::parse(
        r#"
store_root = "/var/lib/finalizer"
install_state_root = "/var/lib/finalizer/state"
installer_program = "/usr/local/bin/pkg-remove"
component_id = "Contoso.Sdk"

[layout]
dependencies_root = "deps"
prune_boundary = 'SOFTWARE\Contoso'
"#,
    )
    .expect("config must parse");

    assert_eq!(config.store_root().expect("explicit root"), PathBuf::from("/var/lib/finalizer"));
    assert_eq!(config.installer_program(), "/usr/local/bin/pkg-remove");
    assert_eq!(config.component_id(), "Contoso.Sdk");

    let layout = config.store_layout();
    assert_eq!(layout.dependencies_root(), &StorePath::parse("deps"));
    assert_eq!(layout.prune_boundary(), &StorePath::parse("SOFTWARE/Contoso"));
    assert_eq!(
        layout.product_path("{A}"),
        StoreLayout::default().product_path("{A}")
    );
}

#[test]
fn config_defaults_when_empty() {
    let config = FinalizerConfig::parse("").expect("empty config must parse");
    assert_eq!(config, FinalizerConfig::default());
    assert_eq!(config.installer_program(), "msiexec");
    assert_eq!(config.component_id(), "Microsoft.NET.Sdk");
    assert_eq!(config.store_layout(), StoreLayout::default());
}

#[test]
fn config_rejects_unknown_fields() {
    let err = FinalizerConfig::parse("registry_root = \"/tmp\"").expect_err("unknown key");
    assert!(err.to_string().contains("invalid finalizer config"));
}

#[test]
fn config_reports_missing_file() {
    let path = test_root("missing-config").join("finalizer.toml");
    let err = FinalizerConfig::from_file(&path).expect_err("missing file must fail");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn log_sink_appends_across_runs() {
    let root = test_root("log");
    let path = root.join("logs").join("finalizer.log");

    {
        let _sink = open_log_sink(&path).expect("must open log sink");
        info!("first run");
    }
    {
        let _sink = open_log_sink(&path).expect("must reopen log sink");
        info!("second run");
    }

    let contents = fs::read_to_string(&path).expect("must read log");
    let first = contents.find("first run").expect("first line must be kept");
    let second = contents.find("second run").expect("second line must be appended");
    assert!(first < second);
    assert!(!contents.contains('\u{1b}'), "log must not contain ANSI escapes");

    let _ = fs::remove_dir_all(&root);
}
