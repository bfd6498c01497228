mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use config::FinalizerConfig;
use finalizer_cleanup::{
    finalize_sdk, remove_dependent, CommandInstaller, FinalizeContext, FinalizeError,
    FinalizeReport, EXIT_FAILURE, EXIT_INVALID_COMMAND_LINE, EXIT_SUCCESS,
};
use finalizer_core::{Architecture, DependentKey};
use finalizer_store::FsStore;
use logging::open_log_sink;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "finalizer")]
#[command(about = "Retracts SDK feature band registrations left behind after uninstall", long_about = None)]
struct Cli {
    log_path: PathBuf,
    dependent_or_version: String,
    architecture: Option<String>,
}

enum Target {
    FeatureBand {
        sdk_version: String,
        architecture: Architecture,
    },
    Dependent(DependentKey),
}

impl Cli {
    fn target(&self) -> Result<Target, FinalizeError> {
        match self.architecture.as_deref() {
            Some(architecture) => Ok(Target::FeatureBand {
                sdk_version: self.dependent_or_version.clone(),
                architecture: Architecture::parse(architecture)?,
            }),
            None => Ok(Target::Dependent(DependentKey::new(
                self.dependent_or_version.clone(),
            ))),
        }
    }
}

fn main() {
    let code = match Cli::try_parse() {
        Ok(cli) => run(&cli),
        Err(err) => {
            let _ = err.print();
            parse_error_exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_INVALID_COMMAND_LINE,
    }
}

fn run(cli: &Cli) -> i32 {
    let _sink = match open_log_sink(&cli.log_path) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("error: {err:#}");
            return EXIT_FAILURE;
        }
    };

    let outcome = FinalizerConfig::load().and_then(|config| execute(cli, &config));
    match outcome {
        Ok(report) => {
            let code = report.exit_code();
            info!(
                "finalizer finished: {} provider(s) updated, {} orphaned, {} container(s) pruned, exit code {code}",
                report.retractions.len(),
                report.orphaned_providers().count(),
                report.pruned.len()
            );
            code
        }
        Err(err) => {
            let code = error_exit_code(&err);
            error!("finalizer failed with exit code {code}: {err:#}");
            code
        }
    }
}

fn execute(cli: &Cli, config: &FinalizerConfig) -> Result<FinalizeReport> {
    let target = cli.target()?;
    let layout = config.store_layout();
    let store_root = config.store_root()?;
    info!("using record store at {}", store_root.display());

    let store = FsStore::new(store_root);
    let installer = CommandInstaller::new(&store, &layout, config.installer_program());
    let ctx = FinalizeContext {
        store: &store,
        installer: &installer,
        layout: &layout,
        install_state_root: config.install_state_root.as_deref(),
    };

    let report = match target {
        Target::FeatureBand {
            sdk_version,
            architecture,
        } => finalize_sdk(&ctx, &sdk_version, architecture, config.component_id())?,
        Target::Dependent(dependent) => remove_dependent(&ctx, dependent)?,
    };
    Ok(report)
}

fn error_exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<FinalizeError>()
        .map_or(EXIT_FAILURE, FinalizeError::exit_code)
}

#[cfg(test)]
mod tests;
