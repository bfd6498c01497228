mod detect;
mod exit_code;
mod finalize;
mod fs_utils;
mod installer;
mod layout;
mod prune;
mod retract;
mod uninstall;

pub use detect::feature_band_still_installed;
pub use exit_code::{
    EXIT_FAILURE, EXIT_INSTALL_FAILURE, EXIT_INVALID_COMMAND_LINE, EXIT_INVALID_PARAMETER,
    EXIT_RESTART_REQUIRED, EXIT_SUCCESS, EXIT_UNKNOWN_PRODUCT,
};
pub use finalize::{
    finalize_sdk, remove_dependent, FinalizeContext, FinalizeError, FinalizeReport,
};
pub use fs_utils::{install_state_dir, remove_install_state};
pub use installer::{CommandInstaller, CommandRunner, DEFAULT_INSTALLER_PROGRAM};
pub use layout::{StoreLayout, DEPENDENTS_CONTAINER, PRODUCT_ID_VALUE};
pub use prune::{prune_empty_ancestors, prune_feature_band};
pub use retract::{retract, retract_all, ProviderRetraction, RetractionOutcome};
pub use uninstall::{
    uninstall_if_orphaned, CoordinatorError, InstallerError, ProductInstaller, RestartSignal,
    RestartState, UninstallFlags, PRODUCT_NAME_PROPERTY,
};
