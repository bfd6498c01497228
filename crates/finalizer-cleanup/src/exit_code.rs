use finalizer_store::StoreError;

use crate::{CoordinatorError, FinalizeError, FinalizeReport, InstallerError, RestartState};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_PARAMETER: i32 = 87;
pub const EXIT_INSTALL_FAILURE: i32 = 1603;
pub const EXIT_UNKNOWN_PRODUCT: i32 = 1605;
pub const EXIT_INVALID_COMMAND_LINE: i32 = 1639;
pub const EXIT_RESTART_REQUIRED: i32 = 3010;

impl FinalizeReport {
    pub fn exit_code(&self) -> i32 {
        match self.restart {
            RestartState::None => EXIT_SUCCESS,
            RestartState::Required => EXIT_RESTART_REQUIRED,
        }
    }
}

impl FinalizeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            FinalizeError::Version(_) | FinalizeError::Architecture(_) => EXIT_INVALID_PARAMETER,
            FinalizeError::Store(err) => store_exit_code(err),
            FinalizeError::Uninstall(err) => coordinator_exit_code(err),
            FinalizeError::InstallState { source, .. } => {
                source.raw_os_error().unwrap_or(EXIT_FAILURE)
            }
        }
    }
}

fn store_exit_code(err: &StoreError) -> i32 {
    err.raw_os_error().unwrap_or(EXIT_FAILURE)
}

fn coordinator_exit_code(err: &CoordinatorError) -> i32 {
    match err {
        CoordinatorError::Store(err) => store_exit_code(err),
        CoordinatorError::Query { source, .. } | CoordinatorError::Uninstall { source, .. } => {
            installer_exit_code(source)
        }
    }
}

fn installer_exit_code(err: &InstallerError) -> i32 {
    match err {
        InstallerError::UnknownProduct(_) => EXIT_UNKNOWN_PRODUCT,
        InstallerError::ServiceFailure { code, .. } => *code,
        InstallerError::UnknownProperty { .. } | InstallerError::Launch { .. } => {
            EXIT_INSTALL_FAILURE
        }
        InstallerError::Catalog(err) => store_exit_code(err),
    }
}
