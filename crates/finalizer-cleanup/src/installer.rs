use std::io;
use std::process::Command;

use finalizer_store::RecordStore;
use tracing::debug;

use crate::{InstallerError, ProductInstaller, RestartSignal, StoreLayout, UninstallFlags};

pub const DEFAULT_INSTALLER_PROGRAM: &str = "msiexec";

const EXIT_SUCCESS: i32 = 0;
const EXIT_UNKNOWN_PRODUCT: i32 = 1605;
const EXIT_INSTALL_FAILURE: i32 = 1603;
const EXIT_REBOOT_INITIATED: i32 = 1641;
const EXIT_REBOOT_REQUIRED: i32 = 3010;

pub type CommandRunner = fn(&mut Command) -> io::Result<Option<i32>>;

/// Removes products by running an external uninstall program; metadata comes from the store's
/// product catalog.
pub struct CommandInstaller<'a, S, R = CommandRunner> {
    store: &'a S,
    layout: &'a StoreLayout,
    program: String,
    run_command: R,
}

impl<'a, S: RecordStore> CommandInstaller<'a, S> {
    pub fn new(store: &'a S, layout: &'a StoreLayout, program: impl Into<String>) -> Self {
        Self {
            store,
            layout,
            program: program.into(),
            run_command: run_command_status,
        }
    }
}

impl<'a, S, R> CommandInstaller<'a, S, R>
where
    S: RecordStore,
    R: Fn(&mut Command) -> io::Result<Option<i32>>,
{
    pub fn with_runner(
        store: &'a S,
        layout: &'a StoreLayout,
        program: impl Into<String>,
        run_command: R,
    ) -> Self {
        Self {
            store,
            layout,
            program: program.into(),
            run_command,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl<S, R> ProductInstaller for CommandInstaller<'_, S, R>
where
    S: RecordStore,
    R: Fn(&mut Command) -> io::Result<Option<i32>>,
{
    fn query_product_property(
        &self,
        product_id: &str,
        property: &str,
    ) -> Result<String, InstallerError> {
        let Some(product) = self
            .store
            .try_open_container(&self.layout.product_path(product_id))?
        else {
            return Err(InstallerError::UnknownProduct(product_id.to_string()));
        };

        match self.store.read_string(&product, property) {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => Err(InstallerError::UnknownProperty {
                product_id: product_id.to_string(),
                property: property.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn configure_product_absent(
        &self,
        product_id: &str,
        flags: UninstallFlags,
    ) -> Result<RestartSignal, InstallerError> {
        let mut command = Command::new(&self.program);
        command.arg("/x").arg(product_id).arg("/qn");
        command.args(flags.to_properties());
        debug!("running {command:?}");

        let code = (self.run_command)(&mut command).map_err(|source| InstallerError::Launch {
            program: self.program.clone(),
            source,
        })?;
        map_exit_code(product_id, code.unwrap_or(EXIT_INSTALL_FAILURE))
    }
}

fn map_exit_code(product_id: &str, code: i32) -> Result<RestartSignal, InstallerError> {
    match code {
        EXIT_SUCCESS => Ok(RestartSignal::None),
        EXIT_REBOOT_REQUIRED => Ok(RestartSignal::Required),
        EXIT_REBOOT_INITIATED => Ok(RestartSignal::Initiated),
        EXIT_UNKNOWN_PRODUCT => Err(InstallerError::UnknownProduct(product_id.to_string())),
        code => Err(InstallerError::ServiceFailure {
            product_id: product_id.to_string(),
            code,
        }),
    }
}

fn run_command_status(command: &mut Command) -> io::Result<Option<i32>> {
    command.status().map(|status| status.code())
}
