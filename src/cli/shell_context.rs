use dialoguer::theme::ColorfulTheme;

use crate::{
    api::PurchaseApi,
    config::{Config, ConfigManager},
    core::WizardController,
    format::LocaleFormatter,
    storage::JsonFileStore,
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub wizard: WizardController,
    pub session_store: JsonFileStore,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub records: PurchaseApi,
    pub running: bool,
}

impl ShellContext {
    pub fn formatter(&self) -> LocaleFormatter {
        LocaleFormatter::from_config(&self.config)
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }
}
