//! Core CLI loop, dispatch, and shell context helpers.

use std::{io, path::PathBuf};

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tracing::warn;

use crate::{
    api::{PurchaseApi, RecordStore},
    config::ConfigManager,
    core::{
        services::{sort_for_display, ServiceError},
        utils::PathResolver,
        WizardController, WizardEffect, WizardError,
    },
    domain::{PurchaseId, SessionState},
    errors::SplitError,
    storage::{session, JsonFileStore},
};

pub use crate::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    /// Builds a shell whose config, session and records live under `base`.
    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        output::set_preferences(OutputPreferences {
            plain_mode: mode == CliMode::Script,
            quiet_mode: false,
        });

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = match config_manager.load() {
            Ok(config) => config,
            Err(err) => {
                cli_io::print_warning(format!("{err}. Using default settings."));
                Default::default()
            }
        };

        let session_store = JsonFileStore::in_data_dir(Some(base.clone()));
        let records = PurchaseApi::new(RecordStore::in_data_dir(Some(base)));
        let fresh = SessionState::with_names(config.default_names());
        let state = restore_session(&session_store, fresh);

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            wizard: WizardController::from_state(state),
            session_store,
            config_manager,
            config,
            records,
            running: true,
        })
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    /// `[3/5 Incomes] > `
    pub(crate) fn prompt(&self) -> String {
        let step = self.wizard.step();
        format!("[{}/5 {}] > ", step.number(), step.title())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        let outcome = handler(self, args);
        self.apply_effects();
        match outcome {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }

    /// Acts on everything the wizard queued: persists on state changes and
    /// prints a banner for celebrations.
    pub(crate) fn apply_effects(&mut self) {
        let effects = self.wizard.take_effects();
        if effects.contains(&WizardEffect::StateChanged) {
            self.persist_session();
        }
        if effects.contains(&WizardEffect::Celebrate) {
            output::celebrate("Nice!");
        }
    }

    /// Saves the session. Failures are logged and reported, never fatal.
    pub(crate) fn persist_session(&mut self) {
        if let Err(err) = session::save(&mut self.session_store, self.wizard.state()) {
            warn!(
                error = %err,
                path = %self.session_store.path().display(),
                "failed to save session"
            );
            cli_io::print_warning(format!("Session not saved: {err}"));
        }
    }

    /// Resolves `#N` (position in the displayed list) or a raw identifier.
    pub(crate) fn resolve_purchase(&self, token: &str) -> Result<PurchaseId, CommandError> {
        let token = token.trim();
        if let Some(position) = token.strip_prefix('#') {
            let index: usize = position.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("invalid list position `{}`", token))
            })?;
            let ordered = sort_for_display(self.wizard.purchases().iter());
            return index
                .checked_sub(1)
                .and_then(|idx| ordered.get(idx))
                .map(|purchase| purchase.id)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!("no purchase at position {}", token))
                });
        }
        let id: PurchaseId = token.parse()?;
        if self.wizard.purchase(id).is_none() {
            return Err(SplitError::PurchaseNotFound(id).into());
        }
        Ok(id)
    }

    /// Returns `args[index]`, prompting for it interactively when missing.
    pub(crate) fn arg_or_prompt(
        &self,
        args: &[&str],
        index: usize,
        prompt: &str,
        usage: &str,
    ) -> Result<String, CommandError> {
        if let Some(value) = args.get(index) {
            return Ok((*value).to_string());
        }
        if self.mode == CliMode::Interactive {
            return cli_io::prompt_text(&self.theme, prompt, None);
        }
        Err(CommandError::InvalidArguments(format!("usage: {}", usage)))
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Wizard(WizardError::InvalidTransition { from, .. })
            | CommandError::Wizard(WizardError::WrongStep { actual: from, .. }) => {
                self.print_error(&err.to_string());
                cli_io::print_hint(format!(
                    "You are on the {} step. Type `status` to see what to do next.",
                    from.title()
                ));
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

fn restore_session(store: &JsonFileStore, mut state: SessionState) -> SessionState {
    match session::restore(store, &mut state) {
        Ok(report) => {
            for warning in &report.warnings {
                cli_io::print_warning(format!("Ignored saved value: {}", warning));
            }
            if report.restored_anything() {
                cli_io::print_info(format!(
                    "Restored saved session ({} purchase(s)).",
                    state.purchases.len()
                ));
                if state.is_ready_for_summary() {
                    cli_io::print_hint("Type `resume` to jump straight to the summary.");
                }
            }
        }
        Err(err) => {
            warn!(error = %err, "failed to read saved session");
            cli_io::print_warning(format!("Saved session could not be read: {err}"));
        }
    }
    state
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] SplitError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(err) => CommandError::Core(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}
