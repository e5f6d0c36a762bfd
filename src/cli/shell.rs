use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::{Hint, Hinter},
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Context as ReadlineContext, Editor, Helper,
};

use crate::cli::commands::wizard::render_step;
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::config::CONFIG_KEYS;
use crate::core::WizardStep;
use crate::domain::{PurchaseUpdate, SplitMethod};

const SCRIPT_ENV: &str = "EXPENSE_SPLIT_CLI_SCRIPT";

/// Commands whose first argument is a purchase position.
const POSITION_COMMANDS: [&str; 3] = ["edit", "pay", "delete"];
const RECORD_ACTIONS: [&str; 4] = ["list", "buyers", "buyer", "post"];
const CONFIG_ACTIONS: [&str; 2] = ["show", "set"];
const PARTICIPANTS: [&str; 2] = ["1", "2"];

/// Runs the shell. Commands come from stdin without prompts when
/// `EXPENSE_SPLIT_CLI_SCRIPT` is set, from a line editor otherwise.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    render_step(&context);

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<WizardHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(WizardHelper::new(context.command_names())));

    while context.running {
        if let Some(helper) = editor.helper_mut() {
            helper.sync(context);
        }
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if run_line(context, trimmed)? == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Goodbye.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !context.running || run_line(context, &line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Failed commands are reported and the shell keeps reading.
fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match handle_line(context, line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            context.print_warning(&format!("Could not read `{}`: {}", line.trim(), err));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match context.dispatch(&raw.to_lowercase(), raw, &args)? {
        LoopControl::Exit => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        control => Ok(control),
    }
}

/// Line-editor support that follows the wizard. Completion knows purchase
/// positions, draft fields and split methods; an empty line hints at the
/// next command for the current step.
struct WizardHelper {
    commands: Vec<&'static str>,
    step: WizardStep,
    purchase_count: usize,
    ready_for_summary: bool,
}

impl WizardHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self {
            commands,
            step: WizardStep::Welcome,
            purchase_count: 0,
            ready_for_summary: false,
        }
    }

    fn sync(&mut self, context: &ShellContext) {
        self.step = context.wizard.step();
        self.purchase_count = context.wizard.purchases().len();
        self.ready_for_summary = context.wizard.state().is_ready_for_summary();
    }

    /// Start of the word under the cursor and the candidates for it.
    fn candidates(&self, before_cursor: &str) -> (usize, Vec<String>) {
        let start = before_cursor
            .rfind(char::is_whitespace)
            .map_or(0, |idx| idx + 1);
        let needle = before_cursor[start..].to_ascii_lowercase();
        let head = before_cursor[..start].to_ascii_lowercase();
        let words: Vec<&str> = head.split_whitespace().collect();

        let pool = if words.is_empty() {
            to_strings(&self.commands)
        } else {
            self.argument_candidates(&words)
        };
        let matches = pool
            .into_iter()
            .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&needle))
            .collect();
        (start, matches)
    }

    fn argument_candidates(&self, words: &[&str]) -> Vec<String> {
        match words {
            ["set"] => to_strings(&PurchaseUpdate::FIELDS),
            ["method"] => SplitMethod::ALL
                .iter()
                .map(|method| method.as_str().to_string())
                .collect(),
            ["name"] | ["income"] => to_strings(&PARTICIPANTS),
            ["config"] => to_strings(&CONFIG_ACTIONS),
            ["config", "set"] => to_strings(&CONFIG_KEYS),
            ["record"] => to_strings(&RECORD_ACTIONS),
            ["help"] => to_strings(&self.commands),
            [command] if POSITION_COMMANDS.contains(command) => (1..=self.purchase_count)
                .map(|position| format!("#{position}"))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn next_command_hint(&self) -> &'static str {
        match self.step {
            WizardStep::Welcome if self.ready_for_summary => "resume",
            WizardStep::Welcome => "start",
            WizardStep::MethodSelection => "method <equal|proportional|pooled>, then continue",
            WizardStep::IncomeRegistration if self.ready_for_summary => "summary",
            WizardStep::IncomeRegistration => "income <1|2> <amount>",
            WizardStep::PurchaseEntry => "set <field> <value>, then save",
            WizardStep::Summary => "add, edit #n, pay #n or delete #n",
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Shown on an empty line; never inserted.
struct StepHint(String);

impl Hint for StepHint {
    fn display(&self) -> &str {
        &self.0
    }

    fn completion(&self) -> Option<&str> {
        None
    }
}

impl Helper for WizardHelper {}

impl Completer for WizardHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for WizardHelper {
    type Hint = StepHint;

    fn hint(&self, line: &str, _pos: usize, _ctx: &ReadlineContext<'_>) -> Option<StepHint> {
        line.is_empty()
            .then(|| StepHint(format!("  try: {}", self.next_command_hint())))
    }
}

impl Highlighter for WizardHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for WizardHelper {
    /// Unbalanced quotes are flagged before the line is submitted.
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(match shell_words::split(ctx.input()) {
            Ok(_) => ValidationResult::Valid(None),
            Err(_) => ValidationResult::Invalid(Some("  (unclosed quote)".into())),
        })
    }
}
