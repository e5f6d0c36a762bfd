use crate::cli::commands::wizard::render_step;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "status",
            "Show the current step and session",
            "status",
            cmd_status,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("Expense Split {}", meta.version));
    io::print_info(format!("  CLI version  : {}", build_info::CLI_VERSION));
    io::print_info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    io::print_info(format!("  Built at     : {}", meta.timestamp));
    io::print_info(format!("  Target       : {}", meta.target));
    io::print_info(format!("  Profile      : {}", meta.profile));
    io::print_info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&command) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let wizard = &context.wizard;
    let formatter = context.formatter();
    let names = wizard.names();
    let income = |value: Option<f64>| {
        value
            .map(|amount| formatter.money(amount))
            .unwrap_or_else(|| "not set".into())
    };
    let step = wizard.step();
    Formatter::new().print_header(format!("Step {}/5: {}", step.number(), step.title()));
    Formatter::new().print_two_column(&[
        (
            "Method",
            wizard
                .method()
                .map(|method| method.to_string())
                .unwrap_or_else(|| "not chosen".into()),
        ),
        (names.person1.as_str(), income(wizard.incomes().person1)),
        (names.person2.as_str(), income(wizard.incomes().person2)),
        ("Purchases", wizard.purchases().len().to_string()),
        (
            "Data file",
            context.session_store.path().display().to_string(),
        ),
    ]);
    render_step(context);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
