use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::config::CONFIG_KEYS;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show|set <locale|currency_symbol|person1|person2> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    CONFIG_KEYS.join("|")
                )));
            }
            set_config_value(context, args[1], &args[2..].join(" "))
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let formatter = Formatter::new();
    formatter.print_header("Configuration");
    let mut rows: Vec<(&str, String)> = CONFIG_KEYS
        .iter()
        .map(|key| {
            (
                *key,
                context.config.get_value(key).unwrap_or_default().to_string(),
            )
        })
        .collect();
    rows.push(("file", context.config_manager.path().display().to_string()));
    formatter.print_two_column(&rows);
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated.set_value(key, value)?;
    context.config_manager.save(&updated)?;
    context.config = updated;
    io::print_success(format!("`{}` set to `{}`.", key, value.trim()));
    if matches!(key, "person1" | "person2") {
        io::print_hint("Default names apply to new sessions; use `name` to rename in this one.");
    }
    Ok(())
}
