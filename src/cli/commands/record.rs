use crate::api::ApiResponse;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};

const USAGE: &str = "record [list|buyers|buyer <name>|post <json>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "record",
        "Work with server-side purchase records",
        USAGE,
        cmd_record,
    )]
}

fn cmd_record(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|value| value.to_lowercase());
    match action.as_deref() {
        None | Some("list") => print_response(context.records.get_purchases()),
        Some("buyers") => list_buyers(context),
        Some("buyer") => {
            let name = args[1..].join(" ");
            let buyer = context
                .records
                .register_buyer(&name)
                .map_err(|err| CommandError::Message(err.to_string()))?;
            io::print_success(format!("Registered buyer `{}` ({}).", buyer.name, buyer.id));
            Ok(())
        }
        Some("post") => {
            let body = args[1..].join(" ");
            print_response(context.records.post_purchases(&body))
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown record action `{}` (usage: {})",
            other, USAGE
        ))),
    }
}

fn print_response(response: ApiResponse) -> CommandResult {
    if response.is_success() {
        io::print_success(format!("HTTP {}", response.status));
        io::print_info(response.body);
        Ok(())
    } else {
        io::print_error(format!("HTTP {}", response.status));
        io::print_info(response.body);
        Ok(())
    }
}

fn list_buyers(context: &ShellContext) -> CommandResult {
    let buyers = context
        .records
        .list_buyers()
        .map_err(|err| CommandError::Message(err.to_string()))?;
    if buyers.is_empty() {
        io::print_info("No buyers registered. Use `record buyer <name>`.");
        return Ok(());
    }
    let mut table = Table::new(vec![TableColumn::left("Id"), TableColumn::left("Name")]);
    for buyer in buyers {
        table.push_row(vec![buyer.id.to_string(), buyer.name]);
    }
    println!("{}", table.render());
    Ok(())
}
