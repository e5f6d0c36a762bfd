use crate::cli::commands::wizard::{render_step, render_summary};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::table::{Table, TableColumn};
use crate::core::schedule::{last_installment_date, next_installment_date};
use crate::core::services::sort_for_display;
use crate::domain::common::InstallmentProgress;
use crate::domain::{Participant, PurchaseUpdate};

/// Positional arguments accepted by `add`.
const ADD_FIELDS: [&str; 4] = ["description", "amount", "installments", "buyer"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Open the purchase form",
            "add [description] [amount] [installments] [buyer]",
            cmd_add,
        ),
        CommandEntry::new(
            "set",
            "Set a field of the open purchase form",
            "set <description|amount|installments|paid|buyer|date> <value>",
            cmd_set,
        ),
        CommandEntry::new("save", "Save the open purchase form", "save", cmd_save),
        CommandEntry::new(
            "edit",
            "Open an existing purchase in the form",
            "edit <#n|id>",
            cmd_edit,
        ),
        CommandEntry::new(
            "pay",
            "Record one more paid installment",
            "pay <#n|id>",
            cmd_pay,
        ),
        CommandEntry::new(
            "delete",
            "Select a purchase for deletion",
            "delete <#n|id>",
            cmd_delete,
        ),
        CommandEntry::new(
            "confirm-delete",
            "Delete the selected purchase",
            "confirm-delete",
            cmd_confirm_delete,
        ),
        CommandEntry::new(
            "cancel-delete",
            "Keep the selected purchase",
            "cancel-delete",
            cmd_cancel_delete,
        ),
        CommandEntry::new(
            "purchases",
            "List purchases with their schedule",
            "purchases",
            cmd_purchases,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.wizard.begin_purchase()?;
    for (field, value) in ADD_FIELDS.iter().zip(args) {
        context
            .wizard
            .update_draft(PurchaseUpdate::from_field(field, value)?)?;
    }
    if args.is_empty() && context.is_interactive() {
        return run_form(context);
    }
    render_step(context);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = context.arg_or_prompt(args, 0, "Purchase (#n or id)", "edit <#n|id>")?;
    let id = context.resolve_purchase(&target)?;
    context.wizard.edit_purchase(id)?;
    if context.is_interactive() {
        return run_form(context);
    }
    render_step(context);
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(field) = args.first() else {
        return Err(CommandError::InvalidArguments(format!(
            "usage: set <field> <value> (fields: {})",
            PurchaseUpdate::FIELDS.join(", ")
        )));
    };
    let value = args[1..].join(" ");
    let update = PurchaseUpdate::from_field(field, &value)?;
    context.wizard.update_draft(update)?;
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let editing = context.wizard.editing().is_some();
    let id = context.wizard.save_purchase()?;
    let description = context
        .wizard
        .purchase(id)
        .map(|purchase| purchase.description.clone())
        .unwrap_or_default();
    if editing {
        io::print_success(format!("Updated `{}`.", description));
    } else {
        io::print_success(format!("Saved `{}`.", description));
    }
    render_summary(context);
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = context.arg_or_prompt(args, 0, "Purchase (#n or id)", "pay <#n|id>")?;
    let id = context.resolve_purchase(&target)?;
    if context.wizard.increment_paid(id) {
        if let Some(purchase) = context.wizard.purchase(id) {
            io::print_success(format!(
                "`{}`: {}/{} installments paid.",
                purchase.description, purchase.paid_installments, purchase.installments
            ));
        }
    } else {
        io::print_warning("That purchase is already fully paid.");
    }
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = context.arg_or_prompt(args, 0, "Purchase (#n or id)", "delete <#n|id>")?;
    let id = context.resolve_purchase(&target)?;
    context.wizard.select_purchase_for_deletion(id)?;
    let description = context
        .wizard
        .purchase(id)
        .map(|purchase| purchase.description.clone())
        .unwrap_or_default();

    if context.is_interactive() {
        let confirmed = io::confirm_action(
            &context.theme,
            &format!("Delete `{}`? This cannot be undone.", description),
            false,
        )?;
        if confirmed {
            return cmd_confirm_delete(context, &[]);
        }
        return cmd_cancel_delete(context, &[]);
    }
    io::print_warning(format!(
        "Type `confirm-delete` to remove `{}` or `cancel-delete` to keep it.",
        description
    ));
    Ok(())
}

fn cmd_confirm_delete(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.wizard.confirm_delete()? {
        Some(purchase) => io::print_success(format!("Deleted `{}`.", purchase.description)),
        None => io::print_warning("No purchase is selected for deletion."),
    }
    Ok(())
}

fn cmd_cancel_delete(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.wizard.pending_deletion().is_some() {
        context.wizard.cancel_delete();
        io::print_info("Deletion cancelled.");
    }
    Ok(())
}

fn cmd_purchases(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let purchases = context.wizard.purchases();
    if purchases.is_empty() {
        io::print_info("No purchases yet.");
        return Ok(());
    }
    let money = context.formatter();
    let names = context.wizard.names();
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Id"),
        TableColumn::left("Description").truncate_at(24),
        TableColumn::left("Buyer"),
        TableColumn::right("Amount"),
        TableColumn::right("Left"),
        TableColumn::left("Next payment"),
        TableColumn::left("Last payment"),
    ]);
    for (position, purchase) in sort_for_display(purchases.iter()).into_iter().enumerate() {
        let next = if purchase.is_settled() {
            "settled".to_string()
        } else {
            money.date(next_installment_date(purchase))
        };
        table.push_row(vec![
            format!("#{}", position + 1),
            purchase.id.to_string(),
            purchase.description.clone(),
            names.get(purchase.buyer).to_string(),
            money.money(purchase.amount),
            purchase.remaining_installments().to_string(),
            next,
            money.date(last_installment_date(
                purchase.first_payment_date,
                purchase.installments,
            )),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

/// Prompts for every field of the open form, then offers to save it.
fn run_form(context: &mut ShellContext) -> CommandResult {
    for field in PurchaseUpdate::FIELDS {
        loop {
            let update = if field == "buyer" {
                let labels: Vec<String> = Participant::ALL
                    .iter()
                    .map(|participant| context.wizard.names().get(*participant).to_string())
                    .collect();
                let choice = io::select_option(&context.theme, "Who paid?", &labels)?;
                Ok(PurchaseUpdate::SetBuyer(Participant::ALL[choice]))
            } else {
                let current = current_value(context, field);
                let answer = io::prompt_text(&context.theme, field, Some(&current))?;
                PurchaseUpdate::from_field(field, &answer)
            };
            match update {
                Ok(update) => {
                    context.wizard.update_draft(update)?;
                    break;
                }
                Err(err) => io::print_error(err),
            }
        }
    }
    if io::confirm_action(&context.theme, "Save this purchase?", true)? {
        cmd_save(context, &[])
    } else {
        io::print_hint("Form kept open. Type `save` to store it or `summary` to discard it.");
        Ok(())
    }
}

fn current_value(context: &ShellContext, field: &str) -> String {
    let draft = context.wizard.draft();
    match field {
        "description" => draft.description.clone(),
        "amount" => draft.amount.to_string(),
        "installments" => draft.installments.to_string(),
        "paid" => draft.paid_installments.to_string(),
        "date" => draft
            .first_payment_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
