use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::table::{Table, TableColumn};
use crate::core::WizardStep;
use crate::domain::{Displayable, Participant, PurchaseUpdate, SplitMethod};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("start", "Begin the wizard", "start", cmd_start),
        CommandEntry::new(
            "method",
            "Choose how expenses are split",
            "method <equal|proportional|pooled>",
            cmd_method,
        ),
        CommandEntry::new(
            "continue",
            "Go from method selection to incomes",
            "continue",
            cmd_continue,
        ),
        CommandEntry::new(
            "name",
            "Rename a participant",
            "name <1|2> <name>",
            cmd_name,
        ),
        CommandEntry::new(
            "income",
            "Set a participant's monthly income (empty clears it)",
            "income <1|2> <amount>",
            cmd_income,
        ),
        CommandEntry::new(
            "summary",
            "Show the financial summary (leaves an unsaved purchase form)",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "resume",
            "Jump from the welcome screen to the summary of a saved session",
            "resume",
            cmd_resume,
        ),
        CommandEntry::new(
            "incomes",
            "Go back from the summary to edit incomes",
            "incomes",
            cmd_incomes,
        ),
    ]
}

fn cmd_start(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.wizard.start()?;
    render_step(context);
    Ok(())
}

fn cmd_method(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let method = match args.first() {
        Some(raw) => raw.parse::<SplitMethod>()?,
        None if context.mode() == CliMode::Interactive => {
            let labels: Vec<String> = SplitMethod::ALL
                .iter()
                .map(|method| format!("{:<13} {}", method.as_str(), method.description()))
                .collect();
            let choice = io::select_option(&context.theme, "Split method", &labels)?;
            SplitMethod::ALL[choice]
        }
        None => {
            return Err(CommandError::InvalidArguments(
                "usage: method <equal|proportional|pooled>".into(),
            ))
        }
    };
    match context.wizard.step() {
        WizardStep::Welcome => context.wizard.start()?,
        WizardStep::Summary => context.wizard.change_method()?,
        _ => {}
    }
    context.wizard.set_method(method)?;
    io::print_success(format!("Split method set to {}.", method.display_label()));
    io::print_hint("Type `continue` to enter incomes.");
    Ok(())
}

fn cmd_continue(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.wizard.continue_to_incomes()?;
    render_step(context);
    Ok(())
}

fn ensure_income_step(context: &mut ShellContext) -> CommandResult {
    if context.wizard.step() == WizardStep::Summary {
        context.wizard.edit_incomes()?;
    }
    Ok(())
}

fn cmd_name(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "name <1|2> <name>";
    let participant: Participant =
        context.arg_or_prompt(args, 0, "Participant (1 or 2)", usage)?.parse()?;
    let name = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        context.arg_or_prompt(args, 1, "Name", usage)?
    };
    ensure_income_step(context)?;
    context.wizard.set_name(participant, &name)?;
    io::print_success(format!("{} is now called {}.", participant, name.trim()));
    Ok(())
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "income <1|2> <amount>";
    let participant: Participant =
        context.arg_or_prompt(args, 0, "Participant (1 or 2)", usage)?.parse()?;
    let raw = context.arg_or_prompt(args, 1, "Monthly income", usage)?;
    ensure_income_step(context)?;
    context.wizard.set_income(participant, &raw)?;
    let name = context.wizard.names().get(participant).to_string();
    match context.wizard.incomes().get(participant) {
        Some(amount) => io::print_success(format!(
            "{}'s income set to {}.",
            name,
            context.formatter().money(amount)
        )),
        None => io::print_success(format!("{}'s income cleared.", name)),
    }
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.wizard.step() != WizardStep::Summary {
        context.wizard.view_summary()?;
    }
    render_summary(context);
    Ok(())
}

fn cmd_resume(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.wizard.resume()?;
    render_summary(context);
    Ok(())
}

fn cmd_incomes(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.wizard.edit_incomes()?;
    render_step(context);
    Ok(())
}

/// Prints the screen for the current step.
pub(crate) fn render_step(context: &ShellContext) {
    let formatter = Formatter::new();
    let wizard = &context.wizard;
    let step = wizard.step();
    match step {
        WizardStep::Welcome => {
            formatter.print_header("Expense Split");
            io::print_info("Share household expenses fairly between two people.");
            io::print_hint("Type `start` to begin or `help` for all commands.");
        }
        WizardStep::MethodSelection => {
            formatter.print_header("Step 2/5: Split method");
            for method in SplitMethod::ALL {
                io::print_info(format!("  {:<13} {}", method.as_str(), method.description()));
            }
            io::print_hint("Choose with `method <name>`, then type `continue`.");
        }
        WizardStep::IncomeRegistration => {
            formatter.print_header("Step 3/5: Incomes");
            let money = context.formatter();
            let rows: Vec<(&str, String)> = Participant::ALL
                .iter()
                .map(|participant| {
                    (
                        wizard.names().get(*participant),
                        wizard
                            .incomes()
                            .get(*participant)
                            .map(|amount| money.money(amount))
                            .unwrap_or_else(|| "not set".into()),
                    )
                })
                .collect();
            formatter.print_two_column(&rows);
            io::print_hint("Use `name <1|2> <name>` and `income <1|2> <amount>`, then `summary`.");
        }
        WizardStep::PurchaseEntry => {
            let title = if wizard.editing().is_some() {
                "Step 4/5: Edit purchase"
            } else {
                "Step 4/5: New purchase"
            };
            formatter.print_header(title);
            render_draft(context);
            io::print_hint(format!(
                "Use `set <field> <value>` ({}), then `save`. `summary` discards the form.",
                PurchaseUpdate::FIELDS.join(", ")
            ));
        }
        WizardStep::Summary => render_summary(context),
    }
}

pub(crate) fn render_draft(context: &ShellContext) {
    let draft = context.wizard.draft();
    let money = context.formatter();
    Formatter::new().print_two_column(&[
        ("description", draft.description.clone()),
        ("amount", money.money(draft.amount)),
        ("installments", draft.installments.to_string()),
        ("paid", draft.paid_installments.to_string()),
        (
            "buyer",
            context.wizard.names().get(draft.buyer).to_string(),
        ),
        ("date", money.date(draft.first_payment_date)),
    ]);
}

pub(crate) fn render_summary(context: &ShellContext) {
    let formatter = Formatter::new();
    let money = context.formatter();
    let wizard = &context.wizard;
    let names = wizard.names();
    let summary = wizard.summary();

    formatter.print_header("Step 5/5: Summary");
    let mut overview = vec![("Method", summary.method.display_label())];
    for participant in Participant::ALL {
        overview.push((
            names.get(participant),
            wizard
                .incomes()
                .get(participant)
                .map(|amount| money.money(amount))
                .unwrap_or_else(|| "not set".into()),
        ));
    }
    formatter.print_two_column(&overview);

    if summary.rows.is_empty() {
        io::print_info("\nNo purchases yet. Type `add` to register one.");
    } else {
        let mut table = Table::new(vec![
            TableColumn::right("#"),
            TableColumn::left("Description").truncate_at(24),
            TableColumn::left("Buyer"),
            TableColumn::right("Amount"),
            TableColumn::right("Paid"),
            TableColumn::right("Installment"),
            TableColumn::right(names.person1.clone()),
            TableColumn::right(names.person2.clone()),
            TableColumn::left("Last payment"),
        ]);
        for (position, row) in summary.rows.iter().enumerate() {
            let purchase = &row.distributed.purchase;
            let shares = row.distributed.shares;
            table.push_row(vec![
                format!("#{}", position + 1),
                purchase.description.clone(),
                names.get(purchase.buyer).to_string(),
                money.money(purchase.amount),
                if row.settled {
                    "settled".to_string()
                } else {
                    format!("{}/{}", purchase.paid_installments, purchase.installments)
                },
                money.money(row.installment_amount),
                money.money(shares.person1),
                money.money(shares.person2),
                money.date(row.last_installment),
            ]);
        }
        println!();
        println!("{}", table.render());
    }

    formatter.print_header("Totals");
    let figures: Vec<(&str, String)> = Participant::ALL
        .iter()
        .map(|participant| {
            (
                names.get(*participant),
                format!(
                    "{} total ({}), {} per month",
                    money.money(summary.totals.get(*participant)),
                    money.percentage(summary.percentages.get(*participant)),
                    money.money(summary.monthly.get(*participant)),
                ),
            )
        })
        .collect();
    formatter.print_two_column(&figures);

    println!();
    match summary.difference.labels(names) {
        Some((payer, receiver)) => println!(
            "{}",
            formatter.highlight_text(format!(
                "{} pays {} {} per month.",
                payer,
                receiver,
                money.money(summary.difference.amount)
            ))
        ),
        None => println!(
            "{}",
            formatter.highlight_text("Monthly payments are balanced.")
        ),
    }
    io::print_hint("Commands: add, edit <#n>, pay <#n>, delete <#n>, incomes, method.");
}
