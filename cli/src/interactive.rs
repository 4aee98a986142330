//! Menu-driven session over a single mounted `ExpenseApp`.
//!
//! Failures never end the session: they are shown above the table and the
//! user can retry from the menu.

use std::fmt;

use dialoguer::{Confirm, Input, Select};
use expense_core::{ExpenseId, FormMode, ListAction, RowAction};

use crate::cli::Session;
use crate::terminal::Colorize;
use crate::transport::first_failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Add,
    Edit,
    ResumeEdit(ExpenseId),
    CancelEdit,
    Delete,
    Filter,
    Refresh,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Add => f.write_str("Add expense"),
            MenuItem::Edit => f.write_str("Edit expense"),
            MenuItem::ResumeEdit(id) => write!(f, "Continue editing #{id}"),
            MenuItem::CancelEdit => f.write_str("Cancel edit"),
            MenuItem::Delete => f.write_str("Delete expense"),
            MenuItem::Filter => f.write_str("Filter by category"),
            MenuItem::Refresh => f.write_str("Refresh"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

/// Items offered for the current state. Row actions need rows; resuming
/// needs an edit in progress.
fn menu(mode: FormMode, has_rows: bool) -> Vec<MenuItem> {
    let mut items = Vec::new();
    if let FormMode::Edit(id) = mode {
        items.push(MenuItem::ResumeEdit(id));
        items.push(MenuItem::CancelEdit);
    }
    items.push(MenuItem::Add);
    if has_rows {
        items.push(MenuItem::Edit);
        items.push(MenuItem::Delete);
    }
    items.extend([MenuItem::Filter, MenuItem::Refresh, MenuItem::Quit]);
    items
}

pub fn run(mut session: Session) -> anyhow::Result<()> {
    let mount = session.app.mount();
    session.transport.run(&mut session.app, mount);

    loop {
        println!();
        if let Some(err) = session.app.last_error() {
            println!("{}", format!("error: {err}").error());
        }
        session.print_list();

        let items = menu(session.app.form().mode(), !session.app.list().is_empty());
        let choice = Select::new()
            .with_prompt("Action")
            .items(&items)
            .default(0)
            .interact()?;

        match items[choice] {
            MenuItem::Add => {
                if session.app.form().is_editing() {
                    session.app.cancel_edit();
                }
                fill_and_submit(&mut session, "New expense")?;
            }
            MenuItem::Edit => {
                let Some(ListAction::Edit(expense)) = pick_row(&session, RowAction::Edit)? else {
                    continue;
                };
                session.app.select(expense.id)?;
                fill_and_submit(&mut session, &format!("Editing #{}", expense.id))?;
            }
            MenuItem::ResumeEdit(id) => {
                fill_and_submit(&mut session, &format!("Editing #{id}"))?;
            }
            MenuItem::CancelEdit => session.app.cancel_edit(),
            MenuItem::Delete => {
                let Some(ListAction::Delete(id)) = pick_row(&session, RowAction::Delete)? else {
                    continue;
                };
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete expense #{id}?"))
                    .default(false)
                    .interact()?;
                if confirmed {
                    let command = session.app.delete(id);
                    session.transport.run(&mut session.app, command);
                }
            }
            MenuItem::Filter => {
                let category: String = Input::new()
                    .with_prompt("Category (empty for all)")
                    .with_initial_text(session.app.category_filter().unwrap_or_default())
                    .allow_empty(true)
                    .interact_text()?;
                let command = session.app.set_category_filter(Some(category));
                session.transport.run(&mut session.app, command);
            }
            MenuItem::Refresh => {
                session.app.clear_error();
                let command = session.app.refresh();
                session.transport.run(&mut session.app, command);
            }
            MenuItem::Quit => break,
        }
    }

    session.app.unmount();
    Ok(())
}

/// Let the user pick a listed row. `None` when they back out.
fn pick_row(session: &Session, action: RowAction) -> anyhow::Result<Option<ListAction>> {
    let list = session.app.list();
    let mut labels = list.labels();
    labels.push("Back".to_string());
    let choice = Select::new()
        .with_prompt("Which expense?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(list.action_for(choice + 1, action))
}

/// Prompt for each field, prefilled from the form, then submit. A local
/// validation failure leaves the input in place for the next attempt.
fn fill_and_submit(session: &mut Session, title: &str) -> anyhow::Result<()> {
    println!("{}", title.heading());
    let form = session.app.form_mut();
    let description = prompt("Description", form.description())?;
    form.set_description(description);
    let amount = prompt("Amount", form.amount())?;
    form.set_amount(amount);
    let category = prompt("Category", form.category())?;
    form.set_category(category);
    let date = prompt("Date (YYYY-MM-DD)", form.date())?;
    form.set_date(date);

    let command = match session.app.submit() {
        Ok(command) => command,
        Err(err) => {
            println!("{}", format!("not saved: {err}").error());
            return Ok(());
        }
    };
    let outcomes = session.transport.run(&mut session.app, command);
    if first_failure(&outcomes).is_none() {
        println!("{}", "Saved".success());
    }
    Ok(())
}

fn prompt(label: &str, current: &str) -> anyhow::Result<String> {
    Ok(Input::new()
        .with_prompt(label)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?)
}
