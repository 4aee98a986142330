use anyhow::{bail, Context};
use clap::ArgAction;
use expense_core::{
    ClientConfig, Expense, ExpenseApp, ExpenseClient, ExpenseId, ExpenseList, Outcome,
};
use tracing::instrument;

use crate::interactive;
use crate::terminal::Colorize;
use crate::transport::{first_failure, Transport};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Server origin hosting /api/expenses [default: $EXPENSE_API_URL, then http://localhost:8080]
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = self
            .api_url
            .map(ClientConfig::new)
            .unwrap_or_else(ClientConfig::from_env);
        config.validate().context("invalid API URL")?;
        let session = Session::new(&config);

        self.command.unwrap_or(Command::Interactive).run(session)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Browse and edit expenses in a menu-driven session (default)
    Interactive,

    /// List expenses
    List(List),

    /// Show one expense
    Show(Show),

    /// Record a new expense
    Add(Add),

    /// Change an existing expense
    Edit(Edit),

    /// Delete an expense
    Delete(Delete),
}

impl Command {
    fn run(self, session: Session) -> anyhow::Result<()> {
        match self {
            Self::Interactive => interactive::run(session),
            Self::List(command) => command.run(session),
            Self::Show(command) => command.run(session),
            Self::Add(command) => command.run(session),
            Self::Edit(command) => command.run(session),
            Self::Delete(command) => command.run(session),
        }
    }
}

/// A container, the client it was built from, and the transport that
/// services both.
pub struct Session {
    pub app: ExpenseApp,
    pub client: ExpenseClient,
    pub transport: Transport,
}

impl Session {
    fn new(config: &ClientConfig) -> Self {
        let client = ExpenseClient::from_config(config);
        Self {
            app: ExpenseApp::new(client.clone()),
            client,
            transport: Transport::new(),
        }
    }

    /// Mount the container and wait for the initial listing.
    pub fn mount(&mut self) -> anyhow::Result<()> {
        let command = self.app.mount();
        self.dispatch(command).map(drop)
    }

    /// Run a command to quiescence, turning the first failure into an error.
    pub fn dispatch(&mut self, command: expense_core::Command) -> anyhow::Result<Vec<Outcome>> {
        let outcomes = self.transport.run(&mut self.app, command);
        match first_failure(&outcomes) {
            Some(err) => Err(anyhow::Error::new(err.clone())),
            None => Ok(outcomes),
        }
    }

    pub fn print_list(&self) {
        if let Some(filter) = self.app.category_filter() {
            println!("{}", format!("Category: {filter}").dim());
        }
        println!("{}", self.app.list().render());
    }
}

fn saved(outcomes: &[Outcome]) -> Option<&Expense> {
    outcomes.iter().find_map(|o| match o {
        Outcome::Saved(expense) => Some(expense),
        _ => None,
    })
}

fn print_expense(expense: &Expense) {
    println!("{}", ExpenseList::new(std::slice::from_ref(expense)).render());
}

#[derive(Debug, clap::Parser)]
pub struct List {
    /// Only list expenses in this category
    #[arg(short, long)]
    category: Option<String>,
}

impl List {
    #[instrument(skip(session))]
    fn run(self, mut session: Session) -> anyhow::Result<()> {
        session.mount()?;
        if self.category.is_some() {
            let command = session.app.set_category_filter(self.category);
            session.dispatch(command)?;
        }
        session.print_list();
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Show {
    /// Expense id
    id: ExpenseId,
}

impl Show {
    #[instrument(skip(session))]
    fn run(self, session: Session) -> anyhow::Result<()> {
        let client = &session.client;
        let response = session.transport.execute(&client.build_get_expense(self.id))?;
        let expense = client.parse_get_expense(response)?;
        print_expense(&expense);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// What the money was spent on
    #[arg(short, long)]
    description: String,

    /// Amount spent
    #[arg(short, long)]
    amount: String,

    /// Free-text category
    #[arg(short, long)]
    category: Option<String>,

    /// Date as YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
}

impl Add {
    #[instrument(skip(session))]
    fn run(self, mut session: Session) -> anyhow::Result<()> {
        session.mount()?;
        let form = session.app.form_mut();
        form.set_description(self.description);
        form.set_amount(self.amount);
        form.set_category(self.category.unwrap_or_default());
        form.set_date(self.date.unwrap_or_default());

        let command = session.app.submit()?;
        let outcomes = session.dispatch(command)?;
        if let Some(expense) = saved(&outcomes) {
            println!("{}", format!("Added expense #{}", expense.id).success());
        }
        session.print_list();
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// Expense id
    id: ExpenseId,

    /// New description
    #[arg(short, long)]
    description: Option<String>,

    /// New amount
    #[arg(short, long)]
    amount: Option<String>,

    /// New category (pass an empty string to clear)
    #[arg(short, long)]
    category: Option<String>,

    /// New date as YYYY-MM-DD (pass an empty string to clear)
    #[arg(long)]
    date: Option<String>,
}

impl Edit {
    #[instrument(skip(session))]
    fn run(self, mut session: Session) -> anyhow::Result<()> {
        if self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
        {
            bail!("nothing to change; pass at least one field");
        }

        session.mount()?;
        session.app.select(self.id)?;
        let form = session.app.form_mut();
        if let Some(description) = self.description {
            form.set_description(description);
        }
        if let Some(amount) = self.amount {
            form.set_amount(amount);
        }
        if let Some(category) = self.category {
            form.set_category(category);
        }
        if let Some(date) = self.date {
            form.set_date(date);
        }

        let command = session.app.submit()?;
        let outcomes = session.dispatch(command)?;
        if let Some(expense) = saved(&outcomes) {
            println!("{}", format!("Updated expense #{}", expense.id).success());
        }
        session.print_list();
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// Expense id
    id: ExpenseId,
}

impl Delete {
    #[instrument(skip(session))]
    fn run(self, mut session: Session) -> anyhow::Result<()> {
        session.mount()?;
        let command = session.app.delete(self.id);
        session.dispatch(command)?;
        println!("{}", format!("Deleted expense #{}", self.id).success());
        session.print_list();
        Ok(())
    }
}
