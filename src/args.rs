//! These structs provide the CLI interface for the expenses CLI.

use crate::codec::Format;
use crate::model::{Category, Month, ProjectId};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking personal expenses.
///
/// Expenses are kept in projects (trips, households, events...), each with its own list. Every
/// command acts on the current project unless --project is given. Listings and summaries are
/// scoped to one month, the current calendar month unless --month is given.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. The directory is $HOME/expenses unless you pass
    /// --home or set EXPENSES_HOME.
    Init(InitArgs),
    /// Create, rename, delete, select and list projects.
    Project(ProjectArgs),
    /// Add, edit, delete and list the expenses of a month.
    Expense(ExpenseArgs),
    /// List the months that have expenses, most recent first.
    Months(MonthsArgs),
    /// Show the total and the per-category totals for a month.
    Summary(SummaryArgs),
    /// Write all expenses of a project to a CSV or JSON file.
    Export(ExportArgs),
    /// Replace all expenses of a project with the contents of a CSV or JSON file.
    Import(ImportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where expense data and configuration is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The currency label printed next to amounts, e.g. EUR. Defaults to CHF. Amounts are never
    /// converted.
    #[arg(long)]
    currency: Option<String>,
}

impl InitArgs {
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }
}

/// Args for the `expenses project` command.
#[derive(Debug, Parser, Clone)]
pub struct ProjectArgs {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

impl ProjectArgs {
    pub fn command(&self) -> &ProjectSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectSubcommand {
    /// Create a project and make it the current one.
    Add {
        /// The name of the project. Leading and trailing whitespace is removed.
        name: String,
    },
    /// Rename a project. Its expenses are not touched.
    Rename {
        /// The id of the project, see `expenses project list`.
        id: ProjectId,
        name: String,
    },
    /// Delete a project together with all of its expenses.
    Delete {
        id: ProjectId,
        /// Do not ask for confirmation.
        #[arg(long, short)]
        yes: bool,
    },
    /// Make a project the current one.
    Select { id: ProjectId },
    /// List all projects, newest first.
    List,
}

/// Args for the `expenses expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    command: ExpenseSubcommand,
}

impl ExpenseArgs {
    pub fn command(&self) -> &ExpenseSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpenseSubcommand {
    /// Add an expense.
    Add(ExpenseAddArgs),
    /// Change the fields of an expense. Fields that are not given keep their value.
    Edit(ExpenseEditArgs),
    /// Delete an expense.
    Delete(ExpenseDeleteArgs),
    /// List the expenses of a month, numbered.
    List(ScopeArgs),
}

/// Selects the project and month that a command acts on.
#[derive(Debug, Parser, Clone, Default)]
pub struct ScopeArgs {
    /// The id of the project. Defaults to the current project.
    #[arg(long)]
    project: Option<ProjectId>,

    /// The month as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<Month>,
}

impl ScopeArgs {
    pub fn new(project: Option<ProjectId>, month: Option<Month>) -> Self {
        Self { project, month }
    }

    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }
}

/// The fields of an expense as they are typed. Validation happens when the expense is saved.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExpenseFields {
    /// The amount, e.g. 12.50 or -3 for a refund.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<String>,

    /// One of Food, Transport, Shopping, Bills, Entertainment, Other.
    #[arg(long)]
    pub category: Option<Category>,

    #[arg(long)]
    pub description: Option<String>,

    /// The date as YYYY-MM-DD. Defaults to today for new expenses.
    #[arg(long)]
    pub date: Option<String>,
}

/// Args for the `expenses expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseAddArgs {
    /// The id of the project. Defaults to the current project.
    #[arg(long)]
    project: Option<ProjectId>,

    #[command(flatten)]
    fields: ExpenseFields,
}

impl ExpenseAddArgs {
    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    pub fn fields(&self) -> &ExpenseFields {
        &self.fields
    }
}

/// Args for the `expenses expense edit` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseEditArgs {
    /// The number of the expense as shown by `expenses expense list` for the same month.
    n: usize,

    #[command(flatten)]
    scope: ScopeArgs,

    #[command(flatten)]
    fields: ExpenseFields,
}

impl ExpenseEditArgs {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn scope(&self) -> &ScopeArgs {
        &self.scope
    }

    pub fn fields(&self) -> &ExpenseFields {
        &self.fields
    }
}

/// Args for the `expenses expense delete` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseDeleteArgs {
    /// The number of the expense as shown by `expenses expense list` for the same month.
    n: usize,

    #[command(flatten)]
    scope: ScopeArgs,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    yes: bool,
}

impl ExpenseDeleteArgs {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn scope(&self) -> &ScopeArgs {
        &self.scope
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `expenses months` command.
#[derive(Debug, Parser, Clone)]
pub struct MonthsArgs {
    /// The id of the project. Defaults to the current project.
    #[arg(long)]
    project: Option<ProjectId>,
}

impl MonthsArgs {
    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }
}

/// Args for the `expenses summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    scope: ScopeArgs,
}

impl SummaryArgs {
    pub fn scope(&self) -> &ScopeArgs {
        &self.scope
    }
}

/// Args for the `expenses export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The id of the project. Defaults to the current project.
    #[arg(long)]
    project: Option<ProjectId>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Where to write the file, `-` for stdout. Defaults to `<project name>_expenses.<format>` in
    /// the working directory.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Args for the `expenses import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// A file previously written by `expenses export`, or any file of the same shape.
    file: PathBuf,

    /// The id of the project whose expenses are replaced. Defaults to the current project.
    #[arg(long)]
    project: Option<ProjectId>,

    /// The format of the file. When omitted it is detected from the contents.
    #[arg(long, value_enum)]
    format: Option<Format>,
}

impl ImportArgs {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or EXPENSES_HOME instead of relying on the default \
                expenses home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_expense_edit() {
        let args = Args::try_parse_from([
            "expenses",
            "--home",
            "/tmp/e",
            "expense",
            "edit",
            "2",
            "--month",
            "2024-03",
            "--amount",
            "-4.5",
            "--category",
            "Bills",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/e"));
        let Command::Expense(expense) = args.command() else {
            panic!("expected the expense command");
        };
        let ExpenseSubcommand::Edit(edit) = expense.command() else {
            panic!("expected edit");
        };
        assert_eq!(edit.n(), 2);
        assert_eq!(edit.scope().month(), Month::new(2024, 3));
        assert_eq!(edit.fields().amount.as_deref(), Some("-4.5"));
        assert_eq!(edit.fields().category, Some(Category::Bills));
        assert_eq!(edit.fields().description, None);
    }

    #[test]
    fn test_parse_rejects_bad_month() {
        let result = Args::try_parse_from(["expenses", "summary", "--month", "2024-13"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_export_defaults() {
        let args = Args::try_parse_from(["expenses", "export"]).unwrap();
        let Command::Export(export) = args.command() else {
            panic!("expected export");
        };
        assert_eq!(export.format(), Format::Csv);
        assert_eq!(export.output(), None);
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
    }
}
