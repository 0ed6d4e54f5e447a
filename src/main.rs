use clap::Parser;
use expense_tracker::args::{Args, Command, ExpenseSubcommand, ProjectSubcommand};
use expense_tracker::confirm::{AssumeYes, Confirm, StdinPrompt};
use expense_tracker::model::Month;
use expense_tracker::persist::FileStore;
use expense_tracker::session::Tracker;
use expense_tracker::{commands, Config, ErrorType, IntoResult, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.currency()).await?.print(),

        Command::Project(project_args) => {
            let (_, mut tracker) = open(home, None).await?;
            match project_args.command() {
                ProjectSubcommand::Add { name } => {
                    commands::project_add(&mut tracker, name).await?.print()
                }
                ProjectSubcommand::Rename { id, name } => {
                    commands::project_rename(&mut tracker, id, name)
                        .await?
                        .print()
                }
                ProjectSubcommand::Delete { id, yes } => {
                    commands::project_delete(&mut tracker, id, confirmer(*yes).as_ref())
                        .await?
                        .print()
                }
                ProjectSubcommand::Select { id } => {
                    commands::project_select(&mut tracker, id).await?.print()
                }
                ProjectSubcommand::List => commands::project_list(&tracker)?.print(),
            }
        }

        Command::Expense(expense_args) => match expense_args.command() {
            ExpenseSubcommand::Add(add) => {
                let (config, mut tracker) = open(home, None).await?;
                commands::expense_add(&mut tracker, add.project(), add.fields(), config.currency())
                    .await?
                    .print()
            }
            ExpenseSubcommand::Edit(edit) => {
                let scope = edit.scope();
                let (config, mut tracker) = open(home, scope.month()).await?;
                commands::expense_edit(
                    &mut tracker,
                    scope.project(),
                    edit.n(),
                    edit.fields(),
                    config.currency(),
                )
                .await?
                .print()
            }
            ExpenseSubcommand::Delete(delete) => {
                let scope = delete.scope();
                let (config, mut tracker) = open(home, scope.month()).await?;
                commands::expense_delete(
                    &mut tracker,
                    scope.project(),
                    delete.n(),
                    confirmer(delete.yes()).as_ref(),
                    config.currency(),
                )
                .await?
                .print()
            }
            ExpenseSubcommand::List(scope) => {
                let (config, tracker) = open(home, scope.month()).await?;
                commands::expense_list(&tracker, scope.project(), config.currency())?.print()
            }
        },

        Command::Months(months_args) => {
            let (_, tracker) = open(home, None).await?;
            commands::months(&tracker, months_args.project())?.print()
        }

        Command::Summary(summary_args) => {
            let scope = summary_args.scope();
            let (config, tracker) = open(home, scope.month()).await?;
            commands::summary(&tracker, scope.project(), config.currency())?.print()
        }

        Command::Export(export_args) => {
            let (_, tracker) = open(home, None).await?;
            commands::export(
                &tracker,
                export_args.project(),
                export_args.format(),
                export_args.output(),
            )
            .await?
            .print()
        }

        Command::Import(import_args) => {
            let (_, mut tracker) = open(home, None).await?;
            commands::import(
                &mut tracker,
                import_args.project(),
                import_args.file(),
                import_args.format(),
            )
            .await?
            .print()
        }
    };
    Ok(())
}

/// Loads the config and the stored projects, selecting `month` if given.
async fn open(home: &Path, month: Option<Month>) -> Result<(Config, Tracker<FileStore>)> {
    let config = Config::load(home).await.pub_result(ErrorType::Config)?;
    let mut tracker = Tracker::open(config.store()).await?;
    if let Some(month) = month {
        tracker.select_month(month);
    }
    Ok((config, tracker))
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompt)
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
