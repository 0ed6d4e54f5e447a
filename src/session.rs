//! The running application: the project store, the key-value store it is persisted to, and the
//! transient per-session state (selected month, edit cursor, pending import).
//!
//! Every change goes through `Tracker::dispatch`, which computes the next state, writes it, and
//! only then replaces the in-memory state. A failed write leaves memory untouched.

use crate::codec::Format;
use crate::error::{typed, ErrorType};
use crate::model::{Entry, ExpenseForm, ExpenseId, Month, Project, ProjectId};
use crate::persist::{self, KeyValueStore};
use crate::store::{Action, ProjectStore};
use crate::view;
use crate::Result;
use tracing::{debug, trace};

/// State that lives only as long as the session and is never persisted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Session {
    month: Month,
    cursor: Option<ExpenseId>,
    importing: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            month: Month::current(),
            cursor: None,
            importing: false,
        }
    }
}

impl Session {
    pub fn month(&self) -> Month {
        self.month
    }

    /// The expense being edited, or `None` in new-record mode.
    pub fn cursor(&self) -> Option<ExpenseId> {
        self.cursor
    }

    pub fn is_importing(&self) -> bool {
        self.importing
    }
}

/// Proof that an import was started. It names the project whose expenses will be replaced and
/// must be handed back to `complete_import` or `abandon_import`.
#[derive(Debug)]
#[must_use]
pub struct PendingImport {
    project: ProjectId,
}

impl PendingImport {
    pub fn project(&self) -> &ProjectId {
        &self.project
    }
}

pub struct Tracker<S> {
    kv: S,
    state: ProjectStore,
    session: Session,
}

impl<S> Tracker<S>
where
    S: KeyValueStore,
{
    /// Loads the persisted state from `kv`.
    pub async fn open(mut kv: S) -> Result<Self> {
        let state = persist::load(&mut kv).await?;
        Ok(Self {
            kv,
            state,
            session: Session::default(),
        })
    }

    pub fn state(&self) -> &ProjectStore {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn select_month(&mut self, month: Month) {
        self.session.month = month;
    }

    /// The project named by `id`, or the current project when `id` is `None`.
    pub fn project(&self, id: Option<&ProjectId>) -> Result<&Project> {
        match id {
            Some(id) => self
                .state
                .project(id)
                .ok_or_else(|| typed(ErrorType::NotFound, format!("No project with id '{id}'"))),
            None => self.state.current().ok_or_else(|| {
                typed(
                    ErrorType::NotFound,
                    "There are no projects, create one with 'expenses project add'",
                )
            }),
        }
    }

    /// The entries of a project that fall in the selected month, in stored order.
    pub fn month_entries(&self, id: Option<&ProjectId>) -> Result<Vec<&Entry>> {
        let project = self.project(id)?;
        Ok(view::entries_in(project.entries(), self.session.month))
    }

    /// Applies `action` and persists the result. Returns `false` if the action changed nothing.
    ///
    /// # Errors
    /// - `ErrorType::ImportPending` while an import is in progress.
    /// - `ErrorType::Storage` if the new state cannot be written; the state is then unchanged.
    pub async fn dispatch(&mut self, action: Action) -> Result<bool> {
        if self.session.importing {
            return Err(typed(
                ErrorType::ImportPending,
                "An import is in progress, wait for it to finish",
            ));
        }
        self.commit(action).await
    }

    async fn commit(&mut self, action: Action) -> Result<bool> {
        trace!("Applying {action:?}");
        let Some(next) = self.state.apply(&action) else {
            debug!("The action changed nothing");
            return Ok(false);
        };
        persist::save(&mut self.kv, &next).await?;
        self.state = next;

        if matches!(action, Action::UpsertExpense { .. }) {
            self.session.cursor = None;
        }
        if let Some(cursor) = self.session.cursor {
            let resolves = self
                .state
                .projects()
                .iter()
                .any(|p| p.entry(cursor).is_some());
            if !resolves {
                self.session.cursor = None;
            }
        }
        Ok(true)
    }

    /// Puts the session into edit mode for `id` and returns the form prefilled with its fields.
    pub fn start_edit(&mut self, id: ExpenseId) -> Result<ExpenseForm> {
        let entry = self
            .state
            .projects()
            .iter()
            .find_map(|p| p.entry(id))
            .ok_or_else(|| typed(ErrorType::NotFound, format!("No expense with id '{id}'")))?;
        self.session.cursor = Some(id);
        Ok(ExpenseForm::from(entry.expense()))
    }

    pub fn cancel_edit(&mut self) {
        self.session.cursor = None;
    }

    /// Validates `form` and saves it into a project: over the expense under the edit cursor if
    /// there is one, as a new expense otherwise.
    ///
    /// # Errors
    /// - `ErrorType::InvalidAmount` if the amount is not a number. Nothing is changed.
    pub async fn save_expense(
        &mut self,
        project: Option<&ProjectId>,
        form: &ExpenseForm,
    ) -> Result<bool> {
        let expense = form.parse()?;
        let project = self.project(project)?.id().clone();
        self.dispatch(Action::UpsertExpense {
            project,
            expense,
            cursor: self.session.cursor,
        })
        .await
    }

    /// Marks the session busy until the import is completed or abandoned.
    ///
    /// # Errors
    /// - `ErrorType::ImportPending` if another import has not finished.
    /// - `ErrorType::NotFound` if there is no such project.
    pub fn begin_import(&mut self, project: Option<&ProjectId>) -> Result<PendingImport> {
        if self.session.importing {
            return Err(typed(
                ErrorType::ImportPending,
                "Another import is in progress",
            ));
        }
        let project = self.project(project)?.id().clone();
        self.session.importing = true;
        debug!("Import into '{project}' started");
        Ok(PendingImport { project })
    }

    /// Parses `text` in full and replaces the expenses of the import's project with the result.
    /// The guard is released whether or not this succeeds. Returns the number of imported
    /// expenses.
    pub async fn complete_import(
        &mut self,
        pending: PendingImport,
        text: &str,
        format: Option<Format>,
    ) -> Result<usize> {
        self.session.importing = false;
        let format = format.unwrap_or_else(|| Format::detect(text));
        debug!("Importing into '{}' as {format}", pending.project);
        let expenses = format.decode(text)?;
        let count = expenses.len();
        let project = pending.project;
        if self.state.project(&project).is_none() {
            return Err(typed(
                ErrorType::NotFound,
                format!("The project '{project}' no longer exists"),
            ));
        }
        self.commit(Action::ReplaceExpenses { project, expenses })
            .await?;
        Ok(count)
    }

    /// Releases the guard without changing anything.
    pub fn abandon_import(&mut self, pending: PendingImport) {
        debug!("Import into '{}' abandoned", pending.project);
        self.session.importing = false;
    }
}
