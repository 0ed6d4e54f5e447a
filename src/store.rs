//! The project store and the transitions that change it.
//!
//! `ProjectStore::apply` is a pure function from a state and an `Action` to the next state. It
//! returns `None` when the action changes nothing, in which case nothing needs to be persisted.
//! Every state that `apply` returns satisfies the store invariant: `current` is `None` exactly
//! when there are no projects, and otherwise names one of them.

use crate::model::{Entry, Expense, ExpenseId, Project, ProjectId};

/// All projects, newest first, and the project that is currently shown.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ProjectStore {
    projects: Vec<Project>,
    current: Option<ProjectId>,
}

/// A change to the project store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Action {
    /// Use `Action::create_project` so that a fresh id is generated.
    CreateProject { id: ProjectId, name: String },
    DeleteProject { id: ProjectId },
    RenameProject { id: ProjectId, name: String },
    SelectProject { id: ProjectId },
    /// Replaces the expense under `cursor` if it resolves, otherwise appends.
    UpsertExpense {
        project: ProjectId,
        expense: Expense,
        cursor: Option<ExpenseId>,
    },
    DeleteExpense {
        project: ProjectId,
        expense: ExpenseId,
    },
    /// Wholesale replacement of a project's expenses, used by imports.
    ReplaceExpenses {
        project: ProjectId,
        expenses: Vec<Expense>,
    },
}

impl Action {
    pub fn create_project(name: impl Into<String>) -> Self {
        Action::CreateProject {
            id: ProjectId::generate(),
            name: name.into(),
        }
    }
}

impl ProjectStore {
    /// Builds a store from loaded parts. An unknown or missing `current` falls back to the first
    /// project.
    pub fn new(projects: Vec<Project>, current: Option<ProjectId>) -> Self {
        let mut store = Self { projects, current };
        store.normalize_current();
        store
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_id(&self) -> Option<&ProjectId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Project> {
        self.current.as_ref().and_then(|id| self.project(id))
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Returns the next state, or `None` if `action` is a no-op against this state.
    pub fn apply(&self, action: &Action) -> Option<ProjectStore> {
        let mut next = self.clone();
        let changed = match action {
            Action::CreateProject { id, name } => next.create_project(id, name),
            Action::DeleteProject { id } => next.delete_project(id),
            Action::RenameProject { id, name } => next.rename_project(id, name),
            Action::SelectProject { id } => next.select_project(id),
            Action::UpsertExpense {
                project,
                expense,
                cursor,
            } => next.upsert_expense(project, expense, *cursor),
            Action::DeleteExpense { project, expense } => next.delete_expense(project, *expense),
            Action::ReplaceExpenses { project, expenses } => {
                next.replace_expenses(project, expenses)
            }
        };
        if !changed {
            return None;
        }
        debug_assert!(next.invariant_holds());
        Some(next)
    }

    fn create_project(&mut self, id: &ProjectId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.project(id).is_some() {
            return false;
        }
        self.projects.insert(0, Project::new(id.clone(), name));
        self.current = Some(id.clone());
        true
    }

    fn delete_project(&mut self, id: &ProjectId) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id() != id);
        if self.projects.len() == before {
            return false;
        }
        if self.current.as_ref() == Some(id) {
            self.current = self.projects.first().map(|p| p.id().clone());
        }
        true
    }

    fn rename_project(&mut self, id: &ProjectId, name: &str) -> bool {
        match self.project_mut(id) {
            Some(project) if project.name() != name => {
                project.set_name(name);
                true
            }
            _ => false,
        }
    }

    fn select_project(&mut self, id: &ProjectId) -> bool {
        if self.project(id).is_none() || self.current.as_ref() == Some(id) {
            return false;
        }
        self.current = Some(id.clone());
        true
    }

    fn upsert_expense(
        &mut self,
        project: &ProjectId,
        expense: &Expense,
        cursor: Option<ExpenseId>,
    ) -> bool {
        let Some(project) = self.project_mut(project) else {
            return false;
        };
        match cursor.and_then(|id| project.position(id)) {
            Some(ix) => project.entries_mut()[ix].set_expense(expense.clone()),
            None => project.entries_mut().push(Entry::new(expense.clone())),
        }
        true
    }

    fn delete_expense(&mut self, project: &ProjectId, expense: ExpenseId) -> bool {
        let Some(project) = self.project_mut(project) else {
            return false;
        };
        match project.position(expense) {
            Some(ix) => {
                project.entries_mut().remove(ix);
                true
            }
            None => false,
        }
    }

    fn replace_expenses(&mut self, project: &ProjectId, expenses: &[Expense]) -> bool {
        let Some(project) = self.project_mut(project) else {
            return false;
        };
        *project.entries_mut() = expenses.iter().cloned().map(Entry::new).collect();
        true
    }

    fn project_mut(&mut self, id: &ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id() == id)
    }

    fn normalize_current(&mut self) {
        let valid = self
            .current
            .as_ref()
            .is_some_and(|id| self.project(id).is_some());
        if !valid {
            self.current = self.projects.first().map(|p| p.id().clone());
        }
    }

    fn invariant_holds(&self) -> bool {
        match &self.current {
            None => self.projects.is_empty(),
            Some(id) => self.project(id).is_some(),
        }
    }
}
