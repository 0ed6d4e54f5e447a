use crate::model::{Entry, Expense, ExpenseId};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// The identifier of a project. Assigned at creation and never changed.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// A fresh, random id such as `proj-0b6e5b0c9b8a4c2e9f7d1a2b3c4d5e6f`.
    pub fn generate() -> Self {
        Self(format!("proj-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for ProjectId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, independent collection of expenses, also called a tracker.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    id: ProjectId,
    name: String,
    #[serde(default)]
    expenses: Vec<Entry>,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            expenses: Vec::new(),
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The expenses in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.expenses
    }

    /// The bare records in insertion order, as they are exported.
    pub fn expenses(&self) -> Vec<Expense> {
        self.expenses.iter().map(|e| e.expense().clone()).collect()
    }

    pub fn entry(&self, id: ExpenseId) -> Option<&Entry> {
        self.expenses.iter().find(|e| e.id() == id)
    }

    /// The storage index of the expense with `id`.
    pub fn position(&self, id: ExpenseId) -> Option<usize> {
        self.expenses.iter().position(|e| e.id() == id)
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.expenses
    }

    #[cfg(test)]
    pub(crate) fn with_expenses(mut self, expenses: impl IntoIterator<Item = Expense>) -> Self {
        self.expenses = expenses.into_iter().map(Entry::new).collect();
        self
    }
}
