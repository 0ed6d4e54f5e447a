//! Command handlers for the expenses CLI.
//!
//! Each handler is one user action. Handlers that change data go through `Tracker::dispatch`, so
//! every change is written before it is reported.

mod expense;
mod init;
mod project;
mod transfer;
mod view;

use crate::error::typed;
use crate::model::{Entry, ExpenseId, ProjectId};
use crate::persist::KeyValueStore;
use crate::session::Tracker;
use crate::{ErrorType, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use expense::{expense_add, expense_delete, expense_edit, expense_list, ExpenseRow};
pub use init::init;
pub use project::{project_add, project_delete, project_list, project_rename, project_select};
pub use project::ProjectInfo;
pub use transfer::{export, import, ExportInfo, ImportInfo};
pub use view::{months, summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The message of a command whose confirmation was declined.
pub(crate) const CANCELLED: &str = "Cancelled, nothing was changed";

/// Maps the 1-based number shown by `expense list` for the selected month to the expense's id.
fn resolve_position<S>(
    tracker: &Tracker<S>,
    project: Option<&ProjectId>,
    n: usize,
) -> Result<ExpenseId>
where
    S: KeyValueStore,
{
    let entries: Vec<&Entry> = tracker.month_entries(project)?;
    n.checked_sub(1)
        .and_then(|ix| entries.get(ix))
        .map(|entry| entry.id())
        .ok_or_else(|| {
            typed(
                ErrorType::NotFound,
                format!(
                    "There is no expense #{n} in {}, it has {} expense{}",
                    tracker.session().month(),
                    entries.len(),
                    if entries.len() == 1 { "" } else { "s" }
                ),
            )
        })
}
