//! The boundary to durable storage.
//!
//! The core only needs a key-value store of opaque text. The whole project list is written under
//! `PROJECTS_KEY` after every change and the current project id under `CURRENT_PROJECT_KEY`.

mod file;
mod memory;

use crate::error::{ErrorType, IntoResult};
use crate::model::{Project, ProjectId};
use crate::store::ProjectStore;
use crate::Result;
use anyhow::Context;
use tracing::{debug, warn};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the project list is stored.
pub const PROJECTS_KEY: &str = "projects";

/// Key under which the id of the current project is stored.
pub const CURRENT_PROJECT_KEY: &str = "lastProjectId";

/// Key under which an unreadable project list is preserved before it can be overwritten.
pub const UNREADABLE_PROJECTS_KEY: &str = "projects.unreadable";

/// A key-value store of text.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if nothing has been stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Reads the project store. Missing or unreadable data is treated as an empty store; it is never
/// an error unless the storage itself cannot be read.
pub async fn load<S>(kv: &mut S) -> Result<ProjectStore>
where
    S: KeyValueStore + ?Sized,
{
    let projects = match kv
        .get(PROJECTS_KEY)
        .await
        .pub_result(ErrorType::Storage)?
    {
        None => Vec::new(),
        Some(text) => match serde_json::from_str::<Vec<Project>>(&text) {
            Ok(projects) => projects,
            Err(e) => {
                warn!("The stored project list is unreadable and will be ignored: {e}");
                if let Err(e) = kv.set(UNREADABLE_PROJECTS_KEY, &text).await {
                    warn!("Unable to preserve the unreadable project list: {e:#}");
                }
                Vec::new()
            }
        },
    };

    let current = match kv
        .get(CURRENT_PROJECT_KEY)
        .await
        .pub_result(ErrorType::Storage)?
    {
        None => None,
        Some(text) => serde_json::from_str::<Option<ProjectId>>(&text).unwrap_or_else(|e| {
            warn!("The stored current project is unreadable and will be ignored: {e}");
            None
        }),
    };

    let store = ProjectStore::new(projects, current);
    debug!(
        "Loaded {} project{}",
        store.projects().len(),
        if store.projects().len() == 1 { "" } else { "s" }
    );
    Ok(store)
}

/// Writes the whole project store. The current project id is only written when there is one.
///
/// If the current project id cannot be written, the previous project list is put back so that
/// storage keeps the state it had before the call.
pub async fn save<S>(kv: &mut S, store: &ProjectStore) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    let projects =
        serde_json::to_string(store.projects()).context("Unable to serialize the project list")?;
    let current = store
        .current_id()
        .map(serde_json::to_string)
        .transpose()
        .context("Unable to serialize the current project")?;

    let previous = kv
        .get(PROJECTS_KEY)
        .await
        .pub_result(ErrorType::Storage)?;
    kv.set(PROJECTS_KEY, &projects)
        .await
        .pub_result(ErrorType::Storage)?;

    if let Some(current) = current {
        if let Err(e) = kv.set(CURRENT_PROJECT_KEY, &current).await {
            let previous = previous.as_deref().unwrap_or("[]");
            if let Err(restore) = kv.set(PROJECTS_KEY, previous).await {
                warn!("Unable to restore the previous project list: {restore:#}");
            }
            return Err(e).pub_result(ErrorType::Storage);
        }
    }
    debug!("Saved {} projects", store.projects().len());
    Ok(())
}
