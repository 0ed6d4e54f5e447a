use crate::codec::{export_file_name, Format};
use crate::commands::Out;
use crate::model::ProjectId;
use crate::persist::KeyValueStore;
use crate::session::Tracker;
use crate::{utils, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Writing to this path sends an export to stdout.
const STDOUT: &str = "-";

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ExportInfo {
    pub project: ProjectId,
    pub format: Format,
    pub count: usize,
    /// `None` when the export went to stdout.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ImportInfo {
    pub project: ProjectId,
    pub count: usize,
}

/// Writes every expense of a project, regardless of month, to `output`. Without `output` the file
/// is named after the project, e.g. `Summer_Trip_expenses.csv`, in the working directory.
pub async fn export<S>(
    tracker: &Tracker<S>,
    project: Option<&ProjectId>,
    format: Format,
    output: Option<&Path>,
) -> Result<Out<ExportInfo>>
where
    S: KeyValueStore,
{
    let project = tracker.project(project)?;
    let expenses = project.expenses();
    let text = format.encode(&expenses)?;
    let mut info = ExportInfo {
        project: project.id().clone(),
        format,
        count: expenses.len(),
        path: None,
    };

    if output == Some(Path::new(STDOUT)) {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(text.as_bytes())
            .await
            .context("Unable to write the export to stdout")?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        return Ok(Out::new(
            format!("Exported {} expenses of '{}'", info.count, project.name()),
            info,
        ));
    }

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(export_file_name(project.name(), format)),
    };
    debug!("Exporting {} expenses to {}", info.count, path.display());
    utils::write(&path, &text).await?;
    let message = format!(
        "Exported {} expenses of '{}' to '{}'",
        info.count,
        project.name(),
        path.display()
    );
    info.path = Some(path);
    Ok(Out::new(message, info))
}

/// Replaces all expenses of a project with the contents of `file`.
///
/// The file is read and parsed in full before anything changes; if either step fails the project
/// keeps its expenses. The format is detected from the contents unless `format` is given.
pub async fn import<S>(
    tracker: &mut Tracker<S>,
    project: Option<&ProjectId>,
    file: &Path,
    format: Option<Format>,
) -> Result<Out<ImportInfo>>
where
    S: KeyValueStore,
{
    let pending = tracker.begin_import(project)?;
    let text = match utils::read(file).await {
        Ok(text) => text,
        Err(e) => {
            tracker.abandon_import(pending);
            return Err(e);
        }
    };
    let project = pending.project().clone();
    let count = tracker
        .complete_import(pending, &text, format)
        .await
        .with_context(|| format!("Unable to import '{}'", file.display()))?;
    let name = tracker.project(Some(&project))?.name().to_string();
    Ok(Out::new(
        format!("Imported {count} expenses into '{name}', replacing the previous ones"),
        ImportInfo { project, count },
    ))
}
