use crate::commands::{Out, CANCELLED};
use crate::confirm::Confirm;
use crate::model::{Project, ProjectId};
use crate::persist::KeyValueStore;
use crate::session::Tracker;
use crate::store::Action;
use crate::Result;
use serde::Serialize;

/// A project as reported by the project commands.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    pub name: String,
    pub expenses: usize,
    pub current: bool,
}

impl ProjectInfo {
    fn new(project: &Project, current: Option<&ProjectId>) -> Self {
        Self {
            id: project.id().clone(),
            name: project.name().to_string(),
            expenses: project.entries().len(),
            current: current == Some(project.id()),
        }
    }
}

/// Creates an empty project and makes it the current one. A name that is empty after trimming
/// creates nothing.
pub async fn project_add<S>(tracker: &mut Tracker<S>, name: &str) -> Result<Out<ProjectInfo>>
where
    S: KeyValueStore,
{
    let id = ProjectId::generate();
    let action = Action::CreateProject {
        id: id.clone(),
        name: name.to_string(),
    };
    if !tracker.dispatch(action).await? {
        return Ok("The project name is empty, no project was created".into());
    }
    let project = tracker.project(Some(&id))?;
    let info = ProjectInfo::new(project, tracker.state().current_id());
    Ok(Out::new(
        format!("Created project '{}' with id {}", info.name, info.id),
        info,
    ))
}

/// Renames a project. Empty names are allowed.
pub async fn project_rename<S>(
    tracker: &mut Tracker<S>,
    id: &ProjectId,
    name: &str,
) -> Result<Out<ProjectInfo>>
where
    S: KeyValueStore,
{
    let old = tracker.project(Some(id))?.name().to_string();
    let changed = tracker
        .dispatch(Action::RenameProject {
            id: id.clone(),
            name: name.to_string(),
        })
        .await?;
    let info = ProjectInfo::new(tracker.project(Some(id))?, tracker.state().current_id());
    let message = if changed {
        format!("Renamed project '{old}' to '{name}'")
    } else {
        format!("Project '{old}' already has that name")
    };
    Ok(Out::new(message, info))
}

/// Deletes a project and all of its expenses after asking for confirmation.
pub async fn project_delete<S>(
    tracker: &mut Tracker<S>,
    id: &ProjectId,
    confirm: &dyn Confirm,
) -> Result<Out<()>>
where
    S: KeyValueStore,
{
    let project = tracker.project(Some(id))?;
    let prompt = format!(
        "Delete project '{}' and its {} expense(s)?",
        project.name(),
        project.entries().len()
    );
    let name = project.name().to_string();
    if !confirm.confirm(&prompt).await {
        return Ok(CANCELLED.into());
    }
    tracker
        .dispatch(Action::DeleteProject { id: id.clone() })
        .await?;
    let message = match tracker.state().current() {
        Some(current) => format!(
            "Deleted project '{name}', the current project is now '{}'",
            current.name()
        ),
        None => format!("Deleted project '{name}', there are no projects left"),
    };
    Ok(message.into())
}

pub async fn project_select<S>(tracker: &mut Tracker<S>, id: &ProjectId) -> Result<Out<()>>
where
    S: KeyValueStore,
{
    let name = tracker.project(Some(id))?.name().to_string();
    tracker
        .dispatch(Action::SelectProject { id: id.clone() })
        .await?;
    Ok(format!("The current project is '{name}'").into())
}

/// Lists all projects, newest first. The current project is marked with `*`.
pub fn project_list<S>(tracker: &Tracker<S>) -> Result<Out<Vec<ProjectInfo>>>
where
    S: KeyValueStore,
{
    let current = tracker.state().current_id();
    let infos: Vec<ProjectInfo> = tracker
        .state()
        .projects()
        .iter()
        .map(|p| ProjectInfo::new(p, current))
        .collect();
    if infos.is_empty() {
        return Ok(Out::new(
            "There are no projects, create one with 'expenses project add <name>'",
            infos,
        ));
    }
    let lines: Vec<String> = infos
        .iter()
        .map(|p| {
            format!(
                "{} {}  {} ({} expense{})",
                if p.current { "*" } else { " " },
                p.id,
                p.name,
                p.expenses,
                if p.expenses == 1 { "" } else { "s" }
            )
        })
        .collect();
    Ok(Out::new(lines.join("\n"), infos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AssumeYes;
    use crate::test::{trip_id, TestEnv};

    struct Decline;

    #[async_trait::async_trait]
    impl Confirm for Decline {
        async fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let out = project_add(&mut tracker, " Home ").await.unwrap();
        let added = out.structure().unwrap().clone();
        assert_eq!(added.name, "Home");
        assert!(added.current);
        assert!(added.id.as_str().starts_with("proj-"));

        let tracker = env.tracker().await;
        let listed = project_list(&tracker).unwrap();
        let listed = listed.structure().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], added);
        assert_eq!(listed[1].name, "Trip");
        assert_eq!(listed[1].expenses, 2);
        assert!(!listed[1].current);
    }

    #[tokio::test]
    async fn test_add_whitespace_name_is_noop() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let out = project_add(&mut tracker, "   ").await.unwrap();
        assert!(out.structure().is_none());
        assert_eq!(tracker.state().projects().len(), 1);
    }

    #[tokio::test]
    async fn test_rename() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let before = tracker.project(None).unwrap().expenses();
        let out = project_rename(&mut tracker, &trip_id(), "Vacation")
            .await
            .unwrap();
        assert_eq!(out.message(), "Renamed project 'Trip' to 'Vacation'");

        let tracker = env.tracker().await;
        let project = tracker.project(Some(&trip_id())).unwrap();
        assert_eq!(project.name(), "Vacation");
        assert_eq!(project.expenses(), before);
    }

    #[tokio::test]
    async fn test_delete_declined_changes_nothing() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let out = project_delete(&mut tracker, &trip_id(), &Decline)
            .await
            .unwrap();
        assert_eq!(out.message(), CANCELLED);
        assert_eq!(env.tracker().await.state().projects().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_current_selects_remaining() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        project_add(&mut tracker, "Home").await.unwrap();
        project_select(&mut tracker, &trip_id()).await.unwrap();
        let out = project_delete(&mut tracker, &trip_id(), &AssumeYes)
            .await
            .unwrap();
        assert!(out.message().contains("now 'Home'"));

        let tracker = env.tracker().await;
        assert_eq!(tracker.state().current().unwrap().name(), "Home");
    }

    #[tokio::test]
    async fn test_delete_last_project() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        project_delete(&mut tracker, &trip_id(), &AssumeYes)
            .await
            .unwrap();
        let tracker = env.tracker().await;
        assert!(tracker.state().is_empty());
        assert!(project_list(&tracker).unwrap().structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let unknown = ProjectId::from("proj-9");
        assert!(project_select(&mut tracker, &unknown).await.is_err());
        assert!(project_delete(&mut tracker, &unknown, &AssumeYes)
            .await
            .is_err());
        assert!(project_rename(&mut tracker, &unknown, "x").await.is_err());
    }
}
