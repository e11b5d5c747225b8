use crate::application::entity_manager::EntityManager;
use crate::domain::entity::Entity;
use serde::Serialize;

/// Outcome of a create/edit form. Only `Saved` closes the form; on anything
/// else the user keeps what they typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormSubmission<T> {
    Saved { entity: T },
    Invalid { message: String },
    Failed { message: String },
}

impl<T> FormSubmission<T> {
    pub fn should_close(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    pub fn entity(&self) -> Option<&T> {
        match self {
            Self::Saved { entity } => Some(entity),
            Self::Invalid { .. } | Self::Failed { .. } => None,
        }
    }

    pub fn into_entity(self) -> Option<T> {
        match self {
            Self::Saved { entity } => Some(entity),
            Self::Invalid { .. } | Self::Failed { .. } => None,
        }
    }
}

pub async fn submit_create<K: Entity>(
    manager: &EntityManager<K>,
    patch: &K::Patch,
) -> FormSubmission<K> {
    if let Err(message) = K::validate_new(patch) {
        return FormSubmission::Invalid { message };
    }
    match manager.try_create(patch).await {
        Ok(entity) => FormSubmission::Saved { entity },
        Err(error) => FormSubmission::Failed {
            message: error.to_string(),
        },
    }
}

pub async fn submit_update<K: Entity>(
    manager: &EntityManager<K>,
    id: &str,
    patch: &K::Patch,
) -> FormSubmission<K> {
    if let Err(message) = K::validate_patch(patch) {
        return FormSubmission::Invalid { message };
    }
    match manager.try_update(id, patch).await {
        Ok(entity) => FormSubmission::Saved { entity },
        Err(error) => FormSubmission::Failed {
            message: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeRemoteStore, Operation, task_row};
    use crate::domain::entity::EntityKind;
    use crate::domain::models::{Note, NotePatch, Task, TaskPatch};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn invalid_form_never_reaches_the_remote() {
        let remote = Arc::new(FakeRemoteStore::default());
        let notes = EntityManager::<Note>::new(remote.clone(), Duration::from_secs(30));

        let submission = submit_create(&notes, &NotePatch::default()).await;
        assert!(matches!(submission, FormSubmission::Invalid { .. }));
        assert!(!submission.should_close());
        assert_eq!(remote.total_calls(), 0);
    }

    #[tokio::test]
    async fn remote_failure_keeps_the_form_open_with_the_reason() {
        let remote = Arc::new(FakeRemoteStore::default());
        remote.fail(EntityKind::Notes, Operation::Create);
        let notes = EntityManager::<Note>::new(remote.clone(), Duration::from_secs(30));

        let submission = submit_create(
            &notes,
            &NotePatch {
                title: Some("Standup".to_string()),
                ..NotePatch::default()
            },
        )
        .await;
        match &submission {
            FormSubmission::Failed { message } => assert!(message.contains("scripted failure")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!submission.should_close());
    }

    #[tokio::test]
    async fn each_form_reports_its_own_failure() {
        let remote = Arc::new(FakeRemoteStore::default());
        remote.seed(EntityKind::Tasks, vec![task_row("t1", "Fix bug", "BACKLOG", "ASAP")]);
        let tasks = EntityManager::<Task>::new(remote.clone(), Duration::from_secs(30));
        tasks.refresh().await;
        remote.fail(EntityKind::Tasks, Operation::Update);
        remote.fail(EntityKind::Tasks, Operation::Create);
        let release = remote.gate(EntityKind::Tasks, Operation::Update);

        let edit = TaskPatch {
            title: Some("Fix the bug".to_string()),
            ..TaskPatch::default()
        };
        let draft = TaskPatch {
            title: Some("Write docs".to_string()),
            ..TaskPatch::default()
        };
        let (edited, created) = tokio::join!(submit_update(&tasks, "t1", &edit), async {
            let created = submit_create(&tasks, &draft).await;
            release.send(()).expect("release gate");
            created
        });

        let messages = match (edited, created) {
            (FormSubmission::Failed { message: edit }, FormSubmission::Failed { message: draft }) => {
                (edit, draft)
            }
            other => panic!("expected two failures, got {other:?}"),
        };
        assert!(messages.0.contains("update tasks failed"), "{}", messages.0);
        assert!(messages.1.contains("create tasks failed"), "{}", messages.1);
        assert_eq!(tasks.find("t1").expect("t1 present").title, "Fix bug");
    }

    #[tokio::test]
    async fn editing_a_missing_entity_fails_without_a_request() {
        let remote = Arc::new(FakeRemoteStore::default());
        remote.seed(EntityKind::Tasks, vec![task_row("t1", "Fix bug", "BACKLOG", "ASAP")]);
        let tasks = EntityManager::<Task>::new(remote.clone(), Duration::from_secs(30));
        tasks.refresh().await;

        let submission = submit_update(&tasks, "t9", &TaskPatch::default()).await;
        assert_eq!(
            submission,
            FormSubmission::Failed {
                message: "task t9 not found".to_string()
            }
        );
        assert_eq!(remote.calls(EntityKind::Tasks, Operation::Update), 0);

        let saved = submit_update(
            &tasks,
            "t1",
            &TaskPatch {
                title: Some("Fix the bug".to_string()),
                ..TaskPatch::default()
            },
        )
        .await;
        assert!(saved.should_close());
        assert_eq!(saved.into_entity().expect("entity").title, "Fix the bug");
    }
}
