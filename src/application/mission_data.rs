use crate::application::entity_manager::{CollectionStatus, EntityManager};
use crate::domain::entity::EntityKind;
use crate::domain::models::{Meeting, Note, Objective, Reminder, Settings, Task};
use crate::infrastructure::remote_store::RemoteStore;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationError {
    pub kind: EntityKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationStatus {
    pub is_hydrating: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub errors: Vec<HydrationError>,
    pub all_loaded: bool,
}

impl HydrationStatus {
    pub fn from_statuses(statuses: &[CollectionStatus]) -> Self {
        let completed_count = statuses.iter().filter(|status| status.is_initialized).count();
        let errors = statuses
            .iter()
            .filter_map(|status| {
                status.error.as_ref().map(|message| HydrationError {
                    kind: status.kind,
                    message: message.clone(),
                })
            })
            .collect::<Vec<_>>();
        Self {
            is_hydrating: statuses
                .iter()
                .any(|status| status.is_loading && !status.is_initialized),
            completed_count,
            total_count: statuses.len(),
            all_loaded: completed_count == statuses.len(),
            errors,
        }
    }
}

/// The six entity managers the dashboard keeps, built once and handed to
/// whatever needs them.
pub struct MissionData {
    pub tasks: EntityManager<Task>,
    pub objectives: EntityManager<Objective>,
    pub reminders: EntityManager<Reminder>,
    pub meetings: EntityManager<Meeting>,
    pub notes: EntityManager<Note>,
    pub settings: EntityManager<Settings>,
}

impl MissionData {
    pub fn new(remote: Arc<dyn RemoteStore>, request_timeout: Duration) -> Self {
        Self {
            tasks: EntityManager::new(remote.clone(), request_timeout),
            objectives: EntityManager::new(remote.clone(), request_timeout),
            reminders: EntityManager::new(remote.clone(), request_timeout),
            meetings: EntityManager::new(remote.clone(), request_timeout),
            notes: EntityManager::new(remote.clone(), request_timeout),
            settings: EntityManager::new(remote, request_timeout),
        }
    }

    pub fn status_of(&self, kind: EntityKind) -> CollectionStatus {
        match kind {
            EntityKind::Tasks => self.tasks.status(),
            EntityKind::Objectives => self.objectives.status(),
            EntityKind::Reminders => self.reminders.status(),
            EntityKind::Meetings => self.meetings.status(),
            EntityKind::Notes => self.notes.status(),
            EntityKind::Settings => self.settings.status(),
        }
    }

    pub fn statuses(&self) -> Vec<CollectionStatus> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| self.status_of(kind))
            .collect()
    }

    pub fn hydration(&self) -> HydrationStatus {
        HydrationStatus::from_statuses(&self.statuses())
    }

    pub async fn refresh(&self, kind: EntityKind) {
        match kind {
            EntityKind::Tasks => self.tasks.refresh().await,
            EntityKind::Objectives => self.objectives.refresh().await,
            EntityKind::Reminders => self.reminders.refresh().await,
            EntityKind::Meetings => self.meetings.refresh().await,
            EntityKind::Notes => self.notes.refresh().await,
            EntityKind::Settings => self.settings.refresh().await,
        }
    }

    pub async fn refresh_all(&self) -> HydrationStatus {
        tokio::join!(
            self.tasks.refresh(),
            self.objectives.refresh(),
            self.reminders.refresh(),
            self.meetings.refresh(),
            self.notes.refresh(),
            self.settings.refresh(),
        );
        let status = self.hydration();
        info!(
            completed = status.completed_count,
            total = status.total_count,
            failed = status.errors.len(),
            "hydration finished"
        );
        status
    }

    /// Re-requests every kind that failed and never loaded, and waits for all
    /// of them. Returns the kinds retried.
    pub async fn retry_failed_loads(&self) -> Vec<EntityKind> {
        let retry = self
            .statuses()
            .into_iter()
            .filter(|status| status.error.is_some() && !status.is_initialized)
            .map(|status| status.kind)
            .collect::<Vec<_>>();
        if retry.is_empty() {
            return retry;
        }

        info!(kinds = ?retry, "retrying failed loads");
        join_all(retry.iter().map(|kind| self.refresh(*kind))).await;
        retry
    }
}
