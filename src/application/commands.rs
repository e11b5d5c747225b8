use crate::application::bootstrap::bootstrap_workspace;
use crate::application::focus_timer::{FocusNotifier, FocusPrompt, FocusTimer, LogNotifier};
use crate::application::forms::{FormSubmission, submit_create, submit_update};
use crate::application::mission_data::{HydrationStatus, MissionData};
use crate::domain::board::{
    ObjectiveBoard, TaskBoard, due_reminders, objective_board, task_board, upcoming_meetings,
};
use crate::domain::entity::EntityKind;
use crate::domain::focus::{CycleConfig, FocusEngine, FocusSnapshot, FocusSummary, Refusal, Transition};
use crate::domain::models::{
    Meeting, MeetingPatch, Note, NotePatch, Objective, ObjectivePatch, ObjectiveStatus, Reminder,
    ReminderPatch, SessionToken, Settings, SettingsPatch, Task, TaskPatch, TaskStatus,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::credential_store::{CredentialStore, KeyringCredentialStore};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::remote_store::{RemoteStore, ReqwestRemoteStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub struct AppState {
    config: AppConfig,
    credentials: Arc<dyn CredentialStore>,
    data: MissionData,
    focus: FocusTimer,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        let data = MissionData::new(remote, config.request_timeout());
        let focus = FocusTimer::new(
            FocusEngine::new(CycleConfig::default()),
            Arc::new(LogNotifier),
            Arc::new(LogNotifier),
        );
        Self {
            config,
            credentials,
            data,
            focus,
        }
    }

    /// Bootstraps `workspace_root`, installs logging and wires the keyring
    /// credential store and the HTTP remote store from config.
    pub fn open(workspace_root: &Path) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(workspace_root)?;
        init_logging(&bootstrap.config.log_level, &bootstrap.logs_dir)?;

        let config = bootstrap.config;
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(KeyringCredentialStore::from_config(&config));
        let remote = ReqwestRemoteStore::new(
            &config.api_base_url,
            config.request_timeout(),
            credentials.clone(),
        )?;
        info!(api_base_url = %remote.base_url(), "remote store configured");
        Ok(Self::new(config, credentials, Arc::new(remote)))
    }

    pub fn with_focus_listeners(
        mut self,
        notifier: Arc<dyn FocusNotifier>,
        prompt: Arc<dyn FocusPrompt>,
    ) -> Self {
        self.focus = FocusTimer::new(FocusEngine::new(CycleConfig::default()), notifier, prompt);
        self
    }

    pub fn data(&self) -> &MissionData {
        &self.data
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        error!(command, error = %error, "command failed");
        error.to_string()
    }

    fn apply_stored_settings(&self) {
        if let Some(settings) = self.data.settings.get().first() {
            self.focus.configure(settings);
        }
    }
}

pub fn login_impl(
    state: &AppState,
    access_token: String,
    username: Option<String>,
) -> Result<(), InfraError> {
    let token = SessionToken {
        access_token: access_token.trim().to_string(),
        username: username
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned),
        issued_at: Utc::now(),
    };
    if !token.is_usable() {
        return Err(InfraError::InvalidConfig(
            "access token must not be empty".to_string(),
        ));
    }
    state.credentials.save_token(&token)?;
    info!(command = "login", username = token.username.as_deref(), "session stored");
    Ok(())
}

pub fn logout_impl(state: &AppState) -> Result<(), InfraError> {
    state.credentials.delete_token()?;
    info!(command = "logout", "session cleared");
    Ok(())
}

pub fn is_authenticated_impl(state: &AppState) -> Result<bool, InfraError> {
    Ok(state.credentials.bearer_token()?.is_some())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    pub username: Option<String>,
    pub credential_service: String,
    pub credential_account: String,
}

pub fn session_status_impl(state: &AppState) -> Result<SessionStatus, InfraError> {
    Ok(SessionStatus {
        authenticated: is_authenticated_impl(state)?,
        username: state.credentials.session_username()?,
        credential_service: state.config.credential_service.clone(),
        credential_account: state.config.credential_account.clone(),
    })
}

/// Loads all six collections at once; the focus engine picks up stored settings.
pub async fn hydrate_impl(state: &AppState) -> HydrationStatus {
    let status = state.data.refresh_all().await;
    state.apply_stored_settings();
    status
}

pub fn hydration_status_impl(state: &AppState) -> HydrationStatus {
    state.data.hydration()
}

pub async fn retry_failed_loads_impl(state: &AppState) -> Vec<EntityKind> {
    let retried = state.data.retry_failed_loads().await;
    if retried.contains(&EntityKind::Settings) {
        state.apply_stored_settings();
    }
    retried
}

pub fn list_tasks_impl(state: &AppState) -> Vec<Task> {
    state.data.tasks.get()
}

pub async fn create_task_impl(state: &AppState, patch: TaskPatch) -> FormSubmission<Task> {
    submit_create(&state.data.tasks, &patch).await
}

pub async fn update_task_impl(
    state: &AppState,
    task_id: String,
    patch: TaskPatch,
) -> FormSubmission<Task> {
    submit_update(&state.data.tasks, task_id.trim(), &patch).await
}

/// Kanban drop: the card shows in the new column before the server answers.
pub async fn move_task_impl(state: &AppState, task_id: String, status: TaskStatus) -> Option<Task> {
    state
        .data
        .tasks
        .update(task_id.trim(), &TaskPatch::status(status))
        .await
}

pub async fn delete_task_impl(state: &AppState, task_id: String) -> bool {
    state.data.tasks.delete(task_id.trim()).await
}

pub fn task_board_impl(state: &AppState) -> TaskBoard {
    task_board(&state.data.tasks.get())
}

pub fn list_objectives_impl(state: &AppState) -> Vec<Objective> {
    state.data.objectives.get()
}

pub async fn create_objective_impl(
    state: &AppState,
    patch: ObjectivePatch,
) -> FormSubmission<Objective> {
    submit_create(&state.data.objectives, &patch).await
}

pub async fn update_objective_impl(
    state: &AppState,
    objective_id: String,
    patch: ObjectivePatch,
) -> FormSubmission<Objective> {
    submit_update(&state.data.objectives, objective_id.trim(), &patch).await
}

pub async fn set_objective_status_impl(
    state: &AppState,
    objective_id: String,
    status: ObjectiveStatus,
) -> Option<Objective> {
    let patch = ObjectivePatch {
        status: Some(status),
        ..ObjectivePatch::default()
    };
    state.data.objectives.update(objective_id.trim(), &patch).await
}

pub async fn delete_objective_impl(state: &AppState, objective_id: String) -> bool {
    state.data.objectives.delete(objective_id.trim()).await
}

pub fn objective_board_impl(state: &AppState) -> ObjectiveBoard {
    objective_board(&state.data.objectives.get())
}

pub fn list_reminders_impl(state: &AppState) -> Vec<Reminder> {
    state.data.reminders.get()
}

pub async fn create_reminder_impl(
    state: &AppState,
    patch: ReminderPatch,
) -> FormSubmission<Reminder> {
    submit_create(&state.data.reminders, &patch).await
}

pub async fn update_reminder_impl(
    state: &AppState,
    reminder_id: String,
    patch: ReminderPatch,
) -> FormSubmission<Reminder> {
    submit_update(&state.data.reminders, reminder_id.trim(), &patch).await
}

pub async fn toggle_reminder_impl(state: &AppState, reminder_id: String) -> Option<Reminder> {
    let reminder_id = reminder_id.trim();
    let current = state.data.reminders.find(reminder_id)?;
    let patch = ReminderPatch {
        done: Some(!current.done),
        ..ReminderPatch::default()
    };
    state.data.reminders.update(reminder_id, &patch).await
}

pub async fn delete_reminder_impl(state: &AppState, reminder_id: String) -> bool {
    state.data.reminders.delete(reminder_id.trim()).await
}

pub fn due_reminders_impl(state: &AppState, now: DateTime<Utc>) -> Vec<Reminder> {
    due_reminders(&state.data.reminders.get(), now)
}

pub fn list_meetings_impl(state: &AppState) -> Vec<Meeting> {
    state.data.meetings.get()
}

pub async fn create_meeting_impl(state: &AppState, patch: MeetingPatch) -> FormSubmission<Meeting> {
    submit_create(&state.data.meetings, &patch).await
}

pub async fn update_meeting_impl(
    state: &AppState,
    meeting_id: String,
    patch: MeetingPatch,
) -> FormSubmission<Meeting> {
    submit_update(&state.data.meetings, meeting_id.trim(), &patch).await
}

pub async fn delete_meeting_impl(state: &AppState, meeting_id: String) -> bool {
    state.data.meetings.delete(meeting_id.trim()).await
}

pub fn upcoming_meetings_impl(state: &AppState, now: DateTime<Utc>) -> Vec<Meeting> {
    upcoming_meetings(&state.data.meetings.get(), now)
}

pub fn list_notes_impl(state: &AppState) -> Vec<Note> {
    state.data.notes.get()
}

pub async fn create_note_impl(state: &AppState, patch: NotePatch) -> FormSubmission<Note> {
    submit_create(&state.data.notes, &patch).await
}

pub async fn update_note_impl(
    state: &AppState,
    note_id: String,
    patch: NotePatch,
) -> FormSubmission<Note> {
    submit_update(&state.data.notes, note_id.trim(), &patch).await
}

pub async fn delete_note_impl(state: &AppState, note_id: String) -> bool {
    state.data.notes.delete(note_id.trim()).await
}

/// Stored settings, or the defaults before the first save.
pub fn get_settings_impl(state: &AppState) -> Settings {
    state
        .data
        .settings
        .get()
        .into_iter()
        .next()
        .unwrap_or_default()
}

pub async fn save_settings_impl(state: &AppState, patch: SettingsPatch) -> FormSubmission<Settings> {
    let current_id = get_settings_impl(state).id;
    let submission = submit_update(&state.data.settings, &current_id, &patch).await;
    if let Some(settings) = submission.entity() {
        state.focus.configure(settings);
        info!(
            command = "save_settings",
            work_duration = settings.work_duration,
            short_break = settings.short_break,
            long_break = settings.long_break,
            "focus cycle reconfigured"
        );
    }
    submission
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusCommandResponse {
    pub applied: bool,
    pub refusal: Option<String>,
    pub state: FocusSnapshot,
}

fn focus_response(state: &AppState, transition: Transition) -> FocusCommandResponse {
    let refusal = match transition {
        Transition::Applied(_) => None,
        Transition::Refused(Refusal::FocusRequired) => {
            Some("a focus description is required to start a work session".to_string())
        }
        Transition::Refused(Refusal::NotIdle) => Some("timer is already running".to_string()),
        Transition::Refused(Refusal::NotRunning) => Some("timer is not running".to_string()),
    };
    FocusCommandResponse {
        applied: refusal.is_none(),
        refusal,
        state: state.focus.snapshot(),
    }
}

pub fn focus_state_impl(state: &AppState) -> FocusSnapshot {
    state.focus.snapshot()
}

pub fn start_focus_impl(state: &AppState, focus: Option<String>) -> FocusCommandResponse {
    let transition = state.focus.start(focus.as_deref());
    focus_response(state, transition)
}

pub fn pause_focus_impl(state: &AppState) -> FocusCommandResponse {
    let transition = state.focus.pause();
    focus_response(state, transition)
}

pub fn reset_focus_session_impl(state: &AppState) -> FocusSnapshot {
    state.focus.reset_session();
    state.focus.snapshot()
}

pub fn reset_focus_cycle_impl(state: &AppState) -> FocusSnapshot {
    state.focus.reset_cycle();
    state.focus.snapshot()
}

pub fn focus_summary_impl(state: &AppState) -> FocusSummary {
    state.focus.summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeRemoteStore, Operation, settings_row, task_row};
    use crate::domain::focus::SessionKind;
    use crate::domain::models::{CycleMode, TaskPriority};
    use crate::infrastructure::credential_store::InMemoryCredentialStore;

    fn app_state(remote: &Arc<FakeRemoteStore>) -> AppState {
        AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryCredentialStore::default()),
            remote.clone(),
        )
    }

    // Scenario A
    #[tokio::test]
    async fn new_task_form_saves_and_closes() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);
        hydrate_impl(&state).await;

        let submission = create_task_impl(
            &state,
            TaskPatch {
                title: Some("Fix bug".to_string()),
                priority: Some(TaskPriority::Asap),
                status: Some(TaskStatus::Backlog),
                ..TaskPatch::default()
            },
        )
        .await;

        assert!(submission.should_close());
        let created = submission.into_entity().expect("created task");
        assert_eq!(created.id, "t1");
        assert_eq!(created.title, "Fix bug");
        assert_eq!(created.priority, TaskPriority::Asap);
        assert_eq!(list_tasks_impl(&state), vec![created.clone()]);
        let board = task_board_impl(&state);
        assert_eq!(board[0].status, TaskStatus::Backlog);
        assert_eq!(board[0].items, vec![created]);
    }

    // Scenario B
    #[tokio::test]
    async fn rejected_drop_returns_card_to_its_column() {
        let remote = Arc::new(FakeRemoteStore::default());
        remote.seed(EntityKind::Tasks, vec![task_row("t1", "Fix bug", "BACKLOG", "ASAP")]);
        remote.fail(EntityKind::Tasks, Operation::Update);
        let state = app_state(&remote);
        hydrate_impl(&state).await;

        assert_eq!(
            move_task_impl(&state, "t1".to_string(), TaskStatus::Doing).await,
            None
        );
        let board = task_board_impl(&state);
        assert_eq!(board[0].items.len(), 1);
        assert!(board.iter().skip(1).all(|column| column.items.is_empty()));
        assert_eq!(hydration_status_impl(&state).errors.len(), 1);
    }

    #[tokio::test]
    async fn hydration_configures_focus_from_stored_settings() {
        let remote = Arc::new(FakeRemoteStore::default());
        remote.seed(EntityKind::Settings, vec![settings_row(50, 10, 30, "3")]);
        let state = app_state(&remote);

        let status = hydrate_impl(&state).await;
        assert!(status.all_loaded);
        let focus = focus_state_impl(&state);
        assert_eq!(focus.total_sessions, 6);
        assert_eq!(focus.remaining_seconds, 50 * 60);
        assert_eq!(focus.display, "50:00");
    }

    // Scenario C
    #[tokio::test]
    async fn saved_settings_reshape_the_next_cycle() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);
        hydrate_impl(&state).await;
        assert_eq!(get_settings_impl(&state), Settings::default());

        let submission = save_settings_impl(
            &state,
            SettingsPatch {
                work_duration: Some(30),
                cycle_mode: Some(CycleMode::Five),
                ..SettingsPatch::default()
            },
        )
        .await;
        assert!(submission.should_close());
        assert_eq!(get_settings_impl(&state).work_duration, 30);

        let focus = focus_state_impl(&state);
        assert_eq!(focus.total_sessions, 10);
        assert_eq!(focus.remaining_seconds, 30 * 60);
    }

    #[tokio::test]
    async fn invalid_settings_are_not_sent() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);

        let submission = save_settings_impl(
            &state,
            SettingsPatch {
                short_break: Some(0),
                ..SettingsPatch::default()
            },
        )
        .await;
        assert!(matches!(submission, FormSubmission::Invalid { .. }));
        assert_eq!(remote.total_calls(), 0);
        assert_eq!(focus_state_impl(&state).remaining_seconds, 25 * 60);
    }

    #[tokio::test]
    async fn toggling_a_reminder_flips_done() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);
        let created = create_reminder_impl(
            &state,
            ReminderPatch {
                title: Some("Call the bank".to_string()),
                remind_at: Some(Utc::now()),
                ..ReminderPatch::default()
            },
        )
        .await
        .into_entity()
        .expect("created reminder");
        assert!(!created.done);

        let toggled = toggle_reminder_impl(&state, created.id.clone())
            .await
            .expect("toggled");
        assert!(toggled.done);
        assert!(due_reminders_impl(&state, Utc::now()).is_empty());
        assert_eq!(toggle_reminder_impl(&state, "missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn objective_status_moves_between_columns() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);
        let objective = create_objective_impl(
            &state,
            ObjectivePatch {
                title: Some("Launch beta".to_string()),
                ..ObjectivePatch::default()
            },
        )
        .await
        .into_entity()
        .expect("created objective");

        let updated = set_objective_status_impl(&state, objective.id, ObjectiveStatus::Achieved)
            .await
            .expect("updated");
        assert_eq!(updated.status, ObjectiveStatus::Achieved);
        let board = objective_board_impl(&state);
        let achieved = board
            .iter()
            .find(|column| column.status == ObjectiveStatus::Achieved)
            .expect("achieved column");
        assert_eq!(achieved.items, vec![updated]);
    }

    #[tokio::test]
    async fn focus_commands_report_refusals() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);

        let refused = start_focus_impl(&state, None);
        assert!(!refused.applied);
        assert!(refused.refusal.is_some());
        assert_eq!(refused.state.phase, "idle");

        let started = start_focus_impl(&state, Some("Review PRs".to_string()));
        assert!(started.applied);
        assert_eq!(started.state.session_kind, SessionKind::Work);
        assert_eq!(started.state.focus.as_deref(), Some("Review PRs"));

        let paused = pause_focus_impl(&state);
        assert!(paused.applied);
        let reset = reset_focus_cycle_impl(&state);
        assert_eq!(reset.focus, None);
        assert_eq!(focus_summary_impl(&state).completed_work_sessions, 0);
    }

    #[test]
    fn login_stores_and_logout_clears_the_token() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);

        assert!(login_impl(&state, "   ".to_string(), None).is_err());
        assert!(!is_authenticated_impl(&state).expect("check"));

        login_impl(&state, "abc".to_string(), Some(" ada ".to_string())).expect("login");
        assert!(is_authenticated_impl(&state).expect("check"));
        let session = session_status_impl(&state).expect("session");
        assert!(session.authenticated);
        assert_eq!(session.username.as_deref(), Some("ada"));
        assert_eq!(session.credential_account, AppConfig::default().credential_account);

        logout_impl(&state).expect("logout");
        assert!(!is_authenticated_impl(&state).expect("check"));
        assert_eq!(session_status_impl(&state).expect("session").username, None);
    }

    #[derive(Default)]
    struct StartCounter {
        starts: std::sync::Mutex<Vec<SessionKind>>,
    }

    impl FocusNotifier for StartCounter {
        fn session_start(&self, kind: SessionKind) {
            self.starts.lock().expect("starts lock").push(kind);
        }

        fn session_end(&self, _kind: SessionKind) {}

        fn cycle_complete(&self) {}
    }

    impl FocusPrompt for StartCounter {
        fn request_focus(&self, _prefill: Option<&str>) {}
    }

    #[tokio::test(start_paused = true)]
    async fn focus_listeners_receive_session_events() {
        let remote = Arc::new(FakeRemoteStore::default());
        let listener = Arc::new(StartCounter::default());
        let state = app_state(&remote).with_focus_listeners(listener.clone(), listener.clone());

        assert!(start_focus_impl(&state, Some("Triage inbox".to_string())).applied);
        assert_eq!(
            *listener.starts.lock().expect("starts lock"),
            vec![SessionKind::Work]
        );
        reset_focus_cycle_impl(&state);
    }

    #[test]
    fn command_error_returns_the_message() {
        let remote = Arc::new(FakeRemoteStore::default());
        let state = app_state(&remote);
        let message = state.command_error("status", &InfraError::MissingCredential);
        assert_eq!(message, "authentication required");
    }
}
