use crate::domain::entity::{Entity, EntityKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Backlog,
    Today,
    Doing,
    Completed,
    Tomorrow,
}

impl TaskStatus {
    /// Kanban column order.
    pub const COLUMNS: [TaskStatus; 5] = [
        TaskStatus::Backlog,
        TaskStatus::Tomorrow,
        TaskStatus::Today,
        TaskStatus::Doing,
        TaskStatus::Completed,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Asap,
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Lower is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Self::Asap => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub objective_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_id: Option<String>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = self.title.as_deref() {
            validate_non_empty(title, "task.title")?;
        }
        Ok(())
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Tasks;
    type Patch = TaskPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &TaskPatch) -> Result<(), String> {
        patch.validate()
    }

    fn validate_new(patch: &TaskPatch) -> Result<(), String> {
        require(&patch.title, "task.title")?;
        patch.validate()
    }

    fn merged(&self, patch: &TaskPatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(description) = &patch.description {
            next.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            next.due_date = Some(due_date);
        }
        if let Some(objective_id) = &patch.objective_id {
            next.objective_id = Some(objective_id.clone());
        }
        next
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveStatus {
    Active,
    Achieved,
    Aborted,
    Interrupted,
    Archived,
    Paused,
}

impl ObjectiveStatus {
    pub const COLUMNS: [ObjectiveStatus; 6] = [
        ObjectiveStatus::Active,
        ObjectiveStatus::Paused,
        ObjectiveStatus::Interrupted,
        ObjectiveStatus::Achieved,
        ObjectiveStatus::Aborted,
        ObjectiveStatus::Archived,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ObjectiveStatus,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectivePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ObjectiveStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
}

impl ObjectivePatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = self.title.as_deref() {
            validate_non_empty(title, "objective.title")?;
        }
        Ok(())
    }
}

impl Entity for Objective {
    const KIND: EntityKind = EntityKind::Objectives;
    type Patch = ObjectivePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &ObjectivePatch) -> Result<(), String> {
        patch.validate()
    }

    fn validate_new(patch: &ObjectivePatch) -> Result<(), String> {
        require(&patch.title, "objective.title")?;
        patch.validate()
    }

    fn merged(&self, patch: &ObjectivePatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(description) = &patch.description {
            next.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(target_date) = patch.target_date {
            next.target_date = Some(target_date);
        }
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub title: String,
    pub remind_at: DateTime<Utc>,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl ReminderPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = self.title.as_deref() {
            validate_non_empty(title, "reminder.title")?;
        }
        Ok(())
    }
}

impl Entity for Reminder {
    const KIND: EntityKind = EntityKind::Reminders;
    type Patch = ReminderPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &ReminderPatch) -> Result<(), String> {
        patch.validate()
    }

    fn validate_new(patch: &ReminderPatch) -> Result<(), String> {
        require(&patch.title, "reminder.title")?;
        require(&patch.remind_at, "reminder.remind_at")?;
        patch.validate()
    }

    fn merged(&self, patch: &ReminderPatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(remind_at) = patch.remind_at {
            next.remind_at = remind_at;
        }
        if let Some(done) = patch.done {
            next.done = done;
        }
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub title: String,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MeetingPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = self.title.as_deref() {
            validate_non_empty(title, "meeting.title")?;
        }
        if let (Some(start_at), Some(end_at)) = (self.start_at, self.end_at) {
            if end_at <= start_at {
                return Err("meeting.end_at must be after meeting.start_at".to_string());
            }
        }
        Ok(())
    }
}

impl Entity for Meeting {
    const KIND: EntityKind = EntityKind::Meetings;
    type Patch = MeetingPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &MeetingPatch) -> Result<(), String> {
        patch.validate()
    }

    fn validate_new(patch: &MeetingPatch) -> Result<(), String> {
        require(&patch.title, "meeting.title")?;
        require(&patch.start_at, "meeting.start_at")?;
        patch.validate()
    }

    fn merged(&self, patch: &MeetingPatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(start_at) = patch.start_at {
            next.start_at = start_at;
        }
        if let Some(end_at) = patch.end_at {
            next.end_at = Some(end_at);
        }
        if let Some(location) = &patch.location {
            next.location = Some(location.clone());
        }
        if let Some(notes) = &patch.notes {
            next.notes = Some(notes.clone());
        }
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = self.title.as_deref() {
            validate_non_empty(title, "note.title")?;
        }
        Ok(())
    }
}

impl Entity for Note {
    const KIND: EntityKind = EntityKind::Notes;
    type Patch = NotePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &NotePatch) -> Result<(), String> {
        patch.validate()
    }

    fn validate_new(patch: &NotePatch) -> Result<(), String> {
        require(&patch.title, "note.title")?;
        patch.validate()
    }

    fn merged(&self, patch: &NotePatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(content) = &patch.content {
            next.content = content.clone();
        }
        next
    }
}

/// Number of work/break pairs in one focus cycle. Carried as `"3"`..`"5"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CycleMode {
    #[serde(rename = "3")]
    Three,
    #[default]
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

impl CycleMode {
    pub fn repetitions(self) -> usize {
        match self {
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    pub fn from_repetitions(value: u32) -> Option<Self> {
        match value {
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            5 => Some(Self::Five),
            _ => None,
        }
    }
}

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "userId")]
    pub owner_id: String,
    pub work_duration: u32,
    pub short_break: u32,
    pub long_break: u32,
    #[serde(default)]
    pub cycle_mode: CycleMode,
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_sound_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: String::new(),
            owner_id: String::new(),
            work_duration: DEFAULT_WORK_MINUTES,
            short_break: DEFAULT_SHORT_BREAK_MINUTES,
            long_break: DEFAULT_LONG_BREAK_MINUTES,
            cycle_mode: CycleMode::default(),
            sound_enabled: true,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        validate_positive_minutes(self.work_duration, "settings.work_duration")?;
        validate_positive_minutes(self.short_break, "settings.short_break")?;
        validate_positive_minutes(self.long_break, "settings.long_break")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_mode: Option<CycleMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(minutes) = self.work_duration {
            validate_positive_minutes(minutes, "settings.work_duration")?;
        }
        if let Some(minutes) = self.short_break {
            validate_positive_minutes(minutes, "settings.short_break")?;
        }
        if let Some(minutes) = self.long_break {
            validate_positive_minutes(minutes, "settings.long_break")?;
        }
        Ok(())
    }
}

impl Entity for Settings {
    const KIND: EntityKind = EntityKind::Settings;
    type Patch = SettingsPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &SettingsPatch) -> Result<(), String> {
        patch.validate()
    }

    fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(minutes) = patch.work_duration {
            next.work_duration = minutes;
        }
        if let Some(minutes) = patch.short_break {
            next.short_break = minutes;
        }
        if let Some(minutes) = patch.long_break {
            next.long_break = minutes;
        }
        if let Some(mode) = patch.cycle_mode {
            next.cycle_mode = mode;
        }
        if let Some(enabled) = patch.sound_enabled {
            next.sound_enabled = enabled;
        }
        next
    }
}

/// Bearer credential issued by the auth service after username/password login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionToken {
    pub access_token: String,
    pub username: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn is_usable(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn require<T>(value: &Option<T>, field_name: &str) -> Result<(), String> {
    if value.is_none() {
        return Err(format!("{field_name} is required"));
    }
    Ok(())
}

fn validate_positive_minutes(value: u32, field_name: &str) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{field_name} must be > 0"));
    }
    Ok(())
}
