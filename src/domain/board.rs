use crate::domain::models::{Meeting, Objective, ObjectiveStatus, Reminder, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn<S, T> {
    pub status: S,
    pub items: Vec<T>,
}

pub type TaskBoard = Vec<BoardColumn<TaskStatus, Task>>;
pub type ObjectiveBoard = Vec<BoardColumn<ObjectiveStatus, Objective>>;

/// Kanban columns in display order. Inside a column tasks are ordered by
/// priority; equal priorities keep the server's order.
pub fn task_board(tasks: &[Task]) -> TaskBoard {
    TaskStatus::COLUMNS
        .into_iter()
        .map(|status| {
            let mut items = tasks
                .iter()
                .filter(|task| task.status == status)
                .cloned()
                .collect::<Vec<_>>();
            items.sort_by_key(|task| task.priority.rank());
            BoardColumn { status, items }
        })
        .collect()
}

pub fn objective_board(objectives: &[Objective]) -> ObjectiveBoard {
    ObjectiveStatus::COLUMNS
        .into_iter()
        .map(|status| BoardColumn {
            status,
            items: objectives
                .iter()
                .filter(|objective| objective.status == status)
                .cloned()
                .collect(),
        })
        .collect()
}

/// Meetings not yet over at `now`, soonest first.
pub fn upcoming_meetings(meetings: &[Meeting], now: DateTime<Utc>) -> Vec<Meeting> {
    let mut upcoming = meetings
        .iter()
        .filter(|meeting| meeting.end_at.unwrap_or(meeting.start_at) >= now)
        .cloned()
        .collect::<Vec<_>>();
    upcoming.sort_by_key(|meeting| meeting.start_at);
    upcoming
}

/// Open reminders whose time has come, oldest first.
pub fn due_reminders(reminders: &[Reminder], now: DateTime<Utc>) -> Vec<Reminder> {
    let mut due = reminders
        .iter()
        .filter(|reminder| !reminder.done && reminder.remind_at <= now)
        .cloned()
        .collect::<Vec<_>>();
    due.sort_by_key(|reminder| reminder.remind_at);
    due
}
