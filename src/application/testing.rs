//! In-process stand-in for the REST service used by the application tests.

use crate::domain::entity::EntityKind;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::remote_store::RemoteStore;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub const SERVER_CREATED_AT: &str = "2026-02-16T08:00:00Z";
pub const SERVER_UPDATED_AT: &str = "2026-02-16T09:30:00Z";
pub const OWNER_ID: &str = "user-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Keeps rows per kind the way the server would and lets tests script
/// failures and hold a call open until they release it.
#[derive(Default)]
pub struct FakeRemoteStore {
    rows: Mutex<HashMap<EntityKind, Vec<Value>>>,
    next_ids: Mutex<HashMap<EntityKind, usize>>,
    failing: Mutex<HashSet<(EntityKind, Operation)>>,
    gates: Mutex<HashMap<(EntityKind, Operation), oneshot::Receiver<()>>>,
    calls: Mutex<HashMap<(EntityKind, Operation), usize>>,
}

impl FakeRemoteStore {
    pub fn seed(&self, kind: EntityKind, rows: Vec<Value>) {
        self.rows.lock().expect("rows lock").insert(kind, rows);
    }

    pub fn rows(&self, kind: EntityKind) -> Vec<Value> {
        self.rows
            .lock()
            .expect("rows lock")
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail(&self, kind: EntityKind, operation: Operation) {
        self.failing
            .lock()
            .expect("failing lock")
            .insert((kind, operation));
    }

    pub fn recover(&self, kind: EntityKind, operation: Operation) {
        self.failing
            .lock()
            .expect("failing lock")
            .remove(&(kind, operation));
    }

    /// The next matching call waits until the returned sender fires or drops.
    pub fn gate(&self, kind: EntityKind, operation: Operation) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates lock")
            .insert((kind, operation), receiver);
        sender
    }

    pub fn calls(&self, kind: EntityKind, operation: Operation) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(&(kind, operation))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").values().sum()
    }

    async fn enter(&self, kind: EntityKind, operation: Operation) -> Result<(), InfraError> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry((kind, operation))
            .or_default() += 1;
        let gate = self
            .gates
            .lock()
            .expect("gates lock")
            .remove(&(kind, operation));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self
            .failing
            .lock()
            .expect("failing lock")
            .contains(&(kind, operation))
        {
            return Err(InfraError::Remote(format!(
                "{} {kind} failed: scripted failure",
                operation.as_str()
            )));
        }
        Ok(())
    }

    fn next_id(&self, kind: EntityKind) -> String {
        let mut next_ids = self.next_ids.lock().expect("ids lock");
        let counter = next_ids.entry(kind).or_default();
        *counter += 1;
        let prefix = kind.singular_key().chars().next().unwrap_or('x');
        format!("{prefix}{counter}")
    }
}

fn server_defaults(kind: EntityKind) -> Map<String, Value> {
    let defaults = match kind {
        EntityKind::Tasks => json!({ "status": "BACKLOG", "priority": "MEDIUM" }),
        EntityKind::Objectives => json!({ "status": "ACTIVE" }),
        EntityKind::Reminders => json!({ "done": false }),
        EntityKind::Notes => json!({ "content": "" }),
        EntityKind::Meetings => json!({}),
        EntityKind::Settings => json!({
            "id": "s1",
            "workDuration": 25,
            "shortBreak": 5,
            "longBreak": 15,
            "cycleMode": "4",
            "soundEnabled": true
        }),
    };
    defaults.as_object().cloned().unwrap_or_default()
}

fn merge_into(target: &mut Map<String, Value>, body: &Value) {
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, InfraError> {
        self.enter(kind, Operation::List).await?;
        Ok(self.rows(kind))
    }

    async fn create(&self, kind: EntityKind, body: &Value) -> Result<Value, InfraError> {
        self.enter(kind, Operation::Create).await?;
        let mut rows = self.rows.lock().expect("rows lock");
        let collection = rows.entry(kind).or_default();

        if kind.is_singleton() {
            let mut stored = collection
                .first()
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_else(|| {
                    let mut fresh = server_defaults(kind);
                    fresh.insert("ownerId".to_string(), json!(OWNER_ID));
                    fresh.insert("createdAt".to_string(), json!(SERVER_CREATED_AT));
                    fresh
                });
            merge_into(&mut stored, body);
            stored.insert("updatedAt".to_string(), json!(SERVER_UPDATED_AT));
            let saved = Value::Object(stored);
            *collection = vec![saved.clone()];
            return Ok(saved);
        }

        drop(rows);
        let id = self.next_id(kind);
        let mut created = server_defaults(kind);
        merge_into(&mut created, body);
        created.insert("id".to_string(), json!(id));
        created.insert("ownerId".to_string(), json!(OWNER_ID));
        created.insert("createdAt".to_string(), json!(SERVER_CREATED_AT));
        created.insert("updatedAt".to_string(), json!(SERVER_CREATED_AT));
        let created = Value::Object(created);
        self.rows
            .lock()
            .expect("rows lock")
            .entry(kind)
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, kind: EntityKind, id: &str, body: &Value) -> Result<Value, InfraError> {
        self.enter(kind, Operation::Update).await?;
        let mut rows = self.rows.lock().expect("rows lock");
        let row = rows
            .entry(kind)
            .or_default()
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| InfraError::Remote(format!("{} not found", kind.singular_key())))?;
        merge_into(row, body);
        row.insert("updatedAt".to_string(), json!(SERVER_UPDATED_AT));
        Ok(Value::Object(row.clone()))
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), InfraError> {
        self.enter(kind, Operation::Delete).await?;
        let mut rows = self.rows.lock().expect("rows lock");
        let collection = rows.entry(kind).or_default();
        let before = collection.len();
        collection.retain(|row| row.get("id").and_then(Value::as_str) != Some(id));
        if collection.len() == before {
            return Err(InfraError::Remote(format!("{} not found", kind.singular_key())));
        }
        Ok(())
    }
}

pub fn task_row(id: &str, title: &str, status: &str, priority: &str) -> Value {
    json!({
        "id": id,
        "userId": OWNER_ID,
        "title": title,
        "status": status,
        "priority": priority,
        "createdAt": SERVER_CREATED_AT,
        "updatedAt": SERVER_CREATED_AT
    })
}

pub fn settings_row(work: u32, short: u32, long: u32, mode: &str) -> Value {
    json!({
        "id": "s1",
        "userId": OWNER_ID,
        "workDuration": work,
        "shortBreak": short,
        "longBreak": long,
        "cycleMode": mode,
        "soundEnabled": true,
        "createdAt": SERVER_CREATED_AT,
        "updatedAt": SERVER_CREATED_AT
    })
}
