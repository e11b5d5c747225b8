use crate::application::optimistic::{LocalWrite, apply_optimistic};
use crate::domain::entity::{Entity, EntityKind};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::remote_store::RemoteStore;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Local mirror of one remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCollection<K> {
    pub items: Vec<K>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_initialized: bool,
}

impl<K> Default for EntityCollection<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
            is_initialized: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatus {
    pub kind: EntityKind,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_initialized: bool,
    pub item_count: usize,
}

/// Single writer of one kind's local collection.
///
/// Remote failures land in the collection's `error`. `create`, `update` and
/// `delete` then return `None` or `false`; the `try_*` variants hand the
/// caller its own failure as well.
pub struct EntityManager<K: Entity> {
    remote: Arc<dyn RemoteStore>,
    request_timeout: Duration,
    state: Mutex<EntityCollection<K>>,
}

impl<K: Entity> EntityManager<K> {
    pub fn new(remote: Arc<dyn RemoteStore>, request_timeout: Duration) -> Self {
        Self {
            remote,
            request_timeout,
            state: Mutex::new(EntityCollection::default()),
        }
    }

    pub fn get(&self) -> Vec<K> {
        self.collection().items.clone()
    }

    pub fn find(&self, id: &str) -> Option<K> {
        self.collection()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub fn status(&self) -> CollectionStatus {
        let collection = self.collection();
        CollectionStatus {
            kind: K::KIND,
            is_loading: collection.is_loading,
            error: collection.error.clone(),
            is_initialized: collection.is_initialized,
            item_count: collection.items.len(),
        }
    }

    pub async fn refresh(&self) {
        self.collection().is_loading = true;
        debug!(kind = %K::KIND, operation = "refresh", "loading collection");

        let result = self
            .bounded(self.remote.list(K::KIND))
            .await
            .and_then(decode_all::<K>);

        let mut collection = self.collection();
        collection.is_loading = false;
        match result {
            Ok(items) => {
                info!(
                    kind = %K::KIND,
                    operation = "refresh",
                    count = items.len(),
                    "collection loaded"
                );
                collection.items = items;
                collection.is_initialized = true;
                collection.error = None;
            }
            Err(error) => {
                warn!(kind = %K::KIND, operation = "refresh", error = %error, "refresh failed");
                collection.error = Some(error.to_string());
            }
        }
    }

    pub async fn create(&self, patch: &K::Patch) -> Option<K> {
        self.try_create(patch).await.ok()
    }

    pub async fn try_create(&self, patch: &K::Patch) -> Result<K, InfraError> {
        let result = match encode(patch) {
            Ok(body) => self
                .bounded(self.remote.create(K::KIND, &body))
                .await
                .and_then(decode_one::<K>),
            Err(error) => Err(error),
        };

        match result {
            Ok(entity) => {
                let mut collection = self.collection();
                if K::KIND.is_singleton() {
                    collection.items = vec![entity.clone()];
                } else {
                    collection.items.retain(|item| item.id() != entity.id());
                    collection.items.insert(0, entity.clone());
                }
                info!(kind = %K::KIND, operation = "create", id = entity.id(), "entity created");
                Ok(entity)
            }
            Err(error) => Err(self.record_failure("create", None, error)),
        }
    }

    pub async fn update(&self, id: &str, patch: &K::Patch) -> Option<K> {
        self.try_update(id, patch).await.ok()
    }

    /// Optimistic: the merged value is visible through [`Self::get`] while the
    /// request is in flight. An unknown id is `NotFound` and sends nothing.
    pub async fn try_update(&self, id: &str, patch: &K::Patch) -> Result<K, InfraError> {
        let original = if K::KIND.is_singleton() {
            self.collection().items.first().cloned()
        } else {
            self.find(id)
        };
        let Some(original) = original else {
            if K::KIND.is_singleton() {
                return self.try_create(patch).await;
            }
            warn!(kind = %K::KIND, operation = "update", id, "unknown id; nothing sent");
            return Err(InfraError::NotFound(format!(
                "{} {id}",
                K::KIND.singular_key()
            )));
        };

        let body = match encode(patch) {
            Ok(body) => body,
            Err(error) => return Err(self.record_failure("update", Some(id), error)),
        };

        let optimistic = original.merged(patch);
        let target_id = original.id().to_string();
        let remote = async {
            let response = if K::KIND.is_singleton() {
                self.bounded(self.remote.create(K::KIND, &body)).await
            } else {
                self.bounded(self.remote.update(K::KIND, id, &body)).await
            };
            response.and_then(decode_one::<K>)
        };

        let result = apply_optimistic(
            original,
            optimistic,
            |write| self.write_local(&target_id, write),
            remote,
        )
        .await;

        match result {
            Ok(entity) => {
                info!(kind = %K::KIND, operation = "update", id, "entity updated");
                Ok(entity)
            }
            Err(error) => Err(self.record_failure("update", Some(id), error)),
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        if K::KIND.is_singleton() {
            warn!(kind = %K::KIND, operation = "delete", id, "deleting settings is not supported");
            return false;
        }

        match self.bounded(self.remote.delete(K::KIND, id)).await {
            Ok(()) => {
                self.collection().items.retain(|item| item.id() != id);
                info!(kind = %K::KIND, operation = "delete", id, "entity deleted");
                true
            }
            Err(error) => {
                self.record_failure("delete", Some(id), error);
                false
            }
        }
    }

    fn collection(&self) -> MutexGuard<'_, EntityCollection<K>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, InfraError>
    where
        F: Future<Output = Result<T, InfraError>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(InfraError::Timeout(self.request_timeout.as_secs())),
        }
    }

    /// A commit or revert only lands while the slot still holds this call's
    /// optimistic value; a newer local write owns it otherwise.
    fn write_local(&self, id: &str, write: LocalWrite<'_, K>) {
        let mut collection = self.collection();
        let Some(slot) = collection.items.iter_mut().find(|item| item.id() == id) else {
            return;
        };
        match write {
            LocalWrite::Apply { value } => *slot = value.clone(),
            LocalWrite::Commit { optimistic, server } => {
                if slot == optimistic {
                    *slot = server.clone();
                }
            }
            LocalWrite::Revert {
                optimistic,
                original,
            } => {
                if slot == optimistic {
                    *slot = original.clone();
                } else {
                    debug!(kind = %K::KIND, id, "newer local write kept over revert");
                }
            }
        }
    }

    fn record_failure(
        &self,
        operation: &'static str,
        id: Option<&str>,
        error: InfraError,
    ) -> InfraError {
        warn!(
            kind = %K::KIND,
            operation,
            id = id.unwrap_or(""),
            error = %error,
            "remote operation failed"
        );
        self.collection().error = Some(error.to_string());
        error
    }
}

fn encode<P: Serialize>(patch: &P) -> Result<Value, InfraError> {
    Ok(serde_json::to_value(patch)?)
}

fn decode_one<K: Entity>(value: Value) -> Result<K, InfraError> {
    serde_json::from_value(value).map_err(|error| {
        InfraError::Remote(format!(
            "invalid {} payload: {error}",
            K::KIND.singular_key()
        ))
    })
}

fn decode_all<K: Entity>(values: Vec<Value>) -> Result<Vec<K>, InfraError> {
    values.into_iter().map(decode_one::<K>).collect()
}
