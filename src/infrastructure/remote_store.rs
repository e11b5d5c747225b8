use crate::domain::entity::EntityKind;
use crate::infrastructure::credential_store::CredentialStore;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// REST persistence service the dashboard mirrors.
///
/// Every response is an envelope `{ success, <key>, error }`. Implementations
/// turn a non-2xx status and `success: false` into the same `Err`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, InfraError>;

    async fn create(&self, kind: EntityKind, body: &Value) -> Result<Value, InfraError>;

    async fn update(&self, kind: EntityKind, id: &str, body: &Value) -> Result<Value, InfraError>;

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), InfraError>;
}

pub struct ReqwestRemoteStore {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl ReqwestRemoteStore {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, InfraError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|error| InfraError::InvalidConfig(format!("invalid api base url: {error}")))?;
        if base_url.cannot_be_a_base() {
            return Err(InfraError::InvalidConfig(
                "api base url cannot be a base".to_string(),
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| InfraError::Http(format!("failed to build http client: {error}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), InfraError> {
        if value.trim().is_empty() {
            return Err(InfraError::InvalidConfig(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn bearer(&self) -> Result<String, InfraError> {
        self.credentials
            .bearer_token()?
            .ok_or(InfraError::MissingCredential)
    }

    fn collection_endpoint(&self, kind: EntityKind) -> Result<Url, InfraError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| InfraError::InvalidConfig("api base url cannot be a base".to_string()))?;
            segments.pop_if_empty();
            segments.push(kind.path());
        }
        Ok(url)
    }

    fn item_endpoint(&self, kind: EntityKind, id: &str) -> Result<Url, InfraError> {
        let mut url = self.collection_endpoint(kind)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| InfraError::InvalidConfig("api base url cannot be a base".to_string()))?;
            segments.push(id);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, action: &str) -> Result<Value, InfraError> {
        let response = request
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(|error| InfraError::Http(format!("network error while {action}: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Http(format!("failed reading response while {action}: {error}")))?;

        parse_envelope(status, &body, action)
    }
}

/// Validates the `{ success, ..., error }` envelope and returns it whole.
pub fn parse_envelope(status: StatusCode, body: &str, action: &str) -> Result<Value, InfraError> {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let remote_error = parsed
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(ToOwned::to_owned);

    if !status.is_success() {
        let message = remote_error.unwrap_or_else(|| format!("http {}", status.as_u16()));
        return Err(InfraError::Remote(format!("{action} failed: {message}")));
    }

    let Some(envelope) = parsed else {
        return Err(InfraError::Remote(format!(
            "{action} failed: invalid response payload; body={body}"
        )));
    };
    let success = envelope
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !success {
        let message = remote_error.unwrap_or_else(|| "success=false".to_string());
        return Err(InfraError::Remote(format!("{action} failed: {message}")));
    }
    Ok(envelope)
}

fn take_key(mut envelope: Value, key: &str, action: &str) -> Result<Value, InfraError> {
    envelope
        .get_mut(key)
        .map(Value::take)
        .filter(|value| !value.is_null())
        .ok_or_else(|| InfraError::Remote(format!("{action} response did not include `{key}`")))
}

#[async_trait]
impl RemoteStore for ReqwestRemoteStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, InfraError> {
        let action = format!("listing {kind}");
        let endpoint = self.collection_endpoint(kind)?;
        let mut envelope = self.send(self.client.get(endpoint), &action).await?;
        let payload = envelope
            .get_mut(kind.collection_key())
            .map(Value::take)
            .unwrap_or(Value::Null);

        match payload {
            Value::Array(items) => Ok(items),
            // The settings endpoint answers with its single object, or null before first save.
            Value::Object(object) if kind.is_singleton() => Ok(vec![Value::Object(object)]),
            Value::Null if kind.is_singleton() => Ok(Vec::new()),
            other => Err(InfraError::Remote(format!(
                "{action} returned a non-list `{}`: {other}",
                kind.collection_key()
            ))),
        }
    }

    async fn create(&self, kind: EntityKind, body: &Value) -> Result<Value, InfraError> {
        let action = format!("creating {}", kind.singular_key());
        let endpoint = self.collection_endpoint(kind)?;
        let envelope = self
            .send(self.client.post(endpoint).json(body), &action)
            .await?;
        take_key(envelope, kind.singular_key(), &action)
    }

    async fn update(&self, kind: EntityKind, id: &str, body: &Value) -> Result<Value, InfraError> {
        Self::ensure_non_empty(id, "id")?;
        let action = format!("updating {} {id}", kind.singular_key());
        let endpoint = self.item_endpoint(kind, id)?;
        let envelope = self
            .send(self.client.put(endpoint).json(body), &action)
            .await?;
        take_key(envelope, kind.singular_key(), &action)
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), InfraError> {
        Self::ensure_non_empty(id, "id")?;
        let action = format!("deleting {} {id}", kind.singular_key());
        let endpoint = self.item_endpoint(kind, id)?;
        self.send(self.client.delete(endpoint), &action).await?;
        Ok(())
    }
}
