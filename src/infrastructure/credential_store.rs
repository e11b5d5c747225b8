use crate::domain::models::SessionToken;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::InfraError;
use std::sync::Mutex;
use tracing::info;

pub const DEFAULT_CREDENTIAL_SERVICE: &str = "mission-control.session";
pub const DEFAULT_CREDENTIAL_ACCOUNT: &str = "default";

/// Holds the bearer credential the remote store expects on every request.
pub trait CredentialStore: Send + Sync {
    fn save_token(&self, token: &SessionToken) -> Result<(), InfraError>;
    fn load_token(&self) -> Result<Option<SessionToken>, InfraError>;
    fn delete_token(&self) -> Result<(), InfraError>;

    /// The bearer string, if a usable one is stored.
    fn bearer_token(&self) -> Result<Option<String>, InfraError> {
        Ok(self
            .load_token()?
            .filter(SessionToken::is_usable)
            .map(|token| token.access_token))
    }

    /// Who the stored session belongs to, when it says so.
    fn session_username(&self) -> Result<Option<String>, InfraError> {
        Ok(self
            .load_token()?
            .filter(SessionToken::is_usable)
            .and_then(|token| token.username))
    }
}

/// Keeps the session in the OS keyring under one service/account pair.
/// The entry holds the whole [`SessionToken`] as JSON so the username
/// survives next to the bearer.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service_name: String,
    account_name: String,
}

impl KeyringCredentialStore {
    pub fn new(service_name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            account_name: account_name.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.credential_service.clone(),
            config.credential_account.clone(),
        )
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    fn entry(&self) -> Result<keyring::Entry, InfraError> {
        keyring::Entry::new(&self.service_name, &self.account_name)
            .map_err(|error| InfraError::Credential(error.to_string()))
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_SERVICE, DEFAULT_CREDENTIAL_ACCOUNT)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save_token(&self, token: &SessionToken) -> Result<(), InfraError> {
        let payload = encode_session(token)?;
        self.entry()?
            .set_password(&payload)
            .map_err(|error| InfraError::Credential(error.to_string()))?;
        info!(
            service = %self.service_name,
            account = %self.account_name,
            username = token.username.as_deref(),
            "session saved to keyring"
        );
        Ok(())
    }

    fn load_token(&self) -> Result<Option<SessionToken>, InfraError> {
        match self.entry()?.get_password() {
            Ok(payload) => decode_session(&payload).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(InfraError::Credential(error.to_string())),
        }
    }

    fn delete_token(&self) -> Result<(), InfraError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(InfraError::Credential(error.to_string())),
        }
    }
}

fn encode_session(token: &SessionToken) -> Result<String, InfraError> {
    if !token.is_usable() {
        return Err(InfraError::Credential(
            "refusing to store an empty access token".to_string(),
        ));
    }
    serde_json::to_string(token).map_err(|error| InfraError::Credential(error.to_string()))
}

fn decode_session(payload: &str) -> Result<SessionToken, InfraError> {
    serde_json::from_str::<SessionToken>(payload).map_err(|error| {
        InfraError::Credential(format!("stored session is unreadable: {error}"))
    })
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    token: Mutex<Option<SessionToken>>,
}

impl InMemoryCredentialStore {
    pub fn with_bearer(access_token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SessionToken {
                access_token: access_token.into(),
                username: None,
                issued_at: chrono::Utc::now(),
            })),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<SessionToken>>, InfraError> {
        self.token
            .lock()
            .map_err(|error| InfraError::Credential(format!("in-memory lock poisoned: {error}")))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn save_token(&self, token: &SessionToken) -> Result<(), InfraError> {
        *self.lock()? = Some(token.clone());
        Ok(())
    }

    fn load_token(&self) -> Result<Option<SessionToken>, InfraError> {
        Ok(self.lock()?.clone())
    }

    fn delete_token(&self) -> Result<(), InfraError> {
        *self.lock()? = None;
        Ok(())
    }
}
