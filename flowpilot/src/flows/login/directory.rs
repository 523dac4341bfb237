use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A user as seen by the login flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub has_password: bool,
    pub has_passkey: bool,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("User directory unavailable: {0}")]
    Unavailable(String),

    #[error("User directory error: {0}")]
    Other(String),
}

/// Account lookups and credential checks used by the login flow
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError>;

    async fn verify_password(&self, user_id: &str, password: &str)
    -> Result<bool, DirectoryError>;

    /// Redeems a one-time token from a third-party sign-in; returns the user id
    async fn exchange_token(&self, token: &str) -> Result<Option<String>, DirectoryError>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    record: UserRecord,
    password: Option<String>,
}

/// User directory kept in process memory, for demos and tests
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, StoredUser>>,
    tokens: RwLock<HashMap<String, String>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user; emails are matched case-insensitively
    pub async fn add_user(&self, email: &str, password: Option<&str>) -> UserRecord {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            has_password: password.is_some(),
            has_passkey: false,
        };
        self.users.write().await.insert(
            record.email.clone(),
            StoredUser {
                record: record.clone(),
                password: password.map(str::to_string),
            },
        );
        tracing::debug!(user_id = %record.id, "Added user to in-memory directory");
        record
    }

    /// Issues a single-use token redeemable through `exchange_token`
    pub async fn issue_token(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens
            .write()
            .await
            .insert(token.clone(), user_id.to_string());
        token
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users
            .get(&email.to_lowercase())
            .map(|stored| stored.record.clone()))
    }

    async fn verify_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<bool, DirectoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|stored| stored.record.id == user_id)
            .and_then(|stored| stored.password.as_deref())
            .is_some_and(|stored| stored == password))
    }

    async fn exchange_token(&self, token: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self.tokens.write().await.remove(token))
    }
}
