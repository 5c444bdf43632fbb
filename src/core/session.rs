use crate::domain::model::{AuthResponse, User};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StorefrontError};

pub const TOKEN_KEY: &str = "auth_token";
pub const PROFILE_KEY: &str = "user_profile";

/// Bearer token and cached profile, persisted under fixed keys.
pub struct Session<S: Storage> {
    storage: S,
    token: Option<String>,
    user: Option<User>,
}

impl<S: Storage> Session<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            token: None,
            user: None,
        }
    }

    async fn read_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.storage.read_file(key).await {
            Ok(data) => Ok(Some(data)),
            Err(StorefrontError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Loads a previously stored session. A token without a readable profile
    /// is kept; a corrupt profile is dropped.
    pub async fn restore(&mut self) -> Result<bool> {
        let token = self
            .read_optional(TOKEN_KEY)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .filter(|t| !t.is_empty());

        let user = match self.read_optional(PROFILE_KEY).await? {
            Some(bytes) => match serde_json::from_slice::<User>(&bytes) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Discarding unreadable cached profile: {}", e);
                    self.storage.remove_file(PROFILE_KEY).await?;
                    None
                }
            },
            None => None,
        };

        self.token = token;
        self.user = user;
        tracing::debug!("Session restored: authenticated={}", self.is_authenticated());
        Ok(self.is_authenticated())
    }

    pub async fn establish(&mut self, auth: AuthResponse) -> Result<()> {
        self.storage
            .write_file(TOKEN_KEY, auth.token.as_bytes())
            .await?;
        let profile = serde_json::to_vec(&auth.user)?;
        self.storage.write_file(PROFILE_KEY, &profile).await?;

        tracing::info!("Signed in as {}", auth.user.email);
        self.token = Some(auth.token);
        self.user = Some(auth.user);
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.token = None;
        self.user = None;
        self.storage.remove_file(TOKEN_KEY).await?;
        self.storage.remove_file(PROFILE_KEY).await?;
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
