/// Cached bearer-token handling for the Drive API.
///
/// The interactive OAuth consent flow is out of scope; this only loads an
/// authorized-user token file and refreshes the access token against the
/// token endpoint when it has expired.
use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Refresh slightly before the recorded expiry to absorb clock skew.
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(default)]
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

pub struct TokenStore {
    path: PathBuf,
    token: StoredToken,
    default_endpoint: String,
}

impl TokenStore {
    pub fn load(path: &Path, default_endpoint: &str) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::Auth {
                message: format!(
                    "token file '{}' not found; run the OAuth consent flow to create it",
                    path.display()
                ),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let token: StoredToken = serde_json::from_str(&content)?;
        debug!("loaded token file '{}'", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            token,
            default_endpoint: default_endpoint.to_string(),
        })
    }

    /// Returns a valid access token, refreshing and persisting it first if
    /// the cached one has expired.
    pub async fn access_token(&mut self, http: &reqwest::Client) -> Result<String> {
        if !self.token.token.is_empty() && !self.token.is_expired() {
            return Ok(self.token.token.clone());
        }
        self.refresh(http).await
    }

    async fn refresh(&mut self, http: &reqwest::Client) -> Result<String> {
        let refresh_token = self.token.refresh_token.clone().ok_or(AppError::Auth {
            message: "access token expired and no refresh token is cached".to_string(),
        })?;
        let client_id = self.token.client_id.clone().ok_or(AppError::Auth {
            message: "token file has no client_id".to_string(),
        })?;
        let client_secret = self.token.client_secret.clone().ok_or(AppError::Auth {
            message: "token file has no client_secret".to_string(),
        })?;
        let endpoint = self
            .token
            .token_uri
            .clone()
            .unwrap_or_else(|| self.default_endpoint.clone());

        let response = http
            .post(&endpoint)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth {
                message: format!("token refresh failed ({}): {}", status, body),
            });
        }

        let refreshed: RefreshResponse = response.json().await?;
        self.token.token = refreshed.access_token.clone();
        self.token.expiry = Some(Utc::now() + Duration::seconds(refreshed.expires_in));
        self.persist()?;
        info!("access token refreshed");

        Ok(refreshed.access_token)
    }

    fn persist(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.token)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expiry: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            token: "abc".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_uri: None,
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            scopes: vec![],
            expiry,
        }
    }

    #[test]
    fn token_with_past_expiry_is_expired() {
        assert!(token(Some(Utc::now() - Duration::hours(1))).is_expired());
    }

    #[test]
    fn token_near_expiry_is_treated_as_expired() {
        assert!(token(Some(Utc::now() + Duration::seconds(5))).is_expired());
    }

    #[test]
    fn token_with_future_expiry_is_valid() {
        assert!(!token(Some(Utc::now() + Duration::hours(1))).is_expired());
    }

    #[test]
    fn token_without_expiry_is_valid() {
        assert!(!token(None).is_expired());
    }

    #[test]
    fn load_fails_for_missing_file() {
        let result = TokenStore::load(Path::new("/nonexistent/token.json"), "https://x");
        assert!(matches!(result, Err(AppError::Auth { .. })));
    }

    #[test]
    fn load_parses_authorized_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            serde_json::to_string(&token(Some(Utc::now() + Duration::hours(1)))).unwrap(),
        )
        .unwrap();

        let store = TokenStore::load(&path, "https://oauth2.googleapis.com/token").unwrap();
        assert_eq!(store.token.token, "abc");
        assert!(!store.token.is_expired());
    }
}
