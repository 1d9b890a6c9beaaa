use crate::domain::ports::CredentialProvider;
use crate::utils::error::{Result, TrendError};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const USER_AGENT: &str = concat!("trend-herald/", env!("CARGO_PKG_VERSION"));

/// Personal access token, used as-is.
pub struct TokenCredential {
    token: String,
}

impl TokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for TokenCredential {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// GitHub App credentials: a short-lived RS256 JWT signed with the app's
/// private key, exchanged for an installation token. The installation token
/// is fetched once per run and reused.
pub struct AppCredential {
    client: Client,
    api_base: String,
    app_id: String,
    installation_id: String,
    private_key_pem: String,
    cached: Mutex<Option<String>>,
}

impl AppCredential {
    pub fn new(
        api_base: impl Into<String>,
        app_id: impl Into<String>,
        installation_id: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            app_id: app_id.into(),
            installation_id: installation_id.into(),
            private_key_pem: private_key_pem.into(),
            cached: Mutex::new(None),
        }
    }

    fn app_jwt(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AppClaims {
            // backdated to absorb clock drift between us and the platform
            iat: now - 60,
            exp: now + 9 * 60,
            iss: self.app_id.clone(),
        };

        let key = EncodingKey::from_rsa_pem(self.private_key_pem.as_bytes())
            .map_err(|e| TrendError::auth(format!("invalid app private key: {}", e)))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| TrendError::auth(format!("failed to sign app JWT: {}", e)))
    }

    async fn fetch_installation_token(&self) -> Result<String> {
        let jwt = self.app_jwt()?;
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base, self.installation_id
        );

        tracing::debug!(installation_id = %self.installation_id, "exchanging app JWT for installation token");
        let response = self
            .client
            .post(&url)
            .bearer_auth(jwt)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendError::auth(format!(
                "installation token request returned {}: {}",
                status, body
            )));
        }

        let token: InstallationToken = response.json().await?;
        Ok(token.token)
    }
}

#[async_trait]
impl CredentialProvider for AppCredential {
    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.fetch_installation_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Deserialize)]
struct InstallationToken {
    token: String,
}
