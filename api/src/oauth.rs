/// Google OAuth 2.0 client
/// Builds the consent redirect, exchanges authorization codes and reads the user profile

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::auth::SessionUser;
use crate::config::GoogleConfig;

const SCOPES: &str = "profile email";

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Provider returned error: {0}")]
    Provider(String),
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Provider endpoints; overridable so a local stand-in can be used
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub authorize: String,
    pub token: String,
    pub userinfo: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            userinfo: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub struct GoogleOAuth {
    config: GoogleConfig,
    endpoints: GoogleEndpoints,
    client: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig) -> Self {
        Self::with_endpoints(config, GoogleEndpoints::default())
    }

    pub fn with_endpoints(config: GoogleConfig, endpoints: GoogleEndpoints) -> Self {
        let client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            endpoints,
            client,
        }
    }

    /// Consent page URL carrying `state`
    pub fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        Url::parse_with_params(
            &self.endpoints.authorize,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::InvalidResponse(format!("bad authorize endpoint: {}", e)))
    }

    /// Complete a login: trade the code for a token, then fetch the profile
    pub async fn login(&self, code: &str) -> Result<SessionUser, OAuthError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_profile(&access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        debug!("Exchanging authorization code at {}", self.endpoints.token);

        let response = self
            .client
            .post(&self.endpoints.token)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Provider(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            OAuthError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<SessionUser, OAuthError> {
        let response = self
            .client
            .get(&self.endpoints.userinfo)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Provider(format!("HTTP {}", response.status())));
        }

        let profile: GoogleProfile = response.json().await.map_err(|e| {
            OAuthError::InvalidResponse(format!("Failed to parse profile: {}", e))
        })?;

        let display_name = profile
            .name
            .clone()
            .or_else(|| profile.email.clone())
            .unwrap_or_else(|| profile.sub.clone());

        Ok(SessionUser {
            google_id: profile.sub,
            display_name,
            email: profile.email,
        })
    }
}
