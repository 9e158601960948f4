//! Signed session cookies
//!
//! A logged-in user carries an HS256 JWT in the `sid` cookie. The token holds
//! the user profile and a session id (`jti`). Logging out clears the cookie
//! and records the session id as revoked until the token would have expired,
//! so a copy of the token kept by the client stops working too.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use moka::sync::Cache;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::SessionConfig;

pub const SESSION_COOKIE: &str = "sid";
pub const STATE_COOKIE: &str = "oauth_state";

const STATE_TTL_MINUTES: i64 = 10;
const MAX_REVOKED_SESSIONS: u64 = 100_000;

/// Profile of the logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub google_id: String,
    pub display_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub jti: String,
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to sign session token: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("invalid session token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("session has been logged out")]
    Revoked,
}

pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    secure: bool,
    /// Session ids logged out before their token expired
    revoked: Cache<String, ()>,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        let ttl = Duration::hours(config.ttl_hours);
        let revoked = Cache::builder()
            .max_capacity(MAX_REVOKED_SESSIONS)
            .time_to_live(ttl.to_std().unwrap_or_default())
            .build();
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl,
            secure: config.secure_cookies,
            revoked,
        }
    }

    pub fn issue(&self, user: &SessionUser) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: user.google_id.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SessionError::Encode)
    }

    fn claims(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(SessionError::Invalid)?
            .claims;
        if self.revoked.contains_key(&claims.jti) {
            return Err(SessionError::Revoked);
        }
        Ok(claims)
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser, SessionError> {
        self.claims(token).map(|claims| SessionUser {
            google_id: claims.sub,
            display_name: claims.name,
            email: claims.email,
        })
    }

    /// End the session behind the request's cookie, if there is one
    pub fn revoke_from_headers(&self, headers: &HeaderMap) {
        let Some(token) = read_cookie(headers, SESSION_COOKIE) else {
            return;
        };
        if let Ok(claims) = self.claims(&token) {
            tracing::debug!(session = %claims.jti, "session revoked");
            self.revoked.insert(claims.jti, ());
        }
    }

    /// The user behind the request's session cookie, if it verifies
    pub fn user_from_headers(&self, headers: &HeaderMap) -> Option<SessionUser> {
        let token = read_cookie(headers, SESSION_COOKIE)?;
        match self.verify(&token) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring session cookie");
                None
            }
        }
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }

    pub fn clear_session_cookie(&self) -> Cookie<'static> {
        self.removal(SESSION_COOKIE)
    }

    /// Short-lived cookie remembering the OAuth `state` between redirect and callback
    pub fn state_cookie(&self, state: String) -> Cookie<'static> {
        Cookie::build((STATE_COOKIE, state))
            .path("/auth")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(cookie::time::Duration::minutes(STATE_TTL_MINUTES))
            .build()
    }

    pub fn clear_state_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.removal(STATE_COOKIE);
        cookie.set_path("/auth");
        cookie
    }

    fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        cookie.make_removal();
        cookie
    }
}

/// Value of the named cookie from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Random value for the OAuth `state` parameter
pub fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
