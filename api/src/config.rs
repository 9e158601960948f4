/// Service configuration module
/// Reads everything the server needs from environment variables at startup

use std::env;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const DEFAULT_GOOGLE_CALLBACK_URL: &str = "http://localhost:3000/auth/google/callback";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

/// Google OAuth client credentials
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub google: Option<GoogleConfig>,
    pub port: u16,
    /// Gate POST/PUT/DELETE on /items behind a login
    pub items_require_auth: bool,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
        };

        let database = DatabaseConfig {
            uri: required("MONGODB_URI")?,
            name: required("DB_NAME")?,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid PORT: {} ({})", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let items_require_auth = match lookup("ITEMS_REQUIRE_AUTH") {
            Some(raw) => parse_flag("ITEMS_REQUIRE_AUTH", &raw)?,
            None => true,
        };

        let ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                ConfigError::InvalidConfig(format!(
                    "Invalid SESSION_TTL_HOURS: {} ({})",
                    raw, e
                ))
            })?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::InvalidConfig(format!(
                "SESSION_TTL_HOURS must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )));
        }

        let secure_cookies = lookup("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let session = SessionConfig {
            secret: required("SESSION_SECRET")?,
            ttl_hours,
            secure_cookies,
        };

        let google = match (lookup("GOOGLE_CLIENT_ID"), lookup("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                callback_url: lookup("GOOGLE_CALLBACK_URL")
                    .unwrap_or_else(|| DEFAULT_GOOGLE_CALLBACK_URL.to_string()),
            }),
            _ => {
                debug!("Google OAuth credentials not set; login routes disabled");
                None
            }
        };

        info!(
            "Configuration loaded: database={}, port={}, items_require_auth={}",
            database.name, port, items_require_auth
        );

        Ok(AppConfig {
            database,
            session,
            google,
            port,
            items_require_auth,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("MONGODB_URI", "mongodb://localhost:27017"),
        ("DB_NAME", "shopping"),
        ("SESSION_SECRET", "s3cret"),
    ];

    #[test]
    fn loads_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&BASE)).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.items_require_auth);
        assert!(config.google.is_none());
        assert!(!config.session.secure_cookies);
        assert_eq!(config.session.ttl_hours, 24);
    }

    #[test]
    fn missing_required_values_are_fatal() {
        let err = AppConfig::from_lookup(lookup_from(&BASE[1..])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv("MONGODB_URI".to_string()));

        let err = AppConfig::from_lookup(lookup_from(&BASE[..2])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv("SESSION_SECRET".to_string()));
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let mut pairs = BASE.to_vec();
        pairs[1] = ("DB_NAME", "  ");
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv("DB_NAME".to_string()));
    }

    #[test]
    fn parses_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("ITEMS_REQUIRE_AUTH", "false"),
            ("APP_ENV", "production"),
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "secret"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.items_require_auth);
        assert!(config.session.secure_cookies);

        let google = config.google.unwrap();
        assert_eq!(google.callback_url, DEFAULT_GOOGLE_CALLBACK_URL);
    }

    #[test]
    fn rejects_bad_values() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::InvalidConfig(_))
        ));

        let mut pairs = BASE.to_vec();
        pairs.push(("ITEMS_REQUIRE_AUTH", "maybe"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn session_ttl_is_bounded() {
        for raw in ["0", "-5", "8761", "9223372036854775807"] {
            let mut pairs = BASE.to_vec();
            pairs.push(("SESSION_TTL_HOURS", raw));
            assert!(
                matches!(
                    AppConfig::from_lookup(lookup_from(&pairs)),
                    Err(ConfigError::InvalidConfig(_))
                ),
                "{}",
                raw
            );
        }

        let mut pairs = BASE.to_vec();
        pairs.push(("SESSION_TTL_HOURS", "8760"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.session.ttl_hours, 8760);
    }
}
