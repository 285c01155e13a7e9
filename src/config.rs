use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which credential check the login endpoint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Any non-empty username/password pair is accepted.
    Presence,
    /// First login registers the username; later logins must match its password.
    Registered,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub database_url: Option<String>,
    pub auth_policy: AuthPolicy,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(ttl) if ttl > 0 && ttl <= MAX_TOKEN_TTL_SECS => ttl,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TOKEN_TTL_SECS",
                        value: raw,
                    })
                }
            },
            None => 3600,
        };

        let auth_policy = match get("AUTH_POLICY").as_deref() {
            None | Some("presence") => AuthPolicy::Presence,
            Some("registered") => AuthPolicy::Registered,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "AUTH_POLICY",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl_secs,
            database_url: get("DATABASE_URL"),
            auth_policy,
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:3000");
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.auth_policy, AuthPolicy::Presence);
        assert!(config.database_url.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_missing_secret() {
        let err = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "99999")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_SECS", .. }));

        for ttl in ["31536001", "1000000000000000", "99999999999999999999"] {
            let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", ttl)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_SECS", .. }));
        }

        let config =
            Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "31536000")]))
                .unwrap();
        assert_eq!(config.token_ttl_secs, MAX_TOKEN_TTL_SECS);

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("AUTH_POLICY", "ldap")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AUTH_POLICY", .. }));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("TOKEN_TTL_SECS", "60"),
            ("AUTH_POLICY", "registered"),
            ("DATABASE_URL", "postgres://localhost/todo"),
            ("STATIC_DIR", "client"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(config.auth_policy, AuthPolicy::Registered);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/todo"));
        assert_eq!(config.static_dir, Some(PathBuf::from("client")));
    }
}
