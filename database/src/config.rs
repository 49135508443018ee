use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{DatabaseError, DbResult};

pub const DEFAULT_POOL_SIZE: u32 = 5;
pub const DEFAULT_PORT: u16 = 3307;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when set it wins over the individual settings below
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: u16,
    pub pool_size: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: None,
            name: None,
            user: None,
            password: None,
            port: DEFAULT_PORT,
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout_seconds: DEFAULT_ACQUIRE_TIMEOUT_SECONDS,
        }
    }
}

impl DatabaseConfig {
    /// Reads settings from the process environment.
    ///
    /// Nothing is validated here; missing host, database name or user are
    /// reported by [`DatabaseConfig::connection_url`] when the pool is built.
    pub fn from_env() -> Self {
        Self {
            database_url: non_empty_var("DATABASE_URL"),
            host: non_empty_var("DB_HOST"),
            name: non_empty_var("DB_NAME"),
            user: non_empty_var("DB_USER"),
            password: env::var("DB_PASSWORD").ok(),
            port: env::var("DB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            pool_size: env::var("DB_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POOL_SIZE),
            acquire_timeout_seconds: env::var("DB_ACQUIRE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECONDS),
        }
    }

    /// Config pointing straight at a connection URL, with default pool settings.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            ..Default::default()
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_acquire_timeout(mut self, seconds: u64) -> Self {
        self.acquire_timeout_seconds = seconds;
        self
    }

    pub fn connection_url(&self) -> DbResult<String> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let host = require(&self.host, "DB_HOST")?;
        let name = require(&self.name, "DB_NAME")?;
        let user = require(&self.user, "DB_USER")?;

        let credentials = match &self.password {
            Some(password) => format!(
                "{}:{}",
                urlencoding::encode(user),
                urlencoding::encode(password)
            ),
            None => urlencoding::encode(user).into_owned(),
        };

        Ok(format!(
            "mysql://{}@{}:{}/{}",
            credentials,
            host,
            self.port,
            urlencoding::encode(name)
        ))
    }

    /// Connection URL with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        match self.connection_url() {
            Ok(url) => match (&self.database_url, &self.password) {
                (None, Some(password)) if !password.is_empty() => url.replacen(
                    &format!(":{}@", urlencoding::encode(password)),
                    ":***@",
                    1,
                ),
                _ => url,
            },
            Err(_) => "<incomplete configuration>".to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require<'a>(value: &'a Option<String>, key: &str) -> DbResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| DatabaseError::configuration(format!("{} must be set", key)))
}
