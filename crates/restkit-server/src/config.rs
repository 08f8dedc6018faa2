//! Typed settings with layered precedence (defaults → file → environment).

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use parking_lot::RwLock;
use restkit_core::parse_rate;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const ENV_PREFIX: &str = "RESTKIT";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

impl SettingsError {
    fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub throttle: ThrottleSettings,
    pub pagination: PaginationSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SettingsError::invalid("server.host", format!("{}", e)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// TTL por defecto de las respuestas cacheadas.
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
        }
    }
}

/// Throttle classes and rates.
///
/// ```toml
/// [throttle]
/// default_classes = ["AnonRateThrottle", "UserRateThrottle"]
///
/// [throttle.rates]
/// anon = "100/day"
/// user = "1000/day"
///
/// [throttle.views]
/// todos = ["AnonRateThrottle"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
    pub default_classes: Vec<String>,
    /// Rate string per scope, e.g. `anon = "100/day"`.
    pub rates: BTreeMap<String, String>,
    /// Throttle classes per view basename, overriding the defaults.
    pub views: BTreeMap<String, Vec<String>>,
    /// Reject requests when the store cannot be read.
    pub fail_closed: bool,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            default_classes: vec!["AnonRateThrottle".to_string(), "UserRateThrottle".to_string()],
            rates: BTreeMap::from([
                ("anon".to_string(), "100/day".to_string()),
                ("user".to_string(), "1000/day".to_string()),
            ]),
            views: BTreeMap::new(),
            fail_closed: false,
        }
    }
}

/// Tokens reconocidos como clientes autenticados.
///
/// ```toml
/// [auth.tokens]
/// "s3cret" = "alice"
/// ```
///
/// Any other token leaves the client anonymous.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Token → user id.
    pub tokens: BTreeMap<String, String>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("tokens", &format!("[{} tokens]", self.tokens.len()))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub page_size: usize,
    pub max_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.server.addr()?;

        if self.cache.ttl_seconds == 0 {
            return Err(SettingsError::invalid("cache.ttl_seconds", "must be greater than zero"));
        }
        for (scope, rate) in &self.throttle.rates {
            if parse_rate(rate).is_none() {
                return Err(SettingsError::invalid(
                    format!("throttle.rates.{}", scope),
                    format!("'{}' is not of the form <count>/<second|minute|hour|day>", rate),
                ));
            }
        }
        if self.pagination.page_size == 0 {
            return Err(SettingsError::invalid("pagination.page_size", "must be greater than zero"));
        }
        if self.pagination.max_page_size < self.pagination.page_size {
            return Err(SettingsError::invalid(
                "pagination.max_page_size",
                "must not be smaller than page_size",
            ));
        }
        for (token, user) in &self.auth.tokens {
            if token.trim().is_empty() || user.trim().is_empty() {
                return Err(SettingsError::invalid("auth.tokens", "tokens and users must not be empty"));
            }
        }
        Ok(())
    }
}

/// Load settings: `config/default.toml` (optional), then `path` if given,
/// then `RESTKIT__SECTION__KEY` environment variables.
pub fn load(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut builder =
        Config::builder().add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

/// Shared, reloadable settings.
///
/// Components read [`current`](Self::current) when they are built; a reload
/// only affects components built afterwards.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    current: Arc<RwLock<Arc<Settings>>>,
    path: Option<PathBuf>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(settings))),
            path: None,
        }
    }

    /// Loads settings and remembers `path` for later reloads.
    pub fn load(path: Option<PathBuf>) -> Result<Self, SettingsError> {
        let settings = load(path.as_deref())?;
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(settings))),
            path,
        })
    }

    pub fn current(&self) -> Arc<Settings> {
        Arc::clone(&self.current.read())
    }

    /// Re-reads every source. On error the previous settings stay active.
    pub fn reload(&self) -> Result<Arc<Settings>, SettingsError> {
        let fresh = Arc::new(load(self.path.as_deref())?);
        *self.current.write() = Arc::clone(&fresh);
        tracing::info!("Settings reloaded");
        Ok(fresh)
    }

    /// Replaces the active settings (tests and embedding callers).
    pub fn replace(&self, settings: Settings) {
        *self.current.write() = Arc::new(settings);
    }
}
