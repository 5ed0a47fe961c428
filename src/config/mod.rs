use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Only required when the PostgreSQL store is selected
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

impl DatabaseConfig {
    /// Database settings alone, for commands that never verify tokens
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::preset(environment(&lookup));
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            Environment::Production => Self {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
        }
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `my-tenant.us.auth0.com`
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub jwks_cache_ttl_secs: u64,
    pub client_id: Option<String>,
    pub callback_url: Option<String>,
}

impl AuthConfig {
    /// Issuer as the provider writes it into `iss`, always with a trailing slash
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("https://{}/.well-known/jwks.json", self.domain);
        Url::parse(&raw).map_err(|_| ConfigError::Invalid {
            name: "AUTH0_DOMAIN",
            value: self.domain.clone(),
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a fixed set of variables instead of the process environment
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = environment(&lookup);

        let domain = lookup("AUTH0_DOMAIN")
            .map(|d| normalize_domain(&d))
            .filter(|d| !d.is_empty())
            .ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?;
        let audience = lookup("API_AUDIENCE")
            .filter(|a| !a.is_empty())
            .ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        let mut config = match environment {
            Environment::Production => Self::production(domain, audience),
            Environment::Development => Self::development(domain, audience),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        // Server overrides
        if let Some(v) = lookup("COFFEE_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_var("PORT", &v)?;
        }

        self.database.apply_overrides(lookup)?;

        // Auth overrides
        if let Some(v) = lookup("AUTH_ALGORITHMS") {
            self.auth.algorithms = parse_algorithms(&v)?;
        }
        if let Some(v) = lookup("JWKS_CACHE_TTL_SECS") {
            self.auth.jwks_cache_ttl_secs = parse_var("JWKS_CACHE_TTL_SECS", &v)?;
        }
        self.auth.client_id = lookup("AUTH0_CLIENT_ID").filter(|v| !v.is_empty());
        self.auth.callback_url = lookup("AUTH0_CALLBACK_URL").filter(|v| !v.is_empty());

        Ok(())
    }

    fn development(domain: String, audience: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
            },
            database: DatabaseConfig::preset(Environment::Development),
            auth: AuthConfig {
                domain,
                audience,
                algorithms: vec![Algorithm::RS256],
                jwks_cache_ttl_secs: 600,
                client_id: None,
                callback_url: None,
            },
        }
    }

    fn production(domain: String, audience: String) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
            },
            database: DatabaseConfig::preset(Environment::Production),
            auth: AuthConfig {
                domain,
                audience,
                algorithms: vec![Algorithm::RS256],
                jwks_cache_ttl_secs: 3600,
                client_id: None,
                callback_url: None,
            },
        }
    }
}

fn environment(lookup: &impl Fn(&str) -> Option<String>) -> Environment {
    match lookup("APP_ENV").as_deref() {
        Some("production") | Some("prod") => Environment::Production,
        _ => Environment::Development,
    }
}

/// Accepts `tenant.auth0.com`, `https://tenant.auth0.com/` and similar spellings
fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

fn parse_var<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Algorithm::from_str(s).map_err(|_| ConfigError::Invalid {
                name: "AUTH_ALGORITHMS",
                value: s.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid {
            name: "AUTH_ALGORITHMS",
            value: value.to_string(),
        });
    }
    Ok(algorithms)
}
