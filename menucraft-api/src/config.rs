/// Configuration management for the API server
///
/// Configuration comes from environment variables (a `.env` file is loaded
/// first when present) and is validated once at startup.
///
/// # Environment Variables
///
/// API:
/// - `API_HOST` (default `0.0.0.0`), `API_PORT` (default `8080`)
/// - `API_BASE_PATH`: prefix for every route (default `/make-server`)
/// - `API_CORS_ORIGINS`: comma separated, `*` for any (default `*`)
/// - `API_PRODUCTION`: enables HSTS (default `false`)
///
/// Store:
/// - `STORE_BACKEND`: `memory`, `redis` or `postgres` (default `memory`)
/// - `REDIS_URL`, `REDIS_CONNECTION_TIMEOUT_SECS`, `REDIS_COMMAND_TIMEOUT_SECS`,
///   `REDIS_KEY_PREFIX` for `redis`
/// - `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` for `postgres`
///
/// Auth:
/// - `AUTH_PROVIDER`: `local` or `supabase` (default `local`)
/// - `JWT_SECRET`: at least 32 characters, for `local`
/// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_SERVICE_ROLE_KEY` for `supabase`
/// - `AUTH_HTTP_TIMEOUT_SECS`: identity provider timeout (default `10`)
/// - `AUTH_ALLOW_UNVERIFIED_FALLBACK`: accept tokens by their decoded payload
///   when introspection fails (default `false`, `supabase` only)
///
/// # Example
///
/// ```no_run
/// use menucraft_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::{anyhow, bail, Context};
use menucraft_shared::{
    auth::supabase::SupabaseConfig, db::DatabaseConfig, redis::RedisConfig,
};
use std::env;

/// Minimum length of the local provider's signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Route prefix, empty or starting with `/`, never ending with `/`
    pub base_path: String,

    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

/// Key-value store backend
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    Redis(RedisConfig),
    Postgres(DatabaseConfig),
}

impl StoreConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Redis(_) => "redis",
            StoreConfig::Postgres(_) => "postgres",
        }
    }
}

/// Identity provider selection
#[derive(Debug, Clone)]
pub enum AuthProviderConfig {
    Local { jwt_secret: String },
    Supabase(SupabaseConfig),
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub provider: AuthProviderConfig,
    pub allow_unverified_fallback: bool,
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be a boolean, got '{}'", key, other),
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable for the selected backend or
    /// provider is missing, or a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} environment variable is required", key))
        };

        let api = ApiConfig {
            host: or("API_HOST", "0.0.0.0"),
            port: or("API_PORT", "8080")
                .parse()
                .context("API_PORT must be a port number")?,
            base_path: normalize_base_path(&or("API_BASE_PATH", "/make-server")),
            cors_origins: or("API_CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            production: parse_bool("API_PRODUCTION", &or("API_PRODUCTION", "false"))?,
        };

        let store = match or("STORE_BACKEND", "memory").to_ascii_lowercase().as_str() {
            "memory" => StoreConfig::Memory,
            "redis" => StoreConfig::Redis(RedisConfig::from_lookup(&var)?),
            "postgres" => StoreConfig::Postgres(DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: or("DATABASE_MAX_CONNECTIONS", "10")
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a number")?,
                ..DatabaseConfig::default()
            }),
            other => bail!("STORE_BACKEND must be memory, redis or postgres, got '{}'", other),
        };

        let provider = match or("AUTH_PROVIDER", "local").to_ascii_lowercase().as_str() {
            "local" => {
                let jwt_secret = required("JWT_SECRET")?;
                if jwt_secret.len() < MIN_JWT_SECRET_LEN {
                    bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
                }
                AuthProviderConfig::Local { jwt_secret }
            }
            "supabase" => AuthProviderConfig::Supabase(SupabaseConfig {
                url: required("SUPABASE_URL")?,
                anon_key: required("SUPABASE_ANON_KEY")?,
                service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
                timeout_secs: or("AUTH_HTTP_TIMEOUT_SECS", "10")
                    .parse()
                    .context("AUTH_HTTP_TIMEOUT_SECS must be a number")?,
            }),
            other => bail!("AUTH_PROVIDER must be local or supabase, got '{}'", other),
        };

        let allow_unverified_fallback = parse_bool(
            "AUTH_ALLOW_UNVERIFIED_FALLBACK",
            &or("AUTH_ALLOW_UNVERIFIED_FALLBACK", "false"),
        )?;
        // Local introspection is authoritative; a payload fallback would
        // bypass signature checks and sign-out revocation
        if allow_unverified_fallback && matches!(provider, AuthProviderConfig::Local { .. }) {
            bail!("AUTH_ALLOW_UNVERIFIED_FALLBACK requires AUTH_PROVIDER=supabase");
        }

        let auth = AuthConfig {
            provider,
            allow_unverified_fallback,
        };

        Ok(Self { api, store, auth })
    }

    /// Configuration for tests and local runs: memory store, local auth
    pub fn for_local(jwt_secret: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_path: "/make-server".to_string(),
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            store: StoreConfig::Memory,
            auth: AuthConfig {
                provider: AuthProviderConfig::Local {
                    jwt_secret: jwt_secret.into(),
                },
                allow_unverified_fallback: false,
            },
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
