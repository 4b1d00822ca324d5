use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which [`ClinicStore`](clinic_db::ClinicStore) the server runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unsupported store backend: {other} (expected postgres or memory)"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means permissive.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_pool_size: usize,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_pool_size: 16,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
}

impl Settings {
    /// Read `path` if it exists, then apply environment overrides.
    ///
    /// The result is not validated yet; [`Settings::with_overrides`] applies
    /// command-line overrides and validates.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`Settings::load`] with an explicit environment lookup.
    pub fn load_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("failed to read config file {}: {e}", path.display())
            })?;
            Self::parse(&raw, &env).map_err(|e| {
                anyhow::anyhow!("failed to parse config file {}: {e}", path.display())
            })?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        settings.apply_env(&env)?;
        Ok(settings)
    }

    /// Apply command-line overrides, which win over file and environment.
    pub fn with_overrides(
        mut self,
        database: Option<String>,
        store: Option<Backend>,
    ) -> anyhow::Result<Self> {
        if let Some(url) = database {
            self.database.url = Some(url);
        }
        if let Some(backend) = store {
            self.store.backend = backend;
        }
        self.validate()?;
        Ok(self)
    }

    fn parse(raw: &str, env: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut settings: Self = toml::from_str(raw)?;
        settings.expand_env(env)?;
        Ok(settings)
    }

    fn expand_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        self.server.host = expand_env_vars(&self.server.host, env)?;
        if let Some(url) = self.database.url.as_mut() {
            *url = expand_env_vars(url, env)?;
        }
        for origin in &mut self.server.cors_origins {
            *origin = expand_env_vars(origin, env)?;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = env("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = env("CLINIC_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env("CLINIC_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("CLINIC_PORT is not a valid port: {port}"))?;
        }
        if let Some(backend) = env("CLINIC_STORE") {
            self.store.backend = backend.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }
        if self.database.max_pool_size == 0 {
            anyhow::bail!("database.max_pool_size must be at least 1");
        }
        if self.store.backend == Backend::Postgres {
            self.database_url()?;
        }
        Ok(())
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        match self.database.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => anyhow::bail!(
                "database.url is required for the postgres store (set it in the config or DATABASE_URL)"
            ),
        }
    }
}

fn expand_env_vars(input: &str, env: &impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = env(&key)
                .ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
