use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use scribe_db::HookMode;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "your-secret-key-change-in-production",
];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub audit_by: String,
    pub hook_mode: HookMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("SCRIBE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SCRIBE_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = var_or("SCRIBE_PORT", "8080")
            .parse()
            .context("SCRIBE_PORT must be a port number")?;
        let jwt_ttl_hours: i64 = var_or("SCRIBE_JWT_EXPIRE_HOURS", "24")
            .parse()
            .context("SCRIBE_JWT_EXPIRE_HOURS must be an integer")?;
        let strict: bool = var_or("SCRIBE_STRICT_HOOKS", "false")
            .parse()
            .context("SCRIBE_STRICT_HOOKS must be true or false")?;

        Ok(Self {
            host: var_or("SCRIBE_HOST", "0.0.0.0"),
            port,
            db_path: var_or("SCRIBE_DB_PATH", "blog.db").into(),
            jwt_secret,
            jwt_ttl_hours,
            audit_by: var_or("SCRIBE_AUDIT_BY", "bob"),
            hook_mode: if strict { HookMode::Strict } else { HookMode::Lenient },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
