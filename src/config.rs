use anyhow::Context;

use crate::auth::policy::AccessPolicy;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub server: ServerConfig,
    pub access: AccessPolicy,
    /// Clamp for `limit` on product listings. `None` leaves it unbounded.
    pub max_page_size: Option<u32>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "stockroom".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "stockroom-users".into()),
            ttl_minutes: var("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let server = ServerConfig {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: match var("APP_PORT") {
                Some(v) => v.parse().with_context(|| format!("invalid APP_PORT {v:?}"))?,
                None => 8080,
            },
        };
        let allow_user_reads = var("ALLOW_USER_READS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let max_page_size = var("PRODUCTS_MAX_PAGE_SIZE")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0);

        Ok(Self {
            database_url,
            jwt,
            server,
            access: AccessPolicy::with_user_reads(allow_user_reads),
            max_page_size,
        })
    }
}
