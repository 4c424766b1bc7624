use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub trusted_proxies: Vec<IpNet>,
    pub images: ImageStoreConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub bcrypt_cost: u32,
    pub reset_token_ttl_secs: i64,
}

/// `allowed_origins == None` leaves CORS off; a single `"*"` allows any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Option<Vec<String>>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        matches!(&self.allowed_origins, Some(list) if list.iter().any(|o| o == "*"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub rate_per_sec: f64,
    pub burst: f64,
}

#[derive(Debug, Clone)]
pub enum ImageStoreConfig {
    Cloudinary {
        cloud_name: String,
        api_key: String,
        api_secret: String,
        folder: String,
    },
    Local {
        upload_dir: PathBuf,
        public_base_url: String,
    },
}

#[derive(Debug, Clone)]
pub enum MailConfig {
    Http {
        url: String,
        api_key: String,
        from: String,
    },
    Log {
        from: String,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so parsing can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_or(&get, "APP_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&get, "APP_PORT", 3002u16)?;

        let database = DatabaseConfig {
            url: get("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5u32)?,
        };

        let auth = AuthConfig {
            jwt_secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expire_days: parse_or(&get, "JWT_EXPIRE_DAYS", 7i64)?,
            bcrypt_cost: parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            reset_token_ttl_secs: parse_or(&get, "RESET_TOKEN_TTL_SECS", 120i64)?,
        };
        if !(4..=31).contains(&auth.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }

        let enable_cors = get("ENABLE_CORS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(list) => Some(
                list.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            None if enable_cors => Some(vec!["*".to_string()]),
            None => None,
        };

        let rate_per_sec = parse_or(&get, "RATE_LIMIT_RPS", 5.0f64)?;
        let rate_limit = RateLimitConfig {
            rate_per_sec,
            burst: parse_or(&get, "RATE_LIMIT_BURST", rate_per_sec * 2.0)?,
        };

        let trusted_proxies = get("TRUSTED_PROXIES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| IpNet::from_str(s).with_context(|| format!("invalid TRUSTED_PROXIES entry {}", s)))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let images = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => ImageStoreConfig::Cloudinary {
                cloud_name,
                api_key,
                api_secret,
                folder: get("CLOUDINARY_FOLDER").unwrap_or_else(|| "my_instructor".to_string()),
            },
            (None, None, None) => ImageStoreConfig::Local {
                upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
                public_base_url: get("PUBLIC_BASE_URL")
                    .unwrap_or_else(|| format!("http://{}:{}/uploads", host, port)),
            },
            _ => bail!("CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"),
        };

        let from = get("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string());
        let mail = match get("MAIL_API_URL") {
            Some(url) => MailConfig::Http {
                url,
                api_key: get("MAIL_API_KEY").context("MAIL_API_KEY must be set when MAIL_API_URL is provided")?,
                from,
            },
            None => MailConfig::Log { from },
        };

        Ok(AppConfig {
            server: ServerConfig { host, port },
            database,
            auth,
            cors: CorsConfig { allowed_origins },
            rate_limit,
            trusted_proxies,
            images,
            mail,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}
