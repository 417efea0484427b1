/// Centralized environment configuration.
/// All env vars and defaults are defined here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. Required.
    pub database_url: String,

    /// Socket address the HTTP server binds to.
    /// Default: 0.0.0.0:3000
    pub bind_addr: String,

    /// Base URL for generating links in emails.
    /// Default: http://localhost:3000
    pub app_url: String,

    /// From/reply address for outgoing emails.
    /// Default: please-configure@example.com
    pub mail_from: String,

    /// Mail adapter. Only "console" is built in.
    /// Default: console
    pub mail_adapter: String,

    /// Session lifetime in days; also the cookie max-age.
    /// Default: 30
    pub session_ttl_days: i64,

    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    /// Default: false
    pub cookie_secure: bool,
}

impl Config {
    /// Build config from environment variables.
    /// Returns an error if required vars are missing or malformed.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env")?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "please-configure@example.com".to_string());

        let mail_adapter = std::env::var("MAIL_ADAPTER")
            .unwrap_or_else(|_| "console".to_string());

        let session_ttl_days = std::env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or("SESSION_TTL_DAYS must be a positive number of days")?;

        let cookie_secure = match std::env::var("COOKIE_SECURE").as_deref() {
            Ok("1") | Ok("true") => true,
            Ok("0") | Ok("false") | Err(_) => false,
            Ok(_) => return Err("COOKIE_SECURE must be true/false".to_string()),
        };

        Ok(Self {
            database_url,
            bind_addr,
            app_url,
            mail_from,
            mail_adapter,
            session_ttl_days,
            cookie_secure,
        })
    }

    /// Returns the base URL without trailing slash, for building links.
    pub fn app_url_base(&self) -> &str {
        self.app_url.trim_end_matches('/')
    }

    /// Session lifetime as a `time::Duration`.
    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::days(self.session_ttl_days)
    }

    /// Config for tests. Uses in-memory database URL and console mailer.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            app_url: "http://localhost:3000".to_string(),
            mail_from: "test@example.com".to_string(),
            mail_adapter: "console".to_string(),
            session_ttl_days: 30,
            cookie_secure: false,
        }
    }
}
