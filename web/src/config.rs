//! Service configuration.

use chrono::Duration;
use std::env;

/// How confirmation codes leave the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailMode {
    /// Log codes to the console. Default for development.
    Console,
    /// Deliver over SMTP.
    Smtp {
        /// SMTP server address.
        server: String,
        /// SMTP server port.
        port: u16,
        /// SMTP username.
        username: String,
        /// SMTP password.
        password: String,
    },
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Secret for signing access tokens.
    pub jwt_secret: String,
    /// Access token lifetime.
    pub token_ttl: Duration,
    /// Confirmation code lifetime.
    pub code_ttl: Duration,
    /// Email delivery mode.
    pub email_mode: EmailMode,
    /// Sender address on outgoing mail.
    pub from_email: String,
    /// Sender display name on outgoing mail.
    pub from_name: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_i64_or(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Read the configuration from environment variables, falling back
    /// to development defaults.
    ///
    /// SMTP delivery is enabled by setting `CRITIQUE_SMTP_SERVER`;
    /// otherwise codes are logged to the console.
    #[must_use]
    pub fn from_env() -> Self {
        let email_mode = match env::var("CRITIQUE_SMTP_SERVER") {
            Ok(server) => EmailMode::Smtp {
                server,
                port: u16::try_from(env_i64_or("CRITIQUE_SMTP_PORT", 587)).unwrap_or(587),
                username: env_or("CRITIQUE_SMTP_USERNAME", ""),
                password: env_or("CRITIQUE_SMTP_PASSWORD", ""),
            },
            Err(_) => EmailMode::Console,
        };

        Self {
            bind_addr: env_or("CRITIQUE_BIND_ADDR", "127.0.0.1:8000"),
            database_url: env_or(
                "DATABASE_URL",
                "postgresql://localhost/critique",
            ),
            jwt_secret: env_or("CRITIQUE_JWT_SECRET", "insecure-dev-secret"),
            token_ttl: Duration::hours(env_i64_or("CRITIQUE_TOKEN_TTL_HOURS", 24)),
            code_ttl: Duration::minutes(env_i64_or("CRITIQUE_CODE_TTL_MINUTES", 60 * 24)),
            email_mode,
            from_email: env_or("CRITIQUE_FROM_EMAIL", "noreply@critique.local"),
            from_name: env_or("CRITIQUE_FROM_NAME", "Critique"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env();
        assert!(!config.bind_addr.is_empty());
        assert_eq!(config.token_ttl, Duration::hours(24));
    }
}
