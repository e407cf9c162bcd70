use chrono::Duration;
use std::env;

/// Signing key used when JWT_SECRET is not set. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "dev_secret_key_change_me";

const DEFAULT_TOKEN_LIFETIME: &str = "7d";

/// Longest accepted token lifetime, in days
pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 3650;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once at startup and passed to constructors
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_lifetime: Duration,
    pub host: String,
    pub port: u16,
    pub request_timeout: std::time::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                log::warn!("JWT_SECRET is not set; using the insecure development key");
                DEV_JWT_SECRET.to_string()
            }
        };

        let lifetime_raw = var("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_TOKEN_LIFETIME.into());
        let token_lifetime =
            parse_lifetime(&lifetime_raw).map_err(|reason| ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                value: lifetime_raw.clone(),
                reason,
            })?;

        Ok(Self {
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_number(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS"),
                5,
            )?,
            jwt_secret,
            token_lifetime,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number("PORT", var("PORT"), 3000)?,
            request_timeout: std::time::Duration::from_secs(parse_number(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS"),
                30,
            )?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

/// Parses a token lifetime: plain seconds (`3600`) or a number with a unit
/// suffix `s`, `m`, `h` or `d` (`90m`, `7d`).
pub fn parse_lifetime(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&raw[..i], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };

    let amount: i64 = digits
        .trim()
        .parse()
        .map_err(|_| "expected a number optionally followed by s, m, h or d".to_string())?;
    if amount <= 0 {
        return Err("lifetime must be positive".to_string());
    }

    let lifetime = match unit {
        's' => Duration::try_seconds(amount),
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        other => return Err(format!("unknown unit '{}'", other)),
    };

    match lifetime {
        Some(lifetime) if lifetime <= Duration::days(MAX_TOKEN_LIFETIME_DAYS) => Ok(lifetime),
        _ => Err(format!(
            "lifetime must be at most {} days",
            MAX_TOKEN_LIFETIME_DAYS
        )),
    }
}
