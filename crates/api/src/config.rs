//! Process configuration, read once at startup from the environment.
//!
//! | variable | default |
//! |---|---|
//! | `AGENCYHUB_BIND_ADDR` | `0.0.0.0:8080` |
//! | `AGENCYHUB_SESSION_SECRET` | insecure dev value (warns) |
//! | `AGENCYHUB_SESSION_TTL_HOURS` | `168`, at most `8760` |
//! | `AGENCYHUB_SESSION_COOKIE` | `agencyhub_session` |
//! | `AGENCYHUB_COOKIE_SECURE` | `false` |
//! | `AGENCYHUB_LOG_FORMAT` | `json` |
//! | `AGENCYHUB_BOOTSTRAP_EMAIL` / `AGENCYHUB_BOOTSTRAP_PASSWORD` | unset |

use chrono::Duration;
use thiserror::Error;

use agencyhub_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
pub const DEFAULT_COOKIE_NAME: &str = "agencyhub_session";

const DEV_SESSION_SECRET: &str = "dev-session-secret";
const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} is set but {1} is not")]
    Incomplete(&'static str, &'static str),
}

/// Super-admin account created at startup when both variables are set.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl", &self.session_ttl)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("log_format", &self.log_format)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_secret =
            get("AGENCYHUB_SESSION_SECRET").unwrap_or_else(|| DEV_SESSION_SECRET.to_string());

        let session_ttl = match get("AGENCYHUB_SESSION_TTL_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => Duration::hours(hours),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "AGENCYHUB_SESSION_TTL_HOURS",
                        value: raw,
                    });
                }
            },
            None => Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        };

        let cookie_name = match get("AGENCYHUB_SESSION_COOKIE") {
            Some(raw) if is_cookie_name(&raw) => raw,
            Some(raw) => {
                return Err(ConfigError::InvalidValue {
                    key: "AGENCYHUB_SESSION_COOKIE",
                    value: raw,
                });
            }
            None => DEFAULT_COOKIE_NAME.to_string(),
        };

        let cookie_secure = match get("AGENCYHUB_COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                key: "AGENCYHUB_COOKIE_SECURE",
                value: raw,
            })?,
            None => false,
        };

        let bootstrap_admin = match (
            get("AGENCYHUB_BOOTSTRAP_EMAIL"),
            get("AGENCYHUB_BOOTSTRAP_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(
                    "AGENCYHUB_BOOTSTRAP_EMAIL",
                    "AGENCYHUB_BOOTSTRAP_PASSWORD",
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(
                    "AGENCYHUB_BOOTSTRAP_PASSWORD",
                    "AGENCYHUB_BOOTSTRAP_EMAIL",
                ));
            }
        };

        Ok(Self {
            bind_addr: get("AGENCYHUB_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_secret,
            session_ttl,
            cookie_name,
            cookie_secure,
            log_format: get("AGENCYHUB_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            bootstrap_admin,
        })
    }

    /// Why the session secret is unfit for production, if it is.
    ///
    /// Reported by the caller once logging is up.
    pub fn secret_warning(&self) -> Option<&'static str> {
        if self.session_secret == DEV_SESSION_SECRET {
            Some("AGENCYHUB_SESSION_SECRET not set; using insecure dev default")
        } else if self.session_secret.len() < MIN_SECRET_LENGTH {
            Some("AGENCYHUB_SESSION_SECRET is shorter than 32 bytes")
        } else {
            None
        }
    }
}

/// RFC 6265 cookie-name token: visible ASCII minus separators.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
