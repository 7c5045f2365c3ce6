//! Runtime configuration from environment variables.
//!
//! Every setting has a development default. Insecure defaults (the admin
//! login) are accepted with a warning so a fresh checkout runs as-is.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@lab.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_NOTIFY_FROM: &str = "LabLink <no-reply@lablink.local>";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_NOTIFY_QUEUE: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}=`{value}` is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Admin login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim()) && self.password == password
    }
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SMTP relay settings. Present only when `SMTP_HOST` is set.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpSettings {
    /// Username and password, if both are set.
    pub fn credentials(&self) -> Option<(String, String)> {
        Some((self.username.clone()?, self.password.clone()?))
    }
}

impl core::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// JSON snapshot file; `None` keeps everything in memory.
    pub data_file: Option<PathBuf>,
    pub admin: AdminCredentials,
    pub notify_to: String,
    pub notify_from: String,
    /// `None` logs notifications instead of mailing them.
    pub smtp: Option<SmtpSettings>,
    pub notify_queue: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = parse_var(
            "LABLINK_BIND_ADDR",
            get("LABLINK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let admin_email = get("LABLINK_ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());
        let admin_password = get("LABLINK_ADMIN_PASSWORD").unwrap_or_else(|| {
            warn!("LABLINK_ADMIN_PASSWORD not set; using insecure dev default");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: match get("SMTP_PORT") {
                    Some(raw) => parse_var("SMTP_PORT", raw)?,
                    None => DEFAULT_SMTP_PORT,
                },
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
            }),
            None => None,
        };

        let notify_queue: usize = match get("LABLINK_NOTIFY_QUEUE") {
            Some(raw) => parse_var("LABLINK_NOTIFY_QUEUE", raw)?,
            None => DEFAULT_NOTIFY_QUEUE,
        };
        if notify_queue == 0 {
            return Err(ConfigError::Invalid {
                var: "LABLINK_NOTIFY_QUEUE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            data_file: get("LABLINK_DATA_FILE").map(PathBuf::from),
            notify_to: get("LABLINK_NOTIFY_TO").unwrap_or_else(|| admin_email.clone()),
            admin: AdminCredentials {
                email: admin_email,
                password: admin_password,
            },
            notify_from: get("LABLINK_NOTIFY_FROM").unwrap_or_else(|| DEFAULT_NOTIFY_FROM.to_string()),
            smtp,
            notify_queue,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_file: None,
            admin: AdminCredentials {
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: DEFAULT_ADMIN_PASSWORD.to_string(),
            },
            notify_to: DEFAULT_ADMIN_EMAIL.to_string(),
            notify_from: DEFAULT_NOTIFY_FROM.to_string(),
            smtp: None,
            notify_queue: DEFAULT_NOTIFY_QUEUE,
        }
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_dev_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn explicit_values_are_used() {
        let config = config_from(&[
            ("LABLINK_BIND_ADDR", "127.0.0.1:8088"),
            ("LABLINK_DATA_FILE", "/var/lib/lablink/database.json"),
            ("LABLINK_ADMIN_EMAIL", "lab@uni.edu"),
            ("LABLINK_ADMIN_PASSWORD", "s3cret"),
            ("SMTP_HOST", "smtp.uni.edu"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "pw"),
            ("LABLINK_NOTIFY_QUEUE", "8"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8088".parse().unwrap());
        assert_eq!(config.data_file, Some(PathBuf::from("/var/lib/lablink/database.json")));
        assert!(config.admin.matches("LAB@uni.edu ", "s3cret"));
        assert!(!config.admin.matches("lab@uni.edu", "wrong"));
        assert_eq!(config.notify_to, "lab@uni.edu");
        assert_eq!(config.notify_queue, 8);

        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, DEFAULT_SMTP_PORT);
        assert_eq!(smtp.credentials(), Some(("mailer".to_string(), "pw".to_string())));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("LABLINK_DATA_FILE", "  "), ("SMTP_HOST", "")]).unwrap();
        assert!(config.data_file.is_none());
        assert!(config.smtp.is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config_from(&[("LABLINK_BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LABLINK_BIND_ADDR", .. }));

        let err = config_from(&[("SMTP_HOST", "smtp.uni.edu"), ("SMTP_PORT", "99999")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SMTP_PORT", .. }));

        let err = config_from(&[("LABLINK_NOTIFY_QUEUE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LABLINK_NOTIFY_QUEUE", .. }));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = config_from(&[("SMTP_HOST", "smtp.uni.edu"), ("SMTP_PASSWORD", "hunter2")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains(DEFAULT_ADMIN_PASSWORD));
    }
}
