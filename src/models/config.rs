use crate::models::config_validator::validate_config;
use crate::models::error::{BackupError, Result};
use log::info;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backup_folder: String,
    #[serde(default = "default_source_directory")]
    pub source_directory: String,
    #[serde(default = "default_file_suffixes")]
    pub file_suffixes: Vec<String>,
    /// Six-field cron expression evaluated in local time. `null` means run once.
    #[serde(default = "default_schedule")]
    pub schedule: Option<String>,
    #[serde(default = "bool_false")]
    pub run_on_startup: bool,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub receiver: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Only ever populated from the command line or environment.
    #[serde(skip)]
    pub password: Password,
}

/// SMTP password. Never printed.
#[derive(Clone, Default)]
pub struct Password(Option<String>);

impl Password {
    pub fn new(secret: impl Into<String>) -> Self {
        Password(Some(secret.into()))
    }

    pub fn expose(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.0.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Password(***)"),
            None => f.write_str("Password(unset)"),
        }
    }
}

/// Values supplied on the command line or through the environment.
/// Anything set here wins over the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub backup_folder: Option<String>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub password: Option<String>,
}

fn default_source_directory() -> String {
    String::from(".")
}
fn default_file_suffixes() -> Vec<String> {
    vec![String::from(".sql"), String::from(".sqlite3")]
}
fn default_schedule() -> Option<String> {
    Some(String::from("0 0 0 * * *"))
}
fn default_smtp_host() -> String {
    String::from("smtp.gmail.com")
}
const fn default_smtp_port() -> u16 {
    465
}
const fn bool_false() -> bool { false }

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            sender: String::new(),
            receiver: String::new(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            password: Password::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backup_folder: String::new(),
            source_directory: default_source_directory(),
            file_suffixes: default_file_suffixes(),
            schedule: default_schedule(),
            run_on_startup: bool_false(),
            email: EmailConfig::default(),
        }
    }
}

impl Config {
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(folder) = overrides.backup_folder {
            self.backup_folder = folder;
        }
        if let Some(sender) = overrides.sender {
            self.email.sender = sender;
        }
        if let Some(receiver) = overrides.receiver {
            self.email.receiver = receiver;
        }
        if let Some(password) = overrides.password {
            self.email.password = Password::new(password);
        }
    }
}

fn load_config_file(config_path: PathBuf) -> Result<Config> {
    info!("Loading config from: {}", config_path.display());

    let config_str = fs::read_to_string(&config_path).map_err(|cause| {
        BackupError::ConfigRead {
            path: config_path.clone(),
            cause,
        }
    })?;

    serde_json::from_str(&config_str).map_err(|cause| BackupError::ConfigParse {
        path: config_path,
        cause,
    })
}

/// Builds the run configuration from an optional JSON file plus overrides, then validates it.
pub fn setup_config(config_file: Option<String>, overrides: ConfigOverrides) -> Result<Config> {
    let mut config = match config_file {
        Some(file) => load_config_file(PathBuf::from(file))?,
        None => {
            info!("No config file given, using defaults and environment");
            Config::default()
        }
    };
    config.apply_overrides(overrides);

    validate_config(&config)?;

    Ok(config)
}
