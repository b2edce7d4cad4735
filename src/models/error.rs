use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Failed to create backup directory '{path}': {cause}")]
    DirectoryCreate { path: PathBuf, cause: io::Error },

    #[error("Failed to read directory '{path}': {cause}")]
    DirectoryRead { path: PathBuf, cause: walkdir::Error },

    #[error("Failed to copy file from '{from}' to '{to}': {cause}")]
    FileCopy {
        from: PathBuf,
        to: PathBuf,
        cause: io::Error,
    },

    #[error("Failed to preserve metadata on '{path}': {cause}")]
    MetadataError { path: PathBuf, cause: io::Error },

    #[error("Invalid email address '{address}': {cause}")]
    EmailAddress {
        address: String,
        cause: lettre::address::AddressError,
    },

    #[error("Failed to build email message: {0}")]
    EmailBuild(#[from] lettre::error::Error),

    #[error("SMTP error talking to '{host}': {cause}")]
    Smtp {
        host: String,
        cause: lettre::transport::smtp::Error,
    },

    #[error("Invalid cron expression '{expression}': {cause}")]
    InvalidSchedule {
        expression: String,
        cause: cron::error::Error,
    },
}

pub type Result<T> = std::result::Result<T, BackupError>;
