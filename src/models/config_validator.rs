use crate::models::config::{Config, EmailConfig};
use crate::models::error::{BackupError, Result};
use lettre::message::Mailbox;
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating configuration...");

    validate_source_directory(&config.source_directory)?;

    validate_backup_folder(&config.backup_folder)?;

    validate_file_suffixes(&config.file_suffixes)?;

    validate_email(&config.email)?;

    validate_schedule(config)?;

    info!("Configuration validation passed");
    Ok(())
}

/// The scan directory must exist and be listable
fn validate_source_directory(source_directory: &str) -> Result<()> {
    let path = Path::new(source_directory);

    if !path.exists() {
        return Err(BackupError::ConfigInvalid(format!(
            "Source directory does not exist: {}",
            source_directory
        )));
    }

    if !path.is_dir() {
        return Err(BackupError::ConfigInvalid(format!(
            "Source directory is not a directory: {}",
            source_directory
        )));
    }

    if let Err(e) = fs::read_dir(path) {
        return Err(BackupError::ConfigInvalid(format!(
            "Source directory is not readable: {}\nError: {}",
            source_directory, e
        )));
    }

    Ok(())
}

/// A missing or read-only backup folder is only warned about here; the run itself
/// reports it as a failed backup for every candidate.
fn validate_backup_folder(backup_folder: &str) -> Result<()> {
    if backup_folder.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "backup_folder must be set (config file, --backup-folder or BACKUP_FOLDER)"
                .to_string(),
        ));
    }

    let path = Path::new(backup_folder);
    if !path.exists() {
        warn!(
            "Backup folder does not exist but will be created: {}",
            backup_folder
        );
        return Ok(());
    }

    if !path.is_dir() {
        return Err(BackupError::ConfigInvalid(format!(
            "Backup folder exists but is not a directory: {}",
            backup_folder
        )));
    }

    if let Err(e) = check_writable(path) {
        warn!(
            "Backup folder is not writable: {}\nError: {}",
            backup_folder, e
        );
    }

    Ok(())
}

fn validate_file_suffixes(suffixes: &[String]) -> Result<()> {
    if suffixes.is_empty() {
        return Err(BackupError::ConfigInvalid(
            "At least one file suffix must be configured".to_string(),
        ));
    }

    if suffixes.iter().any(|suffix| suffix.is_empty()) {
        // An empty suffix would select every entry in the directory
        return Err(BackupError::ConfigInvalid(
            "File suffixes must not be empty strings".to_string(),
        ));
    }

    Ok(())
}

fn validate_email(email: &EmailConfig) -> Result<()> {
    parse_mailbox(&email.sender)?;
    parse_mailbox(&email.receiver)?;

    if email.smtp_host.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "email.smtp_host must not be empty".to_string(),
        ));
    }

    if email.smtp_port == 0 {
        return Err(BackupError::ConfigInvalid(
            "email.smtp_port must be greater than 0".to_string(),
        ));
    }

    if !email.password.is_set() {
        warn!("No email password configured (--password or EMAIL_PASSWORD). Notifications will fail to authenticate.");
    }

    Ok(())
}

pub fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|cause| BackupError::EmailAddress {
            address: address.to_string(),
            cause,
        })
}

/// Validate schedule configuration
fn validate_schedule(config: &Config) -> Result<()> {
    if let Some(schedule_str) = &config.schedule {
        match cron::Schedule::from_str(schedule_str) {
            Ok(_) => {
                info!("Schedule validated: {}", schedule_str);
            }
            Err(cause) => {
                return Err(BackupError::InvalidSchedule {
                    expression: schedule_str.clone(),
                    cause,
                });
            }
        }
    } else {
        info!("No schedule configured - backup will run once");
    }
    Ok(())
}

/// Check if a directory is writable by attempting to create a temporary file
fn check_writable(path: &Path) -> std::io::Result<()> {
    let test_file = path.join(".rustydbbackup_write_test");

    fs::write(&test_file, b"test")?;

    fs::remove_file(&test_file)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(source: &TempDir, dest: &TempDir) -> Config {
        let mut config = Config::default();
        config.source_directory = source.path().to_str().unwrap().to_string();
        config.backup_folder = dest.path().join("backups").to_str().unwrap().to_string();
        config.email.sender = "backup@example.com".to_string();
        config.email.receiver = "Admin <admin@example.com>".to_string();
        config
    }

    #[test]
    fn test_check_writable_temp_dir() {
        let temp_dir = std::env::temp_dir();
        assert!(check_writable(&temp_dir).is_ok());
    }

    #[test]
    fn test_validate_config_passes_for_valid_config() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();

        let config = create_test_config(&temp_source, &temp_dest);

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_nonexistent_source_directory() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.source_directory = "/this/does/not/exist".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_rejects_backup_folder_that_is_a_file() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let file_path = temp_dest.path().join("not_a_dir");
        fs::write(&file_path, b"x").unwrap();

        let mut config = create_test_config(&temp_source, &temp_dest);
        config.backup_folder = file_path.to_str().unwrap().to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_rejects_empty_suffix_list() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.file_suffixes.clear();

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_suffix_entry() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.file_suffixes.push(String::new());

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_invalid_sender_address() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.email.sender = "not an address".to_string();

        match validate_config(&config) {
            Err(BackupError::EmailAddress { address, .. }) => assert_eq!(address, "not an address"),
            other => panic!("Expected EmailAddress error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_missing_receiver() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.email.receiver = String::new();

        assert!(matches!(
            validate_config(&config),
            Err(BackupError::EmailAddress { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_smtp_port() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.email.smtp_port = 0;

        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("smtp_port"));
    }

    #[test]
    fn test_rejects_invalid_cron_expression() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.schedule = Some("every day at noon".to_string());

        assert!(matches!(
            validate_config(&config),
            Err(BackupError::InvalidSchedule { .. })
        ));
    }

    #[test]
    fn test_accepts_missing_schedule() {
        let temp_source = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_source, &temp_dest);
        config.schedule = None;

        assert!(validate_config(&config).is_ok());
    }
}
