mod models;
mod service;
mod utils;

use crate::models::config::{setup_config, Config, ConfigOverrides};
use crate::models::dry_run_mode::DryRunMode;
use crate::service::backup::BackupRunner;
use crate::service::notifier::SmtpNotifier;
use crate::service::scheduler::BackupScheduler;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    // Values from a local .env file become visible to the env-backed arguments below
    let dotenv = dotenvy::dotenv();

    let args = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(parse_log_level(&args.log_level))
        .format_timestamp_secs()
        .init();

    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    cli_main(args)
}

#[derive(Parser, Debug)]
#[command(name = "RustyDbBackup")]
#[command(about = "Scheduled database file backup with email reports", long_about = None)]
struct Cli {
    #[arg(short = 'c', long = "config", env = "RUSTYDBBACKUP_CONFIG")]
    config_file: Option<String>,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[arg(short = 'v', long = "validate-only")]
    validate_only: bool,

    #[arg(short = 'd', long = "dry-run", conflicts_with = "dry_run_full")]
    dry_run: bool,

    #[arg(short = 'f', long = "dry-run-full", conflicts_with = "dry_run")]
    dry_run_full: bool,

    #[arg(short = 'o', long = "once")]
    once: bool,

    #[arg(short = 'b', long = "backup-folder", env = "BACKUP_FOLDER")]
    backup_folder: Option<String>,

    #[arg(long = "sender", env = "EMAIL_SENDER")]
    sender: Option<String>,

    #[arg(long = "receiver", env = "EMAIL_RECEIVER")]
    receiver: Option<String>,

    #[arg(long = "password", env = "EMAIL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backup_folder: self.backup_folder.clone(),
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            password: self.password.clone(),
        }
    }

    fn dry_run_mode(&self) -> DryRunMode {
        if self.dry_run_full {
            DryRunMode::Full
        } else if self.dry_run {
            DryRunMode::Quick
        } else {
            DryRunMode::None
        }
    }
}

fn parse_log_level(log_level: &str) -> log::LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

fn cli_main(args: Cli) -> Result<()> {
    info!("RustyDbBackup starting...");
    let config: Config = setup_config(args.config_file.clone(), args.overrides())
        .context("Failed to load configuration")?;
    debug!("Loaded config: {:?}", &config);

    if args.validate_only {
        info!("Configuration is valid. Exiting (--validate-only mode).");
        return Ok(());
    }

    let dry_run_mode = args.dry_run_mode();
    match dry_run_mode {
        DryRunMode::Full => info!(
            "Running in DRY RUN FULL mode - will compose the report without copying or sending"
        ),
        DryRunMode::Quick => {
            info!("Running in DRY RUN QUICK mode - will only list the files that would be backed up")
        }
        DryRunMode::None => {}
    }

    let notifier = SmtpNotifier::new(config.email.clone());
    let runner = BackupRunner::new(&config, &notifier)
        .with_dry_run_mode(dry_run_mode)
        .with_progress(!args.quiet);

    match config.schedule.as_deref() {
        Some(expression) if !args.once => {
            run_scheduled(expression, config.run_on_startup, &runner)?
        }
        _ => {
            runner.execute();
        }
    }

    if dry_run_mode.is_dry_run() {
        info!("DRY RUN completed - no files were copied and no email was sent");
    }
    Ok(())
}

fn run_scheduled(expression: &str, run_on_startup: bool, runner: &BackupRunner) -> Result<()> {
    let scheduler = BackupScheduler::new(expression).context("Invalid cron expression")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping scheduler...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    if run_on_startup {
        info!("Running initial backup on startup...");
        runner.execute();
    }

    scheduler.run_until(&running, || {
        runner.execute();
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    const ENV_KEYS: [&str; 6] = [
        "BACKUP_FOLDER",
        "EMAIL_SENDER",
        "EMAIL_RECEIVER",
        "EMAIL_PASSWORD",
        "RUSTYDBBACKUP_CONFIG",
        "LOG_LEVEL",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), log::LevelFilter::Debug);
        assert_eq!(parse_log_level("warn"), log::LevelFilter::Warn);
        assert_eq!(parse_log_level("chatty"), log::LevelFilter::Info);
    }

    #[test]
    #[serial]
    fn test_environment_supplies_overrides() {
        clear_env();
        std::env::set_var("BACKUP_FOLDER", "/var/backups/db");
        std::env::set_var("EMAIL_SENDER", "backup@example.com");
        std::env::set_var("EMAIL_RECEIVER", "admin@example.com");
        std::env::set_var("EMAIL_PASSWORD", "app-password");

        let args = Cli::try_parse_from(["RustyDbBackup"]).unwrap();
        let overrides = args.overrides();
        clear_env();

        assert_eq!(overrides.backup_folder.as_deref(), Some("/var/backups/db"));
        assert_eq!(overrides.sender.as_deref(), Some("backup@example.com"));
        assert_eq!(overrides.receiver.as_deref(), Some("admin@example.com"));
        assert_eq!(overrides.password.as_deref(), Some("app-password"));
    }

    #[test]
    #[serial]
    fn test_flags_win_over_environment() {
        clear_env();
        std::env::set_var("BACKUP_FOLDER", "/from/env");

        let args =
            Cli::try_parse_from(["RustyDbBackup", "--backup-folder", "/from/flag", "--once"])
                .unwrap();
        clear_env();

        assert_eq!(args.backup_folder.as_deref(), Some("/from/flag"));
        assert!(args.once);
    }

    #[test]
    #[serial]
    fn test_dry_run_modes() {
        clear_env();
        let quick = Cli::try_parse_from(["RustyDbBackup", "-d"]).unwrap();
        let full = Cli::try_parse_from(["RustyDbBackup", "-f"]).unwrap();
        let none = Cli::try_parse_from(["RustyDbBackup"]).unwrap();

        assert_eq!(quick.dry_run_mode(), DryRunMode::Quick);
        assert_eq!(full.dry_run_mode(), DryRunMode::Full);
        assert_eq!(none.dry_run_mode(), DryRunMode::None);
        assert!(Cli::try_parse_from(["RustyDbBackup", "-d", "-f"]).is_err());
    }
}
