use crate::models::config::Config;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::error::{BackupError, Result};
use crate::models::run_result::RunResult;
use crate::service::notifier::Notifier;
use crate::utils::directory::{backup_destination, ensure_directory, get_candidates_in_path};
use crate::utils::progress::{create_copy_progress_bar, format_bytes};
use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::fs::{self, File, FileTimes};
use std::path::Path;

/// One backup-and-notify pass over the source directory.
pub struct BackupRunner<'a> {
    config: &'a Config,
    notifier: &'a dyn Notifier,
    dry_run_mode: DryRunMode,
    quiet: bool,
}

impl<'a> BackupRunner<'a> {
    pub fn new(config: &'a Config, notifier: &'a dyn Notifier) -> Self {
        BackupRunner {
            config,
            notifier,
            dry_run_mode: DryRunMode::None,
            quiet: true,
        }
    }

    pub fn with_dry_run_mode(mut self, dry_run_mode: DryRunMode) -> Self {
        self.dry_run_mode = dry_run_mode;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.quiet = !show_progress;
        self
    }

    pub fn execute(&self) -> RunResult {
        self.execute_at(Local::now())
    }

    /// Runs with a fixed clock. Never fails: every problem ends up in the result
    /// and the log.
    pub fn execute_at(&self, now: DateTime<Local>) -> RunResult {
        let prefix = self.dry_run_mode.progress_prefix();
        let mut result = RunResult::new(now);
        let timestamp = result.file_timestamp();
        let backup_folder = Path::new(&self.config.backup_folder);

        // Without a destination every candidate counts as a failed copy
        let folder_ready = if self.dry_run_mode.should_copy_files() {
            match ensure_directory(backup_folder) {
                Ok(()) => true,
                Err(e) => {
                    error!("{}", e);
                    false
                }
            }
        } else {
            true
        };

        let candidates = match get_candidates_in_path(
            Path::new(&self.config.source_directory),
            &self.config.file_suffixes,
        ) {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("{}Failed to scan for database files: {}", prefix, e);
                return result;
            }
        };

        if candidates.is_empty() {
            info!(
                "{}No database files found to back up in {}",
                prefix, self.config.source_directory
            );
            return result;
        }

        info!(
            "{}Found {} database file(s) in {}",
            prefix,
            candidates.len(),
            self.config.source_directory
        );

        if !self.dry_run_mode.should_copy_files() {
            for name in &candidates {
                info!(
                    "{}Would back up {} -> {}",
                    prefix,
                    name,
                    backup_destination(backup_folder, name, &timestamp).display()
                );
                result.record_success(name.as_str());
            }
            self.report(&result);
            return result;
        }

        let progress = (!self.quiet)
            .then(|| create_copy_progress_bar(candidates.len() as u64, "Backing up"));

        for name in candidates {
            if let Some(pb) = &progress {
                pb.set_message(name.clone());
            }

            if !folder_ready {
                warn!("Skipping {}: backup folder is unavailable", name);
                result.record_failure(name);
            } else {
                let source = Path::new(&self.config.source_directory).join(&name);
                let destination = backup_destination(backup_folder, &name, &timestamp);
                match copy_with_metadata(&source, &destination) {
                    Ok(bytes) => {
                        info!(
                            "Backed up {} -> {} ({})",
                            name,
                            destination.display(),
                            format_bytes(bytes)
                        );
                        result.record_success(name);
                    }
                    Err(e) => {
                        error!("Failed to back up {}: {}", name, e);
                        result.record_failure(name);
                    }
                }
            }

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!(
                "{} backed up, {} failed",
                result.backed_up_files.len(),
                result.failed_files.len()
            ));
        }
        info!(
            "Backup run finished: {} of {} database file(s) backed up",
            result.backed_up_files.len(),
            result.candidate_count()
        );

        self.report(&result);
        result
    }

    fn report(&self, result: &RunResult) {
        if !self.dry_run_mode.should_compose_report() {
            return;
        }

        let Some(message) = result.notification() else {
            return;
        };

        if self.dry_run_mode.should_send_email() {
            self.notifier.send(&message.subject, &message.body);
        } else {
            info!(
                "{}Would email {}: {}\n{}",
                self.dry_run_mode.progress_prefix(),
                self.config.email.receiver,
                message.subject,
                message.body
            );
        }
    }
}

/// Byte-for-byte copy that keeps permissions and access/modification times.
/// A copy whose times could not be applied is removed again.
pub fn copy_with_metadata(source: &Path, destination: &Path) -> Result<u64> {
    let bytes = fs::copy(source, destination).map_err(|cause| BackupError::FileCopy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        cause,
    })?;

    if let Err(cause) = copy_file_times(source, destination) {
        if let Err(e) = fs::remove_file(destination) {
            warn!(
                "Failed to remove incomplete backup {}: {}",
                destination.display(),
                e
            );
        }
        return Err(BackupError::MetadataError {
            path: destination.to_path_buf(),
            cause,
        });
    }

    Ok(bytes)
}

fn copy_file_times(source: &Path, destination: &Path) -> std::io::Result<()> {
    let source_metadata = fs::metadata(source)?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = source_metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = source_metadata.modified() {
        times = times.set_modified(modified);
    }

    // Windows needs a writable handle; on Unix the owner may use a read-only one, which
    // matters once the copy has picked up the source's read-only permissions
    let file = File::options()
        .write(true)
        .open(destination)
        .or_else(|_| File::open(destination))?;
    file.set_times(times)
}
