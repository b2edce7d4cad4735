use crate::models::notification::NotificationMessage;
use chrono::{DateTime, Local};

/// Filename timestamp, e.g. `20240131_235959`.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Timestamp shown in the report body, e.g. `31/01/2024 23:59:59`.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Outcome of one backup run. Each candidate lands in exactly one of the two lists,
/// in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub timestamp: DateTime<Local>,
    pub backed_up_files: Vec<String>,
    pub failed_files: Vec<String>,
}

impl RunResult {
    pub fn new(timestamp: DateTime<Local>) -> Self {
        RunResult {
            timestamp,
            backed_up_files: Vec::new(),
            failed_files: Vec::new(),
        }
    }

    pub fn record_success(&mut self, file_name: impl Into<String>) {
        self.backed_up_files.push(file_name.into());
    }

    pub fn record_failure(&mut self, file_name: impl Into<String>) {
        self.failed_files.push(file_name.into());
    }

    pub fn candidate_count(&self) -> usize {
        self.backed_up_files.len() + self.failed_files.len()
    }

    pub fn file_timestamp(&self) -> String {
        self.timestamp.format(FILE_TIMESTAMP_FORMAT).to_string()
    }

    pub fn report_timestamp(&self) -> String {
        self.timestamp.format(REPORT_TIMESTAMP_FORMAT).to_string()
    }

    /// The report for this run, or `None` when no candidates were found.
    pub fn notification(&self) -> Option<NotificationMessage> {
        if !self.backed_up_files.is_empty() {
            Some(NotificationMessage::success(
                &self.report_timestamp(),
                &self.backed_up_files,
                &self.failed_files,
            ))
        } else if !self.failed_files.is_empty() {
            Some(NotificationMessage::failure(&self.failed_files))
        } else {
            None
        }
    }
}
