pub const SUCCESS_SUBJECT: &str = "Database Backup Succeeded";
pub const FAILURE_SUBJECT: &str = "Database Backup Failed";

/// Plain-text report mailed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// At least one file was backed up. Failures, if any, are appended as a second list.
    pub fn success(report_timestamp: &str, backed_up: &[String], failed: &[String]) -> Self {
        let mut body = format!(
            "The following database files were backed up successfully at {}:\n{}",
            report_timestamp,
            backed_up.join("\n")
        );
        if !failed.is_empty() {
            body.push_str("\n\nThe following files failed to back up:\n");
            body.push_str(&failed.join("\n"));
        }

        NotificationMessage {
            subject: SUCCESS_SUBJECT.to_string(),
            body,
        }
    }

    pub fn failure(failed: &[String]) -> Self {
        NotificationMessage {
            subject: FAILURE_SUBJECT.to_string(),
            body: format!(
                "No database files were backed up successfully.\nThe following files failed to back up:\n{}",
                failed.join("\n")
            ),
        }
    }
}
