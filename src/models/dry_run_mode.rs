/// Defines the dry-run behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunMode {
    /// Normal operation - copy files and send the report
    None,

    /// Quick preview - only list the files that would be backed up
    Quick,

    /// Full simulation - list candidates and compose the report, but log it
    /// instead of copying files or sending mail
    Full,
}

impl DryRunMode {
    /// Returns true if this is any dry-run mode (Quick or Full)
    pub fn is_dry_run(&self) -> bool {
        matches!(self, DryRunMode::Quick | DryRunMode::Full)
    }

    /// Returns true if files should actually be copied
    pub fn should_copy_files(&self) -> bool {
        matches!(self, DryRunMode::None)
    }

    /// Returns true if the report should be composed at all
    pub fn should_compose_report(&self) -> bool {
        !matches!(self, DryRunMode::Quick)
    }

    /// Returns true if the report should go out over SMTP
    pub fn should_send_email(&self) -> bool {
        matches!(self, DryRunMode::None)
    }

    /// Get display string for progress bars and log lines
    pub fn progress_prefix(&self) -> &'static str {
        match self {
            DryRunMode::None => "",
            DryRunMode::Quick => "[DRY RUN - QUICK] ",
            DryRunMode::Full => "[DRY RUN - FULL] ",
        }
    }
}
