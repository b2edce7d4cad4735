use crate::models::error::{BackupError, Result};
use chrono::{DateTime, Local};
use cron::Schedule;
use log::{info, warn};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How often the loop wakes up to check the clock and the shutdown flag.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Cron schedule evaluated in local time. Jobs run on the calling thread, so a
/// slow run delays the next check instead of overlapping with it.
pub struct BackupScheduler {
    expression: String,
    schedule: Schedule,
    poll_interval: Duration,
}

impl BackupScheduler {
    pub fn new(expression: &str) -> Result<Self> {
        let schedule =
            Schedule::from_str(expression).map_err(|cause| BackupError::InvalidSchedule {
                expression: expression.to_string(),
                cause,
            })?;
        Ok(BackupScheduler {
            expression: expression.to_string(),
            schedule,
            poll_interval: POLL_INTERVAL,
        })
    }

    #[cfg(test)]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn next_run_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }

    /// Calls `job` every time the schedule fires until `running` is cleared.
    pub fn run_until<F: FnMut()>(&self, running: &AtomicBool, mut job: F) {
        info!(
            "Starting scheduled backup mode with schedule: {}",
            self.expression
        );

        let Some(mut next) = self.next_run_after(&Local::now()) else {
            warn!("No upcoming scheduled times found");
            return;
        };
        log_next_run(&next);

        while running.load(Ordering::SeqCst) {
            let now = Local::now();

            if now >= next {
                info!("Running scheduled backup...");
                job();

                match self.next_run_after(&Local::now()) {
                    Some(upcoming) => {
                        next = upcoming;
                        log_next_run(&next);
                    }
                    None => {
                        warn!("No upcoming scheduled times found");
                        break;
                    }
                }
                continue;
            }

            let until_next = (next - now).to_std().unwrap_or(Duration::ZERO);
            std::thread::sleep(until_next.min(self.poll_interval));
        }

        info!("Scheduler stopped");
    }
}

fn log_next_run(next: &DateTime<Local>) {
    let seconds = (*next - Local::now()).num_seconds().max(0);
    info!(
        "Next backup scheduled for: {} (in {} seconds)",
        next.format("%Y-%m-%d %H:%M:%S %Z"),
        seconds
    );
}
