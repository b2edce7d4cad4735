pub mod backup;
pub mod notifier;
pub mod scheduler;
