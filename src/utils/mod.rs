pub mod directory;
pub mod progress;
