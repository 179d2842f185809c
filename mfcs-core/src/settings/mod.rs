pub mod config;
pub mod manager;

pub use config::{FamilyTags, Settings};
pub use manager::SettingsManager;
