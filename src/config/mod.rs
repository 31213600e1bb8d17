/// Product catalog entries from config.toml
pub mod catalog;

/// Database connection and schema creation
pub mod database;

/// Application settings file
pub mod settings;
