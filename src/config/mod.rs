/// Database connection and schema management
pub mod database;

/// Application settings loaded from `sdg.toml` and the environment
pub mod settings;
