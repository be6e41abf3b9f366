// Tag Service Infrastructure - SQLite Adapter
// Implements: TagRepository

mod connection;
mod migration;
mod tag_repository;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use tag_repository::SqliteTagRepository;

// Note: sqlx::Error conversion is handled by a helper function
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
