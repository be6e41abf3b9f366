// Port Layer - Interfaces for external dependencies

pub mod tag_repository;
pub mod tag_service;
pub mod time_provider;

// Re-exports
pub use tag_repository::TagRepository;
pub use tag_service::TagService;
pub use time_provider::TimeProvider;
