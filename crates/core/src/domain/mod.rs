// Domain Layer - Pure business logic and entities

pub mod errcode;
pub mod error;
pub mod status;
pub mod tag;

// Re-exports
pub use errcode::BizError;
pub use error::DomainError;
pub use status::{Code, Detail, Status, TypedError};
pub use tag::{NewTag, PageRequest, Tag, TagFilter, TagId, TagPage, TagState};
