// Tag Service Core - Domain, Interceptor Pipeline, Error Translator & Ports
// NO transport or storage dependencies (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
