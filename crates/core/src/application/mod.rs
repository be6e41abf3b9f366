// Application Layer - Interceptor pipeline, error translation, Tag Service

pub mod pipeline;
pub mod tag_catalog;
pub mod translator;

// Re-exports
pub use pipeline::{
    AccessLog, CallContext, ErrorLog, Interceptor, Message, Next, Outcome, Payload, Pipeline,
    PipelineBuilder, Recovery,
};
pub use tag_catalog::TagCatalog;
pub use translator::{
    error_to_http_envelope, http_status_from_code, to_http_envelope, HttpError, HttpErrorBody,
    JSON_CONTENT_TYPE,
};
