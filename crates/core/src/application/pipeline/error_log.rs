// ErrorLog interceptor: logs every Structured Error leaving the service.
// The outcome is always forwarded unchanged.

use super::{CallContext, Interceptor, Next, Outcome};
use async_trait::async_trait;
use tracing::error;

#[derive(Debug, Default)]
pub struct ErrorLog;

impl ErrorLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Interceptor for ErrorLog {
    fn name(&self) -> &'static str {
        "error_log"
    }

    async fn invoke(&self, ctx: &mut CallContext, next: Next<'_>) -> Outcome {
        let outcome = next.run(ctx).await;
        if let Err(status) = &outcome {
            error!(
                method = %ctx.method(),
                code = status.code().as_str(),
                status_message = status.message(),
                details = ?status.details(),
                "error log"
            );
        }
        outcome
    }
}
