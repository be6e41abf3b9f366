// Recovery interceptor: contains panics raised downstream and turns them into
// an INTERNAL Structured Error.

use super::panic_guard::{execute_guarded_async, install_backtrace_hook, PanicGuardResult};
use super::{CallContext, Interceptor, Next, Outcome};
use crate::domain::errcode;
use async_trait::async_trait;
use tracing::error;

#[derive(Debug)]
pub struct Recovery {
    _private: (),
}

impl Recovery {
    pub fn new() -> Self {
        install_backtrace_hook();
        Self { _private: () }
    }
}

impl Default for Recovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for Recovery {
    fn name(&self) -> &'static str {
        "recovery"
    }

    async fn invoke(&self, ctx: &mut CallContext, next: Next<'_>) -> Outcome {
        let method = ctx.method().to_string();
        match execute_guarded_async(next.run(ctx)).await {
            PanicGuardResult::Success(outcome) => outcome,
            PanicGuardResult::Panicked(fault) => {
                error!(
                    method = %method,
                    panic = %fault.message,
                    stack = %fault.backtrace,
                    "recovery log"
                );
                Err(errcode::SERVER_ERROR.to_status())
            }
        }
    }
}
