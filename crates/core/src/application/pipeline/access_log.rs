// AccessLog interceptor: one line when a call arrives, one when it completes

use super::{CallContext, Interceptor, Next, Outcome};
use crate::port::TimeProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct AccessLog {
    clock: Arc<dyn TimeProvider>,
}

impl AccessLog {
    pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Interceptor for AccessLog {
    fn name(&self) -> &'static str {
        "access_log"
    }

    async fn invoke(&self, ctx: &mut CallContext, next: Next<'_>) -> Outcome {
        let begin_time = ctx.received_at();
        info!(
            method = %ctx.method(),
            begin_time,
            request = ?ctx.request(),
            "access request log"
        );

        let outcome = next.run(ctx).await;

        let code = match &outcome {
            Ok(_) => "OK",
            Err(status) => status.code().as_str(),
        };
        info!(
            method = %ctx.method(),
            begin_time,
            end_time = self.clock.now_millis(),
            response = ?outcome.as_ref().ok(),
            code,
            "access response log"
        );
        outcome
    }
}
