//! Interceptor Pipeline
//!
//! An ordered chain of cross-cutting behaviours wrapped around every RPC Service
//! invocation. The chain is composed once at startup and shared read-only by all
//! calls; each call owns its own [`CallContext`].
//!
//! Interceptors run in declaration order, outermost first. An interceptor hands
//! control downstream by consuming its [`Next`]; `Next::run` takes `self` by
//! value so it cannot be called twice. Returning without calling it
//! short-circuits the rest of the chain, the RPC Service included.
//!
//! Standard order (see [`Pipeline::standard`]): `AccessLog`, `ErrorLog`,
//! `Recovery`. Only interceptors nested inside `Recovery` are protected from
//! panics; anything declared outside it must not panic.

pub mod access_log;
pub mod error_log;
mod panic_guard;
pub mod recovery;

pub use access_log::AccessLog;
pub use error_log::ErrorLog;
pub use panic_guard::{execute_guarded_async, install_backtrace_hook, Fault, PanicGuardResult};
pub use recovery::Recovery;

use crate::domain::Status;
use crate::port::time_provider::SystemTimeProvider;
use crate::port::TimeProvider;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Anything that can travel through the pipeline as a request or response
pub trait Message: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + fmt::Debug + Send + Sync> Message for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Type-erased request or response
pub type Payload = Arc<dyn Message>;

/// Result of one call: exactly one of response or Structured Error
pub type Outcome = Result<Payload, Status>;

type Terminal<'a> = Box<dyn FnOnce(Payload) -> BoxFuture<'a, Outcome> + Send + 'a>;

/// Per-call state threaded through the pipeline
pub struct CallContext {
    method: String,
    received_at: i64,
    request: Payload,
    outcome: Option<Outcome>,
}

impl CallContext {
    pub fn new(method: impl Into<String>, received_at: i64, request: Payload) -> Self {
        Self {
            method: method.into(),
            received_at,
            request,
            outcome: None,
        }
    }

    /// Full RPC method name, e.g. `/tag_service.TagService/GetTag`
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Arrival time (ms since epoch)
    pub fn received_at(&self) -> i64 {
        self.received_at
    }

    pub fn request(&self) -> &Payload {
        &self.request
    }

    /// Outcome produced downstream, set once `Next::run` returns
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    fn record(&mut self, outcome: &Outcome) {
        self.outcome = Some(outcome.clone());
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("method", &self.method)
            .field("received_at", &self.received_at)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// A cross-cutting unit wrapped around the RPC Service call
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Handle one call; call `next.run(ctx)` to continue, or return early to short-circuit
    async fn invoke(&self, ctx: &mut CallContext, next: Next<'_>) -> Outcome;
}

/// The remainder of the chain, ending at the RPC Service
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    terminal: Terminal<'a>,
}

impl<'a> Next<'a> {
    /// Run the remaining interceptors and then the RPC Service
    pub async fn run(self, ctx: &mut CallContext) -> Outcome {
        let outcome = match self.rest.split_first() {
            Some((head, rest)) => {
                let next = Next {
                    rest,
                    terminal: self.terminal,
                };
                head.invoke(ctx, next).await
            }
            None => (self.terminal)(Arc::clone(&ctx.request)).await,
        };
        ctx.record(&outcome);
        outcome
    }
}

/// Immutable, ordered interceptor chain
pub struct Pipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
    clock: Arc<dyn TimeProvider>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// AccessLog -> ErrorLog -> Recovery -> service
    pub fn standard(clock: Arc<dyn TimeProvider>) -> Self {
        Self::builder()
            .clock(Arc::clone(&clock))
            .with(AccessLog::new(clock))
            .with(ErrorLog::new())
            .with(Recovery::new())
            .build()
    }

    /// Interceptor names in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run one typed call through the chain
    ///
    /// `handler` is the terminal RPC Service invocation; it runs at most once
    /// and not at all if an interceptor short-circuits.
    pub async fn call<'a, Req, Resp, F, Fut>(
        &'a self,
        method: &str,
        request: Req,
        handler: F,
    ) -> Result<Resp, Status>
    where
        Req: Message + Clone,
        Resp: Message + Clone,
        F: FnOnce(Req) -> Fut + Send + 'a,
        Fut: Future<Output = Result<Resp, Status>> + Send + 'a,
    {
        let mut ctx = CallContext::new(method, self.clock.now_millis(), Arc::new(request));
        let terminal: Terminal<'a> = Box::new(move |payload: Payload| {
            Box::pin(async move {
                let request = downcast::<Req>(payload)?;
                let response = handler(request).await?;
                Ok(Arc::new(response) as Payload)
            })
        });

        let next = Next {
            rest: &self.interceptors,
            terminal,
        };
        next.run(&mut ctx).await.and_then(downcast::<Resp>)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("interceptors", &self.names())
            .finish()
    }
}

/// Startup-time composition of a [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
    clock: Option<Arc<dyn TimeProvider>>,
}

impl PipelineBuilder {
    /// Append an interceptor (it runs inside every previously added one)
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Clock used to stamp `CallContext::received_at`
    pub fn clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            interceptors: self.interceptors,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemTimeProvider)),
        }
    }
}

fn downcast<T: Message + Clone>(payload: Payload) -> Result<T, Status> {
    payload
        .into_any()
        .downcast::<T>()
        .map(Arc::unwrap_or_clone)
        .map_err(|_| {
            Status::internal(format!(
                "pipeline payload type mismatch: expected {}",
                std::any::type_name::<T>()
            ))
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::fmt::Debug;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};

    #[derive(Debug, Clone)]
    pub struct Record {
        pub level: Level,
        pub message: String,
        pub fields: HashMap<String, String>,
    }

    /// Tracing layer that keeps every event in memory
    #[derive(Clone, Default)]
    pub struct LogCapture {
        records: Arc<Mutex<Vec<Record>>>,
    }

    impl LogCapture {
        pub fn records(&self) -> Vec<Record> {
            self.records.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.records().into_iter().map(|r| r.message).collect()
        }

        pub fn find(&self, message: &str) -> Vec<Record> {
            self.records()
                .into_iter()
                .filter(|r| r.message == message)
                .collect()
        }
    }

    #[derive(Default)]
    struct FieldVisitor {
        message: String,
        fields: HashMap<String, String>,
    }

    impl Visit for FieldVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "message" {
                self.message = value.to_string();
            } else {
                self.fields
                    .insert(field.name().to_string(), value.to_string());
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            if field.name() == "message" {
                self.message = format!("{:?}", value);
            } else {
                self.fields
                    .insert(field.name().to_string(), format!("{:?}", value));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for LogCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.records.lock().unwrap().push(Record {
                level: *event.metadata().level(),
                message: visitor.message,
                fields: visitor.fields,
            });
        }
    }

    /// Install a capture layer as the thread-default subscriber
    pub fn capture() -> (LogCapture, tracing::subscriber::DefaultGuard) {
        use tracing_subscriber::layer::SubscriberExt;

        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::capture;
    use super::*;
    use crate::domain::{Code, Detail, TypedError};
    use crate::port::time_provider::FixedTimeProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Pong(u32);

    /// Records "<name>:before" / "<name>:after" around `next`
    struct Trace {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Interceptor for Trace {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn invoke(&self, ctx: &mut CallContext, next: Next<'_>) -> Outcome {
            self.journal.lock().unwrap().push(format!("{}:before", self.name));
            let outcome = next.run(ctx).await;
            self.journal.lock().unwrap().push(format!("{}:after", self.name));
            outcome
        }
    }

    /// Answers without calling downstream
    struct Deny;

    #[async_trait]
    impl Interceptor for Deny {
        fn name(&self) -> &'static str {
            "deny"
        }

        async fn invoke(&self, _ctx: &mut CallContext, _next: Next<'_>) -> Outcome {
            Err(Status::new(Code::PermissionDenied, "denied"))
        }
    }

    /// Answers with a canned response without calling downstream
    struct Cached;

    #[async_trait]
    impl Interceptor for Cached {
        fn name(&self) -> &'static str {
            "cached"
        }

        async fn invoke(&self, _ctx: &mut CallContext, _next: Next<'_>) -> Outcome {
            Ok(Arc::new(Pong(999)))
        }
    }

    fn traced(names: &[&'static str], journal: &Arc<Mutex<Vec<String>>>) -> PipelineBuilder {
        names.iter().fold(Pipeline::builder(), |b, &name| {
            b.with(Trace {
                name,
                journal: Arc::clone(journal),
            })
        })
    }

    #[tokio::test]
    async fn test_interceptors_run_in_declaration_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let pipeline = traced(&["a", "b", "c"], &journal).build();

        let calls = AtomicUsize::new(0);
        let result = pipeline
            .call("/test.Svc/Echo", Ping(1), |req: Ping| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(Pong(req.0 + 1)) }
            })
            .await;

        assert_eq!(result.unwrap(), Pong(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["a:before", "b:before", "c:before", "c:after", "b:after", "a:after"]
        );
    }

    #[tokio::test]
    async fn test_long_chain_invokes_service_once() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let names: Vec<&'static str> = vec!["i"; 32];
        let pipeline = traced(&names, &journal).build();
        assert_eq!(pipeline.len(), 32);

        let calls = AtomicUsize::new(0);
        pipeline
            .call("/test.Svc/Echo", Ping(0), |_req: Ping| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Pong(0)) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(journal.lock().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_empty_pipeline_calls_service_directly() {
        let pipeline = Pipeline::builder().build();
        assert!(pipeline.is_empty());

        let result = pipeline
            .call("/test.Svc/Echo", Ping(5), |req: Ping| async move { Ok(Pong(req.0)) })
            .await;
        assert_eq!(result.unwrap(), Pong(5));
    }

    #[tokio::test]
    async fn test_short_circuit_skips_downstream() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let pipeline = traced(&["outer"], &journal)
            .with(Deny)
            .with(Trace {
                name: "inner",
                journal: Arc::clone(&journal),
            })
            .build();

        let calls = AtomicUsize::new(0);
        let err = pipeline
            .call("/test.Svc/Echo", Ping(1), |_req: Ping| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Pong(1)) }
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), Code::PermissionDenied);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*journal.lock().unwrap(), vec!["outer:before", "outer:after"]);
    }

    #[tokio::test]
    async fn test_short_circuit_with_response() {
        let pipeline = Pipeline::builder().with(Cached).build();
        let calls = AtomicUsize::new(0);
        let result = pipeline
            .call("/test.Svc/Echo", Ping(1), |_req: Ping| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Pong(1)) }
            })
            .await;

        assert_eq!(result.unwrap(), Pong(999));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_circuit_with_wrong_type_is_internal() {
        struct Wrong;

        #[async_trait]
        impl Interceptor for Wrong {
            fn name(&self) -> &'static str {
                "wrong"
            }

            async fn invoke(&self, _ctx: &mut CallContext, _next: Next<'_>) -> Outcome {
                Ok(Arc::new("not a pong"))
            }
        }

        let pipeline = Pipeline::builder().with(Wrong).build();
        let err = pipeline
            .call("/test.Svc/Echo", Ping(1), |_req: Ping| async { Ok(Pong(1)) })
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
    }

    #[tokio::test]
    async fn test_context_records_downstream_outcome() {
        struct Inspect(Arc<Mutex<Option<bool>>>);

        #[async_trait]
        impl Interceptor for Inspect {
            fn name(&self) -> &'static str {
                "inspect"
            }

            async fn invoke(&self, ctx: &mut CallContext, next: Next<'_>) -> Outcome {
                assert!(ctx.outcome().is_none());
                assert_eq!(ctx.method(), "/test.Svc/Echo");
                assert_eq!(ctx.received_at(), 1_700_000_000_000);
                let outcome = next.run(ctx).await;
                *self.0.lock().unwrap() = ctx.outcome().map(|o| o.is_ok());
                outcome
            }
        }

        let seen = Arc::new(Mutex::new(None));
        let pipeline = Pipeline::builder()
            .clock(Arc::new(FixedTimeProvider(1_700_000_000_000)))
            .with(Inspect(Arc::clone(&seen)))
            .build();

        pipeline
            .call("/test.Svc/Echo", Ping(1), |_req: Ping| async {
                Err::<Pong, _>(Status::not_found("nope"))
            })
            .await
            .unwrap_err();
        assert_eq!(*seen.lock().unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_standard_pipeline_order() {
        let pipeline = Pipeline::standard(Arc::new(SystemTimeProvider));
        assert_eq!(pipeline.names(), vec!["access_log", "error_log", "recovery"]);
    }

    #[tokio::test]
    async fn test_standard_pipeline_success_logs() {
        let (logs, _guard) = capture();
        let pipeline = Pipeline::standard(Arc::new(FixedTimeProvider(1_000)));

        let result = pipeline
            .call("/tag_service.TagService/GetTag", Ping(7), |req: Ping| async move {
                Ok(Pong(req.0))
            })
            .await;
        assert_eq!(result.unwrap(), Pong(7));

        assert_eq!(
            logs.messages(),
            vec!["access request log", "access response log"]
        );
        let begin = &logs.find("access request log")[0];
        assert_eq!(begin.fields["method"], "/tag_service.TagService/GetTag");
        assert_eq!(begin.fields["begin_time"], "1000");
        assert!(logs.find("error log").is_empty());
    }

    #[tokio::test]
    async fn test_standard_pipeline_declared_error_is_forwarded_and_logged() {
        let (logs, _guard) = capture();
        let pipeline = Pipeline::standard(Arc::new(SystemTimeProvider));

        let status = Status::not_found("tag missing")
            .with_detail(Detail::Error(TypedError::new(40401, "no such tag")));
        let expected = status.clone();
        let err = pipeline
            .call("/tag_service.TagService/GetTag", Ping(7), move |_req: Ping| async move {
                Err::<Pong, _>(status)
            })
            .await
            .unwrap_err();

        assert_eq!(err, expected);
        assert_eq!(
            logs.messages(),
            vec!["access request log", "error log", "access response log"]
        );
        let error_log = &logs.find("error log")[0];
        assert_eq!(error_log.fields["code"], "NOT_FOUND");
        assert_eq!(error_log.fields["status_message"], "tag missing");
        assert!(error_log.fields["details"].contains("40401"));
    }

    #[tokio::test]
    async fn test_standard_pipeline_contains_panic() {
        let (logs, _guard) = capture();
        let pipeline = Pipeline::standard(Arc::new(SystemTimeProvider));

        let err = pipeline
            .call("/tag_service.TagService/GetTag", Ping(7), |_req: Ping| async move {
                if true {
                    panic!("service exploded");
                }
                Ok(Pong(0))
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), Code::Internal);
        assert_eq!(
            logs.messages(),
            vec![
                "access request log",
                "recovery log",
                "error log",
                "access response log"
            ]
        );
        let recovery = &logs.find("recovery log")[0];
        assert_eq!(recovery.fields["panic"], "service exploded");
        assert!(recovery.fields.contains_key("stack"));
    }
}
