//! Shared harness: a real server on an ephemeral port plus in-memory log capture

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tagsvc_api_rpc::{RpcServer, ServerConfig, ServerHandle};
use tagsvc_core::application::Pipeline;
use tagsvc_core::port::time_provider::SystemTimeProvider;
use tagsvc_core::port::TagService;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub async fn start_server(service: Arc<dyn TagService>) -> ServerHandle {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    let pipeline = Arc::new(Pipeline::standard(Arc::new(SystemTimeProvider)));
    RpcServer::new(config, pipeline, service)
        .start()
        .await
        .expect("server should start")
}

pub fn base_url(handle: &ServerHandle) -> String {
    format!("http://{}", handle.local_addr())
}

#[derive(Debug, Clone)]
pub struct Record {
    pub message: String,
    pub fields: HashMap<String, String>,
}

/// Keeps every tracing event emitted on the test thread
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<Record>>>,
}

impl LogCapture {
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Records with this message whose `method` field equals `method`
    pub fn for_method(&self, message: &str, method: &str) -> Vec<Record> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.message == message)
            .filter(|r| r.fields.get("method").map(String::as_str) == Some(method))
            .cloned()
            .collect()
    }

    /// Pipeline messages (access/error/recovery) in emission order
    pub fn pipeline_messages(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.ends_with(" log"))
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
            self.fields.insert(field.name().to_string(), value.to_string());
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
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Thread-default capture; tests run on the current-thread runtime so server
/// tasks emit on this thread too
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
