//! Scripted transport for driving the dispatcher without a network.

use async_trait::async_trait;
use hoyostats::core::kernel::transport::{HttpRequest, Transport, TransportError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Route dispatcher traces to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Replays a queue of canned responses and records every request it saw.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("transport script exhausted"))
    }
}

pub fn ok_body(data: Value) -> Result<Value, TransportError> {
    Ok(json!({"retcode": 0, "message": "OK", "data": data}))
}

pub fn error_body(retcode: i32, message: &str) -> Result<Value, TransportError> {
    Ok(json!({"retcode": retcode, "message": message, "data": null}))
}

pub fn rate_limited_body() -> Result<Value, TransportError> {
    error_body(10101, "Cannot get data for more than 30 accounts per day.")
}

pub fn connect_fault() -> Result<Value, TransportError> {
    Err(TransportError::Connect("connection refused".to_string()))
}
