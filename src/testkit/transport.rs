//! Scripted [`Transport`] for orchestrator and adapter tests.
//!
//! Each `send` pops the next queued result. When the queue is empty the
//! responder (if set) decides, otherwise `200 {}` is returned. Every call is
//! recorded along with the token it carried.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::port::{ApiRequest, ApiResponse, Transport};

type Responder = Box<dyn Fn(&ApiRequest, Option<&str>) -> ApiResponse + Send + Sync>;

pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Result<ApiResponse>>>,
    responder: Option<Responder>,
    delay: Duration,
    requests: Mutex<Vec<ApiRequest>>,
    tokens: Mutex<Vec<Option<String>>>,
    calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
        }
    }

    /// Answer unscripted calls with `responder`.
    pub fn with_responder(
        mut self,
        responder: impl Fn(&ApiRequest, Option<&str>) -> ApiResponse + Send + Sync + 'static,
    ) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Hold every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push(&self, response: ApiResponse) {
        self.queue.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_err(&self, error: crate::error::Error) {
        self.queue.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in progress at once.
    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Bearer token carried by each call, in call order.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.tokens.lock().unwrap().push(token.map(str::to_string));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self.queue.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(match self.responder {
                Some(ref responder) => responder(request, token),
                None => ApiResponse::new(200, "{}"),
            }),
        }
    }
}
