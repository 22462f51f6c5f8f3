use async_trait::async_trait;
use ferrous_rpz_application::ports::{DnsUpdatePort, UpdateRequest, UpdateResponse};
use ferrous_rpz_domain::{DomainError, UpdateRcode};
use std::sync::Mutex;
use std::time::Duration;

/// Scriptable stand-in for the RFC 2136 client: records every request and
/// answers with a configurable rcode, transport failure or delay.
pub struct MockDnsUpdatePort {
    requests: Mutex<Vec<UpdateRequest>>,
    rcode: Mutex<UpdateRcode>,
    transport_failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
}

impl MockDnsUpdatePort {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            rcode: Mutex::new(UpdateRcode::NoError),
            transport_failure: Mutex::new(None),
            delay: Mutex::new(None),
        }
    }

    pub fn set_rcode(&self, rcode: UpdateRcode) {
        *self.rcode.lock().unwrap() = rcode;
    }

    pub fn set_transport_failure(&self, message: &str) {
        *self.transport_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<UpdateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DnsUpdatePort for MockDnsUpdatePort {
    async fn send_update(&self, request: UpdateRequest) -> Result<UpdateResponse, DomainError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.transport_failure.lock().unwrap().clone() {
            return Err(DomainError::UpdateTransportFailure(message));
        }
        let request_bytes = 64 + request.updates.len() * 48;
        let rcode = *self.rcode.lock().unwrap();
        self.requests.lock().unwrap().push(request);
        Ok(UpdateResponse {
            rcode,
            request_bytes,
            response_bytes: 64,
        })
    }
}
