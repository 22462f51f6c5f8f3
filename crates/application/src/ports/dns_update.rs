use async_trait::async_trait;
use ferrous_rpz_domain::{DomainError, UpdateRcode};

/// One reverse-mapping change inside an update transaction. `terminal: None`
/// deletes the PTR/TXT pair at the owner instead of replacing it.
#[derive(Debug, Clone, PartialEq)]
pub struct PtrUpdate {
    pub reverse_name: String,
    pub terminal: Option<String>,
    pub txt: Option<String>,
}

/// A single dynamic-update transaction against the zone master.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub zone: String,
    pub updates: Vec<PtrUpdate>,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateResponse {
    pub rcode: UpdateRcode,
    pub request_bytes: usize,
    pub response_bytes: usize,
}

/// Port for the RFC 2136 client speaking to the zone master.
#[async_trait]
pub trait DnsUpdatePort: Send + Sync {
    /// Send one update transaction and wait for the response. Transport
    /// failures (including timeout) surface as `UpdateTransportFailure`.
    async fn send_update(&self, request: UpdateRequest) -> Result<UpdateResponse, DomainError>;
}
