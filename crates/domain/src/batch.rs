use crate::address::RpzAddress;
use crate::errors::DomainError;
use std::fmt;

/// Lifecycle of one refresh batch. Transitions are one-way:
/// `New → Accumulating → Writing → Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    New,
    Accumulating,
    Writing,
    Complete,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::New => "new",
            BatchState::Accumulating => "accumulating",
            BatchState::Writing => "writing",
            BatchState::Complete => "complete",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DNS response codes the update path can see, kept free of the wire library
/// so the domain stays transport-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRcode {
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    YXDomain,
    YXRRSet,
    NXRRSet,
    NotAuth,
    NotZone,
    Other(u16),
}

impl UpdateRcode {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => UpdateRcode::NoError,
            1 => UpdateRcode::FormErr,
            2 => UpdateRcode::ServFail,
            3 => UpdateRcode::NXDomain,
            4 => UpdateRcode::NotImp,
            5 => UpdateRcode::Refused,
            6 => UpdateRcode::YXDomain,
            7 => UpdateRcode::YXRRSet,
            8 => UpdateRcode::NXRRSet,
            9 => UpdateRcode::NotAuth,
            10 => UpdateRcode::NotZone,
            other => UpdateRcode::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateRcode::NoError => "NOERROR",
            UpdateRcode::FormErr => "FORMERR",
            UpdateRcode::ServFail => "SERVFAIL",
            UpdateRcode::NXDomain => "NXDOMAIN",
            UpdateRcode::NotImp => "NOTIMP",
            UpdateRcode::Refused => "REFUSED",
            UpdateRcode::YXDomain => "YXDOMAIN",
            UpdateRcode::YXRRSet => "YXRRSET",
            UpdateRcode::NXRRSet => "NXRRSET",
            UpdateRcode::NotAuth => "NOTAUTH",
            UpdateRcode::NotZone => "NOTZONE",
            UpdateRcode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for UpdateRcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRcode::Other(code) => write!(f, "RCODE{}", code),
            other => f.write_str(other.as_str()),
        }
    }
}

/// One unit of zone-refresh work: the addresses sheared out of the cache
/// since the last write, plus the per-batch statistics retained in the
/// refresh log.
#[derive(Debug, Clone)]
pub struct Batch {
    created_at: f64,
    state: BatchState,
    add_calls: u64,
    addresses: Vec<RpzAddress>,
    pub elapsed_accumulating: f64,
    pub elapsed_processing: f64,
    pub wire_request_bytes: usize,
    pub wire_response_bytes: usize,
    pub rcode: Option<UpdateRcode>,
    pub transport_error: Option<String>,
}

impl Batch {
    pub fn new(now: f64) -> Self {
        Self {
            created_at: now,
            state: BatchState::New,
            add_calls: 0,
            addresses: Vec::new(),
            elapsed_accumulating: 0.0,
            elapsed_processing: 0.0,
            wire_request_bytes: 0,
            wire_response_bytes: 0,
            rcode: None,
            transport_error: None,
        }
    }

    /// Attempt to append an address. Every call counts toward `add_calls`;
    /// appends past `cap` (or outside the accumulation states) are dropped
    /// and reported as `false`.
    pub fn try_add(&mut self, address: RpzAddress, cap: usize) -> bool {
        self.add_calls += 1;
        match self.state {
            BatchState::New | BatchState::Accumulating if self.addresses.len() < cap => {
                self.addresses.push(address);
                self.state = BatchState::Accumulating;
                true
            }
            _ => false,
        }
    }

    pub fn promote_to_writing(&mut self, now: f64) -> Result<(), DomainError> {
        if self.state != BatchState::Accumulating {
            return Err(DomainError::InvariantViolation(format!(
                "batch promotion from state '{}'",
                self.state
            )));
        }
        self.elapsed_accumulating = (now - self.created_at).max(0.0);
        self.state = BatchState::Writing;
        Ok(())
    }

    pub fn complete(
        &mut self,
        write_started: f64,
        now: f64,
        rcode: Option<UpdateRcode>,
        transport_error: Option<String>,
    ) -> Result<(), DomainError> {
        if self.state != BatchState::Writing {
            return Err(DomainError::InvariantViolation(format!(
                "batch completion from state '{}'",
                self.state
            )));
        }
        self.elapsed_processing = (now - write_started).max(0.0);
        self.rcode = rcode;
        self.transport_error = transport_error;
        self.state = BatchState::Complete;
        Ok(())
    }

    pub fn succeeded(&self) -> bool {
        self.state == BatchState::Complete
            && self.rcode == Some(UpdateRcode::NoError)
            && self.transport_error.is_none()
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn add_calls(&self) -> u64 {
        self.add_calls
    }

    pub fn addresses(&self) -> &[RpzAddress] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
