use crate::errors::DomainError;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Canonical client address keying an association.
///
/// Stored as `std::net::IpAddr`, so v6 literals always render in RFC 5952
/// compressed form regardless of how the telemetry producer wrote them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RpzAddress(IpAddr);

impl RpzAddress {
    pub fn parse(literal: &str) -> Result<Self, DomainError> {
        let trimmed = literal.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidTelemetry("empty address".to_string()));
        }
        trimmed
            .parse::<IpAddr>()
            .map(Self)
            .map_err(|e| DomainError::InvalidTelemetry(format!("address '{}': {}", trimmed, e)))
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }

    pub fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }

    /// Absolute reverse-mapping owner name for this address, e.g.
    /// `5.66.2.10.in-addr.arpa.` or the nibble form under `ip6.arpa.`.
    pub fn reverse_name(&self) -> String {
        match self.0 {
            IpAddr::V4(v4) => {
                let o = v4.octets();
                format!("{}.{}.{}.{}.in-addr.arpa.", o[3], o[2], o[1], o[0])
            }
            IpAddr::V6(v6) => {
                let mut name = String::with_capacity(74);
                for byte in v6.octets().iter().rev() {
                    name.push(char::from_digit((byte & 0x0f) as u32, 16).unwrap_or('0'));
                    name.push('.');
                    name.push(char::from_digit((byte >> 4) as u32, 16).unwrap_or('0'));
                    name.push('.');
                }
                name.push_str("ip6.arpa.");
                name
            }
        }
    }

    /// Inverse of [`reverse_name`](Self::reverse_name). Returns `None` when
    /// the owner does not match either reverse-address pattern.
    pub fn from_reverse_name(owner: &str) -> Option<Self> {
        let owner = owner.trim().to_ascii_lowercase();
        let owner = owner.strip_suffix('.').unwrap_or(&owner);

        if let Some(prefix) = owner.strip_suffix(".in-addr.arpa") {
            let labels: Vec<&str> = prefix.split('.').collect();
            if labels.len() != 4 {
                return None;
            }
            let mut octets = [0u8; 4];
            for (i, label) in labels.iter().enumerate() {
                octets[3 - i] = u8::from_str(label).ok()?;
            }
            return Some(Self(IpAddr::V4(Ipv4Addr::from(octets))));
        }

        if let Some(prefix) = owner.strip_suffix(".ip6.arpa") {
            let labels: Vec<&str> = prefix.split('.').collect();
            if labels.len() != 32 {
                return None;
            }
            let mut bits: u128 = 0;
            // labels run least-significant nibble first
            for label in labels.iter().rev() {
                if label.len() != 1 {
                    return None;
                }
                let nibble = u8::from_str_radix(label, 16).ok()?;
                bits = (bits << 4) | nibble as u128;
            }
            return Some(Self(IpAddr::V6(Ipv6Addr::from(bits))));
        }

        None
    }
}

impl fmt::Display for RpzAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<IpAddr> for RpzAddress {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}
