//! RFC 2136 dynamic-update client.
//!
//! Builds one update message per batch with `hickory-proto` and sends it to
//! the zone master over TCP. Each address's PTR/TXT RRsets are deleted
//! (class ANY) and, when the address still has a best resolution, re-added
//! in the same transaction, so a batch is atomic from the zone's viewpoint.

use async_trait::async_trait;
use ferrous_rpz_application::ports::{DnsUpdatePort, PtrUpdate, UpdateRequest, UpdateResponse};
use ferrous_rpz_domain::{DomainError, UpdateRcode};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{PTR, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const RECORD_TTL: u32 = 600;

pub struct Rfc2136UpdateClient {
    target: String,
    timeout: Duration,
}

impl Rfc2136UpdateClient {
    pub fn new(target: String, timeout_secs: u64) -> Self {
        Self {
            target,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build the update message: zone section names the zone, the update
    /// section carries the per-address deletes and adds.
    pub fn build_update_message(
        zone: &str,
        updates: &[PtrUpdate],
    ) -> Result<Message, DomainError> {
        let zone_name = Name::from_str(zone).map_err(|e| {
            DomainError::UpdateTransportFailure(format!("invalid zone name '{}': {}", zone, e))
        })?;

        let mut query = Query::new();
        query.set_name(zone_name);
        query.set_query_type(RecordType::SOA);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Update);
        message.add_query(query);

        for update in updates {
            // RPZ trigger encoding: the reverse owner lives inside the zone
            let encoded = format!("{}{}", update.reverse_name, zone);
            let owner = Name::from_str(&encoded).map_err(|e| {
                DomainError::UpdateTransportFailure(format!("invalid owner '{}': {}", encoded, e))
            })?;

            // clear both RRsets at the owner, then re-add when publishing
            for record_type in [RecordType::PTR, RecordType::TXT] {
                let mut delete = Record::from_rdata(owner.clone(), 0, RData::Update0(record_type));
                delete.set_dns_class(DNSClass::ANY);
                message.add_name_server(delete);
            }

            if let Some(terminal) = &update.terminal {
                let target = Name::from_str(terminal).map_err(|e| {
                    DomainError::UpdateTransportFailure(format!(
                        "invalid terminal '{}': {}",
                        terminal, e
                    ))
                })?;
                let mut ptr = Record::from_rdata(owner.clone(), RECORD_TTL, RData::PTR(PTR(target)));
                ptr.set_dns_class(DNSClass::IN);
                message.add_name_server(ptr);

                if let Some(txt) = &update.txt {
                    let mut meta = Record::from_rdata(
                        owner.clone(),
                        RECORD_TTL,
                        RData::TXT(TXT::new(vec![txt.clone()])),
                    );
                    meta.set_dns_class(DNSClass::IN);
                    message.add_name_server(meta);
                }
            }
        }

        Ok(message)
    }

    fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message.emit(&mut encoder).map_err(|e| {
            DomainError::UpdateTransportFailure(format!("failed to serialize update: {}", e))
        })?;
        Ok(buf)
    }

    /// One request/response exchange over TCP with 2-byte length framing.
    async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, DomainError> {
        let io = async {
            let mut stream = TcpStream::connect(&self.target).await?;
            stream.write_u16(request.len() as u16).await?;
            stream.write_all(request).await?;
            stream.flush().await?;

            let len = stream.read_u16().await? as usize;
            let mut response = vec![0u8; len];
            stream.read_exact(&mut response).await?;
            Ok::<Vec<u8>, std::io::Error>(response)
        };

        match tokio::time::timeout(self.timeout, io).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(DomainError::UpdateTransportFailure(format!(
                "{}: {}",
                self.target, e
            ))),
            Err(_) => Err(DomainError::UpdateTransportFailure(format!(
                "{}: timed out after {}s",
                self.target,
                self.timeout.as_secs()
            ))),
        }
    }

    fn map_rcode(code: ResponseCode) -> UpdateRcode {
        match code {
            ResponseCode::NoError => UpdateRcode::NoError,
            ResponseCode::FormErr => UpdateRcode::FormErr,
            ResponseCode::ServFail => UpdateRcode::ServFail,
            ResponseCode::NXDomain => UpdateRcode::NXDomain,
            ResponseCode::NotImp => UpdateRcode::NotImp,
            ResponseCode::Refused => UpdateRcode::Refused,
            ResponseCode::YXDomain => UpdateRcode::YXDomain,
            ResponseCode::YXRRSet => UpdateRcode::YXRRSet,
            ResponseCode::NXRRSet => UpdateRcode::NXRRSet,
            ResponseCode::NotAuth => UpdateRcode::NotAuth,
            ResponseCode::NotZone => UpdateRcode::NotZone,
            other => UpdateRcode::Other(u16::from(other)),
        }
    }
}

#[async_trait]
impl DnsUpdatePort for Rfc2136UpdateClient {
    async fn send_update(&self, request: UpdateRequest) -> Result<UpdateResponse, DomainError> {
        let message = Self::build_update_message(&request.zone, &request.updates)?;
        let request_bytes = Self::serialize(&message)?;

        debug!(
            target = %self.target,
            zone = %request.zone,
            updates = request.updates.len(),
            bytes = request_bytes.len(),
            "Sending dynamic update"
        );

        let response_bytes = self.exchange(&request_bytes).await?;
        let response = Message::from_vec(&response_bytes).map_err(|e| {
            DomainError::UpdateTransportFailure(format!("failed to parse update response: {}", e))
        })?;
        if response.id() != message.id() {
            return Err(DomainError::UpdateTransportFailure(format!(
                "response id {} does not match request id {}",
                response.id(),
                message.id()
            )));
        }

        Ok(UpdateResponse {
            rcode: Self::map_rcode(response.response_code()),
            request_bytes: request_bytes.len(),
            response_bytes: response_bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(owner: &str, terminal: &str, txt: &str) -> PtrUpdate {
        PtrUpdate {
            reverse_name: owner.to_string(),
            terminal: Some(terminal.to_string()),
            txt: Some(txt.to_string()),
        }
    }

    fn delete(owner: &str) -> PtrUpdate {
        PtrUpdate {
            reverse_name: owner.to_string(),
            terminal: None,
            txt: None,
        }
    }

    #[test]
    fn test_update_message_shape_for_replace() {
        let message = Rfc2136UpdateClient::build_update_message(
            "rearview.example.",
            &[replace(
                "1.0.0.10.in-addr.arpa.",
                "edge.example.",
                "first=-60;last=0;update=1000;score=1.0000",
            )],
        )
        .unwrap();

        assert_eq!(message.op_code(), OpCode::Update);
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::SOA);
        assert_eq!(message.queries()[0].name().to_ascii(), "rearview.example.");

        // two RRset deletes, then the PTR and TXT adds
        let records = message.name_servers();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].dns_class(), DNSClass::ANY);
        assert_eq!(records[0].ttl(), 0);
        assert_eq!(records[1].dns_class(), DNSClass::ANY);
        assert_eq!(records[2].dns_class(), DNSClass::IN);
        assert_eq!(records[2].record_type(), RecordType::PTR);
        assert_eq!(records[3].record_type(), RecordType::TXT);

        // owners carry the RPZ trigger encoding
        assert_eq!(
            records[0].name().to_ascii(),
            "1.0.0.10.in-addr.arpa.rearview.example."
        );
    }

    #[test]
    fn test_update_message_shape_for_delete() {
        let message = Rfc2136UpdateClient::build_update_message(
            "rearview.example.",
            &[delete("1.0.0.10.in-addr.arpa.")],
        )
        .unwrap();

        let records = message.name_servers();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.dns_class() == DNSClass::ANY));
    }

    #[test]
    fn test_replace_message_survives_wire_round_trip() {
        let message = Rfc2136UpdateClient::build_update_message(
            "rearview.example.",
            &[replace("1.0.0.10.in-addr.arpa.", "edge.example.", "update=1")],
        )
        .unwrap();
        let bytes = Rfc2136UpdateClient::serialize(&message).unwrap();
        let parsed = Message::from_vec(&bytes).unwrap();
        assert_eq!(parsed.op_code(), OpCode::Update);
        assert_eq!(parsed.id(), message.id());
        assert_eq!(parsed.name_servers().len(), message.name_servers().len());
    }

    #[test]
    fn test_invalid_owner_is_rejected() {
        let result = Rfc2136UpdateClient::build_update_message(
            "rearview.example.",
            &[delete("bad..owner.")],
        );
        assert!(result.is_err());
    }
}
