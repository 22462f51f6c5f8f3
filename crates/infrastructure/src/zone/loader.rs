//! Startup zone read.
//!
//! Reads the RPZ master file once and reconstructs the published
//! reverse-mappings: `PTR` records whose (zone-stripped) owner matches the
//! reverse-address pattern, paired with their metadata `TXT` by owner.
//! `SOA` and `NS` are structural and skipped; anything else is a garbage
//! record, logged (suppressibly) and counted. A missing file is a cold
//! start, not an error.

use async_trait::async_trait;
use ferrous_rpz_application::ports::{ZoneSnapshot, ZoneSourcePort};
use ferrous_rpz_domain::{DomainError, RpzAddress, TxtMetadata, ZoneEntry};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

pub struct FileZoneSource {
    path: String,
    zone_name: String,
    log_garbage: bool,
}

impl FileZoneSource {
    pub fn new(path: String, zone_name: String, log_garbage: bool) -> Self {
        Self {
            path,
            zone_name: normalize_name(&zone_name),
            log_garbage,
        }
    }

    fn parse(&self, text: &str) -> ZoneSnapshot {
        let mut origin = self.zone_name.clone();
        let mut previous_owner: Option<String> = None;
        let mut garbage: u64 = 0;

        // address → (ptr terminal, txt payload), keyed for deterministic order
        let mut ptrs: BTreeMap<RpzAddress, String> = BTreeMap::new();
        let mut txts: BTreeMap<RpzAddress, String> = BTreeMap::new();

        for line in join_parenthesized(text) {
            let tokens = tokenize(&line);
            if tokens.is_empty() {
                continue;
            }

            if tokens[0].starts_with('$') {
                match tokens[0].to_ascii_uppercase().as_str() {
                    "$ORIGIN" if tokens.len() > 1 => origin = normalize_name(&tokens[1]),
                    "$TTL" => {}
                    directive => {
                        garbage += 1;
                        if self.log_garbage {
                            warn!(directive, "Unsupported directive in zone file");
                        }
                    }
                }
                continue;
            }

            // owner column is absent when the line starts with whitespace
            let (owner_token, rest) = if line.starts_with(' ') || line.starts_with('\t') {
                (previous_owner.clone(), &tokens[..])
            } else {
                (Some(tokens[0].clone()), &tokens[1..])
            };
            let Some(owner_token) = owner_token else {
                garbage += 1;
                continue;
            };
            let owner = absolutize(&owner_token, &origin);
            previous_owner = Some(owner_token);

            // skip optional TTL and class columns
            let mut cursor = 0;
            while cursor < rest.len()
                && (rest[cursor].chars().all(|c| c.is_ascii_digit())
                    || rest[cursor].eq_ignore_ascii_case("in"))
            {
                cursor += 1;
            }
            let Some(record_type) = rest.get(cursor) else {
                garbage += 1;
                if self.log_garbage {
                    warn!(owner = %owner, "Truncated record in zone file");
                }
                continue;
            };
            let rdata = &rest[cursor + 1..];

            match record_type.to_ascii_uppercase().as_str() {
                "SOA" | "NS" => {}
                "PTR" => match self.reverse_owner(&owner) {
                    Some(address) if !rdata.is_empty() => {
                        ptrs.insert(address, normalize_name(&rdata[0]));
                    }
                    _ => {
                        garbage += 1;
                        if self.log_garbage {
                            warn!(owner = %owner, "PTR with unrecognized owner in zone file");
                        }
                    }
                },
                "TXT" => match self.reverse_owner(&owner) {
                    Some(address) if !rdata.is_empty() => {
                        txts.insert(address, rdata.join(""));
                    }
                    _ => {
                        garbage += 1;
                        if self.log_garbage {
                            warn!(owner = %owner, "TXT with unrecognized owner in zone file");
                        }
                    }
                },
                other => {
                    garbage += 1;
                    if self.log_garbage {
                        warn!(owner = %owner, record_type = other, "Garbage record in zone file");
                    }
                }
            }
        }

        let entries = ptrs
            .into_iter()
            .map(|(address, terminal)| {
                let metadata = txts.remove(&address).and_then(|txt| {
                    match TxtMetadata::parse(&txt) {
                        Ok(metadata) => Some(metadata),
                        Err(e) => {
                            if self.log_garbage {
                                warn!(address = %address, error = %e, "Unparsable metadata TXT");
                            }
                            None
                        }
                    }
                });
                ZoneEntry::new(address, terminal, metadata)
            })
            .collect();

        // orphan TXT records (no PTR sibling) are garbage too
        garbage += txts.len() as u64;

        ZoneSnapshot {
            entries,
            garbage_records: garbage,
        }
    }

    /// Strip the zone suffix off an owner and match the remainder against
    /// the reverse-address pattern.
    fn reverse_owner(&self, owner: &str) -> Option<RpzAddress> {
        let stripped = owner
            .strip_suffix(&self.zone_name)
            .map(str::to_string)
            .unwrap_or_else(|| owner.to_string());
        RpzAddress::from_reverse_name(&stripped)
    }
}

#[async_trait]
impl ZoneSourcePort for FileZoneSource {
    async fn load(&self) -> Result<ZoneSnapshot, DomainError> {
        if !Path::new(&self.path).exists() {
            info!(path = %self.path, "No zone file; starting with an empty view");
            return Ok(ZoneSnapshot::default());
        }
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainError::IoError(format!("zone file {}: {}", self.path, e)))?;
        let snapshot = self.parse(&text);
        info!(
            path = %self.path,
            entries = snapshot.entries.len(),
            garbage = snapshot.garbage_records,
            "Zone file read"
        );
        Ok(snapshot)
    }
}

fn normalize_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    if lower.ends_with('.') || lower.is_empty() {
        lower
    } else {
        format!("{}.", lower)
    }
}

fn absolutize(owner: &str, origin: &str) -> String {
    if owner == "@" {
        return origin.to_string();
    }
    let lower = owner.to_ascii_lowercase();
    if lower.ends_with('.') {
        lower
    } else {
        format!("{}.{}", lower, origin)
    }
}

/// Join lines whose parentheses are still open (SOA spans several lines in
/// most master files).
fn join_parenthesized(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut depth = 0i32;

    for raw in text.lines() {
        let mut fragment = String::new();
        let mut in_quotes = false;
        for c in raw.chars() {
            match c {
                '"' => {
                    in_quotes = !in_quotes;
                    fragment.push(c);
                }
                ';' if !in_quotes => break,
                '(' if !in_quotes => depth += 1,
                ')' if !in_quotes => depth -= 1,
                _ => fragment.push(c),
            }
        }

        if pending.is_empty() {
            pending = fragment;
        } else {
            pending.push(' ');
            pending.push_str(fragment.trim_start());
        }
        if depth <= 0 {
            if !pending.trim().is_empty() {
                lines.push(std::mem::take(&mut pending));
            } else {
                pending.clear();
            }
            depth = 0;
        }
    }
    if !pending.trim().is_empty() {
        lines.push(pending);
    }
    lines
}

/// Split a record line into tokens, keeping quoted strings whole (metadata
/// TXT payloads contain semicolons).
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
