//! End-to-end scenarios walking telemetry through ranking, eviction,
//! batching and the zone commit.

use async_trait::async_trait;
use ferrous_rpz_application::ports::{
    DnsUpdatePort, IntrospectionPort, TelemetrySink, UpdateRequest, UpdateResponse,
    ZoneRefreshPort,
};
use ferrous_rpz_application::services::{AssociationStore, RefreshBatcher};
use ferrous_rpz_application::RpzEngine;
use ferrous_rpz_domain::{
    BatchState, Config, DomainError, ResolutionObservation, RpzAddress, TelemetryEvent,
    TrendingHeuristic, UpdateRcode,
};
use std::sync::{Arc, Mutex};

const ALPHA: f64 = 0.1;

fn addr(s: &str) -> RpzAddress {
    RpzAddress::parse(s).unwrap()
}

fn obs(address: &str, chain: &[&str]) -> ResolutionObservation {
    ResolutionObservation::new(address, chain.iter().map(|n| n.to_string()).collect()).unwrap()
}

fn store(cache_size: usize) -> AssociationStore {
    AssociationStore::new(cache_size, ALPHA, 100, Arc::new(TrendingHeuristic))
}

/// Scripted update collaborator for the engine scenarios.
struct ScriptedUpdatePort {
    rcode: UpdateRcode,
    requests: Mutex<Vec<UpdateRequest>>,
}

impl ScriptedUpdatePort {
    fn new(rcode: UpdateRcode) -> Self {
        Self {
            rcode,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DnsUpdatePort for ScriptedUpdatePort {
    async fn send_update(&self, request: UpdateRequest) -> Result<UpdateResponse, DomainError> {
        let request_bytes = 64 + request.updates.len() * 48;
        self.requests.lock().unwrap().push(request);
        Ok(UpdateResponse {
            rcode: self.rcode,
            request_bytes,
            response_bytes: 64,
        })
    }
}

// S1: a deeper chain ending in a short name outranks a direct answer
#[test]
fn scenario_insert_and_rank() {
    let mut s = store(10);
    s.observe(obs("10.0.0.1", &["www.a.example.", "a.example."]), 0.0)
        .unwrap();
    s.observe(obs("10.0.0.1", &["b.example."]), 0.0).unwrap();

    let best = s.best(&addr("10.0.0.1"), 0.0).unwrap();
    assert_eq!(best.terminal(), "a.example.");
    assert_eq!(best.depth(), 2);
}

// S2: sustained query volume flips the ranking
#[test]
fn scenario_recency_flip() {
    let mut s = store(10);
    s.observe(obs("10.0.0.1", &["www.a.example.", "a.example."]), 0.0)
        .unwrap();
    s.observe(obs("10.0.0.1", &["b.example."]), 0.0).unwrap();

    for i in 1..=1000 {
        s.observe(obs("10.0.0.1", &["b.example."]), i as f64 * 0.06)
            .unwrap();
    }

    let best = s.best(&addr("10.0.0.1"), 60.0).unwrap();
    assert_eq!(best.terminal(), "b.example.");
}

// S3: the pass selects from the head of the queue
#[test]
fn scenario_eviction_selection() {
    let mut s = store(2);
    s.observe(obs("10.0.0.1", &["a.example."]), 0.0).unwrap();
    s.observe(obs("10.0.0.2", &["b.example."]), 1.0).unwrap();
    s.observe(obs("10.0.0.3", &["c.example."]), 2.0).unwrap();

    assert_eq!(
        s.queue().peek_head(10),
        vec![addr("10.0.0.1"), addr("10.0.0.2"), addr("10.0.0.3")]
    );

    s.run_eviction_pass(2.0).unwrap();
    assert!(s.lookup(&addr("10.0.0.1")).is_none());
    assert!(s.lookup(&addr("10.0.0.2")).is_some());
    assert!(s.lookup(&addr("10.0.0.3")).is_some());

    let events = s.recent_evictions(1);
    assert_eq!(events[0].overage, 1);
    assert_eq!(events[0].selected, 1);
    assert_eq!(events[0].deleted, 1);
    assert_eq!(events[0].recycled, 0);
}

// S4: a multi-resolution association survives shearing and is recycled for
// republication
#[test]
fn scenario_recycle_not_delete() {
    let mut s = store(1);
    s.observe(obs("10.0.0.1", &["x.example."]), 0.0).unwrap();
    s.observe(obs("10.0.0.1", &["y.example."]), 1.0).unwrap();

    let outcome = s.run_eviction_pass(1.0).unwrap();
    let survivor = s.lookup(&addr("10.0.0.1")).unwrap();
    assert_eq!(survivor.len(), 1);
    assert_eq!(outcome.event.recycled, 1);
    assert_eq!(outcome.event.deleted, 0);

    // the recycled address flows into the refresh batcher
    let mut batcher = RefreshBatcher::new(10, 30, 0.1, 10);
    for address in outcome.affected {
        batcher.add(address, 1.0);
    }
    assert_eq!(batcher.pending(), 1);
}

// S5: a batch writes once it is both old enough and full enough
#[test]
fn scenario_batch_timing() {
    let mut batcher = RefreshBatcher::new(10, 30, 0.5, 10);
    for i in 0..4 {
        batcher.add(addr(&format!("10.0.0.{}", i + 1)), i as f64 * 8.0);
    }
    assert!(batcher.tick(30.0).is_none(), "threshold not met at t=30");

    batcher.add(addr("10.0.0.5"), 31.0);
    let batch = batcher.tick(32.0).expect("batch should promote at t=32");
    assert_eq!(batch.state(), BatchState::Writing);
    assert_eq!(batch.len(), 5);
}

// S6: a SERVFAIL'd commit completes the batch, leaves the zone view alone
// and surfaces as a2z discrepancies
#[tokio::test]
async fn scenario_transport_failure() {
    let mut config = Config::default();
    config.cache.size = 4;
    config.batch.update_frequency = 0;
    config.batch.threshold = 0.0;

    let port = Arc::new(ScriptedUpdatePort::new(UpdateRcode::ServFail));
    let engine = RpzEngine::new(&config, port.clone());

    for (address, chains) in [
        ("10.0.0.1", ["a1.example.", "a2.example."]),
        ("10.0.0.2", ["b1.example.", "b2.example."]),
        ("10.0.0.3", ["c1.example.", "c2.example."]),
    ] {
        for chain in chains {
            engine
                .submit(TelemetryEvent {
                    address: address.to_string(),
                    chain: vec![chain.to_string()],
                })
                .await
                .unwrap();
        }
    }

    let outcome = engine.run_refresh_cycle().await.unwrap();
    assert!(outcome.batch_written);
    assert_eq!(outcome.rcode, Some(UpdateRcode::ServFail));

    let refreshes = engine.recent_refreshes(1).await;
    assert_eq!(refreshes[0].rcode, Some(UpdateRcode::ServFail));
    assert_eq!(refreshes[0].state(), BatchState::Complete);

    // zone untouched, nothing requeued
    assert!(engine.zone_entry("10.0.0.1").await.is_err());
    assert_eq!(engine.queue_depths().await.batch_pending, 0);

    // every live association now disagrees with the (empty) zone
    let report = engine.associations_cross_check().await;
    assert_eq!(report.discrepancies(), 3);
}

// happy path: commit success advances the zone view to the best resolution
#[tokio::test]
async fn scenario_commit_success_synchronizes_views() {
    let mut config = Config::default();
    config.cache.size = 1;
    config.batch.update_frequency = 0;
    config.batch.threshold = 0.0;

    let port = Arc::new(ScriptedUpdatePort::new(UpdateRcode::NoError));
    let engine = RpzEngine::new(&config, port.clone());

    engine
        .submit(TelemetryEvent {
            address: "10.2.66.5".to_string(),
            chain: vec!["short.example.".to_string()],
        })
        .await
        .unwrap();
    engine
        .submit(TelemetryEvent {
            address: "10.2.66.5".to_string(),
            // wire order: terminal first
            chain: vec!["edge.example.".to_string(), "www.site.example.".to_string()],
        })
        .await
        .unwrap();

    let outcome = engine.run_refresh_cycle().await.unwrap();
    assert_eq!(outcome.rcode, Some(UpdateRcode::NoError));

    let request = port.requests.lock().unwrap().last().cloned().unwrap();
    assert_eq!(request.updates[0].reverse_name, "5.66.2.10.in-addr.arpa.");
    assert_eq!(request.updates[0].terminal.as_deref(), Some("edge.example."));

    let entry = engine.zone_entry("10.2.66.5").await.unwrap();
    assert_eq!(entry.terminal, "edge.example.");
    assert_eq!(engine.associations_cross_check().await.discrepancies(), 0);
}
