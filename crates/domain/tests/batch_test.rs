use ferrous_rpz_domain::{Batch, BatchState, RpzAddress, UpdateRcode};

fn addr(s: &str) -> RpzAddress {
    RpzAddress::parse(s).unwrap()
}

#[test]
fn test_first_add_advances_to_accumulating() {
    let mut batch = Batch::new(0.0);
    assert_eq!(batch.state(), BatchState::New);
    assert!(batch.try_add(addr("10.0.0.1"), 10));
    assert_eq!(batch.state(), BatchState::Accumulating);
    assert_eq!(batch.add_calls(), 1);
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_adds_past_cap_are_counted_but_dropped() {
    let mut batch = Batch::new(0.0);
    for i in 0..5 {
        assert!(batch.try_add(addr(&format!("10.0.0.{}", i + 1)), 3) == (i < 3));
    }
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.add_calls(), 5);
}

#[test]
fn test_promotion_records_accumulation_elapsed() {
    let mut batch = Batch::new(100.0);
    batch.try_add(addr("10.0.0.1"), 10);
    batch.promote_to_writing(130.0).unwrap();
    assert_eq!(batch.state(), BatchState::Writing);
    assert_eq!(batch.elapsed_accumulating, 30.0);
}

#[test]
fn test_adds_after_promotion_are_dropped() {
    let mut batch = Batch::new(0.0);
    batch.try_add(addr("10.0.0.1"), 10);
    batch.promote_to_writing(1.0).unwrap();
    assert!(!batch.try_add(addr("10.0.0.2"), 10));
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.add_calls(), 2);
}

#[test]
fn test_promotion_requires_accumulating() {
    let mut batch = Batch::new(0.0);
    assert!(batch.promote_to_writing(1.0).is_err());
}

#[test]
fn test_complete_records_outcome() {
    let mut batch = Batch::new(0.0);
    batch.try_add(addr("10.0.0.1"), 10);
    batch.promote_to_writing(30.0).unwrap();
    batch
        .complete(30.0, 30.5, Some(UpdateRcode::NoError), None)
        .unwrap();
    assert_eq!(batch.state(), BatchState::Complete);
    assert!(batch.succeeded());
    assert!((batch.elapsed_processing - 0.5).abs() < 1e-9);
}

#[test]
fn test_servfail_completion_is_not_success() {
    let mut batch = Batch::new(0.0);
    batch.try_add(addr("10.0.0.1"), 10);
    batch.promote_to_writing(30.0).unwrap();
    batch
        .complete(30.0, 31.0, Some(UpdateRcode::ServFail), None)
        .unwrap();
    assert!(!batch.succeeded());
    assert_eq!(batch.rcode, Some(UpdateRcode::ServFail));
}

#[test]
fn test_transport_error_completion_is_not_success() {
    let mut batch = Batch::new(0.0);
    batch.try_add(addr("10.0.0.1"), 10);
    batch.promote_to_writing(30.0).unwrap();
    batch
        .complete(30.0, 35.0, None, Some("connection refused".to_string()))
        .unwrap();
    assert!(!batch.succeeded());
    assert!(batch.transport_error.is_some());
}

#[test]
fn test_complete_requires_writing() {
    let mut batch = Batch::new(0.0);
    batch.try_add(addr("10.0.0.1"), 10);
    assert!(batch.complete(0.0, 1.0, Some(UpdateRcode::NoError), None).is_err());
}

#[test]
fn test_rcode_from_code_mapping() {
    assert_eq!(UpdateRcode::from_code(0), UpdateRcode::NoError);
    assert_eq!(UpdateRcode::from_code(2), UpdateRcode::ServFail);
    assert_eq!(UpdateRcode::from_code(5), UpdateRcode::Refused);
    assert_eq!(UpdateRcode::from_code(9), UpdateRcode::NotAuth);
    assert_eq!(UpdateRcode::from_code(23), UpdateRcode::Other(23));
    assert_eq!(UpdateRcode::ServFail.to_string(), "SERVFAIL");
}
