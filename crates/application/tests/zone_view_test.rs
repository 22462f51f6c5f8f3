use ferrous_rpz_application::ports::ZoneSnapshot;
use ferrous_rpz_application::services::ZoneView;
use ferrous_rpz_domain::{RpzAddress, ZoneEntry};

fn addr(s: &str) -> RpzAddress {
    RpzAddress::parse(s).unwrap()
}

fn entry(address: &str, terminal: &str) -> ZoneEntry {
    ZoneEntry::new(addr(address), terminal.to_string(), None)
}

#[test]
fn test_load_snapshot() {
    let mut view = ZoneView::new();
    view.load(ZoneSnapshot {
        entries: vec![entry("10.0.0.1", "a.example."), entry("10.0.0.2", "b.example.")],
        garbage_records: 3,
    });
    assert_eq!(view.len(), 2);
    assert_eq!(view.garbage_records(), 3);
    assert_eq!(view.get(&addr("10.0.0.1")).unwrap().terminal, "a.example.");
}

#[test]
fn test_apply_replaces_and_deletes() {
    let mut view = ZoneView::new();
    view.apply(addr("10.0.0.1"), Some(entry("10.0.0.1", "a.example.")));
    view.apply(addr("10.0.0.1"), Some(entry("10.0.0.1", "b.example.")));
    assert_eq!(view.get(&addr("10.0.0.1")).unwrap().terminal, "b.example.");

    view.apply(addr("10.0.0.1"), None);
    assert!(view.get(&addr("10.0.0.1")).is_none());
    assert!(view.is_empty());
}

#[test]
fn test_cross_check_clean() {
    let mut view = ZoneView::new();
    view.apply(addr("10.0.0.1"), Some(entry("10.0.0.1", "a.example.")));
    let report = view.cross_check(&[(addr("10.0.0.1"), "a.example.".to_string())]);
    assert_eq!(report.discrepancies(), 0);
    assert_eq!(report.associations, 1);
    assert_eq!(report.zone_entries, 1);
}

#[test]
fn test_cross_check_reports_all_discrepancy_kinds() {
    let mut view = ZoneView::new();
    view.apply(addr("10.0.0.1"), Some(entry("10.0.0.1", "stale.example.")));
    view.apply(addr("10.0.0.9"), Some(entry("10.0.0.9", "orphan.example.")));

    let report = view.cross_check(&[
        (addr("10.0.0.1"), "fresh.example.".to_string()),
        (addr("10.0.0.2"), "unpublished.example.".to_string()),
    ]);

    assert_eq!(report.divergent.len(), 1);
    assert_eq!(report.divergent[0].address, "10.0.0.1");
    assert_eq!(report.missing_in_zone, vec!["10.0.0.2".to_string()]);
    assert_eq!(report.missing_in_store, vec!["10.0.0.9".to_string()]);
    assert_eq!(report.discrepancies(), 3);
}
