mod common;

use std::collections::HashSet;

use carebase::audit::AuditSink;
use carebase::models::{AuditAction, NewAuditLog};

#[tokio::test]
async fn appends_are_listed_in_order() {
    let (_dir, store) = common::temp_store().await;
    let sink = AuditSink::new(store);

    for n in 0..10 {
        let event = NewAuditLog::new(format!("u-{n}"), "Nurse", AuditAction::ViewPatient).detail("n", n);
        sink.record(event).await.unwrap();
    }

    let entries = sink.list().await.unwrap();
    assert_eq!(entries.len(), 10);
    for (n, entry) in entries.iter().enumerate() {
        assert_eq!(entry.user_id, format!("u-{n}"));
        assert_eq!(entry.details["n"], n);
    }
    assert!(entries.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[tokio::test]
async fn server_assigns_unique_ids() {
    let (_dir, store) = common::temp_store().await;
    let sink = AuditSink::new(store);

    let a = sink.record(NewAuditLog::new("u-1", "A", AuditAction::Login)).await.unwrap();
    let b = sink.record(NewAuditLog::new("u-1", "A", AuditAction::Login)).await.unwrap();
    assert_ne!(a.id, b.id);

    let ids: HashSet<String> = sink.list().await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn earlier_entries_are_untouched_by_later_appends() {
    let (_dir, store) = common::temp_store().await;
    let sink = AuditSink::new(store);

    let first = sink
        .record(
            NewAuditLog::new("u-1", "A", AuditAction::CreatePatient)
                .detail("patientId", "p-1")
                .ip_address(Some("10.0.0.1".into())),
        )
        .await
        .unwrap();
    sink.record(NewAuditLog::new("u-2", "B", AuditAction::DeletePatient)).await.unwrap();

    let entries = sink.list().await.unwrap();
    assert_eq!(entries[0], first);
}

#[tokio::test]
async fn best_effort_append_swallows_storage_failures() {
    let (dir, store) = common::temp_store().await;
    let sink = AuditSink::new(store);
    std::fs::write(dir.path().join("auditLogs.json"), b"garbage").unwrap();

    // Must not panic or propagate.
    sink.record_best_effort(NewAuditLog::new("u-1", "A", AuditAction::SystemError)).await;

    assert!(sink.record(NewAuditLog::new("u-1", "A", AuditAction::Login)).await.is_err());
    // The corrupt document was not overwritten.
    assert_eq!(std::fs::read(dir.path().join("auditLogs.json")).unwrap(), b"garbage");
}
