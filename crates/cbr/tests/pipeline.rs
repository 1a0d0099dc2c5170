//! End-to-end behavior of the backup and restore pipeline.
//!
//! Timing tests run on a paused tokio clock, so delays advance virtual time
//! only and the measured gaps are deterministic.

mod common;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, pin_mut};
use tempfile::TempDir;

use cbr::{
    BackupWriter, BatchConfig, Mode, PagedLister, PasswordResolver, PasswordStrategy,
    PipelineError, PoolResolver, RestoreReader, StrategyError, read_snapshot, snapshot_path,
};
use cbr_core::{IdentityService, Pool, PoolSelector, Username};
use cbr_file::FileDirectory;

use common::{Call, ScriptedService, pages, pool, user, usernames, users};

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_empty_pool_yields_nothing() {
    let id = pool("us-east-1_Empty");
    let service = ScriptedService::new().with_user_pages(&id, pages(vec![], 60));

    let lister = PagedLister::new(&service, BatchConfig::default());
    let all = lister.collect_users(&id).await.unwrap();

    assert!(all.is_empty());
    assert_eq!(service.calls(), vec![Call::ListUsers(id)]);
}

#[tokio::test]
async fn test_single_page() {
    let id = pool("us-east-1_One");
    let service = ScriptedService::new().with_user_pages(&id, pages(users("u", 7), 60));

    let lister = PagedLister::new(&service, BatchConfig::default());
    let all = lister.collect_users(&id).await.unwrap();

    assert_eq!(all.len(), 7);
    assert_eq!(service.list_times(&id).len(), 1);
}

#[tokio::test]
async fn test_many_pages_in_listing_order() {
    let id = pool("us-east-1_Many");
    let expected = users("u", 130);
    let service = ScriptedService::new().with_user_pages(&id, pages(expected.clone(), 60));

    let lister = PagedLister::new(&service, BatchConfig::default());
    let all = lister.collect_users(&id).await.unwrap();

    assert_eq!(usernames(&all), usernames(&expected));
    assert_eq!(service.list_times(&id).len(), 3);
}

#[tokio::test]
async fn test_follows_service_cursor_regardless_of_page_size() {
    // The service returns pages far smaller than requested.
    let id = pool("us-east-1_Small");
    let expected = users("u", 10);
    let service = ScriptedService::new().with_user_pages(&id, pages(expected.clone(), 3));

    let lister = PagedLister::new(&service, BatchConfig::default());
    let stream = lister.users(&id);
    pin_mut!(stream);

    let mut seen = Vec::new();
    while let Some(record) = stream.next().await {
        seen.push(record.unwrap());
    }

    assert_eq!(usernames(&seen), usernames(&expected));
    assert_eq!(service.list_times(&id).len(), 4);
}

#[tokio::test]
async fn test_listing_error_is_surfaced() {
    let id = pool("us-east-1_Flaky");
    let service = ScriptedService::new()
        .with_user_pages(&id, pages(users("u", 130), 60))
        .failing_list_at(&id, 1);

    let lister = PagedLister::new(&service, BatchConfig::default());
    let err = lister.collect_users(&id).await.unwrap_err();

    match err {
        PipelineError::RemoteList { pool, source } => {
            assert_eq!(pool, id);
            assert!(source.as_service().is_some_and(|e| e.is_throttling()));
        }
        other => panic!("expected RemoteList, got {:?}", other),
    }
}

// ============================================================================
// Delay between windows
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_delay_between_pages_only() {
    let delay = Duration::from_millis(250);
    let id = pool("us-east-1_Paced");
    let service = ScriptedService::new().with_user_pages(&id, pages(users("u", 200), 60));

    let start = tokio::time::Instant::now();
    let lister = PagedLister::new(&service, BatchConfig::with_delay_ms(250));
    let all = lister.collect_users(&id).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(all.len(), 200);

    let times = service.list_times(&id);
    assert_eq!(times.len(), 4);
    assert_eq!(times[0].duration_since(start), Duration::ZERO, "no delay before first page");
    for pair in times.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= delay);
    }

    // Three boundaries, and nothing after the last page.
    assert!(elapsed >= delay * 3);
    assert!(elapsed < delay * 4);
}

#[tokio::test(start_paused = true)]
async fn test_pool_enumeration_is_paced() {
    let delay = Duration::from_millis(300);
    let service = ScriptedService::new().with_pool_pages(vec![
        vec![Pool::from_id(pool("us-east-1_A"))],
        vec![Pool::from_id(pool("us-east-1_B"))],
        vec![Pool::from_id(pool("us-east-1_C"))],
    ]);
    let resolver = PoolResolver::new(&service, BatchConfig::with_delay_ms(300));

    let start = tokio::time::Instant::now();
    let pools = resolver.resolve(&PoolSelector::All, Mode::Backup).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(pools.len(), 3);

    let times = service.pool_list_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[0].duration_since(start), Duration::ZERO, "no delay before first page");
    for pair in times.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= delay);
    }

    assert!(elapsed >= delay * 2);
    assert!(elapsed < delay * 3);
}

#[tokio::test(start_paused = true)]
async fn test_restore_windows_are_paced() {
    let delay = Duration::from_millis(400);
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    cbr::write_snapshot(&path, &users("u", 130)).unwrap();

    let target = pool("us-east-1_Target");
    let service = ScriptedService::new();
    let reader = RestoreReader::new(
        &service,
        BatchConfig::with_delay_ms(400),
        PasswordResolver::fixed("Temp#Pass1"),
    );

    let start = tokio::time::Instant::now();
    let report = reader.restore(&target, &path).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.created.len(), 130);

    let times = service.create_times();
    assert_eq!(times[0].duration_since(start), Duration::ZERO);
    // Creates within a window are not delayed; window boundaries are.
    assert_eq!(times[59].duration_since(times[0]), Duration::ZERO);
    assert!(times[60].duration_since(times[59]) >= delay);
    assert!(times[120].duration_since(times[119]) >= delay);

    assert!(elapsed >= delay * 2);
    assert!(elapsed < delay * 3);
}

// ============================================================================
// Pool resolution
// ============================================================================

#[tokio::test]
async fn test_concrete_selector_needs_no_call() {
    let service = ScriptedService::new();
    let resolver = PoolResolver::new(&service, BatchConfig::default());

    let id = pool("us-east-1_Abc");
    let pools = resolver
        .resolve(&PoolSelector::Pool(id.clone()), Mode::Backup)
        .await
        .unwrap();

    assert_eq!(pools, vec![Pool::from_id(id)]);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_wildcard_enumerates_every_pool_page() {
    let service = ScriptedService::new().with_pool_pages(vec![
        vec![Pool::from_id(pool("us-east-1_A")), Pool::from_id(pool("us-east-1_B"))],
        vec![Pool::from_id(pool("us-east-1_C"))],
    ]);
    let resolver = PoolResolver::new(&service, BatchConfig::default());

    let pools = resolver.resolve(&PoolSelector::All, Mode::Backup).await.unwrap();

    let ids: Vec<_> = pools.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["us-east-1_A", "us-east-1_B", "us-east-1_C"]);
    assert_eq!(service.calls(), vec![Call::ListPools, Call::ListPools]);
}

#[tokio::test]
async fn test_wildcard_restore_rejected_before_any_call() {
    let service = ScriptedService::new()
        .with_pool_pages(vec![vec![Pool::from_id(pool("us-east-1_A"))]]);
    let resolver = PoolResolver::new(&service, BatchConfig::default());

    let err = resolver
        .resolve(&PoolSelector::parse("ALL").unwrap(), Mode::Restore)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::WildcardRestore));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_wildcard_with_no_pools() {
    let temp_dir = TempDir::new().unwrap();
    let service = ScriptedService::new().with_pool_pages(vec![vec![]]);
    let writer = BackupWriter::new(&service, temp_dir.path(), BatchConfig::default());

    let err = writer.backup(&PoolSelector::All).await.unwrap_err();
    assert!(matches!(err, PipelineError::NoPoolsFound));
}

// ============================================================================
// Backup
// ============================================================================

#[tokio::test]
async fn test_backup_writes_snapshot_in_listing_order() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("nested").join("backups");
    let id = pool("us-east-1_Abc");
    let expected = users("u", 75);
    let service = ScriptedService::new().with_user_pages(&id, pages(expected.clone(), 60));

    let writer = BackupWriter::new(&service, &destination, BatchConfig::default());
    let report = writer.backup(&PoolSelector::Pool(id.clone())).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.written.len(), 1);
    assert_eq!(report.written[0].users, 75);
    assert_eq!(report.written[0].path, snapshot_path(&destination, &id));

    let restored = read_snapshot(&report.written[0].path).unwrap();
    assert_eq!(restored, expected);
}

#[tokio::test]
async fn test_failed_traversal_leaves_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let id = pool("us-east-1_Flaky");
    let service = ScriptedService::new()
        .with_user_pages(&id, pages(users("u", 130), 60))
        .failing_list_at(&id, 2);

    let writer = BackupWriter::new(&service, temp_dir.path(), BatchConfig::default());
    let err = writer.backup_pool(&Pool::from_id(id.clone())).await.unwrap_err();

    assert!(matches!(err, PipelineError::RemoteList { .. }));
    assert!(!snapshot_path(temp_dir.path(), &id).exists());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_traversal_keeps_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let id = pool("us-east-1_Flaky");
    let path = snapshot_path(temp_dir.path(), &id);
    cbr::write_snapshot(&path, &users("old", 2)).unwrap();

    let service = ScriptedService::new()
        .with_user_pages(&id, pages(users("u", 130), 60))
        .failing_list_at(&id, 1);

    let writer = BackupWriter::new(&service, temp_dir.path(), BatchConfig::default());
    assert!(writer.backup_pool(&Pool::from_id(id)).await.is_err());

    assert_eq!(usernames(&read_snapshot(&path).unwrap()), vec!["old000", "old001"]);
}

#[tokio::test]
async fn test_backup_continues_past_failed_pool() {
    let temp_dir = TempDir::new().unwrap();
    let (a, b, c) = (pool("us-east-1_A"), pool("us-east-1_B"), pool("us-east-1_C"));
    let service = ScriptedService::new()
        .with_pool_pages(vec![vec![
            Pool::from_id(a.clone()),
            Pool::from_id(b.clone()),
            Pool::from_id(c.clone()),
        ]])
        .with_user_pages(&a, pages(users("a", 3), 60))
        .with_user_pages(&b, pages(users("b", 3), 60))
        .with_user_pages(&c, pages(users("c", 3), 60))
        .failing_list_at(&b, 0);

    let writer = BackupWriter::new(&service, temp_dir.path(), BatchConfig::default());
    let report = writer.backup(&PoolSelector::All).await.unwrap();

    assert!(!report.is_success());
    let written: Vec<_> = report.written.iter().map(|s| s.pool.id.clone()).collect();
    assert_eq!(written, vec![a, c]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].pool.id, b);
    assert!(!snapshot_path(temp_dir.path(), &b).exists());
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_restore_excludes_server_assigned_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    cbr::write_snapshot(&path, &[user("alice")]).unwrap();

    let target = pool("us-east-1_Target");
    let service = ScriptedService::new();
    let reader = RestoreReader::new(
        &service,
        BatchConfig::default(),
        PasswordResolver::fixed("Temp#Pass1"),
    );
    reader.restore(&target, &path).await.unwrap();

    let created = service.created();
    assert_eq!(created.len(), 1);
    let (created_pool, request) = &created[0];
    assert_eq!(created_pool, &target);
    assert_eq!(request.username.as_str(), "alice");
    assert!(request.attributes.iter().all(|a| a.name != "sub"));
    assert!(request.attributes.iter().any(|a| a.name == "email"));
    assert_eq!(request.temporary_password.as_deref(), Some("Temp#Pass1"));
}

#[tokio::test]
async fn test_restore_isolates_record_failures() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    cbr::write_snapshot(&path, &[user("u1"), user("u2"), user("u3")]).unwrap();

    let service = ScriptedService::new().failing_create("u2");
    let reader = RestoreReader::new(
        &service,
        BatchConfig::default(),
        PasswordResolver::fixed("Temp#Pass1"),
    );
    let report = reader.restore(&pool("us-east-1_T"), &path).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.total, 3);
    let created: Vec<_> = report.created.iter().map(Username::as_str).collect();
    assert_eq!(created, vec!["u1", "u3"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].username.as_str(), "u2");
    assert!(report.failures[0].source.as_service().is_some_and(|e| e.is_user_exists()));
}

struct RejectsU2;

#[async_trait]
impl PasswordStrategy for RejectsU2 {
    async fn password_for(&self, username: &Username) -> Result<String, StrategyError> {
        if username.as_str() == "u2" {
            return Err("no password for u2".into());
        }
        Ok(format!("pw-{}", username))
    }
}

#[tokio::test]
async fn test_password_strategy_falls_back_per_record() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    cbr::write_snapshot(&path, &[user("u1"), user("u2"), user("u3")]).unwrap();

    let service = ScriptedService::new();
    let reader = RestoreReader::new(
        &service,
        BatchConfig::default(),
        PasswordResolver::pluggable(RejectsU2, "Fallback#1"),
    );
    let report = reader.restore(&pool("us-east-1_T"), &path).await.unwrap();

    assert!(report.is_success());
    let passwords: Vec<_> = service
        .created()
        .into_iter()
        .map(|(_, r)| (r.username.to_string(), r.temporary_password))
        .collect();
    assert_eq!(
        passwords,
        vec![
            ("u1".to_string(), Some("pw-u1".to_string())),
            ("u2".to_string(), Some("Fallback#1".to_string())),
            ("u3".to_string(), Some("pw-u3".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_generated_passwords_are_left_unset() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    cbr::write_snapshot(&path, &[user("u1"), user("u2"), user("u3")]).unwrap();

    let service = ScriptedService::new();
    let reader = RestoreReader::new(
        &service,
        BatchConfig::default(),
        PasswordResolver::pluggable_or_generated(RejectsU2),
    );
    let report = reader.restore(&pool("us-east-1_T"), &path).await.unwrap();

    assert!(report.is_success());
    let passwords: Vec<_> = service
        .created()
        .into_iter()
        .map(|(_, r)| r.temporary_password)
        .collect();
    assert_eq!(
        passwords,
        vec![Some("pw-u1".to_string()), None, Some("pw-u3".to_string())]
    );
}

#[tokio::test]
async fn test_malformed_snapshot_aborts_before_any_create() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");
    std::fs::write(&path, r#"[{"Username": "u1"}, {"Attributes": []}]"#).unwrap();

    let service = ScriptedService::new();
    let reader = RestoreReader::new(
        &service,
        BatchConfig::default(),
        PasswordResolver::fixed("Temp#Pass1"),
    );
    let err = reader.restore(&pool("us-east-1_T"), &path).await.unwrap_err();

    assert!(matches!(err, PipelineError::SnapshotFormat { .. }));
    assert!(service.calls().is_empty());
}

// ============================================================================
// Round trip
// ============================================================================

#[tokio::test]
async fn test_round_trip_through_local_directories() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();
    let backup_dir = TempDir::new().unwrap();

    let source = FileDirectory::new(source_dir.path());
    let source_pool = source.create_pool("customers").unwrap();
    let originals = users("user", 75);
    for record in &originals {
        source.insert_user(&source_pool.id, record.clone()).unwrap();
    }

    let writer = BackupWriter::new(&source, backup_dir.path(), BatchConfig::default());
    let report = writer
        .backup(&PoolSelector::Pool(source_pool.id.clone()))
        .await
        .unwrap();
    let snapshot = &report.written[0].path;

    let target = FileDirectory::new(target_dir.path());
    let target_pool = target.create_pool("customers").unwrap();
    let reader = RestoreReader::new(
        &target,
        BatchConfig::default(),
        PasswordResolver::fixed("Temp#Pass1"),
    );
    let restored = reader.restore(&target_pool.id, snapshot).await.unwrap();
    assert_eq!(restored.created.len(), 75);

    let lister = PagedLister::new(&target, BatchConfig::default());
    let recreated = lister.collect_users(&target_pool.id).await.unwrap();

    assert_eq!(usernames(&recreated), usernames(&originals));
    for (original, copy) in originals.iter().zip(&recreated) {
        assert_eq!(copy.attribute("email"), original.attribute("email"));
        assert_ne!(copy.attribute("sub"), original.attribute("sub"));
    }

    let first = Username::new("user000").unwrap();
    assert!(
        target
            .verify_password(&target_pool.id, &first, "Temp#Pass1")
            .unwrap()
    );
}

#[tokio::test]
async fn test_restore_into_same_pool_reports_duplicates() {
    let dir = TempDir::new().unwrap();
    let backup_dir = TempDir::new().unwrap();

    let directory = FileDirectory::new(dir.path());
    let existing = directory.create_pool("customers").unwrap();
    for record in users("user", 3) {
        directory.insert_user(&existing.id, record).unwrap();
    }

    let writer = BackupWriter::new(&directory, backup_dir.path(), BatchConfig::default());
    let snapshot = writer.backup_pool(&existing).await.unwrap();

    let reader = RestoreReader::new(
        &directory,
        BatchConfig::default(),
        PasswordResolver::fixed("Temp#Pass1"),
    );
    let report = reader.restore(&existing.id, &snapshot.path).await.unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.failures.len(), 3);
    assert_eq!(directory.list_users(&existing.id, 60, None).await.unwrap().items.len(), 3);
}
