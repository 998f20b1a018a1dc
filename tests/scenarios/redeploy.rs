//! Scenario: the operator pushes again after rebuilding.

use sshdeploy::infrastructure::{InMemoryRemote, RemoteOp};

use crate::common::*;

#[test]
fn second_push_reuses_existing_directories() {
    let source = source_tree(&[("app.dll", "v1"), ("wwwroot/index.html", "<p>")]);
    let remote = InMemoryRemote::new();
    let orchestrator = orchestrator(&remote, RecordingSink::new(), None);
    let config = config(source.path(), "/opt/app");

    let first = orchestrator.execute_deployment(&config).unwrap();
    let created_after_first = remote.created_directories().len();

    write_files(source.path(), &[("app.dll", "v2")]);
    let second = orchestrator.execute_deployment(&config).unwrap();

    assert_eq!(first.sequence, Some(1));
    assert_eq!(second.sequence, Some(2));
    assert_eq!(second.directories_created, 0);
    assert_eq!(remote.created_directories().len(), created_after_first);
    assert_eq!(remote.file("/opt/app/app.dll").unwrap(), b"v2");
    assert_eq!(orchestrator.state().deployment_count(), 2);
}

#[test]
fn clean_push_drops_files_removed_from_the_build() {
    let remote = InMemoryRemote::new()
        .with_directory("/opt/app/old")
        .with_file("/opt/app/old/stale.dll", b"stale")
        .with_file("/opt/app/leftover.txt", b"x");
    let source = source_tree(&[("app.dll", "fresh")]);
    let orchestrator = orchestrator(&remote, RecordingSink::new(), None);

    let config = config(source.path(), "/opt/app").with_clean_target(true);
    let report = orchestrator.execute_deployment(&config).unwrap();

    assert!(report.is_success());
    let files: Vec<String> = remote
        .files()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    assert_eq!(files, vec!["/opt/app/app.dll"]);
    assert!(!remote.has_directory("/opt/app/old"));
    assert!(remote.has_directory("/opt/app"));
}

#[test]
fn push_without_clean_keeps_unrelated_remote_files() {
    let remote = InMemoryRemote::new().with_file("/opt/app/appsettings.Production.json", b"{}");
    let source = source_tree(&[("app.dll", "fresh")]);
    let orchestrator = orchestrator(&remote, RecordingSink::new(), None);

    orchestrator
        .execute_deployment(&config(source.path(), "/opt/app"))
        .unwrap();

    assert!(remote.file("/opt/app/appsettings.Production.json").is_some());
    assert_eq!(remote.count(|op| matches!(op, RemoteOp::Delete(_))), 0);
}
