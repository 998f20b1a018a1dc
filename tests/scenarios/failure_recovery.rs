//! Scenario: a deployment breaks half way and the operator tries again.

use sshdeploy::domain::ports::{ChannelError, DeployEvent, DeployStep};
use sshdeploy::domain::value_objects::ExclusionRules;
use sshdeploy::infrastructure::InMemoryRemote;
use sshdeploy::DeployError;

use crate::common::*;

#[test]
fn interrupted_upload_releases_the_lock_for_the_next_push() {
    let source = source_tree(&[("a.dll", "a"), ("big.bin", "blob"), ("z.dll", "z")]);
    let remote = InMemoryRemote::new().fail_uploads_ending_with(".bin");
    let sink = RecordingSink::new();
    let orchestrator = orchestrator(&remote, sink.clone(), None);

    let first = orchestrator
        .execute_deployment(&config(source.path(), "/srv/app").with_post_command("./start.sh"))
        .unwrap();

    let (step, message) = first.failure().unwrap();
    assert_eq!(step, DeployStep::UploadingPayload);
    assert!(message.contains("big.bin"), "{}", message);
    assert_eq!(first.sequence, Some(1));
    assert!(!orchestrator.state().is_deploying());
    // finalization still dispatches the post-command
    assert_eq!(remote.shell_commands(), vec!["./start.sh"]);
    assert!(first.clone().into_result().is_err());

    let retry = config(source.path(), "/srv/app").with_exclusions(ExclusionRules::parse(".bin"));
    let second = orchestrator.execute_deployment(&retry).unwrap();

    assert!(second.is_success(), "{:?}", second.status);
    assert_eq!(second.sequence, Some(2));
    assert_eq!(
        sink.count(|e| matches!(e, DeployEvent::Finished { .. })),
        2
    );
}

#[test]
fn unreachable_host_is_an_error_and_not_a_deployment() {
    let source = source_tree(&[("a.dll", "a")]);
    let remote = InMemoryRemote::new().fail_connect("no route to host");
    let sink = RecordingSink::new();
    let orchestrator = orchestrator(&remote, sink.clone(), None);

    let err = orchestrator
        .execute_deployment(&config(source.path(), "/srv/app"))
        .unwrap_err();

    assert!(matches!(err, DeployError::Connection { .. }));
    assert!(err.to_string().contains("raspberrypi:22"));
    assert_eq!(orchestrator.state().deployment_count(), 0);
    assert!(sink.events().is_empty());
}

#[test]
fn broken_pre_command_does_not_stop_the_upload() {
    let source = source_tree(&[("a.dll", "a")]);
    let remote = InMemoryRemote::new().fail_command(
        "systemctl stop app",
        ChannelError::CommandFailed("unit app.service not loaded".to_string()),
    );
    let sink = RecordingSink::new();
    let orchestrator = orchestrator(&remote, sink.clone(), None);

    let report = orchestrator
        .execute_deployment(&config(source.path(), "/srv/app").with_pre_command("systemctl stop app"))
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.warnings.len(), 1);
    assert!(remote.file("/srv/app/a.dll").is_some());
    assert_eq!(
        sink.count(|e| matches!(e, DeployEvent::CommandFailed { .. })),
        1
    );
}

#[test]
fn missing_build_output_never_touches_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let remote = InMemoryRemote::new();
    let orchestrator = orchestrator(&remote, RecordingSink::new(), None);

    let err = orchestrator
        .execute_deployment(&config(&dir.path().join("bin/Release"), "/srv/app"))
        .unwrap_err();

    assert!(matches!(err, DeployError::SourceNotFound { .. }));
    assert!(remote.operations().is_empty());
}
