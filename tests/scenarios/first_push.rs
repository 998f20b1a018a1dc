//! Scenario: first deployment of a published app to a fresh device.

use sshdeploy::domain::ports::{DeployEvent, DeployStep};
use sshdeploy::domain::value_objects::ExclusionRules;
use sshdeploy::infrastructure::{InMemoryRemote, RemoteOp};

use crate::common::*;

#[test]
fn publish_tree_lands_with_dependencies_flattened() {
    let source = source_tree(BLINKY_PUBLISH);
    let store = source_tree(BLINKY_STORE);
    let remote = InMemoryRemote::new();
    let sink = RecordingSink::new();
    let orchestrator = orchestrator(&remote, sink.clone(), Some(store.path()));

    let config = config(source.path(), "/home/pi/blinky")
        .with_exclusions(ExclusionRules::parse(".pdb"))
        .with_pre_command("sudo systemctl stop blinky")
        .with_post_command("dotnet /home/pi/blinky/Blinky.dll");

    let report = orchestrator.execute_deployment(&config).unwrap();

    assert!(report.is_success(), "{:?}", report.status);
    assert_eq!(report.sequence, Some(1));
    assert_eq!(report.dependencies_uploaded, 1);
    assert_eq!(report.files_uploaded, 5);
    assert_eq!(report.files_excluded, 1);

    assert_eq!(
        remote.file("/home/pi/blinky/Iot.Device.Bindings.dll").unwrap(),
        b"bindings"
    );
    assert_eq!(remote.file("/home/pi/blinky/Blinky.dll").unwrap(), b"app");
    assert_eq!(
        remote.file("/home/pi/blinky/wwwroot/css/site.css").unwrap(),
        b"body {}"
    );
    assert!(remote.file("/home/pi/blinky/Blinky.pdb").is_none());

    // every ancestor of the target exists
    assert!(remote.has_directory("/home"));
    assert!(remote.has_directory("/home/pi"));
    assert!(remote.has_directory("/home/pi/blinky/wwwroot/css"));

    assert_eq!(remote.executed_commands(), vec!["sudo systemctl stop blinky"]);
    assert_eq!(remote.shell_commands(), vec!["dotnet /home/pi/blinky/Blinky.dll"]);
}

#[test]
fn operator_sees_steps_in_order_with_finalization_last() {
    let source = source_tree(BLINKY_PUBLISH);
    let store = source_tree(BLINKY_STORE);
    let remote = InMemoryRemote::new();
    let sink = RecordingSink::new();
    let orchestrator = orchestrator(&remote, sink.clone(), Some(store.path()));

    let config = config(source.path(), "/home/pi/blinky").with_post_command("./run.sh");
    orchestrator.execute_deployment(&config).unwrap();

    assert_eq!(
        sink.steps(),
        vec![
            DeployStep::PreCommand,
            DeployStep::Preparing,
            DeployStep::UploadingDependencies,
            DeployStep::UploadingPayload,
            DeployStep::PostCommand,
        ]
    );

    let events = sink.events();
    let finished = events
        .iter()
        .position(|e| matches!(e, DeployEvent::Finished { sequence: 1, .. }))
        .unwrap();
    let post = events
        .iter()
        .position(|e| {
            matches!(
                e,
                DeployEvent::StepStarted {
                    step: DeployStep::PostCommand
                }
            )
        })
        .unwrap();
    assert!(finished < post, "lock is released before the post-command");
}

#[test]
fn one_session_per_push() {
    let source = source_tree(&[("app.dll", "x")]);
    let remote = InMemoryRemote::new();
    let orchestrator = orchestrator(&remote, RecordingSink::new(), None);

    orchestrator
        .execute_deployment(&config(source.path(), "/srv/app"))
        .unwrap();

    assert_eq!(remote.count(|op| matches!(op, RemoteOp::Connect(_))), 1);
    assert_eq!(remote.count(|op| matches!(op, RemoteOp::CloseFiles)), 1);
    assert_eq!(remote.count(|op| matches!(op, RemoteOp::CloseCommands)), 1);
}
