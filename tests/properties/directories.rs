//! Property tests for idempotent remote directory preparation.

use proptest::prelude::*;

use sshdeploy::application::RemotePathPreparer;
use sshdeploy::domain::ports::{NoopEventSink, SessionProvider};
use sshdeploy::domain::value_objects::RemotePath;
use sshdeploy::infrastructure::{InMemoryRemote, RemoteOp};
use sshdeploy::ConnectionInfo;

fn remote_dir() -> impl Strategy<Value = RemotePath> {
    prop::collection::vec(prop::sample::select(vec!["srv", "app", "lib", "bin", "x"]), 1..5)
        .prop_map(|segments| RemotePath::new(format!("/{}", segments.join("/"))))
}

fn creates(remote: &InMemoryRemote) -> usize {
    remote.count(|op| matches!(op, RemoteOp::CreateDirectory(_)))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: ensuring the same directories twice creates nothing new.
    #[test]
    fn property_second_preparation_creates_no_directories(
        dirs in prop::collection::vec(remote_dir(), 1..6),
    ) {
        let remote = InMemoryRemote::new();
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();

        let first = RemotePathPreparer::new(session.files(), &NoopEventSink);
        for dir in &dirs {
            first.ensure_directory(dir).unwrap();
        }
        let after_first = creates(&remote);
        prop_assert_eq!(first.directories_created(), after_first);

        let second = RemotePathPreparer::new(session.files(), &NoopEventSink);
        for dir in &dirs {
            second.ensure_directory(dir).unwrap();
        }
        prop_assert_eq!(second.directories_created(), 0);
        prop_assert_eq!(creates(&remote), after_first);

        for dir in &dirs {
            prop_assert!(remote.has_directory(dir.as_str()));
        }
    }

    /// PROPERTY: every segment is created at most once, parents first.
    #[test]
    fn property_each_segment_is_created_once_parent_first(
        dirs in prop::collection::vec(remote_dir(), 1..6),
    ) {
        let remote = InMemoryRemote::new();
        let session = remote.connect(&ConnectionInfo::new("pi")).unwrap();
        let preparer = RemotePathPreparer::new(session.files(), &NoopEventSink);
        for dir in &dirs {
            preparer.ensure_directory(dir).unwrap();
        }

        let created = remote.created_directories();
        for (i, dir) in created.iter().enumerate() {
            prop_assert!(!created[..i].contains(dir), "{} created twice", dir);
            if let Some(parent) = dir.parent().filter(|p| !p.is_root()) {
                prop_assert!(created[..i].contains(&parent), "{} before its parent", dir);
            }
        }
    }
}
