//! Property tests for remote path normalization.

use std::path::PathBuf;

use proptest::prelude::*;

use sshdeploy::domain::value_objects::RemotePath;

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,10}".prop_filter("not a dot segment", |s| s != "." && s != "..")
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["/", "//", "\\", "/./"])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: normalized paths use single forward slashes only.
    #[test]
    fn property_normalized_paths_have_no_backslashes_or_empty_segments(
        segments in prop::collection::vec(segment(), 1..6),
        seps in prop::collection::vec(separator(), 6),
        absolute in any::<bool>(),
    ) {
        let mut raw = String::new();
        if absolute {
            raw.push('/');
        }
        for (i, s) in segments.iter().enumerate() {
            if i > 0 {
                raw.push_str(seps[i]);
            }
            raw.push_str(s);
        }
        raw.push_str(seps[0]);

        let path = RemotePath::new(&raw);
        prop_assert!(!path.as_str().contains('\\'));
        prop_assert!(!path.as_str().contains("//"));
        prop_assert_eq!(path.as_str().starts_with('/'), absolute);
        prop_assert_eq!(path.file_name(), segments.last().map(String::as_str));
    }

    /// PROPERTY: normalization is idempotent.
    #[test]
    fn property_normalization_is_idempotent(raw in "[A-Za-z/\\\\.]{0,32}") {
        let once = RemotePath::new(&raw);
        let twice = RemotePath::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: a local relative path joins under the base with `/`.
    #[test]
    fn property_join_local_keeps_every_segment(
        segments in prop::collection::vec(segment(), 1..5),
    ) {
        let base = RemotePath::new("/srv/app");
        let local: PathBuf = segments.iter().collect();
        let joined = base.join_local(&local);

        prop_assert!(joined.starts_with(&base));
        prop_assert_eq!(joined.as_str(), format!("/srv/app/{}", segments.join("/")));
    }

    /// PROPERTY: ancestors run from the top segment down to the path itself.
    #[test]
    fn property_ancestors_end_at_the_path(
        segments in prop::collection::vec(segment(), 1..6),
    ) {
        let path = RemotePath::new(format!("/{}", segments.join("/")));
        let ancestors = path.ancestors_from_root();

        prop_assert_eq!(ancestors.len(), segments.len());
        prop_assert_eq!(ancestors.last(), Some(&path));
        for pair in ancestors.windows(2) {
            let parent = pair[1].parent();
            prop_assert_eq!(parent.as_ref(), Some(&pair[0]));
        }
    }
}
