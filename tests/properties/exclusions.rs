//! Property tests for suffix exclusion during the payload upload.

use std::collections::BTreeSet;

use proptest::prelude::*;

use sshdeploy::domain::value_objects::ExclusionRules;
use sshdeploy::infrastructure::InMemoryRemote;

use crate::common::*;

fn file_name() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", prop::sample::select(vec![".dll", ".pdb", ".json", ".so", ".xml"]))
        .prop_map(|(stem, ext)| format!("{}{}", stem, ext))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a file is uploaded exactly when no suffix matches its name.
    #[test]
    fn property_uploads_are_exactly_the_non_excluded_files(
        names in prop::collection::btree_set(file_name(), 1..12),
        suffixes in prop::collection::vec(
            prop::sample::select(vec![".pdb", ".xml", "b.json", ".so"]), 0..3),
    ) {
        let files: Vec<(String, String)> = names
            .iter()
            .map(|n| (format!("bin/{}", n), n.clone()))
            .collect();
        let refs: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        let source = source_tree(&refs);

        let rules = ExclusionRules::new(suffixes.iter().copied());
        let remote = InMemoryRemote::new();
        let orchestrator = orchestrator(&remote, RecordingSink::new(), None);
        let report = orchestrator
            .execute_deployment(&config(source.path(), "/srv/app").with_exclusions(rules))
            .unwrap();

        let expected: BTreeSet<String> = names
            .iter()
            .filter(|n| !suffixes.iter().any(|s| n.ends_with(s)))
            .map(|n| format!("/srv/app/bin/{}", n))
            .collect();
        let uploaded: BTreeSet<String> = remote
            .uploads()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        prop_assert!(report.is_success());
        prop_assert_eq!(report.files_uploaded, expected.len());
        prop_assert_eq!(report.files_excluded, names.len() - expected.len());
        prop_assert_eq!(uploaded, expected);
    }

    /// PROPERTY: matching is by exact, case-sensitive suffix of the file name.
    #[test]
    fn property_exclusion_is_a_plain_suffix_test(
        name in "[A-Za-z.]{0,16}",
        suffix in "[A-Za-z.]{1,4}",
    ) {
        let rules = ExclusionRules::new([suffix.clone()]);
        prop_assert_eq!(rules.is_excluded_name(&name), name.ends_with(&suffix));
    }
}
