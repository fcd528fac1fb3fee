//! Integration tests for types

#[cfg(test)]
mod tests {
    use jtrans_types::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn test_report_serialization() {
        let mut changes = ChangeSet::new();
        changes.push(
            "a/b/Foo.class",
            ChangeKind::EntryRenamed {
                from: "a/b/Foo.class".to_string(),
                to: "x/y/Foo.class".to_string(),
            },
        );
        let report = TransformReport {
            action: ActionType::Jar,
            input: "in.jar".into(),
            output: Some("out.jar".into()),
            entries_visited: 3,
            changes,
            duration_ms: 5,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""action":"jar""#));
        assert!(report.has_changes());
        assert_eq!(report.entries_changed(), 1);
    }

    proptest! {
        #[test]
        fn prop_action_tag_case_insensitive(idx in 0usize..ActionType::ALL.len(), upper in any::<bool>()) {
            let action_type = ActionType::ALL[idx];
            let tag = if upper {
                action_type.name().to_ascii_uppercase()
            } else {
                action_type.name().to_string()
            };
            prop_assert_eq!(ActionType::from_str(&tag).unwrap(), action_type);
        }

        #[test]
        fn prop_bundle_value_round_trip(
            symbolic in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
            version in "[0-9]\\.[0-9]",
            name in "[A-Za-z ]{0,12}",
            description in "[A-Za-z ,]{0,16}",
            add_name in any::<bool>(),
            add_description in any::<bool>(),
        ) {
            let update = BundleUpdate {
                symbolic_name: symbolic,
                version,
                name: name.trim().to_string(),
                add_name,
                description: description.trim().to_string(),
                add_description,
            };
            let reparsed = BundleUpdate::parse("key", &update.to_rule_value()).unwrap();
            prop_assert_eq!(reparsed, update);
        }
    }
}
