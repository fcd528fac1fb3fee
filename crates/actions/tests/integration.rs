mod common;

use common::{class_file, composite, entry, rename_rule, unzip, utf8_constants, zip};
use jtrans_actions::{Composite, Rules};
use jtrans_errors::{DispatchError, Error};
use jtrans_rules::{SelectionRule, SignatureRule};
use jtrans_types::{ActionType, BundleUpdate, ChangeKind};
use std::fs;
use tempfile::TempDir;
use zip::CompressionMethod::{Deflated, Stored};

#[test]
fn test_header_file_rename() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("MANIFEST.MF");
    let output = temp.path().join("output_MANIFEST.MF");
    fs::write(&input, "Manifest-Version: 1.0\nKey: a.b.OldName\n").unwrap();

    let report = composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();

    assert_eq!(report.action, ActionType::Manifest);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Manifest-Version: 1.0\nKey: x.y.OldName\n"
    );
    assert_eq!(report.changes.len(), 1);
    let change = report.changes.iter().next().unwrap();
    assert_eq!(change.path, "MANIFEST.MF");
    assert_eq!(
        change.kind,
        ChangeKind::PackageRenamed {
            from: "a.b".into(),
            to: "x.y".into()
        }
    );
}

#[test]
fn test_nested_class_in_enterprise_archive() {
    let class = class_file("a/b/Foo", "a.b.Foo", "java/lang/String");
    let readme = b"plain text".to_vec();
    let jar = zip(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n", Deflated),
        ("a/b/Foo.class", &class, Deflated),
        ("README.txt", &readme, Deflated),
    ]);
    let descriptor = b"<application/>".to_vec();
    let ear = zip(&[
        ("META-INF/application.xml", &descriptor, Deflated),
        ("lib/app.jar", &jar, Stored),
    ]);

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.ear");
    let output = temp.path().join("output_app.ear");
    fs::write(&input, &ear).unwrap();

    let report = composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();
    assert_eq!(report.action, ActionType::Ear);

    let ear_entries = unzip(&fs::read(&output).unwrap());
    let names: Vec<_> = ear_entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["META-INF/application.xml", "lib/app.jar"]);
    assert_eq!(entry(&ear_entries, "META-INF/application.xml").content, descriptor);

    let jar_entry = entry(&ear_entries, "lib/app.jar");
    assert_eq!(jar_entry.method, Stored);
    let jar_entries = unzip(&jar_entry.content);
    let names: Vec<_> = jar_entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["META-INF/MANIFEST.MF", "x/y/Foo.class", "README.txt"]
    );
    assert_eq!(entry(&jar_entries, "README.txt").content, readme);

    let constants = utf8_constants(&entry(&jar_entries, "x/y/Foo.class").content);
    assert_eq!(constants[0], "x/y/Foo");
    assert_eq!(constants[1], "java/lang/Object");
    assert_eq!(constants[2], "x.y.Foo");

    assert!(report
        .changes
        .iter()
        .all(|c| c.path.starts_with("app.ear!/lib/app.jar!/")));
    assert!(report.changes.iter().any(|c| c.kind
        == ChangeKind::EntryRenamed {
            from: "a/b/Foo.class".into(),
            to: "x/y/Foo.class".into()
        }));
    assert_eq!(report.entries_changed(), 1);
    assert_eq!(report.entries_visited, 6);
}

#[test]
fn test_ear_does_not_descend_into_loose_classes() {
    let class = class_file("a/b/Foo", "text", "java/lang/String");
    let ear = zip(&[("a/b/Foo.class", &class, Deflated)]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.ear");
    fs::write(&input, &ear).unwrap();

    let report = composite(rename_rule())
        .transform(&input, Some(&temp.path().join("out.ear")), None)
        .unwrap();
    assert!(!report.has_changes());
    assert_eq!(fs::read(temp.path().join("out.ear")).unwrap(), ear);
}

fn bundle_manifest(update: &str) -> String {
    let signature = SignatureRule::builder()
        .renames([("a.b", "x.y")])
        .bundles([(
            "com.old.bundle",
            BundleUpdate::parse("com.old.bundle", update).unwrap(),
        )])
        .build()
        .unwrap();

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("MANIFEST.MF");
    let output = temp.path().join("out.MF");
    fs::write(
        &input,
        "Manifest-Version: 1.0\n\
         Bundle-SymbolicName: com.old.bundle;singleton:=true\n\
         Bundle-Version: 1.0.0\n\
         Bundle-Description: base\n",
    )
    .unwrap();
    composite(signature)
        .transform(&input, Some(&output), None)
        .unwrap();
    fs::read_to_string(output).unwrap()
}

#[test]
fn test_bundle_description_additive() {
    let manifest = bundle_manifest("com.new.bundle,2.0.0,New Name,+extra");
    assert!(manifest.contains("Bundle-Description: baseextra\n"));
    assert!(manifest.contains("Bundle-SymbolicName: com.new.bundle;singleton:=true\n"));
    assert!(manifest.contains("Bundle-Version: 2.0.0\n"));
    assert!(manifest.contains("Bundle-Name: New Name\n"));
}

#[test]
fn test_bundle_description_replaced() {
    let manifest = bundle_manifest("com.new.bundle,2.0.0,New Name,extra");
    assert!(manifest.contains("Bundle-Description: extra\n"));
}

#[test]
fn test_manifest_outside_meta_inf_is_plain_text() {
    let headers = b"Import-Package: a.b\n".as_slice();
    let jar = zip(&[
        ("META-INF/MANIFEST.MF", headers, Deflated),
        ("lib/MANIFEST.MF", headers, Deflated),
    ]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    let output = temp.path().join("out.jar");
    fs::write(&input, &jar).unwrap();

    let signature = SignatureRule::builder()
        .renames([("a.b", "x.y")])
        .versions([("x.y", "2")])
        .build()
        .unwrap();
    let report = composite(signature)
        .transform(&input, Some(&output), None)
        .unwrap();

    let after = unzip(&fs::read(&output).unwrap());
    assert_eq!(
        entry(&after, "META-INF/MANIFEST.MF").content,
        b"Import-Package: x.y;version=\"2\"\n"
    );
    assert_eq!(entry(&after, "lib/MANIFEST.MF").content, b"Import-Package: x.y\n");
    let versioned: Vec<_> = report
        .changes
        .iter()
        .filter(|c| matches!(c.kind, ChangeKind::VersionSet { .. }))
        .map(|c| c.path.as_str())
        .collect();
    assert_eq!(versioned, vec!["app.jar!/META-INF/MANIFEST.MF"]);
}

#[test]
fn test_excluded_entry_is_byte_identical() {
    let class = class_file("a/b/Foo", "a.b.Foo", "a/b/Bar");
    let jar = zip(&[
        ("a/b/Foo.class", &class, Deflated),
        ("a/b/Bar.class", &class_file("a/b/Bar", "x", "a/b/Foo"), Deflated),
    ]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    let output = temp.path().join("out.jar");
    fs::write(&input, &jar).unwrap();

    let rules = Rules::new(
        SelectionRule::new(["*"], ["a/b/Foo.class"]),
        rename_rule(),
    );
    Composite::new(rules)
        .transform(&input, Some(&output), None)
        .unwrap();

    let before = unzip(&jar);
    let after = unzip(&fs::read(&output).unwrap());
    let excluded = entry(&after, "a/b/Foo.class");
    assert_eq!(excluded.content, entry(&before, "a/b/Foo.class").content);
    assert_eq!(
        excluded.compressed_size,
        entry(&before, "a/b/Foo.class").compressed_size
    );
    assert_eq!(utf8_constants(&entry(&after, "x/y/Bar.class").content)[0], "x/y/Bar");
}

#[test]
fn test_compression_is_preserved() {
    let jar = zip(&[
        ("stored/Foo.class", &class_file("a/b/Foo", "s", "q/r/S"), Stored),
        ("deflated/Foo.class", &class_file("a/b/Foo", "s", "q/r/S"), Deflated),
        ("notes.txt", b"unchanged notes", Stored),
        ("more.txt", b"more unchanged notes", Deflated),
    ]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("lib.zip");
    let output = temp.path().join("out.zip");
    fs::write(&input, &jar).unwrap();

    composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();

    let after = unzip(&fs::read(&output).unwrap());
    assert_eq!(entry(&after, "stored/Foo.class").method, Stored);
    assert_eq!(entry(&after, "deflated/Foo.class").method, Deflated);
    assert_eq!(entry(&after, "notes.txt").method, Stored);
    assert_eq!(entry(&after, "more.txt").method, Deflated);
    assert_eq!(
        utf8_constants(&entry(&after, "stored/Foo.class").content)[0],
        "x/y/Foo"
    );
}

#[test]
fn test_directory_entries_are_renamed() {
    let jar = zip(&[
        ("a/", b"", Stored),
        ("a/b/", b"", Stored),
        ("a/b/Foo.class", &class_file("a/b/Foo", "s", "q/r/S"), Deflated),
    ]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    let output = temp.path().join("out.jar");
    fs::write(&input, &jar).unwrap();

    composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();

    let names: Vec<_> = unzip(&fs::read(&output).unwrap())
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["a/", "x/y/", "x/y/Foo.class"]);
}

#[test]
fn test_renamed_directory_merges_with_existing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    let output = temp.path().join("out.jar");

    for dirs in [["a/b/", "x/y/"], ["x/y/", "a/b/"]] {
        let jar = zip(&[
            (dirs[0], b"", Stored),
            (dirs[1], b"", Stored),
            ("a/b/Foo.class", &class_file("a/b/Foo", "s", "q/r/S"), Deflated),
        ]);
        fs::write(&input, &jar).unwrap();

        composite(rename_rule())
            .transform(&input, Some(&output), None)
            .unwrap();

        let names: Vec<_> = unzip(&fs::read(&output).unwrap())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["x/y/", "x/y/Foo.class"]);
        fs::remove_file(&output).unwrap();
    }
}

#[test]
fn test_unchanged_archive_is_copied() {
    let jar = zip(&[("q/r/S.class", &class_file("q/r/S", "s", "q/r/T"), Deflated)]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    let output = temp.path().join("out.jar");
    fs::write(&input, &jar).unwrap();

    let report = composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();
    assert!(!report.has_changes());
    assert_eq!(fs::read(&output).unwrap(), jar);
}

#[test]
fn test_service_descriptor_and_sources() {
    let jar = zip(&[
        (
            "META-INF/services/a.b.Spi",
            b"# providers\na.b.impl.Provider\nq.r.Other # kept\n",
            Deflated,
        ),
        (
            "a/b/Foo.java",
            b"package a.b;\n\nimport a.b.c.Bar;\n",
            Deflated,
        ),
    ]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    let output = temp.path().join("out.jar");
    fs::write(&input, &jar).unwrap();

    composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();

    let after = unzip(&fs::read(&output).unwrap());
    assert_eq!(
        entry(&after, "META-INF/services/x.y.Spi").content,
        b"# providers\nx.y.impl.Provider\nq.r.Other # kept\n"
    );
    assert_eq!(
        entry(&after, "x/y/Foo.java").content,
        b"package x.y;\n\nimport x.y.c.Bar;\n"
    );
}

#[test]
fn test_directory_tree() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("classes");
    fs::create_dir_all(input.join("a/b")).unwrap();
    fs::create_dir_all(input.join("empty")).unwrap();
    fs::write(
        input.join("a/b/Foo.class"),
        class_file("a/b/Foo", "s", "q/r/S"),
    )
    .unwrap();
    fs::write(input.join("notes.txt"), "a.b.Foo stays").unwrap();
    let output = temp.path().join("output_classes");

    let report = composite(rename_rule())
        .transform(&input, Some(&output), None)
        .unwrap();

    assert_eq!(report.action, ActionType::Directory);
    assert!(output.join("x/y/Foo.class").is_file());
    assert!(!output.join("a/b/Foo.class").exists());
    assert!(output.join("empty").is_dir());
    assert_eq!(
        fs::read_to_string(output.join("notes.txt")).unwrap(),
        "a.b.Foo stays"
    );
    assert!(report.changes.iter().all(|c| c.path == "x/y/Foo.class"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("MANIFEST.MF");
    fs::write(&input, "Key: a.b.OldName\n").unwrap();

    let report = composite(rename_rule())
        .transform(&input, None, None)
        .unwrap();
    assert!(report.has_changes());
    assert!(report.output.is_none());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn test_unrecognised_input() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.txt");
    fs::write(&input, "Key: a.b.OldName\n").unwrap();
    let composite = composite(rename_rule());

    let err = composite.transform(&input, None, None).unwrap_err();
    assert!(matches!(err, Error::Dispatch(DispatchError::NoAction { .. })));

    let report = composite
        .transform(&input, None, Some(ActionType::Feature))
        .unwrap();
    assert_eq!(report.action, ActionType::Feature);
    assert_eq!(report.changes.len(), 1);
}

#[test]
fn test_missing_input() {
    let temp = TempDir::new().unwrap();
    let err = composite(rename_rule())
        .transform(&temp.path().join("missing.jar"), None, None)
        .unwrap_err();
    assert!(matches!(err, Error::Dispatch(DispatchError::InputMissing { .. })));
}

#[test]
fn test_malformed_class_fails() {
    let jar = zip(&[("a/b/Foo.class", b"\xCA\xFE\xBA\xBE\x00", Deflated)]);
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("app.jar");
    fs::write(&input, &jar).unwrap();

    let err = composite(rename_rule())
        .transform(&input, None, None)
        .unwrap_err();
    assert!(matches!(err, Error::Transform(_)));
}
