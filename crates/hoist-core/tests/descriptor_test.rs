use std::collections::BTreeMap;

use hoist_core::ReleaseDescriptor;
use proptest::prelude::*;
use tempfile::TempDir;

fn sample() -> ReleaseDescriptor {
    ReleaseDescriptor {
        app_name: "hello-world".to_owned(),
        image_uri: "123456789012.dkr.ecr.us-east-1.amazonaws.com/hello-world:20240101120000"
            .to_owned(),
        region: "us-east-1".to_owned(),
        container_port: 5000,
        desired_count: 1,
        extra_env: BTreeMap::from([(
            "GUNICORN_CMD_ARGS".to_owned(),
            "--access-logfile - --log-level info".to_owned(),
        )]),
    }
}

// ── Rendering ──

#[test]
fn render_matches_fixed_grammar() {
    let text = sample().render();

    assert_eq!(
        text,
        "app_name       = \"hello-world\"\n\
         image_uri      = \"123456789012.dkr.ecr.us-east-1.amazonaws.com/hello-world:20240101120000\"\n\
         aws_region     = \"us-east-1\"\n\
         container_port = 5000\n\
         desired_count  = 1\n\
         extra_env      = { \"GUNICORN_CMD_ARGS\" = \"--access-logfile - --log-level info\" }\n"
    );
}

#[test]
fn render_empty_env_as_explicit_block() {
    let descriptor = ReleaseDescriptor {
        extra_env: BTreeMap::new(),
        ..sample()
    };

    assert!(descriptor.render().contains("extra_env      = {}\n"));
}

#[test]
fn render_multiple_env_entries_sorted() {
    let descriptor = ReleaseDescriptor {
        extra_env: BTreeMap::from([
            ("ZETA".to_owned(), "z".to_owned()),
            ("ALPHA".to_owned(), "a".to_owned()),
        ]),
        ..sample()
    };

    assert!(
        descriptor
            .render()
            .contains("extra_env      = { \"ALPHA\" = \"a\", \"ZETA\" = \"z\" }")
    );
}

#[test]
fn render_escapes_keys_and_values() {
    let descriptor = ReleaseDescriptor {
        extra_env: BTreeMap::from([(r#"WE"IRD\KEY"#.to_owned(), r#"say "hi" \o/"#.to_owned())]),
        ..sample()
    };

    assert!(
        descriptor
            .render()
            .contains(r#"{ "WE\"IRD\\KEY" = "say \"hi\" \\o/" }"#)
    );
}

// ── Write / Read ──

#[test]
fn write_creates_parent_dirs_and_reads_back() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("infra").join("terraform.tfvars");

    let written = sample().write(&path).unwrap();

    assert_eq!(written, path);
    assert_eq!(ReleaseDescriptor::read(&path).unwrap(), sample());
}

#[test]
fn write_fully_overwrites_previous_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("terraform.tfvars");
    std::fs::write(&path, "legacy_var = \"keep me?\"\nextra = 1\n").unwrap();

    let descriptor = ReleaseDescriptor {
        extra_env: BTreeMap::new(),
        ..sample()
    };
    descriptor.write(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("legacy_var"));
    assert_eq!(content, descriptor.render());
}

#[test]
fn read_missing_file_is_error() {
    let tmp = TempDir::new().unwrap();
    let err = ReleaseDescriptor::read(&tmp.path().join("nope.tfvars")).unwrap_err();
    assert!(matches!(err, hoist_core::Error::DescriptorRead { .. }));
}

// ── Parsing ──

#[test]
fn parse_tolerates_comments_and_unknown_keys() {
    let text = format!("# generated\n{}owner = \"ops\"\n", sample().render());
    assert_eq!(ReleaseDescriptor::parse(&text).unwrap(), sample());
}

#[test]
fn parse_rejects_missing_field() {
    let text = "app_name = \"a\"\nimage_uri = \"b\"\n";
    assert!(ReleaseDescriptor::parse(text).is_err());
}

#[test]
fn parse_rejects_unterminated_string() {
    let text = sample().render().replace("\"us-east-1\"", "\"us-east-1");
    let err = ReleaseDescriptor::parse(&text).unwrap_err();
    assert!(matches!(err, hoist_core::Error::DescriptorParse { line: 3, .. }));
}

#[test]
fn parse_rejects_out_of_range_port() {
    let text = sample()
        .render()
        .replace("container_port = 5000", "container_port = 70000");
    assert!(ReleaseDescriptor::parse(&text).is_err());
}

// ── Property tests ──

fn env_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("\\PC{0,12}", "\\PC{0,24}", 0..5)
}

proptest! {
    #[test]
    fn roundtrip_preserves_all_values(
        app_name in "\\PC{0,20}",
        image_uri in "\\PC{0,40}",
        region in "[a-z]{2}-[a-z]{4,9}-[1-3]",
        container_port in 2u16..=u16::MAX,
        desired_count in 0u32..100,
        extra_env in env_map(),
    ) {
        let descriptor = ReleaseDescriptor {
            app_name,
            image_uri,
            region,
            container_port,
            desired_count,
            extra_env,
        };
        let parsed = ReleaseDescriptor::parse(&descriptor.render()).unwrap();
        prop_assert_eq!(parsed, descriptor);
    }

    #[test]
    fn roundtrip_with_hostile_characters(
        key in "[\"\\\\${}%\\n\\t a-z]{0,10}",
        value in "[\"\\\\${}%\\n\\r a-z]{0,16}",
    ) {
        let descriptor = ReleaseDescriptor {
            extra_env: BTreeMap::from([(key, value)]),
            ..sample()
        };
        let parsed = ReleaseDescriptor::parse(&descriptor.render()).unwrap();
        prop_assert_eq!(parsed, descriptor);
    }

    #[test]
    fn rendered_descriptor_has_six_lines(extra_env in env_map()) {
        let descriptor = ReleaseDescriptor { extra_env, ..sample() };
        prop_assert_eq!(descriptor.render().lines().count(), 6);
    }

    #[test]
    fn parse_never_panics(s in "\\PC*") {
        let _ = ReleaseDescriptor::parse(&s);
    }
}
