use cos_sync::load_config::{load_config, Inputs};
use cos_sync_core::FlushType;
use serial_test::serial;
use std::env;
use std::fs::{create_dir_all, write};
use std::path::PathBuf;
use tempfile::{tempdir, NamedTempFile, TempDir};

fn workspace() -> (TempDir, PathBuf) {
    let ws = tempdir().expect("temp workspace");
    let root = ws.path().canonicalize().unwrap();
    (ws, root)
}

fn required_inputs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("INPUT_SECRET_ID", "AKIDtest"),
        ("INPUT_SECRET_KEY", "secret-key"),
        ("INPUT_REGION", "ap-shanghai"),
        ("INPUT_BUCKET", "site-1250000000"),
        ("INPUT_PREFIX", "web"),
        ("INPUT_ARTIFACTS", "dist/*.js,\n dist/index.html\n"),
    ]
}

fn inputs_with(overrides: &[(&'static str, &'static str)]) -> Inputs {
    let mut vars = required_inputs();
    for (k, v) in overrides {
        vars.retain(|(key, _)| key != k);
        vars.push((*k, *v));
    }
    Inputs::from_vars(vars)
}

#[test]
fn env_inputs_produce_a_normalized_config() {
    let (_ws, root) = workspace();
    let config = load_config(None, &inputs_with(&[]), &root).expect("Config should load");

    assert_eq!(config.credentials.secret_id, "AKIDtest");
    assert_eq!(config.region, "ap-shanghai");
    assert_eq!(config.bucket, "site-1250000000");
    assert_eq!(config.prefix, "web/");
    assert_eq!(config.patterns, vec!["dist/*.js", "dist/index.html"]);
    assert_eq!(config.flush_url, None);
    assert_eq!(config.flush_type, FlushType::Flush);
    assert!(!config.delete_remote);
    assert_eq!(config.working_dir, root);
}

#[test]
fn missing_required_input_is_named() {
    let (_ws, root) = workspace();
    let inputs = inputs_with(&[("INPUT_BUCKET", "")]);
    let err = load_config(None, &inputs, &root).unwrap_err();
    assert_eq!(err.to_string(), "Missing required input: bucket");
}

#[test]
fn delete_remote_accepts_yes_and_rejects_garbage() {
    let (_ws, root) = workspace();
    let config = load_config(None, &inputs_with(&[("INPUT_DELETE_REMOTE", "YES")]), &root)
        .expect("Config should load");
    assert!(config.delete_remote);

    let err = load_config(None, &inputs_with(&[("INPUT_DELETE_REMOTE", "perhaps")]), &root)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid boolean value for delete_remote: perhaps"
    );
}

#[test]
fn blank_artifacts_after_splitting_are_rejected() {
    let (_ws, root) = workspace();
    let err = load_config(None, &inputs_with(&[("INPUT_ARTIFACTS", " ,\n, ")]), &root)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No artifact patterns provided after normalization"
    );
}

#[test]
fn working_directory_must_stay_inside_workspace() {
    let (_ws, root) = workspace();
    create_dir_all(root.join("frontend")).unwrap();

    let config = load_config(
        None,
        &inputs_with(&[("INPUT_WORKING_DIRECTORY", "frontend")]),
        &root,
    )
    .expect("Config should load");
    assert_eq!(config.working_dir, root.join("frontend"));

    let err = load_config(
        None,
        &inputs_with(&[("INPUT_WORKING_DIRECTORY", "../../etc")]),
        &root,
    )
    .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("working_directory must be inside the workspace"),
        "{err}"
    );

    let err = load_config(
        None,
        &inputs_with(&[("INPUT_WORKING_DIRECTORY", "backend")]),
        &root,
    )
    .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("working_directory does not exist or is not a directory"),
        "{err}"
    );
}

#[test]
fn flush_inputs_are_parsed() {
    let (_ws, root) = workspace();
    let config = load_config(
        None,
        &inputs_with(&[
            ("INPUT_FLUSH_URL", " https://cdn.example.com/web/ "),
            ("INPUT_FLUSH_TYPE", "delete"),
        ]),
        &root,
    )
    .expect("Config should load");
    assert_eq!(
        config.flush_url.as_deref(),
        Some("https://cdn.example.com/web/")
    );
    assert_eq!(config.flush_type, FlushType::Delete);

    let err = load_config(None, &inputs_with(&[("INPUT_FLUSH_TYPE", "nuke")]), &root)
        .unwrap_err();
    assert!(err.to_string().contains("flush_type"), "{err}");
}

#[test]
fn static_file_supplies_defaults_and_env_overrides_it() {
    let (_ws, root) = workspace();
    let config_yaml = r#"
region: ap-beijing
bucket: from-file-1250000000
prefix: docs/
artifacts:
  - site/**
  - README.md
delete_remote: true
flush_url: https://cdn.example.com/docs/
"#;
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), config_yaml).unwrap();

    let inputs = Inputs::from_vars(vec![
        ("INPUT_SECRET_ID", "AKIDtest"),
        ("INPUT_SECRET_KEY", "secret-key"),
        ("INPUT_BUCKET", "from-env-1250000000"),
    ]);
    let config = load_config(Some(file.path()), &inputs, &root).expect("Config should load");

    assert_eq!(config.region, "ap-beijing");
    assert_eq!(config.bucket, "from-env-1250000000");
    assert_eq!(config.prefix, "docs/");
    assert_eq!(config.patterns, vec!["site/**", "README.md"]);
    assert!(config.delete_remote);
    assert_eq!(
        config.flush_url.as_deref(),
        Some("https://cdn.example.com/docs/")
    );
}

#[test]
fn static_file_must_not_carry_secrets() {
    let (_ws, root) = workspace();
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), "secret_key: oops\nbucket: b\n").unwrap();

    let err = load_config(Some(file.path()), &inputs_with(&[]), &root).unwrap_err();
    assert!(err.to_string().contains("parse"), "{err}");
}

#[test]
fn invalid_yaml_reports_parse_error() {
    let (_ws, root) = workspace();
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(Some(file.path()), &inputs_with(&[]), &root).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn inputs_are_read_from_process_environment() {
    env::set_var("INPUT_BUCKET", "env-bucket");
    env::set_var("INPUT_EMPTY_ONE", "");
    let inputs = Inputs::from_env();
    env::remove_var("INPUT_BUCKET");
    env::remove_var("INPUT_EMPTY_ONE");

    assert_eq!(inputs.get("bucket"), Some("env-bucket"));
    assert_eq!(inputs.get("empty_one"), None);
    assert_eq!(inputs.get("PATH"), None);
}

#[cfg(unix)]
#[test]
#[serial]
fn non_utf8_environment_entries_are_ignored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let junk = OsStr::from_bytes(b"caf\xe9");
    env::set_var("UNRELATED_LATIN1", junk);
    env::set_var("INPUT_REGION", "ap-chengdu");
    let inputs = Inputs::from_env();
    env::remove_var("UNRELATED_LATIN1");
    env::remove_var("INPUT_REGION");

    assert_eq!(inputs.get("region"), Some("ap-chengdu"));
    assert_eq!(inputs.get("unrelated_latin1"), None);
}
