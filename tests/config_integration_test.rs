//! Integration tests for configuration loading and validation
//!
//! Tests touching environment variables hold ENV_MUTEX so they do not
//! interfere with each other.

use bastion::config::{load_config, CredentialConfig, StoreBackend};
use bastion::domain::BastionError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "BASTION_APPLICATION_LOG_LEVEL",
        "BASTION_APPLICATION_DRY_RUN",
        "BASTION_STORE_PROJECT_ID",
        "BASTION_STORE_CREDENTIAL_JSON",
        "BASTION_STORE_CREDENTIAL_PATH",
        "BASTION_MIGRATION_MAX_CONCURRENCY",
        "BASTION_EXPORT_OUTPUT_DIR",
        "TEST_FIRESTORE_KEY",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[store]
backend = "firestore"
project_id = "fatins"
database_id = "campaign"
base_url = "http://localhost:8080/v1"
timeout_seconds = 10
page_size = 50

[store.credential]
type = "file"
path = "/secrets/sa.json"

[migration]
default_collection = "characters"
default_document_id = "c1"
max_concurrency = 16

[export]
restricted_collection = "users"
restricted_document_id = "u1"
output_dir = "/var/backups/fatins"
file_prefix = "nightly"

[logging]
local_enabled = true
local_path = "/var/log/bastion"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.store.backend, StoreBackend::Firestore);
    assert_eq!(config.store.database_id, "campaign");
    assert_eq!(config.store.page_size, 50);
    assert!(matches!(
        config.store.credential,
        Some(CredentialConfig::File { ref path }) if path == "/secrets/sa.json"
    ));
    assert_eq!(
        config.migration.default_path().unwrap().to_string(),
        "characters/c1"
    );
    assert_eq!(config.migration.max_concurrency, 16);
    assert_eq!(config.export.restricted_path().unwrap().to_string(), "users/u1");
    assert_eq!(config.export.file_prefix, "nightly");
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_minimal_local_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[store]
backend = "local"
local_path = "data/store.json"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.store.backend, StoreBackend::Local);
    assert!(config.store.credential.is_none());
    assert_eq!(
        config.migration.default_path().unwrap().to_string(),
        "users/TQAmmVfIpOeNiRflXKSeL1NX2ak2"
    );
    assert_eq!(config.migration.max_concurrency, 8);
    assert_eq!(config.export.file_prefix, "firestore_backup");
}

#[test]
fn test_embedded_credential_from_environment() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_FIRESTORE_KEY", "{\"client_email\":\"svc@fatins.iam\"}");

    let file = write_config(
        r#"
[store]
project_id = "fatins"

[store.credential]
type = "embedded"
json = '${TEST_FIRESTORE_KEY}'
"#,
    );

    let config = load_config(file.path()).unwrap();
    cleanup_env_vars();

    match config.store.credential {
        Some(CredentialConfig::Embedded { json }) => {
            let raw: &str = json.expose_secret().as_ref();
            assert!(raw.contains("svc@fatins.iam"));
        }
        other => panic!("unexpected credential: {other:?}"),
    }
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[store]
project_id = "${TEST_FIRESTORE_PROJECT_THAT_IS_NOT_SET}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();

    assert!(matches!(err, BastionError::Configuration(_)));
    assert!(err
        .to_string()
        .contains("TEST_FIRESTORE_PROJECT_THAT_IS_NOT_SET"));
}

#[test]
fn test_environment_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("BASTION_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("BASTION_STORE_PROJECT_ID", "fatins-staging");
    std::env::set_var("BASTION_MIGRATION_MAX_CONCURRENCY", "2");
    std::env::set_var("BASTION_EXPORT_OUTPUT_DIR", "/tmp/fatins");

    let file = write_config(
        r#"
[store]
project_id = "fatins"
"#,
    );

    let config = load_config(file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.store.project_id, "fatins-staging");
    assert_eq!(config.migration.max_concurrency, 2);
    assert_eq!(config.export.output_dir, "/tmp/fatins");
}

#[test]
fn test_validation_failures() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        // firestore needs a project
        "[store]\nbackend = \"firestore\"\n",
        "[store]\nproject_id = \"p\"\n[migration]\nmax_concurrency = 0\n",
        "[store]\nproject_id = \"p\"\n[export]\nfile_prefix = \"a/b\"\n",
        "[store]\nproject_id = \"p\"\n[migration]\ndefault_document_id = \"a/b\"\n",
        "[store]\nproject_id = \"p\"\n[logging]\nlocal_rotation = \"weekly\"\n",
        "[application]\nlog_level = \"loud\"\n[store]\nproject_id = \"p\"\n",
    ];

    for case in cases {
        let file = write_config(case);
        let err = load_config(file.path()).unwrap_err();
        assert!(
            matches!(err, BastionError::Configuration(_)),
            "expected configuration error for:\n{case}"
        );
    }
}
