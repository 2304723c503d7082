//! Integration tests for layered configuration loading.
//!
//! Each test builds its own environment snapshot and flag list so nothing
//! depends on the process running the tests.

use serde_json::json;
use std::fs;
use std::path::Path;
use strataconf::config::{ArgvSource, ConfigLoader, EnvSource, LoadOptions};
use strataconf::error::ConfigError;
use tempfile::TempDir;

/// Helper to create a loader rooted at a temp directory with injected sources.
fn create_loader(
    base: &Path,
    env: &[(&str, &str)],
    argv: &[&str],
    options: LoadOptions,
) -> ConfigLoader {
    ConfigLoader::new(options)
        .base_dir(base)
        .env(EnvSource::from_pairs(env.iter().copied()))
        .argv(ArgvSource::from_args(argv.iter().copied()))
}

fn write_json(dir: &Path, name: &str, content: serde_json::Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content.to_string()).unwrap();
}

#[tokio::test]
async fn test_env_and_argv_with_prefix() {
    let temp = TempDir::new().unwrap();
    let config = create_loader(
        temp.path(),
        &[
            ("my_app_domain", "a.com"),
            ("my_app_redis_auth", "x"),
            ("HOME", "/home/someone"),
        ],
        &["--cookie_secret=barfoo", "--http_port=8080"],
        LoadOptions::default().with_prefix("my_app"),
    )
    .load()
    .await
    .unwrap();

    assert_eq!(
        config.to_json(),
        json!({
            "domain": "a.com",
            "redis": {"auth": "x"},
            "cookie": {"secret": "barfoo"},
            "http": {"port": 8080}
        })
    );
    assert_eq!(config.get("http.port").and_then(|v| v.as_i64()), Some(8080));
    assert!(config.is_sealed());
}

#[tokio::test]
async fn test_argv_ignores_prefix() {
    let temp = TempDir::new().unwrap();
    let config = create_loader(
        temp.path(),
        &[("other_port", "1")],
        &["--other_port=2"],
        LoadOptions::default().with_prefix("my_app"),
    )
    .load()
    .await
    .unwrap();

    assert_eq!(config.to_json(), json!({"other": {"port": 2}}));
}

#[tokio::test]
async fn test_short_key_and_long_key_share_a_path() {
    let temp = TempDir::new().unwrap();
    let config = create_loader(
        temp.path(),
        &[("a", "x"), ("a_b", "y")],
        &[],
        LoadOptions::default(),
    )
    .load()
    .await
    .unwrap();

    assert_eq!(config.to_json(), json!({"a": {"_": "x", "b": "y"}}));
    let a = config.get("a").unwrap();
    assert_eq!(a.own_value().and_then(|v| v.as_str()), Some("x"));
}

#[tokio::test]
async fn test_precedence_env_then_files_then_argv() {
    let temp = TempDir::new().unwrap();
    write_json(
        temp.path(),
        "base.json",
        json!({"port": 1, "host": "base", "db": {"name": "app", "pool": 5}}),
    );
    write_json(
        temp.path(),
        "local.json",
        json!({"port": 2, "db": {"pool": 10}, "tags": ["a", "b"]}),
    );

    let config = create_loader(
        temp.path(),
        &[("PORT", "0"), ("HOST", "env"), ("TAGS", "x"), ("DEBUG", "true")],
        &["--port=3", "--db.name=override"],
        LoadOptions::default(),
    )
    .files(["base", "local"])
    .load()
    .await
    .unwrap();

    assert_eq!(
        config.to_json(),
        json!({
            "port": 3,
            "host": "base",
            "debug": true,
            "tags": ["a", "b"],
            "db": {"name": "override", "pool": 10}
        })
    );
}

#[tokio::test]
async fn test_environment_file_found_in_searched_dirs() {
    let temp = TempDir::new().unwrap();
    write_json(&temp.path().join("config"), "staging.json", json!({"level": "config"}));
    write_json(
        &temp.path().join("config/local"),
        "staging.json",
        json!({"level": "local", "extra": true}),
    );

    let config = create_loader(
        temp.path(),
        &[("APP_ENV", "staging")],
        &[],
        LoadOptions::default().with_dirs(["config", "config/local"]),
    )
    .load()
    .await
    .unwrap();

    assert_eq!(
        config.to_json(),
        json!({"app": {"env": "staging"}, "level": "local", "extra": true})
    );
}

#[tokio::test]
async fn test_environment_files_merge_after_explicit_files() {
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "base.json", json!({"level": "base"}));
    write_json(&temp.path().join("config"), "development.json", json!({"level": "dev"}));

    let config = create_loader(
        temp.path(),
        &[],
        &[],
        LoadOptions::default().with_dir("config"),
    )
    .file("base")
    .load()
    .await
    .unwrap();

    assert_eq!(config.to_json(), json!({"level": "dev"}));
}

#[tokio::test]
async fn test_missing_environment_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("config")).unwrap();

    let config = create_loader(
        temp.path(),
        &[],
        &["--ok"],
        LoadOptions::default()
            .with_dirs(["config", "does-not-exist"])
            .with_environment("production"),
    )
    .load()
    .await
    .unwrap();

    assert_eq!(config.to_json(), json!({"ok": true}));
}

#[tokio::test]
async fn test_missing_explicit_file_fails_the_load() {
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "base.json", json!({"a": 1}));

    let err = create_loader(temp.path(), &[], &[], LoadOptions::default())
        .files(["base", "missing"])
        .load()
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.path(), Some(temp.path().join("missing.json").as_path()));
}

#[tokio::test]
async fn test_invalid_json_reports_absolute_path() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("broken.json"), "{\"a\": ").unwrap();

    let err = create_loader(temp.path(), &[], &[], LoadOptions::default())
        .file("broken")
        .load()
        .await
        .unwrap_err();

    let expected_path = temp.path().join("broken.json");
    assert!(matches!(err, ConfigError::Parse { ref path, .. } if *path == expected_path));
    assert!(
        err.to_string()
            .ends_with(&format!("in file '{}'", expected_path.display()))
    );
}

#[tokio::test]
async fn test_callback_receives_same_result() {
    let temp = TempDir::new().unwrap();
    let mut seen = None;

    let result = create_loader(temp.path(), &[("name", "svc")], &[], LoadOptions::default())
        .load_with_callback(|result| {
            seen = Some(result.as_ref().map(|config| config.to_json()).map_err(|e| e.to_string()));
        })
        .await;

    let returned = result.unwrap().to_json();
    assert_eq!(seen, Some(Ok(returned)));
}

#[tokio::test]
async fn test_callback_receives_same_error() {
    let temp = TempDir::new().unwrap();
    let mut calls = 0;
    let mut seen = None;

    let result = create_loader(temp.path(), &[], &[], LoadOptions::default())
        .file("nope")
        .load_with_callback(|result| {
            calls += 1;
            seen = result.as_ref().err().map(|e| e.to_string());
        })
        .await;

    assert_eq!(calls, 1);
    assert_eq!(seen, Some(result.unwrap_err().to_string()));
}

#[tokio::test]
async fn test_sealed_result_rejects_changes_inside_arrays() {
    let temp = TempDir::new().unwrap();
    write_json(
        temp.path(),
        "servers.json",
        json!({"servers": [{"host": "a"}, {"host": "b"}]}),
    );

    let mut config = create_loader(temp.path(), &[], &[], LoadOptions::default())
        .file("servers")
        .load()
        .await
        .unwrap();

    assert!(matches!(config.root_mut(), Err(ConfigError::Sealed)));
    let before = config.to_json();
    let config = config.seal();
    assert_eq!(config.to_json(), before);
}

#[tokio::test]
async fn test_underscore_in_file_meets_flat_collision() {
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "redis.json", json!({"redis": {"_": "cluster"}}));

    let config = create_loader(
        temp.path(),
        &[("redis", "single"), ("redis_port", "6379")],
        &[],
        LoadOptions::default(),
    )
    .file("redis")
    .load()
    .await
    .unwrap();

    assert_eq!(
        config.to_json(),
        json!({"redis": {"_": "cluster", "port": 6379}})
    );
}

#[tokio::test]
async fn test_file_scalar_keeps_env_children() {
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "db.json", json!({"db": "sqlite://x"}));

    let config = create_loader(
        temp.path(),
        &[("DB_POOL", "5")],
        &[],
        LoadOptions::default(),
    )
    .file("db")
    .load()
    .await
    .unwrap();

    assert_eq!(
        config.to_json(),
        json!({"db": {"_": "sqlite://x", "pool": 5}})
    );
    let db = config.get("db").unwrap();
    assert_eq!(db.own_value().and_then(|v| v.as_str()), Some("sqlite://x"));
}

#[tokio::test]
async fn test_free_function_load_reads_files() {
    let temp = TempDir::new().unwrap();
    write_json(
        temp.path(),
        "only.json",
        json!({"strataconf_fixture": {"marker": "from-file"}}),
    );

    // The free function reads the real process arguments, so only a key the
    // test runner's own flags cannot produce is asserted on.
    let config = strataconf::load(
        [temp.path().join("only.json")],
        LoadOptions::default().with_prefix("strataconf_test_unlikely_prefix"),
    )
    .await
    .unwrap();

    assert!(config.is_sealed());
    assert_eq!(
        config
            .get("strataconf_fixture.marker")
            .and_then(|v| v.as_str()),
        Some("from-file")
    );
}

#[tokio::test]
async fn test_explicit_absolute_file_with_injected_sources() {
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "only.json", json!({"k": "v"}));

    let config = create_loader(
        Path::new("/unused-base"),
        &[],
        &[],
        LoadOptions::default().with_freeze(false),
    )
    .file(temp.path().join("only.json"))
    .load()
    .await
    .unwrap();

    assert!(!config.is_sealed());
    assert_eq!(config.to_json(), json!({"k": "v"}));
}
