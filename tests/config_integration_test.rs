//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX` so they do not
//! observe each other's overrides.

use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use transform_relay::config::load_config;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDE_VARS: &[&str] = &[
    "URL",
    "METHOD",
    "PROPERTY",
    "PAYLOAD_PROPERTY",
    "HEADERS",
    "TOLERABLE_STATUS_CODES",
    "SERVICE_CONFIG_PROPERTY",
    "DO_STREAM",
    "DO_VERIFY_SSL",
    "TIMEOUT_SECONDS",
    "AUTHORIZATION",
    "HOST",
    "PORT",
    "LOG_LEVEL",
    "LOG_LOCAL_ENABLED",
    "LOG_LOCAL_PATH",
    "TEST_RELAY_CLIENT_SECRET",
];

fn cleanup_env_vars() {
    for var in OVERRIDE_VARS {
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
[endpoint]
url = "https://api.example.com/items/{{ _id }}"
method = "post"
property = "result"
payload_property = "body"
tolerable_status_codes = "4\\d\\d"
service_config_property = "cfg"
do_stream = false
tls_verify = false
timeout_seconds = 30

[endpoint.headers]
Content-Type = "application/json"

[authorization]
type = "basic"
basic = ["user", "pass"]

[server]
host = "127.0.0.1"
port = 8080

[logging]
level = "debug"
"#,
    );

    let config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.endpoint.url, "https://api.example.com/items/{{ _id }}");
    assert_eq!(config.endpoint.method, "POST");
    assert_eq!(config.endpoint.property, "result");
    assert_eq!(config.endpoint.payload_property, "body");
    assert_eq!(
        config.endpoint.tolerable_status_codes.as_deref(),
        Some(r"4\d\d")
    );
    assert_eq!(config.endpoint.service_config_property, "cfg");
    assert!(!config.endpoint.do_stream);
    assert!(!config.endpoint.tls_verify);
    assert_eq!(config.endpoint.timeout_seconds, Some(30));
    assert_eq!(
        config.endpoint.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );

    let authorization = config.authorization.unwrap();
    assert!(!authorization.is_oauth2());
    let (user, password) = authorization.basic.unwrap();
    assert_eq!(user, "user");
    assert_eq!(password.expose_secret().as_ref(), "pass");

    assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_environment_only_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("URL", "http://downstream/{{ entity._id }}");

    let config = load_config(None::<&str>).unwrap();
    cleanup_env_vars();

    assert_eq!(config.endpoint.url, "http://downstream/{{ entity._id }}");
    assert_eq!(config.endpoint.method, "GET");
    assert_eq!(config.endpoint.property, "response");
    assert_eq!(config.endpoint.payload_property, "payload");
    assert_eq!(config.endpoint.service_config_property, "service_config");
    assert!(config.endpoint.do_stream);
    assert!(config.endpoint.tls_verify);
    assert!(config.endpoint.tolerable_status_codes.is_none());
    assert!(config.authorization.is_none());
    assert_eq!(config.server.port, 5001);
}

#[test]
fn test_missing_url_fails_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let err = load_config(None::<&str>).unwrap_err();
    assert!(err.to_string().contains("endpoint.url"));
}

#[test]
fn test_env_overrides_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[endpoint]
url = "http://from-file/{{ _id }}"
method = "GET"
"#,
    );
    std::env::set_var("URL", "http://from-env/{{ _id }}");
    std::env::set_var("METHOD", "put");
    std::env::set_var("HEADERS", r#"{"Accept": "application/json"}"#);
    std::env::set_var("DO_STREAM", "False");
    std::env::set_var("PORT", "9000");

    let config = load_config(Some(file.path()));
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.endpoint.url, "http://from-env/{{ _id }}");
    assert_eq!(config.endpoint.method, "PUT");
    assert_eq!(
        config.endpoint.headers.get("Accept").map(String::as_str),
        Some("application/json")
    );
    assert!(!config.endpoint.do_stream);
    assert_eq!(config.server.port, 9000);
}

#[test]
fn test_authorization_env_descriptor() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("URL", "http://downstream/{{ _id }}");
    std::env::set_var(
        "AUTHORIZATION",
        r#"{"type": "oauth2", "oauth2": {"client_id": "relay", "client_secret": "s3cret", "token_url": "https://login.example.com/token", "scope": "api", "audience": "downstream"}}"#,
    );

    let config = load_config(None::<&str>);
    cleanup_env_vars();
    let config = config.unwrap();

    let authorization = config.authorization.unwrap();
    assert!(authorization.is_oauth2());
    let oauth2 = authorization.oauth2.unwrap();
    assert_eq!(oauth2.client_id, "relay");
    assert_eq!(oauth2.client_secret.expose_secret().as_ref(), "s3cret");
    assert_eq!(oauth2.scope.as_deref(), Some("api"));
    assert_eq!(
        oauth2.extra.get("audience").map(String::as_str),
        Some("downstream")
    );
}

#[test]
fn test_malformed_headers_env_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("URL", "http://downstream/{{ _id }}");
    std::env::set_var("HEADERS", "not json");

    let result = load_config(None::<&str>);
    cleanup_env_vars();

    assert!(result.unwrap_err().to_string().contains("HEADERS"));
}

#[test]
fn test_invalid_tolerable_pattern_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("URL", "http://downstream/{{ _id }}");
    std::env::set_var("TOLERABLE_STATUS_CODES", "4(");

    let result = load_config(None::<&str>);
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn test_env_var_substitution_in_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_RELAY_CLIENT_SECRET", "from-env");

    let file = write_config(
        r#"
[endpoint]
url = "http://downstream/{{ _id }}"

[authorization]
type = "oauth2"

[authorization.oauth2]
client_id = "relay"
client_secret = "${TEST_RELAY_CLIENT_SECRET}"
token_url = "https://login.example.com/token"
"#,
    );

    let config = load_config(Some(file.path()));
    cleanup_env_vars();
    let config = config.unwrap();

    let oauth2 = config.authorization.unwrap().oauth2.unwrap();
    assert_eq!(oauth2.client_secret.expose_secret().as_ref(), "from-env");
}
