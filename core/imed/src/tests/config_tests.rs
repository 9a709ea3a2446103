use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::adapter::StdFileSystem;
use common::domain::{HomeDir, ModelName};
use common::error::Error;
use common::ports::outbound::EnvResolver;

use crate::cli::{parse_args_from, Config};
use crate::config::{load_file_config, resolve_settings, FileConfig, DEFAULT_SOCKET_PATH};
use crate::wiring::require_api_key;

/// テスト用: HashMap から読む EnvResolver（ホームは IMED_HOME のみ）
#[derive(Default)]
struct MapEnv(HashMap<String, String>);

impl MapEnv {
    fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl EnvResolver for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn resolve_home_dir(&self) -> Result<HomeDir, Error> {
        self.var("IMED_HOME")
            .map(|h| HomeDir::new(PathBuf::from(h)))
            .ok_or_else(|| Error::env("HOME is not set"))
    }
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_defaults_without_any_source() {
    let settings = resolve_settings(&Config::default(), FileConfig::default(), &MapEnv::default())
        .unwrap();
    assert_eq!(settings.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
    assert_eq!(settings.socket_path, PathBuf::from("/tmp/chatgpt-ime.sock"));
    assert_eq!(settings.base_url, "https://api.openai.com/v1");
    assert_eq!(settings.chat_model, ModelName::new("gpt-3.5-turbo"));
    assert_eq!(settings.text_model, ModelName::new("gpt-3.5-turbo-instruct"));
    assert_eq!(settings.temperature, None);
    assert_eq!(settings.max_tokens, 128);
    assert_eq!(settings.api_key_env, "OPENAI_API_KEY");
    assert_eq!(settings.timeout, Duration::from_secs(30));
    assert_eq!(settings.log_file, None);
    assert!(!settings.verbose);
}

#[test]
fn test_missing_default_config_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let env = MapEnv::default().with("IMED_HOME", dir.path().to_str().unwrap());
    let file = load_file_config(&StdFileSystem, &env, None).unwrap();
    assert_eq!(file, FileConfig::default());

    // ホームが解決できなくても既定値で起動できる
    let file = load_file_config(&StdFileSystem, &MapEnv::default(), None).unwrap();
    assert_eq!(file, FileConfig::default());
}

#[test]
fn test_config_file_in_home_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        r#"{
            "socket_path": "/run/imed.sock",
            "chat_model": "gpt-4o-mini",
            "temperature": 0.2,
            "max_tokens": 64,
            "api_key_env": "MY_KEY",
            "timeout_secs": 5,
            "unknown_key": true
        }"#,
    );
    let env = MapEnv::default().with("IMED_HOME", dir.path().to_str().unwrap());
    let file = load_file_config(&StdFileSystem, &env, None).unwrap();
    let settings = resolve_settings(&Config::default(), file, &env).unwrap();

    assert_eq!(settings.socket_path, PathBuf::from("/run/imed.sock"));
    assert_eq!(settings.chat_model, ModelName::new("gpt-4o-mini"));
    assert_eq!(settings.text_model, ModelName::new("gpt-3.5-turbo-instruct"));
    assert_eq!(settings.temperature, Some(0.2));
    assert_eq!(settings.max_tokens, 64);
    assert_eq!(settings.api_key_env, "MY_KEY");
    assert_eq!(settings.timeout, Duration::from_secs(5));
}

#[test]
fn test_explicit_config_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = load_file_config(&StdFileSystem, &MapEnv::default(), Some(&missing)).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    let message = err.to_string();
    assert_eq!(message.matches(missing.to_str().unwrap()).count(), 1, "{}", message);
}

#[test]
fn test_broken_config_file_is_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "{ not json");
    let err = load_file_config(&StdFileSystem, &MapEnv::default(), Some(&path)).unwrap_err();
    assert!(matches!(err, Error::Json(ref m) if m.contains("config.json")));
}

#[test]
fn test_precedence_cli_over_env_over_file() {
    let file = FileConfig {
        socket_path: Some(PathBuf::from("/from/file.sock")),
        base_url: Some("http://file:1/v1".to_string()),
        text_model: Some("file-model".to_string()),
        log_file: Some(PathBuf::from("/from/file.jsonl")),
        ..Default::default()
    };
    let env = MapEnv::default().with("IMED_SOCKET", "/from/env.sock");

    let settings = resolve_settings(&Config::default(), file.clone(), &env).unwrap();
    assert_eq!(settings.socket_path, PathBuf::from("/from/env.sock"));
    assert_eq!(settings.base_url, "http://file:1/v1");
    assert_eq!(settings.text_model, ModelName::new("file-model"));

    let cli = parse_args_from(&[
        "imed",
        "-s",
        "/from/cli.sock",
        "--base-url",
        "http://cli:2/v1",
        "--text-model",
        "cli-model",
        "--log-file",
        "/from/cli.jsonl",
        "-v",
    ])
    .unwrap();
    let settings = resolve_settings(&cli, file, &env).unwrap();
    assert_eq!(settings.socket_path, PathBuf::from("/from/cli.sock"));
    assert_eq!(settings.base_url, "http://cli:2/v1");
    assert_eq!(settings.text_model, ModelName::new("cli-model"));
    assert_eq!(settings.log_file, Some(PathBuf::from("/from/cli.jsonl")));
    assert!(settings.verbose);
}

#[test]
fn test_invalid_values_are_usage_errors() {
    let env = MapEnv::default();
    let cases = [
        FileConfig {
            max_tokens: Some(0),
            ..Default::default()
        },
        FileConfig {
            timeout_secs: Some(0),
            ..Default::default()
        },
        FileConfig {
            temperature: Some(3.5),
            ..Default::default()
        },
        FileConfig {
            base_url: Some("api.openai.com".to_string()),
            ..Default::default()
        },
    ];
    for file in cases {
        let err = resolve_settings(&Config::default(), file, &env).unwrap_err();
        assert!(err.is_usage(), "{:?}", err);
    }
}

#[test]
fn test_api_key_is_required() {
    let err = require_api_key(&MapEnv::default(), "OPENAI_API_KEY").unwrap_err();
    assert_eq!(
        err.to_string(),
        "environment variable OPENAI_API_KEY is required."
    );
    assert_eq!(err.exit_code(), 78);

    let env = MapEnv::default().with("OPENAI_API_KEY", "sk-test");
    assert_eq!(require_api_key(&env, "OPENAI_API_KEY").unwrap(), "sk-test");
}
