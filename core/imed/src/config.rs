//! 設定の解決
//!
//! 優先順位はコマンドライン > 環境変数 > 設定ファイル > 既定値。
//! 設定ファイルは JSON で、未知のキーは無視する。

use common::domain::ModelName;
use common::error::Error;
use common::llm::openai::DEFAULT_BASE_URL;
use common::ports::outbound::{EnvResolver, FileSystem};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Config;
use crate::usecase::convert::DEFAULT_MAX_TOKENS;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/chatgpt-ime.sock";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// ソケットパスを上書きする環境変数
pub const SOCKET_ENV: &str = "IMED_SOCKET";

/// config.json の内容（すべて省略可）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub socket_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub text_model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// 解決済みの実行設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub socket_path: PathBuf,
    pub base_url: String,
    pub chat_model: ModelName,
    pub text_model: ModelName,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    /// API キーを読む環境変数名
    pub api_key_env: String,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

/// 設定ファイルを読む
///
/// `explicit` が指定されていればそのファイルが必須。未指定なら既定の場所を探し、
/// 無ければ（ホームが解決できない場合も）空の設定を返す。
pub fn load_file_config(
    fs: &dyn FileSystem,
    env: &dyn EnvResolver,
    explicit: Option<&Path>,
) -> Result<FileConfig, Error> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match env.resolve_config_path() {
            Ok(p) if fs.exists(&p) => p,
            _ => return Ok(FileConfig::default()),
        },
    };
    let content = fs.read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::json(format!("Invalid config '{}': {}", path.display(), e)))
}

/// コマンドライン・環境変数・設定ファイルを重ねて Settings にする
pub fn resolve_settings(
    cli: &Config,
    file: FileConfig,
    env: &dyn EnvResolver,
) -> Result<Settings, Error> {
    let socket_path = cli
        .socket
        .clone()
        .or_else(|| env.var(SOCKET_ENV).map(PathBuf::from))
        .or(file.socket_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH));
    if socket_path.as_os_str().is_empty() {
        return Err(Error::invalid_argument("socket path must not be empty"));
    }

    let base_url = cli
        .base_url
        .clone()
        .or(file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(Error::invalid_argument(format!(
            "base_url must start with http:// or https://: {}",
            base_url
        )));
    }

    let chat_model = cli
        .chat_model
        .clone()
        .or_else(|| file.chat_model.map(ModelName::new))
        .unwrap_or_else(|| ModelName::new(DEFAULT_CHAT_MODEL));
    let text_model = cli
        .text_model
        .clone()
        .or_else(|| file.text_model.map(ModelName::new))
        .unwrap_or_else(|| ModelName::new(DEFAULT_TEXT_MODEL));

    if let Some(t) = file.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(Error::invalid_argument(format!(
                "temperature must be between 0 and 2: {}",
                t
            )));
        }
    }

    let max_tokens = file.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(Error::invalid_argument("max_tokens must be positive"));
    }

    let timeout_secs = file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(Error::invalid_argument("timeout_secs must be positive"));
    }

    Ok(Settings {
        socket_path,
        base_url,
        chat_model,
        text_model,
        temperature: file.temperature,
        max_tokens,
        api_key_env: file
            .api_key_env
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
        timeout: Duration::from_secs(timeout_secs),
        log_file: cli.log_file.clone().or(file.log_file),
        verbose: cli.verbose,
    })
}
