//! 配線: 標準アダプタで変換ハンドラを組み立てる

use std::path::Path;
use std::sync::Arc;

use common::adapter::{CompositeLog, FileJsonLog, StdEnvResolver, StdFileSystem, StderrLog};
use common::error::Error;
use common::llm::{LlmProvider, OpenAiOptions, OpenAiProvider};
use common::ports::outbound::{EnvResolver, FileSystem, Log, LogLevel};

use crate::adapter::{RandTokenGenerator, StdLlmCompletion};
use crate::cli::Config;
use crate::config::{load_file_config, resolve_settings, Settings};
use crate::http::RequestHandler;
use crate::ports::outbound::{LlmCompletion, TokenGenerator};
use crate::usecase::{ConvertDeps, ConvertUseCase};

/// 組み立て済みのアプリケーション
pub struct App {
    pub settings: Settings,
    pub fs: Arc<dyn FileSystem>,
    pub log: Arc<dyn Log>,
    pub handler: Arc<RequestHandler>,
}

/// stderr（verbose なら debug まで）と、指定があれば JSONL ファイルへのログ
pub fn build_log(fs: Arc<dyn FileSystem>, log_file: Option<&Path>, verbose: bool) -> Arc<dyn Log> {
    let min_level = if verbose { LogLevel::Debug } else { LogLevel::Info };
    let stderr: Arc<dyn Log> = Arc::new(StderrLog::new(min_level));
    match log_file {
        Some(path) => Arc::new(CompositeLog::new(vec![
            stderr,
            Arc::new(FileJsonLog::new(fs, path)),
        ])),
        None => stderr,
    }
}

/// API キーを環境変数から読む（無ければ起動失敗）
pub fn require_api_key(env: &dyn EnvResolver, name: &str) -> Result<String, Error> {
    env.var(name)
        .ok_or_else(|| Error::env(format!("environment variable {} is required.", name)))
}

/// 変換ユースケースと HTTP ハンドラを組み立てる（テストではスタブを渡す）
pub fn wire_handler(
    llm: Arc<dyn LlmCompletion>,
    token_generator: Arc<dyn TokenGenerator>,
    log: Arc<dyn Log>,
    max_tokens: u32,
) -> Arc<RequestHandler> {
    let convert = Arc::new(ConvertUseCase::new(ConvertDeps {
        token_generator,
        llm,
        log: Arc::clone(&log),
        max_tokens,
    }));
    Arc::new(RequestHandler::new(convert, log))
}

/// 配線: 設定を解決し、OpenAI プロバイダで App を組み立てる
pub fn wire_imed(config: &Config) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env = StdEnvResolver;

    let file = load_file_config(fs.as_ref(), &env, config.config_file.as_deref())?;
    let settings = resolve_settings(config, file, &env)?;
    let api_key = require_api_key(&env, &settings.api_key_env)?;
    let log = build_log(Arc::clone(&fs), settings.log_file.as_deref(), settings.verbose);

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(OpenAiOptions {
        base_url: settings.base_url.clone(),
        api_key,
        chat_model: settings.chat_model.clone(),
        text_model: settings.text_model.clone(),
        temperature: settings.temperature,
        timeout: settings.timeout,
    })?);
    let llm: Arc<dyn LlmCompletion> = Arc::new(StdLlmCompletion::new(provider, Arc::clone(&log)));
    let handler = wire_handler(
        llm,
        Arc::new(RandTokenGenerator),
        Arc::clone(&log),
        settings.max_tokens,
    );

    Ok(App {
        settings,
        fs,
        log,
        handler,
    })
}
