use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::ModelName;
use common::error::Error;
use std::path::PathBuf;

/// コマンドライン指定（未指定の項目は環境変数・設定ファイル・既定値で埋める）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: debug レベルまで stderr に出す（バックエンドの生応答を含む）
    pub verbose: bool,
    pub socket: Option<PathBuf>,
    /// -c / --config: 既定の場所の代わりに読む設定ファイル
    pub config_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub chat_model: Option<ModelName>,
    pub text_model: Option<ModelName>,
    /// --log-file: JSONL ログの出力先
    pub log_file: Option<PathBuf>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("imed")
        .about("Kana-kanji conversion bridge to an LLM over a Unix socket")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit debug logs to stderr (includes raw backend replies)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("socket")
                .short('s')
                .long("socket")
                .value_name("path")
                .help("Unix socket path to listen on")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .value_name("file")
                .help("Read settings from this JSON file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("base-url")
                .long("base-url")
                .value_name("url")
                .help("OpenAI-compatible API base URL")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("chat-model")
                .long("chat-model")
                .value_name("model")
                .help("Model for the /chat endpoint")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("text-model")
                .long("text-model")
                .value_name("model")
                .help("Model for the /text endpoint")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("log-file")
                .long("log-file")
                .value_name("file")
                .help("Append JSONL logs to this file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    Config {
        help: matches.get_flag("help"),
        verbose: matches.get_flag("verbose"),
        socket: matches.get_one::<PathBuf>("socket").cloned(),
        config_file: matches.get_one::<PathBuf>("config").cloned(),
        base_url: matches.get_one::<String>("base-url").cloned(),
        chat_model: matches
            .get_one::<String>("chat-model")
            .map(|s| ModelName::new(s.clone())),
        text_model: matches
            .get_one::<String>("text-model")
            .map(|s| ModelName::new(s.clone())),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[cfg(test)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "imed", &mut std::io::stdout());
}

pub fn print_usage() {
    eprintln!("Usage: imed [options]");
}

pub fn print_help() {
    println!("Usage: imed [options]");
    println!("Options:");
    println!("  -h, --help                Show this help message");
    println!("  -v, --verbose             Emit debug logs to stderr (includes raw backend replies)");
    println!("  -s, --socket <path>       Unix socket path to listen on. Default: /tmp/chatgpt-ime.sock");
    println!("  -c, --config <file>       Read settings from this JSON file instead of the default location");
    println!("  --base-url <url>          OpenAI-compatible API base URL. Default: https://api.openai.com/v1");
    println!("  --chat-model <model>      Model for /chat. Default: gpt-3.5-turbo");
    println!("  --text-model <model>      Model for /text. Default: gpt-3.5-turbo-instruct");
    println!("  --log-file <file>         Append JSONL logs to this file");
    println!("  --generate <shell>        Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY   API key for the backend (required; the name can be changed with api_key_env)");
    println!("  IMED_SOCKET      Socket path, used when -s is not given");
    println!("  IMED_HOME        Directory holding config.json. If unset, $XDG_CONFIG_HOME/imed");
    println!("                   (e.g. ~/.config/imed) is used.");
    println!();
    println!("Endpoints:");
    println!("  POST /chat         {{\"message\": \"...\"}} -> three candidates via chat completion");
    println!("  POST /text         {{\"message\": \"...\"}} -> one candidate via text completion");
    println!("  GET  /healthcheck  -> ok");
}
