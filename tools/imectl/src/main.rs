//! imectl: imed のソケットに変換リクエストを送って候補を表示する
//!
//! IME クライアントと同じく、Unix ソケット上に生の HTTP/1.1 リクエストを書き、
//! `Connection: close` で切断されるまで応答を読む。

use clap::builder::ArgAction;
use clap::value_parser;
use common::error::Error;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

const DEFAULT_SOCKET_PATH: &str = "/tmp/chatgpt-ime.sock";
const SOCKET_ENV: &str = "IMED_SOCKET";
const IO_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    candidates: Option<Vec<String>>,
    #[serde(default)]
    error_message: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Args {
    socket: PathBuf,
    freeform: bool,
    healthcheck: bool,
    message: String,
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("imectl")
        .about("Send kana text to imed and print conversion candidates")
        .arg(
            clap::Arg::new("socket")
                .short('s')
                .long("socket")
                .value_name("path")
                .help("imed socket path (default: $IMED_SOCKET or /tmp/chatgpt-ime.sock)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("text")
                .short('t')
                .long("text")
                .help("Use the /text endpoint (single freeform candidate)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("healthcheck")
                .long("healthcheck")
                .help("Only check that imed is up")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("message")
                .index(1)
                .help("Text to convert (words are joined with spaces)")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn parse_args_from<I, T>(args: I, env_socket: Option<String>) -> Result<Args, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    let socket = matches
        .get_one::<PathBuf>("socket")
        .cloned()
        .or_else(|| env_socket.filter(|s| !s.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH));
    let message = matches
        .get_many::<String>("message")
        .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let healthcheck = matches.get_flag("healthcheck");
    if !healthcheck && message.is_empty() {
        return Err(Error::invalid_argument("No text provided."));
    }
    Ok(Args {
        socket,
        freeform: matches.get_flag("text"),
        healthcheck,
        message,
    })
}

fn build_request(method: &str, path: &str, body: Option<&str>) -> String {
    let mut request = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(body) = body {
        request.push_str("Content-Type: application/json\r\n");
        request.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
        request.push_str(body);
    } else {
        request.push_str("\r\n");
    }
    request
}

/// chunked 転送の本文を連結する
fn decode_chunked(mut data: &str) -> Result<String, Error> {
    let mut out = String::new();
    loop {
        let (size_line, rest) = data
            .split_once("\r\n")
            .ok_or_else(|| Error::http("truncated chunked body"))?;
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| Error::http(format!("invalid chunk size: {}", size_line)))?;
        if size == 0 {
            return Ok(out);
        }
        let chunk = rest
            .get(..size)
            .ok_or_else(|| Error::http("truncated chunk"))?;
        out.push_str(chunk);
        data = rest[size..].strip_prefix("\r\n").unwrap_or(&rest[size..]);
    }
}

/// 応答をステータスコードと本文に分ける
fn parse_response(raw: &str) -> Result<(u16, String), Error> {
    let (head, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| Error::http("incomplete HTTP response"))?;
    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| Error::http("invalid HTTP status line"))?;
    let chunked = lines.any(|line| {
        line.split_once(':').is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case("transfer-encoding")
                && value.trim().eq_ignore_ascii_case("chunked")
        })
    });
    let body = if chunked {
        decode_chunked(body)?
    } else {
        body.to_string()
    };
    Ok((status, body))
}

fn send(socket: &Path, request: &str) -> Result<(u16, String), Error> {
    let mut stream = UnixStream::connect(socket).map_err(|e| {
        Error::io_msg(format!("Failed to connect to '{}': {}", socket.display(), e))
    })?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    stream.write_all(request.as_bytes())?;
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw)?;
    let raw = String::from_utf8(raw).map_err(|e| Error::http(format!("non UTF-8 response: {}", e)))?;
    parse_response(&raw)
}

fn run() -> Result<i32, Error> {
    let args = parse_args_from(std::env::args_os(), std::env::var(SOCKET_ENV).ok())?;

    if args.healthcheck {
        let (status, body) = send(&args.socket, &build_request("GET", "/healthcheck", None))?;
        println!("{}", body.trim());
        return Ok(if status == 200 { 0 } else { 1 });
    }

    let path = if args.freeform { "/text" } else { "/chat" };
    let body = serde_json::json!({ "message": args.message }).to_string();
    let (status, body) = send(&args.socket, &build_request("POST", path, Some(&body)))?;
    let response: ConvertResponse = serde_json::from_str(&body)
        .map_err(|e| Error::json(format!("unexpected response (status {}): {}", status, e)))?;

    if status != 200 {
        eprintln!("imectl: {} (status {})", response.error_message, status);
        return Ok(1);
    }
    for candidate in response.candidates.unwrap_or_default() {
        println!("{}", candidate);
    }
    Ok(0)
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("imectl: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}
