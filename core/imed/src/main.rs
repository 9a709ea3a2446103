mod adapter;
mod cli;
mod config;
mod domain;
mod http;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::process;
use std::sync::Arc;

use cli::{parse_args, print_completion, print_help, print_usage, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use http::SocketServer;
use wiring::wire_imed;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("imed: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    if config.help {
        print_help();
        return Ok(0);
    }

    let app = wire_imed(&config)?;
    let _ = app.log.log(
        &LogRecord::new(LogLevel::Info, "imed started")
            .layer("cli")
            .kind("lifecycle")
            .field("chat_model", app.settings.chat_model.as_str())
            .field("text_model", app.settings.text_model.as_str())
            .field("base_url", app.settings.base_url.as_str()),
    );

    let server = SocketServer::bind(
        &app.settings.socket_path,
        Arc::clone(&app.fs),
        Arc::clone(&app.log),
    )?;
    server.serve_with_shutdown(app.handler, |shutdown| {
        ctrlc::set_handler(move || shutdown.request_shutdown())
            .map_err(|e| Error::system(format!("Failed to install signal handler: {}", e)))
    })?;
    Ok(0)
}
