//! Unix ドメインソケット上の HTTP サーバ（tiny_http）
//!
//! 受付スレッドは有界キューにリクエストを積むだけで、処理は固定数のワーカーが行う。
//! 各リクエストは独立しており、ワーカー間で共有する可変状態はない。

use common::error::Error;
use common::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server};

use crate::http::handler::RequestHandler;

const HTTP_WORKER_FACTOR: usize = 2;
const HTTP_WORKER_MIN: usize = 4;
const HTTP_QUEUE_FACTOR: usize = 4;
const HTTP_QUEUE_MIN: usize = 16;
/// 停止要求を確認する間隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn http_worker_count() -> usize {
    let cpus = thread::available_parallelism()
        .map(|value| value.get())
        .unwrap_or(2);
    cpus.saturating_mul(HTTP_WORKER_FACTOR).max(HTTP_WORKER_MIN)
}

fn http_queue_size(worker_count: usize) -> usize {
    worker_count
        .saturating_mul(HTTP_QUEUE_FACTOR)
        .max(HTTP_QUEUE_MIN)
}

fn get_header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str().trim())
        .filter(|value| !value.is_empty())
}

/// 前回の異常終了などで残ったソケットファイルを削除する（無ければ何もしない）
pub fn remove_stale_socket(fs: &dyn FileSystem, path: &Path) -> Result<(), Error> {
    if !fs.exists(path) {
        return Ok(());
    }
    fs.remove_file(path).map_err(|e| {
        Error::io_msg(format!(
            "Failed to remove stale socket '{}': {}",
            path.display(),
            e
        ))
    })
}

/// 停止要求を送るハンドル（Ctrl-C ハンドラなど別スレッドから使う）
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.server.unblock();
    }
}

/// バインド済みのソケットサーバ
pub struct SocketServer {
    server: Arc<Server>,
    socket_path: PathBuf,
    requested: Arc<AtomicBool>,
    fs: Arc<dyn FileSystem>,
    log: Arc<dyn Log>,
}

impl SocketServer {
    /// 残骸を掃除してからソケットにバインドする
    pub fn bind(
        socket_path: &Path,
        fs: Arc<dyn FileSystem>,
        log: Arc<dyn Log>,
    ) -> Result<Self, Error> {
        remove_stale_socket(fs.as_ref(), socket_path)?;
        let server = Server::http_unix(socket_path).map_err(|e| {
            Error::io_msg(format!(
                "Failed to listen on '{}': {}",
                socket_path.display(),
                e
            ))
        })?;
        let _ = log.log(
            &LogRecord::new(
                LogLevel::Info,
                format!("Listening on {}", socket_path.display()),
            )
            .layer("http")
            .kind("lifecycle"),
        );
        Ok(Self {
            server: Arc::new(server),
            socket_path: socket_path.to_path_buf(),
            requested: Arc::new(AtomicBool::new(false)),
            fs,
            log,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
            requested: Arc::clone(&self.requested),
        }
    }

    /// 停止ハンドルを register に渡してから serve する
    ///
    /// register が失敗した場合はリクエストを受けずにソケットファイルを削除し、そのエラーを返す。
    pub fn serve_with_shutdown<F>(
        self,
        handler: Arc<RequestHandler>,
        register: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(ShutdownHandle) -> Result<(), Error>,
    {
        if let Err(e) = register(self.shutdown_handle()) {
            let _ = self.cleanup();
            return Err(e);
        }
        self.serve(handler)
    }

    /// 停止要求が来るまでリクエストを処理し、最後にソケットファイルを削除する
    pub fn serve(self, handler: Arc<RequestHandler>) -> Result<(), Error> {
        let worker_count = http_worker_count();
        let (tx, rx) = mpsc::sync_channel::<Request>(http_queue_size(worker_count));
        let workers = spawn_request_workers(worker_count, rx, handler, Arc::clone(&self.log));

        while !self.requested.load(Ordering::SeqCst) {
            match self.server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => {
                    if tx.send(request).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    if self.requested.load(Ordering::SeqCst) {
                        break;
                    }
                    let _ = self.log.log(
                        &LogRecord::new(LogLevel::Warn, format!("accept failed: {}", e))
                            .layer("http")
                            .kind("lifecycle"),
                    );
                }
            }
        }

        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }
        self.cleanup()
    }

    fn cleanup(&self) -> Result<(), Error> {
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "Shutting down")
                .layer("http")
                .kind("lifecycle"),
        );
        remove_stale_socket(self.fs.as_ref(), &self.socket_path)
    }
}

fn spawn_request_workers(
    worker_count: usize,
    rx: mpsc::Receiver<Request>,
    handler: Arc<RequestHandler>,
    log: Arc<dyn Log>,
) -> Vec<thread::JoinHandle<()>> {
    let shared_rx = Arc::new(Mutex::new(rx));
    (0..worker_count)
        .map(|_| {
            let worker_rx = Arc::clone(&shared_rx);
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&log);
            thread::spawn(move || loop {
                let request = {
                    let Ok(guard) = worker_rx.lock() else {
                        break;
                    };
                    match guard.recv() {
                        Ok(request) => request,
                        Err(_) => break,
                    }
                };
                dispatch(request, &handler, log.as_ref());
            })
        })
        .collect()
}

fn dispatch(mut request: Request, handler: &RequestHandler, log: &dyn Log) {
    let mut body = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        let _ = log.log(
            &LogRecord::new(LogLevel::Warn, format!("failed to read request body: {}", e))
                .layer("http")
                .kind("request"),
        );
        body.clear();
    }

    let reply = {
        let content_type = get_header_value(&request, "Content-Type");
        handler.handle(
            request.method().as_str(),
            request.url(),
            content_type,
            &body,
        )
    };

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        let _ = log.log(
            &LogRecord::new(LogLevel::Warn, format!("failed to write response: {}", e))
                .layer("http")
                .kind("response"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_has_minimum_guard() {
        assert!(http_worker_count() >= HTTP_WORKER_MIN);
    }

    #[test]
    fn test_queue_size_has_minimum_guard() {
        assert!(http_queue_size(0) >= HTTP_QUEUE_MIN);
        assert_eq!(http_queue_size(10), 40);
    }
}
