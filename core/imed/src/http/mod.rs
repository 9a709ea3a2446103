//! HTTP over Unix ドメインソケットの入口
//!
//! handler は純粋関数（メソッド・URL・Content-Type・本文 → 応答）、server は tiny_http の配線。

pub mod handler;
pub mod server;

pub use handler::RequestHandler;
pub use server::SocketServer;
