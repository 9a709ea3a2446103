//! アダプター（外界の I/O を trait で抽象化した標準実装）
//!
//! usecase はポートの trait 経由でのみファイル・環境変数・ログに触れる。
//! ここの Std* 実装を wiring で注入し、テストではモックを渡す。

pub mod composite_log;
pub mod file_json_log;
pub mod std_env_resolver;
pub mod std_fs;
pub mod stderr_log;

pub use composite_log::CompositeLog;
pub use file_json_log::{FileJsonLog, NoopLog};
pub use std_env_resolver::StdEnvResolver;
pub use std_fs::StdFileSystem;
pub use stderr_log::StderrLog;
