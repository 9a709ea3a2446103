//! ユースケース（アダプター経由で I/O を行う）

pub mod convert;

pub use convert::{ConvertDeps, ConvertUseCase};
