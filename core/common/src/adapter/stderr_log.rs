//! 人間向けログ（LogRecord → stderr に 1 行で出力）
//!
//! fields は JSON のまま末尾に付ける。長すぎる値は切り詰める。

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};

const FIELDS_SUMMARY_MAX: usize = 400;

/// stderr に出力する Log 実装（min_level 未満は捨てる）
pub struct StderrLog {
    min_level: LogLevel,
}

impl StderrLog {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

/// レコードを 1 行に整形する
pub fn format_line(record: &LogRecord) -> String {
    let mut line = format!("{} [{}]", record.ts, record.level.as_str());
    if let Some(kind) = &record.kind {
        line.push_str(&format!(" [{}]", kind));
    }
    line.push(' ');
    line.push_str(&record.message);
    if let Some(fields) = &record.fields {
        let s = serde_json::to_string(fields).unwrap_or_default();
        let char_count = s.chars().count();
        if char_count > FIELDS_SUMMARY_MAX {
            let truncated: String = s.chars().take(FIELDS_SUMMARY_MAX).collect();
            line.push_str(&format!(" {}... (len={})", truncated, char_count));
        } else {
            line.push(' ');
            line.push_str(&s);
        }
    }
    line
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if record.level.enabled(self.min_level) {
            eprintln!("{}", format_line(record));
        }
        Ok(())
    }
}
