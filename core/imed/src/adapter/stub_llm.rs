//! テスト用: 固定応答を返す LlmCompletion、固定トークン、メモリに貯める Log

#[cfg(test)]
mod stub {
    use common::error::Error;
    use common::ports::outbound::{Log, LogRecord};
    use std::sync::Mutex;

    use crate::domain::DelimiterToken;
    use crate::ports::outbound::{LlmCompletion, TokenGenerator};

    type ChatFn = Box<dyn Fn(&str, &str) -> Result<String, Error> + Send + Sync>;
    type TextFn = Box<dyn Fn(&str, u32) -> Result<String, Error> + Send + Sync>;

    /// テスト用: 呼び出しを記録し、クロージャで応答を決める Stub
    pub struct StubLlmCompletion {
        chat: ChatFn,
        text: TextFn,
        chat_calls: Mutex<Vec<(String, String)>>,
        text_calls: Mutex<Vec<(String, u32)>>,
    }

    impl StubLlmCompletion {
        pub fn new(chat: ChatFn, text: TextFn) -> Self {
            Self {
                chat,
                text,
                chat_calls: Mutex::new(Vec::new()),
                text_calls: Mutex::new(Vec::new()),
            }
        }

        pub fn chat_reply(reply: &str) -> Self {
            let reply = reply.to_string();
            Self::new(
                Box::new(move |_, _| Ok(reply.clone())),
                Box::new(|_, _| Err(Error::http("text path not stubbed"))),
            )
        }

        pub fn text_reply(reply: &str) -> Self {
            let reply = reply.to_string();
            Self::new(
                Box::new(|_, _| Err(Error::http("chat path not stubbed"))),
                Box::new(move |_, _| Ok(reply.clone())),
            )
        }

        pub fn failing(err: Error) -> Self {
            let chat_err = err.clone();
            Self::new(
                Box::new(move |_, _| Err(chat_err.clone())),
                Box::new(move |_, _| Err(err.clone())),
            )
        }

        /// 要求の 1 行目（トークン）で入力をそのまま 1 候補として囲み返す
        pub fn fenced_echo() -> Self {
            Self::new(
                Box::new(|_, request| {
                    let mut lines = request.lines();
                    let token = lines.next().unwrap_or_default();
                    let input = lines.next().unwrap_or_default();
                    Ok(format!(
                        "{token}{}{token}",
                        serde_json::json!({ "candidates": [input] })
                    ))
                }),
                Box::new(|prompt, _| Ok(prompt.lines().last().unwrap_or_default().to_string())),
            )
        }

        pub fn chat_calls(&self) -> Vec<(String, String)> {
            self.chat_calls.lock().unwrap().clone()
        }

        pub fn text_calls(&self) -> Vec<(String, u32)> {
            self.text_calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.chat_calls.lock().unwrap().len() + self.text_calls.lock().unwrap().len()
        }
    }

    impl LlmCompletion for StubLlmCompletion {
        fn complete_chat(&self, instruction: &str, request: &str) -> Result<String, Error> {
            self.chat_calls
                .lock()
                .unwrap()
                .push((instruction.to_string(), request.to_string()));
            (self.chat)(instruction, request)
        }

        fn complete_text(&self, prompt: &str, max_tokens: u32) -> Result<String, Error> {
            self.text_calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            (self.text)(prompt, max_tokens)
        }
    }

    /// テスト用: 常に同じトークンを返す
    pub struct FixedTokenGenerator(pub DelimiterToken);

    impl FixedTokenGenerator {
        pub fn new(token: &str) -> Self {
            Self(DelimiterToken::new(token))
        }
    }

    impl TokenGenerator for FixedTokenGenerator {
        fn generate(&self) -> DelimiterToken {
            self.0.clone()
        }
    }

    /// テスト用: レコードをメモリに貯める Log
    #[derive(Default)]
    pub struct MemoryLog {
        records: Mutex<Vec<LogRecord>>,
    }

    impl MemoryLog {
        pub fn records(&self) -> Vec<LogRecord> {
            self.records.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.records().into_iter().map(|r| r.message).collect()
        }
    }

    impl Log for MemoryLog {
        fn log(&self, record: &LogRecord) -> Result<(), Error> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
pub use stub::{FixedTokenGenerator, MemoryLog, StubLlmCompletion};
