//! thread_rng による区切りトークン生成
//!
//! 乱数源はスレッドローカルなので、ワーカー間でロックも順序依存も生じない。

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::delimiter_token::TOKEN_LEN;
use crate::domain::DelimiterToken;
use crate::ports::outbound::TokenGenerator;

/// [A-Za-z0-9] から一様に TOKEN_LEN 文字を選ぶ標準実装
#[derive(Debug, Clone, Default)]
pub struct RandTokenGenerator;

impl TokenGenerator for RandTokenGenerator {
    fn generate(&self) -> DelimiterToken {
        let s: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        DelimiterToken::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_token_is_well_formed() {
        let gen = RandTokenGenerator;
        for _ in 0..100 {
            assert!(gen.generate().is_well_formed());
        }
    }

    #[test]
    fn test_tokens_differ_between_calls() {
        let gen = RandTokenGenerator;
        let tokens: HashSet<String> = (0..1000)
            .map(|_| gen.generate().as_str().to_string())
            .collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_generation_from_many_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| RandTokenGenerator.generate()))
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_well_formed());
        }
    }
}
