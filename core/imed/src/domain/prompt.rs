//! 変換プロンプトのテンプレート
//!
//! structured 経路は指示＋例（system）と区切りトークンで囲んだ入力（user）の 2 部構成、
//! freeform 経路は few-shot の入出力例に続けて入力と `:` を置いた 1 本の文字列。

use crate::domain::{ConversionInput, DelimiterToken};

/// 指示文でバックエンドに要求する候補数（応答側では件数を検査しない）
pub const CANDIDATE_COUNT: usize = 3;

const STRUCTURED_EXAMPLE_INPUT: &str = "あめあがりのそら";
const STRUCTURED_EXAMPLE_CANDIDATES: [&str; CANDIDATE_COUNT] =
    ["雨上がりの空", "雨あがりの空", "飴あがりの空"];

const FREEFORM_HEADER: &str = "日本語の文をかな漢字変換して下さい。";
const FREEFORM_EXAMPLES: [(&str, &str); 2] = [
    ("あめあがりのそら", "雨上がりの空"),
    ("きょうのばんごはんはかれーです。", "今日の晩御飯はカレーです。"),
];

/// 例として示す JSON（2 スペースインデント）
fn example_output_json() -> String {
    let items = STRUCTURED_EXAMPLE_CANDIDATES
        .iter()
        .map(|c| format!("    \"{}\"", c))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n  \"candidates\": [\n{}\n  ]\n}}", items)
}

fn render_instruction(token: &DelimiterToken) -> String {
    format!(
        "私が次に入力する日本語の文をかな漢字変換して下さい。\n\
         私がこのお願いを {count} 回したことにして候補を {count} つ出力してください。\n\
         \n\
         ## 例\n\
         \n\
         入力:\n\
         {example_input}\n\
         \n\
         出力:\n\
         {example_output}",
        count = CANDIDATE_COUNT,
        example_input = token.fence(STRUCTURED_EXAMPLE_INPUT),
        example_output = token.fence(&example_output_json()),
    )
}

/// structured 経路のプロンプト（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredPrompt {
    token: DelimiterToken,
    instruction: String,
    request: String,
}

impl StructuredPrompt {
    /// 指示＋例にトークンを 4 回、要求に入力を 1 回（トークンで前後を挟んで）埋め込む
    pub fn build(input: &ConversionInput, token: DelimiterToken) -> Self {
        let instruction = render_instruction(&token);
        let request = token.fence(input.as_str());
        Self {
            token,
            instruction,
            request,
        }
    }

    pub fn token(&self) -> &DelimiterToken {
        &self.token
    }

    /// system ロールに載せる指示文
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// user ロールに載せるトークン付きの入力
    pub fn request(&self) -> &str {
        &self.request
    }
}

/// freeform 経路のプロンプト（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeformPrompt(String);

impl FreeformPrompt {
    pub fn build(input: &ConversionInput) -> Self {
        let mut prompt = String::from(FREEFORM_HEADER);
        prompt.push_str("\n\n");
        for (kana, kanji) in FREEFORM_EXAMPLES {
            prompt.push_str(&format!("{}: {}\n", kana, kanji));
        }
        prompt.push_str(input.as_str());
        prompt.push(':');
        Self(prompt)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
