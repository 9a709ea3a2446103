//! バックエンド応答から候補列を取り出す

use crate::domain::{CandidateList, ConversionError, DelimiterToken};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CandidatesPayload {
    #[serde(alias = "Candidates")]
    candidates: Vec<String>,
}

/// structured 経路の応答を解析する
///
/// 前後の空白を除いた応答が `TOKEN <JSON> TOKEN` の形であることを要求し、
/// 間の先頭の JSON 値から `candidates` を順序・件数そのままで返す（JSON の後ろに続く
/// 余計な文は読み捨てる）。どの段階で外れても `MalformedReply`（途中までの結果は返さない）。
/// トークン比較は大文字小文字を区別する。
pub fn extract_structured(
    raw: &str,
    token: &DelimiterToken,
) -> Result<CandidateList, ConversionError> {
    let trimmed = raw.trim();
    let rest = trimmed
        .strip_prefix(token.as_str())
        .ok_or_else(|| ConversionError::malformed("missing leading delimiter", raw))?;
    let payload = rest
        .strip_suffix(token.as_str())
        .ok_or_else(|| ConversionError::malformed("missing trailing delimiter", raw))?;
    let parsed = serde_json::Deserializer::from_str(payload)
        .into_iter::<CandidatesPayload>()
        .next()
        .ok_or_else(|| ConversionError::malformed("empty candidates payload", raw))?
        .map_err(|e| {
            ConversionError::malformed(format!("invalid candidates payload: {}", e), raw)
        })?;
    Ok(CandidateList::new(parsed.candidates))
}

/// freeform 経路の応答を前後の空白を除いて唯一の候補にする（空でもそのまま返す）
pub fn extract_freeform(raw: &str) -> CandidateList {
    CandidateList::single(raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> DelimiterToken {
        DelimiterToken::new("XYZ123ABCD")
    }

    fn reason_of(err: ConversionError) -> String {
        match err {
            ConversionError::MalformedReply { reason, .. } => reason,
            other => panic!("expected MalformedReply, got {:?}", other),
        }
    }

    #[test]
    fn test_extracts_candidates_in_order() {
        let raw = r#"XYZ123ABCD{"candidates":["雨上がりの空","雨あがりの空","飴あがりの空"]}XYZ123ABCD"#;
        let list = extract_structured(raw, &token()).unwrap();
        assert_eq!(
            list.into_vec(),
            vec!["雨上がりの空", "雨あがりの空", "飴あがりの空"]
        );
    }

    #[test]
    fn test_surrounding_whitespace_and_inner_newlines_are_accepted() {
        let raw = "\n  XYZ123ABCD\n{\n  \"candidates\": [\"a\", \"b\"]\n}\nXYZ123ABCD  \n";
        let list = extract_structured(raw, &token()).unwrap();
        assert_eq!(list.into_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_count_and_duplicates_are_not_enforced() {
        let raw = r#"XYZ123ABCD{"candidates":["a","a","b","c","d"]}XYZ123ABCD"#;
        assert_eq!(extract_structured(raw, &token()).unwrap().into_vec().len(), 5);

        let raw = r#"XYZ123ABCD{"candidates":[]}XYZ123ABCD"#;
        assert!(extract_structured(raw, &token()).unwrap().into_vec().is_empty());
    }

    #[test]
    fn test_missing_leading_token() {
        let raw = r#"はい、どうぞ。XYZ123ABCD{"candidates":["a"]}XYZ123ABCD"#;
        let err = extract_structured(raw, &token()).unwrap_err();
        assert_eq!(reason_of(err), "missing leading delimiter");
    }

    #[test]
    fn test_missing_trailing_token() {
        let raw = r#"XYZ123ABCD{"candidates":["雨上がりの空","雨あがりの空","飴あがりの空"]}"#;
        let err = extract_structured(raw, &token()).unwrap_err();
        assert_eq!(reason_of(err), "missing trailing delimiter");
    }

    #[test]
    fn test_single_token_is_malformed() {
        let err = extract_structured("XYZ123ABCD", &token()).unwrap_err();
        assert_eq!(reason_of(err), "missing trailing delimiter");
    }

    #[test]
    fn test_empty_payload_is_malformed() {
        let err = extract_structured("XYZ123ABCDXYZ123ABCD", &token()).unwrap_err();
        assert_eq!(reason_of(err), "empty candidates payload");

        let err = extract_structured("XYZ123ABCD\n  \nXYZ123ABCD", &token()).unwrap_err();
        assert_eq!(reason_of(err), "empty candidates payload");
    }

    #[test]
    fn test_text_after_json_inside_fences_is_ignored() {
        let raw = "XYZ123ABCD\n{\"candidates\":[\"雨上がりの空\",\"雨あがりの空\",\"飴あがりの空\"]}\n以上です。\nXYZ123ABCD";
        let list = extract_structured(raw, &token()).unwrap();
        assert_eq!(
            list.into_vec(),
            vec!["雨上がりの空", "雨あがりの空", "飴あがりの空"]
        );
    }

    #[test]
    fn test_text_before_json_inside_fences_is_malformed() {
        let raw = r#"XYZ123ABCD候補です: {"candidates":["a"]}XYZ123ABCD"#;
        let err = extract_structured(raw, &token()).unwrap_err();
        assert!(reason_of(err).starts_with("invalid candidates payload"));
    }

    #[test]
    fn test_capitalized_candidates_key_is_accepted() {
        let raw = r#"XYZ123ABCD{"Candidates":["雨上がりの空"]}XYZ123ABCD"#;
        let list = extract_structured(raw, &token()).unwrap();
        assert_eq!(list.into_vec(), vec!["雨上がりの空"]);
    }

    #[test]
    fn test_payload_not_json() {
        let err = extract_structured("XYZ123ABCD 雨上がりの空 XYZ123ABCD", &token()).unwrap_err();
        assert!(reason_of(err).starts_with("invalid candidates payload"));
    }

    #[test]
    fn test_payload_without_candidates_field() {
        let raw = r#"XYZ123ABCD{"results":["a"]}XYZ123ABCD"#;
        let err = extract_structured(raw, &token()).unwrap_err();
        assert!(reason_of(err).contains("candidates"));
    }

    #[test]
    fn test_token_match_is_case_sensitive() {
        let raw = r#"xyz123abcd{"candidates":["a"]}xyz123abcd"#;
        assert!(extract_structured(raw, &token()).is_err());
    }

    #[test]
    fn test_malformed_keeps_original_raw_reply() {
        let raw = "  no fences here \n";
        match extract_structured(raw, &token()).unwrap_err() {
            ConversionError::MalformedReply { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_freeform_trims() {
        let list = extract_freeform("  今日の晩御飯はカレーです。\n");
        assert_eq!(list.into_vec(), vec!["今日の晩御飯はカレーです。"]);
    }

    #[test]
    fn test_freeform_trim_is_idempotent() {
        for raw in ["  a b  ", "\n\t雨上がりの空\r\n", "", "   "] {
            let once = extract_freeform(raw).into_vec().remove(0);
            let twice = extract_freeform(&once).into_vec().remove(0);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_freeform_empty_is_returned_as_is() {
        assert_eq!(extract_freeform(" \n ").into_vec(), vec![String::new()]);
    }
}
