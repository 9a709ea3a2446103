//! 変換候補の列（バックエンドが返した順をそのまま保持）

/// 変換候補の列。重複・件数は検査しない
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList(Vec<String>);

impl CandidateList {
    pub fn new(candidates: Vec<String>) -> Self {
        Self(candidates)
    }

    /// 1 件だけの候補列（freeform 経路）
    pub fn single(candidate: impl Into<String>) -> Self {
        Self(vec![candidate.into()])
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for CandidateList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}
