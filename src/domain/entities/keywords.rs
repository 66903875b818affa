use serde::{Deserialize, Serialize};

/// Placeholder shown while an article has no analysed keywords
pub const PENDING_ANALYSIS_KEYWORD: &str = "분석중";

/// Keywords extracted by the external analysis pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordSet {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default)]
    pub neutral: Vec<String>,
    #[serde(default)]
    pub top_keywords: Vec<String>,
}

impl KeywordSet {
    /// All keywords in positive, negative, neutral, top order
    pub fn flatten(&self) -> Vec<String> {
        self.positive
            .iter()
            .chain(&self.negative)
            .chain(&self.neutral)
            .chain(&self.top_keywords)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
            && self.negative.is_empty()
            && self.neutral.is_empty()
            && self.top_keywords.is_empty()
    }
}

/// Flattened keywords, or the pending-analysis placeholder when there are none
pub fn display_keywords(set: Option<&KeywordSet>) -> Vec<String> {
    match set {
        Some(set) if !set.is_empty() => set.flatten(),
        _ => vec![PENDING_ANALYSIS_KEYWORD.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_preserves_group_order() {
        let set = KeywordSet {
            positive: vec!["수요".into()],
            negative: vec!["재고".into()],
            neutral: vec![],
            top_keywords: vec!["OPEC".into()],
        };
        assert_eq!(set.flatten(), vec!["수요", "재고", "OPEC"]);
    }

    #[test]
    fn test_display_keywords_placeholder() {
        assert_eq!(display_keywords(None), vec![PENDING_ANALYSIS_KEYWORD]);
        assert_eq!(
            display_keywords(Some(&KeywordSet::default())),
            vec![PENDING_ANALYSIS_KEYWORD]
        );
    }

    #[test]
    fn test_partial_json_defaults_missing_groups() {
        let set: KeywordSet = serde_json::from_str(r#"{"positive":["a"]}"#).unwrap();
        assert_eq!(set.positive, vec!["a"]);
        assert!(set.negative.is_empty());
    }
}
