//! Canned Chat Responder
//!
//! Keyword lookup behind the dashboard chatbot. Topics are checked in table
//! order and the first one with a keyword contained in the lowercased
//! question answers it.

/// Canned answer for one topic
#[derive(Debug)]
pub struct ChatTopic {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub answer: &'static str,
}

pub const FALLBACK_ANSWER: &str =
    "죄송합니다. 해당 질문에 대한 구체적인 분석을 제공하기 어렵습니다. 다른 질문을 해주세요.";

pub static CHAT_TOPICS: &[ChatTopic] = &[
    ChatTopic {
        name: "corn",
        keywords: &["옥수수", "corn"],
        answer: "옥수수 가격 상승의 주요 원인은 미국 중서부 지역의 지속적인 가뭄과 중국의 수입 증가입니다. \
                 현재 센티먼트 점수는 89.5로 매우 긍정적인 상황입니다. \
                 USDA의 생산량 전망치 하향 조정도 가격 상승을 뒷받침하고 있습니다.",
    },
    ChatTopic {
        name: "wheat",
        keywords: &["밀", "wheat"],
        answer: "밀 가격은 최근 공급 과잉 우려와 수요 감소로 인해 하락 압력을 받고 있습니다. \
                 센티먼트 점수는 45.2로 부정적인 상황입니다. \
                 주요 생산국들의 풍작 예상과 글로벌 경기 둔화가 영향을 미치고 있습니다.",
    },
    ChatTopic {
        name: "gold",
        keywords: &["금", "gold"],
        answer: "금은 현재 인플레이션 우려와 안전자산 선호로 인해 좋은 투자 시점으로 평가됩니다. \
                 센티먼트 점수는 82.1로 긍정적입니다. \
                 지정학적 불안정성과 중앙은행들의 금 매입 증가가 가격을 지지하고 있습니다.",
    },
    ChatTopic {
        name: "copper",
        keywords: &["구리", "copper"],
        answer: "구리는 전기차 수요 증가와 인프라 투자 확대로 인해 긍정적인 센티먼트를 보이고 있습니다. \
                 현재 점수는 76.8입니다. \
                 특히 신재생 에너지 산업의 성장과 5G 네트워크 구축이 수요를 견인하고 있습니다.",
    },
    ChatTopic {
        name: "oil",
        keywords: &["wti", "원유", "oil"],
        answer: "WTI 원유는 OPEC+의 감산 정책과 재고 감소로 가격 상승 요인이 있으나, \
                 경기 둔화 우려로 상승폭이 제한되고 있습니다. \
                 센티먼트 점수는 58.4로 중립적인 상황입니다.",
    },
    ChatTopic {
        name: "outlook",
        keywords: &["투자", "전망", "추천", "investment", "outlook"],
        answer: "현재 시장 상황을 종합하면, 옥수수(89.5)와 금(82.1)이 가장 긍정적인 센티먼트를 보이고 있습니다. \
                 구리(76.8)도 중장기적으로 유망한 상품입니다. \
                 다만 투자 결정 시에는 개인의 투자 성향과 리스크 허용도를 고려해야 합니다.",
    },
];

/// Static keyword-to-answer responder
#[derive(Debug, Clone, Copy)]
pub struct CannedResponder {
    topics: &'static [ChatTopic],
    fallback: &'static str,
}

impl Default for CannedResponder {
    fn default() -> Self {
        CannedResponder {
            topics: CHAT_TOPICS,
            fallback: FALLBACK_ANSWER,
        }
    }
}

impl CannedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// First topic whose keyword appears in the question
    pub fn match_topic(&self, question: &str) -> Option<&'static ChatTopic> {
        let lowered = question.to_lowercase();
        self.topics
            .iter()
            .find(|topic| topic.keywords.iter().any(|kw| lowered.contains(kw)))
    }

    pub fn answer(&self, question: &str) -> &'static str {
        self.match_topic(question)
            .map(|topic| topic.answer)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let responder = CannedResponder::new();
        assert_eq!(responder.answer("CORN price?"), responder.answer("corn price?"));
        assert_eq!(responder.match_topic("Why is CoRn up").unwrap().name, "corn");
    }

    #[test]
    fn test_korean_keywords() {
        let responder = CannedResponder::new();
        assert_eq!(responder.match_topic("옥수수 가격이 왜 올랐나요?").unwrap().name, "corn");
        assert_eq!(responder.match_topic("구리 수요는?").unwrap().name, "copper");
        assert_eq!(responder.match_topic("원유 재고").unwrap().name, "oil");
    }

    #[test]
    fn test_first_topic_in_table_order_wins() {
        let responder = CannedResponder::new();
        assert_eq!(responder.match_topic("gold or oil?").unwrap().name, "gold");
        assert_eq!(responder.match_topic("wheat outlook").unwrap().name, "wheat");
        assert_eq!(responder.match_topic("investment advice").unwrap().name, "outlook");
    }

    #[test]
    fn test_fallback_without_keywords() {
        let responder = CannedResponder::new();
        assert_eq!(responder.answer("what's the weather like?"), FALLBACK_ANSWER);
        assert_eq!(responder.answer(""), FALLBACK_ANSWER);
    }

    #[test]
    fn test_every_keyword_is_lowercase() {
        for topic in CHAT_TOPICS {
            for kw in topic.keywords {
                assert_eq!(kw.to_lowercase(), *kw, "keyword {} must be lowercase", kw);
            }
        }
    }
}
