// crates/types/src/summary.rs
use serde::{Deserialize, Serialize};

/// Structured summary produced by the processing backend.
///
/// Every field is individually optional: absence means "nothing to show", not
/// an error, and a structurally valid but entirely empty object is a valid
/// summary. Wire names are camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_identification: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_extraction: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_identification: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<SentimentAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qna: Option<Vec<QnaItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_entities: Option<NamedEntities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_classification: Option<ContentClassification>,
}

impl SummaryData {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.bullet_points.is_none()
            && self.topic_identification.is_none()
            && self.quote_extraction.is_none()
            && self.character_identification.is_none()
            && self.sentiment_analysis.is_none()
            && self.qna.is_none()
            && self.named_entities.is_none()
            && self.content_classification.is_none()
    }
}

/// Sentiment label plus a free-text explanation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One question/answer pair extracted from the audio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QnaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Entities partitioned into people / places / organizations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEntities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub places: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<String>,
}

impl NamedEntities {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.places.is_empty() && self.organizations.is_empty()
    }
}

/// Content type label plus its characteristic traits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentClassification {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub characteristics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_valid_summary() {
        let data: SummaryData = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());
        assert_eq!(data, SummaryData::default());
    }

    #[test]
    fn test_full_payload_parses() {
        let data: SummaryData = serde_json::from_str(
            r#"{
                "summary": "A conversation about ferries.",
                "bulletPoints": ["arrival", "departure"],
                "topicIdentification": ["transport"],
                "quoteExtraction": ["all aboard"],
                "characterIdentification": ["Captain"],
                "sentimentAnalysis": {"sentiment": "positive", "description": "upbeat"},
                "qna": [{"question": "when?", "answer": "noon"}],
                "namedEntities": {
                    "people": ["Ada"],
                    "places": ["Dover"],
                    "organizations": ["Ferry Co"]
                },
                "contentClassification": {"type": "interview", "characteristics": ["two hosts"]}
            }"#,
        )
        .unwrap();

        assert_eq!(data.summary.as_deref(), Some("A conversation about ferries."));
        assert_eq!(
            data.bullet_points.as_deref(),
            Some(["arrival".to_string(), "departure".to_string()].as_slice())
        );
        let sentiment = data.sentiment_analysis.as_ref().unwrap();
        assert_eq!(sentiment.sentiment.as_deref(), Some("positive"));
        let qna = data.qna.as_deref().unwrap();
        assert_eq!(qna[0].question.as_deref(), Some("when?"));
        let entities = data.named_entities.as_ref().unwrap();
        assert_eq!(entities.places, vec!["Dover"]);
        let class = data.content_classification.as_ref().unwrap();
        assert_eq!(class.kind.as_deref(), Some("interview"));
        assert_eq!(class.characteristics, vec!["two hosts"]);
        assert!(!data.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let data: SummaryData =
            serde_json::from_str(r#"{"summary":"x","futureField":[1,2,3]}"#).unwrap();
        assert_eq!(data.summary.as_deref(), Some("x"));
    }

    #[test]
    fn test_partial_entities_default_missing_groups() {
        let data: SummaryData =
            serde_json::from_str(r#"{"namedEntities":{"people":["Ada"]}}"#).unwrap();
        let entities = data.named_entities.unwrap();
        assert_eq!(entities.people, vec!["Ada"]);
        assert!(entities.places.is_empty());
        assert!(entities.organizations.is_empty());
        assert!(!entities.is_empty());
    }

    #[test]
    fn test_serialization_skips_absent_sections() {
        let data = SummaryData {
            summary: Some("x".to_string()),
            ..SummaryData::default()
        };
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"summary":"x"}"#);
    }

    #[test]
    fn test_classification_type_keyword_rename() {
        let class: ContentClassification =
            serde_json::from_str(r#"{"type":"monologue"}"#).unwrap();
        assert_eq!(class.kind.as_deref(), Some("monologue"));
        let json = serde_json::to_string(&class).unwrap();
        assert_eq!(json, r#"{"type":"monologue"}"#);
    }
}
