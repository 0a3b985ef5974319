use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A source backing one or more fields of a researched entity.
///
/// Citations are embedded in [`ResearchMetadata`] and are never stored or
/// tracked on their own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Access date as supplied by the research source; kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at: Option<String>,
    /// Names of the entity fields this citation supports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relevant_fields: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Provenance attached to an entity produced from external research.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchMetadata {
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Confidence in the researched content, from 0.0 to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    /// Where the research came from (provider, model, query).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub researched_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResearchMetadata {
    /// Returns `true` when none of the modelled fields is set.
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
            && self.confidence_score.is_none()
            && self.source.is_none()
            && self.researched_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(id: &str, fields: &[&str]) -> Citation {
        Citation {
            id: id.into(),
            title: format!("Source {id}"),
            url: format!("https://example.com/{id}"),
            accessed_at: Some("2023-11-14".into()),
            relevant_fields: fields.iter().map(|f| f.to_string()).collect(),
            extra: Map::new(),
        }
    }

    #[test]
    fn camel_case_field_names() {
        let meta = ResearchMetadata {
            citations: vec![citation("c1", &["stages"])],
            confidence_score: Some(0.8),
            source: None,
            researched_at: None,
            extra: Map::new(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["confidenceScore"], 0.8);
        assert_eq!(json["citations"][0]["accessedAt"], "2023-11-14");
        assert_eq!(json["citations"][0]["relevantFields"][0], "stages");
        assert!(json.get("source").is_none());
    }

    #[test]
    fn research_content_is_kept_verbatim() {
        let raw = serde_json::json!({
            "citations": [{
                "title": "Market sizing",
                "url": "https://example.com/m",
                "accessedAt": "2024-01-15",
                "publisher": "Acme Research"
            }],
            "confidenceScore": 0.7,
            "researchedAt": "last week",
            "model": "survey-v2"
        });
        let meta: ResearchMetadata = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(meta.citations[0].accessed_at.as_deref(), Some("2024-01-15"));
        assert_eq!(meta.citations[0].extra["publisher"], "Acme Research");
        assert_eq!(meta.extra["model"], "survey-v2");
        assert_eq!(serde_json::to_value(&meta).unwrap(), raw);
    }

    #[test]
    fn default_is_empty() {
        assert!(ResearchMetadata::default().is_empty());
    }
}
