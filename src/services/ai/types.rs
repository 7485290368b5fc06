use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw catalog entry. Known attributes are optional; anything else the
/// catalog carries is kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Small,
    Medium,
    Large,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Medium
    }
}

/// Structured analysis attached to a record. Always fully populated:
/// either parsed from the capability response or built by the fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(default)]
    pub ai_description: String,
    #[serde(default)]
    pub project_types: Vec<String>,
    #[serde(default)]
    pub architect_specialties: Vec<String>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub typical_scale: Scale,
    #[serde(default)]
    pub collaboration_style: String,
    #[serde(default)]
    pub market_trends: String,
}

/// A record after the pipeline ran over it. `enrichment` is `None` only on
/// the isolation path, when a record blew its processing deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
    #[serde(default)]
    pub searchable_text: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl EnrichedRecord {
    /// Emitted when a record could not be processed at all: no analysis,
    /// a zero embedding of the right dimension so search skips it.
    pub fn degraded(record: Record, dimension: usize) -> Self {
        Self {
            record,
            enrichment: None,
            searchable_text: String::new(),
            embedding: vec![0.0; dimension],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: EnrichedRecord,
    pub score: f32,
}

/// Text projection embedded for a record. Pure function of the record and
/// its enrichment: identical inputs always produce the identical string.
pub fn searchable_text(record: &Record, enrichment: &Enrichment) -> String {
    let joined_types = enrichment.project_types.join(" ");
    let joined_specialties = enrichment.architect_specialties.join(" ");

    let parts = [
        record.company_name.as_deref().unwrap_or(""),
        record.company_type.as_deref().unwrap_or(""),
        record.region.as_deref().unwrap_or(""),
        enrichment.ai_description.as_str(),
        joined_types.as_str(),
        joined_specialties.as_str(),
        enrichment.collaboration_style.as_str(),
        enrichment.market_trends.as_str(),
    ];

    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record {
            company_name: Some("עיריית חיפה".to_string()),
            company_type: Some("עירייה".to_string()),
            region: Some("חיפה".to_string()),
            comment: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn searchable_text_is_deterministic() {
        let record = sample_record();
        let enrichment = Enrichment {
            ai_description: "תיאור".to_string(),
            project_types: vec!["בתי ספר".to_string(), "פארקים".to_string()],
            ..Default::default()
        };

        let first = searchable_text(&record, &enrichment);
        let second = searchable_text(&record, &enrichment);
        assert_eq!(first, second);
        assert!(first.contains("עיריית חיפה"));
        assert!(first.contains("בתי ספר פארקים"));
    }

    #[test]
    fn searchable_text_skips_empty_fields() {
        let record = Record {
            company_name: Some("חברה".to_string()),
            ..Default::default()
        };
        let text = searchable_text(&record, &Enrichment::default());
        assert_eq!(text, "חברה");
    }

    #[test]
    fn record_keeps_unknown_fields() {
        let json = r#"{"companyName":"א","companyType":"ב","website":"https://example.com"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.company_name.as_deref(), Some("א"));
        assert_eq!(
            record.extra.get("website").and_then(|v| v.as_str()),
            Some("https://example.com")
        );

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["website"], "https://example.com");
    }

    #[test]
    fn degraded_record_has_zero_embedding_of_right_dimension() {
        let degraded = EnrichedRecord::degraded(sample_record(), 8);
        assert!(degraded.enrichment.is_none());
        assert_eq!(degraded.embedding.len(), 8);
        assert!(degraded.embedding.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn enum_levels_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Complexity::High).unwrap(), "\"high\"");
        let scale: Scale = serde_json::from_str("\"large\"").unwrap();
        assert_eq!(scale, Scale::Large);
    }
}
