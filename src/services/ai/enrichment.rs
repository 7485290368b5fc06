use std::sync::Arc;

use serde::Deserialize;

use super::llm::{ChatCompletion, CompletionParams};
use super::types::{Complexity, Enrichment, Record, Scale};

const UNKNOWN_HE: &str = "לא ידוע";

/// Produces the structured analysis for one record. Total: any capability
/// or parse failure degrades to a deterministic fallback built from the
/// record's own attributes.
pub struct EnrichmentService {
    chat: Arc<dyn ChatCompletion>,
    params: CompletionParams,
}

impl EnrichmentService {
    pub fn new(chat: Arc<dyn ChatCompletion>, params: CompletionParams) -> Self {
        Self { chat, params }
    }

    pub async fn enrich(&self, record: &Record) -> Enrichment {
        match self.request_enrichment(record).await {
            Ok(enrichment) => enrichment,
            Err(err) => {
                tracing::warn!(
                    company = record.display_name(),
                    error = %err,
                    "enrichment failed, using fallback"
                );
                fallback_enrichment(record)
            }
        }
    }

    async fn request_enrichment(&self, record: &Record) -> Result<Enrichment, String> {
        let prompt = build_enrichment_prompt(record);
        let response = self.chat.complete(&prompt, self.params).await?;
        parse_enrichment(&response)
    }
}

fn attr_or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "Unknown",
    }
}

fn build_enrichment_prompt(record: &Record) -> String {
    let lines = vec![
        "Analyze this Israeli company for architectural opportunities:".to_string(),
        String::new(),
        format!(
            "Company Name: {}",
            attr_or_unknown(record.company_name.as_deref())
        ),
        format!(
            "Type: {}",
            attr_or_unknown(record.company_type.as_deref())
        ),
        format!("Region: {}", attr_or_unknown(record.region.as_deref())),
        format!("Comment: {}", record.comment.as_deref().unwrap_or("N/A")),
        String::new(),
        "This is an Israeli company that may need architectural services.".to_string(),
        "Based on the company type and context, describe in Hebrew: the architectural \
         projects it likely needs, valuable specializations, project complexity and \
         typical scale, how architects collaborate with this kind of organization, \
         and current trends affecting this sector in Israel."
            .to_string(),
        String::new(),
        "Respond with a JSON object in exactly this format:".to_string(),
        r#"{"#.to_string(),
        r#"  "aiDescription": "detailed Hebrew description of architectural opportunities","#
            .to_string(),
        r#"  "projectTypes": ["likely", "project", "types"],"#.to_string(),
        r#"  "architectSpecialties": ["relevant", "specializations"],"#.to_string(),
        r#"  "complexity": "low/medium/high","#.to_string(),
        r#"  "typicalScale": "small/medium/large","#.to_string(),
        r#"  "collaborationStyle": "typical approach for working with this organization","#
            .to_string(),
        r#"  "marketTrends": "current relevant trends in the Israeli market""#.to_string(),
        r#"}"#.to_string(),
        String::new(),
        "All text values must be in Hebrew and relevant to the Israeli architectural market."
            .to_string(),
    ];

    lines.join("\n")
}

fn parse_enrichment(response: &str) -> Result<Enrichment, String> {
    let parsed: EnrichmentResponse = serde_json::from_str(response.trim())
        .map_err(|e| format!("enrichment parse failed: {e}"))?;
    Ok(parsed.into())
}

/// Built purely from local attributes; string interpolation only, cannot fail.
fn fallback_enrichment(record: &Record) -> Enrichment {
    let company_type = record.company_type.as_deref().unwrap_or(UNKNOWN_HE);
    let region = record.region.as_deref().unwrap_or(UNKNOWN_HE);

    Enrichment {
        ai_description: format!("חברה מסוג {company_type} הממוקמת ב{region}"),
        project_types: Vec::new(),
        architect_specialties: Vec::new(),
        complexity: Complexity::Medium,
        typical_scale: Scale::Medium,
        collaboration_style: String::new(),
        market_trends: String::new(),
    }
}

/// Strict wire shape for the capability response. Every field is required;
/// a partial object is a parse failure and routes to the fallback.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrichmentResponse {
    ai_description: String,
    project_types: Vec<String>,
    architect_specialties: Vec<String>,
    complexity: Complexity,
    typical_scale: Scale,
    collaboration_style: String,
    market_trends: String,
}

impl From<EnrichmentResponse> for Enrichment {
    fn from(response: EnrichmentResponse) -> Self {
        Enrichment {
            ai_description: response.ai_description,
            project_types: response.project_types,
            architect_specialties: response.architect_specialties,
            complexity: response.complexity,
            typical_scale: response.typical_scale,
            collaboration_style: response.collaboration_style,
            market_trends: response.market_trends,
        }
    }
}
