use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum RiskLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "critical")]
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalCompliance {
    pub score: i32,
    pub issues: Vec<String>,
}

/// Structured output of one document analysis, stored as-is on the analysis
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub critical_flaws: Vec<String>,
    pub warnings: Vec<String>,
    pub improvements: Vec<String>,
    pub legal_compliance: LegalCompliance,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
}

/// The AI collaborator the pipeline fans out to. Implementations are black
/// boxes from the engine's point of view: structured result out, or an error
/// whose message is surfaced verbatim to the user.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        content: &str,
        analysis_type: &str,
        provider: &str,
        model: &str,
        api_key: Option<&str>,
        template_id: Option<Uuid>,
    ) -> Result<AnalysisResult>;
}

/// Free-tier analyzer: a deterministic local heuristic over word count and
/// legal-term density. Paid providers plug in behind [`DocumentAnalyzer`]
/// from outside this crate.
pub struct FreeAnalyzer;

const LEGAL_TERMS: &[&str] = &[
    "law", "statute", "article", "section", "clause", "provision", "whereas",
    "hereinafter", "indemnify", "liability", "jurisdiction",
];

#[async_trait]
impl DocumentAnalyzer for FreeAnalyzer {
    async fn analyze(
        &self,
        content: &str,
        _analysis_type: &str,
        provider: &str,
        _model: &str,
        _api_key: Option<&str>,
        _template_id: Option<Uuid>,
    ) -> Result<AnalysisResult> {
        if provider != "free" {
            anyhow::bail!("Provider not configured: {}", provider);
        }

        let lowered = content.to_lowercase();
        let word_count = content.split_whitespace().count();
        let has_contract = lowered.contains("contract") || lowered.contains("agreement");
        let has_legal_terms = LEGAL_TERMS.iter().any(|term| lowered.contains(term));

        let mut summary = format!("Document analyzed with {} words.", word_count);
        if has_contract {
            summary.push_str(" Contractual document identified.");
        }
        if has_legal_terms {
            summary.push_str(" Legal terminology detected.");
        }

        Ok(AnalysisResult {
            summary,
            critical_flaws: if word_count > 5000 {
                vec!["Document too long for free-tier analysis".to_string()]
            } else {
                Vec::new()
            },
            warnings: if has_legal_terms {
                Vec::new()
            } else {
                vec!["Few legal terms identified in the document".to_string()]
            },
            improvements: vec![
                "Consider a premium analysis for more detailed insights".to_string(),
                "Review the structure and formatting of the document".to_string(),
            ],
            legal_compliance: LegalCompliance {
                score: if has_legal_terms { 70 } else { 50 },
                issues: if has_legal_terms {
                    Vec::new()
                } else {
                    vec!["Document may not follow standard legal drafting conventions".to_string()]
                },
            },
            recommendations: vec![
                "Use a premium provider for a more precise analysis".to_string(),
                "Have a lawyer validate the final version".to_string(),
            ],
            risk_level: if word_count > 3000 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            },
        })
    }
}
