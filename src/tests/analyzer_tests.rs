use crate::analyzer::{AnalysisResult, DocumentAnalyzer, FreeAnalyzer, LegalCompliance, RiskLevel};

async fn analyze_free(content: &str) -> AnalysisResult {
    FreeAnalyzer
        .analyze(content, "general", "free", "basic", None, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_free_analyzer_detects_legal_terms() {
    let result = analyze_free("This clause limits the liability of either party.").await;

    assert_eq!(result.legal_compliance.score, 70);
    assert!(result.warnings.is_empty());
    assert!(result.legal_compliance.issues.is_empty());
    assert_eq!(result.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_free_analyzer_flags_non_legal_content() {
    let result = analyze_free("groceries: milk eggs bread").await;

    assert_eq!(result.legal_compliance.score, 50);
    assert!(!result.warnings.is_empty());
    assert!(!result.legal_compliance.issues.is_empty());
}

#[tokio::test]
async fn test_free_analyzer_risk_scales_with_length() {
    let long_document = "word ".repeat(3500);
    let result = analyze_free(&long_document).await;
    assert_eq!(result.risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn test_free_analyzer_flags_oversized_documents() {
    let oversized = "word ".repeat(5500);
    let result = analyze_free(&oversized).await;
    assert!(!result.critical_flaws.is_empty());
}

#[tokio::test]
async fn test_free_analyzer_rejects_other_providers() {
    let err = FreeAnalyzer
        .analyze("content", "general", "openai", "gpt5", Some("sk-key"), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Provider not configured"));
}

#[test]
fn test_analysis_result_wire_format() {
    let result = AnalysisResult {
        summary: "ok".to_string(),
        critical_flaws: vec![],
        warnings: vec![],
        improvements: vec![],
        legal_compliance: LegalCompliance {
            score: 85,
            issues: vec![],
        },
        recommendations: vec![],
        risk_level: RiskLevel::Critical,
    };

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["riskLevel"], "critical");
    assert_eq!(value["legalCompliance"]["score"], 85);
    assert!(value["criticalFlaws"].as_array().unwrap().is_empty());
}
