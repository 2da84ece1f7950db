use anyhow::Result;
use uuid::Uuid;

use super::Database;
use crate::models::{AnalysisStatus, CreateDocumentAnalysis, DocumentAnalysis};

const ANALYSIS_COLUMNS: &str = "id, user_id, title, content, ai_provider, ai_model, \
     analysis_type, template_id, result, status, credits_used, created_at, updated_at";

impl Database {
    /// Create the analysis record in `pending` before the analyzer is
    /// invoked, so a crashed call still leaves an auditable row.
    pub async fn create_document_analysis(
        &self,
        user_id: Uuid,
        analysis: CreateDocumentAnalysis,
    ) -> Result<DocumentAnalysis> {
        let record = sqlx::query_as::<_, DocumentAnalysis>(&format!(
            r#"
            INSERT INTO document_analyses (
                user_id, title, content, ai_provider, ai_model, analysis_type,
                template_id, credits_used
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ANALYSIS_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&analysis.title)
        .bind(&analysis.content)
        .bind(&analysis.ai_provider)
        .bind(&analysis.ai_model)
        .bind(&analysis.analysis_type)
        .bind(analysis.template_id)
        .bind(analysis.credits_used)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn update_document_analysis_result(
        &self,
        id: Uuid,
        result: serde_json::Value,
        status: AnalysisStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE document_analyses
            SET result = $2,
                status = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(result)
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_document_analysis(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<DocumentAnalysis>> {
        let record = sqlx::query_as::<_, DocumentAnalysis>(&format!(
            r#"SELECT {ANALYSIS_COLUMNS} FROM document_analyses WHERE id = $1 AND user_id = $2"#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
