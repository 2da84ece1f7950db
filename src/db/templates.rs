use anyhow::Result;
use uuid::Uuid;

use super::Database;
use crate::models::AnalysisTemplate;

impl Database {
    pub async fn get_analysis_template(&self, id: Uuid) -> Result<Option<AnalysisTemplate>> {
        let template = sqlx::query_as::<_, AnalysisTemplate>(
            r#"SELECT id, name, system_prompt, created_at FROM analysis_templates WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }
}
