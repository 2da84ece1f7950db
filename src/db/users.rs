use anyhow::Result;
use uuid::Uuid;

use super::Database;
use crate::models::{AiProviderCredential, User};

impl Database {
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, credits, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// The user's stored API key for one provider, if they configured one.
    /// The free tier never has a credential.
    pub async fn get_ai_provider_credential(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> Result<Option<AiProviderCredential>> {
        let credential = sqlx::query_as::<_, AiProviderCredential>(
            r#"
            SELECT id, user_id, provider, api_key, created_at
            FROM ai_providers
            WHERE user_id = $1 AND provider = $2
            "#,
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }
}
