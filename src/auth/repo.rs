use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Name stamped on every issued token row.
pub const TOKEN_NAME: &str = "BloodDonationApp";

/// Record of issued personal access tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Records a new token id for `user_id`. Earlier tokens are untouched.
    async fn insert(&self, token_id: Uuid, user_id: Uuid) -> anyhow::Result<()>;

    /// Owner of the token id, if it was issued.
    async fn owner_of(&self, token_id: Uuid) -> anyhow::Result<Option<Uuid>>;
}

#[derive(Clone)]
pub struct PgTokenStore {
    db: PgPool,
}

impl PgTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, token_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO personal_access_tokens (id, user_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_id)
        .bind(user_id)
        .bind(TOKEN_NAME)
        .execute(&self.db)
        .await
        .context("insert personal access token")?;
        Ok(())
    }

    async fn owner_of(&self, token_id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT user_id FROM personal_access_tokens WHERE id = $1"#,
        )
        .bind(token_id)
        .fetch_optional(&self.db)
        .await
        .context("lookup personal access token")?;
        Ok(owner)
    }
}
