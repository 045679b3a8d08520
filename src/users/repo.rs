use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, ProfileChanges, User, UserRow};

/// Persistence seam for user profiles.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_wallet(&self, wallet_address: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Inserts `new`, or returns `None` when the wallet address is already taken.
    async fn insert(&self, new: &NewUser) -> anyhow::Result<Option<User>>;

    /// Writes only the supplied fields; `None` when the user does not exist.
    async fn update(&self, id: Uuid, changes: &ProfileChanges) -> anyhow::Result<Option<User>>;
}

const USER_COLUMNS: &str = "id, wallet_address, name, blood_type, age, location, \
                            emergency_contact, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_wallet(&self, wallet_address: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE wallet_address = $1"
        ))
        .bind(wallet_address)
        .fetch_optional(&self.db)
        .await
        .context("find user by wallet")?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        row.map(User::try_from).transpose()
    }

    async fn insert(&self, new: &NewUser) -> anyhow::Result<Option<User>> {
        // The unique index decides the race between concurrent registrations.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (wallet_address, name, blood_type, age, location, emergency_contact)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (wallet_address) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.wallet_address)
        .bind(&new.name)
        .bind(new.blood_type.as_str())
        .bind(new.age)
        .bind(&new.location)
        .bind(&new.emergency_contact)
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;
        row.map(User::try_from).transpose()
    }

    async fn update(&self, id: Uuid, changes: &ProfileChanges) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET name              = COALESCE($2, name),
                   blood_type        = COALESCE($3, blood_type),
                   age               = COALESCE($4, age),
                   location          = COALESCE($5, location),
                   emergency_contact = COALESCE($6, emergency_contact),
                   updated_at        = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(changes.blood_type.map(|bt| bt.as_str()))
        .bind(changes.age)
        .bind(&changes.location)
        .bind(&changes.emergency_contact)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        row.map(User::try_from).transpose()
    }
}
