use crate::dto::admin_dto::{CreateProfileRequest, UpdateProfileRequest};
use crate::error::Result;
use crate::models::profile::Profile;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: SqlitePool,
}

impl ProfileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Profile>> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;
        Ok(profiles)
    }

    pub async fn get(&self, id: Uuid) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn create(&self, req: CreateProfileRequest) -> Result<Profile> {
        let now = Utc::now();
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, name, category, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.category.trim())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn update(&self, id: Uuid, req: UpdateProfileRequest) -> Result<Profile> {
        let current = self.get(id).await?;
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET name = ?, category = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(
            req.name
                .as_deref()
                .map(str::trim)
                .unwrap_or(current.name.as_str()),
        )
        .bind(
            req.category
                .as_deref()
                .map(str::trim)
                .unwrap_or(current.category.as_str()),
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(crate::error::Error::NotFound("profile not found".into()));
        }
        Ok(())
    }
}
