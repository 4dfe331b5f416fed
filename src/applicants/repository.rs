// src/applicants/repository.rs
//! Persistence of applicant profiles

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::models::{ApplicantProfile, ApplicantRow};
use crate::common::{Page, PageQuery};

#[async_trait]
pub trait ApplicantRepository: Send + Sync {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<ApplicantProfile>, sqlx::Error>;

    /// Inserts the profile or, when its owner already has one, overwrites it.
    async fn save(&self, profile: &ApplicantProfile) -> Result<ApplicantProfile, sqlx::Error>;

    async fn search(&self, query: &PageQuery) -> Result<Page<ApplicantProfile>, sqlx::Error>;

    /// Removes the owner's profile and returns it, if there was one.
    async fn delete_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Option<ApplicantProfile>, sqlx::Error>;
}

pub struct SqliteApplicantRepository {
    db: SqlitePool,
}

impl SqliteApplicantRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn into_profile(row: ApplicantRow) -> Result<ApplicantProfile, sqlx::Error> {
    ApplicantProfile::try_from(row).map_err(|e| sqlx::Error::Decode(e.into()))
}

#[async_trait]
impl ApplicantRepository for SqliteApplicantRepository {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<ApplicantProfile>, sqlx::Error> {
        sqlx::query_as::<_, ApplicantRow>("SELECT * FROM applicants WHERE user_id = ?")
            .bind(owner_id)
            .fetch_optional(&self.db)
            .await?
            .map(into_profile)
            .transpose()
    }

    async fn save(&self, profile: &ApplicantProfile) -> Result<ApplicantProfile, sqlx::Error> {
        let cv_files = serde_json::to_string(&profile.cv_files)
            .map_err(|e| sqlx::Error::Protocol(format!("failed to encode cv_files: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO applicants (
                id, user_id, full_name, birth_date, city, country, gender,
                education, cv_files, profile_picture
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                birth_date = excluded.birth_date,
                city = excluded.city,
                country = excluded.country,
                gender = excluded.gender,
                education = excluded.education,
                cv_files = excluded.cv_files,
                profile_picture = excluded.profile_picture,
                updated_at = datetime('now')
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.user_id)
        .bind(&profile.full_name)
        .bind(profile.birth_date.format("%Y-%m-%d").to_string())
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(profile.gender.as_str())
        .bind(&profile.education)
        .bind(&cv_files)
        .bind(profile.profile_picture.as_ref().map(|r| r.as_str()))
        .execute(&self.db)
        .await?;

        debug!(user_id = %profile.user_id, "Applicant row saved");

        self.find_by_owner(&profile.user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn search(&self, query: &PageQuery) -> Result<Page<ApplicantProfile>, sqlx::Error> {
        let pattern = query.name_pattern();

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM applicants WHERE (?1 IS NULL OR LOWER(full_name) LIKE ?1)",
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ApplicantRow>(
            r#"
            SELECT * FROM applicants
            WHERE (?1 IS NULL OR LOWER(full_name) LIKE ?1)
            ORDER BY created_at DESC, id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        let items = rows
            .into_iter()
            .map(into_profile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total, query))
    }

    async fn delete_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Option<ApplicantProfile>, sqlx::Error> {
        let existing = self.find_by_owner(owner_id).await?;
        if existing.is_some() {
            sqlx::query("DELETE FROM applicants WHERE user_id = ?")
                .bind(owner_id)
                .execute(&self.db)
                .await?;
        }
        Ok(existing)
    }
}
