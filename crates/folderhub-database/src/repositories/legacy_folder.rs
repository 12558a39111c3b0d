//! Legacy store over the `dashboard` table.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

use folderhub_entity::folder::model::slugify;
use folderhub_entity::folder::{LegacyFolder, SaveLegacyFolder};

use super::{ConnProvider, PgFolderStore};
use crate::error::{LegacyResult, LegacyStoreError};
use crate::store::legacy::{LegacyFolderStore, validate_save};

const SELECT_FOLDER: &str = "SELECT id, org_id, uid, title, slug, folder_uid, is_folder, version, \
     created_by, updated_by, created, updated FROM dashboard";

fn map_unique_violation(e: sqlx::Error) -> LegacyStoreError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("dashboard_org_id_uid_key") =>
        {
            LegacyStoreError::SameUidExists
        }
        other => LegacyStoreError::Database(other),
    }
}

#[async_trait]
impl<C: ConnProvider> LegacyFolderStore for PgFolderStore<C> {
    async fn get_by_uid(&self, org_id: i64, uid: &str) -> LegacyResult<LegacyFolder> {
        let mut conn = self.acquire().await?;
        sqlx::query_as::<_, LegacyFolder>(&format!(
            "{SELECT_FOLDER} WHERE org_id = $1 AND uid = $2 AND is_folder = TRUE"
        ))
        .bind(org_id)
        .bind(uid)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(LegacyStoreError::NotFound)
    }

    async fn get_by_id(&self, org_id: i64, id: i64) -> LegacyResult<LegacyFolder> {
        let mut conn = self.acquire().await?;
        sqlx::query_as::<_, LegacyFolder>(&format!(
            "{SELECT_FOLDER} WHERE org_id = $1 AND id = $2 AND is_folder = TRUE"
        ))
        .bind(org_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(LegacyStoreError::NotFound)
    }

    async fn get_by_title(&self, org_id: i64, title: &str) -> LegacyResult<LegacyFolder> {
        let mut conn = self.acquire().await?;
        let mut rows = sqlx::query_as::<_, LegacyFolder>(&format!(
            "{SELECT_FOLDER} WHERE org_id = $1 AND title = $2 AND is_folder = TRUE \
             ORDER BY id LIMIT 2"
        ))
        .bind(org_id)
        .bind(title)
        .fetch_all(&mut *conn)
        .await?;

        match rows.len() {
            0 => Err(LegacyStoreError::NotFound),
            1 => Ok(rows.remove(0)),
            _ => Err(LegacyStoreError::AmbiguousTitle(title.to_string())),
        }
    }

    async fn get_many(
        &self,
        org_id: i64,
        uids: &[String],
    ) -> LegacyResult<HashMap<String, LegacyFolder>> {
        if uids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.acquire().await?;
        let rows = sqlx::query_as::<_, LegacyFolder>(&format!(
            "{SELECT_FOLDER} WHERE org_id = $1 AND uid = ANY($2) AND is_folder = TRUE"
        ))
        .bind(org_id)
        .bind(uids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(|f| (f.uid.clone(), f)).collect())
    }

    async fn list_org_folders(&self, org_id: i64) -> LegacyResult<Vec<LegacyFolder>> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query_as::<_, LegacyFolder>(&format!(
            "{SELECT_FOLDER} WHERE org_id = $1 AND is_folder = TRUE ORDER BY title ASC, id ASC"
        ))
        .bind(org_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    async fn save(&self, cmd: &SaveLegacyFolder) -> LegacyResult<LegacyFolder> {
        let title = validate_save(cmd)?;
        let parent = (!cmd.folder_uid.is_empty()).then_some(cmd.folder_uid.as_str());
        let mut conn = self.acquire().await?;

        let name_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                SELECT 1 FROM dashboard \
                WHERE org_id = $1 AND is_folder = TRUE AND id <> $2 \
                  AND COALESCE(folder_uid, '') = $3 AND LOWER(title) = LOWER($4) \
             )",
        )
        .bind(cmd.org_id)
        .bind(cmd.id)
        .bind(&cmd.folder_uid)
        .bind(&title)
        .fetch_one(&mut *conn)
        .await?;
        if name_taken {
            return Err(LegacyStoreError::SameNameInFolderExists);
        }

        let now = Utc::now();

        if cmd.id == 0 {
            return sqlx::query_as::<_, LegacyFolder>(
                "INSERT INTO dashboard \
                 (org_id, uid, title, slug, folder_uid, is_folder, version, \
                  created_by, updated_by, created, updated) \
                 VALUES ($1, $2, $3, $4, $5, TRUE, 1, $6, $6, $7, $7) \
                 RETURNING id, org_id, uid, title, slug, folder_uid, is_folder, version, \
                 created_by, updated_by, created, updated",
            )
            .bind(cmd.org_id)
            .bind(&cmd.uid)
            .bind(&title)
            .bind(slugify(&title))
            .bind(parent)
            .bind(cmd.user_id)
            .bind(now)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_unique_violation);
        }

        let current: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM dashboard \
             WHERE org_id = $1 AND id = $2 AND is_folder = TRUE FOR UPDATE",
        )
        .bind(cmd.org_id)
        .bind(cmd.id)
        .fetch_optional(&mut *conn)
        .await?;
        let current = current.ok_or(LegacyStoreError::NotFound)?;
        if !cmd.overwrite && current != cmd.version {
            return Err(LegacyStoreError::VersionMismatch);
        }

        sqlx::query_as::<_, LegacyFolder>(
            "UPDATE dashboard SET uid = $3, title = $4, slug = $5, folder_uid = $6, \
             version = version + 1, updated_by = $7, updated = $8 \
             WHERE org_id = $1 AND id = $2 \
             RETURNING id, org_id, uid, title, slug, folder_uid, is_folder, version, \
             created_by, updated_by, created, updated",
        )
        .bind(cmd.org_id)
        .bind(cmd.id)
        .bind(&cmd.uid)
        .bind(&title)
        .bind(slugify(&title))
        .bind(parent)
        .bind(cmd.user_id)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_unique_violation)
    }

    async fn delete(&self, org_id: i64, id: i64) -> LegacyResult<()> {
        let mut conn = self.acquire().await?;
        let result =
            sqlx::query("DELETE FROM dashboard WHERE org_id = $1 AND id = $2 AND is_folder = TRUE")
                .bind(org_id)
                .bind(id)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(LegacyStoreError::NotFound);
        }
        Ok(())
    }
}
