//! Nested store over the `folder` table.

use async_trait::async_trait;
use chrono::Utc;

use folderhub_core::error::{AppError, ErrorKind};
use folderhub_core::result::AppResult;
use folderhub_entity::folder::{
    CreateNestedFolder, Folder, MAX_NESTED_FOLDER_DEPTH, NestedFolderRow, UpdateNestedFolder,
};

use super::{ConnProvider, PgFolderStore};
use crate::store::NestedFolderStore;

const SELECT_ROW: &str =
    "SELECT org_id, uid, title, description, parent_uid, created, updated FROM folder";

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl<C: ConnProvider> NestedFolderStore for PgFolderStore<C> {
    async fn get(&self, org_id: i64, uid: &str) -> AppResult<Folder> {
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        sqlx::query_as::<_, NestedFolderRow>(&format!(
            "{SELECT_ROW} WHERE org_id = $1 AND uid = $2"
        ))
        .bind(org_id)
        .bind(uid)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to find folder"))?
        .map(Folder::from)
        .ok_or_else(|| AppError::not_found("folder not found"))
    }

    async fn get_folders(&self, org_id: i64, uids: &[String]) -> AppResult<Vec<Folder>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        let rows = sqlx::query_as::<_, NestedFolderRow>(&format!(
            "{SELECT_ROW} WHERE org_id = $1 AND uid = ANY($2) ORDER BY title ASC"
        ))
        .bind(org_id)
        .bind(uids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list folders"))?;

        Ok(rows.into_iter().map(Folder::from).collect())
    }

    async fn get_children(&self, org_id: i64, parent_uid: &str) -> AppResult<Vec<Folder>> {
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        let rows = sqlx::query_as::<_, NestedFolderRow>(&format!(
            "{SELECT_ROW} WHERE org_id = $1 AND COALESCE(parent_uid, '') = $2 \
             ORDER BY title ASC, uid ASC"
        ))
        .bind(org_id)
        .bind(parent_uid)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list children"))?;

        Ok(rows.into_iter().map(Folder::from).collect())
    }

    async fn get_parents(&self, org_id: i64, uid: &str) -> AppResult<Vec<Folder>> {
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        // The level cap keeps a corrupted cycle from recursing forever.
        let rows = sqlx::query_as::<_, NestedFolderRow>(
            "WITH RECURSIVE ancestors AS ( \
                SELECT f.*, 0 AS level FROM folder f WHERE f.org_id = $1 AND f.uid = $2 \
                UNION ALL \
                SELECT p.*, a.level + 1 FROM folder p \
                INNER JOIN ancestors a ON p.org_id = a.org_id AND p.uid = a.parent_uid \
                WHERE a.level < $3 \
             ) \
             SELECT org_id, uid, title, description, parent_uid, created, updated \
             FROM ancestors WHERE level > 0 ORDER BY level DESC",
        )
        .bind(org_id)
        .bind(uid)
        .bind(MAX_NESTED_FOLDER_DEPTH as i32)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to find ancestors"))?;

        Ok(rows.into_iter().map(Folder::from).collect())
    }

    async fn create(&self, cmd: &CreateNestedFolder) -> AppResult<Folder> {
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        let now = Utc::now();
        sqlx::query_as::<_, NestedFolderRow>(
            "INSERT INTO folder (org_id, uid, title, description, parent_uid, created, updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING org_id, uid, title, description, parent_uid, created, updated",
        )
        .bind(cmd.org_id)
        .bind(&cmd.uid)
        .bind(&cmd.title)
        .bind(&cmd.description)
        .bind((!cmd.parent_uid.is_empty()).then_some(cmd.parent_uid.as_str()))
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map(Folder::from)
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("folder_org_id_uid_key") =>
            {
                AppError::conflict(format!("Folder '{}' already exists", cmd.uid))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }

    async fn update(&self, cmd: &UpdateNestedFolder) -> AppResult<Folder> {
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        let new_parent = cmd
            .new_parent_uid
            .as_deref()
            .map(|p| (!p.is_empty()).then_some(p));

        sqlx::query_as::<_, NestedFolderRow>(
            "UPDATE folder SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                parent_uid = CASE WHEN $5 THEN $6 ELSE parent_uid END, \
                updated = $7 \
             WHERE org_id = $1 AND uid = $2 \
             RETURNING org_id, uid, title, description, parent_uid, created, updated",
        )
        .bind(cmd.org_id)
        .bind(&cmd.uid)
        .bind(cmd.new_title.as_deref())
        .bind(cmd.new_description.as_deref())
        .bind(new_parent.is_some())
        .bind(new_parent.flatten())
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to update folder"))?
        .map(Folder::from)
        .ok_or_else(|| AppError::not_found("folder not found"))
    }

    async fn delete(&self, org_id: i64, uid: &str) -> AppResult<()> {
        let mut conn = self.acquire().await.map_err(db_err("Failed to acquire connection"))?;
        let result = sqlx::query("DELETE FROM folder WHERE org_id = $1 AND uid = $2")
            .bind(org_id)
            .bind(uid)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete folder"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("folder not found"));
        }
        Ok(())
    }
}
