use async_trait::async_trait;
use sqlx::query_as;
use time::Date;

use crate::application::repos::{ContentRepo, RepoError};
use crate::domain::content::{ContentRecord, GeneratedPost, PendingFile, WeekDayLabel};
use crate::domain::types::{ContentStatus, Platform};

use super::{PostgresRepositories, map_sqlx_error};

const SELECT_COLUMNS: &str =
    "SELECT id, week, day, title, content, platform, status, date_upload, file_name, file_type \
     FROM content";

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: i32,
    week: i32,
    day: String,
    title: String,
    content: String,
    platform: Platform,
    status: ContentStatus,
    date_upload: Date,
    file_name: String,
    file_type: String,
}

impl From<ContentRow> for ContentRecord {
    fn from(row: ContentRow) -> Self {
        Self {
            id: row.id,
            week: row.week,
            day: row.day,
            title: row.title,
            content: row.content,
            platform: row.platform,
            status: row.status,
            date_upload: row.date_upload,
            file_name: row.file_name,
            file_type: row.file_type,
        }
    }
}

#[async_trait]
impl ContentRepo for PostgresRepositories {
    async fn store_content(
        &self,
        posts: &[GeneratedPost],
        file_name: &str,
        file_type: &str,
    ) -> Result<u64, RepoError> {
        // Reject malformed labels before touching the database.
        let mut rows: Vec<(&GeneratedPost, WeekDayLabel)> = Vec::with_capacity(posts.len());
        for post in posts {
            let label = WeekDayLabel::parse(&post.week_day)
                .map_err(|err| RepoError::invalid_input(err.to_string()))?;
            rows.push((post, label));
        }

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let mut inserted = 0u64;
        for (post, label) in rows {
            let result = sqlx::query(
                "INSERT INTO content \
                 (week, day, title, content, platform, status, date_upload, file_name, file_type) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(label.week as i32)
            .bind(label.day)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.platform)
            .bind(ContentStatus::Pending)
            .bind(post.timestamp.date())
            .bind(file_name)
            .bind(file_type)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(inserted)
    }

    async fn pending_content(&self) -> Result<Vec<ContentRecord>, RepoError> {
        let rows = query_as::<_, ContentRow>(&format!(
            "{SELECT_COLUMNS} WHERE status = $1 ORDER BY week, day, id"
        ))
        .bind(ContentStatus::Pending)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ContentRecord::from).collect())
    }

    async fn pending_content_for_file(
        &self,
        file_name: &str,
    ) -> Result<Vec<ContentRecord>, RepoError> {
        let rows = query_as::<_, ContentRow>(&format!(
            "{SELECT_COLUMNS} WHERE status = $1 AND file_name = $2 ORDER BY week, day, id"
        ))
        .bind(ContentStatus::Pending)
        .bind(file_name)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ContentRecord::from).collect())
    }

    async fn pending_files(&self) -> Result<Vec<PendingFile>, RepoError> {
        #[derive(sqlx::FromRow)]
        struct FileRow {
            file_name: String,
            date_upload: Date,
        }

        let rows = query_as::<_, FileRow>(
            "SELECT file_name, MIN(date_upload) AS date_upload \
             FROM content WHERE status = $1 \
             GROUP BY file_name ORDER BY date_upload, file_name",
        )
        .bind(ContentStatus::Pending)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| PendingFile {
                file_name: row.file_name,
                date_upload: row.date_upload,
            })
            .collect())
    }

    async fn update_status(&self, id: i32, status: ContentStatus) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE content SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_by_content(&self, text: &str) -> Result<Option<ContentRecord>, RepoError> {
        let row = query_as::<_, ContentRow>(&format!(
            "{SELECT_COLUMNS} WHERE content = $1 ORDER BY id LIMIT 1"
        ))
        .bind(text)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ContentRecord::from))
    }

    async fn update_content(&self, id: i32, title: &str, content: &str) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE content SET title = $1, content = $2 WHERE id = $3")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
