//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::content::{ContentRecord, GeneratedPost, PendingFile};
use crate::domain::types::ContentStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Persistence operations over generated content rows.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Insert one row per generated post, all `pending`, in one transaction.
    /// Rejects posts whose week/day label cannot be parsed.
    async fn store_content(
        &self,
        posts: &[GeneratedPost],
        file_name: &str,
        file_type: &str,
    ) -> Result<u64, RepoError>;

    async fn pending_content(&self) -> Result<Vec<ContentRecord>, RepoError>;

    async fn pending_content_for_file(
        &self,
        file_name: &str,
    ) -> Result<Vec<ContentRecord>, RepoError>;

    /// Distinct file names that still have pending rows, earliest upload first.
    async fn pending_files(&self) -> Result<Vec<PendingFile>, RepoError>;

    async fn update_status(&self, id: i32, status: ContentStatus) -> Result<(), RepoError>;

    /// Locate a row by its exact content text.
    async fn find_by_content(&self, text: &str) -> Result<Option<ContentRecord>, RepoError>;

    async fn update_content(&self, id: i32, title: &str, content: &str) -> Result<(), RepoError>;
}
