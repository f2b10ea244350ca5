//! Content generation runs: research, refinement, per-platform posts.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::application::error::AppError;
use crate::application::format::{format_for_platform, rotate_for_slot};
use crate::application::repos::ContentRepo;
use crate::domain::content::{ContentRecord, GeneratedPost, WeekDayLabel};
use crate::domain::types::{ALL_PLATFORMS, CANONICAL_DAYS, Platform, canonical_day, day_index};
use crate::infra::generation::{GenerationBackend, GenerationRequest, GenerationTask};
use crate::infra::output::OutputWriter;

/// Outcome of one generation run. Storage failure is a partial success:
/// the generated posts are still returned alongside the failure note.
#[derive(Debug, Serialize)]
pub struct GenerationOutcome {
    pub posts: Vec<GeneratedPost>,
    pub database_storage: StorageOutcome,
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StorageOutcome {
    Stored { rows: u64 },
    Failed { message: String },
}

pub struct GenerationService {
    backend: Arc<dyn GenerationBackend>,
    repo: Arc<dyn ContentRepo>,
    output: OutputWriter,
}

impl GenerationService {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        repo: Arc<dyn ContentRepo>,
        output: OutputWriter,
    ) -> Self {
        Self {
            backend,
            repo,
            output,
        }
    }

    /// Weekly run: one post per platform for every day of every week.
    pub async fn generate_weekly(
        &self,
        text: &str,
        weeks: u32,
        platform_selection: &str,
        file_name: &str,
        file_type: &str,
    ) -> Result<GenerationOutcome, AppError> {
        if weeks == 0 {
            return Err(AppError::validation("weeks must be at least 1"));
        }
        let platforms = parse_platform_selection(platform_selection)?;
        let refined = self.research_and_refine(text).await?;

        let mut posts = Vec::new();
        for week in 1..=weeks {
            for (index, day) in CANONICAL_DAYS.iter().copied().enumerate() {
                for &platform in &platforms {
                    let label = WeekDayLabel::new(week, day);
                    match self.generate_one(&refined, week, index, day, platform, None).await {
                        Ok(post) => posts.push(self.finish(label, platform, post)),
                        Err(err) => {
                            warn!(week, day, platform = platform.as_str(), error = %err,
                                "skipping slot after backend failure");
                        }
                    }
                }
            }
        }

        Ok(self.persist(posts, file_name, file_type).await)
    }

    /// Custom run: selected days only, a configured number of posts per
    /// platform, labeled with their post number.
    pub async fn generate_custom(
        &self,
        text: &str,
        weeks: u32,
        days: &[String],
        platform_counts: &[(Platform, u32)],
        file_name: &str,
        file_type: &str,
    ) -> Result<GenerationOutcome, AppError> {
        if weeks == 0 {
            return Err(AppError::validation("weeks must be at least 1"));
        }
        if days.is_empty() {
            return Err(AppError::validation("at least one day must be selected"));
        }
        let days: Vec<&'static str> = days
            .iter()
            .map(|day| {
                canonical_day(day)
                    .ok_or_else(|| AppError::validation(format!("unknown day `{day}`")))
            })
            .collect::<Result<_, _>>()?;
        let refined = self.research_and_refine(text).await?;

        let mut posts = Vec::new();
        for week in 1..=weeks {
            for &day in &days {
                let index = day_index(day).unwrap_or(0);
                for &(platform, count) in platform_counts {
                    for post_number in 1..=count {
                        let label = WeekDayLabel::with_post(week, day, post_number);
                        match self
                            .generate_one(&refined, week, index, day, platform, Some(post_number))
                            .await
                        {
                            Ok(post) => posts.push(self.finish(label, platform, post)),
                            Err(err) => {
                                warn!(week, day, platform = platform.as_str(), post_number,
                                    error = %err, "skipping slot after backend failure");
                            }
                        }
                    }
                }
            }
        }

        Ok(self.persist(posts, file_name, file_type).await)
    }

    /// Regenerate a persisted post located by its exact content text.
    pub async fn rewrite_post(&self, content_text: &str) -> Result<ContentRecord, AppError> {
        if content_text.trim().is_empty() {
            return Err(AppError::validation("content text must not be empty"));
        }
        let mut row = self
            .repo
            .find_by_content(content_text)
            .await?
            .ok_or(AppError::NotFound)?;

        let request = GenerationRequest::new(GenerationTask::Rewrite, row.content.clone())
            .with_platform(row.platform);
        let regenerated = self.backend.generate(request).await?;
        let formatted = format_for_platform(row.platform, &regenerated);

        self.repo
            .update_content(row.id, &formatted.title, &formatted.content)
            .await?;

        row.title = formatted.title;
        row.content = formatted.content;
        Ok(row)
    }

    async fn research_and_refine(&self, text: &str) -> Result<String, AppError> {
        let researched = self
            .backend
            .generate(GenerationRequest::new(GenerationTask::Research, text))
            .await?;
        let refined = self
            .backend
            .generate(GenerationRequest::new(
                GenerationTask::QualityControl,
                researched,
            ))
            .await?;
        Ok(refined)
    }

    async fn generate_one(
        &self,
        refined: &str,
        week: u32,
        day_index: usize,
        day: &str,
        platform: Platform,
        post_number: Option<u32>,
    ) -> Result<String, AppError> {
        let seed = rotate_for_slot(refined, week, day_index, post_number);
        let request = GenerationRequest::new(GenerationTask::PlatformPost, seed)
            .with_calendar_slot(week, day)
            .with_platform(platform);
        Ok(self.backend.generate(request).await?)
    }

    fn finish(&self, label: WeekDayLabel, platform: Platform, text: String) -> GeneratedPost {
        let formatted = format_for_platform(platform, &text);
        GeneratedPost {
            week_day: label.render(),
            title: formatted.title,
            content: formatted.content,
            platform,
            timestamp: OffsetDateTime::now_utc(),
            word_count: formatted.word_count,
            char_count: formatted.char_count,
        }
    }

    async fn persist(
        &self,
        posts: Vec<GeneratedPost>,
        file_name: &str,
        file_type: &str,
    ) -> GenerationOutcome {
        let database_storage = match self.repo.store_content(&posts, file_name, file_type).await {
            Ok(rows) => StorageOutcome::Stored { rows },
            Err(err) => {
                warn!(error = %err, "generated content could not be stored");
                StorageOutcome::Failed {
                    message: err.to_string(),
                }
            }
        };

        let output_file = match self.output.write("generated_content", &posts).await {
            Ok(path) => Some(path.display().to_string()),
            Err(err) => {
                warn!(error = %err, "output file could not be written");
                None
            }
        };

        GenerationOutcome {
            posts,
            database_storage,
            output_file,
        }
    }
}

/// `"all"` or a single platform name, case-insensitive.
pub fn parse_platform_selection(selection: &str) -> Result<Vec<Platform>, AppError> {
    if selection.trim().eq_ignore_ascii_case("all") {
        return Ok(ALL_PLATFORMS.to_vec());
    }
    Platform::try_from(selection.trim())
        .map(|platform| vec![platform])
        .map_err(|_| AppError::validation(format!("unknown platform `{selection}`")))
}

/// Comma-separated `platform:count` pairs.
pub fn parse_platform_counts(raw: &str) -> Result<Vec<(Platform, u32)>, AppError> {
    let mut counts = Vec::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, count) = pair
            .split_once(':')
            .ok_or_else(|| AppError::validation(format!("malformed platform count `{pair}`")))?;
        let platform = Platform::try_from(name.trim())
            .map_err(|_| AppError::validation(format!("unknown platform `{name}`")))?;
        let count: u32 = count
            .trim()
            .parse()
            .map_err(|_| AppError::validation(format!("malformed platform count `{pair}`")))?;
        if count == 0 {
            return Err(AppError::validation(format!(
                "post count for `{name}` must be at least 1"
            )));
        }
        counts.push((platform, count));
    }
    if counts.is_empty() {
        return Err(AppError::validation(
            "at least one platform count is required",
        ));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::RepoError;
    use crate::domain::content::PendingFile;
    use crate::domain::types::ContentStatus;
    use crate::infra::generation::BackendError;

    struct EchoBackend;

    #[async_trait]
    impl GenerationBackend for EchoBackend {
        async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
            Ok(request.text)
        }
    }

    struct StubRepo {
        fail_store: bool,
    }

    #[async_trait]
    impl ContentRepo for StubRepo {
        async fn store_content(
            &self,
            posts: &[GeneratedPost],
            _file_name: &str,
            _file_type: &str,
        ) -> Result<u64, RepoError> {
            if self.fail_store {
                Err(RepoError::Persistence("connection refused".into()))
            } else {
                Ok(posts.len() as u64)
            }
        }

        async fn pending_content(&self) -> Result<Vec<ContentRecord>, RepoError> {
            Ok(Vec::new())
        }

        async fn pending_content_for_file(
            &self,
            _file_name: &str,
        ) -> Result<Vec<ContentRecord>, RepoError> {
            Ok(Vec::new())
        }

        async fn pending_files(&self) -> Result<Vec<PendingFile>, RepoError> {
            Ok(Vec::new())
        }

        async fn update_status(&self, _id: i32, _status: ContentStatus) -> Result<(), RepoError> {
            Ok(())
        }

        async fn find_by_content(&self, _text: &str) -> Result<Option<ContentRecord>, RepoError> {
            Ok(None)
        }

        async fn update_content(
            &self,
            _id: i32,
            _title: &str,
            _content: &str,
        ) -> Result<(), RepoError> {
            Ok(())
        }
    }

    fn service(fail_store: bool) -> (GenerationService, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = OutputWriter::new(dir.path().to_path_buf()).expect("writer");
        let service = GenerationService::new(
            Arc::new(EchoBackend),
            Arc::new(StubRepo { fail_store }),
            output,
        );
        (service, dir)
    }

    #[tokio::test]
    async fn weekly_run_covers_every_slot() {
        let (service, _dir) = service(false);
        let outcome = service
            .generate_weekly("First. Second. Third.", 2, "twitter", "doc.txt", "txt")
            .await
            .expect("outcome");

        // 2 weeks x 7 days x 1 platform.
        assert_eq!(outcome.posts.len(), 14);
        assert!(matches!(
            outcome.database_storage,
            StorageOutcome::Stored { rows: 14 }
        ));
        assert!(outcome.output_file.is_some());
        assert_eq!(outcome.posts[0].week_day, "Week 1 - Monday");
    }

    #[tokio::test]
    async fn custom_run_labels_posts_with_their_number() {
        let (service, _dir) = service(false);
        let outcome = service
            .generate_custom(
                "First. Second. Third.",
                1,
                &["monday".to_string()],
                &[(Platform::Linkedin, 2)],
                "doc.txt",
                "txt",
            )
            .await
            .expect("outcome");

        assert_eq!(outcome.posts.len(), 2);
        assert_eq!(outcome.posts[0].week_day, "Week 1 - Monday - Post 1");
        assert_eq!(outcome.posts[1].week_day, "Week 1 - Monday - Post 2");
    }

    #[tokio::test]
    async fn storage_failure_is_a_partial_success() {
        let (service, _dir) = service(true);
        let outcome = service
            .generate_weekly("First. Second.", 1, "tiktok", "doc.txt", "txt")
            .await
            .expect("outcome");

        assert_eq!(outcome.posts.len(), 7);
        assert!(matches!(
            outcome.database_storage,
            StorageOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn rewrite_of_unknown_content_is_not_found() {
        let (service, _dir) = service(false);
        let err = service.rewrite_post("no such post").await.expect_err("err");
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn all_selection_expands_to_every_platform() {
        let platforms = parse_platform_selection("All").expect("platforms");
        assert_eq!(platforms.len(), ALL_PLATFORMS.len());
    }

    #[test]
    fn unknown_platform_selection_is_rejected() {
        assert!(parse_platform_selection("myspace").is_err());
    }

    #[test]
    fn platform_counts_parse_pairs() {
        let counts = parse_platform_counts("twitter:2, linkedin:1").expect("counts");
        assert_eq!(counts, vec![(Platform::Twitter, 2), (Platform::Linkedin, 1)]);
    }

    #[test]
    fn malformed_platform_counts_are_rejected() {
        assert!(parse_platform_counts("twitter=2").is_err());
        assert!(parse_platform_counts("twitter:zero").is_err());
        assert!(parse_platform_counts("twitter:0").is_err());
        assert!(parse_platform_counts("").is_err());
    }
}
