//! Regeneration workflows for cached draft content.

use std::sync::Arc;

use serde::Serialize;

use crate::application::error::AppError;
use crate::cache::{DraftPayload, DraftStore};
use crate::infra::generation::{GenerationBackend, GenerationRequest, GenerationTask};

/// Regenerated text plus the draft handle it was cached under.
#[derive(Debug, Serialize)]
pub struct RegenerationOutcome {
    pub regenerated: String,
    pub handle: String,
    pub expires_at: u64,
}

pub struct RegenerationService {
    backend: Arc<dyn GenerationBackend>,
    drafts: Arc<DraftStore>,
}

impl RegenerationService {
    pub fn new(backend: Arc<dyn GenerationBackend>, drafts: Arc<DraftStore>) -> Self {
        Self { backend, drafts }
    }

    /// Regenerate a full week's content block.
    pub async fn regenerate_week_content(
        &self,
        input: Option<&str>,
    ) -> Result<RegenerationOutcome, AppError> {
        self.regenerate(
            input,
            "week content is required",
            GenerationTask::RegenerateContent,
            DraftPayload::WeekContent,
        )
        .await
    }

    /// Regenerate a single day's subcontent.
    pub async fn regenerate_subcontent(
        &self,
        input: Option<&str>,
    ) -> Result<RegenerationOutcome, AppError> {
        self.regenerate(
            input,
            "subcontent is required",
            GenerationTask::RegenerateSubcontent,
            DraftPayload::Subcontent,
        )
        .await
    }

    async fn regenerate(
        &self,
        input: Option<&str>,
        missing_message: &str,
        task: GenerationTask,
        wrap: fn(String) -> DraftPayload,
    ) -> Result<RegenerationOutcome, AppError> {
        let input = input
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::validation(missing_message))?;

        let regenerated = self
            .backend
            .generate(GenerationRequest::new(task, input))
            .await?;

        let snapshot = self.drafts.insert(wrap(regenerated.clone()));

        Ok(RegenerationOutcome {
            regenerated,
            handle: snapshot.handle,
            expires_at: snapshot.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::cache::{Clock, DraftCacheConfig, SystemClock};
    use crate::infra::generation::BackendError;

    struct UpperBackend;

    #[async_trait]
    impl GenerationBackend for UpperBackend {
        async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
            Ok(request.text.to_uppercase())
        }
    }

    fn service() -> (RegenerationService, Arc<DraftStore>) {
        let drafts = Arc::new(DraftStore::new(
            &DraftCacheConfig::default(),
            Arc::new(SystemClock) as Arc<dyn Clock>,
        ));
        (
            RegenerationService::new(Arc::new(UpperBackend), drafts.clone()),
            drafts,
        )
    }

    #[tokio::test]
    async fn week_content_is_regenerated_and_cached() {
        let (service, drafts) = service();
        let outcome = service
            .regenerate_week_content(Some("draft text"))
            .await
            .expect("outcome");

        assert_eq!(outcome.regenerated, "DRAFT TEXT");
        let cached = drafts.lookup(&outcome.handle).expect("cached");
        assert_eq!(
            cached.payload,
            DraftPayload::WeekContent("DRAFT TEXT".to_string())
        );
    }

    #[tokio::test]
    async fn subcontent_is_wrapped_in_its_own_variant() {
        let (service, drafts) = service();
        let outcome = service
            .regenerate_subcontent(Some("day text"))
            .await
            .expect("outcome");

        let cached = drafts.lookup(&outcome.handle).expect("cached");
        assert_eq!(
            cached.payload,
            DraftPayload::Subcontent("DAY TEXT".to_string())
        );
    }

    #[tokio::test]
    async fn missing_input_is_a_validation_error() {
        let (service, _) = service();
        assert!(matches!(
            service.regenerate_week_content(None).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.regenerate_subcontent(Some("   ")).await,
            Err(AppError::Validation(_))
        ));
    }
}
