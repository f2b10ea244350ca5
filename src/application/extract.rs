//! Extraction workflow: document to draft calendar.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::error::AppError;
use crate::cache::{DraftPayload, DraftStore};
use crate::domain::content::{ContentItem, WeeklyContent};
use crate::domain::types::canonical_day;
use crate::infra::extract::extract_text;
use crate::infra::generation::{GenerationBackend, GenerationRequest, GenerationTask};

/// A freshly minted draft calendar together with its cache coordinates.
#[derive(Debug, Serialize)]
pub struct ExtractionOutcome {
    pub handle: String,
    pub expires_at: u64,
    pub content: BTreeMap<String, WeeklyContent>,
}

pub struct ExtractionService {
    backend: Arc<dyn GenerationBackend>,
    drafts: Arc<DraftStore>,
}

impl ExtractionService {
    pub fn new(backend: Arc<dyn GenerationBackend>, drafts: Arc<DraftStore>) -> Self {
        Self { backend, drafts }
    }

    /// Extract text from the uploaded document and build a draft calendar
    /// covering weeks 1 through `weeks` for the requested days. Research
    /// failures skip that day rather than failing the workflow.
    pub async fn extract_and_plan(
        &self,
        path: &Path,
        weeks: u32,
        days: &[String],
    ) -> Result<ExtractionOutcome, AppError> {
        if weeks == 0 {
            return Err(AppError::validation("week must be at least 1"));
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

        let text = extract_text(path).await?;

        let mut calendar = BTreeMap::new();
        for week in 1..=weeks {
            let mut content_by_days = BTreeMap::new();
            for &day in &days {
                let request = GenerationRequest::new(GenerationTask::Research, text.clone())
                    .with_calendar_slot(week, day);
                match self.backend.generate(request).await {
                    Ok(research) => {
                        content_by_days.insert(day.to_string(), vec![ContentItem::text(research)]);
                    }
                    Err(err) => {
                        warn!(week, day, error = %err, "skipping day after research failure");
                    }
                }
            }

            if content_by_days.is_empty() {
                continue;
            }
            let week_label = format!("Week {week}");
            let weekly = WeeklyContent {
                week: week_label.clone(),
                content_by_days,
            };
            weekly.validate()?;
            calendar.insert(week_label, weekly);
        }

        let snapshot = self.drafts.insert(DraftPayload::Calendar(calendar.clone()));

        Ok(ExtractionOutcome {
            handle: snapshot.handle,
            expires_at: snapshot.expires_at,
            content: calendar,
        })
    }
}
